//! Line drawing for the wireframe overlay.

use crate::framebuffer::{PixelBuffer, Rgba};

/// Integer Bresenham line between two screen points. Out-of-frame pixels
/// are dropped, so endpoints may lie outside the buffer.
pub fn draw_line<P: PixelBuffer>(
    target: &mut P,
    mut x1: i32,
    mut y1: i32,
    mut x2: i32,
    mut y2: i32,
    color: Rgba,
) {
    let mut steep = false;
    if (x1 - x2).abs() < (y1 - y2).abs() {
        std::mem::swap(&mut x1, &mut y1);
        std::mem::swap(&mut x2, &mut y2);
        steep = true;
    }
    if x1 > x2 {
        std::mem::swap(&mut x1, &mut x2);
        std::mem::swap(&mut y1, &mut y2);
    }

    let dx = x2 - x1;
    let dy = y2 - y1;
    let derror = (dy * 2).abs();
    let mut error = 0;
    let mut y = y1;
    for x in x1..=x2 {
        if steep {
            plot(target, y, x, color);
        } else {
            plot(target, x, y, color);
        }
        error += derror;
        if error > dx {
            y += if y2 > y1 { 1 } else { -1 };
            error -= dx * 2;
        }
    }
}

/// Draws the three edges of a triangle given in screen coordinates.
pub fn draw_triangle_edges<P: PixelBuffer>(target: &mut P, points: [(i32, i32); 3], color: Rgba) {
    for i in 0..3 {
        let (x1, y1) = points[i];
        let (x2, y2) = points[(i + 1) % 3];
        draw_line(target, x1, y1, x2, y2, color);
    }
}

fn plot<P: PixelBuffer>(target: &mut P, x: i32, y: i32, color: Rgba) {
    if x >= 0 && y >= 0 && (x as u32) < target.width() && (y as u32) < target.height() {
        target.set_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::{Frame, BLACK, WHITE};

    #[test]
    fn horizontal_line_covers_the_row() {
        let mut frame = Frame::new(8, 8);
        draw_line(&mut frame, 0, 3, 7, 3, WHITE);
        for x in 0..8 {
            assert_eq!(frame.pixel(x, 3), Some(WHITE));
        }
        assert_eq!(frame.pixel(0, 4), Some(BLACK));
    }

    #[test]
    fn steep_lines_are_transposed_not_gappy() {
        let mut frame = Frame::new(8, 8);
        draw_line(&mut frame, 2, 0, 3, 7, WHITE);
        // every row between the endpoints gets exactly one pixel
        for y in 0..8 {
            let hits = (0..8).filter(|&x| frame.pixel(x, y) == Some(WHITE)).count();
            assert_eq!(hits, 1, "row {y}");
        }
    }

    #[test]
    fn off_screen_segments_are_clipped_silently() {
        let mut frame = Frame::new(4, 4);
        draw_line(&mut frame, -10, -10, 20, 20, WHITE);
        assert_eq!(frame.pixel(1, 1), Some(WHITE));
    }
}
