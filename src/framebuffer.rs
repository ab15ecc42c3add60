//! Pixel-buffer seam between the rasterizer and the display layer.
//!
//! The core writes through the [`PixelBuffer`] trait; a windowing layer
//! adapts its own surface by implementing it. [`Frame`] is the crate's
//! plain Vec-backed implementation, used by tests and the demo binary.

use image::RgbaImage;

/// An RGBA color, one byte per channel.
pub type Rgba = [u8; 4];

pub const BLACK: Rgba = [0, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];

/// A writable 2D pixel surface.
pub trait PixelBuffer {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Writes one pixel; out-of-bounds coordinates are ignored.
    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba);

    fn clear(&mut self, color: Rgba) {
        for y in 0..self.height() {
            for x in 0..self.width() {
                self.set_pixel(x, y, color);
            }
        }
    }
}

/// An owned RGBA frame.
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Frame {
            width,
            height,
            pixels: vec![BLACK; (width as usize) * (height as usize)],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            image::Rgba(self.pixels[y as usize * self.width as usize + x as usize])
        })
    }
}

impl PixelBuffer for Frame {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x < self.width && y < self.height {
            self.pixels[y as usize * self.width as usize + x as usize] = color;
        }
    }

    fn clear(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }
}
