//! The per-frame rasterization pipeline.
//!
//! One `render` call runs the whole frame to completion: clear, assemble
//! the model-view-projection matrix once, then fan-triangulate every
//! polygon and scan-fill each triangle with barycentric edge functions,
//! gated by a frame-scoped depth buffer. There is no clipping beyond the
//! screen-bound clamp and no acceleration structure; this is a
//! straightforward per-triangle scan-and-fill rasterizer.

use image::RgbaImage;
use log::debug;

use crate::camera::Camera;
use crate::depth::DepthBuffer;
use crate::framebuffer::{PixelBuffer, Rgba, BLACK, WHITE};
use crate::math::{Mat4, Vec2, Vec3};
use crate::mesh::{Mesh, Polygon};
use crate::wireframe;

/// Fill color for triangles without texture data.
const BASE_COLOR: Rgba = [211, 211, 211, 255];
/// Fixed directional light, normalized at render time.
const LIGHT_DIRECTION: Vec3 = Vec3::new(0.3, 0.5, -0.8);
/// Diffuse floor so unlit faces are never fully black.
const AMBIENT_LIGHT: f32 = 0.2;
/// Triangles with a signed screen area below this are skipped.
const DEGENERATE_AREA: f32 = 1e-6;

#[derive(Debug, Default, Clone, Copy)]
pub struct RenderOptions {
    pub use_texture: bool,
    pub use_lighting: bool,
    pub show_wireframe: bool,
}

/// Renders one frame of `mesh` as seen by `camera` into `target`.
///
/// An absent mesh or an empty target renders nothing; triangles missing
/// texture or normal data fall back to the untextured/unlit path on their
/// own, so a partially malformed mesh still draws everything it can.
pub fn render<P: PixelBuffer>(
    target: &mut P,
    camera: &Camera,
    mesh: Option<&Mesh>,
    texture: &RgbaImage,
    options: RenderOptions,
) {
    let width = target.width();
    let height = target.height();
    if width == 0 || height == 0 {
        return;
    }
    let Some(mesh) = mesh else {
        return;
    };

    target.clear(BLACK);
    let mut depth = DepthBuffer::new(width, height);

    // assembled once per frame, not per vertex
    let model = Mat4::identity();
    let mvp = model
        .multiply(&camera.view_matrix())
        .multiply(&camera.projection_matrix());
    let light = LIGHT_DIRECTION.normalized();

    let mut fragments = 0usize;
    for polygon in &mesh.polygons {
        for triangle in polygon.triangulate() {
            fragments += render_triangle(target, &mut depth, mesh, &triangle, &mvp, texture, light, options);
        }
    }
    debug!("rasterized {fragments} fragments into a {width}x{height} frame");
}

/// Transforms one triangle to screen space and fills it. Returns the
/// number of fragments written.
#[allow(clippy::too_many_arguments)]
fn render_triangle<P: PixelBuffer>(
    target: &mut P,
    depth: &mut DepthBuffer,
    mesh: &Mesh,
    triangle: &Polygon,
    mvp: &Mat4,
    texture: &RgbaImage,
    light: Vec3,
    options: RenderOptions,
) -> usize {
    if triangle.vertex_count() != 3 {
        return 0;
    }

    let width = target.width() as f32;
    let height = target.height() as f32;

    let mut screen = [Vec2::default(); 3];
    let mut depths = [0.0f32; 3];
    for i in 0..3 {
        // indices are validated against the live mesh here; a stale
        // reference silently drops the triangle
        let Some(&v) = mesh.positions.get(triangle.vertex_indices[i]) else {
            return 0;
        };
        let clip = mvp.transform_point(v);
        // ndc [-1,1] to raster coordinates, y inverted for the top-left origin
        screen[i] = Vec2::new(
            (clip.x + 1.0) * 0.5 * width,
            (1.0 - clip.y) * 0.5 * height,
        );
        depths[i] = clip.z;
    }

    let uvs = if options.use_texture && triangle.has_texture() {
        gather3(&mesh.tex_coords, &triangle.texture_indices)
    } else {
        None
    };
    let normals = if options.use_lighting && triangle.has_normals() {
        gather3(&mesh.normals, &triangle.normal_indices)
    } else {
        None
    };

    let fragments = fill_triangle(target, depth, screen, depths, uvs, normals, texture, light);

    if options.show_wireframe {
        let points = [
            (screen[0].x as i32, screen[0].y as i32),
            (screen[1].x as i32, screen[1].y as i32),
            (screen[2].x as i32, screen[2].y as i32),
        ];
        wireframe::draw_triangle_edges(target, points, WHITE);
    }
    fragments
}

fn gather3<T: Copy>(source: &[T], indices: &[usize]) -> Option<[T; 3]> {
    Some([
        *source.get(*indices.first()?)?,
        *source.get(*indices.get(1)?)?,
        *source.get(*indices.get(2)?)?,
    ])
}

/// Scan-fills a screen-space triangle over its clamped bounding box.
///
/// Pixel centers with all three barycentric weights non-negative are
/// inside; this is a simple inclusive test, so ties on shared edges may
/// double-shade. Returns the number of fragments that passed the depth
/// test and were written.
#[allow(clippy::too_many_arguments)]
fn fill_triangle<P: PixelBuffer>(
    target: &mut P,
    depth: &mut DepthBuffer,
    screen: [Vec2; 3],
    depths: [f32; 3],
    uvs: Option<[Vec2; 3]>,
    normals: Option<[Vec3; 3]>,
    texture: &RgbaImage,
    light: Vec3,
) -> usize {
    let area = edge_function(screen[0], screen[1], screen[2]);
    if area.abs() < DEGENERATE_AREA {
        return 0;
    }

    let max_x_bound = target.width() as i32 - 1;
    let max_y_bound = target.height() as i32 - 1;
    let xs = [screen[0].x, screen[1].x, screen[2].x];
    let ys = [screen[0].y, screen[1].y, screen[2].y];
    let min_x = (xs.iter().fold(f32::MAX, |a, &b| a.min(b)).floor() as i32).max(0);
    let max_x = (xs.iter().fold(f32::MIN, |a, &b| a.max(b)).ceil() as i32).min(max_x_bound);
    let min_y = (ys.iter().fold(f32::MAX, |a, &b| a.min(b)).floor() as i32).max(0);
    let max_y = (ys.iter().fold(f32::MIN, |a, &b| a.max(b)).ceil() as i32).min(max_y_bound);
    if min_x > max_x || min_y > max_y {
        return 0;
    }

    let mut fragments = 0;
    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
            let w0 = edge_function(screen[1], screen[2], p) / area;
            let w1 = edge_function(screen[2], screen[0], p) / area;
            let w2 = edge_function(screen[0], screen[1], p) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }

            let z = w0 * depths[0] + w1 * depths[1] + w2 * depths[2];
            if depth.test_and_set(x, y, z) {
                let color = shade([w0, w1, w2], uvs, normals, texture, light);
                target.set_pixel(x as u32, y as u32, color);
                fragments += 1;
            }
        }
    }
    fragments
}

/// Computes a fragment color from interpolated attributes: sampled texel
/// (or the neutral base color) scaled by the diffuse term.
fn shade(
    weights: [f32; 3],
    uvs: Option<[Vec2; 3]>,
    normals: Option<[Vec3; 3]>,
    texture: &RgbaImage,
    light: Vec3,
) -> Rgba {
    let [w0, w1, w2] = weights;

    let mut color = match uvs {
        Some(uv) => {
            let u = w0 * uv[0].x + w1 * uv[1].x + w2 * uv[2].x;
            let v = w0 * uv[0].y + w1 * uv[1].y + w2 * uv[2].y;
            sample_texture(texture, u, v)
        }
        None => BASE_COLOR,
    };

    if let Some(n) = normals {
        let normal = (n[0] * w0 + n[1] * w1 + n[2] * w2).normalized();
        let diffuse = normal.dot(light).max(AMBIENT_LIGHT);
        for channel in &mut color[..3] {
            *channel = (*channel as f32 * diffuse) as u8;
        }
    }
    color
}

/// Nearest-texel sample with the V axis inverted and clamped to the
/// texture bounds.
fn sample_texture(texture: &RgbaImage, u: f32, v: f32) -> Rgba {
    let (tw, th) = texture.dimensions();
    if tw == 0 || th == 0 {
        return BASE_COLOR;
    }
    let tx = (u * (tw - 1) as f32).clamp(0.0, (tw - 1) as f32) as u32;
    let ty = ((1.0 - v) * (th - 1) as f32).clamp(0.0, (th - 1) as f32) as u32;
    texture.get_pixel(tx, ty).0
}

/// Signed double area of `abc`; the sign tells which side of the directed
/// edge `ab` the point `c` lies on.
fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::Frame;

    fn white_texture() -> RgbaImage {
        RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]))
    }

    fn count_shaded(frame: &Frame) -> usize {
        let mut count = 0;
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                if frame.pixel(x, y) != Some(BLACK) {
                    count += 1;
                }
            }
        }
        count
    }

    fn covering_triangle() -> [Vec2; 3] {
        // encloses every pixel center of a 10x10 frame
        [
            Vec2::new(-20.0, -20.0),
            Vec2::new(-20.0, 40.0),
            Vec2::new(40.0, -20.0),
        ]
    }

    #[test]
    fn full_frame_triangle_shades_every_pixel() {
        let mut frame = Frame::new(10, 10);
        let mut depth = DepthBuffer::new(10, 10);
        let texture = white_texture();
        let light = LIGHT_DIRECTION.normalized();

        let fragments = fill_triangle(
            &mut frame,
            &mut depth,
            covering_triangle(),
            [1.0; 3],
            None,
            None,
            &texture,
            light,
        );
        assert_eq!(fragments, 100);
        assert_eq!(count_shaded(&frame), 100);
    }

    #[test]
    fn depth_test_rejects_farther_fragments() {
        let mut frame = Frame::new(10, 10);
        let mut depth = DepthBuffer::new(10, 10);
        let texture = white_texture();
        let light = LIGHT_DIRECTION.normalized();

        let near = fill_triangle(
            &mut frame,
            &mut depth,
            covering_triangle(),
            [3.0; 3],
            None,
            None,
            &texture,
            light,
        );
        assert_eq!(near, 100);

        // same footprint, farther away: every fragment is rejected
        let far = fill_triangle(
            &mut frame,
            &mut depth,
            covering_triangle(),
            [5.0; 3],
            None,
            None,
            &texture,
            light,
        );
        assert_eq!(far, 0);
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let mut frame = Frame::new(10, 10);
        let mut depth = DepthBuffer::new(10, 10);
        let colinear = [
            Vec2::new(1.0, 1.0),
            Vec2::new(4.0, 4.0),
            Vec2::new(8.0, 8.0),
        ];
        let fragments = fill_triangle(
            &mut frame,
            &mut depth,
            colinear,
            [1.0; 3],
            None,
            None,
            &white_texture(),
            LIGHT_DIRECTION.normalized(),
        );
        assert_eq!(fragments, 0);
    }

    #[test]
    fn lighting_applies_the_ambient_floor() {
        let texture = white_texture();
        let light = LIGHT_DIRECTION.normalized();
        // normal facing straight away from the light
        let normals = Some([-light; 3]);
        let color = shade([1.0, 0.0, 0.0], None, normals, &texture, light);
        let expected = (BASE_COLOR[0] as f32 * AMBIENT_LIGHT) as u8;
        assert_eq!(color[0], expected);
        assert_eq!(color[3], 255);
    }

    #[test]
    fn texture_sampling_inverts_v_and_clamps() {
        let mut texture = RgbaImage::new(2, 2);
        texture.put_pixel(0, 0, image::Rgba([255, 0, 0, 255])); // top-left
        texture.put_pixel(0, 1, image::Rgba([0, 0, 255, 255])); // bottom-left
        // v = 1 is the top row of the texture
        assert_eq!(sample_texture(&texture, 0.0, 1.0), [255, 0, 0, 255]);
        assert_eq!(sample_texture(&texture, 0.0, 0.0), [0, 0, 255, 255]);
        // out-of-range coordinates clamp instead of wrapping
        assert_eq!(sample_texture(&texture, -5.0, 2.0), [255, 0, 0, 255]);
    }

    fn single_triangle_mesh() -> Mesh {
        Mesh {
            positions: vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            polygons: vec![Polygon {
                vertex_indices: vec![0, 1, 2],
                ..Polygon::default()
            }],
            ..Mesh::default()
        }
    }

    fn test_camera() -> Camera {
        Camera::new(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::default(),
            std::f32::consts::PI / 3.0,
            1.0,
            0.1,
            100.0,
        )
    }

    #[test]
    fn render_paints_a_projected_triangle() {
        let mut frame = Frame::new(50, 50);
        render(
            &mut frame,
            &test_camera(),
            Some(&single_triangle_mesh()),
            &white_texture(),
            RenderOptions::default(),
        );
        assert!(count_shaded(&frame) > 0);
        // the center of the frame is inside the triangle
        assert_eq!(frame.pixel(25, 25), Some(BASE_COLOR));
        // the corners are outside it
        assert_eq!(frame.pixel(0, 0), Some(BLACK));
        assert_eq!(frame.pixel(49, 49), Some(BLACK));
    }

    #[test]
    fn absent_mesh_renders_nothing() {
        let mut frame = Frame::new(8, 8);
        render(
            &mut frame,
            &test_camera(),
            None,
            &white_texture(),
            RenderOptions::default(),
        );
        assert_eq!(count_shaded(&frame), 0);
    }

    #[test]
    fn empty_target_is_a_noop() {
        let mut frame = Frame::new(0, 0);
        render(
            &mut frame,
            &test_camera(),
            Some(&single_triangle_mesh()),
            &white_texture(),
            RenderOptions::default(),
        );
    }

    #[test]
    fn stale_indices_drop_the_triangle_only() {
        let mut mesh = single_triangle_mesh();
        mesh.polygons.push(Polygon {
            vertex_indices: vec![0, 1, 99],
            ..Polygon::default()
        });
        let mut frame = Frame::new(50, 50);
        render(
            &mut frame,
            &test_camera(),
            Some(&mesh),
            &white_texture(),
            RenderOptions::default(),
        );
        // the valid triangle still draws
        assert_eq!(frame.pixel(25, 25), Some(BASE_COLOR));
    }

    #[test]
    fn wireframe_overlay_draws_edges() {
        let mut frame = Frame::new(50, 50);
        render(
            &mut frame,
            &test_camera(),
            Some(&single_triangle_mesh()),
            &white_texture(),
            RenderOptions {
                show_wireframe: true,
                ..RenderOptions::default()
            },
        );
        let white_pixels = (0..50)
            .flat_map(|y| (0..50).map(move |x| (x, y)))
            .filter(|&(x, y)| frame.pixel(x, y) == Some(WHITE))
            .count();
        assert!(white_pixels > 0);
    }
}
