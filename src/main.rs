//! Demo binary: renders a single frame of an .obj model to an image file.

use std::{env, error::Error, fs, process};

use image::RgbaImage;
use meshview::math::Vec3;
use meshview::{render, wavefront, Camera, Frame, RenderOptions};

const WIDTH: u32 = 512;
const HEIGHT: u32 = 512;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    let model_path = args
        .next()
        .ok_or("usage: meshview <model.obj> [texture.png] [output.png]")?;
    let texture_path = args.next();
    let output_path = args.next().unwrap_or_else(|| "output.png".to_string());

    let source = fs::read_to_string(&model_path)?;
    let mut mesh = wavefront::parse(&source)?;
    mesh.normalize_vertices();

    let texture = match &texture_path {
        Some(path) => image::open(path)?.to_rgba8(),
        None => RgbaImage::from_pixel(1, 1, image::Rgba([211, 211, 211, 255])),
    };

    let mut camera = Camera::new(
        Vec3::new(0.0, 0.0, 2.5),
        Vec3::default(),
        60f32.to_radians(),
        1.0,
        0.1,
        100.0,
    );
    camera.set_aspect_ratio(WIDTH as f32 / HEIGHT as f32);

    let options = RenderOptions {
        use_texture: texture_path.is_some(),
        use_lighting: !mesh.normals.is_empty(),
        show_wireframe: false,
    };

    let mut frame = Frame::new(WIDTH, HEIGHT);
    render(&mut frame, &camera, Some(&mesh), &texture, options);
    frame.to_image().save(&output_path)?;
    Ok(())
}
