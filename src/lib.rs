//! A from-scratch software rendering pipeline for wavefront (.obj) meshes.
//!
//! The crate parses a text mesh description, positions it relative to an
//! orbit camera and rasterizes it into a pixel buffer with depth testing,
//! optional texture sampling and directional lighting. Everything runs on
//! the CPU, single threaded, one frame at a time.
//!
//! The windowing layer stays outside: it drives the [`Camera`] control
//! surface, implements [`PixelBuffer`] for its display surface and calls
//! [`render`] whenever it wants a fresh frame.

pub mod camera;
pub mod depth;
pub mod framebuffer;
pub mod math;
pub mod mesh;
pub mod rasterizer;
pub mod wireframe;

pub use camera::Camera;
pub use depth::DepthBuffer;
pub use framebuffer::{Frame, PixelBuffer, Rgba};
pub use mesh::wavefront::{self, ObjParseError};
pub use mesh::{Mesh, Polygon};
pub use rasterizer::{render, RenderOptions};
