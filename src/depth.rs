//! Per-frame depth buffer. The single `test_and_set` operation is the only
//! visibility-resolution mechanism in the pipeline.

pub struct DepthBuffer {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl DepthBuffer {
    /// Allocates a buffer with every pixel at the maximum depth.
    pub fn new(width: u32, height: u32) -> Self {
        DepthBuffer {
            width,
            height,
            data: vec![f32::MAX; (width as usize) * (height as usize)],
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(f32::MAX);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns true and stores `depth` when it is strictly closer than the
    /// value already at `(x, y)`. Out-of-bounds coordinates always reject.
    pub fn test_and_set(&mut self, x: i32, y: i32, depth: f32) -> bool {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return false;
        }
        let idx = y as usize * self.width as usize + x as usize;
        if depth < self.data[idx] {
            self.data[idx] = depth;
            return true;
        }
        false
    }
}
