//! Vector and matrix value types used throughout the pipeline.
//!
//! Matrices are row-major and points transform as row vectors, so a
//! combined transform reads left to right: `model * view * projection`.

use std::ops::{Add, Mul, Neg, Sub};

/// A 2D vector, also used for texture coordinates and screen positions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Vec2 { x, y }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Returns a unit-length copy; the zero vector normalizes to itself.
    pub fn normalized(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            return Vec2::default();
        }
        Vec2::new(self.x / len, self.y / len)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, scalar: f32) -> Vec2 {
        Vec2::new(self.x * scalar, self.y * scalar)
    }
}

/// A 3D vector for positions, normals and directions.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vec3 { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Returns a unit-length copy; the zero vector normalizes to itself.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len == 0.0 {
            return Vec3::default();
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, scalar: f32) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// A 4x4 row-major matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [f32; 16],
}

impl Default for Mat4 {
    fn default() -> Self {
        Mat4::identity()
    }
}

impl Mat4 {
    pub const fn identity() -> Self {
        Mat4 {
            m: [
                1.0, 0.0, 0.0, 0.0, //
                0.0, 1.0, 0.0, 0.0, //
                0.0, 0.0, 1.0, 0.0, //
                0.0, 0.0, 0.0, 1.0,
            ],
        }
    }

    pub const fn from_array(m: [f32; 16]) -> Self {
        Mat4 { m }
    }

    /// Matrix product `self * other`. Not commutative.
    pub fn multiply(&self, other: &Mat4) -> Mat4 {
        let mut result = [0.0f32; 16];
        for i in 0..4 {
            for j in 0..4 {
                let mut sum = 0.0;
                for k in 0..4 {
                    sum += self.m[i * 4 + k] * other.m[k * 4 + j];
                }
                result[i * 4 + j] = sum;
            }
        }
        Mat4 { m: result }
    }

    /// Transforms a point as a row vector with implicit `w = 1`.
    ///
    /// The homogeneous divide is skipped when the transformed `w` is 0 or 1,
    /// so affine matrices pass points through without a perspective divide.
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        let x = v.x * m[0] + v.y * m[4] + v.z * m[8] + m[12];
        let y = v.x * m[1] + v.y * m[5] + v.z * m[9] + m[13];
        let z = v.x * m[2] + v.y * m[6] + v.z * m[10] + m[14];
        let w = v.x * m[3] + v.y * m[7] + v.z * m[11] + m[15];

        if w == 0.0 || w == 1.0 {
            return Vec3::new(x, y, z);
        }
        Vec3::new(x / w, y / w, z / w)
    }

    pub const fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
        Mat4::from_array([
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            tx, ty, tz, 1.0,
        ])
    }

    pub const fn scale(sx: f32, sy: f32, sz: f32) -> Mat4 {
        Mat4::from_array([
            sx, 0.0, 0.0, 0.0, //
            0.0, sy, 0.0, 0.0, //
            0.0, 0.0, sz, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotation_x(angle: f32) -> Mat4 {
        let (sin, cos) = angle.sin_cos();
        Mat4::from_array([
            1.0, 0.0, 0.0, 0.0, //
            0.0, cos, sin, 0.0, //
            0.0, -sin, cos, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotation_y(angle: f32) -> Mat4 {
        let (sin, cos) = angle.sin_cos();
        Mat4::from_array([
            cos, 0.0, -sin, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            sin, 0.0, cos, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    pub fn rotation_z(angle: f32) -> Mat4 {
        let (sin, cos) = angle.sin_cos();
        Mat4::from_array([
            cos, sin, 0.0, 0.0, //
            -sin, cos, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ])
    }

    /// Right-handed look-at view matrix: the camera looks down its local -Z.
    ///
    /// Degenerate when the view direction is parallel to `up`; callers keep
    /// the camera pitch away from the poles.
    pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let z = (eye - target).normalized();
        let x = up.cross(z).normalized();
        let y = z.cross(x);

        Mat4::from_array([
            x.x, y.x, z.x, 0.0, //
            x.y, y.y, z.y, 0.0, //
            x.z, y.z, z.z, 0.0, //
            -x.dot(eye), -y.dot(eye), -z.dot(eye), 1.0,
        ])
    }

    /// Perspective projection from a vertical field of view in radians.
    ///
    /// `fov` must stay clear of 0 and pi; the camera clamps it upstream.
    pub fn perspective(fov: f32, aspect_ratio: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fov = (fov * 0.5).tan();
        let range = far - near;

        let mut m = [0.0f32; 16];
        m[0] = 1.0 / (aspect_ratio * tan_half_fov);
        m[5] = 1.0 / tan_half_fov;
        m[10] = -(far + near) / range;
        m[11] = -1.0;
        m[14] = -(2.0 * far * near) / range;
        Mat4::from_array(m)
    }
}
