//! Orbit camera: position + look-at target with pan, orbit, zoom and
//! field-of-view controls. The windowing layer drives these operations and
//! reads the view/projection matrices back each frame.

use crate::math::{Mat4, Vec3};

const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const MIN_FOV: f32 = 0.1;
const MAX_FOV: f32 = 3.0;
const MIN_DISTANCE: f32 = 0.1;
const MAX_DISTANCE_FACTOR: f32 = 5.0;
// keep pitch off the poles so the look-at up vector never degenerates
const PITCH_MARGIN: f32 = 0.1;
const DEFAULT_FOV: f32 = std::f32::consts::PI / 3.0; // 60 degrees

#[derive(Debug, Clone)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    fov: f32,
    aspect_ratio: f32,
    near_plane: f32,
    far_plane: f32,
    // orbit distance at construction, bounds zoom and is restored by reset
    default_distance: f32,
}

impl Camera {
    pub fn new(
        position: Vec3,
        target: Vec3,
        fov: f32,
        aspect_ratio: f32,
        near_plane: f32,
        far_plane: f32,
    ) -> Self {
        Camera {
            position,
            target,
            fov: fov.clamp(MIN_FOV, MAX_FOV),
            aspect_ratio,
            near_plane,
            far_plane,
            default_distance: (position - target).length(),
        }
    }

    /// Translates position and target together (pure pan).
    pub fn move_by(&mut self, translation: Vec3) {
        self.position = self.position + translation;
        self.target = self.target + translation;
    }

    /// Rotates the camera on a sphere around the target.
    ///
    /// Pitch is clamped short of the poles to avoid gimbal-lock flips.
    /// A zero-delta orbit leaves the camera exactly where it was.
    pub fn orbit(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let relative = self.position - self.target;
        let radius = relative.length();
        if radius == 0.0 {
            return;
        }

        let mut theta = relative.x.atan2(relative.z);
        let mut phi = (relative.y / radius).asin();

        theta += delta_yaw;
        phi += delta_pitch;

        let phi_limit = std::f32::consts::FRAC_PI_2 - PITCH_MARGIN;
        phi = phi.clamp(-phi_limit, phi_limit);

        let offset = Vec3::new(
            radius * phi.cos() * theta.sin(),
            radius * phi.sin(),
            radius * phi.cos() * theta.cos(),
        );
        self.position = self.target + offset;
    }

    /// Moves the camera along the view direction. The distance to the
    /// target stays within [0.1, 5 x the construction-time distance].
    pub fn zoom(&mut self, delta: f32) {
        let direction = (self.target - self.position).normalized();
        let mut distance = self.distance_from_target() + delta;
        distance = distance.clamp(MIN_DISTANCE, self.default_distance * MAX_DISTANCE_FACTOR);
        self.position = self.target - direction * distance;
    }

    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(MIN_FOV, MAX_FOV);
    }

    /// Restores the construction-time orbit distance and a 60 degree field
    /// of view, preserving the current target and view direction.
    pub fn reset(&mut self) {
        let direction = (self.target - self.position).normalized();
        self.position = self.target - direction * self.default_distance;
        self.fov = DEFAULT_FOV;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Updated every frame by the display layer from the viewport size.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn distance_from_target(&self) -> f32 {
        (self.position - self.target).length()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.position, self.target, UP)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective(self.fov, self.aspect_ratio, self.near_plane, self.far_plane)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn camera() -> Camera {
        Camera::new(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::default(),
            DEFAULT_FOV,
            1.0,
            0.1,
            100.0,
        )
    }

    fn vectors_close(a: Vec3, b: Vec3) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-4);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-4);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-4);
    }

    #[test]
    fn zero_delta_orbit_is_idempotent() {
        let mut cam = Camera::new(
            Vec3::new(3.0, 2.0, 7.0),
            Vec3::new(1.0, 0.5, -1.0),
            1.0,
            1.0,
            0.1,
            100.0,
        );
        let position = cam.position();
        let target = cam.target();
        for _ in 0..10 {
            cam.orbit(0.0, 0.0);
        }
        vectors_close(cam.position(), position);
        vectors_close(cam.target(), target);
    }

    #[test]
    fn orbit_preserves_the_radius() {
        let mut cam = camera();
        cam.orbit(0.8, 0.3);
        assert_relative_eq!(cam.distance_from_target(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn orbit_pitch_is_clamped_off_the_poles() {
        let mut cam = camera();
        cam.orbit(0.0, 10.0);
        let relative = cam.position() - cam.target();
        let phi = (relative.y / relative.length()).asin();
        assert!(phi <= std::f32::consts::FRAC_PI_2 - PITCH_MARGIN + 1e-4);
    }

    #[test]
    fn move_translates_position_and_target_together() {
        let mut cam = camera();
        cam.move_by(Vec3::new(1.0, -2.0, 3.0));
        vectors_close(cam.position(), Vec3::new(1.0, -2.0, 13.0));
        vectors_close(cam.target(), Vec3::new(1.0, -2.0, 3.0));
    }

    #[test]
    fn zoom_clamps_to_distance_bounds() {
        let mut cam = camera();
        cam.zoom(-100.0);
        assert_relative_eq!(cam.distance_from_target(), MIN_DISTANCE, epsilon = 1e-5);
        cam.zoom(1000.0);
        assert_relative_eq!(cam.distance_from_target(), 50.0, epsilon = 1e-3);
    }

    #[test]
    fn fov_is_clamped_on_construction_and_set() {
        let mut cam = Camera::new(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::default(),
            99.0,
            1.0,
            0.1,
            100.0,
        );
        assert_relative_eq!(cam.fov(), MAX_FOV);
        cam.set_fov(0.0);
        assert_relative_eq!(cam.fov(), MIN_FOV);
        cam.set_fov(1.2);
        assert_relative_eq!(cam.fov(), 1.2);
    }

    #[test]
    fn reset_restores_distance_and_fov_but_keeps_target() {
        let mut cam = camera();
        cam.zoom(-5.0);
        cam.set_fov(2.5);
        cam.reset();
        assert_relative_eq!(cam.distance_from_target(), 10.0, epsilon = 1e-4);
        assert_relative_eq!(cam.fov(), DEFAULT_FOV);
        vectors_close(cam.target(), Vec3::default());
    }
}
