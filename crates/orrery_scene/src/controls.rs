use std::f32::consts::PI;

use glam::{Vec2, Vec3};
use orrery_core::{Input, MouseButton};

use crate::scene::NodeHandle;

const EPS: f32 = 0.0001;
const TARGET_FPS: f32 = 60.0;

/// Orbit camera rig.
///
/// The rig keeps a spherical offset (`radius`, `theta`, `phi`) from `target`
/// and rewrites the transform of the camera node it is bound to on every
/// tick. Left drag rotates, right drag pans, the wheel zooms. With damping
/// enabled the accumulated rotation decays over several ticks, so `update`
/// must keep being called even when there is no input.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub camera: NodeHandle,

    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub damping_factor: f32,
    pub enable_damping: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    pub target: Vec3,
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,

    rotate_delta: Vec2,
}

impl OrbitControls {
    /// Creates a rig that starts exactly at `camera_position` looking at `target`.
    #[must_use]
    pub fn new(camera: NodeHandle, target: Vec3, camera_position: Vec3) -> Self {
        let offset = camera_position - target;
        let radius = offset.length().max(EPS);
        Self {
            camera,
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            pan_speed: 1.0,
            damping_factor: 0.05,
            enable_damping: false,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,

            target,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),

            rotate_delta: Vec2::ZERO,
        }
    }

    /// Remaining rotation that damping has not applied yet.
    #[must_use]
    pub fn pending_rotation(&self) -> Vec2 {
        self.rotate_delta
    }

    /// Queues a rotation in radians (x: azimuth, y: polar).
    pub fn rotate(&mut self, delta: Vec2) {
        self.rotate_delta += delta;
    }

    /// Advances the rig by one tick and returns the new camera position.
    pub fn update(&mut self, input: &Input, fov_degrees: f32, dt: f32) -> Vec3 {
        let screen_height = input.screen_size().y.max(1.0);

        if input.is_button_pressed(MouseButton::Left) {
            let rotate_per_pixel = 2.0 * PI / screen_height;
            self.rotate_delta -= input.mouse_delta() * rotate_per_pixel * self.rotate_speed;
        }

        if self.enable_damping {
            let retention = (1.0 - self.damping_factor).powf(dt * TARGET_FPS);
            let applied = self.rotate_delta * (1.0 - retention);
            self.theta += applied.x;
            self.phi += applied.y;
            self.rotate_delta *= retention;
        } else {
            self.theta += self.rotate_delta.x;
            self.phi += self.rotate_delta.y;
            self.rotate_delta = Vec2::ZERO;
        }

        let min_phi = self.min_polar_angle.max(EPS);
        let max_phi = self.max_polar_angle.min(PI - EPS).max(min_phi);
        self.phi = self.phi.clamp(min_phi, max_phi);

        let scroll = input.scroll_delta().y;
        if scroll != 0.0 {
            let scale = (1.0 - self.zoom_speed).powf(scroll.abs());
            if scroll > 0.0 {
                self.radius *= scale;
            } else {
                self.radius /= scale;
            }
        }
        self.radius = self.radius.clamp(self.min_distance.max(EPS), self.max_distance);

        if input.is_button_pressed(MouseButton::Right) {
            let half_fov = fov_degrees.to_radians() / 2.0;
            let world_height = 2.0 * self.radius * half_fov.tan();
            let pixels_to_world = world_height / screen_height;

            let forward = -self.direction();
            let right = forward.cross(Vec3::Y).normalize_or_zero();
            let up = right.cross(forward).normalize_or_zero();

            let delta = input.mouse_delta();
            self.target += (right * -delta.x + up * delta.y) * pixels_to_world * self.pan_speed;
        }

        self.position()
    }

    /// Current camera position implied by the spherical state.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.target + self.direction() * self.radius
    }

    fn direction(&self) -> Vec3 {
        let (sin_phi, cos_phi) = self.phi.sin_cos();
        let (sin_theta, cos_theta) = self.theta.sin_cos();
        Vec3::new(sin_phi * sin_theta, cos_phi, sin_phi * cos_theta)
    }
}
