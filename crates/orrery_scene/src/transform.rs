use glam::{Affine3A, EulerRot, Mat3, Quat, Vec3};

/// Local TRS transform with cached local and world matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    pub(crate) local_matrix: Affine3A,
    pub(crate) world_matrix: Affine3A,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            local_matrix: Affine3A::IDENTITY,
            world_matrix: Affine3A::IDENTITY,
        }
    }

    #[must_use]
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::new()
        }
    }

    /// Recomputes the local matrix from the TRS fields.
    pub fn update_local_matrix(&mut self) {
        self.local_matrix =
            Affine3A::from_scale_rotation_translation(self.scale, self.rotation, self.position);
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.rotation = Quat::from_euler(EulerRot::XYZ, x, y, z);
    }

    /// Rotates in place around the local Y axis.
    pub fn rotate_y(&mut self, angle: f32) {
        self.rotation *= Quat::from_rotation_y(angle);
    }

    /// Orients -Z towards `target` (camera convention).
    ///
    /// `target` and `up` are expressed in the parent space. Degenerate
    /// configurations (target on the up axis through the position) keep the
    /// previous rotation.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward == Vec3::ZERO || forward.cross(up).length_squared() < 1e-8 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();
        self.rotation = Quat::from_mat3(&Mat3::from_cols(right, new_up, -forward));
    }

    #[inline]
    #[must_use]
    pub fn world_position(&self) -> Vec3 {
        Vec3::from(self.world_matrix.translation)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
