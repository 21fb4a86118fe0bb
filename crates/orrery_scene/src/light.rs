use glam::{UVec2, Vec3};

/// Orthographic shadow frustum of a directional light, in light space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowCamera {
    pub near: f32,
    pub far: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for ShadowCamera {
    fn default() -> Self {
        Self {
            near: 0.5,
            far: 500.0,
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShadowConfig {
    pub map_size: UVec2,
    pub bias: f32,
    pub normal_bias: f32,
    pub camera: ShadowCamera,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            map_size: UVec2::splat(512),
            bias: 0.0,
            normal_bias: 0.0,
            camera: ShadowCamera::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Parallel rays travelling from the node position towards `target`.
    Directional { target: Vec3 },
    Point { range: f32 },
    Ambient,
}

/// Light component. `color` is linear.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
    pub kind: LightKind,
    pub cast_shadows: bool,
    pub shadow: Option<ShadowConfig>,
}

impl Light {
    #[must_use]
    pub fn new_directional(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Directional { target: Vec3::ZERO },
            cast_shadows: false,
            shadow: None,
        }
    }

    #[must_use]
    pub fn new_point(color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Point { range },
            cast_shadows: false,
            shadow: None,
        }
    }

    #[must_use]
    pub fn new_ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            kind: LightKind::Ambient,
            cast_shadows: false,
            shadow: None,
        }
    }

    /// Enables shadow casting with the given map and frustum.
    #[must_use]
    pub fn with_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.cast_shadows = true;
        self.shadow = Some(shadow);
        self
    }
}
