//! Image-based lighting and background configuration of a scene.

use std::sync::Arc;

use glam::Vec3;
use orrery_resources::Image;

/// Projects the background panorama onto a ground disc instead of infinity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProjection {
    pub height: f32,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Background {
    /// Transparent / cleared by the backend.
    #[default]
    None,
    /// Solid linear color.
    Color(Vec3),
    /// An equirectangular panorama.
    EnvironmentMap {
        map: Arc<Image>,
        ground: Option<GroundProjection>,
    },
}

/// A loaded environment contribution, applied as one unit.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentLayer {
    /// Lights and reflects on every physical material.
    Lighting { map: Arc<Image>, intensity: f32 },
    /// Only shown behind the scene.
    Background {
        map: Arc<Image>,
        ground: Option<GroundProjection>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    /// Panorama used for image-based lighting
    pub lighting_map: Option<Arc<Image>>,
    /// Lighting intensity
    pub intensity: f32,
    /// Flat ambient term added on top of image-based lighting
    pub ambient_color: Vec3,
    pub background: Background,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lighting_map: None,
            intensity: 1.0,
            ambient_color: Vec3::ZERO,
            background: Background::None,
        }
    }

    pub fn apply(&mut self, layer: EnvironmentLayer) {
        match layer {
            EnvironmentLayer::Lighting { map, intensity } => {
                self.lighting_map = Some(map);
                self.intensity = intensity;
            }
            EnvironmentLayer::Background { map, ground } => {
                self.background = Background::EnvironmentMap { map, ground };
            }
        }
    }

    #[must_use]
    pub fn has_lighting_map(&self) -> bool {
        self.lighting_map.is_some()
    }
}
