use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::image::Image;

/// Color space of an 8-bit texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorSpace {
    /// Color data (albedo / base color maps).
    #[default]
    Srgb,
    /// Non-color data (bump, roughness, normal maps).
    Linear,
}

/// Content type tag of a loadable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// An 8-bit texture (JPEG / PNG).
    Texture(ColorSpace),
    /// An equirectangular HDR panorama, decoded to half floats.
    EnvironmentMap,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Texture(ColorSpace::Srgb) => f.write_str("texture (sRGB)"),
            Self::Texture(ColorSpace::Linear) => f.write_str("texture (linear)"),
            Self::EnvironmentMap => f.write_str("environment map"),
        }
    }
}

/// A source path paired with the kind it should be decoded as.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub path: String,
    pub kind: ResourceKind,
}

impl ResourceRequest {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    #[must_use]
    pub fn texture(path: impl Into<String>, color_space: ColorSpace) -> Self {
        Self::new(path, ResourceKind::Texture(color_space))
    }

    #[must_use]
    pub fn environment_map(path: impl Into<String>) -> Self {
        Self::new(path, ResourceKind::EnvironmentMap)
    }
}

/// A successfully loaded and decoded resource.
#[derive(Debug, Clone)]
pub struct Resource {
    pub path: String,
    pub kind: ResourceKind,
    pub image: Arc<Image>,
}
