//! Physical material descriptors
//!
//! A material goes through two stages:
//!
//! 1. [`PhysicalMaterialDescriptor`] declares which texture channels it needs
//!    and where each one comes from, plus the scalar tuning parameters.
//! 2. [`PhysicalMaterial`] is produced by [`PhysicalMaterialDescriptor::resolve`]
//!    only once every declared channel has decoded data.
//!
//! Meshes only accept the resolved form, so a partially textured material can
//! never reach the scene graph.

use std::sync::Arc;

use glam::{Vec2, Vec3};
use orrery_core::AssetError;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::image::Image;
use crate::resource::{ColorSpace, ResourceKind, ResourceRequest};

/// Named texture slots of the physical material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextureChannel {
    Map,
    BumpMap,
    NormalMap,
    RoughnessMap,
    MetalnessMap,
    EmissiveMap,
    AoMap,
    EnvMap,
}

impl TextureChannel {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::BumpMap => "bumpMap",
            Self::NormalMap => "normalMap",
            Self::RoughnessMap => "roughnessMap",
            Self::MetalnessMap => "metalnessMap",
            Self::EmissiveMap => "emissiveMap",
            Self::AoMap => "aoMap",
            Self::EnvMap => "envMap",
        }
    }

    /// How the source of this channel has to be decoded.
    ///
    /// Color-carrying maps are sRGB, data maps are linear and the
    /// environment slot takes an HDR panorama.
    #[must_use]
    pub const fn resource_kind(self) -> ResourceKind {
        match self {
            Self::Map | Self::EmissiveMap => ResourceKind::Texture(ColorSpace::Srgb),
            Self::EnvMap => ResourceKind::EnvironmentMap,
            Self::BumpMap
            | Self::NormalMap
            | Self::RoughnessMap
            | Self::MetalnessMap
            | Self::AoMap => ResourceKind::Texture(ColorSpace::Linear),
        }
    }
}

/// Which faces of a mesh are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

/// Scalar tuning parameters of the physical material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalParams {
    /// Linear base color.
    pub color: Vec3,
    pub roughness: f32,
    pub metalness: f32,
    pub bump_scale: f32,
    pub normal_scale: Vec2,
    pub env_map_intensity: f32,
    pub sheen: f32,
    pub sheen_roughness: f32,
    /// Linear sheen tint.
    pub sheen_color: Vec3,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub emissive: Vec3,
    pub emissive_intensity: f32,
    pub opacity: f32,
    pub transparent: bool,
    pub side: Side,
}

impl Default for PhysicalParams {
    fn default() -> Self {
        Self {
            color: Vec3::ONE,
            roughness: 1.0,
            metalness: 0.0,
            bump_scale: 1.0,
            normal_scale: Vec2::ONE,
            env_map_intensity: 1.0,
            sheen: 0.0,
            sheen_roughness: 1.0,
            sheen_color: Vec3::ZERO,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            emissive: Vec3::ZERO,
            emissive_intensity: 1.0,
            opacity: 1.0,
            transparent: false,
            side: Side::Front,
        }
    }
}

/// Converts an sRGB-encoded color to linear, matching `Color::convertSRGBToLinear`.
#[must_use]
pub fn srgb_to_linear(color: Vec3) -> Vec3 {
    fn channel(c: f32) -> f32 {
        if c < 0.04045 {
            c * 0.077_399_38
        } else {
            (c * 0.947_867_3 + 0.052_132_7).powf(2.4)
        }
    }
    Vec3::new(channel(color.x), channel(color.y), channel(color.z))
}

/// Parses `#rrggbb` into an sRGB color in `[0, 1]`.
#[must_use]
pub fn parse_hex_color(hex: &str) -> Option<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    let value = u32::from_str_radix(digits, 16).ok()?;
    let r = ((value >> 16) & 0xff) as f32 / 255.0;
    let g = ((value >> 8) & 0xff) as f32 / 255.0;
    let b = (value & 0xff) as f32 / 255.0;
    Some(Vec3::new(r, g, b))
}

/// A physical material whose textures are still described by source path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalMaterialDescriptor {
    pub params: PhysicalParams,
    channels: SmallVec<[(TextureChannel, String); 4]>,
}

impl PhysicalMaterialDescriptor {
    #[must_use]
    pub fn new(params: PhysicalParams) -> Self {
        Self {
            params,
            channels: SmallVec::new(),
        }
    }

    /// Declares (or redeclares) the source of a channel.
    #[must_use]
    pub fn with_channel(mut self, channel: TextureChannel, path: impl Into<String>) -> Self {
        let path = path.into();
        if let Some(slot) = self.channels.iter_mut().find(|(c, _)| *c == channel) {
            slot.1 = path;
        } else {
            self.channels.push((channel, path));
        }
        self
    }

    #[must_use]
    pub fn map(self, path: impl Into<String>) -> Self {
        self.with_channel(TextureChannel::Map, path)
    }

    #[must_use]
    pub fn bump_map(self, path: impl Into<String>) -> Self {
        self.with_channel(TextureChannel::BumpMap, path)
    }

    #[must_use]
    pub fn normal_map(self, path: impl Into<String>) -> Self {
        self.with_channel(TextureChannel::NormalMap, path)
    }

    #[must_use]
    pub fn emissive_map(self, path: impl Into<String>) -> Self {
        self.with_channel(TextureChannel::EmissiveMap, path)
    }

    #[must_use]
    pub fn roughness_map(self, path: impl Into<String>) -> Self {
        self.with_channel(TextureChannel::RoughnessMap, path)
    }

    #[must_use]
    pub fn env_map(self, path: impl Into<String>) -> Self {
        self.with_channel(TextureChannel::EnvMap, path)
    }

    /// Declared channels in declaration order.
    pub fn channels(&self) -> impl Iterator<Item = (TextureChannel, &str)> {
        self.channels.iter().map(|(c, p)| (*c, p.as_str()))
    }

    /// The deduplicated set of loads needed before this material can resolve.
    #[must_use]
    pub fn requests(&self) -> Vec<ResourceRequest> {
        let mut requests: Vec<ResourceRequest> = Vec::with_capacity(self.channels.len());
        for (channel, path) in &self.channels {
            let request = ResourceRequest::new(path.clone(), channel.resource_kind());
            if !requests.contains(&request) {
                requests.push(request);
            }
        }
        requests
    }

    /// Binds decoded data to every declared channel.
    ///
    /// Fails with [`AssetError::MissingChannel`] if `lookup` cannot supply any
    /// one of them; no partially bound material is ever returned.
    pub fn resolve<F>(&self, mut lookup: F) -> Result<PhysicalMaterial, AssetError>
    where
        F: FnMut(&ResourceRequest) -> Option<Arc<Image>>,
    {
        let mut textures = SmallVec::with_capacity(self.channels.len());
        for (channel, path) in &self.channels {
            let request = ResourceRequest::new(path.clone(), channel.resource_kind());
            let image = lookup(&request).ok_or_else(|| AssetError::MissingChannel {
                channel: channel.name(),
                path: path.clone(),
            })?;
            textures.push((*channel, image));
        }
        Ok(PhysicalMaterial {
            params: self.params.clone(),
            textures,
        })
    }
}

/// A physical material with every declared channel bound to decoded data.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalMaterial {
    pub params: PhysicalParams,
    textures: SmallVec<[(TextureChannel, Arc<Image>); 4]>,
}

impl PhysicalMaterial {
    /// A material without texture channels, available immediately.
    #[must_use]
    pub fn untextured(params: PhysicalParams) -> Self {
        Self {
            params,
            textures: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn texture(&self, channel: TextureChannel) -> Option<&Arc<Image>> {
        self.textures
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, image)| image)
    }

    pub fn channels(&self) -> impl Iterator<Item = TextureChannel> + '_ {
        self.textures.iter().map(|(c, _)| *c)
    }

    #[inline]
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn earth() -> PhysicalMaterialDescriptor {
        PhysicalMaterialDescriptor::default()
            .bump_map("earth_bump.jpg")
            .roughness_map("earth_specular.jpg")
            .map("earth_map.jpg")
    }

    #[test]
    fn requests_follow_channel_color_spaces() {
        let requests = earth().requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.contains(&ResourceRequest::texture("earth_map.jpg", ColorSpace::Srgb)));
        assert!(requests.contains(&ResourceRequest::texture("earth_bump.jpg", ColorSpace::Linear)));
    }

    #[test]
    fn shared_source_is_requested_once() {
        let desc = PhysicalMaterialDescriptor::default()
            .roughness_map("packed.jpg")
            .with_channel(TextureChannel::MetalnessMap, "packed.jpg");
        assert_eq!(desc.requests().len(), 1);
    }

    #[test]
    fn resolve_fails_when_any_channel_is_missing() {
        let image = Arc::new(Image::white("stub"));
        let result = earth().resolve(|req| (req.path != "earth_bump.jpg").then(|| image.clone()));
        assert_eq!(
            result,
            Err(AssetError::MissingChannel {
                channel: "bumpMap",
                path: "earth_bump.jpg".into(),
            })
        );
    }

    #[test]
    fn resolve_binds_every_channel() {
        let image = Arc::new(Image::white("stub"));
        let material = earth().resolve(|_| Some(image.clone())).unwrap();
        assert_eq!(material.channel_count(), 3);
        assert!(material.texture(TextureChannel::Map).is_some());
        assert!(material.texture(TextureChannel::EnvMap).is_none());
    }

    #[test]
    fn hex_colors_convert_to_linear() {
        let orange = parse_hex_color("#ff8a00").unwrap();
        assert_eq!(orange.x, 1.0);
        let linear = srgb_to_linear(orange);
        assert!((linear.x - 1.0).abs() < 1e-5);
        assert!(linear.y < orange.y);
        assert_eq!(linear.z, 0.0);
        assert!(parse_hex_color("#fff").is_none());
    }
}
