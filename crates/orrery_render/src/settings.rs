//! Renderer Settings
//!
//! [`RendererSettings`] is consumed once when a backend is created. It mirrors
//! the output configuration a browser-side renderer would be given: tone
//! mapping and exposure, output encoding, shadow filtering, anti-aliasing,
//! surface transparency and presentation.
//!
//! ```rust,ignore
//! use orrery_render::{RendererSettings, ToneMapping};
//!
//! let settings = RendererSettings {
//!     tone_mapping: ToneMapping::AcesFilmic,
//!     exposure: 5.0,
//!     ..Default::default()
//! };
//! ```

use glam::{Vec3, Vec4};
use orrery_core::ConfigError;
use serde::{Deserialize, Serialize};

/// HDR to display mapping operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToneMapping {
    None,
    Linear,
    #[default]
    AcesFilmic,
}

impl ToneMapping {
    /// Applies exposure and the operator to a linear color.
    #[must_use]
    pub fn apply(self, color: Vec3, exposure: f32) -> Vec3 {
        match self {
            Self::None => color,
            Self::Linear => (color * exposure).clamp(Vec3::ZERO, Vec3::ONE),
            Self::AcesFilmic => aces_filmic(color * exposure),
        }
    }
}

/// Narkowicz fit of the ACES filmic curve.
fn aces_filmic(x: Vec3) -> Vec3 {
    const A: f32 = 2.51;
    const B: f32 = 0.03;
    const C: f32 = 2.43;
    const D: f32 = 0.59;
    const E: f32 = 0.14;
    ((x * (A * x + B)) / (x * (C * x + D) + E)).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Shadow map filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadowFilter {
    Basic,
    Pcf,
    #[default]
    PcfSoft,
}

/// Shadow map configuration.
///
/// `enabled` decides which meshes count as shadow casters in a draw. `filter`
/// is for the mesh rasteriser; the clear-pass backends do not sample shadow
/// maps and ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowMapSettings {
    pub enabled: bool,
    pub filter: ShadowFilter,
}

impl Default for ShadowMapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: ShadowFilter::PcfSoft,
        }
    }
}

/// GPU adapter selection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerPreference {
    LowPower,
    #[default]
    HighPerformance,
}

impl From<PowerPreference> for wgpu::PowerPreference {
    fn from(value: PowerPreference) -> Self {
        match value {
            PowerPreference::LowPower => Self::LowPower,
            PowerPreference::HighPerformance => Self::HighPerformance,
        }
    }
}

/// Global configuration for backend initialization.
///
/// | Field              | Default          |
/// |--------------------|------------------|
/// | `tone_mapping`     | `AcesFilmic`     |
/// | `exposure`         | `1.0`            |
/// | `srgb_output`      | `true`           |
/// | `shadows`          | enabled, PCF soft|
/// | `antialias`        | `true`           |
/// | `transparent`      | `false`          |
/// | `clear_color`      | opaque black     |
/// | `vsync`            | `true`           |
/// | `power_preference` | `HighPerformance`|
/// | `pixel_ratio_cap`  | `2.0`            |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererSettings {
    pub tone_mapping: ToneMapping,
    pub exposure: f32,
    /// Encode the final color as sRGB.
    pub srgb_output: bool,
    pub shadows: ShadowMapSettings,
    pub antialias: bool,
    /// Request a surface that composites with what is behind the window.
    pub transparent: bool,
    /// Linear RGBA used when the scene has no background.
    pub clear_color: Vec4,
    pub vsync: bool,
    pub power_preference: PowerPreference,
    /// Upper bound applied to the device pixel ratio.
    pub pixel_ratio_cap: f32,
}

impl Default for RendererSettings {
    fn default() -> Self {
        Self {
            tone_mapping: ToneMapping::AcesFilmic,
            exposure: 1.0,
            srgb_output: true,
            shadows: ShadowMapSettings::default(),
            antialias: true,
            transparent: false,
            clear_color: Vec4::new(0.0, 0.0, 0.0, 1.0),
            vsync: true,
            power_preference: PowerPreference::HighPerformance,
            pixel_ratio_cap: 2.0,
        }
    }
}

impl RendererSettings {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exposure < 0.0 || !self.exposure.is_finite() {
            return Err(ConfigError::out_of_range("renderer.exposure", self.exposure, ">= 0"));
        }
        if self.pixel_ratio_cap <= 0.0 || self.pixel_ratio_cap.is_nan() {
            return Err(ConfigError::out_of_range(
                "renderer.pixel_ratio_cap",
                self.pixel_ratio_cap,
                "> 0",
            ));
        }
        Ok(())
    }

    /// MSAA sample count implied by `antialias`.
    #[inline]
    #[must_use]
    pub fn msaa_samples(&self) -> u32 {
        if self.antialias { 4 } else { 1 }
    }

    /// Display color for a linear scene color, after exposure and tone mapping.
    #[must_use]
    pub fn output_color(&self, linear: Vec3) -> Vec3 {
        self.tone_mapping.apply(linear, self.exposure)
    }
}

/// Encodes a linear channel value as sRGB.
#[must_use]
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
