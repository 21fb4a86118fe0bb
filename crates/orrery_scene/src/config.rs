//! Scene construction parameters
//!
//! [`SceneConfig`] is plain data: it can be written in code or loaded from a
//! JSON preset with [`SceneConfig::from_json`]. [`SceneConfig::validate`]
//! checks every range up front so that the builder never leaves a half-built
//! scene behind.

use std::f32::consts::PI;

use glam::Vec3;
use orrery_core::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Initial aspect ratio, replaced on the first resize.
    pub aspect: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            near: 0.1,
            far: 100.0,
            aspect: 16.0 / 9.0,
            position: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Square shadow map resolution in texels.
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub bias: f32,
    pub normal_bias: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            map_size: 512,
            near: 0.5,
            far: 500.0,
            left: -5.0,
            right: 5.0,
            top: 5.0,
            bottom: -5.0,
            bias: 0.0,
            normal_bias: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LightKindConfig {
    Directional {
        color: Vec3,
        intensity: f32,
        position: Vec3,
        #[serde(default)]
        target: Vec3,
        #[serde(default)]
        shadow: Option<ShadowSettings>,
    },
    Point {
        color: Vec3,
        intensity: f32,
        position: Vec3,
        #[serde(default)]
        range: f32,
    },
    Ambient {
        color: Vec3,
        intensity: f32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub kind: LightKindConfig,
}

impl LightConfig {
    #[must_use]
    pub fn directional(color: Vec3, intensity: f32, position: Vec3) -> Self {
        Self {
            name: None,
            kind: LightKindConfig::Directional {
                color,
                intensity,
                position,
                target: Vec3::ZERO,
                shadow: None,
            },
        }
    }

    #[must_use]
    pub fn ambient(color: Vec3, intensity: f32) -> Self {
        Self {
            name: None,
            kind: LightKindConfig::Ambient { color, intensity },
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Turns on shadow casting for a directional light; other kinds are unchanged.
    #[must_use]
    pub fn with_shadow(mut self, settings: ShadowSettings) -> Self {
        if let LightKindConfig::Directional { shadow, .. } = &mut self.kind {
            *shadow = Some(settings);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Orbit centre. Defaults to the camera target.
    pub target: Option<Vec3>,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    /// `None` leaves the zoom-out distance unbounded.
    pub max_distance: Option<f32>,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            target: None,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 0.05,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            min_distance: 0.0,
            max_distance: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub camera: Option<CameraConfig>,
    pub lights: Vec<LightConfig>,
    pub controls: Option<ControlsConfig>,
    /// Solid linear background color; `None` leaves the surface clear color.
    pub background: Option<Vec3>,
    pub ambient_color: Vec3,
    pub environment_intensity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: None,
            lights: Vec::new(),
            controls: None,
            background: None,
            ambient_color: Vec3::ZERO,
            environment_intensity: 1.0,
        }
    }
}

impl SceneConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Checks every parameter the builder depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let camera = self.camera.as_ref().ok_or(ConfigError::MissingCamera)?;
        validate_camera(camera)?;

        for (index, light) in self.lights.iter().enumerate() {
            validate_light(index, light)?;
        }

        if let Some(controls) = &self.controls {
            validate_controls(controls)?;
        }

        if let Some(background) = self.background {
            non_negative_color("background", background)?;
        }
        non_negative_color("ambient_color", self.ambient_color)?;
        check(
            "environment_intensity",
            self.environment_intensity,
            self.environment_intensity >= 0.0,
            ">= 0",
        )
    }
}

fn check(field: &str, value: f32, ok: bool, expected: &'static str) -> Result<(), ConfigError> {
    if ok && !value.is_nan() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(field, value, expected))
    }
}

fn non_negative_color(field: &str, color: Vec3) -> Result<(), ConfigError> {
    for (axis, value) in ["r", "g", "b"].iter().zip(color.to_array()) {
        check(&format!("{field}.{axis}"), value, value >= 0.0 && value.is_finite(), ">= 0")?;
    }
    Ok(())
}

fn validate_camera(camera: &CameraConfig) -> Result<(), ConfigError> {
    check("camera.fov", camera.fov, camera.fov > 0.0 && camera.fov < 180.0, "in (0, 180)")?;
    check("camera.near", camera.near, camera.near > 0.0, "> 0")?;
    check(
        "camera.far",
        camera.far,
        camera.far > camera.near && camera.far.is_finite(),
        "> near",
    )?;
    check("camera.aspect", camera.aspect, camera.aspect > 0.0, "> 0")?;
    if camera.position.distance_squared(camera.target) == 0.0 {
        return Err(ConfigError::invalid(
            "camera.target",
            "target coincides with the camera position",
        ));
    }
    Ok(())
}

fn validate_light(index: usize, light: &LightConfig) -> Result<(), ConfigError> {
    let prefix = format!("lights[{index}]");
    match &light.kind {
        LightKindConfig::Directional {
            color,
            intensity,
            position,
            target,
            shadow,
        } => {
            non_negative_color(&format!("{prefix}.color"), *color)?;
            check(&format!("{prefix}.intensity"), *intensity, *intensity >= 0.0, ">= 0")?;
            if position.distance_squared(*target) == 0.0 {
                return Err(ConfigError::invalid(
                    format!("{prefix}.target"),
                    "directional light has no direction",
                ));
            }
            if let Some(shadow) = shadow {
                validate_shadow(&prefix, shadow)?;
            }
        }
        LightKindConfig::Point {
            color,
            intensity,
            range,
            ..
        } => {
            non_negative_color(&format!("{prefix}.color"), *color)?;
            check(&format!("{prefix}.intensity"), *intensity, *intensity >= 0.0, ">= 0")?;
            check(&format!("{prefix}.range"), *range, *range >= 0.0, ">= 0")?;
        }
        LightKindConfig::Ambient { color, intensity } => {
            non_negative_color(&format!("{prefix}.color"), *color)?;
            check(&format!("{prefix}.intensity"), *intensity, *intensity >= 0.0, ">= 0")?;
        }
    }
    Ok(())
}

fn validate_shadow(prefix: &str, shadow: &ShadowSettings) -> Result<(), ConfigError> {
    let size = shadow.map_size as f32;
    check(
        &format!("{prefix}.shadow.map_size"),
        size,
        shadow.map_size > 0 && shadow.map_size <= 8192,
        "in 1..=8192",
    )?;
    check(&format!("{prefix}.shadow.near"), shadow.near, shadow.near >= 0.0, ">= 0")?;
    check(
        &format!("{prefix}.shadow.far"),
        shadow.far,
        shadow.far > shadow.near,
        "> shadow.near",
    )?;
    check(
        &format!("{prefix}.shadow.right"),
        shadow.right,
        shadow.right > shadow.left,
        "> shadow.left",
    )?;
    check(
        &format!("{prefix}.shadow.top"),
        shadow.top,
        shadow.top > shadow.bottom,
        "> shadow.bottom",
    )
}

fn validate_controls(controls: &ControlsConfig) -> Result<(), ConfigError> {
    check(
        "controls.damping_factor",
        controls.damping_factor,
        controls.damping_factor > 0.0 && controls.damping_factor <= 1.0,
        "in (0, 1]",
    )?;
    check(
        "controls.min_polar_angle",
        controls.min_polar_angle,
        controls.min_polar_angle >= 0.0,
        ">= 0",
    )?;
    check(
        "controls.max_polar_angle",
        controls.max_polar_angle,
        controls.max_polar_angle >= controls.min_polar_angle && controls.max_polar_angle <= PI,
        "in [min_polar_angle, PI]",
    )?;
    check(
        "controls.min_distance",
        controls.min_distance,
        controls.min_distance >= 0.0 && controls.min_distance.is_finite(),
        ">= 0",
    )?;
    match controls.max_distance {
        Some(max) => check(
            "controls.max_distance",
            max,
            max >= controls.min_distance && max.is_finite(),
            ">= min_distance",
        ),
        None => Ok(()),
    }
}
