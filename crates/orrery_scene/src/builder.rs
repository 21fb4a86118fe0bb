//! Base scene construction
//!
//! [`build_base_scene`] turns a validated [`SceneConfig`] into a fresh
//! [`Scene`] holding one active camera, every configured light and, when
//! requested, an orbit rig bound to that camera. Construction order is fixed
//! (camera, lights, controls) so that the rig always finds its camera.

use glam::{UVec2, Vec3};
use orrery_core::ConfigError;

use crate::camera::Camera;
use crate::config::{
    CameraConfig, ControlsConfig, LightConfig, LightKindConfig, SceneConfig, ShadowSettings,
};
use crate::controls::OrbitControls;
use crate::environment::Background;
use crate::light::{Light, LightKind, ShadowCamera, ShadowConfig};
use crate::scene::{NodeHandle, Scene};
use crate::transform::Transform;

pub const CAMERA_NODE: &str = "camera";
pub const CONTROLS_NODE: &str = "orbit_controls";

/// Builds a new scene graph from `config`.
///
/// The whole config is validated before the first node is created. Every
/// call returns an independent graph.
pub fn build_base_scene(config: &SceneConfig) -> Result<Scene, ConfigError> {
    config.validate()?;
    let camera_config = config.camera.as_ref().ok_or(ConfigError::MissingCamera)?;

    let mut scene = Scene::new();

    let camera = add_camera(&mut scene, camera_config);
    scene.set_active_camera(camera);

    for (index, light) in config.lights.iter().enumerate() {
        add_light(&mut scene, index, light);
    }

    if let Some(controls) = &config.controls {
        add_controls(&mut scene, camera, camera_config, controls)?;
    }

    scene.environment.intensity = config.environment_intensity;
    scene.environment.ambient_color = config.ambient_color;
    if let Some(color) = config.background {
        scene.environment.background = Background::Color(color);
    }

    scene.update_transforms();

    let stats = scene.stats();
    log::debug!(
        "Built base scene {}: {} camera, {} lights, {} control rigs",
        scene.id(),
        stats.cameras,
        stats.lights,
        stats.control_rigs
    );
    Ok(scene)
}

fn add_camera(scene: &mut Scene, config: &CameraConfig) -> NodeHandle {
    let camera = Camera::new_perspective(config.fov, config.aspect, config.near, config.far);
    let mut transform = Transform::from_position(config.position);
    transform.look_at(config.target, Vec3::Y);
    scene.add_camera(CAMERA_NODE, camera, transform)
}

fn add_light(scene: &mut Scene, index: usize, config: &LightConfig) -> NodeHandle {
    let (light, position) = match &config.kind {
        LightKindConfig::Directional {
            color,
            intensity,
            position,
            target,
            shadow,
        } => {
            let mut light = Light::new_directional(*color, *intensity);
            light.kind = LightKind::Directional { target: *target };
            if let Some(shadow) = shadow {
                light = light.with_shadow(shadow_config(shadow));
            }
            (light, *position)
        }
        LightKindConfig::Point {
            color,
            intensity,
            position,
            range,
        } => (Light::new_point(*color, *intensity, *range), *position),
        LightKindConfig::Ambient { color, intensity } => {
            (Light::new_ambient(*color, *intensity), Vec3::ZERO)
        }
    };

    let name = config
        .name
        .clone()
        .unwrap_or_else(|| format!("light_{index}"));
    scene.add_light(&name, light, Transform::from_position(position))
}

fn shadow_config(settings: &ShadowSettings) -> ShadowConfig {
    ShadowConfig {
        map_size: UVec2::splat(settings.map_size),
        bias: settings.bias,
        normal_bias: settings.normal_bias,
        camera: ShadowCamera {
            near: settings.near,
            far: settings.far,
            left: settings.left,
            right: settings.right,
            top: settings.top,
            bottom: settings.bottom,
        },
    }
}

fn add_controls(
    scene: &mut Scene,
    camera: NodeHandle,
    camera_config: &CameraConfig,
    config: &ControlsConfig,
) -> Result<NodeHandle, ConfigError> {
    let target = config.target.unwrap_or(camera_config.target);
    let mut controls = OrbitControls::new(camera, target, camera_config.position);
    controls.enable_damping = config.enable_damping;
    controls.damping_factor = config.damping_factor;
    controls.rotate_speed = config.rotate_speed;
    controls.zoom_speed = config.zoom_speed;
    controls.min_polar_angle = config.min_polar_angle;
    controls.max_polar_angle = config.max_polar_angle;
    controls.min_distance = config.min_distance;
    controls.max_distance = config.max_distance.unwrap_or(f32::INFINITY);

    // The camera may have been configured looking elsewhere; the rig decides.
    if let Some(node) = scene.get_node_mut(camera) {
        node.transform.look_at(target, Vec3::Y);
    }

    scene.add_control_rig(CONTROLS_NODE, controls)
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    fn earth_config() -> SceneConfig {
        SceneConfig {
            camera: Some(CameraConfig {
                fov: 75.0,
                near: 0.1,
                far: 100.0,
                position: Vec3::new(0.0, 15.0, 50.0),
                ..CameraConfig::default()
            }),
            lights: vec![
                LightConfig::directional(Vec3::ONE, 3.5, Vec3::new(10.0, 20.0, 10.0))
                    .named("sun")
                    .with_shadow(ShadowSettings {
                        far: 100.0,
                        left: -10.0,
                        right: 10.0,
                        top: 10.0,
                        bottom: -10.0,
                        ..ShadowSettings::default()
                    }),
            ],
            controls: Some(ControlsConfig {
                enable_damping: true,
                ..ControlsConfig::default()
            }),
            ..SceneConfig::default()
        }
    }

    #[test]
    fn builds_camera_lights_and_controls() {
        let scene = build_base_scene(&earth_config()).unwrap();
        let stats = scene.stats();
        assert_eq!(stats.cameras, 1);
        assert_eq!(stats.lights, 1);
        assert_eq!(stats.control_rigs, 1);
        assert_eq!(scene.active_camera, scene.find_by_name(CAMERA_NODE));

        let sun = scene.find_by_name("sun").unwrap();
        let light = scene.get_node(sun).and_then(|n| n.as_light()).unwrap();
        assert!(light.cast_shadows);
        assert_eq!(light.shadow.as_ref().unwrap().map_size, UVec2::splat(512));
    }

    #[test]
    fn camera_starts_at_configured_position() {
        let scene = build_base_scene(&earth_config()).unwrap();
        let (transform, camera) = scene.active_camera_bundle().unwrap();
        assert_eq!(transform.world_position(), Vec3::new(0.0, 15.0, 50.0));
        assert!((camera.fov_degrees() - 75.0).abs() < 1e-4);
    }

    #[test]
    fn unnamed_lights_get_indexed_names() {
        let mut config = earth_config();
        config.lights.push(LightConfig::ambient(Vec3::ONE, 0.2));
        let scene = build_base_scene(&config).unwrap();
        assert!(scene.find_by_name("light_1").is_some());
    }

    #[test]
    fn missing_camera_is_rejected() {
        let config = SceneConfig {
            camera: None,
            ..earth_config()
        };
        assert_eq!(build_base_scene(&config).err(), Some(ConfigError::MissingCamera));
    }

    #[test]
    fn invalid_ranges_are_rejected() {
        let mut config = earth_config();
        if let Some(camera) = config.camera.as_mut() {
            camera.far = 0.05;
        }
        assert!(matches!(
            build_base_scene(&config),
            Err(ConfigError::OutOfRange { ref field, .. }) if field == "camera.far"
        ));

        let mut config = earth_config();
        if let Some(controls) = config.controls.as_mut() {
            controls.max_polar_angle = PI * 1.5;
        }
        assert!(build_base_scene(&config).is_err());
    }

    #[test]
    fn presets_load_from_json() {
        let json = r#"{
            "camera": { "fov": 33.0, "position": [-0.07, 16.41, -24.1], "target": [0.02, 0.806, 0.427] },
            "lights": [{ "type": "ambient", "color": [1.0, 1.0, 1.0], "intensity": 0.5 }],
            "controls": { "max_polar_angle": 1.4137167 }
        }"#;
        let config = SceneConfig::from_json(json).unwrap();
        let scene = build_base_scene(&config).unwrap();
        assert_eq!(scene.light_count(), 1);

        assert!(matches!(
            SceneConfig::from_json("{ camera: }"),
            Err(ConfigError::Parse(_))
        ));
    }
}
