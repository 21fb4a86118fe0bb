//! Earth
//!
//! A bump-mapped Earth with sheen and clearcoat, lit by an HDR panorama and a
//! shadow-casting sun. Assets are read from `ORRERY_ASSETS` (default
//! `demo_apps/earth/assets`): `envmap.hdr`, `earth_map.jpg`,
//! `earth_bump.jpg` and `earth_specular.jpg`.

use std::f32::consts::PI;
use std::sync::Arc;

use glam::Vec3;
use orrery::prelude::*;
use orrery::resources::{parse_hex_color, srgb_to_linear};
use orrery::scene::{CameraConfig, ControlsConfig, ShadowSettings};

const DEFAULT_ASSETS: &str = "demo_apps/earth/assets";

struct Earth;

impl Earth {
    fn config() -> SceneConfig {
        let white = parse_hex_color("#FFFFFF").map_or(Vec3::ONE, srgb_to_linear);
        SceneConfig {
            camera: Some(CameraConfig {
                fov: 75.0,
                near: 0.1,
                far: 100.0,
                position: Vec3::new(0.0, 15.0, 50.0),
                ..CameraConfig::default()
            }),
            lights: vec![
                LightConfig::directional(white, 3.5, Vec3::new(10.0, 20.0, 10.0))
                    .named("sun")
                    .with_shadow(ShadowSettings {
                        map_size: 512,
                        near: 0.5,
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

    fn globe() -> Result<DeferredObject> {
        let sheen_color = parse_hex_color("#ff8a00").map_or(Vec3::ONE, srgb_to_linear);
        let material = PhysicalMaterialDescriptor::new(PhysicalParams {
            bump_scale: 0.1,
            env_map_intensity: 0.4,
            sheen: 1.0,
            sheen_roughness: 0.5,
            sheen_color,
            clearcoat: 0.5,
            ..PhysicalParams::default()
        })
        .bump_map("earth_bump.jpg")
        .roughness_map("earth_specular.jpg")
        .map("earth_map.jpg")
        .env_map("envmap.hdr");

        let mut transform = Transform::new();
        transform.rotate_y(PI);

        Ok(DeferredObject::mesh(
            "earth",
            Geometry::sphere(10.0, 70, 70),
            material,
            transform,
            ShadowFlags::RECEIVE,
        )?)
    }
}

impl AppHandler for Earth {
    fn scene_setup() -> Result<(SceneSetup, AssetServer)> {
        let root = std::env::var("ORRERY_ASSETS").unwrap_or_else(|_| DEFAULT_ASSETS.to_string());
        let assets = AssetServer::from_source(&root)?;
        let setup = SceneSetup::new(Self::config()).with_required(Self::globe()?);
        Ok((setup, assets))
    }

    fn init(ctx: &mut SceneContext<WgpuRenderer>, _window: &Arc<Window>) -> Self {
        log::info!("Earth ready with {} nodes", ctx.scene.node_count());
        Self
    }
}

fn main() -> Result<()> {
    env_logger::init();

    App::new()
        .with_title("Earth")
        .with_settings(RendererSettings {
            tone_mapping: ToneMapping::AcesFilmic,
            transparent: true,
            ..RendererSettings::default()
        })
        .run::<Earth>()
}
