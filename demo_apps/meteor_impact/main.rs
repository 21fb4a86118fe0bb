//! Meteor Impact
//!
//! The backdrop is a blurred panorama projected onto the ground and lighting
//! comes from a second panorama; both are joined before the first frame. The
//! crater, the meteor and its light beams stream in afterwards and pop into
//! the scene as soon as their textures are ready.

use std::sync::Arc;

use glam::Vec3;
use orrery::prelude::*;
use orrery::resources::CylinderOptions;

const DEFAULT_ASSETS: &str = "demo_apps/meteor_impact/assets";
const METEOR_SPIN: f32 = 0.15;

struct MeteorImpact;

fn ground() -> Result<DeferredObject> {
    Ok(DeferredObject::mesh(
        "crater",
        Geometry::Plane {
            width: 40.0,
            height: 40.0,
        },
        PhysicalMaterialDescriptor::new(PhysicalParams {
            roughness: 0.9,
            ..PhysicalParams::default()
        })
        .map("textures/ground.jpg")
        .normal_map("textures/ground_normal.jpg"),
        Transform::new(),
        ShadowFlags::RECEIVE,
    )?)
}

fn meteor() -> DeferredObject {
    let rock = PhysicalMaterialDescriptor::new(PhysicalParams {
        roughness: 0.7,
        emissive: Vec3::new(1.0, 0.35, 0.05),
        emissive_intensity: 2.0,
        ..PhysicalParams::default()
    })
    .map("textures/meteor.jpg")
    .emissive_map("textures/meteor_emissive.jpg");

    let beam = PhysicalMaterialDescriptor::new(PhysicalParams {
        emissive: Vec3::new(1.0, 0.6, 0.2),
        opacity: 0.6,
        transparent: true,
        side: Side::Double,
        ..PhysicalParams::default()
    })
    .map("textures/beam.png");

    let mut requests = rock.requests();
    requests.extend(beam.requests());

    DeferredObject::new("meteor", requests, move |resolved| {
        let lookup = |request: &ResourceRequest| resolved.image(request);
        let rock = rock.resolve(lookup)?;
        let beam = beam.resolve(lookup)?;

        let mut children = vec![SceneObject::mesh(
            "meteor_rock",
            Mesh::new(Geometry::sphere(1.5, 48, 32), rock).with_shadows(ShadowFlags::CAST),
            Transform::new(),
        )];
        for (index, angle) in [0.0_f32, 2.1, 4.2].into_iter().enumerate() {
            let mut transform = Transform::from_position(Vec3::new(0.0, 3.0, 0.0));
            transform.set_rotation_euler(0.35, angle, 0.0);
            children.push(SceneObject::mesh(
                format!("beam_{index}"),
                Mesh::new(
                    Geometry::Cylinder(CylinderOptions {
                        radius_top: 0.05,
                        radius_bottom: 0.4,
                        height: 6.0,
                        radial_segments: 16,
                        open_ended: true,
                    }),
                    beam.clone(),
                ),
                transform,
            ));
        }

        Ok(SceneObject::group(
            "meteor",
            Transform::from_position(Vec3::new(0.0, 4.0, 0.0)),
            children,
        ))
    })
}

impl AppHandler for MeteorImpact {
    fn scene_setup() -> Result<(SceneSetup, AssetServer)> {
        let root = std::env::var("ORRERY_ASSETS").unwrap_or_else(|_| DEFAULT_ASSETS.to_string());
        let assets = AssetServer::from_source(&root)?;

        let config = SceneConfig::from_json(include_str!("scene.json"))?;
        let setup = SceneSetup::new(config)
            .with_required(DeferredObject::environment_background(
                "textures/envmap_blur.hdr",
                Some(GroundProjection {
                    height: 100.0,
                    radius: 300.0,
                }),
            ))
            .with_required(DeferredObject::environment_lighting("textures/envmap.hdr", 1.0))
            .with_deferred(ground()?)
            .with_deferred(meteor());
        Ok((setup, assets))
    }

    fn init(ctx: &mut SceneContext<WgpuRenderer>, _window: &Arc<Window>) -> Self {
        ctx.set_update_fn(|scene, _input, frame| {
            if let Some(meteor) = scene.find_by_name("meteor")
                && let Some(node) = scene.get_node_mut(meteor)
            {
                node.transform.rotate_y(METEOR_SPIN * frame.dt);
            }
        });
        log::info!("{} props still loading", ctx.pending_deferred());
        Self
    }
}

fn main() -> Result<()> {
    env_logger::init();

    App::new()
        .with_title("Meteor Impact")
        .with_settings(RendererSettings {
            exposure: 5.0,
            ..RendererSettings::default()
        })
        .run::<MeteorImpact>()
}
