//! Render Loop & Bootstrap Tests
//!
//! Tests for:
//! - Start/stop lifecycle of the loop driver
//! - Deferred objects appearing on the draw after they resolve
//! - Bootstrap with required and deferred objects
//! - Draw failures reaching the host

mod common;

use std::time::Duration;

use glam::Vec3;
use orrery::app::{
    DeferredObject, ManualScheduler, RenderLoop, SceneContext, SceneSetup, TickOutcome,
    ViewportState, initialize,
};
use orrery::assets::AssetServer;
use orrery::core::{DrawError, Error};
use orrery::render::{HeadlessRenderer, RenderBackend, RendererSettings, SurfaceSize};
use orrery::resources::{Geometry, PhysicalMaterialDescriptor};
use orrery::scene::{GroundProjection, ShadowFlags, Transform};

const DT: f32 = 1.0 / 60.0;

fn boot(setup: SceneSetup, assets: AssetServer) -> SceneContext<HeadlessRenderer> {
    let renderer = HeadlessRenderer::new(RendererSettings::default(), SurfaceSize::default());
    pollster::block_on(initialize(
        setup,
        renderer,
        assets,
        ViewportState::new(800, 600, 1.0),
    ))
    .unwrap()
}

fn textured(name: &str, map: &str) -> DeferredObject {
    DeferredObject::mesh(
        name,
        Geometry::sphere(1.0, 16, 16),
        PhysicalMaterialDescriptor::default().map(map),
        Transform::from_position(Vec3::new(0.0, 2.0, 0.0)),
        ShadowFlags::CAST | ShadowFlags::RECEIVE,
    )
    .unwrap()
}

#[test]
fn stop_prevents_further_draws() {
    let (assets, _) = AssetServer::in_memory();
    let mut ctx = boot(SceneSetup::new(common::camera_and_sun()), assets);
    let mut render_loop = RenderLoop::new(ManualScheduler::default());

    render_loop.start();
    for _ in 0..3 {
        assert_eq!(render_loop.tick(&mut ctx, DT).unwrap(), TickOutcome::Drawn);
    }
    render_loop.stop();
    let draws = ctx.renderer.draw_count();

    for _ in 0..10 {
        assert_eq!(render_loop.tick(&mut ctx, DT).unwrap(), TickOutcome::Skipped);
    }
    assert_eq!(ctx.renderer.draw_count(), draws);
}

#[test]
fn start_while_running_is_a_no_op() {
    let mut render_loop = RenderLoop::new(ManualScheduler::default());
    render_loop.start();
    render_loop.start();
    render_loop.start();
    assert_eq!(render_loop.scheduler().start_calls, 1);

    render_loop.stop();
    render_loop.start();
    assert_eq!(render_loop.scheduler().start_calls, 2);
}

#[test]
fn deferred_object_appears_on_the_next_draw() {
    let (assets, store) = AssetServer::in_memory();
    store.insert("meteor.png", common::png([120, 100, 90, 255]));
    let setup =
        SceneSetup::new(common::camera_and_sun()).with_deferred(textured("meteor", "meteor.png"));
    let mut ctx = boot(setup, assets);
    let mut render_loop = RenderLoop::new(ManualScheduler::default());
    render_loop.start();

    assert!(ctx.wait_for_deferred(Duration::from_secs(5)));
    assert!(ctx.scene.find_by_name("meteor").is_none());

    render_loop.tick(&mut ctx, DT).unwrap();
    assert!(ctx.scene.find_by_name("meteor").is_some());
    assert_eq!(ctx.renderer.last_record().map(|r| r.meshes), Some(1));
}

#[test]
fn slow_deferred_loads_never_block_a_tick() {
    let (assets, store) = AssetServer::in_memory();
    store.insert("slow.png", common::png([1, 1, 1, 255]));
    store.set_latency("slow.png", Duration::from_secs(2));
    let setup =
        SceneSetup::new(common::camera_and_sun()).with_deferred(textured("slow", "slow.png"));
    let mut ctx = boot(setup, assets);
    let mut render_loop = RenderLoop::new(ManualScheduler::default());
    render_loop.start();

    for _ in 0..5 {
        assert_eq!(render_loop.tick(&mut ctx, DT).unwrap(), TickOutcome::Drawn);
    }
    assert_eq!(ctx.pending_deferred(), 1);
    assert_eq!(ctx.renderer.last_record().map(|r| r.meshes), Some(0));
}

#[test]
fn bootstrap_joins_required_objects() {
    let (assets, _store) = common::demo_assets();
    let setup = SceneSetup::new(common::camera_and_sun())
        .with_required(textured("earth", "earth_map.jpg"))
        .with_required(DeferredObject::environment_lighting("envmap.hdr", 0.5))
        .with_required(DeferredObject::environment_background(
            "envmap_blur.hdr",
            Some(GroundProjection {
                height: 100.0,
                radius: 300.0,
            }),
        ));
    let ctx = boot(setup, assets);

    assert!(ctx.scene.find_by_name("earth").is_some());
    assert!(ctx.scene.environment.has_lighting_map());
    assert_eq!(ctx.scene.environment.intensity, 0.5);
    assert_eq!(ctx.renderer.surface_size(), SurfaceSize::new(800, 600));
}

#[test]
fn failed_required_object_is_left_out() {
    let (assets, store) = AssetServer::in_memory();
    store.insert("a.jpg", common::jpeg([5, 5, 5]));
    let setup = SceneSetup::new(common::camera_and_sun())
        .with_required(textured("kept", "a.jpg"))
        .with_required(textured("lost", "b.jpg"));
    let ctx = boot(setup, assets);

    assert!(ctx.scene.find_by_name("kept").is_some());
    assert!(ctx.scene.find_by_name("lost").is_none());
    assert_eq!(ctx.scene.mesh_count(), 1);
}

#[test]
fn invalid_config_fails_bootstrap() {
    let (assets, _) = AssetServer::in_memory();
    let mut config = common::camera_and_sun();
    config.camera = None;

    let renderer = HeadlessRenderer::default();
    let result = pollster::block_on(initialize(
        SceneSetup::new(config),
        renderer,
        assets,
        ViewportState::new(800, 600, 1.0),
    ));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn draw_errors_reach_the_host() {
    let (assets, _) = AssetServer::in_memory();
    let mut ctx = boot(SceneSetup::new(common::camera_and_sun()), assets);
    let mut render_loop = RenderLoop::new(ManualScheduler::default());
    render_loop.start();
    render_loop.tick(&mut ctx, DT).unwrap();

    ctx.renderer.fail_next_draw(DrawError::Surface("device lost".into()));
    let err = render_loop.tick(&mut ctx, DT).unwrap_err();
    assert!(matches!(err, Error::Draw(DrawError::Surface(_))));
    assert!(!render_loop.is_running());
    assert_eq!(render_loop.frame_count(), 1);
}
