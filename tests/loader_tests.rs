//! Asynchronous Resource Loader Tests
//!
//! Tests for:
//! - Joining sets of pending loads
//! - Textured meshes only appearing with every channel bound
//! - Failure scoping to the dependent object
//! - Failed joins returning without waiting on slow members
//! - File-backed reading

mod common;

use std::time::{Duration, Instant};

use orrery::app::{DeferredObject, SceneContext, SceneObject, Viewport, ViewportState};
use orrery::assets::{AssetServer, FileAssetReader, LoaderSettings, await_all};
use orrery::core::AssetError;
use orrery::render::HeadlessRenderer;
use orrery::resources::{
    ColorSpace, Geometry, PhysicalMaterialDescriptor, PhysicalParams, ResourceKind,
    ResourceRequest, TextureChannel,
};
use orrery::scene::{ShadowFlags, Transform, build_base_scene};

fn earth(map: &str, bump: &str) -> DeferredObject {
    DeferredObject::mesh(
        "earth",
        Geometry::sphere(10.0, 70, 70),
        PhysicalMaterialDescriptor::new(PhysicalParams {
            bump_scale: 5.0,
            ..PhysicalParams::default()
        })
        .map(map)
        .bump_map(bump),
        Transform::new(),
        ShadowFlags::RECEIVE,
    )
    .unwrap()
}

fn moon() -> DeferredObject {
    DeferredObject::mesh(
        "moon",
        Geometry::sphere(2.0, 32, 32),
        PhysicalMaterialDescriptor::default().map("moon.jpg"),
        Transform::new(),
        ShadowFlags::CAST,
    )
    .unwrap()
}

#[test]
fn await_all_maps_every_resource() {
    let (server, store) = AssetServer::in_memory();
    let paths: Vec<String> = (0..6).map(|i| format!("tile_{i}.png")).collect();
    for path in &paths {
        store.insert(path.as_str(), common::png([10, 20, 30, 255]));
    }

    let pending: Vec<_> = paths
        .iter()
        .map(|p| server.load(p.as_str(), ResourceKind::Texture(ColorSpace::Srgb)))
        .collect();
    let resolved = pollster::block_on(await_all(pending)).unwrap();

    assert_eq!(resolved.len(), paths.len());
    for path in &paths {
        assert!(resolved.find(path).is_some(), "{path} missing");
    }
}

#[test]
fn one_failure_fails_the_join() {
    let (server, store) = AssetServer::in_memory();
    store.insert("a.jpg", common::jpeg([1, 2, 3]));

    let pending = vec![
        server.load("a.jpg", ResourceKind::Texture(ColorSpace::Srgb)),
        server.load("b.jpg", ResourceKind::Texture(ColorSpace::Srgb)),
    ];
    let err = pollster::block_on(await_all(pending)).unwrap_err();
    assert!(matches!(err, AssetError::NotFound(ref path) if path == "b.jpg"));
}

#[test]
fn textured_mesh_gets_every_channel() {
    let (server, _store) = common::demo_assets();
    let mut scene = build_base_scene(&common::camera_and_sun()).unwrap();
    let before = scene.node_count();

    let object = pollster::block_on(earth("earth_map.jpg", "earth_bump.jpg").resolve(&server))
        .unwrap();
    object.insert_into(&mut scene, None);

    assert_eq!(scene.node_count(), before + 1);
    let handle = scene.find_by_name("earth").unwrap();
    let mesh = scene.get_node(handle).and_then(|n| n.as_mesh()).unwrap();
    assert_eq!(mesh.material.channel_count(), 2);
    assert!(mesh.material.texture(TextureChannel::Map).is_some());
    assert!(mesh.material.texture(TextureChannel::BumpMap).is_some());
    assert_eq!(mesh.material.params.bump_scale, 5.0);
    assert!(mesh.receives_shadows());
}

#[test]
fn failed_channel_leaves_the_graph_unchanged() {
    let (assets, store) = AssetServer::in_memory();
    store.insert("a.jpg", common::jpeg([200, 10, 10]));
    store.insert("moon.jpg", common::jpeg([90, 90, 90]));
    let scene = build_base_scene(&common::camera_and_sun()).unwrap();
    let before = scene.node_count();
    let mut ctx = SceneContext::new(
        scene,
        Viewport::new(ViewportState::new(800, 600, 1.0)),
        HeadlessRenderer::default(),
        assets,
    );

    ctx.spawn_deferred(earth("a.jpg", "b.jpg"));
    assert!(ctx.wait_for_deferred(Duration::from_secs(5)));
    assert_eq!(ctx.apply_completed(), 0);
    assert!(ctx.scene.find_by_name("earth").is_none());
    assert_eq!(ctx.scene.node_count(), before);
    assert_eq!(ctx.scene.mesh_count(), 0);

    // The same context still takes objects whose sets resolve.
    ctx.spawn_deferred(moon());
    assert!(ctx.wait_for_deferred(Duration::from_secs(5)));
    assert_eq!(ctx.apply_completed(), 1);
    assert_eq!(ctx.scene.node_count(), before + 1);
    assert_eq!(ctx.pending_deferred(), 0);
}

#[test]
fn failing_member_does_not_wait_for_slow_ones() {
    let (server, store) = AssetServer::in_memory();
    store.insert("slow.hdr", common::png([1, 1, 1, 255]));
    store.insert("fast.jpg", common::jpeg([1, 2, 3]));
    store.set_latency("slow.hdr", Duration::from_secs(5));

    let requests = [
        ResourceRequest::environment_map("slow.hdr"),
        ResourceRequest::texture("fast.jpg", ColorSpace::Srgb),
        ResourceRequest::texture("gone.jpg", ColorSpace::Srgb),
    ];
    let started = Instant::now();
    let err = pollster::block_on(server.load_set(&requests)).unwrap_err();

    assert_eq!(err, AssetError::NotFound("gone.jpg".into()));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn build_only_sees_its_own_set() {
    let (server, _store) = common::demo_assets();
    let requests = [
        ResourceRequest::texture("earth_map.jpg", ColorSpace::Srgb),
        ResourceRequest::texture("earth_bump.jpg", ColorSpace::Linear),
    ];
    let resolved = pollster::block_on(server.load_set(&requests)).unwrap();
    assert_eq!(resolved.len(), 2);

    let object = earth("earth_map.jpg", "earth_roughness.jpg").build(&resolved);
    assert!(matches!(object, Err(AssetError::MissingChannel { .. })));
}

#[test]
fn environment_maps_decode_to_half_floats() {
    let (server, _store) = common::demo_assets();
    let object = pollster::block_on(
        DeferredObject::environment_lighting("envmap.hdr", 1.0).resolve(&server),
    )
    .unwrap();

    assert!(matches!(object, SceneObject::Environment(_)));
    let mut scene = build_base_scene(&common::camera_and_sun()).unwrap();
    assert!(object.insert_into(&mut scene, None).is_none());
    let map = scene.environment.lighting_map.as_ref().unwrap();
    assert!(map.is_hdr());
    assert_eq!(map.data.len(), (map.width * map.height * 8) as usize);
}

#[test]
fn slow_resources_time_out() {
    let (server, store) = AssetServer::in_memory();
    store.insert("slow.png", common::png([0, 0, 0, 255]));
    store.set_latency("slow.png", Duration::from_secs(10));
    let server = server.with_settings(LoaderSettings {
        timeout: Some(Duration::from_millis(25)),
    });

    let err = pollster::block_on(server.load_set(&[ResourceRequest::environment_map("slow.png")]))
        .unwrap_err();
    assert!(matches!(err, AssetError::Timeout { .. }));
}

#[test]
fn file_reader_loads_from_disk() {
    let dir = std::env::temp_dir().join(format!("orrery_loader_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("earth_map.png"), common::png([1, 2, 3, 255])).unwrap();

    let server = AssetServer::new(FileAssetReader::new(&dir));
    let resource = pollster::block_on(
        server.load("earth_map.png", ResourceKind::Texture(ColorSpace::Srgb)),
    )
    .unwrap();
    assert_eq!((resource.image.width, resource.image.height), (4, 2));

    let missing = pollster::block_on(server.load("nope.png", ResourceKind::EnvironmentMap));
    assert!(matches!(missing, Err(AssetError::NotFound(_))));

    std::fs::remove_dir_all(&dir).ok();
}
