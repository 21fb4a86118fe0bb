//! Viewport Manager Tests

mod common;

use orrery::app::{Viewport, ViewportState};
use orrery::render::{HeadlessRenderer, RenderBackend, RendererSettings, SurfaceSize};
use orrery::scene::{Scene, build_base_scene};

fn setup(width: u32, height: u32, ratio: f32) -> (Scene, HeadlessRenderer, Viewport) {
    let mut scene = build_base_scene(&common::camera_and_sun()).unwrap();
    let mut renderer = HeadlessRenderer::new(RendererSettings::default(), SurfaceSize::default());
    let viewport = Viewport::new(ViewportState::new(width, height, ratio));
    viewport.apply(&mut scene, &mut renderer);
    (scene, renderer, viewport)
}

fn aspect(scene: &Scene) -> f32 {
    scene.active_camera_bundle().map(|(_, c)| c.aspect).unwrap()
}

#[test]
fn resize_updates_aspect_and_surface() {
    let (mut scene, mut renderer, mut viewport) = setup(800, 600, 1.0);
    assert!((aspect(&scene) - 800.0 / 600.0).abs() < 1e-6);
    assert_eq!(renderer.surface_size(), SurfaceSize::new(800, 600));

    viewport.on_resize(1600, 900, &mut scene, &mut renderer);
    assert!((aspect(&scene) - 1600.0 / 900.0).abs() < 1e-6);
    assert_eq!(renderer.surface_size(), SurfaceSize::new(1600, 900));
}

#[test]
fn aspect_matches_and_ratio_stays_capped() {
    let sizes = [(1, 1), (640, 480), (1920, 1080), (333, 1000), (4096, 17)];
    let ratios = [0.75, 1.0, 1.5, 2.0, 3.0];

    for ratio in ratios {
        let (mut scene, mut renderer, mut viewport) = setup(10, 10, ratio);
        for (w, h) in sizes {
            viewport.on_resize(w, h, &mut scene, &mut renderer);
            let state = viewport.state();
            assert!((aspect(&scene) - w as f32 / h as f32).abs() < 1e-5, "{w}x{h}");
            assert!(state.pixel_ratio() <= state.pixel_ratio_cap);
            assert_eq!(renderer.surface_size(), state.surface_size());
        }
    }
}

#[test]
fn repeated_resizes_are_idempotent() {
    let (mut scene, mut renderer, mut viewport) = setup(800, 600, 2.0);
    let resizes = renderer.resize_count();

    for _ in 0..3 {
        viewport.on_resize(800, 600, &mut scene, &mut renderer);
    }
    assert_eq!(renderer.resize_count(), resizes);
    assert_eq!(renderer.surface_size(), SurfaceSize::new(1600, 1200));
}

#[test]
fn custom_cap_bounds_the_surface() {
    let mut scene = build_base_scene(&common::camera_and_sun()).unwrap();
    let mut renderer = HeadlessRenderer::default();
    let viewport = Viewport::new(ViewportState::new(500, 400, 3.0).with_pixel_ratio_cap(1.0));
    viewport.apply(&mut scene, &mut renderer);

    assert_eq!(renderer.surface_size(), SurfaceSize::new(500, 400));
}
