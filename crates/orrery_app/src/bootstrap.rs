//! Scene initialisation.

use futures::future::join_all;
use orrery_assets::AssetServer;
use orrery_core::Result;
use orrery_render::RenderBackend;
use orrery_scene::{SceneConfig, build_base_scene};

use crate::context::SceneContext;
use crate::deferred::DeferredObject;
use crate::viewport::{Viewport, ViewportState};

/// Everything needed to bring a scene up.
#[derive(Debug, Default)]
pub struct SceneSetup {
    pub config: SceneConfig,
    /// Objects joined before [`initialize`] returns.
    pub required: Vec<DeferredObject>,
    /// Objects that stream in after the first frames.
    pub deferred: Vec<DeferredObject>,
}

impl SceneSetup {
    #[must_use]
    pub fn new(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_required(mut self, object: DeferredObject) -> Self {
        self.required.push(object);
        self
    }

    #[must_use]
    pub fn with_deferred(mut self, object: DeferredObject) -> Self {
        self.deferred.push(object);
        self
    }
}

/// Builds the base scene, joins the required objects and hands back a
/// context that is ready for its first tick.
///
/// Configuration errors abort. A required object whose resources fail is
/// left out and logged; the rest of the scene still comes up.
pub async fn initialize<R: RenderBackend>(
    setup: SceneSetup,
    renderer: R,
    assets: AssetServer,
    viewport: ViewportState,
) -> Result<SceneContext<R>> {
    let SceneSetup {
        config,
        required,
        deferred,
    } = setup;

    let scene = build_base_scene(&config)?;
    let mut ctx = SceneContext::new(scene, Viewport::new(viewport), renderer, assets);

    let labels: Vec<String> = required.iter().map(|o| o.label().to_string()).collect();
    let assets = ctx.assets.clone();
    let results = join_all(required.into_iter().map(|object| object.resolve(&assets))).await;

    let mut inserted = 0;
    for (label, result) in labels.into_iter().zip(results) {
        match result {
            Ok(object) => {
                object.insert_into(&mut ctx.scene, None);
                inserted += 1;
            }
            Err(err) => log::warn!("Omitting {label}: {err}"),
        }
    }
    ctx.scene.update_transforms();

    let deferred_count = deferred.len();
    for object in deferred {
        ctx.spawn_deferred(object);
    }

    log::info!(
        "Scene {} ready: {} nodes, {inserted} required objects, {deferred_count} deferred",
        ctx.scene.id(),
        ctx.scene.node_count(),
    );
    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use orrery_render::{HeadlessRenderer, RenderBackend, SurfaceSize};
    use orrery_scene::CameraConfig;

    use super::*;

    #[test]
    fn initialize_applies_the_viewport() {
        let config = SceneConfig {
            camera: Some(CameraConfig {
                position: Vec3::new(0.0, 0.0, 10.0),
                ..CameraConfig::default()
            }),
            ..SceneConfig::default()
        };
        let (assets, _) = AssetServer::in_memory();

        let ctx = pollster::block_on(initialize(
            SceneSetup::new(config),
            HeadlessRenderer::default(),
            assets,
            ViewportState::new(300, 200, 2.0),
        ))
        .unwrap();

        assert_eq!(ctx.renderer.surface_size(), SurfaceSize::new(600, 400));
        let (_, camera) = ctx.scene.active_camera_bundle().unwrap();
        assert!((camera.aspect - 1.5).abs() < 1e-6);
        assert_eq!(ctx.pending_deferred(), 0);
    }
}
