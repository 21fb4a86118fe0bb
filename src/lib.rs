//! # Orrery
//!
//! A scene bootstrap runtime built on wgpu.
//!
//! Orrery brings a 3D scene up in two phases. The deterministic part (camera,
//! lights, orbit controls, background) is built synchronously from a
//! [`SceneConfig`](scene::SceneConfig). Textured objects are described as
//! [`DeferredObject`](app::DeferredObject)s: their resources load concurrently
//! and each object is inserted in one step once its whole set resolved. A
//! cancellable [`RenderLoop`](app::RenderLoop) then updates and draws the
//! scene every frame, while the [`Viewport`](app::Viewport) keeps the camera
//! aspect and surface size in step with the host window.
//!
//! ## Crates
//!
//! - [`core`]: errors, pointer input and frame timing
//! - [`resources`]: images, geometries, material descriptors and resource requests
//! - [`scene`]: the scene graph, cameras, lights, orbit controls and the config builder
//! - [`assets`]: the asynchronous resource loader
//! - [`render`]: render backends (wgpu and headless)
//! - [`app`]: viewport, deferred objects, bootstrap, render loop and the winit host
//!
//! ## Example
//!
//! ```rust,ignore
//! use orrery::prelude::*;
//!
//! let setup = SceneSetup::new(SceneConfig::from_json(include_str!("scene.json"))?)
//!     .with_required(DeferredObject::environment_lighting("envmap.hdr", 1.0));
//! let (assets, _) = AssetServer::in_memory();
//! let renderer = HeadlessRenderer::default();
//! let viewport = ViewportState::new(800, 600, 1.0);
//! let mut ctx = pollster::block_on(initialize(setup, renderer, assets, viewport))?;
//!
//! let mut render_loop = RenderLoop::new(ManualScheduler::default());
//! render_loop.start();
//! render_loop.tick(&mut ctx, 1.0 / 60.0)?;
//! ```

pub use orrery_app as app;
pub use orrery_assets as assets;
pub use orrery_core as core;
pub use orrery_render as render;
pub use orrery_resources as resources;
pub use orrery_scene as scene;

pub use orrery_core::{Error, Result};

pub mod prelude {
    pub use orrery_app::{
        DeferredObject, FrameScheduler, ManualScheduler, RenderLoop, SceneContext, SceneObject,
        SceneSetup, TickOutcome, Viewport, ViewportState, initialize,
    };
    #[cfg(feature = "winit")]
    pub use orrery_app::winit::{App, AppHandler, Window};
    pub use orrery_assets::{AssetServer, LoaderSettings, ResolvedResources, await_all};
    pub use orrery_core::{AssetError, ConfigError, DrawError, Error, FrameState, Input, Result};
    pub use orrery_render::{
        HeadlessRenderer, RenderBackend, RendererSettings, ToneMapping, WgpuRenderer,
    };
    pub use orrery_resources::{
        ColorSpace, Geometry, PhysicalMaterialDescriptor, PhysicalParams, ResourceKind,
        ResourceRequest, Side,
    };
    pub use orrery_scene::{
        Camera, EnvironmentLayer, GroundProjection, LightConfig, Mesh, NodeHandle, Scene,
        SceneConfig, ShadowFlags, Transform,
    };
}
