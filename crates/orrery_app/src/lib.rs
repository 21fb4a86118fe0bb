//! Scene runtime: viewport handling, deferred scene objects, the render loop
//! driver and (with the `winit` feature) a native window host.
//!
//! A scene comes up in two phases. [`initialize`] builds the base graph from a
//! [`SceneConfig`](orrery_scene::SceneConfig) and joins the objects the first
//! frame needs. Everything else is handed to
//! [`SceneContext::spawn_deferred`] and shows up on the first tick after its
//! resources resolve.

pub mod bootstrap;
pub mod context;
pub mod deferred;
pub mod render_loop;
pub mod viewport;

#[cfg(feature = "winit")]
pub mod winit;

pub use bootstrap::{SceneSetup, initialize};
pub use context::{DeferredId, SceneContext, UpdateFn};
pub use deferred::{DeferredObject, SceneObject};
pub use render_loop::{FrameScheduler, LoopState, ManualScheduler, RenderLoop, TickOutcome};
pub use viewport::{DEFAULT_PIXEL_RATIO_CAP, Viewport, ViewportState};
