//! Rendering backends.
//!
//! The runtime talks to a [`RenderBackend`]; [`WgpuRenderer`] draws into a
//! window surface and [`HeadlessRenderer`] records draws without a GPU.

pub mod backend;
pub mod headless;
pub mod settings;
pub mod surface;

pub use backend::{RenderBackend, SurfaceSize, background_color};
pub use headless::{DrawRecord, HeadlessRenderer};
pub use settings::{
    PowerPreference, RendererSettings, ShadowFilter, ShadowMapSettings, ToneMapping,
    linear_to_srgb,
};
pub use surface::WgpuRenderer;
