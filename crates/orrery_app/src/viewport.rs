//! Viewport Manager
//!
//! Keeps the active camera's projection and the drawing surface in step with
//! the host viewport. Sizes are logical (CSS-like) pixels; the surface is
//! allocated at `min(device_pixel_ratio, pixel_ratio_cap)` physical pixels
//! per logical pixel.

use orrery_render::{RenderBackend, SurfaceSize};
use orrery_scene::Scene;

pub const DEFAULT_PIXEL_RATIO_CAP: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
    pub pixel_ratio_cap: f32,
}

impl ViewportState {
    #[must_use]
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
            pixel_ratio_cap: DEFAULT_PIXEL_RATIO_CAP,
        }
    }

    #[must_use]
    pub fn with_pixel_ratio_cap(mut self, cap: f32) -> Self {
        self.pixel_ratio_cap = cap;
        self
    }

    /// The device pixel ratio clamped to the cap.
    #[inline]
    #[must_use]
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(self.pixel_ratio_cap).max(f32::EPSILON)
    }

    /// `None` while either dimension is zero.
    #[must_use]
    pub fn aspect(&self) -> Option<f32> {
        (self.width > 0 && self.height > 0).then(|| self.width as f32 / self.height as f32)
    }

    #[must_use]
    pub fn surface_size(&self) -> SurfaceSize {
        let ratio = self.pixel_ratio();
        SurfaceSize::new(
            (self.width as f32 * ratio).round() as u32,
            (self.height as f32 * ratio).round() as u32,
        )
    }
}

#[derive(Debug, Clone)]
pub struct Viewport {
    state: ViewportState,
}

impl Viewport {
    #[must_use]
    pub fn new(state: ViewportState) -> Self {
        Self { state }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    /// Handles a viewport resize.
    ///
    /// Returns whether the camera or the surface changed. Zero-sized input
    /// (a minimised window) is ignored.
    pub fn on_resize<R: RenderBackend + ?Sized>(
        &mut self,
        width: u32,
        height: u32,
        scene: &mut Scene,
        renderer: &mut R,
    ) -> bool {
        if width == 0 || height == 0 {
            log::debug!("Ignoring zero-sized viewport {width}x{height}");
            return false;
        }
        self.state.width = width;
        self.state.height = height;
        self.apply(scene, renderer)
    }

    /// Handles a device pixel ratio change (e.g. the window moved to another monitor).
    pub fn on_scale_factor_changed<R: RenderBackend + ?Sized>(
        &mut self,
        device_pixel_ratio: f32,
        scene: &mut Scene,
        renderer: &mut R,
    ) -> bool {
        if device_pixel_ratio <= 0.0 || device_pixel_ratio.is_nan() {
            log::debug!("Ignoring invalid device pixel ratio {device_pixel_ratio}");
            return false;
        }
        self.state.device_pixel_ratio = device_pixel_ratio;
        self.apply(scene, renderer)
    }

    /// Pushes the current state to the active camera and the surface.
    pub fn apply<R: RenderBackend + ?Sized>(&self, scene: &mut Scene, renderer: &mut R) -> bool {
        let Some(aspect) = self.state.aspect() else {
            return false;
        };
        let mut changed = false;

        if let Some(camera) = scene.active_camera_mut()
            && camera.aspect != aspect
        {
            camera.set_aspect(aspect);
            changed = true;
        }

        let size = self.state.surface_size();
        if renderer.surface_size() != size {
            renderer.resize(size);
            changed = true;
        }

        if changed {
            log::debug!(
                "Viewport {}x{} @{} -> surface {}x{}",
                self.state.width,
                self.state.height,
                self.state.pixel_ratio(),
                size.width,
                size.height
            );
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use orrery_render::{HeadlessRenderer, RendererSettings};
    use orrery_scene::{Camera, Transform};

    use super::*;

    fn setup() -> (Scene, HeadlessRenderer) {
        let mut scene = Scene::new();
        let camera = scene.add_camera(
            "camera",
            Camera::new_perspective(75.0, 1.0, 0.1, 100.0),
            Transform::new(),
        );
        scene.set_active_camera(camera);
        (scene, HeadlessRenderer::new(RendererSettings::default(), SurfaceSize::default()))
    }

    #[test]
    fn surface_rounds_at_capped_ratio() {
        let state = ViewportState::new(1001, 500, 3.0);
        assert_eq!(state.pixel_ratio(), 2.0);
        assert_eq!(state.surface_size(), SurfaceSize::new(2002, 1000));

        let state = ViewportState::new(101, 51, 1.5);
        assert_eq!(state.surface_size(), SurfaceSize::new(152, 77));
    }

    #[test]
    fn resize_is_idempotent() {
        let (mut scene, mut renderer) = setup();
        let mut viewport = Viewport::new(ViewportState::new(800, 600, 1.0));

        assert!(viewport.on_resize(1920, 1080, &mut scene, &mut renderer));
        assert!(!viewport.on_resize(1920, 1080, &mut scene, &mut renderer));
        assert_eq!(renderer.resize_count(), 1);

        let aspect = scene.active_camera_mut().map(|c| c.aspect).unwrap();
        assert!((aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn zero_size_is_ignored() {
        let (mut scene, mut renderer) = setup();
        let mut viewport = Viewport::new(ViewportState::new(800, 600, 1.0));
        viewport.on_resize(800, 600, &mut scene, &mut renderer);

        assert!(!viewport.on_resize(0, 600, &mut scene, &mut renderer));
        assert_eq!(viewport.state().width, 800);
        assert_eq!(renderer.surface_size(), SurfaceSize::new(800, 600));
    }

    #[test]
    fn scale_factor_reallocates_surface_only() {
        let (mut scene, mut renderer) = setup();
        let mut viewport = Viewport::new(ViewportState::new(400, 300, 1.0));
        viewport.apply(&mut scene, &mut renderer);

        assert!(viewport.on_scale_factor_changed(1.5, &mut scene, &mut renderer));
        assert_eq!(renderer.surface_size(), SurfaceSize::new(600, 450));
        assert!(!viewport.on_scale_factor_changed(1.5, &mut scene, &mut renderer));
    }
}
