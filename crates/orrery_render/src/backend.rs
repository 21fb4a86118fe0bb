use glam::Vec3;
use half::f16;
use orrery_core::DrawError;
use orrery_resources::Image;
use orrery_scene::{Background, NodeHandle, Scene};
use wgpu::TextureFormat;

use crate::settings::RendererSettings;

/// Drawing surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The seam between the runtime and whatever draws frames.
///
/// The runtime only calls `resize` from viewport events and `render` once
/// per running tick; everything else about drawing is the backend's business.
pub trait RenderBackend {
    fn settings(&self) -> &RendererSettings;

    /// Reallocates the drawing surface. Zero sizes are ignored.
    fn resize(&mut self, size: SurfaceSize);

    fn surface_size(&self) -> SurfaceSize;

    /// Draws `scene` through `camera`.
    fn render(&mut self, scene: &Scene, camera: NodeHandle) -> Result<(), DrawError>;
}

/// Resolves the linear color the frame is cleared to.
///
/// Panorama backgrounds contribute their mean color.
#[must_use]
pub fn background_color(scene: &Scene, settings: &RendererSettings) -> Vec3 {
    match &scene.environment.background {
        Background::None => settings.clear_color.truncate(),
        Background::Color(color) => *color,
        Background::EnvironmentMap { map, .. } => {
            mean_color(map).unwrap_or_else(|| settings.clear_color.truncate())
        }
    }
}

const MEAN_SAMPLES: usize = 4096;

/// Mean RGB of a strided sample of texels.
fn mean_color(image: &Image) -> Option<Vec3> {
    let bpp = image.bytes_per_pixel() as usize;
    let texels = image.data.len() / bpp.max(1);
    if texels == 0 {
        return None;
    }
    let stride = (texels / MEAN_SAMPLES).max(1);

    let mut sum = Vec3::ZERO;
    let mut count = 0u32;
    for texel in image.data.chunks_exact(bpp).step_by(stride) {
        let rgb = match image.format {
            TextureFormat::Rgba16Float => Vec3::new(
                f16::from_le_bytes([texel[0], texel[1]]).to_f32(),
                f16::from_le_bytes([texel[2], texel[3]]).to_f32(),
                f16::from_le_bytes([texel[4], texel[5]]).to_f32(),
            ),
            TextureFormat::Rgba8Unorm | TextureFormat::Rgba8UnormSrgb => {
                Vec3::new(texel[0].into(), texel[1].into(), texel[2].into()) / 255.0
            }
            _ => return None,
        };
        sum += rgb;
        count += 1;
    }
    Some(sum / count as f32)
}
