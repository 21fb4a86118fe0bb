//! CPU decoding of fetched bytes into [`Image`]s.

use orrery_core::AssetError;
use orrery_resources::{ColorSpace, Image, ResourceKind};
use wgpu::TextureFormat;

/// Decodes on the blocking pool so that large images never stall the loader tasks.
pub(crate) async fn decode_async(
    bytes: Vec<u8>,
    kind: ResourceKind,
    label: String,
) -> Result<Image, AssetError> {
    let path = label.clone();
    tokio::task::spawn_blocking(move || decode(&bytes, kind, &label))
        .await
        .map_err(|_| AssetError::Cancelled(path))?
}

pub fn decode(bytes: &[u8], kind: ResourceKind, label: &str) -> Result<Image, AssetError> {
    match kind {
        ResourceKind::Texture(color_space) => decode_texture(bytes, color_space, label),
        ResourceKind::EnvironmentMap => decode_environment_map(bytes, label),
    }
}

/// Decodes a PNG / JPEG into 8-bit RGBA.
pub fn decode_texture(
    bytes: &[u8],
    color_space: ColorSpace,
    label: &str,
) -> Result<Image, AssetError> {
    let img = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
        path: label.to_string(),
        message: e.to_string(),
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let format = match color_space {
        ColorSpace::Srgb => TextureFormat::Rgba8UnormSrgb,
        ColorSpace::Linear => TextureFormat::Rgba8Unorm,
    };
    Ok(Image::new(label, width, height, format, rgba.into_raw()))
}

/// Decodes a panorama into `Rgba16Float`, keeping HDR range.
pub fn decode_environment_map(bytes: &[u8], label: &str) -> Result<Image, AssetError> {
    let img = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
        path: label.to_string(),
        message: e.to_string(),
    })?;

    let rgb32f = img.into_rgb32f();
    let (width, height) = rgb32f.dimensions();

    let mut data = Vec::with_capacity((width * height * 4) as usize * 2);
    let alpha = half::f16::from_f32(1.0).to_le_bytes();
    for pixel in rgb32f.pixels() {
        for channel in pixel.0 {
            data.extend_from_slice(&half::f16::from_f32(channel).to_le_bytes());
        }
        data.extend_from_slice(&alpha);
    }

    Ok(Image::new(
        label,
        width,
        height,
        TextureFormat::Rgba16Float,
        data,
    ))
}
