use wgpu::TextureFormat;

/// Decoded pixel data ready for upload by a render backend.
///
/// Images are immutable once decoded and shared behind `Arc` between the
/// materials and environments that reference them.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub data: Vec<u8>,
}

impl Image {
    #[must_use]
    pub fn new(
        label: impl Into<String>,
        width: u32,
        height: u32,
        format: TextureFormat,
        data: Vec<u8>,
    ) -> Self {
        Self {
            label: label.into(),
            width,
            height,
            format,
            data,
        }
    }

    /// A single opaque white texel, handy as a placeholder in tests and tools.
    #[must_use]
    pub fn white(label: impl Into<String>) -> Self {
        Self::new(label, 1, 1, TextureFormat::Rgba8Unorm, vec![255; 4])
    }

    #[inline]
    #[must_use]
    pub fn bytes_per_pixel(&self) -> u32 {
        self.format.block_copy_size(None).unwrap_or(4)
    }

    /// Whether `data` holds exactly `width * height` texels of `format`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.data.len() == (self.width * self.height * self.bytes_per_pixel()) as usize
    }

    #[inline]
    #[must_use]
    pub fn is_hdr(&self) -> bool {
        matches!(
            self.format,
            TextureFormat::Rgba16Float | TextureFormat::Rgba32Float
        )
    }
}
