//! wgpu surface backend
//!
//! [`WgpuRenderer`] owns the device, queue and window surface. Each frame it
//! clears to the scene background, with exposure and tone mapping applied,
//! and presents. With `antialias` on, the pass targets a multisampled color
//! buffer that resolves into the surface texture.
//!
//! Mesh rasterisation is left to a full renderer plugged in behind
//! [`RenderBackend`]; the shadow settings are read by that renderer, not here.

use orrery_core::{DrawError, Error, Result};
use orrery_scene::{NodeHandle, Scene};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::backend::{RenderBackend, SurfaceSize, background_color};
use crate::settings::{RendererSettings, linear_to_srgb};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct WgpuRenderer {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,

    depth_texture_view: wgpu::TextureView,
    msaa_texture_view: Option<wgpu::TextureView>,
    sample_count: u32,
    settings: RendererSettings,
}

fn backend_error(e: impl std::fmt::Display) -> Error {
    Error::Draw(DrawError::Backend(e.to_string()))
}

impl WgpuRenderer {
    pub async fn new<W>(window: W, settings: RendererSettings, size: SurfaceSize) -> Result<Self>
    where
        W: HasWindowHandle + HasDisplayHandle + Send + Sync + 'static,
    {
        settings.validate()?;

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window).map_err(backend_error)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: settings.power_preference.into(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(backend_error)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Orrery Device"),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await
            .map_err(backend_error)?;

        let width = size.width.max(1);
        let height = size.height.max(1);
        let mut config = surface
            .get_default_config(&adapter, width, height)
            .ok_or_else(|| backend_error("Surface not supported by adapter"))?;

        let caps = surface.get_capabilities(&adapter);
        if settings.srgb_output
            && let Some(format) = caps.formats.iter().copied().find(wgpu::TextureFormat::is_srgb)
        {
            config.format = format;
        }
        if settings.transparent
            && caps
                .alpha_modes
                .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            config.alpha_mode = wgpu::CompositeAlphaMode::PreMultiplied;
        }
        config.present_mode = if settings.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };
        surface.configure(&device, &config);

        let requested = settings.msaa_samples();
        let sample_count = if adapter
            .get_texture_format_features(config.format)
            .flags
            .sample_count_supported(requested)
        {
            requested
        } else {
            log::warn!(
                "{requested}x MSAA unsupported for {:?}; rendering without it",
                config.format
            );
            1
        };

        let depth_texture_view = Self::create_depth_texture(&device, &config, sample_count);
        let msaa_texture_view = Self::create_msaa_texture(&device, &config, sample_count);
        log::info!(
            "wgpu backend ready: {}x{} {:?}, {:?}, {}x MSAA",
            config.width,
            config.height,
            config.format,
            config.present_mode,
            sample_count
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_texture_view,
            msaa_texture_view,
            sample_count,
            settings,
        })
    }

    fn create_msaa_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    #[inline]
    #[must_use]
    pub fn color_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Samples per pixel of the render targets; 1 without MSAA.
    #[inline]
    #[must_use]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    fn clear_color(&self, scene: &Scene) -> wgpu::Color {
        let mut rgb = self.settings.output_color(background_color(scene, &self.settings));
        // A non-sRGB surface stores what we write; encode by hand.
        if self.settings.srgb_output && !self.config.format.is_srgb() {
            rgb = rgb.map(linear_to_srgb);
        }
        let alpha = if self.settings.transparent {
            self.settings.clear_color.w
        } else {
            1.0
        };
        wgpu::Color {
            r: f64::from(rgb.x),
            g: f64::from(rgb.y),
            b: f64::from(rgb.z),
            a: f64::from(alpha),
        }
    }
}

impl RenderBackend for WgpuRenderer {
    fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    fn resize(&mut self, size: SurfaceSize) {
        if size.is_empty()
            || (size.width == self.config.width && size.height == self.config.height)
        {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture_view =
            Self::create_depth_texture(&self.device, &self.config, self.sample_count);
        self.msaa_texture_view =
            Self::create_msaa_texture(&self.device, &self.config, self.sample_count);
    }

    fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    /// Clears through `camera`, which only has to be a camera node of `scene`;
    /// a clear pass has no use for its projection.
    fn render(&mut self, scene: &Scene, camera: NodeHandle) -> std::result::Result<(), DrawError> {
        if scene.get_node(camera).and_then(|n| n.as_camera()).is_none() {
            return Err(DrawError::NoActiveCamera);
        }

        let output = match self.surface.get_current_texture() {
            wgpu::CurrentSurfaceTexture::Success(output)
            | wgpu::CurrentSurfaceTexture::Suboptimal(output) => output,
            wgpu::CurrentSurfaceTexture::Lost => return Err(DrawError::SurfaceLost),
            wgpu::CurrentSurfaceTexture::Outdated => {
                log::debug!("Surface outdated; reconfiguring and skipping this frame.");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            wgpu::CurrentSurfaceTexture::Timeout => {
                log::warn!("Timed out acquiring the next frame; skipping it.");
                return Ok(());
            }
            other => return Err(DrawError::Surface(format!("{other:?}"))),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let (target, resolve_target) = match &self.msaa_texture_view {
            Some(msaa) => (msaa, Some(&view)),
            None => (&view, None),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Clear Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color(scene)),
                        store: if resolve_target.is_some() {
                            wgpu::StoreOp::Discard
                        } else {
                            wgpu::StoreOp::Store
                        },
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}
