//! Winit host
//!
//! Runs a scene in a native window: creates the window and the wgpu backend,
//! bootstraps the [`SceneContext`], then drives the [`RenderLoop`] from
//! redraw requests.
//!
//! # Example
//!
//! ```rust,ignore
//! use orrery::app::winit::{App, AppHandler};
//!
//! struct Viewer;
//!
//! impl AppHandler for Viewer {
//!     fn scene_setup() -> orrery::Result<(SceneSetup, AssetServer)> {
//!         let assets = AssetServer::from_source("assets")?;
//!         Ok((SceneSetup::new(SceneConfig::default()), assets))
//!     }
//!
//!     fn init(_ctx: &mut SceneContext<WgpuRenderer>, _window: &Arc<Window>) -> Self {
//!         Viewer
//!     }
//! }
//!
//! fn main() -> orrery::Result<()> {
//!     App::new().with_title("Viewer").run::<Viewer>()
//! }
//! ```

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
pub use winit::window::{Window, WindowId};

use orrery_assets::AssetServer;
use orrery_core::{Error, Result, Timer};
use orrery_render::{RendererSettings, WgpuRenderer};

use crate::bootstrap::{SceneSetup, initialize};
use crate::context::SceneContext;
use crate::render_loop::{FrameScheduler, RenderLoop};
use crate::viewport::ViewportState;

pub mod input_adapter;

/// Application behaviour plugged into [`App`].
///
/// # Lifecycle
///
/// 1. [`scene_setup`](Self::scene_setup) - describes the scene and where assets come from
/// 2. [`init`](Self::init) - called once the context is bootstrapped; install update hooks here
/// 3. [`on_event`](Self::on_event) - called for each window event
pub trait AppHandler: Sized + 'static {
    fn scene_setup() -> Result<(SceneSetup, AssetServer)>;

    fn init(ctx: &mut SceneContext<WgpuRenderer>, window: &Arc<Window>) -> Self;

    /// Return `true` to consume the event and skip the default handling.
    #[allow(unused_variables)]
    fn on_event(
        &mut self,
        ctx: &mut SceneContext<WgpuRenderer>,
        window: &Arc<Window>,
        event: &WindowEvent,
    ) -> bool {
        false
    }
}

/// Requests redraws while running.
pub struct WinitScheduler {
    window: Arc<Window>,
    running: bool,
}

impl WinitScheduler {
    #[must_use]
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            running: false,
        }
    }
}

impl FrameScheduler for WinitScheduler {
    fn start(&mut self) {
        self.running = true;
        self.window.request_redraw();
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Window builder and entry point.
pub struct App {
    title: String,
    settings: RendererSettings,
    size: (f64, f64),
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self {
            title: "Orrery".into(),
            settings: RendererSettings::default(),
            size: (1280.0, 720.0),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: RendererSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Initial logical window size.
    #[must_use]
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = (width, height);
        self
    }

    /// Runs until the window closes or a frame fails to draw.
    ///
    /// # Errors
    ///
    /// Event loop failures, initialisation failures and the draw error that
    /// stopped the loop.
    pub fn run<H: AppHandler>(self) -> Result<()> {
        let event_loop = EventLoop::new().map_err(|e| Error::Platform(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::<H>::new(self.title, self.settings, self.size);
        event_loop
            .run_app(&mut runner)
            .map_err(|e| Error::Platform(e.to_string()))?;

        match runner.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

struct Running<H> {
    window: Arc<Window>,
    ctx: SceneContext<WgpuRenderer>,
    render_loop: RenderLoop<WinitScheduler>,
    handler: H,
    timer: Timer,
}

struct AppRunner<H: AppHandler> {
    title: String,
    settings: RendererSettings,
    size: (f64, f64),
    running: Option<Running<H>>,
    fatal: Option<Error>,
}

impl<H: AppHandler> AppRunner<H> {
    fn new(title: String, settings: RendererSettings, size: (f64, f64)) -> Self {
        Self {
            title,
            settings,
            size,
            running: None,
            fatal: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running<H>> {
        let attributes = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(LogicalSize::new(self.size.0, self.size.1));
        let window = event_loop
            .create_window(attributes)
            .map_err(|e| Error::Platform(e.to_string()))?;
        let window = Arc::new(window);

        let scale_factor = window.scale_factor();
        let logical: LogicalSize<u32> = window.inner_size().to_logical(scale_factor);
        let viewport = ViewportState::new(logical.width, logical.height, scale_factor as f32)
            .with_pixel_ratio_cap(self.settings.pixel_ratio_cap);

        log::info!("Initializing renderer backend...");
        let renderer = pollster::block_on(WgpuRenderer::new(
            window.clone(),
            self.settings.clone(),
            viewport.surface_size(),
        ))?;

        let (setup, assets) = H::scene_setup()?;
        let mut ctx = pollster::block_on(initialize(setup, renderer, assets, viewport))?;
        ctx.input.inject_resize(window.inner_size().width, window.inner_size().height);

        let handler = H::init(&mut ctx, &window);

        let mut render_loop = RenderLoop::new(WinitScheduler::new(window.clone()));
        render_loop.start();

        Ok(Running {
            window,
            ctx,
            render_loop,
            handler,
            timer: Timer::new(),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("Fatal: {err}");
        if let Some(running) = self.running.as_mut() {
            running.render_loop.stop();
        }
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl<H: AppHandler> ApplicationHandler for AppRunner<H> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let Running {
            window,
            ctx,
            render_loop,
            handler,
            timer,
        } = running;

        if handler.on_event(ctx, window, &event) {
            return;
        }
        input_adapter::process_window_event(&mut ctx.input, &event);

        match event {
            WindowEvent::CloseRequested => {
                render_loop.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(physical) => {
                let logical: LogicalSize<u32> = physical.to_logical(window.scale_factor());
                ctx.resize(logical.width, logical.height);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                ctx.set_device_pixel_ratio(scale_factor as f32);
            }
            WindowEvent::RedrawRequested => {
                timer.tick();
                if let Err(err) = render_loop.tick(ctx, timer.dt_seconds()) {
                    self.fail(event_loop, err);
                    return;
                }
                if render_loop.is_running() {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running
            && running.render_loop.scheduler().is_running()
        {
            running.window.request_redraw();
        }
    }
}
