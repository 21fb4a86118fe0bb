//! The per-scene runtime context.
//!
//! [`SceneContext`] bundles everything one running scene needs: the graph,
//! viewport, backend, asset server, pointer input and the user update hook.
//! It is owned by the host thread; loader tasks never see it. Deferred object
//! loads report back over a `flume` channel, and [`SceneContext::apply_completed`]
//! inserts the finished objects between ticks.

use std::time::{Duration, Instant};

use flume::{Receiver, Sender};
use orrery_assets::{AssetServer, ResolvedResources};
use orrery_core::{AssetError, FrameState, Input};
use orrery_render::RenderBackend;
use orrery_scene::Scene;

use crate::deferred::DeferredObject;
use crate::viewport::Viewport;

pub type UpdateFn = Box<dyn FnMut(&mut Scene, &Input, &FrameState)>;

/// Identifies one spawned deferred object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeferredId(u64);

struct Completion {
    id: DeferredId,
    result: Result<ResolvedResources, AssetError>,
}

struct InFlight {
    id: DeferredId,
    object: DeferredObject,
}

pub struct SceneContext<R: RenderBackend> {
    pub scene: Scene,
    pub viewport: Viewport,
    pub renderer: R,
    pub assets: AssetServer,
    pub input: Input,

    update_fn: Option<UpdateFn>,

    in_flight: Vec<InFlight>,
    ready: Vec<Completion>,
    next_id: u64,
    completion_tx: Sender<Completion>,
    completion_rx: Receiver<Completion>,
}

impl<R: RenderBackend> SceneContext<R> {
    /// Wraps a built scene and applies the viewport to it once.
    pub fn new(mut scene: Scene, viewport: Viewport, mut renderer: R, assets: AssetServer) -> Self {
        viewport.apply(&mut scene, &mut renderer);
        let (completion_tx, completion_rx) = flume::unbounded();
        Self {
            scene,
            viewport,
            renderer,
            assets,
            input: Input::new(),
            update_fn: None,
            in_flight: Vec::new(),
            ready: Vec::new(),
            next_id: 0,
            completion_tx,
            completion_rx,
        }
    }

    /// Installs the hook called at the start of every running tick.
    pub fn set_update_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: FnMut(&mut Scene, &Input, &FrameState) + 'static,
    {
        self.update_fn = Some(Box::new(f));
        self
    }

    pub(crate) fn run_update(&mut self, frame: &FrameState) {
        if let Some(update_fn) = self.update_fn.as_mut() {
            update_fn(&mut self.scene, &self.input, frame);
        }
    }

    /// Forwards a viewport resize to the viewport manager.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        self.viewport
            .on_resize(width, height, &mut self.scene, &mut self.renderer)
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) -> bool {
        self.viewport
            .on_scale_factor_changed(ratio, &mut self.scene, &mut self.renderer)
    }

    // ========================================================================
    // Deferred objects
    // ========================================================================

    /// Starts loading the resources of `object` and returns immediately.
    ///
    /// The object is inserted by the first [`apply_completed`](Self::apply_completed)
    /// after its whole set resolved. If any request fails, only this object
    /// is omitted.
    pub fn spawn_deferred(&mut self, object: DeferredObject) -> DeferredId {
        let id = DeferredId(self.next_id);
        self.next_id += 1;

        log::debug!("Deferring {} ({} requests)", object.label(), object.requests().len());
        let tx = self.completion_tx.clone();
        self.assets.load_set_detached(object.requests(), move |result| {
            // The receiver is gone once the context is dropped.
            let _ = tx.send(Completion { id, result });
        });
        self.in_flight.push(InFlight { id, object });
        id
    }

    /// Deferred objects still waiting to be inserted.
    #[inline]
    #[must_use]
    pub fn pending_deferred(&self) -> usize {
        self.in_flight.len()
    }

    /// Blocks until every in-flight deferred set has finished loading, or
    /// until `timeout` elapses. Nothing is inserted; the results wait for
    /// the next [`apply_completed`](Self::apply_completed).
    pub fn wait_for_deferred(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.ready.len() < self.in_flight.len() {
            match self.completion_rx.recv_deadline(deadline) {
                Ok(completion) => self.ready.push(completion),
                Err(_) => return false,
            }
        }
        true
    }

    /// Inserts every deferred object whose set has resolved.
    ///
    /// Returns how many objects were added to the scene.
    pub fn apply_completed(&mut self) -> usize {
        self.ready.extend(self.completion_rx.try_iter());

        let mut applied = 0;
        for Completion { id, result } in std::mem::take(&mut self.ready) {
            let Some(index) = self.in_flight.iter().position(|f| f.id == id) else {
                continue;
            };
            let object = self.in_flight.swap_remove(index).object;
            let label = object.label().to_string();

            let built = result.and_then(|resolved| object.build(&resolved));
            match built {
                Ok(object) => {
                    object.insert_into(&mut self.scene, None);
                    log::debug!("Added deferred object {label}");
                    applied += 1;
                }
                Err(err) => log::warn!("Omitting {label}: {err}"),
            }
        }
        applied
    }
}
