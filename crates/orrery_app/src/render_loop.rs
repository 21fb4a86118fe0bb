//! Render Loop Driver
//!
//! One tick: apply finished deferred loads, run the update hook, step control
//! rigs and transforms, then draw once through the active camera.
//! The host's animation callback is abstracted as a [`FrameScheduler`].

use orrery_core::{FrameState, Result};
use orrery_render::RenderBackend;

use crate::context::SceneContext;

/// The host side of the loop: something that keeps calling back each frame.
pub trait FrameScheduler {
    /// Begins requesting frame callbacks.
    fn start(&mut self);
    /// Cancels the next pending callback.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// A scheduler that does nothing on its own; tests call `tick` directly.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    running: bool,
    pub start_calls: u32,
    pub stop_calls: u32,
}

impl FrameScheduler for ManualScheduler {
    fn start(&mut self) {
        self.running = true;
        self.start_calls += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stop_calls += 1;
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running,
}

/// What a call to [`RenderLoop::tick`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The loop is stopped; nothing ran.
    Skipped,
    /// The scene was updated and drawn.
    Drawn,
    /// The scene was updated but has no active camera to draw through.
    NoCamera,
}

pub struct RenderLoop<S: FrameScheduler> {
    scheduler: S,
    state: LoopState,
    frame_count: u64,
    elapsed: f32,
}

impl<S: FrameScheduler> RenderLoop<S> {
    #[must_use]
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            state: LoopState::Stopped,
            frame_count: 0,
            elapsed: 0.0,
        }
    }

    /// Starts the loop. Calling it while running has no effect.
    pub fn start(&mut self) {
        if self.state == LoopState::Running {
            return;
        }
        log::debug!("Render loop started");
        self.state = LoopState::Running;
        self.scheduler.start();
    }

    /// Stops the loop; no draw happens after this returns.
    pub fn stop(&mut self) {
        if self.state == LoopState::Stopped {
            return;
        }
        log::debug!("Render loop stopped after {} frames", self.frame_count);
        self.state = LoopState::Stopped;
        self.scheduler.stop();
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Frames drawn so far.
    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    #[inline]
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Runs one frame.
    ///
    /// A draw error stops the loop before it is returned.
    pub fn tick<R: RenderBackend>(
        &mut self,
        ctx: &mut SceneContext<R>,
        dt: f32,
    ) -> Result<TickOutcome> {
        if self.state != LoopState::Running {
            return Ok(TickOutcome::Skipped);
        }

        ctx.apply_completed();

        self.elapsed += dt;
        let frame = FrameState {
            time: self.elapsed,
            dt,
            frame_count: self.frame_count,
        };
        ctx.run_update(&frame);
        ctx.scene.update(&ctx.input, dt);
        ctx.input.end_frame();

        let Some(camera) = ctx.scene.active_camera else {
            log::debug!("No active camera; skipping draw");
            return Ok(TickOutcome::NoCamera);
        };

        if let Err(err) = ctx.renderer.render(&ctx.scene, camera) {
            log::error!("Draw failed, stopping render loop: {err}");
            self.stop();
            return Err(err.into());
        }
        self.frame_count += 1;
        Ok(TickOutcome::Drawn)
    }
}
