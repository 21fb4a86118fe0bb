//! Platform-agnostic pointer input
//!
//! Holds the pointer state the control rigs consume each tick. Host adapters
//! (see `orrery_app::winit`) translate platform events into the `inject_*`
//! calls; scene logic only reads.

use glam::Vec2;

/// Pointer button enumeration (platform-agnostic)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Button state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ButtonState {
    Pressed,
    Released,
}

/// Pointer state container, reset at the end of every tick.
#[derive(Debug, Clone, Default)]
pub struct Input {
    pressed: Vec<MouseButton>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
    screen_size: Vec2,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========== System API (called by the host adapter) ==========

    /// Clears per-tick deltas so a released drag does not keep rotating.
    pub fn end_frame(&mut self) {
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    pub fn inject_mouse_button(&mut self, button: MouseButton, state: ButtonState) {
        match state {
            ButtonState::Pressed => {
                if !self.pressed.contains(&button) {
                    self.pressed.push(button);
                }
            }
            ButtonState::Released => self.pressed.retain(|b| *b != button),
        }
    }

    pub fn inject_mouse_position(&mut self, x: f32, y: f32) {
        let new_pos = Vec2::new(x, y);
        // The first sample only establishes the origin.
        if let Some(old) = self.mouse_position {
            self.mouse_delta += new_pos - old;
        }
        self.mouse_position = Some(new_pos);
    }

    pub fn inject_scroll(&mut self, delta_x: f32, delta_y: f32) {
        self.scroll_delta += Vec2::new(delta_x, delta_y);
    }

    pub fn inject_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    // ========== User API ==========

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed.contains(&button)
    }

    #[must_use]
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    #[must_use]
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    #[must_use]
    pub fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}
