//! Translates winit window events into pointer [`Input`].

use winit::event::{ElementState, MouseScrollDelta, WindowEvent};

use orrery_core::{ButtonState, Input, MouseButton};

/// Pixel deltas (trackpads) are scaled down to roughly one line per notch.
const PIXEL_SCROLL_SCALE: f32 = 0.01;

#[must_use]
pub fn translate_mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

#[must_use]
pub fn translate_element_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Pressed,
        ElementState::Released => ButtonState::Released,
    }
}

/// Feeds the pointer-related part of `event` into `input`.
pub fn process_window_event(input: &mut Input, event: &WindowEvent) {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            input.inject_mouse_position(position.x as f32, position.y as f32);
        }
        WindowEvent::MouseInput { state, button, .. } => {
            input.inject_mouse_button(
                translate_mouse_button(*button),
                translate_element_state(*state),
            );
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let (dx, dy) = match delta {
                MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                MouseScrollDelta::PixelDelta(pos) => (
                    pos.x as f32 * PIXEL_SCROLL_SCALE,
                    pos.y as f32 * PIXEL_SCROLL_SCALE,
                ),
            };
            input.inject_scroll(dx, dy);
        }
        WindowEvent::Resized(size) => {
            input.inject_resize(size.width, size.height);
        }
        _ => {}
    }
}
