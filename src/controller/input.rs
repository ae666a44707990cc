//! Platform-agnostic pointer tracking

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer position in device pixels together with the current viewport size
    PointerMoved { client_x: f32, client_y: f32, width: f32, height: f32 },

    // Window events
    FocusLost,
}

/// Latest pointer position, normalized to [-1, 1] on both axes.
///
/// x grows left to right, y grows bottom to top.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Normalize a device-pixel position against the viewport.
    ///
    /// Returns `None` for an empty viewport or non-finite input. Positions outside the
    /// viewport (dragging past the window edge) are clamped onto it.
    pub fn from_client(client_x: f32, client_y: f32, width: f32, height: f32) -> Option<Self> {
        let finite = [client_x, client_y, width, height].iter().all(|v| v.is_finite());
        if !finite || width <= 0.0 || height <= 0.0 {
            return None;
        }
        let x = (client_x / width) * 2.0 - 1.0;
        let y = 1.0 - (client_y / height) * 2.0;
        Some(Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
        })
    }
}

/// Records the most recent pointer position; last write wins
#[derive(Debug, Default)]
pub struct InputTracker {
    pointer: PointerState,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    /// Overwrite the pointer from a raw move event. Returns false when the event was skipped.
    pub fn on_pointer_move(&mut self, client_x: f32, client_y: f32, width: f32, height: f32) -> bool {
        match PointerState::from_client(client_x, client_y, width, height) {
            Some(pointer) => {
                self.pointer = pointer;
                true
            }
            None => {
                tracing::debug!(client_x, client_y, width, height, "ignoring pointer move for invalid viewport");
                false
            }
        }
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::PointerMoved { client_x, client_y, width, height } => {
                self.on_pointer_move(client_x, client_y, width, height)
            }
            // The pointer keeps its last position while the window is unfocused
            InputEvent::FocusLost => false,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub mod wasm {
    use super::*;
    use web_sys::{MouseEvent, Window};

    /// Viewport size in CSS pixels, matching `clientX`/`clientY`
    pub fn viewport_size(window: &Window) -> (f32, f32) {
        let width = window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(0.0);
        let height = window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(0.0);
        (width as f32, height as f32)
    }

    pub fn mouse_move_to_input(e: &MouseEvent, window: &Window) -> InputEvent {
        let (width, height) = viewport_size(window);
        InputEvent::PointerMoved {
            client_x: e.client_x() as f32,
            client_y: e.client_y() as f32,
            width,
            height,
        }
    }
}
