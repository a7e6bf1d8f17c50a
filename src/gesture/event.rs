use tokio::sync::mpsc;

use super::state::{GestureState, MouseButton};

/// Relative cursor range of the synthesized mouse
pub const CURSOR_MIN: i32 = -1024;
pub const CURSOR_MAX: i32 = 1023;
/// Wheel range of the synthesized mouse
pub const WHEEL_MIN: i32 = -127;
pub const WHEEL_MAX: i32 = 127;

/// Synthesized mouse output. Relative axes hold the delta produced by the
/// event being posted; buttons hold the current button mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseOutput {
    pub x: i16,
    pub y: i16,
    pub wheel: i8,
    pub buttons: u8,
}

impl MouseOutput {
    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.buttons & button.mask() != 0
    }

    /// Returns true if this output carries any relative motion
    pub fn has_motion(&self) -> bool {
        self.x != 0 || self.y != 0 || self.wheel != 0
    }
}

/// Event handed to a [GestureEventListener] whenever the output changes. It
/// also exposes the toggle gesture so the listener can consume it.
#[derive(Debug)]
pub struct GestureEvent<'a> {
    output: MouseOutput,
    state: &'a mut GestureState,
}

impl<'a> GestureEvent<'a> {
    pub(crate) fn new(output: MouseOutput, state: &'a mut GestureState) -> Self {
        Self { output, state }
    }

    /// Snapshot of the synthesized mouse output
    pub fn output(&self) -> MouseOutput {
        self.output
    }

    /// The current gesture state
    pub fn state(&self) -> GestureState {
        *self.state
    }

    /// Returns true if a four-finger toggle gesture is waiting to be consumed
    pub fn is_toggle_event(&self) -> bool {
        *self.state == GestureState::Toggle
    }

    /// Reset the gesture state, consuming a pending toggle gesture
    pub fn clear_gesture_state(&mut self) {
        *self.state = GestureState::None;
    }
}

/// Sink for synthesized mouse events. Listeners are called from whichever
/// context owns the engine, which is not necessarily the thread that pulls
/// samples from the hardware, hence the [Send] bound.
pub trait GestureEventListener: Send {
    fn on_gesture_event(&mut self, event: &mut GestureEvent<'_>);
}

/// Forward every output snapshot over a channel
impl GestureEventListener for mpsc::UnboundedSender<MouseOutput> {
    fn on_gesture_event(&mut self, event: &mut GestureEvent<'_>) {
        if let Err(e) = self.send(event.output()) {
            log::debug!("Gesture event receiver is gone: {e}");
        }
    }
}
