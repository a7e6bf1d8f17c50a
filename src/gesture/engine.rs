use std::{collections::VecDeque, fmt, sync::Arc};

use crate::config::GestureConfig;

use super::{
    contact::{ContactArray, ContactSlot, RawTouchSample, TouchPoint, MAX_CONTACTS},
    event::{
        GestureEvent, GestureEventListener, MouseOutput, CURSOR_MAX, CURSOR_MIN, WHEEL_MAX,
        WHEEL_MIN,
    },
    state::{self, ButtonStep, GestureState, MouseButton},
    timer::TapTimer,
    GestureError,
};

/// Identifies one armed short-tap window. Expirations carrying the token of a
/// window that was superseded or cancelled are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeoutToken(u64);

/// Called from the timer task when a short-tap window elapses. Implementations
/// must hand the token back to the engine's owner, which then calls
/// [GestureEngine::on_timeout].
pub type TimeoutNotifier = Arc<dyn Fn(TimeoutToken) + Send + Sync>;

/// Kind of stroke the focus finger is currently drawing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrokeKind {
    Cursor,
    Scroll,
}

/// Reference position of the current stroke
#[derive(Debug, Clone, Copy)]
struct Stroke {
    kind: StrokeKind,
    x: i32,
    y: i32,
}

/// Gesture recognition state machine. Tracks every finger slot, counts taps
/// of the focus finger within a short-tap window and turns the result into
/// relative cursor motion, scrolling and button clicks.
///
/// The engine has a single owner: touch samples ([GestureEngine::inject_touch_point])
/// and window expirations ([GestureEngine::on_timeout]) must be delivered by the
/// same context. Button transitions are queued and applied with
/// [GestureEngine::apply_next_button], which lets the owner pace them.
pub struct GestureEngine {
    config: GestureConfig,
    timer: TapTimer,
    notifier: TimeoutNotifier,
    listener: Option<Box<dyn GestureEventListener>>,
    previous: ContactArray,
    current: ContactArray,
    contact_count: usize,
    max_contact_count: usize,
    short_tap_count: u32,
    first_contact: Option<TouchPoint>,
    last_release: bool,
    state: GestureState,
    output: MouseOutput,
    stroke: Option<Stroke>,
    /// Window waiting to be classified
    window: Option<TimeoutToken>,
    next_token: u64,
    pending_buttons: VecDeque<ButtonStep>,
}

impl GestureEngine {
    /// Create a new engine. The notifier is invoked from the timer task
    /// whenever a short-tap window elapses.
    pub fn new<F>(config: GestureConfig, notifier: F) -> Result<Self, GestureError>
    where
        F: Fn(TimeoutToken) + Send + Sync + 'static,
    {
        let timer = TapTimer::new()?;
        Ok(Self {
            config,
            timer,
            notifier: Arc::new(notifier),
            listener: None,
            previous: ContactArray::new(),
            current: ContactArray::new(),
            contact_count: 0,
            max_contact_count: 0,
            short_tap_count: 0,
            first_contact: None,
            last_release: false,
            state: GestureState::None,
            output: MouseOutput::default(),
            stroke: None,
            window: None,
            next_token: 0,
            pending_buttons: VecDeque::new(),
        })
    }

    /// Register the sink for synthesized mouse events
    pub fn set_event_listener<L>(&mut self, listener: L)
    where
        L: GestureEventListener + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    /// Process a new touch sample from the digitizer. Samples with an
    /// out-of-range contact id are rejected without touching any state.
    pub fn inject_touch_point(&mut self, sample: RawTouchSample) -> Result<(), GestureError> {
        let slot = ContactSlot::try_from(sample.contact_id)?;
        let point = TouchPoint::from_sample(slot, &sample);
        log::trace!(
            "Touch [{}] {} ({}, {})",
            slot.index(),
            if point.down { "down" } else { "up" },
            point.x,
            point.y
        );

        // A window that elapsed before its timeout was delivered is settled
        // first, so this sample sees the classified state.
        if self.window.is_some() && self.timer.is_expired() {
            log::debug!("Short-tap window elapsed before its timeout was handled");
            self.close_window();
        }

        self.previous = self.current;
        self.current.set(point);

        // Edge detection
        let was_down = self.previous[slot].down;
        let contact_count_changed = point.down != was_down;
        if point.down && !was_down {
            self.contact_count = (self.contact_count + 1).min(MAX_CONTACTS);
            log::debug!("Contact count: {}", self.contact_count);
            if self.contact_count == 1 && self.window.is_none() {
                self.open_window(point);
            }
            self.max_contact_count = self.max_contact_count.max(self.contact_count);
        } else if !point.down && was_down {
            self.contact_count = self.contact_count.saturating_sub(1);
            log::debug!("Contact count: {}", self.contact_count);
            if self.contact_count == 0 {
                self.last_release = true;
            }
        }

        // Tap counting follows the focus finger only
        if slot.is_focus() && matches!(self.max_contact_count, 1 | 2) && self.is_window_open() {
            if !self.is_in_short_tap_range(&point) {
                log::debug!("Short-tap window cancelled by movement");
                self.cancel_window();
            }
            if contact_count_changed {
                self.short_tap_count += 1;
                log::debug!("Short tap count: {}", self.short_tap_count);
            }
        }

        if self.last_release && self.window.is_none() {
            self.finalize_gesture();
        }

        // Motion reporting
        if slot.is_focus() {
            match self.max_contact_count {
                1 => self.update_cursor(point.x, point.y, contact_count_changed),
                2 => self.update_scroll(point.x, point.y, contact_count_changed),
                _ => (),
            }
        }

        if self.max_contact_count == self.config.toggle_contacts && self.last_release {
            log::info!("Toggle gesture detected");
            self.state = GestureState::Toggle;
            self.post_gesture_event();
            // The toggle ends the gesture cycle; nothing is left to classify
            self.cancel_window();
            self.short_tap_count = 0;
            self.max_contact_count = 0;
        }

        if self.last_release {
            log::trace!("Last contact released");
            self.clear_contact_status();
            // Keep the max contact count for a window still waiting to be
            // classified.
            if self.window.is_none() {
                self.max_contact_count = 0;
            }
        }

        Ok(())
    }

    /// Handle the expiration of a short-tap window
    pub fn on_timeout(&mut self, token: TimeoutToken) {
        if self.window != Some(token) {
            log::trace!("Ignoring stale short-tap timeout: {token:?}");
            return;
        }
        self.close_window();
    }

    /// Apply the next queued button transition and notify the listener.
    /// Returns the applied transition, if any.
    pub fn apply_next_button(&mut self) -> Option<ButtonStep> {
        let step = self.pending_buttons.pop_front()?;
        self.update_button(step);
        Some(step)
    }

    /// Apply every queued button transition at once
    pub fn flush_buttons(&mut self) {
        while self.apply_next_button().is_some() {}
    }

    /// Returns true if button transitions are waiting to be applied
    pub fn has_pending_buttons(&self) -> bool {
        !self.pending_buttons.is_empty()
    }

    /// Returns true if the last gesture was the four-finger toggle
    pub fn is_toggle_event(&self) -> bool {
        self.state == GestureState::Toggle
    }

    /// Reset the gesture state, consuming a pending toggle gesture
    pub fn clear_gesture_state(&mut self) {
        self.state = GestureState::None;
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Current synthesized mouse output
    pub fn output(&self) -> MouseOutput {
        self.output
    }

    pub fn contact_count(&self) -> usize {
        self.contact_count
    }

    pub fn max_contact_count(&self) -> usize {
        self.max_contact_count
    }

    pub fn short_tap_count(&self) -> u32 {
        self.short_tap_count
    }

    /// Returns true while a short-tap window is armed and has not elapsed
    pub fn is_window_open(&self) -> bool {
        self.window.is_some() && !self.timer.is_expired()
    }

    /// Disarm any pending short-tap window
    pub fn stop(&mut self) {
        self.cancel_window();
    }

    /// Start a new short-tap window anchored at the given contact
    fn open_window(&mut self, point: TouchPoint) {
        self.next_token += 1;
        let token = TimeoutToken(self.next_token);
        self.first_contact = Some(point);
        self.short_tap_count = 0;
        self.window = Some(token);

        let notifier = self.notifier.clone();
        self.timer
            .start(self.config.short_tap_window(), move || notifier(token));
        log::debug!("Short-tap window opened: {token:?}");
    }

    /// Abandon the current window without classifying it
    fn cancel_window(&mut self) {
        self.timer.stop();
        self.window = None;
    }

    /// Classify the current window by max contacts and tap count
    fn close_window(&mut self) {
        self.window = None;
        let max_contacts = self.max_contact_count;
        let taps = self.short_tap_count;
        log::debug!("Short-tap window closed with {max_contacts} contact(s) and {taps} tap(s)");

        if let Some(rule) = state::classify(max_contacts, taps) {
            log::debug!("Recognized gesture: {}", rule.gesture);
            self.state = rule.settles_to;
            self.pending_buttons.extend(rule.buttons.iter().copied());
            if rule.resets_max_contacts {
                self.max_contact_count = 0;
            }
        }

        self.short_tap_count = 0;
        // Every finger lifted within the window; nothing left to track
        if self.contact_count == 0 {
            self.max_contact_count = 0;
        }
    }

    /// Finish gestures left pending by the window classification once every
    /// finger has been lifted.
    fn finalize_gesture(&mut self) {
        match self.state {
            GestureState::OneFingerDoubleTapHold => {
                log::debug!("End of one finger double tap");
                self.pending_buttons
                    .push_back(ButtonStep::release(MouseButton::Left));
                self.state = GestureState::None;
                self.max_contact_count = 0;
            }
            GestureState::TwoFingerDoubleTap => {
                log::debug!("End of two finger double tap");
                self.pending_buttons
                    .push_back(ButtonStep::release(MouseButton::Right));
                self.state = GestureState::None;
            }
            GestureState::OneFingerMove | GestureState::TwoFingerMove => {
                self.state = GestureState::None;
            }
            _ => (),
        }
    }

    /// Returns true if the focus finger is still close enough to the first
    /// contact for the current tap to count as a short tap.
    fn is_in_short_tap_range(&self, point: &TouchPoint) -> bool {
        let Some(first) = self.first_contact.as_ref() else {
            return true;
        };
        let limit = match self.short_tap_count {
            2 => self.config.short_move_tolerance,
            3 | 4 => self.config.short_move_range,
            _ => return true,
        };
        let distance = first.distance(point);
        if distance > limit {
            log::debug!(
                "Out of range at tap {}: {distance} > {limit}",
                self.short_tap_count
            );
            return false;
        }

        true
    }

    /// Only contact tracking is reset. The first contact, the tap counter and
    /// the max contact count outlive the release.
    fn clear_contact_status(&mut self) {
        self.contact_count = 0;
        self.last_release = false;
        self.previous.clear();
        self.current.clear();
    }

    /// Returns the reference of the stroke in progress, or records a new
    /// stroke of the given kind at this position and returns None.
    fn stroke_origin(
        &mut self,
        kind: StrokeKind,
        x: i32,
        y: i32,
        new_stroke: bool,
    ) -> Option<Stroke> {
        match self.stroke {
            Some(stroke) if !new_stroke && stroke.kind == kind => Some(stroke),
            _ => {
                log::trace!("New {kind:?} stroke at ({x}, {y})");
                self.stroke = Some(Stroke { kind, x, y });
                None
            }
        }
    }

    fn update_cursor(&mut self, x: i32, y: i32, new_stroke: bool) {
        let Some(stroke) = self.stroke_origin(StrokeKind::Cursor, x, y, new_stroke) else {
            return;
        };

        let dx = x - stroke.x;
        let dy = y - stroke.y;
        let delta = dx.abs() + dy.abs();
        if delta == 0 {
            return;
        }

        // Coarse velocity based acceleration
        let scale = match delta {
            d if d > 1000 => 8,
            d if d > 100 => 4,
            _ => 1,
        };
        self.output.x = (scale * dx).clamp(CURSOR_MIN, CURSOR_MAX) as i16;
        self.output.y = (scale * dy).clamp(CURSOR_MIN, CURSOR_MAX) as i16;
        log::trace!("Cursor ({}, {})", self.output.x, self.output.y);

        self.stroke = Some(Stroke {
            kind: StrokeKind::Cursor,
            x,
            y,
        });
        self.post_gesture_event();
    }

    fn update_scroll(&mut self, x: i32, y: i32, new_stroke: bool) {
        let y = self.config.max_mouse_y - y;
        let Some(stroke) = self.stroke_origin(StrokeKind::Scroll, x, y, new_stroke) else {
            return;
        };

        let delta = stroke.y - y;
        if delta == 0 {
            return;
        }
        self.output.wheel = delta.clamp(WHEEL_MIN, WHEEL_MAX) as i8;
        log::trace!("Wheel {}", self.output.wheel);

        self.stroke = Some(Stroke {
            kind: StrokeKind::Scroll,
            x,
            y,
        });
        self.post_gesture_event();
    }

    fn update_button(&mut self, step: ButtonStep) {
        if step.pressed {
            self.output.buttons |= step.button.mask();
            log::debug!("{:?} button pressed", step.button);
        } else {
            self.output.buttons &= !step.button.mask();
            log::debug!("{:?} button released", step.button);
        }
        self.post_gesture_event();
    }

    /// Notify the listener of the current output. Relative motion is only
    /// reported once.
    fn post_gesture_event(&mut self) {
        if let Some(listener) = self.listener.as_mut() {
            let mut event = GestureEvent::new(self.output, &mut self.state);
            listener.on_gesture_event(&mut event);
        } else {
            log::trace!("No gesture listener registered");
        }
        self.output.x = 0;
        self.output.y = 0;
        self.output.wheel = 0;
    }
}

impl fmt::Debug for GestureEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureEngine")
            .field("state", &self.state)
            .field("contact_count", &self.contact_count)
            .field("max_contact_count", &self.max_contact_count)
            .field("short_tap_count", &self.short_tap_count)
            .field("window", &self.window)
            .field("timer", &self.timer)
            .field("output", &self.output)
            .finish()
    }
}
