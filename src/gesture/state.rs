/// Gesture currently driving the synthesized mouse semantics. Exactly one
/// state holds at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GestureState {
    #[default]
    None,
    OneFingerMove,
    OneFingerSingleTap,
    OneFingerDoubleTap,
    /// Double tap where the second tap is held down
    OneFingerDoubleTapHold,
    TwoFingerSingleTap,
    TwoFingerDoubleTap,
    TwoFingerMove,
    // Edge gestures are reserved and never entered
    LeftEdge,
    RightEdge,
    TopEdge,
    BottomEdge,
    Toggle,
}

impl GestureState {
    pub fn as_str(&self) -> &str {
        match self {
            GestureState::None => "none",
            GestureState::OneFingerMove => "one-finger-move",
            GestureState::OneFingerSingleTap => "one-finger-single-tap",
            GestureState::OneFingerDoubleTap => "one-finger-double-tap",
            GestureState::OneFingerDoubleTapHold => "one-finger-double-tap-hold",
            GestureState::TwoFingerSingleTap => "two-finger-single-tap",
            GestureState::TwoFingerDoubleTap => "two-finger-double-tap",
            GestureState::TwoFingerMove => "two-finger-move",
            GestureState::LeftEdge => "left-edge",
            GestureState::RightEdge => "right-edge",
            GestureState::TopEdge => "top-edge",
            GestureState::BottomEdge => "bottom-edge",
            GestureState::Toggle => "toggle",
        }
    }
}

impl std::fmt::Display for GestureState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Mouse buttons driven by tap gestures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// Bit of this button in the report button mask
    pub fn mask(&self) -> u8 {
        match self {
            MouseButton::Left => 0x1,
            MouseButton::Right => 0x2,
        }
    }
}

/// A single synthesized button transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonStep {
    pub button: MouseButton,
    pub pressed: bool,
}

impl ButtonStep {
    pub const fn press(button: MouseButton) -> Self {
        Self {
            button,
            pressed: true,
        }
    }

    pub const fn release(button: MouseButton) -> Self {
        Self {
            button,
            pressed: false,
        }
    }
}

const LEFT_DOWN: ButtonStep = ButtonStep::press(MouseButton::Left);
const LEFT_UP: ButtonStep = ButtonStep::release(MouseButton::Left);
const RIGHT_DOWN: ButtonStep = ButtonStep::press(MouseButton::Right);
const RIGHT_UP: ButtonStep = ButtonStep::release(MouseButton::Right);

/// How a closed short-tap window is turned into button transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TapRule {
    /// Most contacts seen simultaneously during the window
    pub max_contacts: usize,
    /// Down/up edges of the focus finger within the window
    pub taps: u32,
    /// Gesture that was recognized
    pub gesture: GestureState,
    /// State the engine is left in once the buttons were queued
    pub settles_to: GestureState,
    /// Button transitions to synthesize, paced apart
    pub buttons: &'static [ButtonStep],
    /// Clear the max contact count right away
    pub resets_max_contacts: bool,
}

/// Classification table for expired short-tap windows
pub const TAP_RULES: &[TapRule] = &[
    TapRule {
        max_contacts: 1,
        taps: 1,
        gesture: GestureState::OneFingerMove,
        settles_to: GestureState::OneFingerMove,
        buttons: &[],
        resets_max_contacts: false,
    },
    TapRule {
        max_contacts: 1,
        taps: 2,
        gesture: GestureState::OneFingerSingleTap,
        settles_to: GestureState::None,
        buttons: &[LEFT_DOWN, LEFT_UP],
        resets_max_contacts: false,
    },
    TapRule {
        max_contacts: 1,
        taps: 3,
        gesture: GestureState::OneFingerDoubleTapHold,
        settles_to: GestureState::OneFingerDoubleTapHold,
        buttons: &[LEFT_DOWN],
        resets_max_contacts: false,
    },
    TapRule {
        max_contacts: 1,
        taps: 4,
        gesture: GestureState::OneFingerDoubleTap,
        settles_to: GestureState::None,
        buttons: &[LEFT_DOWN, LEFT_UP, LEFT_DOWN, LEFT_UP],
        resets_max_contacts: false,
    },
    TapRule {
        max_contacts: 2,
        taps: 1,
        gesture: GestureState::TwoFingerMove,
        settles_to: GestureState::TwoFingerMove,
        buttons: &[],
        resets_max_contacts: false,
    },
    TapRule {
        max_contacts: 2,
        taps: 2,
        gesture: GestureState::TwoFingerSingleTap,
        settles_to: GestureState::None,
        buttons: &[RIGHT_DOWN, RIGHT_UP],
        resets_max_contacts: false,
    },
    TapRule {
        max_contacts: 2,
        taps: 3,
        gesture: GestureState::TwoFingerDoubleTap,
        settles_to: GestureState::TwoFingerDoubleTap,
        buttons: &[RIGHT_DOWN, RIGHT_UP, RIGHT_DOWN],
        resets_max_contacts: true,
    },
    // NOTE: this is the only two-finger rule driving the LEFT button. Kept
    // as-is until product owners confirm whether it should be the right one.
    TapRule {
        max_contacts: 2,
        taps: 4,
        gesture: GestureState::TwoFingerDoubleTap,
        settles_to: GestureState::TwoFingerDoubleTap,
        buttons: &[LEFT_DOWN, LEFT_UP, LEFT_DOWN, LEFT_UP],
        resets_max_contacts: false,
    },
];

/// Look up the rule for the given window outcome
pub fn classify(max_contacts: usize, taps: u32) -> Option<&'static TapRule> {
    TAP_RULES
        .iter()
        .find(|rule| rule.max_contacts == max_contacts && rule.taps == taps)
}
