//! Events and input identifiers.
//!
//! The platform feeds the manager two things: a queue of structural
//! [`PlatformEvent`]s (hotplug, touch contacts, activity markers, window
//! events) and synchronous raw-state reads. Application code addresses inputs
//! through [`PhysicalInput`], a tagged identifier that stays stable across
//! frames and across gamepad replacement.
//!
//! ## Value conventions
//! - **Keys:** dense [`Scancode`] in `0..KEY_COUNT` (USB HID usage numbering).
//! - **Mouse buttons:** 1-based [`MouseButton`] index, bit `index - 1` of the button mask.
//! - **Gamepad buttons/axes:** logical [`GamepadButton`] / [`GamepadAxis`], decoupled
//!   from raw platform indices (see `from_raw`).
//! - **Axes:** normalized to `[-1.0, 1.0]`; triggers only use `[0.0, 1.0]`.
//! - **Touch positions:** whatever the platform reports (usually normalized `0..1`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of scancodes tracked by the keyboard snapshot.
pub const KEY_COUNT: usize = 512;

/// Physical key, addressed by position rather than layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Scancode(pub u16);

impl Scancode {
    pub const A: Self = Self(4);
    pub const B: Self = Self(5);
    pub const C: Self = Self(6);
    pub const D: Self = Self(7);
    pub const E: Self = Self(8);
    pub const F: Self = Self(9);
    pub const Q: Self = Self(20);
    pub const R: Self = Self(21);
    pub const S: Self = Self(22);
    pub const W: Self = Self(26);
    pub const NUM_1: Self = Self(30);
    pub const NUM_2: Self = Self(31);
    pub const NUM_3: Self = Self(32);
    pub const RETURN: Self = Self(40);
    pub const ESCAPE: Self = Self(41);
    pub const BACKSPACE: Self = Self(42);
    pub const TAB: Self = Self(43);
    pub const SPACE: Self = Self(44);
    pub const RIGHT: Self = Self(79);
    pub const LEFT: Self = Self(80);
    pub const DOWN: Self = Self(81);
    pub const UP: Self = Self(82);
    pub const LCTRL: Self = Self(224);
    pub const LSHIFT: Self = Self(225);
    pub const LALT: Self = Self(226);
    pub const RCTRL: Self = Self(228);
    pub const RSHIFT: Self = Self(229);

    /// Dense array index, or `None` when the code is outside the tracked range.
    #[inline]
    pub fn index(self) -> Option<usize> {
        let idx = self.0 as usize;
        (idx < KEY_COUNT).then_some(idx)
    }
}

/// 1-based mouse button index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MouseButton(pub u8);

impl MouseButton {
    pub const LEFT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);
    pub const RIGHT: Self = Self(3);
    pub const X1: Self = Self(4);
    pub const X2: Self = Self(5);

    /// Highest index representable in the 32-bit button mask.
    pub const MAX_INDEX: u8 = 32;

    /// Bit position in the button mask, `None` for index 0 or past the mask.
    #[inline]
    pub fn bit(self) -> Option<usize> {
        (1..=Self::MAX_INDEX)
            .contains(&self.0)
            .then(|| self.0 as usize - 1)
    }
}

/// Logical gamepad button.
///
/// Discriminants follow the common controller-database ordering so that raw
/// platform indices can be converted with [`GamepadButton::from_raw`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GamepadButton {
    A,
    B,
    X,
    Y,
    Back,
    Guide,
    Start,
    LeftStick,
    RightStick,
    LeftShoulder,
    RightShoulder,
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    Misc1,
    Paddle1,
    Paddle2,
    Paddle3,
    Paddle4,
    Touchpad,
}

impl GamepadButton {
    pub const COUNT: usize = 21;

    pub const ALL: [GamepadButton; Self::COUNT] = [
        Self::A,
        Self::B,
        Self::X,
        Self::Y,
        Self::Back,
        Self::Guide,
        Self::Start,
        Self::LeftStick,
        Self::RightStick,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::DPadUp,
        Self::DPadDown,
        Self::DPadLeft,
        Self::DPadRight,
        Self::Misc1,
        Self::Paddle1,
        Self::Paddle2,
        Self::Paddle3,
        Self::Paddle4,
        Self::Touchpad,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a raw platform button index; unknown indices yield `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    /// Human-readable label for UIs.
    pub fn name(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::X => "X",
            Self::Y => "Y",
            Self::Back => "Back",
            Self::Guide => "Guide",
            Self::Start => "Start",
            Self::LeftStick => "Left Stick",
            Self::RightStick => "Right Stick",
            Self::LeftShoulder => "Left Shoulder",
            Self::RightShoulder => "Right Shoulder",
            Self::DPadUp => "D-Pad Up",
            Self::DPadDown => "D-Pad Down",
            Self::DPadLeft => "D-Pad Left",
            Self::DPadRight => "D-Pad Right",
            Self::Misc1 => "Misc",
            Self::Paddle1 => "Paddle 1",
            Self::Paddle2 => "Paddle 2",
            Self::Paddle3 => "Paddle 3",
            Self::Paddle4 => "Paddle 4",
            Self::Touchpad => "Touchpad",
        }
    }
}

/// Logical gamepad axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
    TriggerLeft,
    TriggerRight,
}

impl GamepadAxis {
    pub const COUNT: usize = 6;

    pub const ALL: [GamepadAxis; Self::COUNT] = [
        Self::LeftX,
        Self::LeftY,
        Self::RightX,
        Self::RightY,
        Self::TriggerLeft,
        Self::TriggerRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map a raw platform axis index; unknown indices yield `None`.
    pub fn from_raw(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::LeftX => "Left X",
            Self::LeftY => "Left Y",
            Self::RightX => "Right X",
            Self::RightY => "Right Y",
            Self::TriggerLeft => "Left Trigger",
            Self::TriggerRight => "Right Trigger",
        }
    }
}

/// Device category. Also serves as the active-input-method indicator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceCategory {
    #[default]
    Keyboard,
    Mouse,
    Gamepad,
    Touch,
    Motion,
}

impl fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Keyboard => "keyboard",
            Self::Mouse => "mouse",
            Self::Gamepad => "gamepad",
            Self::Touch => "touch",
            Self::Motion => "motion",
        };
        f.write_str(name)
    }
}

/// Tagged identifier of something a binding can listen to.
///
/// Ordering is by tag, then value; command dispatch walks bindings in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PhysicalInput {
    Key(Scancode),
    MouseButton(MouseButton),
    GamepadButton(GamepadButton),
    GamepadAxis(GamepadAxis),
    /// Any active touch contact.
    Touch,
}

impl PhysicalInput {
    pub fn category(&self) -> DeviceCategory {
        match self {
            Self::Key(_) => DeviceCategory::Keyboard,
            Self::MouseButton(_) => DeviceCategory::Mouse,
            Self::GamepadButton(_) | Self::GamepadAxis(_) => DeviceCategory::Gamepad,
            Self::Touch => DeviceCategory::Touch,
        }
    }

    /// Whether the identifier addresses something the snapshots can track.
    pub fn is_known(&self) -> bool {
        match self {
            Self::Key(code) => code.index().is_some(),
            Self::MouseButton(button) => button.bit().is_some(),
            _ => true,
        }
    }
}

/// Platform-assigned instance id of an opened gamepad.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GamepadId(pub u32);

/// Platform-assigned finger id; stable for the lifetime of one contact.
pub type TouchId = i64;

/// One active touch contact.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub id: TouchId,
    pub x: f32,
    pub y: f32,
    pub pressed: bool,
}

/// Structural event drained from the platform queue once per frame.
///
/// Hotplug, touch and activity events are consumed by the manager; everything
/// else is forwarded untouched (see [`PlatformEvent::is_pass_through`]).
#[derive(Clone, Debug, PartialEq)]
pub enum PlatformEvent {
    /// A compatible gamepad appeared at enumeration `slot`.
    GamepadAdded { slot: u32 },
    /// The gamepad instance `id` went away.
    GamepadRemoved { id: GamepadId },
    TouchDown { finger: TouchId, x: f32, y: f32 },
    TouchMotion { finger: TouchId, x: f32, y: f32 },
    TouchUp { finger: TouchId, x: f32, y: f32 },
    /// Raw activity on a device (key, mouse motion/button, pad button/axis).
    Activity(DeviceCategory),
    Quit,
    WindowResized { width: u32, height: u32 },
    /// Anything else the platform reports; `code` is platform specific.
    Other { code: u32 },
}

impl PlatformEvent {
    /// Events the input core does not handle itself.
    pub fn is_pass_through(&self) -> bool {
        matches!(
            self,
            Self::Quit | Self::WindowResized { .. } | Self::Other { .. }
        )
    }
}
