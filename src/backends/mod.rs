//! Platform backends for `deckinput`.
//!
//! The input core never talks to an OS API directly. It consumes a
//! [`PlatformSource`] (event queue + synchronous keyboard/mouse/motion reads)
//! and, through it, an optional [`GamepadBackend`] that enumerates, opens and
//! reads controllers.
//!
//! # Provided implementations
//! - [`virtual_input::VirtualPlatform`]: scriptable in-memory source, used by
//!   tests, demos and headless hosts.
//! - **`xinput`** feature (Windows): [`windows::XInputBackend`], a slot-based
//!   XInput gamepad backend. Hosts that own their window loop return it from
//!   [`PlatformSource::gamepads`].
//!
//! Hosts embedding a windowing library implement [`PlatformSource`] themselves,
//! translating the library's events into [`PlatformEvent`]s.

use crate::error::Result;
use crate::event::{GamepadAxis, GamepadButton, GamepadId, PlatformEvent};
use crate::metadata::DeviceMeta;

pub mod virtual_input;

#[cfg(all(feature = "xinput", target_os = "windows"))]
#[cfg_attr(docsrs, doc(cfg(all(feature = "xinput", target_os = "windows"))))]
pub mod windows;

/// Mouse state as reported by the platform for this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MouseReading {
    pub x: i32,
    pub y: i32,
    /// Motion since the previous frame, as computed by the platform.
    pub dx: i32,
    pub dy: i32,
    /// Bit `n` set means button `n + 1` is down.
    pub buttons: u32,
}

/// Motion-sensor sample (gyroscope in rad/s, accelerometer in m/s²).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MotionReading {
    pub gyro: [f32; 3],
    pub accel: [f32; 3],
}

/// Result of a successful [`GamepadBackend::open`].
#[derive(Clone, Debug)]
pub struct OpenedGamepad {
    pub id: GamepadId,
    pub meta: DeviceMeta,
}

/// Controller enumeration and polling.
pub trait GamepadBackend {
    /// Refresh cached controller state. Called once per frame before any read.
    fn poll(&mut self) {}

    /// Compatible controllers currently present, in platform order.
    fn scan(&mut self) -> Vec<u32>;

    /// Open the controller at `slot`. `None` when it vanished between scan and open.
    fn open(&mut self, slot: u32) -> Option<OpenedGamepad>;

    fn close(&mut self, id: GamepadId);

    /// Whether an opened controller is still physically attached.
    fn is_attached(&self, id: GamepadId) -> bool;

    fn button(&self, id: GamepadId, button: GamepadButton) -> bool;

    /// Raw signed reading; triggers use `0..=i16::MAX`.
    fn axis(&self, id: GamepadId, axis: GamepadAxis) -> i16;
}

/// The platform input layer the manager polls each frame.
pub trait PlatformSource {
    /// Bring up the input subsystem.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&mut self) {}

    /// Next queued structural event, `None` once the queue is drained.
    fn poll_event(&mut self) -> Option<PlatformEvent>;

    /// Dense key-state array indexed by scancode, non-zero meaning down.
    /// `None` when no keyboard is present.
    fn keyboard_state(&self) -> Option<&[u8]>;

    /// `None` when no pointer device is present.
    fn mouse_state(&self) -> Option<MouseReading>;

    fn touch_supported(&self) -> bool {
        false
    }

    /// Motion sample, `None` when the hardware has no motion sensors.
    fn motion(&self) -> Option<MotionReading> {
        None
    }

    /// Gamepad backend, `None` when controllers are unsupported.
    fn gamepads(&mut self) -> Option<&mut dyn GamepadBackend> {
        None
    }
}
