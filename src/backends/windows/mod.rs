#![cfg(target_os = "windows")]

//! Windows input backends.
//!
//! - **XInput** controller support ([`XInputBackend`]), slot based, polled.
//!
//! Keyboard, mouse and touch come from the host's window loop; a host wires
//! this backend in by returning it from
//! [`PlatformSource::gamepads`](crate::backends::PlatformSource::gamepads).

pub mod xinput;

pub use xinput::XInputBackend;
