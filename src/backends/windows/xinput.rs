#![cfg(target_os = "windows")]

//! Windows XInput gamepad backend.
//!
//! Exposes the four XInput user slots as a [`GamepadBackend`]. XInput has no
//! hotplug notifications and no instance ids, so:
//! - [`GamepadBackend::scan`] probes all slots with `XInputGetState`;
//! - ids are synthesized from the slot plus a per-slot generation counter, so
//!   a controller re-plugged into the same slot gets a fresh [`GamepadId`];
//! - detaches are discovered by the registry's per-frame attached check.
//!
//! # Channel conventions
//! - Sticks: raw `i16`, Y inverted so that down is positive (matching the
//!   controller-database convention used by the rest of the crate).
//! - Triggers: `0..255` rescaled to `0..=i16::MAX`.
//! - Guide, Misc1, paddles and touchpad are not reported by XInput and read as up.

use crate::backends::{GamepadBackend, OpenedGamepad};
use crate::event::{GamepadAxis, GamepadButton, GamepadId};
use crate::metadata::DeviceMeta;

// Windows XInput FFI.
use windows_sys::Win32::UI::Input::XboxController::*;

/// Number of XInput user slots.
const SLOT_COUNT: u32 = 4;

#[derive(Clone, Copy, Default)]
struct SlotState {
    /// Generation of the currently open handle, if any.
    open: Option<u32>,
    generation: u32,
    connected: bool,
    buttons: u16,
    axes: [i16; GamepadAxis::COUNT],
}

/// XInput-backed controller enumeration and polling.
pub struct XInputBackend {
    slots: [SlotState; SLOT_COUNT as usize],
}

impl Default for XInputBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl XInputBackend {
    pub fn new() -> Self {
        Self {
            slots: [SlotState::default(); SLOT_COUNT as usize],
        }
    }

    fn read_slot(slot: u32) -> Option<XINPUT_GAMEPAD> {
        // FFI struct: must be manually zeroed
        let mut state: XINPUT_STATE = unsafe { std::mem::zeroed() };

        // NOTE: XInputGetState returns 0 on success.
        let res = unsafe { XInputGetState(slot, &mut state) };
        (res == 0).then_some(state.Gamepad)
    }

    fn store(&mut self, slot: u32, pad: Option<XINPUT_GAMEPAD>) {
        let entry = &mut self.slots[slot as usize];
        match pad {
            Some(gp) => {
                entry.connected = true;
                entry.buttons = gp.wButtons;
                entry.axes = [
                    gp.sThumbLX,
                    invert_y(gp.sThumbLY),
                    gp.sThumbRX,
                    invert_y(gp.sThumbRY),
                    trigger_to_raw(gp.bLeftTrigger),
                    trigger_to_raw(gp.bRightTrigger),
                ];
            }
            None => {
                entry.connected = false;
                entry.buttons = 0;
                entry.axes = [0; GamepadAxis::COUNT];
            }
        }
    }

    /// Slot state for `id`, only while that exact handle is open.
    fn open_slot(&self, id: GamepadId) -> Option<&SlotState> {
        let (slot, generation) = split_id(id);
        self.slots
            .get(slot as usize)
            .filter(|entry| entry.open == Some(generation))
    }
}

impl GamepadBackend for XInputBackend {
    fn poll(&mut self) {
        for slot in 0..SLOT_COUNT {
            if self.slots[slot as usize].open.is_some() {
                self.store(slot, Self::read_slot(slot));
            }
        }
    }

    fn scan(&mut self) -> Vec<u32> {
        let mut found = Vec::new();
        for slot in 0..SLOT_COUNT {
            let pad = Self::read_slot(slot);
            if pad.is_some() {
                found.push(slot);
            }
            self.store(slot, pad);
        }
        found
    }

    fn open(&mut self, slot: u32) -> Option<OpenedGamepad> {
        if slot >= SLOT_COUNT {
            return None;
        }
        let pad = Self::read_slot(slot)?;
        self.store(slot, Some(pad));

        let entry = &mut self.slots[slot as usize];
        entry.generation = entry.generation.wrapping_add(1);
        entry.open = Some(entry.generation);

        Some(OpenedGamepad {
            id: make_id(slot, entry.generation),
            meta: DeviceMeta {
                bus: Some("xinput".to_string()),
                // Microsoft, conventional for XInput devices.
                vid: Some(0x045e),
                product_string: Some(format!("XInput Controller {}", slot)),
                serial_number: Some(format!("xinput:{}", slot)),
                slot: Some(slot),
                ..Default::default()
            },
        })
    }

    fn close(&mut self, id: GamepadId) {
        let (slot, generation) = split_id(id);
        if let Some(entry) = self.slots.get_mut(slot as usize) {
            if entry.open == Some(generation) {
                entry.open = None;
            }
        }
    }

    fn is_attached(&self, id: GamepadId) -> bool {
        self.open_slot(id).is_some_and(|entry| entry.connected)
    }

    fn button(&self, id: GamepadId, button: GamepadButton) -> bool {
        match (self.open_slot(id), button_mask(button)) {
            (Some(entry), Some(mask)) => entry.buttons & mask != 0,
            _ => false,
        }
    }

    fn axis(&self, id: GamepadId, axis: GamepadAxis) -> i16 {
        self.open_slot(id)
            .map(|entry| entry.axes[axis.index()])
            .unwrap_or(0)
    }
}

#[inline]
fn make_id(slot: u32, generation: u32) -> GamepadId {
    GamepadId((generation << 2) | (slot & 0b11))
}

#[inline]
fn split_id(id: GamepadId) -> (u32, u32) {
    (id.0 & 0b11, id.0 >> 2)
}

/// XInput reports stick Y with up positive; flip it.
#[inline]
fn invert_y(v: i16) -> i16 {
    v.saturating_neg()
}

/// Map an 8-bit trigger onto `0..=i16::MAX`.
#[inline]
fn trigger_to_raw(v: u8) -> i16 {
    (v as i32 * i16::MAX as i32 / 255) as i16
}

fn button_mask(button: GamepadButton) -> Option<u16> {
    let mask = match button {
        GamepadButton::A => XINPUT_GAMEPAD_A,
        GamepadButton::B => XINPUT_GAMEPAD_B,
        GamepadButton::X => XINPUT_GAMEPAD_X,
        GamepadButton::Y => XINPUT_GAMEPAD_Y,
        GamepadButton::Back => XINPUT_GAMEPAD_BACK,
        GamepadButton::Start => XINPUT_GAMEPAD_START,
        GamepadButton::LeftStick => XINPUT_GAMEPAD_LEFT_THUMB,
        GamepadButton::RightStick => XINPUT_GAMEPAD_RIGHT_THUMB,
        GamepadButton::LeftShoulder => XINPUT_GAMEPAD_LEFT_SHOULDER,
        GamepadButton::RightShoulder => XINPUT_GAMEPAD_RIGHT_SHOULDER,
        GamepadButton::DPadUp => XINPUT_GAMEPAD_DPAD_UP,
        GamepadButton::DPadDown => XINPUT_GAMEPAD_DPAD_DOWN,
        GamepadButton::DPadLeft => XINPUT_GAMEPAD_DPAD_LEFT,
        GamepadButton::DPadRight => XINPUT_GAMEPAD_DPAD_RIGHT,
        _ => return None,
    };
    Some(mask as u16)
}
