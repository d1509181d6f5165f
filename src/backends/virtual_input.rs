//! Scriptable in-memory platform.
//!
//! [`VirtualPlatform`] implements both [`PlatformSource`] and [`GamepadBackend`]
//! over plain state that callers mutate between frames: hold keys, move the
//! mouse, plug and unplug controllers, touch the screen. Useful for tests,
//! replays and headless hosts.
//!
//! Gamepad slots behave like a typical platform joystick list: slot `n` is the
//! `n`-th controller currently connected, so slots shift when one is removed,
//! while [`GamepadId`]s are never reused.

use std::collections::VecDeque;

use crate::backends::{GamepadBackend, MotionReading, MouseReading, OpenedGamepad, PlatformSource};
use crate::error::{InputError, Result};
use crate::event::{
    GamepadAxis, GamepadButton, GamepadId, MouseButton, PlatformEvent, Scancode, TouchId, KEY_COUNT,
};
use crate::metadata::DeviceMeta;

struct VirtualPad {
    id: GamepadId,
    name: String,
    buttons: [bool; GamepadButton::COUNT],
    axes: [i16; GamepadAxis::COUNT],
}

pub struct VirtualPlatform {
    events: VecDeque<PlatformEvent>,
    keys: Vec<u8>,
    keyboard_present: bool,
    mouse: MouseReading,
    mouse_present: bool,
    pending_delta: (i32, i32),
    touch_supported: bool,
    motion: Option<MotionReading>,
    gamepads_supported: bool,
    pads: Vec<VirtualPad>,
    opened: Vec<GamepadId>,
    next_instance: u32,
    fail_next_open: bool,
    init_error: Option<String>,
    initialized: bool,
}

impl Default for VirtualPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualPlatform {
    /// Keyboard, mouse, touchscreen and controller support; no motion sensors.
    pub fn new() -> Self {
        Self {
            events: VecDeque::new(),
            keys: vec![0; KEY_COUNT],
            keyboard_present: true,
            mouse: MouseReading::default(),
            mouse_present: true,
            pending_delta: (0, 0),
            touch_supported: true,
            motion: None,
            gamepads_supported: true,
            pads: Vec::new(),
            opened: Vec::new(),
            next_instance: 0,
            fail_next_open: false,
            init_error: None,
            initialized: false,
        }
    }

    /// Inject a raw structural event.
    pub fn feed(&mut self, event: PlatformEvent) {
        self.events.push_back(event);
    }

    pub fn press_key(&mut self, key: Scancode) {
        if let Some(idx) = key.index() {
            self.keys[idx] = 1;
        }
    }

    pub fn release_key(&mut self, key: Scancode) {
        if let Some(idx) = key.index() {
            self.keys[idx] = 0;
        }
    }

    pub fn set_keyboard_present(&mut self, present: bool) {
        self.keyboard_present = present;
    }

    pub fn set_mouse_present(&mut self, present: bool) {
        self.mouse_present = present;
    }

    /// Move the pointer by a relative amount. The delta is reported on the next frame.
    pub fn move_mouse(&mut self, dx: i32, dy: i32) {
        self.mouse.x += dx;
        self.mouse.y += dy;
        self.pending_delta.0 += dx;
        self.pending_delta.1 += dy;
    }

    pub fn press_mouse_button(&mut self, button: MouseButton) {
        if let Some(bit) = button.bit() {
            self.mouse.buttons |= 1 << bit;
        }
    }

    pub fn release_mouse_button(&mut self, button: MouseButton) {
        if let Some(bit) = button.bit() {
            self.mouse.buttons &= !(1 << bit);
        }
    }

    pub fn set_touch_supported(&mut self, supported: bool) {
        self.touch_supported = supported;
    }

    pub fn touch_down(&mut self, finger: TouchId, x: f32, y: f32) {
        self.feed(PlatformEvent::TouchDown { finger, x, y });
    }

    pub fn touch_move(&mut self, finger: TouchId, x: f32, y: f32) {
        self.feed(PlatformEvent::TouchMotion { finger, x, y });
    }

    pub fn touch_up(&mut self, finger: TouchId, x: f32, y: f32) {
        self.feed(PlatformEvent::TouchUp { finger, x, y });
    }

    /// Install (or remove, with `None`) motion sensors.
    pub fn set_motion(&mut self, reading: Option<MotionReading>) {
        self.motion = reading;
    }

    pub fn set_gamepads_supported(&mut self, supported: bool) {
        self.gamepads_supported = supported;
    }

    /// Make the next [`PlatformSource::init`] fail with `message`.
    pub fn fail_init(&mut self, message: impl Into<String>) {
        self.init_error = Some(message.into());
    }

    /// Make the next [`GamepadBackend::open`] fail, as if the device vanished mid-open.
    pub fn fail_next_open(&mut self) {
        self.fail_next_open = true;
    }

    /// Plug in a controller and queue the matching attach event.
    pub fn connect_gamepad(&mut self, name: &str) -> GamepadId {
        let id = GamepadId(self.next_instance);
        self.next_instance += 1;
        self.pads.push(VirtualPad {
            id,
            name: name.to_string(),
            buttons: [false; GamepadButton::COUNT],
            axes: [0; GamepadAxis::COUNT],
        });
        let slot = (self.pads.len() - 1) as u32;
        self.feed(PlatformEvent::GamepadAdded { slot });
        id
    }

    /// Unplug a controller and queue the matching detach event.
    pub fn disconnect_gamepad(&mut self, id: GamepadId) {
        if self.remove_pad(id) {
            self.feed(PlatformEvent::GamepadRemoved { id });
        }
    }

    /// Unplug a controller without telling anyone.
    pub fn unplug_gamepad_silently(&mut self, id: GamepadId) {
        self.remove_pad(id);
    }

    pub fn press_button(&mut self, id: GamepadId, button: GamepadButton) {
        if let Some(pad) = self.pad_mut(id) {
            pad.buttons[button.index()] = true;
        }
    }

    pub fn release_button(&mut self, id: GamepadId, button: GamepadButton) {
        if let Some(pad) = self.pad_mut(id) {
            pad.buttons[button.index()] = false;
        }
    }

    pub fn set_axis(&mut self, id: GamepadId, axis: GamepadAxis, raw: i16) {
        if let Some(pad) = self.pad_mut(id) {
            pad.axes[axis.index()] = raw;
        }
    }

    /// Whether `id` is currently held open by a consumer.
    pub fn is_open(&self, id: GamepadId) -> bool {
        self.opened.contains(&id)
    }

    pub fn open_count(&self) -> usize {
        self.opened.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn remove_pad(&mut self, id: GamepadId) -> bool {
        let before = self.pads.len();
        self.pads.retain(|pad| pad.id != id);
        before != self.pads.len()
    }

    fn pad(&self, id: GamepadId) -> Option<&VirtualPad> {
        self.pads.iter().find(|pad| pad.id == id)
    }

    fn pad_mut(&mut self, id: GamepadId) -> Option<&mut VirtualPad> {
        self.pads.iter_mut().find(|pad| pad.id == id)
    }

    fn open_pad(&self, id: GamepadId) -> Option<&VirtualPad> {
        if self.is_open(id) {
            self.pad(id)
        } else {
            None
        }
    }
}

impl PlatformSource for VirtualPlatform {
    fn init(&mut self) -> Result<()> {
        if let Some(message) = self.init_error.take() {
            return Err(InputError::init_failure(message));
        }
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.initialized = false;
    }

    fn poll_event(&mut self) -> Option<PlatformEvent> {
        let event = self.events.pop_front();
        if event.is_none() {
            // Queue drained: this frame's relative motion becomes readable.
            self.mouse.dx = self.pending_delta.0;
            self.mouse.dy = self.pending_delta.1;
            self.pending_delta = (0, 0);
        }
        event
    }

    fn keyboard_state(&self) -> Option<&[u8]> {
        self.keyboard_present.then_some(self.keys.as_slice())
    }

    fn mouse_state(&self) -> Option<MouseReading> {
        self.mouse_present.then_some(self.mouse)
    }

    fn touch_supported(&self) -> bool {
        self.touch_supported
    }

    fn motion(&self) -> Option<MotionReading> {
        self.motion
    }

    fn gamepads(&mut self) -> Option<&mut dyn GamepadBackend> {
        if self.gamepads_supported {
            Some(self)
        } else {
            None
        }
    }
}

impl GamepadBackend for VirtualPlatform {
    fn scan(&mut self) -> Vec<u32> {
        (0..self.pads.len() as u32).collect()
    }

    fn open(&mut self, slot: u32) -> Option<OpenedGamepad> {
        if std::mem::take(&mut self.fail_next_open) {
            return None;
        }
        let pad = self.pads.get(slot as usize)?;
        let opened = OpenedGamepad {
            id: pad.id,
            meta: DeviceMeta {
                bus: Some("virtual".to_string()),
                product_string: Some(pad.name.clone()),
                slot: Some(slot),
                ..Default::default()
            },
        };
        if !self.opened.contains(&opened.id) {
            self.opened.push(opened.id);
        }
        Some(opened)
    }

    fn close(&mut self, id: GamepadId) {
        self.opened.retain(|open| *open != id);
    }

    fn is_attached(&self, id: GamepadId) -> bool {
        self.pad(id).is_some()
    }

    fn button(&self, id: GamepadId, button: GamepadButton) -> bool {
        self.open_pad(id)
            .map(|pad| pad.buttons[button.index()])
            .unwrap_or(false)
    }

    fn axis(&self, id: GamepadId, axis: GamepadAxis) -> i16 {
        self.open_pad(id).map(|pad| pad.axes[axis.index()]).unwrap_or(0)
    }
}
