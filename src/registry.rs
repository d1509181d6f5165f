//! One device per category, updated in a fixed order.
//!
//! [`DeviceRegistry`] owns every [`Device`] and, through the gamepad variant,
//! the open platform gamepad handle. Nothing outside the registry can reach
//! the handle; it is opened and closed only inside hotplug handling and
//! [`DeviceRegistry::update`].
//!
//! Update order is Keyboard, Mouse, Gamepad, Touch, Motion. Devices that are
//! not registered (motion when disabled, or everything but keyboard/mouse in
//! reduced mode) are simply absent and read as neutral.

use log::debug;

use crate::backends::PlatformSource;
use crate::device::{Device, Gamepad, Keyboard, Motion, Mouse, Touch};
use crate::event::{DeviceCategory, GamepadAxis, GamepadId, PhysicalInput, TouchId};
use crate::snapshot::shape_axis;

pub struct DeviceRegistry {
    devices: Vec<Device>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl DeviceRegistry {
    /// No devices at all; every query is neutral.
    pub fn empty() -> Self {
        Self {
            devices: Vec::new(),
        }
    }

    /// All categories, motion optional.
    pub fn full(platform: &dyn PlatformSource, with_motion: bool) -> Self {
        let mut devices = vec![
            Device::Keyboard(Keyboard::default()),
            Device::Mouse(Mouse::default()),
            Device::Gamepad(Gamepad::default()),
            Device::Touch(Touch::new(platform.touch_supported())),
        ];
        if with_motion {
            devices.push(Device::Motion(Motion::default()));
        }
        Self { devices }
    }

    /// Keyboard and mouse only, for hosts whose controller subsystem failed to start.
    pub fn reduced() -> Self {
        Self {
            devices: vec![
                Device::Keyboard(Keyboard::default()),
                Device::Mouse(Mouse::default()),
            ],
        }
    }

    /// Categories present, in update order.
    pub fn categories(&self) -> Vec<DeviceCategory> {
        self.devices.iter().map(Device::category).collect()
    }

    /// Bind the first compatible gamepad, if controllers are supported.
    pub fn resolve_gamepad(&mut self, platform: &mut dyn PlatformSource) {
        if let (Some(gamepad), Some(backend)) = (self.gamepad_mut(), platform.gamepads()) {
            gamepad.resolve(backend);
        }
    }

    pub fn on_gamepad_added(&mut self, platform: &mut dyn PlatformSource, slot: u32) {
        if let (Some(gamepad), Some(backend)) = (self.gamepad_mut(), platform.gamepads()) {
            gamepad.on_added(backend, slot);
        }
    }

    pub fn on_gamepad_removed(&mut self, platform: &mut dyn PlatformSource, id: GamepadId) {
        match (self.gamepad_mut(), platform.gamepads()) {
            (Some(gamepad), Some(backend)) => gamepad.on_removed(backend, id),
            _ => debug!("detach of {:?} ignored: no gamepad support", id),
        }
    }

    pub fn on_touch_down(&mut self, id: TouchId, x: f32, y: f32) {
        if let Some(touch) = self.touch_mut() {
            touch.on_down(id, x, y);
        }
    }

    pub fn on_touch_motion(&mut self, id: TouchId, x: f32, y: f32) {
        if let Some(touch) = self.touch_mut() {
            touch.on_motion(id, x, y);
        }
    }

    pub fn on_touch_up(&mut self, id: TouchId) {
        if let Some(touch) = self.touch_mut() {
            touch.on_up(id);
        }
    }

    /// Update every device exactly once, in registration order.
    pub fn update(&mut self, platform: &mut dyn PlatformSource) {
        for device in &mut self.devices {
            device.update(platform);
        }
    }

    /// Close the gamepad handle and drop all devices.
    pub fn shutdown(&mut self, platform: &mut dyn PlatformSource) {
        match (self.gamepad_mut(), platform.gamepads()) {
            (Some(gamepad), Some(backend)) => gamepad.release(backend),
            (Some(gamepad), None) => gamepad.abandon(),
            (None, _) => {}
        }
        self.devices.clear();
    }

    pub fn is_available(&self, category: DeviceCategory) -> bool {
        self.devices
            .iter()
            .any(|device| device.category() == category && device.is_available())
    }

    /// Current digital state of `input`. Axes count as down when outside `deadzone`.
    pub fn is_down(&self, input: PhysicalInput, deadzone: f32) -> bool {
        match input {
            PhysicalInput::Key(key) => self.keyboard().is_some_and(|k| k.is_down(key)),
            PhysicalInput::MouseButton(button) => self.mouse().is_some_and(|m| m.is_down(button)),
            PhysicalInput::GamepadButton(button) => {
                self.gamepad().is_some_and(|g| g.is_down(button))
            }
            PhysicalInput::GamepadAxis(axis) => self.shaped_axis(axis, deadzone) != 0.0,
            PhysicalInput::Touch => self.touch().is_some_and(|t| t.is_active()),
        }
    }

    pub fn is_pressed(&self, input: PhysicalInput) -> bool {
        match input {
            PhysicalInput::Key(key) => self.keyboard().is_some_and(|k| k.is_pressed(key)),
            PhysicalInput::MouseButton(button) => {
                self.mouse().is_some_and(|m| m.is_pressed(button))
            }
            PhysicalInput::GamepadButton(button) => {
                self.gamepad().is_some_and(|g| g.is_pressed(button))
            }
            PhysicalInput::GamepadAxis(_) => false,
            PhysicalInput::Touch => self.touch().is_some_and(|t| t.began()),
        }
    }

    pub fn is_released(&self, input: PhysicalInput) -> bool {
        match input {
            PhysicalInput::Key(key) => self.keyboard().is_some_and(|k| k.is_released(key)),
            PhysicalInput::MouseButton(button) => {
                self.mouse().is_some_and(|m| m.is_released(button))
            }
            PhysicalInput::GamepadButton(button) => {
                self.gamepad().is_some_and(|g| g.is_released(button))
            }
            PhysicalInput::GamepadAxis(_) => false,
            PhysicalInput::Touch => self.touch().is_some_and(|t| t.ended()),
        }
    }

    /// Normalized axis in `[-1, 1]` before deadzone shaping.
    pub fn raw_axis(&self, axis: GamepadAxis) -> f32 {
        self.gamepad().map_or(0.0, |g| g.axis(axis))
    }

    pub fn shaped_axis(&self, axis: GamepadAxis, deadzone: f32) -> f32 {
        shape_axis(self.raw_axis(axis), deadzone)
    }

    pub fn keyboard(&self) -> Option<&Keyboard> {
        self.devices.iter().find_map(|device| match device {
            Device::Keyboard(keyboard) => Some(keyboard),
            _ => None,
        })
    }

    pub fn mouse(&self) -> Option<&Mouse> {
        self.devices.iter().find_map(|device| match device {
            Device::Mouse(mouse) => Some(mouse),
            _ => None,
        })
    }

    pub fn gamepad(&self) -> Option<&Gamepad> {
        self.devices.iter().find_map(|device| match device {
            Device::Gamepad(gamepad) => Some(gamepad),
            _ => None,
        })
    }

    pub fn touch(&self) -> Option<&Touch> {
        self.devices.iter().find_map(|device| match device {
            Device::Touch(touch) => Some(touch),
            _ => None,
        })
    }

    pub fn motion(&self) -> Option<&Motion> {
        self.devices.iter().find_map(|device| match device {
            Device::Motion(motion) => Some(motion),
            _ => None,
        })
    }

    fn gamepad_mut(&mut self) -> Option<&mut Gamepad> {
        self.devices.iter_mut().find_map(|device| match device {
            Device::Gamepad(gamepad) => Some(gamepad),
            _ => None,
        })
    }

    fn touch_mut(&mut self) -> Option<&mut Touch> {
        self.devices.iter_mut().find_map(|device| match device {
            Device::Touch(touch) => Some(touch),
            _ => None,
        })
    }
}
