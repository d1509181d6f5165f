use log::{debug, info, warn};

use crate::backends::{GamepadBackend, MotionReading, PlatformSource};
use crate::event::{
    DeviceCategory, GamepadAxis, GamepadButton, GamepadId, MouseButton, Scancode, TouchId,
    TouchPoint, KEY_COUNT,
};
use crate::metadata::DeviceMeta;
use crate::snapshot::{normalize_axis, DigitalSnapshot};

/// One input device, tagged by capability.
///
/// Each variant owns its own snapshot representation; the registry selects
/// behavior by matching on the tag.
pub enum Device {
    Keyboard(Keyboard),
    Mouse(Mouse),
    Gamepad(Gamepad),
    Touch(Touch),
    Motion(Motion),
}

impl Device {
    pub fn category(&self) -> DeviceCategory {
        match self {
            Device::Keyboard(_) => DeviceCategory::Keyboard,
            Device::Mouse(_) => DeviceCategory::Mouse,
            Device::Gamepad(_) => DeviceCategory::Gamepad,
            Device::Touch(_) => DeviceCategory::Touch,
            Device::Motion(_) => DeviceCategory::Motion,
        }
    }

    /// Refresh the snapshot from the platform. Called exactly once per frame.
    pub fn update(&mut self, platform: &mut dyn PlatformSource) {
        match self {
            Device::Keyboard(keyboard) => keyboard.update(platform),
            Device::Mouse(mouse) => mouse.update(platform),
            Device::Gamepad(gamepad) => gamepad.update(platform),
            Device::Touch(touch) => touch.update(platform),
            Device::Motion(motion) => motion.update(platform),
        }
    }

    pub fn is_available(&self) -> bool {
        match self {
            Device::Keyboard(keyboard) => keyboard.is_available(),
            Device::Mouse(mouse) => mouse.is_available(),
            Device::Gamepad(gamepad) => gamepad.is_available(),
            Device::Touch(touch) => touch.is_available(),
            Device::Motion(motion) => motion.has_capability(),
        }
    }
}

#[derive(Default)]
pub struct Keyboard {
    keys: DigitalSnapshot<KEY_COUNT>,
    available: bool,
}

impl Keyboard {
    fn update(&mut self, platform: &dyn PlatformSource) {
        match platform.keyboard_state() {
            Some(state) => {
                self.available = true;
                self.keys
                    .refresh(|idx| state.get(idx).is_some_and(|v| *v != 0));
            }
            None => {
                self.available = false;
                self.keys.advance();
                self.keys.clear();
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_down(&self, key: Scancode) -> bool {
        self.available && key.index().is_some_and(|idx| self.keys.is_down(idx))
    }

    pub fn is_pressed(&self, key: Scancode) -> bool {
        self.available && key.index().is_some_and(|idx| self.keys.is_pressed(idx))
    }

    pub fn is_released(&self, key: Scancode) -> bool {
        self.available && key.index().is_some_and(|idx| self.keys.is_released(idx))
    }
}

#[derive(Default)]
pub struct Mouse {
    buttons: DigitalSnapshot<{ MouseButton::MAX_INDEX as usize }>,
    position: (i32, i32),
    delta: (i32, i32),
    available: bool,
}

impl Mouse {
    fn update(&mut self, platform: &dyn PlatformSource) {
        match platform.mouse_state() {
            Some(reading) => {
                self.available = true;
                self.buttons
                    .refresh(|bit| reading.buttons & (1u32 << bit) != 0);
                self.position = (reading.x, reading.y);
                self.delta = (reading.dx, reading.dy);
            }
            None => {
                self.available = false;
                self.buttons.advance();
                self.buttons.clear();
                self.position = (0, 0);
                self.delta = (0, 0);
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_down(&self, button: MouseButton) -> bool {
        self.available && button.bit().is_some_and(|bit| self.buttons.is_down(bit))
    }

    pub fn is_pressed(&self, button: MouseButton) -> bool {
        self.available && button.bit().is_some_and(|bit| self.buttons.is_pressed(bit))
    }

    pub fn is_released(&self, button: MouseButton) -> bool {
        self.available && button.bit().is_some_and(|bit| self.buttons.is_released(bit))
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    pub fn delta(&self) -> (i32, i32) {
        self.delta
    }
}

/// An opened platform gamepad.
///
/// Owned by exactly one [`Gamepad`]; not `Clone`. It is released by
/// [`GamepadHandle::close`], which hands it back to the backend.
pub struct GamepadHandle {
    id: GamepadId,
    meta: DeviceMeta,
}

impl GamepadHandle {
    pub fn id(&self) -> GamepadId {
        self.id
    }

    pub fn meta(&self) -> &DeviceMeta {
        &self.meta
    }

    fn close(self, backend: &mut dyn GamepadBackend) {
        backend.close(self.id);
    }
}

#[derive(Default)]
pub struct Gamepad {
    handle: Option<GamepadHandle>,
    /// Handle still open in a backend that stopped being reachable. Closed
    /// as soon as the backend comes back, before anything else is opened.
    orphaned: Option<GamepadHandle>,
    buttons: DigitalSnapshot<{ GamepadButton::COUNT }>,
    axes: [f32; GamepadAxis::COUNT],
}

impl Gamepad {
    /// Open the first compatible controller, if none is bound yet.
    ///
    /// A slot that disappears between scan and open is skipped; if nothing
    /// opens, the next frame tries again.
    pub fn resolve(&mut self, backend: &mut dyn GamepadBackend) {
        self.close_orphan(backend);
        if self.handle.is_some() {
            return;
        }
        for slot in backend.scan() {
            if self.try_open(backend, slot) {
                return;
            }
        }
    }

    /// Attach event for `slot`.
    pub fn on_added(&mut self, backend: &mut dyn GamepadBackend, slot: u32) {
        self.close_orphan(backend);
        if self.handle.is_none() {
            self.try_open(backend, slot);
        }
    }

    /// Detach event for `id`: release the handle if it is ours, then rescan.
    pub fn on_removed(&mut self, backend: &mut dyn GamepadBackend, id: GamepadId) {
        self.close_orphan(backend);
        if self.handle.as_ref().is_some_and(|handle| handle.id == id) {
            self.release(backend);
            self.resolve(backend);
        }
    }

    /// Close the handle, if any.
    pub fn release(&mut self, backend: &mut dyn GamepadBackend) {
        self.close_orphan(backend);
        if let Some(handle) = self.handle.take() {
            info!("gamepad released: {}", handle.meta);
            handle.close(backend);
        }
    }

    /// Drop every handle without a backend to close it against.
    ///
    /// Only for teardown while controller support is unreachable; the ids
    /// are logged because the backend still counts them as open.
    pub fn abandon(&mut self) {
        for handle in [self.handle.take(), self.orphaned.take()].into_iter().flatten() {
            warn!(
                "gamepad {:?} ({}) left open: controller backend unavailable",
                handle.id, handle.meta
            );
        }
    }

    fn close_orphan(&mut self, backend: &mut dyn GamepadBackend) {
        if let Some(handle) = self.orphaned.take() {
            debug!("closing gamepad {:?} held across backend outage", handle.id);
            handle.close(backend);
        }
    }

    fn try_open(&mut self, backend: &mut dyn GamepadBackend, slot: u32) -> bool {
        match backend.open(slot) {
            Some(opened) => {
                info!("gamepad bound: {} (slot {})", opened.meta, slot);
                self.handle = Some(GamepadHandle {
                    id: opened.id,
                    meta: opened.meta,
                });
                true
            }
            None => {
                debug!("gamepad at slot {} vanished before it could be opened", slot);
                false
            }
        }
    }

    fn update(&mut self, platform: &mut dyn PlatformSource) {
        self.buttons.advance();

        let Some(backend) = platform.gamepads() else {
            if let Some(handle) = self.handle.take() {
                debug!("controller backend unreachable, parking gamepad {:?}", handle.id);
                self.orphaned = Some(handle);
            }
            self.buttons.clear();
            self.axes = [0.0; GamepadAxis::COUNT];
            return;
        };

        backend.poll();
        self.close_orphan(backend);

        if let Some(handle) = &self.handle {
            if !backend.is_attached(handle.id) {
                debug!("bound gamepad {:?} no longer attached", handle.id);
                self.release(backend);
            }
        }
        self.resolve(backend);

        match &self.handle {
            Some(handle) => {
                for button in GamepadButton::ALL {
                    self.buttons
                        .set(button.index(), backend.button(handle.id, button));
                }
                for axis in GamepadAxis::ALL {
                    self.axes[axis.index()] = normalize_axis(backend.axis(handle.id, axis));
                }
            }
            None => {
                self.buttons.clear();
                self.axes = [0.0; GamepadAxis::COUNT];
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<&GamepadHandle> {
        self.handle.as_ref()
    }

    pub fn is_down(&self, button: GamepadButton) -> bool {
        self.is_available() && self.buttons.is_down(button.index())
    }

    pub fn is_pressed(&self, button: GamepadButton) -> bool {
        self.is_available() && self.buttons.is_pressed(button.index())
    }

    pub fn is_released(&self, button: GamepadButton) -> bool {
        self.is_available() && self.buttons.is_released(button.index())
    }

    /// Normalized, unshaped axis value in `[-1, 1]`.
    pub fn axis(&self, axis: GamepadAxis) -> f32 {
        if self.is_available() {
            self.axes[axis.index()]
        } else {
            0.0
        }
    }
}

/// Active touch contacts, keyed by platform finger id.
pub struct Touch {
    points: Vec<TouchPoint>,
    active: DigitalSnapshot<1>,
    supported: bool,
}

impl Touch {
    pub fn new(supported: bool) -> Self {
        Self {
            points: Vec::new(),
            active: DigitalSnapshot::new(),
            supported,
        }
    }

    /// First contact inserts; a repeated down for a known id overwrites it.
    pub fn on_down(&mut self, id: TouchId, x: f32, y: f32) {
        if !self.supported {
            return;
        }
        let point = TouchPoint {
            id,
            x,
            y,
            pressed: true,
        };
        match self.points.iter_mut().find(|p| p.id == id) {
            Some(existing) => *existing = point,
            None => self.points.push(point),
        }
    }

    pub fn on_motion(&mut self, id: TouchId, x: f32, y: f32) {
        if let Some(point) = self.points.iter_mut().find(|p| p.id == id) {
            point.x = x;
            point.y = y;
        }
    }

    pub fn on_up(&mut self, id: TouchId) {
        self.points.retain(|p| p.id != id);
    }

    fn update(&mut self, platform: &dyn PlatformSource) {
        self.supported = platform.touch_supported();
        if !self.supported {
            self.points.clear();
        }
        let active = !self.points.is_empty();
        self.active.refresh(|_| active);
    }

    pub fn is_available(&self) -> bool {
        self.supported
    }

    pub fn points(&self) -> &[TouchPoint] {
        &self.points
    }

    pub fn is_active(&self) -> bool {
        self.active.is_down(0)
    }

    /// First frame with at least one contact.
    pub fn began(&self) -> bool {
        self.active.is_pressed(0)
    }

    /// First frame with no contacts after some.
    pub fn ended(&self) -> bool {
        self.active.is_released(0)
    }
}

/// Optional motion sensors (handheld gyroscope/accelerometer).
#[derive(Default)]
pub struct Motion {
    reading: MotionReading,
    capable: bool,
}

impl Motion {
    fn update(&mut self, platform: &dyn PlatformSource) {
        match platform.motion() {
            Some(reading) => {
                self.capable = true;
                self.reading = reading;
            }
            None => {
                self.capable = false;
                self.reading = MotionReading::default();
            }
        }
    }

    pub fn has_capability(&self) -> bool {
        self.capable
    }

    pub fn gyro(&self) -> [f32; 3] {
        self.reading.gyro
    }

    pub fn accel(&self) -> [f32; 3] {
        self.reading.accel
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualPlatform;
    use approx::assert_abs_diff_eq;

    fn drain(platform: &mut VirtualPlatform) {
        while platform.poll_event().is_some() {}
    }

    #[test]
    fn test_keyboard_edges() {
        let mut platform = VirtualPlatform::new();
        let mut keyboard = Keyboard::default();

        platform.press_key(Scancode::SPACE);
        keyboard.update(&platform);
        assert!(keyboard.is_pressed(Scancode::SPACE));

        keyboard.update(&platform);
        assert!(keyboard.is_down(Scancode::SPACE));
        assert!(!keyboard.is_pressed(Scancode::SPACE));

        platform.release_key(Scancode::SPACE);
        keyboard.update(&platform);
        assert!(keyboard.is_released(Scancode::SPACE));
    }

    #[test]
    fn test_keyboard_unknown_code_is_false() {
        let mut platform = VirtualPlatform::new();
        let mut keyboard = Keyboard::default();
        platform.press_key(Scancode(4000));
        keyboard.update(&platform);
        assert!(!keyboard.is_down(Scancode(4000)));
    }

    #[test]
    fn test_missing_keyboard_reads_neutral() {
        let mut platform = VirtualPlatform::new();
        let mut keyboard = Keyboard::default();
        platform.press_key(Scancode::A);
        platform.set_keyboard_present(false);
        keyboard.update(&platform);
        assert!(!keyboard.is_available());
        assert!(!keyboard.is_down(Scancode::A));
    }

    #[test]
    fn test_mouse_reads_source_delta() {
        let mut platform = VirtualPlatform::new();
        let mut mouse = Mouse::default();
        platform.move_mouse(10, 4);
        platform.press_mouse_button(MouseButton::RIGHT);
        drain(&mut platform);
        mouse.update(&platform);

        assert_eq!(mouse.position(), (10, 4));
        assert_eq!(mouse.delta(), (10, 4));
        assert!(mouse.is_pressed(MouseButton::RIGHT));
        assert!(!mouse.is_down(MouseButton::LEFT));
        assert!(!mouse.is_down(MouseButton(0)));
    }

    #[test]
    fn test_gamepad_lazy_bind_on_update() {
        let mut platform = VirtualPlatform::new();
        let id = platform.connect_gamepad("Pad");
        platform.press_button(id, GamepadButton::A);
        platform.set_axis(id, GamepadAxis::LeftX, 32767);
        let mut gamepad = Gamepad::default();

        gamepad.update(&mut platform);
        assert!(gamepad.is_available());
        assert!(gamepad.is_pressed(GamepadButton::A));
        assert_abs_diff_eq!(gamepad.axis(GamepadAxis::LeftX), 1.0);
        assert!(platform.is_open(id));
    }

    #[test]
    fn test_gamepad_silent_unplug_rebinds_replacement() {
        let mut platform = VirtualPlatform::new();
        let first = platform.connect_gamepad("First");
        let second = platform.connect_gamepad("Second");
        let mut gamepad = Gamepad::default();
        gamepad.update(&mut platform);
        assert_eq!(gamepad.handle().map(|h| h.id()), Some(first));

        platform.unplug_gamepad_silently(first);
        platform.press_button(second, GamepadButton::B);
        gamepad.update(&mut platform);

        assert_eq!(gamepad.handle().map(|h| h.id()), Some(second));
        assert!(gamepad.is_down(GamepadButton::B));
        assert!(!platform.is_open(first));
    }

    #[test]
    fn test_gamepad_open_race_retries_next_frame() {
        let mut platform = VirtualPlatform::new();
        platform.connect_gamepad("Pad");
        platform.fail_next_open();
        let mut gamepad = Gamepad::default();

        gamepad.update(&mut platform);
        assert!(!gamepad.is_available());

        gamepad.update(&mut platform);
        assert!(gamepad.is_available());
    }

    #[test]
    fn test_gamepad_removed_during_backend_outage_is_closed() {
        let mut platform = VirtualPlatform::new();
        let id = platform.connect_gamepad("Pad");
        let mut gamepad = Gamepad::default();
        gamepad.update(&mut platform);
        assert!(platform.is_open(id));

        platform.set_gamepads_supported(false);
        gamepad.update(&mut platform);
        assert!(!gamepad.is_available());
        assert!(gamepad.handle().is_none());

        platform.disconnect_gamepad(id);
        platform.set_gamepads_supported(true);
        gamepad.update(&mut platform);

        assert!(!platform.is_open(id));
        assert_eq!(platform.open_count(), 0);
        assert!(!gamepad.is_available());
    }

    #[test]
    fn test_gamepad_rebinds_after_backend_outage() {
        let mut platform = VirtualPlatform::new();
        let id = platform.connect_gamepad("Pad");
        let mut gamepad = Gamepad::default();
        gamepad.update(&mut platform);

        platform.set_gamepads_supported(false);
        gamepad.update(&mut platform);
        platform.set_gamepads_supported(true);
        platform.press_button(id, GamepadButton::X);
        gamepad.update(&mut platform);

        assert_eq!(gamepad.handle().map(|h| h.id()), Some(id));
        assert!(gamepad.is_down(GamepadButton::X));
        assert_eq!(platform.open_count(), 1);
    }

    #[test]
    fn test_gamepad_unsupported_is_neutral() {
        let mut platform = VirtualPlatform::new();
        let id = platform.connect_gamepad("Pad");
        platform.press_button(id, GamepadButton::A);
        platform.set_gamepads_supported(false);
        let mut gamepad = Gamepad::default();
        gamepad.update(&mut platform);
        assert!(!gamepad.is_available());
        assert!(!gamepad.is_down(GamepadButton::A));
        assert_eq!(gamepad.axis(GamepadAxis::LeftY), 0.0);
    }

    #[test]
    fn test_touch_identity() {
        let platform = VirtualPlatform::new();
        let mut touch = Touch::new(true);
        touch.on_down(3, 10.0, 20.0);
        touch.on_motion(3, 12.0, 22.0);
        touch.update(&platform);

        assert_eq!(touch.points().len(), 1);
        assert_eq!(touch.points()[0].id, 3);
        assert_eq!((touch.points()[0].x, touch.points()[0].y), (12.0, 22.0));
        assert!(touch.began());

        touch.on_up(3);
        touch.update(&platform);
        assert!(touch.points().is_empty());
        assert!(touch.ended());
    }

    #[test]
    fn test_touch_repeated_down_keeps_set_semantics() {
        let mut touch = Touch::new(true);
        touch.on_down(1, 0.0, 0.0);
        touch.on_down(2, 0.5, 0.5);
        touch.on_down(1, 0.25, 0.25);
        assert_eq!(touch.points().len(), 2);
        assert_eq!(touch.points()[0].x, 0.25);
    }

    #[test]
    fn test_touch_motion_for_unknown_id_is_ignored() {
        let mut touch = Touch::new(true);
        touch.on_motion(9, 1.0, 1.0);
        assert!(touch.points().is_empty());
    }

    #[test]
    fn test_touch_unsupported_drops_contacts() {
        let mut platform = VirtualPlatform::new();
        platform.set_touch_supported(false);
        let mut touch = Touch::new(false);
        touch.on_down(1, 0.0, 0.0);
        touch.update(&platform);
        assert!(touch.points().is_empty());
        assert!(!touch.is_active());
    }

    #[test]
    fn test_motion_zero_when_unsupported() {
        let mut platform = VirtualPlatform::new();
        let mut motion = Motion::default();
        motion.update(&platform);
        assert!(!motion.has_capability());
        assert_eq!(motion.gyro(), [0.0; 3]);

        platform.set_motion(Some(MotionReading {
            gyro: [0.1, 0.2, 0.3],
            accel: [0.0, 9.8, 0.0],
        }));
        motion.update(&platform);
        assert!(motion.has_capability());
        assert_eq!(motion.accel(), [0.0, 9.8, 0.0]);
    }
}
