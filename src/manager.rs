//! Frame orchestrator.
//!
//! [`InputManager`] owns the platform source, the [`DeviceRegistry`] and the
//! [`CommandBindingTable`], and drives one input cycle per call to
//! [`InputManager::update`]:
//!
//! 1. **Polling**: drain the platform event queue. Gamepad attach/detach and
//!    touch begin/move/end are applied to the registry, activity is noted,
//!    and everything else is forwarded untouched.
//! 2. **Updating**: every registered device updates once, in fixed order.
//!    The last noted activity from an available device becomes the active
//!    input method.
//! 3. **Dispatching**: bound commands run against the fresh snapshots.
//!
//! Queries made between two `update` calls all see the same frame.

use log::{debug, info, warn};

use crate::backends::PlatformSource;
use crate::binding::{BindingProfile, Command, CommandBindingTable};
use crate::config::{running_on_handheld, InputConfig, MotionMode};
use crate::error::Result;
use crate::event::{
    DeviceCategory, GamepadAxis, GamepadButton, MouseButton, PhysicalInput, PlatformEvent,
    Scancode, TouchPoint,
};
use crate::eventbus::EventBus;
use crate::metadata::DeviceMeta;
use crate::registry::DeviceRegistry;

/// Where the manager is within the current frame. Outside `update` it is
/// always [`FramePhase::Idle`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FramePhase {
    #[default]
    Idle,
    Polling,
    Updating,
    Dispatching,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Uninitialized,
    Running,
    /// Platform init failed; keyboard and mouse only.
    Reduced,
    Stopped,
}

pub struct InputManager<P: PlatformSource> {
    platform: P,
    registry: DeviceRegistry,
    bindings: CommandBindingTable,
    bus: EventBus,
    config: InputConfig,
    phase: FramePhase,
    lifecycle: Lifecycle,
    active_method: DeviceCategory,
    handheld: bool,
}

impl<P: PlatformSource> InputManager<P> {
    pub fn new(platform: P) -> Self {
        Self::with_config(platform, InputConfig::default())
    }

    pub fn with_config(platform: P, config: InputConfig) -> Self {
        Self {
            platform,
            registry: DeviceRegistry::empty(),
            bindings: CommandBindingTable::new(config.default_deadzone),
            bus: EventBus::new(),
            config,
            phase: FramePhase::Idle,
            lifecycle: Lifecycle::Uninitialized,
            active_method: DeviceCategory::Keyboard,
            handheld: false,
        }
    }

    /// Start the platform input subsystem and register devices.
    ///
    /// On failure the manager keeps running with keyboard and mouse only and
    /// the error is returned so the caller can decide whether that is enough.
    /// Calling this while already running is a no-op.
    pub fn initialize(&mut self) -> Result<()> {
        if self.lifecycle == Lifecycle::Running {
            return Ok(());
        }
        self.handheld = running_on_handheld();

        if let Err(err) = self.platform.init() {
            warn!("input init failed, continuing with keyboard and mouse: {}", err);
            self.registry = DeviceRegistry::reduced();
            self.lifecycle = Lifecycle::Reduced;
            return Err(err);
        }

        let with_motion = match self.config.motion {
            MotionMode::Enabled => true,
            MotionMode::Disabled => false,
            MotionMode::Auto => self.handheld || self.platform.motion().is_some(),
        };
        self.registry = DeviceRegistry::full(&self.platform, with_motion);
        self.registry.resolve_gamepad(&mut self.platform);
        self.lifecycle = Lifecycle::Running;

        info!(
            "input initialized: devices {:?}, handheld {}",
            self.registry.categories(),
            self.handheld
        );
        Ok(())
    }

    /// Close the gamepad handle and stop the platform subsystem.
    ///
    /// Bindings are kept. Queries read neutral until the next `initialize`.
    pub fn shutdown(&mut self) {
        match self.lifecycle {
            Lifecycle::Running | Lifecycle::Reduced => {
                self.registry.shutdown(&mut self.platform);
                if self.lifecycle == Lifecycle::Running {
                    self.platform.shutdown();
                }
                self.lifecycle = Lifecycle::Stopped;
                info!("input shut down");
            }
            Lifecycle::Uninitialized | Lifecycle::Stopped => {}
        }
    }

    /// Run one input cycle. Call exactly once per frame, before any query.
    ///
    /// Returns the structural events the input core did not consume, in
    /// arrival order; the same events are also emitted on the event bus.
    pub fn update(&mut self, delta_time: f32) -> Vec<PlatformEvent> {
        self.phase = FramePhase::Polling;
        let (forwarded, activity) = self.poll_events();
        if !forwarded.is_empty() {
            self.bus.emit_all(&forwarded);
        }

        self.phase = FramePhase::Updating;
        self.registry.update(&mut self.platform);
        // Activity only counts for a device that is actually tracked.
        if let Some(category) = activity
            .into_iter()
            .rev()
            .find(|c| self.registry.is_available(*c))
        {
            self.active_method = category;
        }

        self.phase = FramePhase::Dispatching;
        if let Some(category) = self.bindings.dispatch(&self.registry, delta_time) {
            self.active_method = category;
        }

        self.phase = FramePhase::Idle;
        forwarded
    }

    /// Drain the queue. Returns the pass-through events and the categories
    /// of activity seen, in arrival order.
    fn poll_events(&mut self) -> (Vec<PlatformEvent>, Vec<DeviceCategory>) {
        let mut forwarded = Vec::new();
        let mut activity = Vec::new();
        while let Some(event) = self.platform.poll_event() {
            match event {
                PlatformEvent::GamepadAdded { slot } => {
                    self.registry.on_gamepad_added(&mut self.platform, slot);
                }
                PlatformEvent::GamepadRemoved { id } => {
                    self.registry.on_gamepad_removed(&mut self.platform, id);
                }
                PlatformEvent::TouchDown { finger, x, y } => {
                    self.registry.on_touch_down(finger, x, y);
                    activity.push(DeviceCategory::Touch);
                }
                PlatformEvent::TouchMotion { finger, x, y } => {
                    self.registry.on_touch_motion(finger, x, y);
                    activity.push(DeviceCategory::Touch);
                }
                PlatformEvent::TouchUp { finger, .. } => {
                    self.registry.on_touch_up(finger);
                    activity.push(DeviceCategory::Touch);
                }
                PlatformEvent::Activity(category) => {
                    activity.push(category);
                }
                other => {
                    debug!("forwarding {:?}", other);
                    forwarded.push(other);
                }
            }
        }
        (forwarded, activity)
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    /// `true` when initialization failed and only keyboard and mouse are tracked.
    pub fn is_reduced(&self) -> bool {
        self.lifecycle == Lifecycle::Reduced
    }

    pub fn config(&self) -> &InputConfig {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Host access to the platform between frames, e.g. to feed it window events.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn event_bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn devices(&self) -> &DeviceRegistry {
        &self.registry
    }

    // --- Digital queries ---

    pub fn is_key_down(&self, key: Scancode) -> bool {
        self.registry.is_down(PhysicalInput::Key(key), 0.0)
    }

    pub fn is_key_pressed(&self, key: Scancode) -> bool {
        self.registry.is_pressed(PhysicalInput::Key(key))
    }

    pub fn is_key_released(&self, key: Scancode) -> bool {
        self.registry.is_released(PhysicalInput::Key(key))
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.registry.is_down(PhysicalInput::MouseButton(button), 0.0)
    }

    pub fn is_mouse_button_pressed(&self, button: MouseButton) -> bool {
        self.registry.is_pressed(PhysicalInput::MouseButton(button))
    }

    pub fn is_mouse_button_released(&self, button: MouseButton) -> bool {
        self.registry.is_released(PhysicalInput::MouseButton(button))
    }

    pub fn is_gamepad_button_down(&self, button: GamepadButton) -> bool {
        self.registry.is_down(PhysicalInput::GamepadButton(button), 0.0)
    }

    pub fn is_gamepad_button_pressed(&self, button: GamepadButton) -> bool {
        self.registry.is_pressed(PhysicalInput::GamepadButton(button))
    }

    pub fn is_gamepad_button_released(&self, button: GamepadButton) -> bool {
        self.registry.is_released(PhysicalInput::GamepadButton(button))
    }

    // --- Analog and positional queries ---

    pub fn mouse_position(&self) -> (i32, i32) {
        self.registry.mouse().map_or((0, 0), |m| m.position())
    }

    pub fn mouse_delta(&self) -> (i32, i32) {
        self.registry.mouse().map_or((0, 0), |m| m.delta())
    }

    /// Axis value shaped with the configured default deadzone.
    pub fn axis_value(&self, axis: GamepadAxis) -> f32 {
        self.registry
            .shaped_axis(axis, self.config.default_deadzone)
    }

    /// Normalized axis value before deadzone shaping.
    pub fn raw_axis_value(&self, axis: GamepadAxis) -> f32 {
        self.registry.raw_axis(axis)
    }

    pub fn touch_points(&self) -> &[TouchPoint] {
        self.registry.touch().map(|t| t.points()).unwrap_or(&[])
    }

    pub fn is_touch_active(&self) -> bool {
        self.registry.touch().is_some_and(|t| t.is_active())
    }

    /// Category of the last dispatched command or qualifying platform event.
    pub fn active_input_method(&self) -> DeviceCategory {
        self.active_method
    }

    // --- Availability ---

    pub fn is_keyboard_available(&self) -> bool {
        self.registry.is_available(DeviceCategory::Keyboard)
    }

    pub fn is_mouse_available(&self) -> bool {
        self.registry.is_available(DeviceCategory::Mouse)
    }

    pub fn is_gamepad_available(&self) -> bool {
        self.registry.is_available(DeviceCategory::Gamepad)
    }

    pub fn is_touch_available(&self) -> bool {
        self.registry.is_available(DeviceCategory::Touch)
    }

    pub fn has_motion_capability(&self) -> bool {
        self.registry.motion().is_some_and(|m| m.has_capability())
    }

    pub fn gyro(&self) -> [f32; 3] {
        self.registry.motion().map_or([0.0; 3], |m| m.gyro())
    }

    pub fn accel(&self) -> [f32; 3] {
        self.registry.motion().map_or([0.0; 3], |m| m.accel())
    }

    /// Sampled at [`initialize`](Self::initialize).
    pub fn is_running_on_handheld(&self) -> bool {
        self.handheld
    }

    /// Metadata of the bound gamepad.
    pub fn gamepad_info(&self) -> Option<&DeviceMeta> {
        self.registry
            .gamepad()
            .and_then(|g| g.handle())
            .map(|handle| handle.meta())
    }

    // --- Bindings ---

    pub fn bind_key_command(&mut self, key: Scancode, command: impl FnMut(f32) + 'static) -> bool {
        self.bindings.bind(PhysicalInput::Key(key), command)
    }

    pub fn bind_mouse_command(
        &mut self,
        button: MouseButton,
        command: impl FnMut(f32) + 'static,
    ) -> bool {
        self.bindings.bind(PhysicalInput::MouseButton(button), command)
    }

    pub fn bind_gamepad_button_command(
        &mut self,
        button: GamepadButton,
        command: impl FnMut(f32) + 'static,
    ) -> bool {
        self.bindings
            .bind(PhysicalInput::GamepadButton(button), command)
    }

    /// The command receives the shaped axis value instead of delta time.
    pub fn bind_gamepad_axis_command(
        &mut self,
        axis: GamepadAxis,
        deadzone: f32,
        command: impl FnMut(f32) + 'static,
    ) -> bool {
        self.bindings
            .bind_with_deadzone(PhysicalInput::GamepadAxis(axis), deadzone, command)
    }

    /// Runs every frame at least one finger is down.
    pub fn bind_touch_command(&mut self, command: impl FnMut(f32) + 'static) -> bool {
        self.bindings.bind(PhysicalInput::Touch, command)
    }

    pub fn bindings_mut(&mut self) -> &mut CommandBindingTable {
        &mut self.bindings
    }

    /// Install a profile through `resolve`; see [`BindingProfile::install`].
    pub fn install_profile<F>(&mut self, profile: &BindingProfile, resolve: F) -> usize
    where
        F: FnMut(&str) -> Option<Command>,
    {
        let installed = profile.install(&mut self.bindings, resolve);
        info!(
            "profile '{}': {} of {} bindings installed",
            profile.name,
            installed,
            profile.bindings.len()
        );
        installed
    }
}

impl<P: PlatformSource> Drop for InputManager<P> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualPlatform;
    use crate::backends::MotionReading;
    use approx::assert_abs_diff_eq;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn running() -> InputManager<VirtualPlatform> {
        let mut input = InputManager::new(VirtualPlatform::new());
        input.initialize().unwrap();
        input
    }

    #[test]
    fn test_phase_is_idle_between_frames() {
        let mut input = running();
        assert_eq!(input.phase(), FramePhase::Idle);
        input.update(0.016);
        assert_eq!(input.phase(), FramePhase::Idle);
    }

    #[test]
    fn test_key_edges_across_frames() {
        let mut input = running();
        input.platform_mut().press_key(Scancode::SPACE);
        input.update(0.016);
        assert!(input.is_key_pressed(Scancode::SPACE));
        assert!(input.is_key_down(Scancode::SPACE));

        input.update(0.016);
        assert!(!input.is_key_pressed(Scancode::SPACE));
        assert!(input.is_key_down(Scancode::SPACE));

        input.platform_mut().release_key(Scancode::SPACE);
        input.update(0.016);
        assert!(input.is_key_released(Scancode::SPACE));
        assert!(!input.is_key_down(Scancode::SPACE));
    }

    #[test]
    fn test_queries_before_initialize_are_neutral() {
        let mut input = InputManager::new(VirtualPlatform::new());
        input.platform_mut().press_key(Scancode::A);
        input.update(0.016);
        assert!(!input.is_key_down(Scancode::A));
        assert_eq!(input.axis_value(GamepadAxis::LeftX), 0.0);
        assert!(input.touch_points().is_empty());
    }

    #[test]
    fn test_dispatch_sets_active_method() {
        let mut input = running();
        let pad = input.platform_mut().connect_gamepad("Pad");
        input.bind_gamepad_button_command(GamepadButton::A, |_| {});
        input.update(0.016);
        assert_eq!(input.active_input_method(), DeviceCategory::Keyboard);

        input.platform_mut().press_button(pad, GamepadButton::A);
        input.update(0.016);
        assert_eq!(input.active_input_method(), DeviceCategory::Gamepad);
    }

    #[test]
    fn test_activity_event_sets_active_method() {
        let mut input = running();
        input
            .platform_mut()
            .feed(PlatformEvent::Activity(DeviceCategory::Mouse));
        let forwarded = input.update(0.016);
        assert!(forwarded.is_empty());
        assert_eq!(input.active_input_method(), DeviceCategory::Mouse);
    }

    #[test]
    fn test_touch_event_sets_active_method() {
        let mut input = running();
        input.platform_mut().touch_down(3, 0.5, 0.5);
        input.update(0.016);
        assert_eq!(input.active_input_method(), DeviceCategory::Touch);
        assert!(input.is_touch_active());
    }

    #[test]
    fn test_activity_from_untracked_device_is_ignored() {
        let mut platform = VirtualPlatform::new();
        platform.fail_init("no controllers");
        let mut input = InputManager::new(platform);
        assert!(input.initialize().is_err());

        input.platform_mut().touch_down(1, 0.5, 0.5);
        input
            .platform_mut()
            .feed(PlatformEvent::Activity(DeviceCategory::Gamepad));
        input.update(0.016);
        assert!(!input.is_touch_available());
        assert_eq!(input.active_input_method(), DeviceCategory::Keyboard);

        input
            .platform_mut()
            .feed(PlatformEvent::Activity(DeviceCategory::Mouse));
        input
            .platform_mut()
            .feed(PlatformEvent::Activity(DeviceCategory::Gamepad));
        input.update(0.016);
        assert_eq!(input.active_input_method(), DeviceCategory::Mouse);
    }

    #[test]
    fn test_touch_on_unsupported_screen_keeps_active_method() {
        let mut platform = VirtualPlatform::new();
        platform.set_touch_supported(false);
        let mut input = InputManager::new(platform);
        input.initialize().unwrap();

        input.platform_mut().touch_down(1, 0.5, 0.5);
        input.update(0.016);
        assert_eq!(input.active_input_method(), DeviceCategory::Keyboard);
    }

    #[test]
    fn test_axis_binding_payload_is_shaped_value() {
        let mut input = running();
        let pad = input.platform_mut().connect_gamepad("Pad");
        input.platform_mut().set_axis(pad, GamepadAxis::LeftX, 20000);

        let seen = Rc::new(Cell::new(0.0_f32));
        let sink = seen.clone();
        input.bind_gamepad_axis_command(GamepadAxis::LeftX, 0.25, move |v| sink.set(v));
        input.update(0.016);

        let normalized = 20000.0 / 32767.0;
        assert_abs_diff_eq!(seen.get(), (normalized - 0.25) / 0.75, epsilon = 1e-5);
        assert_abs_diff_eq!(input.raw_axis_value(GamepadAxis::LeftX), normalized, epsilon = 1e-6);
    }

    #[test]
    fn test_axis_value_uses_config_deadzone() {
        let config = InputConfig {
            default_deadzone: 0.7,
            ..InputConfig::default()
        };
        let mut input = InputManager::with_config(VirtualPlatform::new(), config);
        input.initialize().unwrap();
        let pad = input.platform_mut().connect_gamepad("Pad");
        input.platform_mut().set_axis(pad, GamepadAxis::LeftY, 20000);
        input.update(0.016);
        assert_eq!(input.axis_value(GamepadAxis::LeftY), 0.0);
    }

    #[test]
    fn test_motion_disabled_by_config() {
        let config = InputConfig {
            motion: MotionMode::Disabled,
            ..InputConfig::default()
        };
        let mut platform = VirtualPlatform::new();
        platform.set_motion(Some(MotionReading {
            gyro: [1.0, 2.0, 3.0],
            accel: [0.0, 9.8, 0.0],
        }));
        let mut input = InputManager::with_config(platform, config);
        input.initialize().unwrap();
        input.update(0.016);
        assert!(!input.has_motion_capability());
        assert_eq!(input.gyro(), [0.0; 3]);
    }

    #[test]
    fn test_motion_auto_detects_sensors() {
        let mut platform = VirtualPlatform::new();
        platform.set_motion(Some(MotionReading {
            gyro: [1.0, 2.0, 3.0],
            accel: [0.0, 9.8, 0.0],
        }));
        let mut input = InputManager::new(platform);
        input.initialize().unwrap();
        input.update(0.016);
        assert!(input.has_motion_capability());
        assert_eq!(input.gyro(), [1.0, 2.0, 3.0]);
        assert_eq!(input.accel(), [0.0, 9.8, 0.0]);
    }

    #[test]
    fn test_shutdown_releases_and_keeps_bindings() {
        let mut input = running();
        let pad = input.platform_mut().connect_gamepad("Pad");
        input.update(0.016);
        assert!(input.platform().is_open(pad));
        input.bind_key_command(Scancode::A, |_| {});

        input.shutdown();
        assert!(!input.platform().is_open(pad));
        assert!(!input.platform().is_initialized());
        assert!(input.bindings_mut().is_bound(PhysicalInput::Key(Scancode::A)));
        assert!(!input.is_gamepad_available());
    }

    #[test]
    fn test_forwarded_events_reach_bus() {
        use crate::eventbus::{EventFilter, InputListener};

        struct Sink(Rc<RefCell<Vec<PlatformEvent>>>);
        impl InputListener for Sink {
            fn on_event(&mut self, event: &PlatformEvent) {
                self.0.borrow_mut().push(event.clone());
            }
        }

        let mut input = running();
        let seen = Rc::new(RefCell::new(Vec::new()));
        input
            .event_bus_mut()
            .add_listener(Sink(seen.clone()), EventFilter::WindowOnly);
        input.platform_mut().feed(PlatformEvent::Other { code: 1 });
        input.platform_mut().feed(PlatformEvent::Quit);

        let forwarded = input.update(0.016);
        assert_eq!(
            forwarded,
            vec![PlatformEvent::Other { code: 1 }, PlatformEvent::Quit]
        );
        assert_eq!(*seen.borrow(), vec![PlatformEvent::Quit]);
    }
}
