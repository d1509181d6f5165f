//! Command bindings: physical inputs mapped to application callbacks.
//!
//! [`CommandBindingTable`] holds at most one command per [`PhysicalInput`];
//! binding an identifier again replaces the previous command. During dispatch
//! every bound digital input that is down calls its command with the frame's
//! delta time, and every bound axis outside its deadzone calls its command with
//! the shaped axis value instead.
//!
//! [`BindingProfile`] is the serializable counterpart: named actions keyed by
//! physical input, loaded from JSON or TOML and installed into a table through
//! a resolver that turns action names into commands.

use std::collections::BTreeMap;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{InputError, Result};
use crate::event::{DeviceCategory, PhysicalInput};
use crate::registry::DeviceRegistry;
use crate::snapshot::{clamp_deadzone, DEFAULT_DEADZONE};

/// Callback invoked on dispatch. The argument is delta time for digital
/// inputs and the shaped axis value for analog ones.
pub type Command = Box<dyn FnMut(f32)>;

struct CommandBinding {
    command: Command,
    deadzone: f32,
}

pub struct CommandBindingTable {
    bindings: BTreeMap<PhysicalInput, CommandBinding>,
    default_deadzone: f32,
}

impl Default for CommandBindingTable {
    fn default() -> Self {
        Self::new(DEFAULT_DEADZONE)
    }
}

impl CommandBindingTable {
    pub fn new(default_deadzone: f32) -> Self {
        Self {
            bindings: BTreeMap::new(),
            default_deadzone: clamp_deadzone(default_deadzone),
        }
    }

    pub fn default_deadzone(&self) -> f32 {
        self.default_deadzone
    }

    /// Bind with the table's default deadzone. Returns `false` (and binds
    /// nothing) for identifiers the devices cannot track.
    pub fn bind(&mut self, input: PhysicalInput, command: impl FnMut(f32) + 'static) -> bool {
        let deadzone = self.default_deadzone;
        self.bind_with_deadzone(input, deadzone, command)
    }

    /// Register or overwrite the command for `input`.
    ///
    /// `deadzone` only matters for axes and is clamped to `[0, MAX_DEADZONE]`.
    pub fn bind_with_deadzone(
        &mut self,
        input: PhysicalInput,
        deadzone: f32,
        command: impl FnMut(f32) + 'static,
    ) -> bool {
        if !input.is_known() {
            debug!("ignoring binding for untracked input {:?}", input);
            return false;
        }
        let replaced = self
            .bindings
            .insert(
                input,
                CommandBinding {
                    command: Box::new(command),
                    deadzone: clamp_deadzone(deadzone),
                },
            )
            .is_some();
        if replaced {
            debug!("binding for {:?} overwritten", input);
        }
        true
    }

    pub fn unbind(&mut self, input: PhysicalInput) -> bool {
        self.bindings.remove(&input).is_some()
    }

    pub fn is_bound(&self, input: PhysicalInput) -> bool {
        self.bindings.contains_key(&input)
    }

    /// Deadzone stored for `input`, if bound.
    pub fn deadzone(&self, input: PhysicalInput) -> Option<f32> {
        self.bindings.get(&input).map(|binding| binding.deadzone)
    }

    /// Bound inputs in dispatch order.
    pub fn inputs(&self) -> impl Iterator<Item = PhysicalInput> + '_ {
        self.bindings.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Run every triggered command, in identifier order.
    ///
    /// Returns the category of the last command that ran, if any.
    pub fn dispatch(&mut self, devices: &DeviceRegistry, delta_time: f32) -> Option<DeviceCategory> {
        let mut last = None;
        for (input, binding) in self.bindings.iter_mut() {
            let payload = match *input {
                PhysicalInput::GamepadAxis(axis) => {
                    let shaped = devices.shaped_axis(axis, binding.deadzone);
                    (shaped != 0.0).then_some(shaped)
                }
                digital => devices
                    .is_down(digital, binding.deadzone)
                    .then_some(delta_time),
            };
            if let Some(value) = payload {
                (binding.command)(value);
                last = Some(input.category());
            }
        }
        last
    }
}

/// One named action bound to a physical input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub input: PhysicalInput,
    pub action: String,
    /// Axis deadzone; the table default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadzone: Option<f32>,
}

/// Serializable profile of action bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingProfile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub bindings: Vec<ActionBinding>,
}

impl BindingProfile {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(InputError::Profile)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(InputError::Profile)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(InputError::ProfileToml)
    }

    /// Load from disk; `.json` files are JSON, anything else is TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| InputError::io(path, e))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json(&text),
            _ => Self::from_toml(&text),
        }
    }

    /// Install every binding whose action `resolve` knows about.
    ///
    /// `resolve` is asked once per binding, so an action bound to several
    /// inputs gets a fresh command each time. Returns the number installed.
    pub fn install<F>(&self, table: &mut CommandBindingTable, mut resolve: F) -> usize
    where
        F: FnMut(&str) -> Option<Command>,
    {
        let mut installed = 0;
        for binding in &self.bindings {
            let Some(command) = resolve(&binding.action) else {
                warn!(
                    "profile '{}': no command for action '{}', skipping",
                    self.name, binding.action
                );
                continue;
            };
            let deadzone = binding.deadzone.unwrap_or(table.default_deadzone());
            if table.bind_with_deadzone(binding.input, deadzone, command) {
                installed += 1;
            }
        }
        installed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_input::VirtualPlatform;
    use crate::backends::PlatformSource;
    use crate::event::{GamepadAxis, GamepadButton, MouseButton, Scancode};
    use approx::assert_abs_diff_eq;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn registry_after(platform: &mut VirtualPlatform) -> DeviceRegistry {
        let mut registry = DeviceRegistry::full(platform, false);
        while platform.poll_event().is_some() {}
        registry.update(platform);
        registry
    }

    #[test]
    fn test_last_bind_wins() {
        let mut platform = VirtualPlatform::new();
        platform.press_key(Scancode::SPACE);
        let registry = registry_after(&mut platform);

        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));
        let mut table = CommandBindingTable::default();
        let f = first.clone();
        table.bind(PhysicalInput::Key(Scancode::SPACE), move |_| f.set(f.get() + 1));
        let s = second.clone();
        table.bind(PhysicalInput::Key(Scancode::SPACE), move |_| s.set(s.get() + 1));

        table.dispatch(&registry, 0.016);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_digital_payload_is_delta_time() {
        let mut platform = VirtualPlatform::new();
        platform.press_mouse_button(MouseButton::LEFT);
        let registry = registry_after(&mut platform);

        let seen = Rc::new(Cell::new(0.0f32));
        let mut table = CommandBindingTable::default();
        let s = seen.clone();
        table.bind(PhysicalInput::MouseButton(MouseButton::LEFT), move |dt| s.set(dt));

        let category = table.dispatch(&registry, 0.25);
        assert_eq!(seen.get(), 0.25);
        assert_eq!(category, Some(DeviceCategory::Mouse));
    }

    #[test]
    fn test_axis_payload_is_shaped_value() {
        let mut platform = VirtualPlatform::new();
        let id = platform.connect_gamepad("Pad");
        platform.set_axis(id, GamepadAxis::LeftX, 20000);
        let registry = registry_after(&mut platform);

        let seen = Rc::new(Cell::new(0.0f32));
        let mut table = CommandBindingTable::default();
        let s = seen.clone();
        table.bind_with_deadzone(PhysicalInput::GamepadAxis(GamepadAxis::LeftX), 0.15, move |v| {
            s.set(v)
        });

        assert_eq!(table.dispatch(&registry, 0.016), Some(DeviceCategory::Gamepad));
        assert_abs_diff_eq!(seen.get(), 0.541, epsilon = 1e-3);
    }

    #[test]
    fn test_axis_inside_deadzone_does_not_fire() {
        let mut platform = VirtualPlatform::new();
        let id = platform.connect_gamepad("Pad");
        platform.set_axis(id, GamepadAxis::RightY, 3000);
        let registry = registry_after(&mut platform);

        let fired = Rc::new(Cell::new(false));
        let mut table = CommandBindingTable::default();
        let f = fired.clone();
        table.bind(PhysicalInput::GamepadAxis(GamepadAxis::RightY), move |_| f.set(true));

        assert_eq!(table.dispatch(&registry, 0.016), None);
        assert!(!fired.get());
    }

    #[test]
    fn test_dispatch_order_is_by_identifier() {
        let mut platform = VirtualPlatform::new();
        let id = platform.connect_gamepad("Pad");
        platform.press_button(id, GamepadButton::A);
        platform.press_key(Scancode::D);
        platform.press_key(Scancode::A);
        let registry = registry_after(&mut platform);

        let order = Rc::new(RefCell::new(Vec::new()));
        let mut table = CommandBindingTable::default();
        for (input, label) in [
            (PhysicalInput::GamepadButton(GamepadButton::A), "pad-a"),
            (PhysicalInput::Key(Scancode::D), "key-d"),
            (PhysicalInput::Key(Scancode::A), "key-a"),
        ] {
            let order = order.clone();
            table.bind(input, move |_| order.borrow_mut().push(label));
        }

        let last = table.dispatch(&registry, 0.016);
        assert_eq!(*order.borrow(), vec!["key-a", "key-d", "pad-a"]);
        assert_eq!(last, Some(DeviceCategory::Gamepad));
    }

    #[test]
    fn test_unknown_identifier_is_not_bound() {
        let mut table = CommandBindingTable::default();
        assert!(!table.bind(PhysicalInput::Key(Scancode(9999)), |_| {}));
        assert!(!table.bind(PhysicalInput::MouseButton(MouseButton(0)), |_| {}));
        assert!(table.is_empty());
    }

    #[test]
    fn test_deadzone_is_clamped_on_bind() {
        let mut table = CommandBindingTable::default();
        let input = PhysicalInput::GamepadAxis(GamepadAxis::TriggerLeft);
        table.bind_with_deadzone(input, 3.0, |_| {});
        assert_eq!(table.deadzone(input), Some(crate::snapshot::MAX_DEADZONE));
    }

    #[test]
    fn test_profile_from_json_and_install() {
        let profile = BindingProfile::from_json(
            r#"{
                "name": "default",
                "bindings": [
                    { "input": { "Key": 44 }, "action": "jump" },
                    { "input": { "GamepadAxis": "LeftX" }, "action": "steer", "deadzone": 0.2 },
                    { "input": "Touch", "action": "tap" },
                    { "input": { "GamepadButton": "Start" }, "action": "pause" }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(profile.bindings.len(), 4);

        let mut table = CommandBindingTable::default();
        let installed = profile.install(&mut table, |action| match action {
            "jump" | "steer" | "tap" => Some(Box::new(|_: f32| {}) as Command),
            _ => None,
        });

        assert_eq!(installed, 3);
        assert!(table.is_bound(PhysicalInput::Key(Scancode::SPACE)));
        assert!(table.is_bound(PhysicalInput::Touch));
        assert!(!table.is_bound(PhysicalInput::GamepadButton(GamepadButton::Start)));
        assert_eq!(
            table.deadzone(PhysicalInput::GamepadAxis(GamepadAxis::LeftX)),
            Some(0.2)
        );
    }

    #[test]
    fn test_profile_from_toml() {
        let profile = BindingProfile::from_toml(
            r#"
            name = "handheld"
            description = "Default handheld layout"

            [[bindings]]
            input = { GamepadButton = "A" }
            action = "jump"

            [[bindings]]
            input = { GamepadAxis = "TriggerRight" }
            action = "throttle"
            deadzone = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(profile.description.as_deref(), Some("Default handheld layout"));
        assert_eq!(
            profile.bindings[0].input,
            PhysicalInput::GamepadButton(GamepadButton::A)
        );
        assert_eq!(profile.bindings[1].deadzone, Some(0.05));
    }

    #[test]
    fn test_profile_json_survives_rewrite() {
        let profile = BindingProfile {
            name: "p".into(),
            description: None,
            bindings: vec![ActionBinding {
                input: PhysicalInput::MouseButton(MouseButton::RIGHT),
                action: "aim".into(),
                deadzone: None,
            }],
        };
        let text = profile.to_json().unwrap();
        assert_eq!(BindingProfile::from_json(&text).unwrap(), profile);
    }

    #[test]
    fn test_malformed_profile_is_an_error() {
        assert!(matches!(
            BindingProfile::from_json("{ not json"),
            Err(InputError::Profile(_))
        ));
        assert!(matches!(
            BindingProfile::from_toml("name = "),
            Err(InputError::ProfileToml(_))
        ));
    }
}
