//! Frame-paced input layer for games.
//!
//! Tracks keyboard, mouse, one gamepad, touch and optional motion sensors
//! behind a single [`InputManager`]. Each frame the manager drains the
//! platform's structural events (hotplug, touch), updates every device in a
//! fixed order, then runs the commands bound to whatever is held.
//!
//! Platforms plug in through [`backends::PlatformSource`];
//! [`backends::virtual_input::VirtualPlatform`] is an in-memory source for
//! tests and headless hosts.
//!
//! ```
//! use deckinput::backends::virtual_input::VirtualPlatform;
//! use deckinput::{InputManager, Scancode};
//!
//! let mut input = InputManager::new(VirtualPlatform::new());
//! input.initialize().unwrap();
//! input.platform_mut().press_key(Scancode::SPACE);
//! input.update(1.0 / 60.0);
//! assert!(input.is_key_pressed(Scancode::SPACE));
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod backends;
pub mod binding;
pub mod config;
pub mod device;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod filtered_listener;
pub mod logger;
pub mod manager;
pub mod metadata;
pub mod registry;
pub mod snapshot;

pub use binding::{ActionBinding, BindingProfile, Command, CommandBindingTable};
pub use config::{InputConfig, MotionMode};
pub use error::{InputError, Result};
pub use event::*;
pub use eventbus::{EventBus, EventFilter, InputListener};
pub use manager::{FramePhase, InputManager};
pub use metadata::DeviceMeta;
pub use snapshot::{shape_axis, DEFAULT_DEADZONE};
