//! Device metadata snapshot.
//!
//! [`DeviceMeta`] is a lightweight, cloneable description of the gamepad the
//! registry currently has open, suitable for UI display and logging. Backends
//! populate what they know; unknown fields remain `None`.
//!
//! # Conventions
//! - `bus` is a short, human-readable hint like `"usb"`, `"bluetooth"`, `"xinput"` or `"virtual"`.
//! - `product_string` should be a friendly, user-facing name when available.
//! - `slot` is the enumeration slot the device was opened from. It is only
//!   meaningful until the next hotplug event; treat it as diagnostic.
//!
//! # Example
//! ```
//! use deckinput::backends::virtual_input::VirtualPlatform;
//! use deckinput::InputManager;
//!
//! let mut platform = VirtualPlatform::new();
//! platform.connect_gamepad("Handheld Controls");
//! let mut input = InputManager::new(platform);
//! input.initialize().unwrap();
//! let meta = input.gamepad_info().expect("gamepad bound");
//! println!("{}", meta);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of metadata describing one opened device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceMeta {
    /// High-level bus classification (e.g., `"usb"`, `"xinput"`).
    pub bus: Option<String>,

    /// USB Vendor ID (VID), if known.
    pub vid: Option<u16>,

    /// USB Product ID (PID), if known.
    pub pid: Option<u16>,

    /// Human-readable product name from the driver/firmware.
    pub product_string: Option<String>,

    /// Device serial number supplied by firmware/OS, if present.
    pub serial_number: Option<String>,

    /// Enumeration slot the device was opened from.
    pub slot: Option<u32>,
}

impl DeviceMeta {
    /// Display name, falling back to a generic label.
    pub fn display_name(&self) -> &str {
        self.product_string.as_deref().unwrap_or("Unknown gamepad")
    }
}

impl fmt::Display for DeviceMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())?;
        if let (Some(vid), Some(pid)) = (self.vid, self.pid) {
            write!(f, " [{vid:04x}:{pid:04x}]")?;
        }
        if let Some(bus) = &self.bus {
            write!(f, " via {bus}")?;
        }
        Ok(())
    }
}
