use log::debug;

use crate::event::PlatformEvent;
use crate::eventbus::InputListener;

/// Listener that logs every forwarded event at debug level.
#[derive(Debug, Default)]
pub struct Logger {
    seen: u64,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events logged so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

impl InputListener for Logger {
    fn on_event(&mut self, event: &PlatformEvent) {
        self.seen += 1;
        debug!("[input] forwarded {:?}", event);
    }
}
