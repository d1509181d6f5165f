use crate::event::PlatformEvent;
use std::collections::BTreeMap;

/// Trait for reacting to structural events the input core does not consume.
pub trait InputListener {
    fn on_event(&mut self, event: &PlatformEvent);
}

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy)]
pub enum EventFilter {
    All,
    /// Quit and resize only.
    WindowOnly,
    Custom(fn(&PlatformEvent) -> bool),
}

impl EventFilter {
    fn accepts(&self, event: &PlatformEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::WindowOnly => matches!(
                event,
                PlatformEvent::Quit | PlatformEvent::WindowResized { .. }
            ),
            EventFilter::Custom(f) => f(event),
        }
    }
}

struct ListenerEntry {
    listener: Box<dyn InputListener>,
    enabled: bool,
    filter: EventFilter,
}

/// Fan-out of forwarded platform events. Listeners run in registration order.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener and returns its id.
    pub fn add_listener(
        &mut self,
        listener: impl InputListener + 'static,
        filter: EventFilter,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
            },
        );
        self.next_id += 1;
        id
    }

    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Mutes a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    pub fn remove_listener(&mut self, id: u64) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn emit(&mut self, event: &PlatformEvent) {
        for entry in self.listeners.values_mut() {
            if entry.enabled && entry.filter.accepts(event) {
                entry.listener.on_event(event);
            }
        }
    }

    pub fn emit_all(&mut self, events: &[PlatformEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}
