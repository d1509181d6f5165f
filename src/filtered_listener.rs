use crate::event::PlatformEvent;
use crate::eventbus::InputListener;

/// Wraps a listener and forwards only events matching a predicate.
///
/// Unlike [`EventFilter::Custom`](crate::eventbus::EventFilter::Custom), the
/// predicate may capture state.
pub struct FilteredListener {
    predicate: Box<dyn Fn(&PlatformEvent) -> bool>,
    inner: Box<dyn InputListener>,
}

impl FilteredListener {
    pub fn new(
        predicate: impl Fn(&PlatformEvent) -> bool + 'static,
        inner: impl InputListener + 'static,
    ) -> Self {
        Self {
            predicate: Box::new(predicate),
            inner: Box::new(inner),
        }
    }
}

impl InputListener for FilteredListener {
    fn on_event(&mut self, event: &PlatformEvent) {
        if (self.predicate)(event) {
            self.inner.on_event(event);
        }
    }
}
