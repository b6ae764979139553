// ABOUTME: Event bus and handler traits for decoupled communication
// ABOUTME: Provides publish-subscribe plumbing plus recording and no-op buses

use crate::engine::Event;
use parking_lot::Mutex;

/// Event bus trait for dispatching engine events
pub trait EventBus {
    fn dispatch(&self, event: Event);
}

/// Event handler trait for receiving engine events
pub trait EventHandler {
    fn handle(&mut self, event: &Event);
}

/// Bus that drops every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBus;

impl EventBus for NullBus {
    fn dispatch(&self, _event: Event) {}
}

/// Bus that keeps every dispatched event, in order
#[derive(Debug, Default)]
pub struct RecordingBus {
    events: Mutex<Vec<Event>>,
}

impl RecordingBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.events.lock())
    }

    pub fn count(&self, name: &str) -> usize {
        self.events.lock().iter().filter(|e| e.name() == name).count()
    }
}

impl EventBus for RecordingBus {
    fn dispatch(&self, event: Event) {
        self.events.lock().push(event);
    }
}

/// Fans events out to registered handlers
#[derive(Default)]
pub struct HandlerBus {
    handlers: Mutex<Vec<Box<dyn EventHandler + Send>>>,
}

impl HandlerBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler + Send>) {
        self.handlers.lock().push(handler);
    }
}

impl EventBus for HandlerBus {
    fn dispatch(&self, event: Event) {
        for handler in self.handlers.lock().iter_mut() {
            handler.handle(&event);
        }
    }
}

impl<T: EventBus + ?Sized> EventBus for std::sync::Arc<T> {
    fn dispatch(&self, event: Event) {
        (**self).dispatch(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Counter(Arc<Mutex<usize>>);

    impl EventHandler for Counter {
        fn handle(&mut self, _event: &Event) {
            *self.0.lock() += 1;
        }
    }

    #[test]
    fn test_recording_bus_keeps_order() {
        let bus = RecordingBus::new();
        bus.dispatch(Event::VariablesChanged {
            names: vec!["--a".into()],
        });
        bus.dispatch(Event::VariablesChanged {
            names: vec!["--b".into()],
        });

        assert_eq!(bus.count("variables_changed"), 2);
        let events = bus.take();
        assert_eq!(
            events[0],
            Event::VariablesChanged {
                names: vec!["--a".into()]
            }
        );
        assert!(bus.events().is_empty());
    }

    #[test]
    fn test_handler_bus_fans_out() {
        let hits = Arc::new(Mutex::new(0));
        let bus = HandlerBus::new();
        bus.subscribe(Box::new(Counter(hits.clone())));
        bus.subscribe(Box::new(Counter(hits.clone())));

        bus.dispatch(Event::VariablesChanged { names: vec![] });

        assert_eq!(*hits.lock(), 2);
    }
}
