// ABOUTME: Cross-crate event definitions for decoupled communication
// ABOUTME: Notifications the engine raises towards the UI and presentation layers

pub mod engine;
pub mod event_bus;

pub use engine::{Event, WarningSubject};
pub use event_bus::{EventBus, EventHandler, HandlerBus, NullBus, RecordingBus};
