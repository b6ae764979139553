// ABOUTME: Batched CSS-variable writer with an explicit Idle/Batching/Flushing state machine
// ABOUTME: RAII batch guards coalesce writes and change notifications into one event

use crate::css_store::CssVariableStore;
use parking_lot::Mutex;
use tokenweave_events::{Event, EventBus};
use tokenweave_logging::{debug, trace};

/// Lifecycle of the writer's current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchState {
    #[default]
    Idle,
    Batching,
    Flushing,
}

#[derive(Debug, Default)]
struct BatchInner {
    state: BatchState,
    open: usize,
    queue: Vec<(String, String)>,
}

/// Writes CSS variables through to a store, queueing them while a batch is open.
///
/// When the outermost batch closes the queue is flushed in order and a single
/// [`Event::VariablesChanged`] names every variable whose value changed.
pub struct BatchedWriter<S, B> {
    store: S,
    bus: B,
    inner: Mutex<BatchInner>,
}

/// Open batch; dropping it closes the batch, also during unwinding
#[must_use = "the batch closes as soon as the guard is dropped"]
pub struct BatchGuard<'a, S: CssVariableStore, B: EventBus> {
    writer: &'a BatchedWriter<S, B>,
}

impl<S: CssVariableStore, B: EventBus> Drop for BatchGuard<'_, S, B> {
    fn drop(&mut self) {
        self.writer.end_batch();
    }
}

impl<S: CssVariableStore, B: EventBus> BatchedWriter<S, B> {
    pub fn new(store: S, bus: B) -> Self {
        Self {
            store,
            bus,
            inner: Mutex::new(BatchInner::default()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn state(&self) -> BatchState {
        self.inner.lock().state
    }

    /// Number of batches currently open
    pub fn pending_batches(&self) -> usize {
        self.inner.lock().open
    }

    pub fn queued_writes(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Open a batch, joining the current one if a batch is already open.
    pub fn begin_batch(&self) -> BatchGuard<'_, S, B> {
        let mut inner = self.inner.lock();
        inner.open += 1;
        inner.state = BatchState::Batching;
        trace!(open = inner.open, "Batch opened");
        BatchGuard { writer: self }
    }

    fn end_batch(&self) {
        let queue = {
            let mut inner = self.inner.lock();
            inner.open = inner.open.saturating_sub(1);
            if inner.open > 0 {
                return;
            }
            inner.state = BatchState::Flushing;
            std::mem::take(&mut inner.queue)
        };

        let queued = queue.len();
        let mut changed: Vec<String> = Vec::new();
        for (name, value) in queue {
            if self.store.write(&name, &value) && !changed.contains(&name) {
                changed.push(name);
            }
        }

        self.inner.lock().state = BatchState::Idle;
        debug!(queued, changed = changed.len(), "Batch flushed");

        if !changed.is_empty() {
            self.bus.dispatch(Event::VariablesChanged { names: changed });
        }
    }

    /// Write `value` to `name`. Queued while a batch is open; otherwise written
    /// immediately with its own notification. Returns whether the write was
    /// queued or changed the stored value.
    pub fn write(&self, name: &str, value: &str) -> bool {
        {
            let mut inner = self.inner.lock();
            if inner.state == BatchState::Batching {
                inner.queue.push((name.to_string(), value.to_string()));
                return true;
            }
        }

        let changed = self.store.write(name, value);
        if changed {
            self.bus.dispatch(Event::VariablesChanged {
                names: vec![name.to_string()],
            });
        }
        changed
    }

    /// Read through to the store, seeing queued writes first
    pub fn read(&self, name: &str) -> Option<String> {
        let queued = self
            .inner
            .lock()
            .queue
            .iter()
            .rev()
            .find(|(queued, _)| queued == name)
            .map(|(_, value)| value.clone());
        queued.or_else(|| self.store.read(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::css_store::InMemoryCssStore;
    use std::sync::Arc;
    use tokenweave_events::RecordingBus;

    fn writer() -> (BatchedWriter<InMemoryCssStore, Arc<RecordingBus>>, InMemoryCssStore, Arc<RecordingBus>) {
        let store = InMemoryCssStore::new();
        let bus = Arc::new(RecordingBus::new());
        (BatchedWriter::new(store.clone(), bus.clone()), store, bus)
    }

    #[test]
    fn test_unbatched_write_notifies_immediately() {
        let (writer, store, bus) = writer();
        assert!(writer.write("--interactive", "#0b5ed7"));
        assert_eq!(store.read("--interactive").as_deref(), Some("#0b5ed7"));
        assert_eq!(bus.count("variables_changed"), 1);

        assert!(!writer.write("--interactive", "#0b5ed7"));
        assert_eq!(bus.count("variables_changed"), 1);
    }

    #[test]
    fn test_batch_defers_writes_and_coalesces_events() {
        let (writer, store, bus) = writer();
        {
            let _batch = writer.begin_batch();
            assert_eq!(writer.state(), BatchState::Batching);
            writer.write("--a", "1");
            writer.write("--b", "2");
            writer.write("--a", "3");

            assert_eq!(store.read("--a"), None);
            assert_eq!(writer.read("--a").as_deref(), Some("3"));
            assert_eq!(bus.count("variables_changed"), 0);
        }

        assert_eq!(writer.state(), BatchState::Idle);
        assert_eq!(store.read("--a").as_deref(), Some("3"));
        assert_eq!(store.read("--b").as_deref(), Some("2"));
        assert_eq!(
            bus.take(),
            vec![Event::VariablesChanged {
                names: vec!["--a".into(), "--b".into()]
            }]
        );
    }

    #[test]
    fn test_nested_batches_flush_once() {
        let (writer, store, bus) = writer();
        let outer = writer.begin_batch();
        {
            let _inner = writer.begin_batch();
            writer.write("--inner", "x");
            assert_eq!(writer.pending_batches(), 2);
        }
        assert_eq!(store.read("--inner"), None);
        assert_eq!(writer.state(), BatchState::Batching);

        writer.write("--outer", "y");
        drop(outer);

        assert_eq!(writer.pending_batches(), 0);
        assert_eq!(store.len(), 2);
        assert_eq!(bus.count("variables_changed"), 1);
    }

    #[test]
    fn test_batch_without_changes_is_silent() {
        let (writer, store, bus) = writer();
        store.write("--a", "1");
        {
            let _batch = writer.begin_batch();
            writer.write("--a", "1");
        }
        assert_eq!(bus.count("variables_changed"), 0);
    }

    #[test]
    fn test_guard_releases_during_unwind() {
        let (writer, store, _bus) = writer();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _batch = writer.begin_batch();
            writer.write("--a", "1");
            panic!("cascade step failed");
        }));

        assert!(result.is_err());
        assert_eq!(writer.state(), BatchState::Idle);
        assert_eq!(store.read("--a").as_deref(), Some("1"));
    }
}
