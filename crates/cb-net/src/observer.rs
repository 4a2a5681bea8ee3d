use std::sync::Arc;
use tokio::sync::Notify;

/// Single-method observer hook around a queue. Implementations must be cheap and
/// non-blocking — they only signal that draining should happen, the
/// actual drain runs on the observer's own task.
pub trait QueueObserver: Send + Sync {
    fn on_data_available(&self);
}

/// Adapts a [`tokio::sync::Notify`] into a [`QueueObserver`]. Every
/// consumer in this crate (Sender, Dispatcher) is a task loop waiting on
/// `Notify::notified()`, so this is the only observer implementation the
/// pipeline itself needs; test harnesses may supply their own.
pub struct NotifyObserver(pub Arc<Notify>);

impl QueueObserver for NotifyObserver {
    fn on_data_available(&self) {
        self.0.notify_one();
    }
}
