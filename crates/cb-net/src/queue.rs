use crate::observer::QueueObserver;
use cb_protocol::Packet;
use cb_crypto::RsaPublicKey;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Default bound on queue depth. Backpressure and flow control beyond a
/// bounded FIFO are out of scope.
pub const DEFAULT_CAPACITY: usize = 4096;

/// An item waiting to be sent: the packet and the public key its
/// recipient must be encrypted under, set by the application before
/// enqueue. Carrying the key alongside the packet, rather than as
/// separate Sender-global state, is what makes fan-out to many
/// recipients with different keys safe.
#[derive(Clone)]
pub struct OutboundItem {
    pub packet: Packet,
    pub recipient_public_key: RsaPublicKey,
}

struct Inner<T> {
    items: Mutex<VecDeque<T>>,
    observers: Mutex<Vec<Arc<dyn QueueObserver>>>,
    capacity: usize,
}

impl<T> Inner<T> {
    fn new(capacity: usize) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            observers: Mutex::new(Vec::new()),
            capacity,
        }
    }

    async fn push(&self, item: T) -> bool {
        {
            let mut items = self.items.lock().await;
            if items.len() >= self.capacity {
                return false;
            }
            items.push_back(item);
        }
        let observers = self.observers.lock().await;
        for observer in observers.iter() {
            observer.on_data_available();
        }
        true
    }

    async fn pop(&self) -> Option<T> {
        self.items.lock().await.pop_front()
    }

    async fn len(&self) -> usize {
        self.items.lock().await.len()
    }

    async fn add_observer(&self, observer: Arc<dyn QueueObserver>) {
        self.observers.lock().await.push(observer);
    }

    async fn set_single_observer(&self, observer: Arc<dyn QueueObserver>) {
        let mut observers = self.observers.lock().await;
        observers.clear();
        observers.push(observer);
    }
}

/// Application code enqueues typed packets (plus the recipient key);
/// `dequeue` returns the packet serialized through the codec.
/// Has exactly one observer — the Sender.
pub struct OutboundQueue {
    inner: Inner<OutboundItem>,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self {
            inner: Inner::new(DEFAULT_CAPACITY),
        }
    }

    pub async fn set_observer(&self, observer: Arc<dyn QueueObserver>) {
        self.inner.set_single_observer(observer).await;
    }

    /// Enqueues `packet` for delivery, encrypted under
    /// `recipient_public_key`. Returns `false` if the queue is full and
    /// the packet was dropped.
    pub async fn enqueue(&self, packet: Packet, recipient_public_key: RsaPublicKey) -> bool {
        self.inner
            .push(OutboundItem {
                packet,
                recipient_public_key,
            })
            .await
    }

    /// Dequeues the next item, serialized through the codec. Returns
    /// `None` if empty. A packet that fails to serialize (only possible
    /// with an empty `type`, an invariant violation) is dropped and
    /// logged rather than returned.
    pub async fn dequeue(&self) -> Option<(String, RsaPublicKey)> {
        loop {
            let item = self.inner.pop().await?;
            match cb_protocol::encode(&item.packet) {
                Ok(text) => return Some((text, item.recipient_public_key)),
                Err(e) => warn!(error = %e, "dropping unencodable outbound packet"),
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

impl Default for OutboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// The Listener's worker threads enqueue decrypted frame bodies, still in
/// textual form; `dequeue` returns a parsed packet or `None`.
/// May have multiple observers (the Dispatcher, plus test harnesses), but
/// only one consumer should call `dequeue` to preserve the FIFO invariant
/// — observers beyond the Dispatcher are for notification/instrumentation
/// only.
pub struct InboundQueue {
    inner: Inner<String>,
}

impl InboundQueue {
    pub fn new() -> Self {
        Self {
            inner: Inner::new(DEFAULT_CAPACITY),
        }
    }

    pub async fn add_observer(&self, observer: Arc<dyn QueueObserver>) {
        self.inner.add_observer(observer).await;
    }

    /// Enqueues a decrypted frame body in textual form. Returns `false`
    /// if the queue is full and the frame was dropped.
    pub async fn enqueue_text(&self, text: String) -> bool {
        self.inner.push(text).await
    }

    /// Dequeues and parses the next frame. Malformed frames are dropped
    /// and logged; the next well-formed frame, if
    /// any, is returned instead.
    pub async fn dequeue(&self) -> Option<Packet> {
        loop {
            let text = self.inner.pop().await?;
            match cb_protocol::decode(&text) {
                Ok(packet) => return Some(packet),
                Err(e) => warn!(error = %e, "dropping malformed inbound frame"),
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.len().await
    }
}

impl Default for InboundQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience used by tests that just need a throwaway content value.
#[cfg(test)]
fn chat(text: &str) -> cb_protocol::Content {
    cb_protocol::Content::str(text)
}
