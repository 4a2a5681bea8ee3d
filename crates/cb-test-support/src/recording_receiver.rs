use async_trait::async_trait;
use cb_net::PacketReceiver;
use cb_protocol::Packet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};

/// A [`PacketReceiver`] that just remembers every packet it's handed, for
/// assertions in integration tests — the test-side analogue of
/// `MockWsClient::recv_message`.
pub struct RecordingReceiver {
    packets: Mutex<Vec<Packet>>,
    notify: Notify,
}

impl RecordingReceiver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            packets: Mutex::new(Vec::new()),
            notify: Notify::new(),
        })
    }

    pub async fn received(&self) -> Vec<Packet> {
        self.packets.lock().await.clone()
    }

    /// Waits up to `timeout` for at least `count` packets to have arrived,
    /// polling on the internal notify. Returns what was received, which may
    /// be short of `count` if the timeout elapses first.
    pub async fn wait_for_count(&self, count: usize, timeout: Duration) -> Vec<Packet> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            {
                let packets = self.packets.lock().await;
                if packets.len() >= count {
                    return packets.clone();
                }
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return self.packets.lock().await.clone();
            }
            let _ = tokio::time::timeout(remaining, self.notify.notified()).await;
        }
    }
}

#[async_trait]
impl PacketReceiver for RecordingReceiver {
    async fn on_packet(&self, packet: Packet) {
        self.packets.lock().await.push(packet);
        self.notify.notify_waiters();
    }
}

