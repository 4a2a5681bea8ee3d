use crate::queue::InboundQueue;
use crate::receiver::PacketReceiver;
use std::sync::Arc;
use tokio::sync::{watch, Notify};

/// The sole consumer of the Inbound Queue. Other observers may
/// be registered on the same queue for instrumentation, but only the
/// Dispatcher calls `dequeue`, which is what keeps delivery FIFO.
pub struct Dispatcher {
    inbound: Arc<InboundQueue>,
    receiver: Arc<dyn PacketReceiver>,
}

impl Dispatcher {
    pub fn new(inbound: Arc<InboundQueue>, receiver: Arc<dyn PacketReceiver>) -> Self {
        Self { inbound, receiver }
    }

    pub async fn run(self: Arc<Self>, notify: Arc<Notify>, mut shutdown: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                () = notify.notified() => self.drain().await,
                _ = shutdown.changed() => {
                    self.drain().await;
                    return;
                }
            }
        }
    }

    async fn drain(&self) {
        while let Some(packet) = self.inbound.dequeue().await {
            self.receiver.on_packet(packet).await;
        }
    }
}
