use async_trait::async_trait;
use cb_protocol::Packet;

/// The contract a Network Assembly's application logic presents to the
/// Dispatcher. Both the Event Bus and the thin client/server
/// shells implement this uniformly.
#[async_trait]
pub trait PacketReceiver: Send + Sync {
    async fn on_packet(&self, packet: Packet);
}
