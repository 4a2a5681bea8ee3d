use crate::recording_receiver::RecordingReceiver;
use cb_crypto::{RsaPublicKey, SecurityManager};
use cb_net::{NetworkAssembly, PacketReceiver};
use cb_protocol::Packet;
use std::sync::Arc;

/// One node in a loopback test: a running [`NetworkAssembly`] bound to
/// `127.0.0.1:0`, paired with its own identity — the direct analogue of
/// `MockWsServer::start`.
pub struct TestNode {
    pub assembly: NetworkAssembly,
    pub security: Arc<SecurityManager>,
    pub host: String,
    pub port: u16,
}

impl TestNode {
    /// Generates a fresh key pair, binds a listener on an ephemeral port,
    /// and wires `receiver` as the packet sink.
    pub async fn spawn(receiver: Arc<dyn PacketReceiver>) -> Self {
        let security = Arc::new(SecurityManager::generate().expect("key generation"));
        let mut assembly = NetworkAssembly::new(security.clone());
        let port = assembly
            .start("127.0.0.1", 0, receiver)
            .await
            .expect("bind ephemeral port");
        Self {
            assembly,
            security,
            host: "127.0.0.1".to_owned(),
            port,
        }
    }

    /// Spawns a node with a fresh [`RecordingReceiver`], returning both so
    /// the caller can assert on what it received.
    pub async fn spawn_recording() -> (Self, Arc<RecordingReceiver>) {
        let receiver = RecordingReceiver::new();
        let node = Self::spawn(receiver.clone()).await;
        (node, receiver)
    }

    pub fn public_key(&self) -> RsaPublicKey {
        self.security.public_key().clone()
    }

    /// Enqueues `packet` for delivery to `recipient`'s inbound queue.
    pub async fn send_to(&self, packet: Packet, recipient: &TestNode) -> bool {
        self.assembly.send(packet, recipient.public_key()).await
    }

    pub async fn stop(self) {
        self.assembly.stop().await;
    }
}
