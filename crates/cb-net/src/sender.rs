use crate::queue::OutboundQueue;
use crate::wire::encode_frame;
use cb_crypto::SecurityManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::{watch, Notify};
use tracing::{error, warn};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Observes the Outbound Queue and, for each item, dials the recipient,
/// encrypts, frames, and writes exactly one message. A single Sender
/// worker keeps send ordering FIFO per assembly.
pub struct Sender {
    security: Arc<SecurityManager>,
    outbound: Arc<OutboundQueue>,
}

impl Sender {
    pub fn new(security: Arc<SecurityManager>, outbound: Arc<OutboundQueue>) -> Self {
        Self { security, outbound }
    }

    /// Runs until `shutdown` is signalled, draining the outbound queue
    /// every time it is notified (and once more before exiting, so a
    /// final burst enqueued right before shutdown still gets a chance to
    /// go out).
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
        while let Some((text, recipient_public_key)) = self.outbound.dequeue().await {
            if let Err(e) = self.send_one(&text, &recipient_public_key).await {
                warn!(error = %e, "failed to deliver packet, discarding (no retry)");
            }
        }
    }

    async fn send_one(&self, text: &str, recipient_public_key: &cb_crypto::RsaPublicKey) -> std::io::Result<()> {
        let packet = cb_protocol::decode(text)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        let host = packet
            .host
            .clone()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no destination host"))?;
        let port = packet
            .dest_port
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "no destination port"))?;

        let envelope = match self.security.encrypt(text, recipient_public_key) {
            Ok(envelope) => envelope,
            Err(_) if text.len() < cb_crypto::RAW_ASYM_MAX_PLAINTEXT => {
                self.security
                    .encrypt_raw(text, recipient_public_key)
                    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?
            }
            Err(e) => {
                error!(error = %e, "hybrid encryption failed and plaintext is too large for raw fallback");
                return Err(std::io::Error::new(std::io::ErrorKind::Other, e));
            }
        };

        let mut stream = tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect((host.as_str(), port)))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::TimedOut, "connect timed out"))??;

        let frame = encode_frame(&envelope);
        stream.write_all(&frame).await?;
        stream.shutdown().await.ok();
        Ok(())
    }
}
