use crate::queue::InboundQueue;
use crate::wire::{decode_frame_body, MAX_FRAME_BYTES};
use cb_crypto::SecurityManager;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener as TokioTcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, error, warn};

const ACCEPT_TIMEOUT: Duration = Duration::from_secs(1);

/// Binds to a configured host/port and runs the accept loop.
/// When port 0 is requested, `port()` reports the port the OS actually
/// chose.
pub struct Listener {
    inner: TokioTcpListener,
}

impl Listener {
    pub async fn bind(host: &str, port: u16) -> std::io::Result<Self> {
        let inner = TokioTcpListener::bind((host, port)).await?;
        Ok(Self { inner })
    }

    pub fn port(&self) -> std::io::Result<u16> {
        Ok(self.inner.local_addr()?.port())
    }

    /// Runs the accept loop until `shutdown` is signalled. A short accept
    /// timeout (1s) keeps shutdown responsive without needing a
    /// second channel dedicated to interrupting `accept()`.
    pub async fn run(
        self,
        security: Arc<SecurityManager>,
        inbound: Arc<InboundQueue>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown.borrow() {
                return;
            }
            tokio::select! {
                accepted = tokio::time::timeout(ACCEPT_TIMEOUT, self.inner.accept()) => {
                    match accepted {
                        Ok(Ok((stream, peer))) => {
                            let security = security.clone();
                            let inbound = inbound.clone();
                            tokio::spawn(async move {
                                handle_connection(stream, security, inbound).await;
                            });
                        }
                        Ok(Err(e)) => {
                            warn!(error = %e, "accept failed");
                        }
                        Err(_) => {} // accept timeout, loop around to re-check shutdown
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        return;
                    }
                }
            }
        }
    }
}

/// One short-lived worker per accepted connection.
async fn handle_connection(stream: TcpStream, security: Arc<SecurityManager>, inbound: Arc<InboundQueue>) {
    let peer = stream.peer_addr().ok();
    let mut reader = BufReader::new(stream);
    let mut line = Vec::new();

    let read_result = reader.read_until(b'\n', &mut line).await;
    match read_result {
        Ok(0) => {
            debug!(?peer, "connection closed before a frame arrived");
            return;
        }
        Ok(_) => {}
        Err(e) => {
            warn!(?peer, error = %e, "read failed");
            return;
        }
    }
    if line.len() > MAX_FRAME_BYTES {
        warn!(?peer, len = line.len(), "frame exceeds maximum size, dropping");
        return;
    }
    if line.last() == Some(&b'\n') {
        line.pop();
    }

    let envelope = match decode_frame_body(&line) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(?peer, error = %e, "frame is not valid base64, dropping");
            return;
        }
    };

    let plaintext = match security.decrypt(&envelope) {
        Ok(text) => text,
        Err(_) => match security.decrypt_raw(&envelope) {
            Ok(text) => text,
            Err(_) => {
                error!(?peer, "decrypt failed under both hybrid and raw-asymmetric paths, dropping");
                return;
            }
        },
    };

    inbound.enqueue_text(plaintext).await;
    // The connection is one-shot; dropping `reader` here
    // closes it.
}
