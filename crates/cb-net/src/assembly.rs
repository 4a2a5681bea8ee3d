use crate::dispatcher::Dispatcher;
use crate::listener::Listener;
use crate::observer::NotifyObserver;
use crate::queue::{InboundQueue, OutboundQueue};
use crate::receiver::PacketReceiver;
use crate::sender::Sender;
use cb_crypto::{RsaPublicKey, SecurityManager};
use cb_protocol::Packet;
use std::sync::Arc;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

/// Wires the Listener, Sender, Dispatcher, and their two queues into one
/// running pipeline for a node. One `NetworkAssembly` is built per process: the Event Bus has exactly
/// one, and so does each thin client/server shell.
pub struct NetworkAssembly {
    security: Arc<SecurityManager>,
    inbound: Arc<InboundQueue>,
    outbound: Arc<OutboundQueue>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NetworkAssembly {
    pub fn new(security: Arc<SecurityManager>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            security,
            inbound: Arc::new(InboundQueue::new()),
            outbound: Arc::new(OutboundQueue::new()),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    pub fn outbound(&self) -> Arc<OutboundQueue> {
        self.outbound.clone()
    }

    pub fn inbound(&self) -> Arc<InboundQueue> {
        self.inbound.clone()
    }

    /// Enqueues `packet` for delivery, encrypted under `recipient_public_key`.
    pub async fn send(&self, packet: Packet, recipient_public_key: RsaPublicKey) -> bool {
        self.outbound.enqueue(packet, recipient_public_key).await
    }

    /// Binds the listener, then spawns the Listener, Sender, and
    /// Dispatcher as background tasks. Returns the bound port (useful
    /// when `port` was 0).
    pub async fn start(
        &mut self,
        host: &str,
        port: u16,
        receiver: Arc<dyn PacketReceiver>,
    ) -> std::io::Result<u16> {
        let listener = Listener::bind(host, port).await?;
        let bound_port = listener.port()?;

        let listener_task = tokio::spawn(listener.run(
            self.security.clone(),
            self.inbound.clone(),
            self.shutdown_rx.clone(),
        ));

        let sender = Arc::new(Sender::new(self.security.clone(), self.outbound.clone()));
        let sender_notify = Arc::new(Notify::new());
        self.outbound
            .set_observer(Arc::new(NotifyObserver(sender_notify.clone())))
            .await;
        let sender_task = tokio::spawn(sender.run(sender_notify, self.shutdown_rx.clone()));

        let dispatcher = Arc::new(Dispatcher::new(self.inbound.clone(), receiver));
        let dispatcher_notify = Arc::new(Notify::new());
        self.inbound
            .add_observer(Arc::new(NotifyObserver(dispatcher_notify.clone())))
            .await;
        let dispatcher_task = tokio::spawn(dispatcher.run(dispatcher_notify, self.shutdown_rx.clone()));

        self.tasks = vec![listener_task, sender_task, dispatcher_task];
        Ok(bound_port)
    }

    /// Signals all three workers to finish their current drain and exit,
    /// then waits for them to join.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks.drain(..) {
            let _ = task.await;
        }
    }
}
