use crate::service_record::ServiceRecord;
use async_trait::async_trait;
use cb_crypto::SecurityManager;
use cb_net::{OutboundQueue, PacketReceiver};
use cb_protocol::{event_type, Packet};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// The broker: owns the subscriber tables and fans packets out to every
/// interested subscriber except the originator.
///
/// Subscriber tables are mutated only from the dispatcher worker that
/// drives [`PacketReceiver::on_packet`], so the locks here exist for
/// visibility across that single caller, not to arbitrate contention.
pub struct EventBus {
    by_event: Mutex<HashMap<String, Vec<Arc<ServiceRecord>>>>,
    by_public_key: Mutex<HashMap<Vec<u8>, Arc<ServiceRecord>>>,
    by_id: Mutex<HashMap<u64, Arc<ServiceRecord>>>,
    next_id: AtomicU64,
    own_public_key: Vec<u8>,
}

impl EventBus {
    pub fn new(own_public_key: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            by_event: Mutex::new(HashMap::new()),
            by_public_key: Mutex::new(HashMap::new()),
            by_id: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            own_public_key,
        })
    }

    /// The one entry point. `BEGIN_CONNECTION` registers a
    /// service record without fanout; every other packet type is
    /// broadcast to its subscribers.
    pub async fn publish(&self, outbound: &OutboundQueue, mut packet: Packet) {
        if packet.origin_public_key.is_none() {
            packet.origin_public_key = Some(self.own_public_key.clone());
        }

        if packet.packet_type == event_type::BEGIN_CONNECTION {
            self.begin_connection(packet).await;
            return;
        }

        self.notify_subscribers(outbound, packet).await;
    }

    /// Registers the record from `packet`'s origin coordinates into
    /// `by_id`/`by_public_key`, then attaches it to `by_event[t]` for each
    /// event type named in `content`. An empty event list is legal and
    /// registers identity only.
    async fn begin_connection(&self, packet: Packet) {
        let Some((host, port)) = packet.origin_endpoint() else {
            warn!("BEGIN_CONNECTION missing origin host/port, dropping");
            return;
        };
        let public_key = packet.origin_public_key.clone().unwrap_or_default();
        let event_types = packet.content.as_event_type_list();

        // Session replacement: a new BEGIN_CONNECTION for the same
        // (host, port) evicts the prior record from every table first.
        if let Some(existing) = self.find_by_endpoint(host, port).await {
            self.remove_record(existing.id).await;
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = Arc::new(ServiceRecord {
            id,
            host: host.to_owned(),
            port,
            public_key,
        });

        self.by_id.lock().await.insert(id, record.clone());
        self.by_public_key
            .lock().await
            .insert(record.public_key.clone(), record.clone());

        let mut by_event = self.by_event.lock().await;
        for event_type in event_types {
            let list = by_event.entry(event_type).or_default();
            if !list.iter().any(|r| r.endpoint() == record.endpoint()) {
                list.push(record.clone());
            }
        }
        debug!(id, host = %record.host, port = record.port, "registered service record");
    }

    /// Direct attachment outside the `BEGIN_CONNECTION` flow, used when
    /// the server's domain code wants to subscribe a record to
    /// an event type it did not request at connect time.
    pub async fn register(&self, event_type: &str, record: Arc<ServiceRecord>) {
        let mut by_event = self.by_event.lock().await;
        let list = by_event.entry(event_type.to_owned()).or_default();
        if !list.iter().any(|r| r.endpoint() == record.endpoint()) {
            list.push(record);
        }
    }

    pub async fn unregister(&self, event_type: &str, record: &ServiceRecord) {
        if let Some(list) = self.by_event.lock().await.get_mut(event_type) {
            list.retain(|r| r.id != record.id);
        }
    }

    /// Removes `id` from every subscriber table (explicit deregistration
    /// or session replacement).
    async fn remove_record(&self, id: u64) {
        let record = self.by_id.lock().await.remove(&id);
        if let Some(record) = record {
            // Only drop the by_public_key entry if it still belongs to
            // this id — two records can share public_key bytes (an
            // omitted or reused key), and evicting one must not take a
            // still-live record's entry with it.
            let mut by_public_key = self.by_public_key.lock().await;
            if by_public_key.get(&record.public_key).is_some_and(|r| r.id == id) {
                by_public_key.remove(&record.public_key);
            }
        }
        for list in self.by_event.lock().await.values_mut() {
            list.retain(|r| r.id != id);
        }
    }

    async fn find_by_endpoint(&self, host: &str, port: u16) -> Option<Arc<ServiceRecord>> {
        self.by_id
            .lock().await
            .values()
            .find(|r| r.host == host && r.port == port)
            .cloned()
    }

    /// Delivers `packet` to every subscriber of its type except the
    /// originator, preserving `by_event[type]` insertion order.
    async fn notify_subscribers(&self, outbound: &OutboundQueue, packet: Packet) {
        let subscribers = match self.by_event.lock().await.get(&packet.packet_type) {
            Some(list) => list.clone(),
            None => return,
        };

        for record in subscribers {
            if packet.origin_endpoint() == Some(record.endpoint()) {
                continue;
            }
            let recipient_key = match SecurityManager::import_public(&record.public_key) {
                Ok(key) => key,
                Err(e) => {
                    warn!(id = record.id, error = %e, "subscriber has unparseable public key, skipping");
                    continue;
                }
            };
            let outgoing = packet
                .clone()
                .with_host(record.host.clone())
                .with_dest_port(record.port);
            outbound.enqueue(outgoing, recipient_key).await;
        }
    }
}

#[async_trait]
impl PacketReceiver for BusReceiver {
    async fn on_packet(&self, packet: Packet) {
        self.bus.publish(&self.outbound, packet).await;
    }
}

/// Adapts [`EventBus`] to the [`PacketReceiver`] contract the Dispatcher
/// expects; holds the assembly's outbound queue it needs for fanout sends.
/// Built from [`cb_net::NetworkAssembly::outbound`] before `start` is
/// called, which avoids a construction cycle between the assembly and
/// its own receiver.
pub struct BusReceiver {
    bus: Arc<EventBus>,
    outbound: Arc<OutboundQueue>,
}

impl BusReceiver {
    pub fn new(bus: Arc<EventBus>, outbound: Arc<OutboundQueue>) -> Arc<Self> {
        Arc::new(Self { bus, outbound })
    }
}
