use crate::user_repo::{UserRecord, UserRepository};
use async_trait::async_trait;
use cb_crypto::{RsaPublicKey, SecurityManager};
use cb_net::{OutboundQueue, PacketReceiver};
use cb_protocol::{event_type, Content, Packet};
use std::sync::Arc;
use tracing::{info, warn};

/// The server domain receiver: handles `REGISTER`, `LOGIN`,
/// `MESSAGE`, and `REQUEST_USERS` against the user repository, replying
/// point-to-point to the requester and forwarding broadcastable events
/// (the post-login subscription, chat messages) on to the Event Bus.
pub struct AuthServerReceiver {
    repo: Arc<UserRepository>,
    outbound: Arc<OutboundQueue>,
    bus_port: u16,
    bus_public_key: RsaPublicKey,
}

impl AuthServerReceiver {
    pub fn new(
        repo: Arc<UserRepository>,
        outbound: Arc<OutboundQueue>,
        bus_port: u16,
        bus_public_key: RsaPublicKey,
    ) -> Arc<Self> {
        Arc::new(Self {
            repo,
            outbound,
            bus_port,
            bus_public_key,
        })
    }

    async fn reply_to_origin(&self, request: &Packet, packet_type: &str, content: Content) {
        let Some((host, port)) = request.origin_endpoint() else {
            warn!(packet_type, "request carries no origin endpoint, cannot reply");
            return;
        };
        let Some(public_key_bytes) = request.origin_public_key.as_deref() else {
            warn!(packet_type, "request carries no origin public key, cannot reply");
            return;
        };
        let Ok(recipient_key) = SecurityManager::import_public(public_key_bytes) else {
            warn!(packet_type, "request's origin public key is unparseable, cannot reply");
            return;
        };
        let reply = Packet::new(packet_type, content)
            .with_origin(event_type::SERVER)
            .with_host(host)
            .with_dest_port(port);
        self.outbound.enqueue(reply, recipient_key).await;
    }

    /// Routes `packet` to the bus. Only `dest_port` is overwritten: `host`
    /// is left as whatever the packet already carries (the originating
    /// client's own address), because the bus reads `(host, origin_port)`
    /// straight off the wire to identify the subscriber — see DESIGN.md
    /// on why the node and bus addresses are assumed to coincide.
    async fn forward_to_bus(&self, packet: Packet) {
        let forwarded = packet.with_dest_port(self.bus_port);
        self.outbound.enqueue(forwarded, self.bus_public_key.clone()).await;
    }

    async fn handle_register(&self, packet: &Packet) {
        let Some(username) = packet.content.get_str("username") else {
            self.reply_to_origin(packet, event_type::REGISTER_FAIL, Content::str("missing username")).await;
            return;
        };
        let Some(password) = packet.content.get_str("password") else {
            self.reply_to_origin(packet, event_type::REGISTER_FAIL, Content::str("missing password")).await;
            return;
        };
        let color = packet.content.get_str("color").unwrap_or("white").to_owned();
        let Some((ip, port)) = packet.origin_endpoint() else {
            self.reply_to_origin(packet, event_type::REGISTER_FAIL, Content::str("missing origin endpoint")).await;
            return;
        };
        let public_key = packet.origin_public_key.clone().unwrap_or_default();

        let record = UserRecord {
            password_hash: SecurityManager::hash_password(password),
            ip: ip.to_owned(),
            port,
            color,
            public_key,
        };
        match self.repo.register(username, record) {
            Ok(()) => {
                info!(username, "registered new user");
                self.reply_to_origin(packet, event_type::REGISTER_OK, Content::str(username)).await;
            }
            Err(e) => {
                self.reply_to_origin(packet, event_type::REGISTER_FAIL, Content::str(e.to_string())).await;
            }
        }
    }

    async fn handle_login(&self, packet: &Packet) {
        let (Some(username), Some(password)) =
            (packet.content.get_str("username"), packet.content.get_str("password"))
        else {
            self.reply_to_origin(packet, event_type::ERROR, Content::str("missing credentials")).await;
            return;
        };
        let Some(record) = self.repo.get(username) else {
            self.reply_to_origin(packet, event_type::ERROR, Content::str("no such user")).await;
            return;
        };
        if record.password_hash != SecurityManager::hash_password(password) {
            self.reply_to_origin(packet, event_type::ERROR, Content::str("bad credentials")).await;
            return;
        }
        let Some((ip, port)) = packet.origin_endpoint() else {
            self.reply_to_origin(packet, event_type::ERROR, Content::str("missing origin endpoint")).await;
            return;
        };
        let public_key = packet.origin_public_key.clone().unwrap_or_default();
        if let Err(e) = self.repo.update_presence(username, ip.to_owned(), port, public_key.clone()) {
            warn!(username, error = %e, "failed to persist presence on login");
        }

        self.reply_to_origin(packet, event_type::LOGIN_OK, Content::str(record.color.clone())).await;

        // Subscribe this client to broadcastable events via the bus,
        // same as any other node would with BEGIN_CONNECTION.
        let begin = Packet::new(
            event_type::BEGIN_CONNECTION,
            Content::list_of_strings([event_type::MESSAGE, event_type::USER_LIST]),
        )
        .with_host(ip)
        .with_origin_port(port)
        .with_origin_public_key(public_key);
        self.forward_to_bus(begin).await;
    }

    async fn handle_message(&self, packet: Packet) {
        self.forward_to_bus(packet).await;
    }

    async fn handle_request_users(&self, packet: &Packet) {
        let names = self.repo.list().into_iter().map(|(name, _)| name);
        self.reply_to_origin(packet, event_type::USER_LIST, Content::list_of_strings(names)).await;
    }
}

#[async_trait]
impl PacketReceiver for AuthServerReceiver {
    async fn on_packet(&self, packet: Packet) {
        match packet.packet_type.as_str() {
            event_type::REGISTER => self.handle_register(&packet).await,
            event_type::LOGIN => self.handle_login(&packet).await,
            event_type::REQUEST_USERS => self.handle_request_users(&packet).await,
            event_type::MESSAGE => self.handle_message(packet).await,
            other => warn!(packet_type = other, "authserver has no handler for this packet type"),
        }
    }
}
