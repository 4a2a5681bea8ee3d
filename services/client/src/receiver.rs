use crate::presenter::Presenter;
use async_trait::async_trait;
use cb_net::PacketReceiver;
use cb_protocol::{event_type, Packet};
use std::sync::Arc;
use tracing::warn;

/// The client receiver: decodes `LOGIN_OK`, `REGISTER_OK`,
/// `REGISTER_FAIL`, `MESSAGE`, `USER_LIST`, and `ERROR` and forwards each
/// to a [`Presenter`]. Every other type is logged and dropped.
pub struct ClientReceiver {
    presenter: Arc<dyn Presenter>,
}

impl ClientReceiver {
    pub fn new(presenter: Arc<dyn Presenter>) -> Arc<Self> {
        Arc::new(Self { presenter })
    }
}

#[async_trait]
impl PacketReceiver for ClientReceiver {
    async fn on_packet(&self, packet: Packet) {
        match packet.packet_type.as_str() {
            event_type::LOGIN_OK => {
                let color = packet.content.as_str().unwrap_or("white");
                self.presenter.login_ok(color);
            }
            event_type::REGISTER_OK => {
                let username = packet.content.as_str().unwrap_or("");
                self.presenter.register_ok(username);
            }
            event_type::REGISTER_FAIL => {
                let reason = packet.content.as_str().unwrap_or("unknown reason");
                self.presenter.register_fail(reason);
            }
            event_type::MESSAGE => {
                let origin = packet.origin.as_deref().unwrap_or("?");
                let body = packet.content.as_str().unwrap_or("");
                self.presenter.message(origin, body);
            }
            event_type::USER_LIST => {
                self.presenter.user_list(&packet.content.as_event_type_list());
            }
            event_type::ERROR => {
                let reason = packet.content.as_str().unwrap_or("unknown error");
                self.presenter.error(reason);
            }
            other => warn!(packet_type = other, "client has no handler for this packet type"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cb_protocol::Content;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPresenter {
        lines: Mutex<Vec<String>>,
    }

    impl Presenter for RecordingPresenter {
        fn login_ok(&self, color: &str) {
            self.lines.lock().unwrap().push(format!("login_ok:{color}"));
        }
        fn register_ok(&self, username: &str) {
            self.lines.lock().unwrap().push(format!("register_ok:{username}"));
        }
        fn register_fail(&self, reason: &str) {
            self.lines.lock().unwrap().push(format!("register_fail:{reason}"));
        }
        fn message(&self, origin: &str, body: &str) {
            self.lines.lock().unwrap().push(format!("message:{origin}:{body}"));
        }
        fn user_list(&self, users: &[String]) {
            self.lines.lock().unwrap().push(format!("user_list:{}", users.join(",")));
        }
        fn error(&self, reason: &str) {
            self.lines.lock().unwrap().push(format!("error:{reason}"));
        }
    }

    #[tokio::test]
    async fn login_ok_forwards_the_color() {
        let presenter = Arc::new(RecordingPresenter::default());
        let receiver = ClientReceiver::new(presenter.clone());
        receiver
            .on_packet(Packet::new(event_type::LOGIN_OK, Content::str("blue")))
            .await;
        assert_eq!(presenter.lines.lock().unwrap().as_slice(), ["login_ok:blue"]);
    }

    #[tokio::test]
    async fn message_forwards_origin_and_body() {
        let presenter = Arc::new(RecordingPresenter::default());
        let receiver = ClientReceiver::new(presenter.clone());
        receiver
            .on_packet(Packet::new(event_type::MESSAGE, Content::str("hi")).with_origin("alice"))
            .await;
        assert_eq!(presenter.lines.lock().unwrap().as_slice(), ["message:alice:hi"]);
    }

    #[tokio::test]
    async fn user_list_forwards_every_name() {
        let presenter = Arc::new(RecordingPresenter::default());
        let receiver = ClientReceiver::new(presenter.clone());
        receiver
            .on_packet(Packet::new(event_type::USER_LIST, Content::list_of_strings(["alice", "bob"])))
            .await;
        assert_eq!(presenter.lines.lock().unwrap().as_slice(), ["user_list:alice,bob"]);
    }

    #[tokio::test]
    async fn unknown_type_is_a_no_op() {
        let presenter = Arc::new(RecordingPresenter::default());
        let receiver = ClientReceiver::new(presenter.clone());
        receiver.on_packet(Packet::new("MYSTERY", Content::str("x"))).await;
        assert!(presenter.lines.lock().unwrap().is_empty());
    }
}
