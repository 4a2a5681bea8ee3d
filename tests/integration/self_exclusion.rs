use bus::EventBus;
use cb_crypto::SecurityManager;
use cb_net::OutboundQueue;
use cb_protocol::{event_type, Content, Packet};

fn begin_connection(host: &str, port: u16, public_key: Vec<u8>, events: &[&str]) -> Packet {
    Packet::new(event_type::BEGIN_CONNECTION, Content::list_of_strings(events.iter().copied()))
        .with_host(host)
        .with_origin_port(port)
        .with_origin_public_key(public_key)
}

/// The originating subscriber receives zero frames of its own publish.
#[tokio::test]
async fn originator_receives_nothing_from_its_own_publish() {
    let bus = EventBus::new(vec![0u8; 4]);
    let outbound = OutboundQueue::new();

    let a = SecurityManager::generate().unwrap().public_key_bytes().unwrap();
    let b = SecurityManager::generate().unwrap().public_key_bytes().unwrap();

    bus.publish(&outbound, begin_connection("127.0.0.1", 7001, a, &["CHAT"])).await;
    bus.publish(&outbound, begin_connection("127.0.0.1", 7002, b, &["CHAT"])).await;

    let chat = Packet::new("CHAT", Content::str("hi"))
        .with_host("127.0.0.1")
        .with_origin_port(7002);
    bus.publish(&outbound, chat).await;

    let (text, _) = outbound.dequeue().await.expect("one delivery to the non-originator");
    let delivered = cb_protocol::decode(&text).unwrap();
    assert_eq!(delivered.dest_port, Some(7001));
    assert!(outbound.dequeue().await.is_none(), "the originator gets nothing");
}
