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

/// Three subscribers on `CHAT`, one of them the originator, yields
/// exactly two outbound frames in subscriber order.
#[tokio::test]
async fn three_subscribers_one_origin_yields_two_frames_in_order() {
    let bus = EventBus::new(vec![0u8; 4]);
    let outbound = OutboundQueue::new();

    let a = SecurityManager::generate().unwrap().public_key_bytes().unwrap();
    let b = SecurityManager::generate().unwrap().public_key_bytes().unwrap();
    let c = SecurityManager::generate().unwrap().public_key_bytes().unwrap();

    bus.publish(&outbound, begin_connection("127.0.0.1", 7001, a, &["CHAT"])).await;
    bus.publish(&outbound, begin_connection("127.0.0.1", 7002, b, &["CHAT"])).await;
    bus.publish(&outbound, begin_connection("127.0.0.1", 7003, c, &["CHAT"])).await;

    let chat = Packet::new("CHAT", Content::str("hi"))
        .with_host("127.0.0.1")
        .with_origin_port(7002);
    bus.publish(&outbound, chat).await;

    let (first_text, _) = outbound.dequeue().await.expect("first delivery");
    let first = cb_protocol::decode(&first_text).unwrap();
    assert_eq!(first.dest_port, Some(7001));

    let (second_text, _) = outbound.dequeue().await.expect("second delivery");
    let second = cb_protocol::decode(&second_text).unwrap();
    assert_eq!(second.dest_port, Some(7003));

    assert!(outbound.dequeue().await.is_none(), "exactly two frames, no more");
}
