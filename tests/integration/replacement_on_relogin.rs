use bus::EventBus;
use cb_net::OutboundQueue;
use cb_protocol::{event_type, Content, Packet};

fn begin_connection(host: &str, port: u16, public_key: Vec<u8>, events: &[&str]) -> Packet {
    Packet::new(event_type::BEGIN_CONNECTION, Content::list_of_strings(events.iter().copied()))
        .with_host(host)
        .with_origin_port(port)
        .with_origin_public_key(public_key)
}

/// A second `BEGIN_CONNECTION` from the same `(host, port)` replaces
/// rather than duplicates the subscription —
/// observed by publishing afterward and seeing exactly one delivery,
/// encrypted under the *new* key (the old one would fail re-import if
/// it were still present and distinct).
#[tokio::test]
async fn relogin_leaves_exactly_one_subscriber_per_event_type() {
    let bus = EventBus::new(vec![0u8; 4]);
    let outbound = OutboundQueue::new();

    bus.publish(&outbound, begin_connection("10.0.0.5", 9000, vec![1], &["CHAT"])).await;
    bus.publish(&outbound, begin_connection("10.0.0.5", 9000, vec![2], &["CHAT"])).await;

    let publish = Packet::new("CHAT", Content::str("x"))
        .with_host("10.0.0.9")
        .with_origin_port(9001);
    bus.publish(&outbound, publish).await;

    let (text, _) = outbound.dequeue().await.expect("the re-registered subscriber still gets the event");
    let delivered = cb_protocol::decode(&text).unwrap();
    assert_eq!(delivered.dest_port, Some(9000));
    assert!(outbound.dequeue().await.is_none(), "no duplicate delivery from a stale record");
}

/// An explicit `register`/`unregister` pair (the server's domain-code
/// path outside `BEGIN_CONNECTION`) behaves the same way.
#[tokio::test]
async fn explicit_register_then_unregister_stops_delivery() {
    let bus = EventBus::new(vec![0u8; 4]);
    let outbound = OutboundQueue::new();

    bus.publish(&outbound, begin_connection("10.0.0.5", 9000, vec![1], &[])).await;
    // Attach the freshly registered identity to USER_LIST outside the
    // connect flow, the way a login handler would.
    let record = std::sync::Arc::new(bus::ServiceRecord {
        id: 1,
        host: "10.0.0.5".to_owned(),
        port: 9000,
        public_key: vec![1],
    });
    bus.register("USER_LIST", record.clone()).await;

    let publish = Packet::new("USER_LIST", Content::str("x"))
        .with_host("10.0.0.9")
        .with_origin_port(9001);
    bus.publish(&outbound, publish).await;
    assert!(outbound.dequeue().await.is_some(), "registered subscriber receives the event");

    bus.unregister("USER_LIST", &record).await;
    bus.publish(
        &outbound,
        Packet::new("USER_LIST", Content::str("x"))
            .with_host("10.0.0.9")
            .with_origin_port(9001),
    )
    .await;
    assert!(outbound.dequeue().await.is_none(), "unregistered subscriber receives nothing");
}
