use cb_protocol::{Content, Packet};
use cb_test_support::TestNode;
use std::time::Duration;

/// End-to-end loopback through the real network pipeline: two live
/// `NetworkAssembly`s on `127.0.0.1`, a genuine TCP round trip, hybrid
/// encryption both ways, and delivery through each side's Dispatcher.
#[tokio::test]
async fn a_message_sent_from_one_node_arrives_decrypted_at_the_other() {
    let (sender, _sender_recorder) = TestNode::spawn_recording().await;
    let (receiver, receiver_recorder) = TestNode::spawn_recording().await;

    let packet = Packet::new("MESSAGE", Content::str("hello from the loopback test"))
        .with_origin("alice")
        .with_host(receiver.host.clone())
        .with_dest_port(receiver.port)
        .with_origin_port(sender.port);
    assert!(sender.send_to(packet, &receiver).await);

    let delivered = receiver_recorder.wait_for_count(1, Duration::from_secs(2)).await;
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].packet_type, "MESSAGE");
    assert_eq!(delivered[0].content.as_str(), Some("hello from the loopback test"));
    assert_eq!(delivered[0].origin.as_deref(), Some("alice"));

    sender.stop().await;
    receiver.stop().await;
}

/// A larger payload, well past the raw-asymmetric ceiling, still round
/// trips — the hybrid envelope has no practical size limit.
#[tokio::test]
async fn a_large_payload_still_arrives_intact() {
    let (sender, _sender_recorder) = TestNode::spawn_recording().await;
    let (receiver, receiver_recorder) = TestNode::spawn_recording().await;

    let body = "x".repeat(20_000);
    let packet = Packet::new("MESSAGE", Content::str(body.clone()))
        .with_host(receiver.host.clone())
        .with_dest_port(receiver.port)
        .with_origin_port(sender.port);
    assert!(sender.send_to(packet, &receiver).await);

    let delivered = receiver_recorder.wait_for_count(1, Duration::from_secs(2)).await;
    assert_eq!(delivered[0].content.as_str(), Some(body.as_str()));

    sender.stop().await;
    receiver.stop().await;
}

/// A tiny payload, small enough for the raw-asymmetric fallback, also
/// round trips.
#[tokio::test]
async fn a_tiny_payload_still_arrives_intact() {
    let (sender, _sender_recorder) = TestNode::spawn_recording().await;
    let (receiver, receiver_recorder) = TestNode::spawn_recording().await;

    let packet = Packet::new("MESSAGE", Content::str("hi"))
        .with_host(receiver.host.clone())
        .with_dest_port(receiver.port)
        .with_origin_port(sender.port);
    assert!(sender.send_to(packet, &receiver).await);

    let delivered = receiver_recorder.wait_for_count(1, Duration::from_secs(2)).await;
    assert_eq!(delivered[0].content.as_str(), Some("hi"));

    sender.stop().await;
    receiver.stop().await;
}
