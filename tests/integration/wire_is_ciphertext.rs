use base64::Engine as _;
use cb_crypto::SecurityManager;
use cb_protocol::{encode, Content, Packet};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Capture the raw bytes that cross a real TCP
/// socket and assert the plaintext event type never appears in them —
/// the wire only ever carries `base64(hybrid_envelope(...))\n`.
#[tokio::test]
async fn wire_bytes_never_contain_the_plaintext_type_field() {
    let capture = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let capture_port = capture.local_addr().unwrap().port();

    let accept = tokio::spawn(async move {
        let (mut socket, _) = capture.accept().await.unwrap();
        let mut buf = Vec::new();
        let _ = tokio::time::timeout(Duration::from_secs(2), socket.read_to_end(&mut buf)).await;
        buf
    });

    let manager = SecurityManager::generate().unwrap();
    let packet = Packet::new("SECRET_EVENT_TYPE", Content::str("hi")).with_origin("alice");
    let text = encode(&packet).unwrap();
    let envelope = manager.encrypt(&text, manager.public_key()).unwrap();
    let frame = format!("{}\n", base64::engine::general_purpose::STANDARD.encode(&envelope));

    let mut socket = TcpStream::connect(("127.0.0.1", capture_port)).await.unwrap();
    socket.write_all(frame.as_bytes()).await.unwrap();
    socket.shutdown().await.unwrap();

    let bytes = accept.await.unwrap();
    let on_wire = String::from_utf8_lossy(&bytes);
    assert!(!on_wire.contains("SECRET_EVENT_TYPE"), "plaintext type leaked onto the wire");
    assert!(!on_wire.contains('{'), "no JSON structure should be visible, only base64");

    // Confirm the capture really did carry the frame, and that decrypting
    // it recovers the original packet — i.e. the bytes are ciphertext,
    // not garbage.
    let decoded_envelope = base64::engine::general_purpose::STANDARD
        .decode(on_wire.trim_end().as_bytes())
        .unwrap();
    let recovered = manager.decrypt(&decoded_envelope).unwrap();
    assert_eq!(recovered, text);
}
