use chatbus::SecurityManager;

#[test]
fn hello_round_trips_through_the_hybrid_envelope() {
    let manager = SecurityManager::generate().unwrap();
    let ciphertext = manager.encrypt("hello", manager.public_key()).unwrap();
    assert_eq!(manager.decrypt(&ciphertext).unwrap(), "hello");
}

#[test]
fn ciphertext_carries_the_separator() {
    let manager = SecurityManager::generate().unwrap();
    let ciphertext = manager.encrypt("hello", manager.public_key()).unwrap();
    let text = String::from_utf8_lossy(&ciphertext);
    assert!(text.contains(":::"));
}

#[test]
fn round_trip_holds_for_arbitrary_sizes() {
    let manager = SecurityManager::generate().unwrap();
    for size in [0, 1, 190, 191, 10_000] {
        let message = "m".repeat(size);
        let ciphertext = manager.encrypt(&message, manager.public_key()).unwrap();
        assert_eq!(manager.decrypt(&ciphertext).unwrap(), message);
    }
}
