use crate::error::{ProtocolError, ProtocolResult};
use crate::packet::Packet;

/// Serializes a packet to its textual interchange form.
///
/// The caller never sees partially populated packets: this can only fail
/// if `packet_type` is empty, which is an invariant violation upstream.
pub fn encode(packet: &Packet) -> ProtocolResult<String> {
    if packet.packet_type.is_empty() {
        return Err(ProtocolError::EmptyType);
    }
    serde_json::to_string(packet).map_err(|e| ProtocolError::BadPacket(e.to_string()))
}

/// Parses a packet from its textual interchange form. Fails with
/// `BadPacket` on malformed input or a missing/empty `type` field.
pub fn decode(text: &str) -> ProtocolResult<Packet> {
    let packet: Packet =
        serde_json::from_str(text).map_err(|e| ProtocolError::BadPacket(e.to_string()))?;
    if packet.packet_type.is_empty() {
        return Err(ProtocolError::EmptyType);
    }
    Ok(packet)
}
