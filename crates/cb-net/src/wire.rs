//! Wire framing: each TCP message is exactly
//! `base64(hybrid_envelope(utf8(packet_text)))` followed by a single
//! newline. There is no length prefix and no multi-frame connection.

use base64::Engine as _;

pub const FRAME_TERMINATOR: u8 = b'\n';

/// Bounds how many bytes the Listener will read before giving up on a
/// single frame; every blocking call in the pipeline uses a bounded
/// timeout, and this is the matching bound on frame size.
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// Encodes an already-encrypted envelope into one newline-terminated
/// frame.
pub fn encode_frame(envelope: &[u8]) -> Vec<u8> {
    let mut out = base64::engine::general_purpose::STANDARD.encode(envelope).into_bytes();
    out.push(FRAME_TERMINATOR);
    out
}

/// Decodes the base64 body of a frame (without its trailing newline) back
/// into envelope bytes.
pub fn decode_frame_body(body: &[u8]) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(body)
}
