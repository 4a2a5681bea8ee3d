use thiserror::Error;

/// Failures raised while decoding or validating a [`crate::Packet`].
///
/// Recovery is always the same: drop the offending bytes/packet and log.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed packet text: {0}")]
    BadPacket(String),
    #[error("packet type must not be empty")]
    EmptyType,
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
