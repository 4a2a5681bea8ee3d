use thiserror::Error;

/// Error kinds raised by the pipeline stages in this crate. All
/// are contained at the stage that raises them — none propagate into
/// application code.
#[derive(Debug, Error)]
pub enum NetError {
    #[error("network unavailable: {0}")]
    NetworkUnavailable(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] cb_protocol::ProtocolError),
    #[error(transparent)]
    Crypto(#[from] cb_crypto::CryptoError),
}

pub type NetResult<T> = Result<T, NetError>;
