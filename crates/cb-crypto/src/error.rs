use thiserror::Error;

/// Error kinds for the hybrid envelope. Every variant's recovery
/// is "drop the operation/packet and log" — none of these propagate past
/// the pipeline stage that raises them.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("invalid public key material: {0}")]
    BadKeyMaterial(String),
    #[error("envelope decrypt failed")]
    DecryptFailed,
    #[error("plaintext exceeds raw-asymmetric limit and hybrid path is unavailable")]
    EncryptOversize,
    #[error("key file I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
