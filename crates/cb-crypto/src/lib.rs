//! Hybrid encryption envelope for the chatbus messaging fabric.
//!
//! A [`SecurityManager`] holds one node's RSA-2048 key pair and wraps a
//! fresh AES-256-GCM key per message under the recipient's public key with
//! OAEP/MGF1-SHA256 padding, guaranteeing ciphertext-only on the wire.

mod error;
pub mod keyfile;
mod security_manager;

pub use error::{CryptoError, CryptoResult};
pub use security_manager::{SecurityManager, RAW_ASYM_MAX_PLAINTEXT, SEPARATOR};

pub use rsa::{RsaPrivateKey, RsaPublicKey};
