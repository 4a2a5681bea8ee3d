use crate::error::{CryptoError, CryptoResult};
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};

/// The three-byte literal separator between the asymmetrically wrapped
/// symmetric key and the symmetric ciphertext. Implementations
/// MUST split only on the first occurrence.
pub const SEPARATOR: &[u8] = b":::";

/// Plaintext byte ceiling for raw RSA-OAEP encryption with a 2048-bit key
/// and SHA-256.
pub const RAW_ASYM_MAX_PLAINTEXT: usize = 190;

const RSA_KEY_BITS: usize = 2048;
const AES_KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

fn oaep() -> Oaep {
    Oaep::new::<Sha256>()
}

/// Holds one node's asymmetric key pair and performs the hybrid envelope
/// operations. Read-only after construction except for its
/// own (immutable) private key, so `encrypt`/`decrypt` are safe to call
/// concurrently from multiple tasks.
pub struct SecurityManager {
    private_key: RsaPrivateKey,
    public_key: RsaPublicKey,
}

impl SecurityManager {
    /// Generates a fresh 2048-bit key pair.
    pub fn generate() -> CryptoResult<Self> {
        let private_key = RsaPrivateKey::new(&mut OsRng, RSA_KEY_BITS)
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))?;
        let public_key = RsaPublicKey::from(&private_key);
        Ok(Self {
            private_key,
            public_key,
        })
    }

    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    /// Canonical textual encoding (PKCS#8 PEM) of this node's public key.
    pub fn public_key_bytes(&self) -> CryptoResult<Vec<u8>> {
        let pem = self
            .public_key
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))?;
        Ok(pem.into_bytes())
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    pub fn private_key_pem(&self) -> CryptoResult<String> {
        self.private_key
            .to_pkcs8_pem(LineEnding::LF)
            .map(|s| s.to_string())
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))
    }

    pub fn from_private_key_pem(pem: &str) -> CryptoResult<Self> {
        let private_key = RsaPrivateKey::from_pkcs8_pem(pem)
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))?;
        Ok(Self::from_private_key(private_key))
    }

    /// Parses a peer's public key from its canonical PEM encoding.
    /// Fails with `BadKeyMaterial` if parsing fails.
    pub fn import_public(bytes: &[u8]) -> CryptoResult<RsaPublicKey> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))?;
        RsaPublicKey::from_public_key_pem(text)
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))
    }

    /// The hybrid envelope: a fresh symmetric key encrypts `message`, and
    /// the symmetric key is wrapped under `recipient_public_key` with
    /// OAEP/MGF1-SHA256. Output is `K' ‖ SEPARATOR ‖ C`.
    pub fn encrypt(&self, message: &str, recipient_public_key: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
        let mut key_bytes = [0u8; AES_KEY_LEN];
        rand::RngCore::fill_bytes(&mut OsRng, &mut key_bytes);
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        let cipher = Aes256Gcm::new(key);

        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut OsRng, &mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, message.as_bytes())
            .map_err(|_| CryptoError::DecryptFailed)?;

        let wrapped_key = recipient_public_key
            .encrypt(&mut OsRng, oaep(), &key_bytes)
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))?;

        let mut envelope = Vec::with_capacity(wrapped_key.len() + SEPARATOR.len() + NONCE_LEN + ciphertext.len());
        envelope.extend_from_slice(&wrapped_key);
        envelope.extend_from_slice(SEPARATOR);
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);
        Ok(envelope)
    }

    /// Unwraps a hybrid envelope. The wrapped key has a fixed length (the
    /// RSA modulus size), so the split point is known up front rather
    /// than found by scanning for `:::` — that string could appear by
    /// chance inside the near-random wrapped-key bytes and corrupt the
    /// split if it were used to locate the boundary.
    pub fn decrypt(&self, envelope: &[u8]) -> CryptoResult<String> {
        let key_len = self.private_key.size();
        if envelope.len() < key_len + SEPARATOR.len() {
            return Err(CryptoError::DecryptFailed);
        }
        let (wrapped_key, rest) = envelope.split_at(key_len);
        if &rest[..SEPARATOR.len()] != SEPARATOR {
            return Err(CryptoError::DecryptFailed);
        }
        let c = &rest[SEPARATOR.len()..];
        if c.len() < NONCE_LEN {
            return Err(CryptoError::DecryptFailed);
        }
        let (nonce_bytes, ciphertext) = c.split_at(NONCE_LEN);

        let key_bytes = self
            .private_key
            .decrypt(oaep(), wrapped_key)
            .map_err(|_| CryptoError::DecryptFailed)?;
        if key_bytes.len() != AES_KEY_LEN {
            return Err(CryptoError::DecryptFailed);
        }
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        let cipher = Aes256Gcm::new(key);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| CryptoError::DecryptFailed)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptFailed)
    }

    /// Raw asymmetric encryption, used only as a fallback for plaintext
    /// small enough to fit directly under OAEP. Never used
    /// when the hybrid envelope is available and succeeds.
    pub fn encrypt_raw(&self, message: &str, recipient_public_key: &RsaPublicKey) -> CryptoResult<Vec<u8>> {
        let bytes = message.as_bytes();
        if bytes.len() >= RAW_ASYM_MAX_PLAINTEXT {
            return Err(CryptoError::EncryptOversize);
        }
        recipient_public_key
            .encrypt(&mut OsRng, oaep(), bytes)
            .map_err(|e| CryptoError::BadKeyMaterial(e.to_string()))
    }

    /// Raw asymmetric decryption, the Listener's recovery path when a peer
    /// skipped the symmetric wrap for a very small message.
    pub fn decrypt_raw(&self, payload: &[u8]) -> CryptoResult<String> {
        let plaintext = self
            .private_key
            .decrypt(oaep(), payload)
            .map_err(|_| CryptoError::DecryptFailed)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::DecryptFailed)
    }

    /// SHA-256 hex digest of the UTF-8 password bytes.
    pub fn hash_password(password: &str) -> String {
        let digest = Sha256::digest(password.as_bytes());
        hex::encode(digest)
    }
}

#[cfg(test)]
fn find_first_separator(haystack: &[u8]) -> Option<usize> {
    haystack.windows(SEPARATOR.len()).position(|w| w == SEPARATOR)
}
