//! Credential sealing for stored camera passwords.
//!
//! Camera connection credentials have to be recoverable because they are
//! replayed to the device on every connect, so hashing is not an option.
//! Secrets are sealed with AES-256-GCM under a key derived from a configured
//! master secret and stored as `base64(nonce || ciphertext)`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Length of the AES-GCM nonce prefix in a sealed envelope.
const NONCE_LEN: usize = 12;

/// Errors produced when sealing or opening credentials.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Master secret must not be empty")]
    InvalidKey,

    #[error("Malformed sealed secret: {0}")]
    Malformed(String),

    #[error("Failed to seal or open secret")]
    Crypto,
}

/// Seals and opens camera credentials with AES-256-GCM.
///
/// The 256-bit key is derived as the SHA-256 digest of the configured master
/// secret. Every seal uses a fresh random nonce, so sealing the same
/// plaintext twice yields different envelopes.
#[derive(Clone)]
pub struct SecretCipher {
    cipher: Aes256Gcm,
}

impl SecretCipher {
    /// Creates a cipher from the configured master secret.
    pub fn new(master_secret: &str) -> Result<Self, SecretError> {
        if master_secret.is_empty() {
            return Err(SecretError::InvalidKey);
        }

        let digest = Sha256::digest(master_secret.as_bytes());
        let key = Key::<Aes256Gcm>::from_slice(&digest);

        Ok(Self {
            cipher: Aes256Gcm::new(key),
        })
    }

    /// Seals a plaintext credential into `base64(nonce || ciphertext)`.
    pub fn seal(&self, plaintext: &str) -> Result<String, SecretError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| SecretError::Crypto)?;

        let mut envelope = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        envelope.extend_from_slice(&nonce_bytes);
        envelope.extend_from_slice(&ciphertext);

        Ok(STANDARD.encode(envelope))
    }

    /// Opens a sealed credential produced by [`seal`](Self::seal).
    ///
    /// Truncated or tampered envelopes yield an error, never a panic.
    pub fn open(&self, sealed: &str) -> Result<String, SecretError> {
        let envelope = STANDARD
            .decode(sealed)
            .map_err(|e| SecretError::Malformed(e.to_string()))?;

        if envelope.len() <= NONCE_LEN {
            return Err(SecretError::Malformed("envelope too short".to_string()));
        }

        let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let plaintext = self
            .cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| SecretError::Crypto)?;

        String::from_utf8(plaintext).map_err(|e| SecretError::Malformed(e.to_string()))
    }
}
