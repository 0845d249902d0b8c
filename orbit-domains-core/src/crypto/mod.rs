//! Credential sealing.
//!
//! Secrets are sealed with AES-256-GCM under a key derived from the
//! configured master key via PBKDF2-HMAC-SHA256. Every seal uses a fresh
//! random salt and nonce, so sealing the same plaintext twice yields
//! different ciphertext.
//!
//! Wire format: `base64(salt):base64(nonce):base64(ciphertext)`.

use std::collections::HashMap;

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use pbkdf2::pbkdf2_hmac_array;
use rand::RngCore;
use sha2::Sha256;

use crate::error::{CoreError, CoreResult};

const PBKDF2_ITERATIONS: u32 = 600_000;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Seals and opens credential secrets under a master key.
pub struct CredentialCipher {
    master_key: String,
}

impl CredentialCipher {
    /// Create a cipher bound to the given master key.
    #[must_use]
    pub fn new(master_key: impl Into<String>) -> Self {
        Self {
            master_key: master_key.into(),
        }
    }

    /// Seal a plaintext secret.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CredentialError`] if encryption fails.
    pub fn seal(&self, plaintext: &str) -> CoreResult<String> {
        let mut salt = [0u8; SALT_LEN];
        rand::rng().fill_bytes(&mut salt);
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::rng().fill_bytes(&mut nonce_bytes);

        let key = self.derive_key(&salt);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::CredentialError(format!("cipher init failed: {e}")))?;
        let nonce = Nonce::from_slice(&nonce_bytes);
        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CoreError::CredentialError(format!("encryption failed: {e}")))?;

        Ok(format!(
            "{}:{}:{}",
            BASE64.encode(salt),
            BASE64.encode(nonce_bytes),
            BASE64.encode(ciphertext)
        ))
    }

    /// Open a sealed secret back into plaintext.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CredentialError`] if the payload is malformed,
    /// tampered with, or sealed under a different master key.
    pub fn open(&self, sealed: &str) -> CoreResult<String> {
        let mut parts = sealed.splitn(3, ':');
        let (Some(salt_b64), Some(nonce_b64), Some(ct_b64)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(CoreError::CredentialError(
                "malformed sealed payload".to_string(),
            ));
        };

        let salt = BASE64
            .decode(salt_b64)
            .map_err(|e| CoreError::CredentialError(format!("invalid salt encoding: {e}")))?;
        let nonce_bytes = BASE64
            .decode(nonce_b64)
            .map_err(|e| CoreError::CredentialError(format!("invalid nonce encoding: {e}")))?;
        let ciphertext = BASE64
            .decode(ct_b64)
            .map_err(|e| CoreError::CredentialError(format!("invalid ciphertext encoding: {e}")))?;

        if salt.len() != SALT_LEN || nonce_bytes.len() != NONCE_LEN {
            return Err(CoreError::CredentialError(
                "malformed sealed payload".to_string(),
            ));
        }

        let key = self.derive_key(&salt);
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::CredentialError(format!("cipher init failed: {e}")))?;
        let nonce = Nonce::from_slice(&nonce_bytes);
        let plaintext = cipher
            .decrypt(nonce, ciphertext.as_ref())
            .map_err(|_| CoreError::CredentialError("decryption failed".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| CoreError::CredentialError(format!("invalid utf-8 plaintext: {e}")))
    }

    /// Seal every value of a secrets map, keys untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CredentialError`] if any value fails to seal.
    pub fn seal_map(&self, secrets: &HashMap<String, String>) -> CoreResult<HashMap<String, String>> {
        secrets
            .iter()
            .map(|(k, v)| Ok((k.clone(), self.seal(v)?)))
            .collect()
    }

    /// Open every value of a sealed secrets map, keys untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CredentialError`] if any value fails to open.
    pub fn open_map(&self, sealed: &HashMap<String, String>) -> CoreResult<HashMap<String, String>> {
        sealed
            .iter()
            .map(|(k, v)| Ok((k.clone(), self.open(v)?)))
            .collect()
    }

    fn derive_key(&self, salt: &[u8]) -> [u8; KEY_LEN] {
        pbkdf2_hmac_array::<Sha256, KEY_LEN>(self.master_key.as_bytes(), salt, PBKDF2_ITERATIONS)
    }
}

impl std::fmt::Debug for CredentialCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCipher").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_round_trip() {
        let cipher = CredentialCipher::new("master-key");
        let sealed = cipher.seal("super-secret-token").unwrap();
        assert_ne!(sealed, "super-secret-token");
        assert_eq!(cipher.open(&sealed).unwrap(), "super-secret-token");
    }

    #[test]
    fn sealing_twice_differs() {
        let cipher = CredentialCipher::new("master-key");
        let a = cipher.seal("same input").unwrap();
        let b = cipher.seal("same input").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = CredentialCipher::new("key-a").seal("secret").unwrap();
        let result = CredentialCipher::new("key-b").open(&sealed);
        assert!(matches!(result, Err(CoreError::CredentialError(_))));
    }

    #[test]
    fn tampered_payload_fails_to_open() {
        let cipher = CredentialCipher::new("master-key");
        let sealed = cipher.seal("secret").unwrap();
        let mut tampered = sealed.clone();
        tampered.pop();
        tampered.push('A');
        assert!(cipher.open(&tampered).is_err());
    }

    #[test]
    fn malformed_payload_rejected() {
        let cipher = CredentialCipher::new("master-key");
        assert!(cipher.open("not-a-sealed-payload").is_err());
        assert!(cipher.open("a:b").is_err());
    }

    #[test]
    fn map_round_trip() {
        let cipher = CredentialCipher::new("master-key");
        let secrets: HashMap<String, String> = [
            ("apiKey".to_string(), "k".to_string()),
            ("apiSecret".to_string(), "s".to_string()),
        ]
        .into();

        let sealed = cipher.seal_map(&secrets).unwrap();
        assert_ne!(sealed.get("apiKey"), secrets.get("apiKey"));
        assert_eq!(cipher.open_map(&sealed).unwrap(), secrets);
    }
}
