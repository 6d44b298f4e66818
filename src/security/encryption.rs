//! AES-256-GCM sealing of short secrets

use crate::error::{AppError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::RngCore;

const NONCE_SIZE: usize = 12;
pub const KEY_SIZE: usize = 32;

/// Ciphertext and nonce, both base64, as stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub ciphertext: String,
    pub nonce: String,
}

pub struct EncryptionManager {
    cipher: Aes256Gcm,
}

impl EncryptionManager {
    pub fn new(key: &[u8]) -> Result<Self> {
        if key.len() != KEY_SIZE {
            return Err(AppError::Encryption(format!(
                "Invalid key size: expected {}, got {}",
                KEY_SIZE,
                key.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| AppError::Encryption(e.to_string()))?;
        Ok(Self { cipher })
    }

    pub fn generate_key() -> Vec<u8> {
        let mut key = vec![0u8; KEY_SIZE];
        OsRng.fill_bytes(&mut key);
        key
    }

    /// Encrypt under a fresh random nonce
    pub fn seal(&self, plaintext: &str) -> Result<Sealed> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|e| AppError::Encryption(e.to_string()))?;

        Ok(Sealed {
            ciphertext: STANDARD.encode(ciphertext),
            nonce: STANDARD.encode(nonce),
        })
    }

    pub fn open(&self, sealed: &Sealed) -> Result<String> {
        let ciphertext = STANDARD
            .decode(&sealed.ciphertext)
            .map_err(|e| AppError::Encryption(format!("Invalid ciphertext base64: {}", e)))?;
        let nonce = STANDARD
            .decode(&sealed.nonce)
            .map_err(|e| AppError::Encryption(format!("Invalid nonce base64: {}", e)))?;

        if nonce.len() != NONCE_SIZE {
            return Err(AppError::Encryption(format!(
                "Invalid nonce size: expected {}, got {}",
                NONCE_SIZE,
                nonce.len()
            )));
        }

        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&nonce), ciphertext.as_ref())
            .map_err(|e| AppError::Encryption(format!("Decryption failed: {}", e)))?;

        String::from_utf8(plaintext).map_err(|e| AppError::Encryption(format!("Invalid UTF-8 in plaintext: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> EncryptionManager {
        EncryptionManager::new(&EncryptionManager::generate_key()).unwrap()
    }

    #[test]
    fn test_seal_then_open() {
        let manager = manager();
        let sealed = manager.seal("eyJhbGciOiJIUzI1NiJ9.payload.sig").unwrap();
        assert_eq!(manager.open(&sealed).unwrap(), "eyJhbGciOiJIUzI1NiJ9.payload.sig");
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let manager = manager();
        let a = manager.seal("same token").unwrap();
        let b = manager.seal("same token").unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_wrong_key_or_nonce_fails() {
        let sealed = manager().seal("secret").unwrap();
        assert!(manager().open(&sealed).is_err());

        let manager = manager();
        let mut sealed = manager.seal("secret").unwrap();
        sealed.nonce = manager.seal("other").unwrap().nonce;
        assert!(manager.open(&sealed).is_err());
    }

    #[test]
    fn test_rejects_short_key() {
        assert!(EncryptionManager::new(&[0u8; 16]).is_err());
    }
}
