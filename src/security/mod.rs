//! At-rest protection of the session token
//!
//! The master key lives in a file next to the database instead of the OS
//! keychain, so no password prompt is needed on start-up.

mod encryption;
mod file_storage;

use crate::error::Result;
use std::path::PathBuf;

pub use encryption::{EncryptionManager, Sealed};

pub struct SecurityManager {
    encryption: EncryptionManager,
}

impl SecurityManager {
    /// Load (or create) the master key under `data_dir`
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        let key = file_storage::KeyFile::new(data_dir).load_or_create()?;
        Ok(Self {
            encryption: EncryptionManager::new(&key)?,
        })
    }

    /// Security manager with a throwaway key
    pub fn ephemeral() -> Result<Self> {
        Ok(Self {
            encryption: EncryptionManager::new(&EncryptionManager::generate_key())?,
        })
    }

    pub fn seal(&self, plaintext: &str) -> Result<Sealed> {
        self.encryption.seal(plaintext)
    }

    pub fn open(&self, sealed: &Sealed) -> Result<String> {
        self.encryption.open(sealed)
    }
}
