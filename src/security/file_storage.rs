//! Master key file
//!
//! The key is generated on first use and kept base64-encoded in the data
//! directory, readable by the owner only on Unix.

use crate::error::{AppError, Result};
use crate::security::encryption::{EncryptionManager, KEY_SIZE};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::fs;
use std::path::PathBuf;

const KEY_FILE: &str = "master.key";

pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join(KEY_FILE),
        }
    }

    pub fn load_or_create(&self) -> Result<Vec<u8>> {
        if self.path.exists() {
            return self.load();
        }

        let key = EncryptionManager::generate_key();

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::Config(format!("Failed to create data dir: {}", e)))?;
        }
        fs::write(&self.path, STANDARD.encode(&key))
            .map_err(|e| AppError::Config(format!("Failed to write key file: {}", e)))?;
        restrict_permissions(&self.path)?;

        tracing::info!("Created master key at {}", self.path.display());
        Ok(key)
    }

    fn load(&self) -> Result<Vec<u8>> {
        let encoded = fs::read_to_string(&self.path)
            .map_err(|e| AppError::Config(format!("Failed to read key file: {}", e)))?;
        let key = STANDARD
            .decode(encoded.trim())
            .map_err(|e| AppError::Config(format!("Corrupt key file: {}", e)))?;

        if key.len() != KEY_SIZE {
            return Err(AppError::Config(format!(
                "Corrupt key file: expected {} bytes, got {}",
                KEY_SIZE,
                key.len()
            )));
        }
        Ok(key)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}
