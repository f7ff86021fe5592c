//! # Configuration Management Module
//!
//! Questo modulo gestisce la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con i parametri di pubblicazione
//! - Validazione dei parametri di input
//! - Caricamento/salvataggio configurazione da/verso file JSON
//! - Valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `max_image_bytes`: Tetto massimo dell'allegato in byte (default: 4 MiB)
//! - `max_status_chars`: Limite caratteri del testo del post (default: 280)
//! - `dry_run`: Simulazione senza pubblicare (default: false)
//! - `force_repost`: Ripubblica entry già registrate come pubblicate
//!   (default: false)
//!
//! ## Esempio:
//! ```rust
//! use social_post_scheduler::Config;
//!
//! let config = Config {
//!     max_status_chars: 500,
//!     ..Default::default()
//! };
//! config.validate().unwrap();
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::compressor::DEFAULT_MAX_IMAGE_BYTES;

/// Default status length ceiling in characters
pub const DEFAULT_MAX_STATUS_CHARS: usize = 280;

/// Configuration for scheduled posting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum attachment size in bytes
    pub max_image_bytes: u64,
    /// Maximum status length in characters (caption + hashtags)
    pub max_status_chars: usize,
    /// Dry run - resolve and compress everything without posting
    pub dry_run: bool,
    /// Repost entries already recorded as posted
    pub force_repost: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            max_status_chars: DEFAULT_MAX_STATUS_CHARS,
            dry_run: false,
            force_repost: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.max_image_bytes == 0 {
            return Err(anyhow::anyhow!("Attachment size ceiling must be greater than 0"));
        }

        if self.max_status_chars == 0 {
            return Err(anyhow::anyhow!("Status character limit must be greater than 0"));
        }

        Ok(())
    }

    /// Load configuration from file
    pub async fn from_file(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}
