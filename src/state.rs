//! # State Management Module
//!
//! Questo modulo registra le entry già pubblicate per evitare doppie
//! pubblicazioni quando il tool viene rilanciato nello stesso giorno.
//!
//! ## Responsabilità:
//! - Traccia quali entry sono state pubblicate, quando e con quale id
//! - Persiste lo stato in un file JSON per manifest specifico
//! - Salta entry già pubblicate (a meno di `--force`)
//!
//! ## Strategia di persistence:
//! - Un file JSON per manifest (basato su hash del path del manifest)
//! - Salvataggio in `~/.post-scheduler/posted_posts_<hash>.json`
//! - Chiave di una entry: `post_date|caption`
//! - File corrotti trattati come stato vuoto
//!
//! ## Esempio struttura state file:
//! ```json
//! {
//!   "posted": {
//!     "2026-08-07 10:30:00 +0000|Sunset over the bay": {
//!       "caption": "Sunset over the bay",
//!       "post_date": "2026-08-07 10:30:00 +0000",
//!       "platform": "console",
//!       "platform_post_id": "console-1",
//!       "posted_at": 1786442400
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Record of one published entry
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PostedEntry {
    pub caption: String,
    pub post_date: String,
    pub platform: String,
    pub platform_post_id: String,
    pub posted_at: u64,
}

/// State file tracking published entries for one manifest
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct StateFile {
    pub posted: HashMap<String, PostedEntry>,
}

/// Manages the published-entry state for a manifest
pub struct StateManager {
    state_file_path: PathBuf,
    state: StateFile,
}

impl StateManager {
    /// Create a state manager for a specific manifest file
    pub async fn new(manifest_path: &Path) -> Result<Self> {
        let state_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?
            .join(".post-scheduler");

        Self::open(&state_dir, manifest_path).await
    }

    /// Open the state file for `manifest_path` inside `state_dir`
    pub async fn open(state_dir: &Path, manifest_path: &Path) -> Result<Self> {
        fs::create_dir_all(state_dir).await?;

        // Unique state file per manifest path
        let mut hasher = Sha256::new();
        hasher.update(manifest_path.to_string_lossy().as_bytes());
        let hash = hex::encode(hasher.finalize())[..16].to_string();

        let state_file_path = state_dir.join(format!("posted_posts_{}.json", hash));

        let state = if state_file_path.exists() {
            let content = fs::read_to_string(&state_file_path).await?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            StateFile::default()
        };

        Ok(Self {
            state_file_path,
            state,
        })
    }

    fn entry_key(post_date: &str, caption: &str) -> String {
        format!("{}|{}", post_date, caption)
    }

    /// Save current state to file
    pub async fn save(&self) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.state)?;
        fs::write(&self.state_file_path, content).await?;
        Ok(())
    }

    /// Check if an entry has already been published
    pub fn is_posted(&self, post_date: &str, caption: &str) -> bool {
        self.state
            .posted
            .contains_key(&Self::entry_key(post_date, caption))
    }

    /// Record a published entry
    pub async fn mark_posted(&mut self, posted: PostedEntry) -> Result<()> {
        let key = Self::entry_key(&posted.post_date, &posted.caption);
        self.state.posted.insert(key, posted);
        self.save().await
    }

    /// Number of entries ever published from this manifest
    pub fn posted_count(&self) -> usize {
        self.state.posted.len()
    }
}
