//! # Post Manifest Module
//!
//! Questo modulo gestisce il manifest JSON dei post pianificati.
//!
//! ## Responsabilità:
//! - Deserializzazione del manifest (array JSON di post pianificati)
//! - Parsing della data di pubblicazione di ogni entry
//! - Filtro per giorno di calendario nel fuso orario locale
//! - Composizione del testo finale del post (caption + hashtag)
//!
//! ## Formato del manifest:
//! ```json
//! [
//!   {
//!     "caption": "Sunset over the bay",
//!     "image_name": "sunset.jpg",
//!     "post_date": "2026-08-07 10:30:00 +0000",
//!     "hashtags": "#sunset #photography"
//!   }
//! ]
//! ```
//!
//! ## Ciclo di vita di una entry:
//! 1. Deserializzata dal manifest (il campo `image` resta vuoto)
//! 2. Arricchita in place con i byte dell'allegato compresso
//! 3. Consumata dalla chiamata di pubblicazione, poi scartata

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::warn;

use crate::error::SchedulerError;

/// Timestamp format used by `post_date`, e.g. `2026-08-07 10:30:00 +0000`
pub const POST_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// One planned post from the manifest file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEntry {
    pub caption: String,
    pub image_name: String,
    pub post_date: String,
    pub hashtags: String,
    /// Compressed attachment bytes, populated after compression and never
    /// read back from or written to the manifest
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl PostEntry {
    /// Parse the entry's publication timestamp.
    ///
    /// Returns `None` with a warning when the date does not match
    /// [`POST_DATE_FORMAT`]; a malformed date never aborts the run.
    pub fn post_datetime(&self) -> Option<DateTime<FixedOffset>> {
        match DateTime::parse_from_str(&self.post_date, POST_DATE_FORMAT) {
            Ok(datetime) => Some(datetime),
            Err(e) => {
                warn!("Unable to parse post date {:?}: {}", self.post_date, e);
                None
            }
        }
    }

    /// Whether this entry is due on the given local calendar day.
    ///
    /// The publication instant is converted to the local timezone first, so
    /// an entry scheduled late in the evening UTC can land on the following
    /// local day. Entries with unparseable dates are never due.
    pub fn is_scheduled_for(&self, day: NaiveDate) -> bool {
        self.post_datetime()
            .map(|datetime| datetime.with_timezone(&Local).date_naive() == day)
            .unwrap_or(false)
    }

    /// Final status text: caption and hashtags separated by a blank line.
    pub fn status_text(&self) -> String {
        format!("{}\n\n{}", self.caption, self.hashtags)
    }

    /// Length of the status text in Unicode scalar values.
    pub fn status_char_count(&self) -> usize {
        self.status_text().chars().count()
    }
}

/// Load and deserialize a manifest file.
pub async fn load_manifest(path: &Path) -> Result<Vec<PostEntry>> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read manifest {}: {}", path.display(), e))?;

    let entries: Vec<PostEntry> = serde_json::from_str(&content).map_err(|e| {
        SchedulerError::Manifest(format!("Failed to parse manifest {}: {}", path.display(), e))
    })?;

    Ok(entries)
}
