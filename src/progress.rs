//! # Progress Tracking and Statistics Module
//!
//! Questo modulo gestisce il progress tracking e le statistiche di
//! pubblicazione.
//!
//! ## Responsabilità:
//! - Progress bar visual con `indicatif` per feedback real-time
//! - Tracking statistiche del run (entry viste, pubblicate, saltate, errori)
//! - Riga di riepilogo finale
//!
//! ## Visual feedback:
//! ```text
//! ⠋ [00:00:04] [========================>---------------] 3/5 (60%) ✅ sunset.jpg: posted (console-3)
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Manages progress reporting for a posting run
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
}

impl ProgressManager {
    /// Create a new progress manager
    pub fn new(total_entries: u64) -> Self {
        let bar = ProgressBar::new(total_entries);

        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
                .unwrap()
                .progress_chars("=>-"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Update progress with a message
    pub fn update(&self, message: &str) {
        self.bar.inc(1);
        self.bar.set_message(message.to_string());
    }

    /// Set a custom message without incrementing
    pub fn set_message(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Statistics tracker for one posting run
#[derive(Debug, Default)]
pub struct PostingStats {
    pub entries_seen: usize,
    pub posted: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl PostingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_posted(&mut self) {
        self.entries_seen += 1;
        self.posted += 1;
    }

    pub fn add_skipped(&mut self) {
        self.entries_seen += 1;
        self.skipped += 1;
    }

    pub fn add_error(&mut self) {
        self.entries_seen += 1;
        self.errors += 1;
    }

    pub fn format_summary(&self) -> String {
        format!(
            "Seen: {} entries | Posted: {} | Skipped: {} | Errors: {}",
            self.entries_seen, self.posted, self.skipped, self.errors
        )
    }
}
