//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore dell'applicazione.
//!
//! ## Responsabilità:
//! - `SchedulerError`: errori della pipeline (manifest, stato, validazione)
//! - `PostError`: errori della piattaforma di pubblicazione, con
//!   distinzione transitorio/permanente per la logica di retry
//! - Conversione automatica da errori standard tramite `thiserror`
//!
//! ## Classificazione retry:
//! - Transitori (ritentare): `Network`, `RateLimit`
//! - Permanenti (non ritentare): `Validation`, `Posting`

/// Custom error types for the posting pipeline
#[derive(thiserror::Error, Debug)]
pub enum SchedulerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("State file error: {0}")]
    State(String),

    #[error("Platform error: {0}")]
    Platform(#[from] PostError),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors reported by a posting platform
#[derive(thiserror::Error, Debug)]
pub enum PostError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited: {0}")]
    RateLimit(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),
}

impl PostError {
    /// Whether the error is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, PostError::Network(_) | PostError::RateLimit(_))
    }
}
