//! # Image Lookup Module
//!
//! Questo modulo localizza e decodifica le immagini referenziate dal
//! manifest.
//!
//! ## Responsabilità:
//! - Listing della directory immagini e match esatto sul nome file
//! - Lettura dei byte e decodifica in bitmap
//! - Ogni fallimento a monte (directory illeggibile, file mancante,
//!   formato corrotto) si risolve in "bitmap assente", mai in un errore
//!   propagato al compressore

use image::DynamicImage;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// Flat directory holding the images referenced by manifest entries
pub struct ImageDirectory {
    root: PathBuf,
}

impl ImageDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Find the directory entry whose file name matches `image_name` exactly.
    ///
    /// Mirrors a manual directory scan: an unreadable directory, an empty
    /// directory, or a missing match all yield `None` with a warning.
    pub async fn locate(&self, image_name: &str) -> Option<PathBuf> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Unable to read image directory {}: {}",
                    self.root.display(),
                    e
                );
                return None;
            }
        };

        let mut saw_any = false;
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    saw_any = true;
                    if entry.file_name().to_string_lossy() == image_name {
                        return Some(entry.path());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!(
                        "Error while scanning image directory {}: {}",
                        self.root.display(),
                        e
                    );
                    return None;
                }
            }
        }

        if !saw_any {
            warn!("No image found in directory {}", self.root.display());
        } else {
            warn!(
                "Unable to find an image matching {:?} in {}",
                image_name,
                self.root.display()
            );
        }
        None
    }

    /// Locate, read and decode the named image.
    ///
    /// # Returns
    /// * `Some(bitmap)` - The decoded image
    /// * `None` - The file could not be located, read or decoded
    pub async fn load_bitmap(&self, image_name: &str) -> Option<DynamicImage> {
        let path = self.locate(image_name).await?;

        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read image {}: {}", path.display(), e);
                return None;
            }
        };

        match image::load_from_memory(&bytes) {
            Ok(bitmap) => {
                debug!(
                    "Decoded {} ({} bytes, {}x{})",
                    path.display(),
                    bytes.len(),
                    bitmap.width(),
                    bitmap.height()
                );
                Some(bitmap)
            }
            Err(e) => {
                warn!("Failed to decode image {}: {}", path.display(), e);
                None
            }
        }
    }
}
