//! # Image Compression Module
//!
//! Questo modulo produce l'allegato JPEG di un post garantendo che non superi
//! il tetto massimo di byte accettato dalla piattaforma.
//!
//! ## Responsabilità:
//! - Re-encoding JPEG in-memory con fattore di qualità decrescente
//! - Garantire `len(output) <= max_bytes` quando il tetto è raggiungibile
//! - Nessun errore propagato: ogni fallimento si risolve in un valore
//!
//! ## Strategia di riduzione:
//! 1. Encode a qualità massima (1.0); se già sotto il tetto, ritorna subito
//! 2. Loop di riduzione: qualità 0.8, poi ×0.7 ad ogni passo successivo
//! 3. Stop quando: dimensione ≤ tetto, encode fallito, o qualità ≤ 0.5
//! 4. Mantiene sempre l'ultimo buffer valido, anche se ancora sopra il tetto
//!
//! ## Esempio:
//! ```no_run
//! use social_post_scheduler::compressor::ImageCompressor;
//!
//! let bitmap = image::open("photo.png").ok();
//! let compressor = ImageCompressor::new(4 * 1024 * 1024);
//! let compressed = compressor.compress(bitmap.as_ref());
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

/// Default attachment ceiling: 4 MiB
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 4 * 1024 * 1024;

const INITIAL_QUALITY: f32 = 1.0;
const REDUCTION_START_QUALITY: f32 = 0.8;
const REDUCTION_STEP: f32 = 0.7;
const QUALITY_FLOOR: f32 = 0.5;

/// Narrow codec capability used by the compressor.
///
/// `quality` is a factor in [0.0, 1.0] with JPEG semantics: 1.0 is the
/// largest/most faithful encoding, 0.0 the smallest. Implementations return
/// `None` when no encoding can be produced; they never panic or propagate
/// errors.
pub trait JpegEncode: Send + Sync {
    fn encode(&self, bitmap: &DynamicImage, quality: f32) -> Option<Vec<u8>>;
}

/// Production encoder backed by the `image` crate.
///
/// The quality factor is mapped to the crate's 1-100 scale at this edge;
/// the bitmap is flattened to RGB8 first since JPEG carries no alpha.
pub struct JpegCodec;

impl JpegEncode for JpegCodec {
    fn encode(&self, bitmap: &DynamicImage, quality: f32) -> Option<Vec<u8>> {
        let scaled = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
        let rgb = bitmap.to_rgb8();

        let mut cursor = Cursor::new(Vec::new());
        let mut encoder = JpegEncoder::new_with_quality(&mut cursor, scaled);

        match encoder.encode_image(&rgb) {
            Ok(()) => Some(cursor.into_inner()),
            Err(e) => {
                warn!("JPEG encode failed at quality {:.2}: {}", quality, e);
                None
            }
        }
    }
}

/// Compresses a decoded bitmap under a byte ceiling by iterative re-encoding.
pub struct ImageCompressor {
    encoder: Arc<dyn JpegEncode>,
    max_bytes: u64,
}

impl ImageCompressor {
    /// Create a compressor with the given byte ceiling and the real JPEG codec.
    pub fn new(max_bytes: u64) -> Self {
        Self::with_encoder(Arc::new(JpegCodec), max_bytes)
    }

    /// Create a compressor with a custom encoder.
    ///
    /// The codec sits behind [`JpegEncode`] so the reduction loop can be
    /// exercised without real image machinery.
    pub fn with_encoder(encoder: Arc<dyn JpegEncode>, max_bytes: u64) -> Self {
        Self { encoder, max_bytes }
    }

    /// Produce an encoded buffer at or under the configured ceiling.
    ///
    /// Encodes at quality 1.0 first and returns that buffer unchanged when it
    /// already fits. Otherwise re-encodes at 0.8, compounding by ×0.7 per
    /// step, until the result fits or the working quality drops to ≤ 0.5.
    /// The most recent successful encoding always replaces the previous one;
    /// earlier buffers are never revisited.
    ///
    /// # Arguments
    /// * `bitmap` - The decoded source image, or `None` when loading failed upstream
    ///
    /// # Returns
    /// * `Some(bytes)` - The best attempt; may exceed the ceiling when the
    ///   quality floor was reached or a later re-encode failed
    /// * `None` - No bitmap was supplied, or the very first encode failed
    pub fn compress(&self, bitmap: Option<&DynamicImage>) -> Option<Vec<u8>> {
        let bitmap = match bitmap {
            Some(bitmap) => bitmap,
            None => {
                warn!("No bitmap to compress");
                return None;
            }
        };

        let mut best = match self.encoder.encode(bitmap, INITIAL_QUALITY) {
            Some(data) => data,
            None => {
                warn!("Initial encode produced no data");
                return None;
            }
        };

        if best.len() as u64 <= self.max_bytes {
            debug!(
                "Encoded {} bytes at full quality, under the {} byte ceiling",
                best.len(),
                self.max_bytes
            );
            return Some(best);
        }

        let mut quality = REDUCTION_START_QUALITY;
        loop {
            match self.encoder.encode(bitmap, quality) {
                Some(data) => best = data,
                None => {
                    // Partial success: keep the previous attempt.
                    warn!(
                        "Re-encode failed at quality {:.2}, keeping the last {} byte attempt",
                        quality,
                        best.len()
                    );
                    return Some(best);
                }
            }

            if best.len() as u64 <= self.max_bytes {
                debug!(
                    "Compressed to {} bytes at quality {:.2}",
                    best.len(),
                    quality
                );
                return Some(best);
            }

            quality *= REDUCTION_STEP;
            if quality <= QUALITY_FLOOR {
                warn!(
                    "Quality floor reached, returning {} bytes over the {} byte ceiling",
                    best.len(),
                    self.max_bytes
                );
                return Some(best);
            }
        }
    }
}
