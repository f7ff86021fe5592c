//! # Social Post Scheduler Library
//!
//! Questo è il modulo principale della libreria che espone le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `manifest`: Manifest JSON dei post pianificati e filtro per data
//! - `compressor`: Compressione iterativa dell'allegato JPEG
//! - `media`: Lookup e decodifica delle immagini referenziate
//! - `platform`: Astrazione della piattaforma di pubblicazione
//! - `state`: Tracking entry pubblicate e persistenza stato
//! - `scheduler`: Orchestratore principale del processo
//! - `progress`: Progress tracking e statistiche

pub mod compressor;
pub mod config;
pub mod error;
pub mod manifest;
pub mod media;
pub mod platform;
pub mod progress;
pub mod scheduler;
pub mod state;

pub use compressor::{ImageCompressor, JpegCodec, JpegEncode};
pub use config::Config;
pub use error::{PostError, SchedulerError};
pub use manifest::PostEntry;
pub use platform::{ConsolePlatform, MockPlatform, SocialPlatform};
pub use scheduler::PostScheduler;
pub use state::{PostedEntry, StateFile};
