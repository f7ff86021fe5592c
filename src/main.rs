//! # Social Post Scheduler - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Validazione degli input dell'utente
//! - Creazione della configurazione e avvio dello scheduler
//!
//! ## Flusso di esecuzione:
//! 1. Parsa gli argomenti CLI (manifest, directory immagini, limiti, etc.)
//! 2. Configura il logging (INFO o DEBUG a seconda del flag verbose)
//! 3. Valida che manifest e directory immagini esistano
//! 4. Crea un oggetto Config con tutti i parametri
//! 5. Istanzia PostScheduler e pubblica le entry dovute oggi
//!
//! ## Esempio di utilizzo:
//! ```bash
//! post-scheduler posts.json ./images --max-chars 280 --dry-run --verbose
//! ```

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use social_post_scheduler::{Config, ConsolePlatform, PostScheduler};

#[derive(Parser)]
#[command(name = "post-scheduler")]
#[command(about = "Post scheduled social media updates with size-compressed images")]
struct Args {
    /// JSON manifest of planned posts
    manifest: PathBuf,

    /// Directory containing the images referenced by the manifest
    image_directory: PathBuf,

    /// Maximum attachment size in bytes
    #[arg(long, default_value = "4194304")]
    max_image_bytes: u64,

    /// Maximum status length in characters (caption + hashtags)
    #[arg(long, default_value = "280")]
    max_chars: usize,

    /// Post entries scheduled for this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Dry run - resolve and compress everything without posting
    #[arg(long)]
    dry_run: bool,

    /// Repost entries already recorded as posted
    #[arg(long)]
    force: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Validate arguments
    if !args.manifest.exists() {
        return Err(anyhow::anyhow!(
            "Manifest file does not exist: {}",
            args.manifest.display()
        ));
    }

    if !args.image_directory.is_dir() {
        return Err(anyhow::anyhow!(
            "Image directory does not exist: {}",
            args.image_directory.display()
        ));
    }

    let config = Config {
        max_image_bytes: args.max_image_bytes,
        max_status_chars: args.max_chars,
        dry_run: args.dry_run,
        force_repost: args.force,
    };

    let today = args.date.unwrap_or_else(|| Local::now().date_naive());
    if args.date.is_some() {
        info!("Posting entries scheduled for {} (date override)", today);
    }

    let platform = Arc::new(ConsolePlatform::new());
    let mut scheduler =
        PostScheduler::new(&args.manifest, &args.image_directory, config, platform).await?;
    scheduler.run(today).await?;

    Ok(())
}
