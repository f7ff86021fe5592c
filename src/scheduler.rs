//! # Main Scheduler Orchestrator Module
//!
//! Questo è il modulo principale che orchestra il processo di pubblicazione.
//!
//! ## Responsabilità:
//! - Coordinamento di tutti gli altri moduli
//! - Caricamento manifest e filtro delle entry dovute oggi
//! - Compressione e attach dell'immagine per ogni entry
//! - Pubblicazione serializzata (una entry alla volta) con retry
//! - Gestione stato per evitare doppie pubblicazioni
//! - Report finale con statistiche del run
//!
//! ## Pipeline per entry:
//! 1. Skip se già pubblicata (via StateManager, a meno di `--force`)
//! 2. Lookup e decodifica dell'immagine referenziata
//! 3. Compressione sotto il tetto di byte e attach alla entry
//! 4. Rifiuto se nessun allegato è stato prodotto
//! 5. Check del limite caratteri su caption + hashtag
//! 6. Pubblicazione con retry (backoff esponenziale sui soli errori
//!    transitori)
//! 7. Registrazione nello stato
//!
//! ## Error handling:
//! - Errori su singole entry non bloccano il run
//! - Statistics tracciano il numero di errori
//!
//! ## Dry run mode:
//! - Esegue lookup e compressione ma non pubblica e non tocca lo stato

use anyhow::Result;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info, warn};

use crate::{
    compressor::ImageCompressor,
    config::Config,
    error::{PostError, SchedulerError},
    manifest::{self, PostEntry},
    media::ImageDirectory,
    platform::SocialPlatform,
    progress::{PostingStats, ProgressManager},
    state::{PostedEntry, StateManager},
};

const MAX_POST_ATTEMPTS: u32 = 3;

/// Main posting orchestrator
pub struct PostScheduler {
    config: Config,
    manifest_path: PathBuf,
    images: ImageDirectory,
    compressor: ImageCompressor,
    state_manager: StateManager,
    platform: Arc<dyn SocialPlatform>,
}

impl PostScheduler {
    /// Create a new scheduler instance
    pub async fn new(
        manifest_path: &Path,
        image_dir: &Path,
        config: Config,
        platform: Arc<dyn SocialPlatform>,
    ) -> Result<Self> {
        config.validate()?;

        let state_manager = StateManager::new(manifest_path).await?;

        Ok(Self {
            compressor: ImageCompressor::new(config.max_image_bytes),
            images: ImageDirectory::new(image_dir),
            manifest_path: manifest_path.to_path_buf(),
            config,
            state_manager,
            platform,
        })
    }

    /// Post every manifest entry scheduled for `today`
    pub async fn run(&mut self, today: NaiveDate) -> Result<()> {
        info!(
            "Starting scheduled posting for {} from {}",
            today,
            self.manifest_path.display()
        );
        info!(
            "🎯 Platform: {} | attachment ceiling: {} bytes | status limit: {} chars",
            self.platform.name(),
            self.config.max_image_bytes,
            self.status_char_limit()
        );

        if self.config.dry_run {
            info!("🧪 Dry run mode: nothing will be posted");
        }
        if self.config.force_repost {
            info!("🔄 Force mode: entries already posted will be posted again");
        }

        let entries = manifest::load_manifest(&self.manifest_path).await?;
        info!("Loaded {} manifest entries", entries.len());

        let due: Vec<PostEntry> = entries
            .into_iter()
            .filter(|entry| entry.is_scheduled_for(today))
            .collect();
        info!("{} entries scheduled for {}", due.len(), today);

        if due.is_empty() {
            info!("Nothing to post today");
            return Ok(());
        }

        let progress = ProgressManager::new(due.len() as u64);
        let mut stats = PostingStats::new();

        for mut entry in due {
            progress.set_message(&format!("posting {}", entry.image_name));

            let outcome = self.process_entry(&mut entry).await;
            let message = match &outcome {
                Ok(Some(post_id)) => {
                    stats.add_posted();
                    format!("✅ {}: posted ({})", entry.image_name, post_id)
                }
                Ok(None) => {
                    stats.add_skipped();
                    format!("⏩ {}: skipped", entry.image_name)
                }
                Err(e) => {
                    stats.add_error();
                    error!("Failed to post entry {:?}: {}", entry.caption, e);
                    format!("❌ {}: error", entry.image_name)
                }
            };

            progress.update(&message);
        }

        progress.finish(&stats.format_summary());
        self.print_final_stats(&stats);

        Ok(())
    }

    /// Effective status character ceiling: the stricter of the configured
    /// limit and the platform's own limit
    fn status_char_limit(&self) -> usize {
        match self.platform.character_limit() {
            Some(limit) => limit.min(self.config.max_status_chars),
            None => self.config.max_status_chars,
        }
    }

    /// Process a single due entry.
    ///
    /// # Returns
    /// * `Ok(Some(post_id))` - Published
    /// * `Ok(None)` - Skipped (already posted, or dry run)
    /// * `Err(_)` - Refused or failed; the run continues with the next entry
    async fn process_entry(&mut self, entry: &mut PostEntry) -> Result<Option<String>> {
        if !self.config.force_repost
            && self.state_manager.is_posted(&entry.post_date, &entry.caption)
        {
            debug!("Already posted, skipping: {:?}", entry.caption);
            return Ok(None);
        }

        let bitmap = self.images.load_bitmap(&entry.image_name).await;
        entry.image = self.compressor.compress(bitmap.as_ref());

        let image = match entry.image.as_deref() {
            Some(image) => image,
            None => {
                return Err(SchedulerError::Validation(format!(
                    "No image data produced for {:?}",
                    entry.image_name
                ))
                .into());
            }
        };

        if image.len() as u64 > self.config.max_image_bytes {
            warn!(
                "Attachment for {:?} is {} bytes, over the {} byte ceiling",
                entry.image_name,
                image.len(),
                self.config.max_image_bytes
            );
        }

        let status = entry.status_text();
        let char_count = status.chars().count();
        let char_limit = self.status_char_limit();
        if char_count > char_limit {
            return Err(SchedulerError::Validation(format!(
                "Status is {} chars, over the {} char limit",
                char_count, char_limit
            ))
            .into());
        }

        if self.config.dry_run {
            info!(
                "Dry run: would post {} chars with a {} byte attachment to {}",
                char_count,
                image.len(),
                self.platform.name()
            );
            return Ok(None);
        }

        let post_id = self.post_with_retry(&status, image).await?;
        info!("Posted to {}: {}", self.platform.name(), post_id);

        let posted_at = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)?
            .as_secs();
        self.state_manager
            .mark_posted(PostedEntry {
                caption: entry.caption.clone(),
                post_date: entry.post_date.clone(),
                platform: self.platform.name().to_string(),
                platform_post_id: post_id.clone(),
                posted_at,
            })
            .await?;

        Ok(Some(post_id))
    }

    /// Post with bounded retry and exponential backoff.
    ///
    /// Only transient errors are retried; permanent errors surface
    /// immediately.
    async fn post_with_retry(&self, status: &str, media: &[u8]) -> Result<String, PostError> {
        for attempt in 1..=MAX_POST_ATTEMPTS {
            match self.platform.post(status, Some(media)).await {
                Ok(post_id) => {
                    if attempt > 1 {
                        info!(
                            "Successfully posted to {} on attempt {}",
                            self.platform.name(),
                            attempt
                        );
                    }
                    return Ok(post_id);
                }
                Err(e) => {
                    if e.is_transient() && attempt < MAX_POST_ATTEMPTS {
                        let delay_secs = 2_u64.pow(attempt - 1);
                        warn!(
                            "Transient error posting to {} (attempt {}/{}): {}. Retrying in {}s...",
                            self.platform.name(),
                            attempt,
                            MAX_POST_ATTEMPTS,
                            e,
                            delay_secs
                        );
                        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(PostError::Posting("retry attempts exhausted".to_string()))
    }

    fn print_final_stats(&self, stats: &PostingStats) {
        info!("=== Posting Complete ===");
        info!("Entries due this run: {}", stats.entries_seen);
        info!("Posted this run: {}", stats.posted);
        info!("Skipped this run: {}", stats.skipped);
        info!("Errors this run: {}", stats.errors);
        info!("--- Historical ---");
        info!(
            "Total posts recorded for this manifest: {}",
            self.state_manager.posted_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::POST_DATE_FORMAT;
    use crate::platform::MockPlatform;
    use chrono::{Duration as ChronoDuration, Local};
    use image::{DynamicImage, Rgb, RgbImage};
    use serde_json::json;
    use tempfile::TempDir;

    fn entry_json(caption: &str, image_name: &str, post_date: &str) -> serde_json::Value {
        json!({
            "caption": caption,
            "image_name": image_name,
            "post_date": post_date,
            "hashtags": "#test"
        })
    }

    fn today_string() -> String {
        Local::now().format(POST_DATE_FORMAT).to_string()
    }

    fn yesterday_string() -> String {
        (Local::now() - ChronoDuration::days(1))
            .format(POST_DATE_FORMAT)
            .to_string()
    }

    fn write_image(dir: &Path, name: &str) {
        let pixels = RgbImage::from_pixel(16, 16, Rgb([200, 100, 50]));
        DynamicImage::ImageRgb8(pixels).save(dir.join(name)).unwrap();
    }

    async fn build_scheduler(
        temp_dir: &TempDir,
        entries: Vec<serde_json::Value>,
        config: Config,
        platform: Arc<MockPlatform>,
    ) -> PostScheduler {
        let manifest_path = temp_dir.path().join("posts.json");
        tokio::fs::write(
            &manifest_path,
            serde_json::to_string_pretty(&serde_json::Value::Array(entries)).unwrap(),
        )
        .await
        .unwrap();

        let image_dir = temp_dir.path().join("images");
        tokio::fs::create_dir_all(&image_dir).await.unwrap();

        let state_manager = StateManager::open(&temp_dir.path().join("state"), &manifest_path)
            .await
            .unwrap();

        PostScheduler {
            compressor: ImageCompressor::new(config.max_image_bytes),
            images: ImageDirectory::new(&image_dir),
            manifest_path,
            config,
            state_manager,
            platform,
        }
    }

    #[tokio::test]
    async fn posts_due_entry_with_compressed_attachment() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock"));
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("Sunset over the bay", "sunset.jpg", &today_string())],
            Config::default(),
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();

        let posts = mock.posts();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].status, "Sunset over the bay\n\n#test");
        assert!(posts[0].media_len.unwrap() > 0);
        assert!(scheduler
            .state_manager
            .is_posted(&scheduler_entry_date(&temp_dir).await, "Sunset over the bay"));
    }

    /// Read back the post_date actually written to the manifest
    async fn scheduler_entry_date(temp_dir: &TempDir) -> String {
        let content = tokio::fs::read_to_string(temp_dir.path().join("posts.json"))
            .await
            .unwrap();
        let entries: Vec<serde_json::Value> = serde_json::from_str(&content).unwrap();
        entries[0]["post_date"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn skips_entries_not_due_today() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock"));
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![
                entry_json("Old news", "old.jpg", &yesterday_string()),
                entry_json("Bad date", "bad.jpg", "someday"),
            ],
            Config::default(),
            mock.clone(),
        )
        .await;

        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 0);
    }

    #[tokio::test]
    async fn entry_without_image_is_not_posted() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock"));
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("No picture", "missing.jpg", &today_string())],
            Config::default(),
            mock.clone(),
        )
        .await;

        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 0);
        assert_eq!(scheduler.state_manager.posted_count(), 0);
    }

    #[tokio::test]
    async fn over_limit_status_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock"));
        let config = Config {
            max_status_chars: 10,
            ..Default::default()
        };
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json(
                "A caption much longer than ten characters",
                "sunset.jpg",
                &today_string(),
            )],
            config,
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 0);
    }

    #[tokio::test]
    async fn platform_character_limit_tightens_the_ceiling() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock").with_character_limit(5));
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("Not that short", "sunset.jpg", &today_string())],
            Config::default(),
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 0);
    }

    #[tokio::test]
    async fn dry_run_posts_nothing_and_records_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock"));
        let config = Config {
            dry_run: true,
            ..Default::default()
        };
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("Sunset over the bay", "sunset.jpg", &today_string())],
            config,
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 0);
        assert_eq!(scheduler.state_manager.posted_count(), 0);
    }

    #[tokio::test]
    async fn same_entry_is_not_posted_twice() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock"));
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("Sunset over the bay", "sunset.jpg", &today_string())],
            Config::default(),
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();
        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 1);
    }

    #[tokio::test]
    async fn force_repost_posts_again() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::success("mock"));
        let config = Config {
            force_repost: true,
            ..Default::default()
        };
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("Sunset over the bay", "sunset.jpg", &today_string())],
            config,
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();
        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 2);
    }

    #[tokio::test]
    async fn transient_error_is_retried() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::failing_with(
            "mock",
            vec![PostError::Network("connection reset".into())],
        ));
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("Sunset over the bay", "sunset.jpg", &today_string())],
            Config::default(),
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 2);
        assert_eq!(mock.posts().len(), 1);
    }

    #[tokio::test]
    async fn permanent_error_is_not_retried() {
        let temp_dir = TempDir::new().unwrap();
        let mock = Arc::new(MockPlatform::failing_with(
            "mock",
            vec![PostError::Posting("rejected".into())],
        ));
        let mut scheduler = build_scheduler(
            &temp_dir,
            vec![entry_json("Sunset over the bay", "sunset.jpg", &today_string())],
            Config::default(),
            mock.clone(),
        )
        .await;
        write_image(&temp_dir.path().join("images"), "sunset.jpg");

        scheduler.run(Local::now().date_naive()).await.unwrap();

        assert_eq!(mock.post_calls(), 1);
        assert!(mock.posts().is_empty());
        assert_eq!(scheduler.state_manager.posted_count(), 0);
    }
}
