//! Posting platform abstraction
//!
//! The scheduler talks to the social network through the [`SocialPlatform`]
//! trait: a status text, an optional encoded attachment, and a
//! platform-specific post id back. A real client library plugs in behind
//! this seam; the crate ships a console stand-in and a configurable mock.
//!
//! The mock is available to all builds (not just tests) so integration
//! tests can drive the full scheduling pipeline without credentials or
//! network access.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::info;

use crate::error::PostError;

/// Unified interface to a social posting service
#[async_trait]
pub trait SocialPlatform: Send + Sync {
    /// Lowercase identifier for the platform (e.g. "console", "mock")
    fn name(&self) -> &str;

    /// Hard character limit imposed by the platform, if any
    fn character_limit(&self) -> Option<usize> {
        None
    }

    /// Publish a status with an optional encoded image attachment.
    ///
    /// Completes with a platform-specific post id, or a [`PostError`]
    /// describing why the post was refused. One call posts one status;
    /// callers serialize posts by awaiting each call before the next.
    async fn post(&self, status: &str, media: Option<&[u8]>) -> Result<String, PostError>;
}

/// Stand-in platform that logs posts instead of publishing them.
///
/// Used by the CLI where a real client library would otherwise be wired in.
#[derive(Default)]
pub struct ConsolePlatform {
    counter: AtomicU64,
}

impl ConsolePlatform {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SocialPlatform for ConsolePlatform {
    fn name(&self) -> &str {
        "console"
    }

    fn character_limit(&self) -> Option<usize> {
        Some(280)
    }

    async fn post(&self, status: &str, media: Option<&[u8]>) -> Result<String, PostError> {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        match media {
            Some(media) => info!(
                "📤 [console] {} byte attachment\n{}",
                media.len(),
                status
            ),
            None => info!("📤 [console] no attachment\n{}", status),
        }
        Ok(format!("console-{}", id))
    }
}

/// One post captured by [`MockPlatform`]
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub status: String,
    pub media_len: Option<usize>,
}

/// Configurable mock platform for tests.
///
/// Records every accepted post and can be scripted to fail the next N
/// calls with specific errors before succeeding.
pub struct MockPlatform {
    name: String,
    character_limit: Option<usize>,
    failures: Mutex<VecDeque<PostError>>,
    posts: Mutex<Vec<RecordedPost>>,
    post_calls: AtomicU64,
}

impl MockPlatform {
    /// Mock that accepts every post
    pub fn success(name: &str) -> Self {
        Self {
            name: name.to_string(),
            character_limit: None,
            failures: Mutex::new(VecDeque::new()),
            posts: Mutex::new(Vec::new()),
            post_calls: AtomicU64::new(0),
        }
    }

    /// Mock that fails with the scripted errors first, then accepts
    pub fn failing_with(name: &str, failures: Vec<PostError>) -> Self {
        let mock = Self::success(name);
        *mock.failures.lock().unwrap() = failures.into();
        mock
    }

    pub fn with_character_limit(mut self, limit: usize) -> Self {
        self.character_limit = Some(limit);
        self
    }

    /// Posts accepted so far
    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }

    /// Total `post` invocations, including failed ones
    pub fn post_calls(&self) -> u64 {
        self.post_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SocialPlatform for MockPlatform {
    fn name(&self) -> &str {
        &self.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.character_limit
    }

    async fn post(&self, status: &str, media: Option<&[u8]>) -> Result<String, PostError> {
        let call = self.post_calls.fetch_add(1, Ordering::SeqCst) + 1;

        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        self.posts.lock().unwrap().push(RecordedPost {
            status: status.to_string(),
            media_len: media.map(|media| media.len()),
        });
        Ok(format!("{}-{}", self.name, call))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn console_platform_accepts_posts() {
        let platform = ConsolePlatform::new();

        let first = platform.post("hello", Some(&[1, 2, 3])).await.unwrap();
        let second = platform.post("again", None).await.unwrap();

        assert_eq!(first, "console-1");
        assert_eq!(second, "console-2");
    }

    #[tokio::test]
    async fn mock_records_posts_and_media_size() {
        let mock = MockPlatform::success("mock");

        mock.post("hello", Some(&[0u8; 16])).await.unwrap();
        mock.post("bare", None).await.unwrap();

        let posts = mock.posts();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].status, "hello");
        assert_eq!(posts[0].media_len, Some(16));
        assert_eq!(posts[1].media_len, None);
    }

    #[tokio::test]
    async fn mock_fails_with_scripted_errors_first() {
        let mock = MockPlatform::failing_with(
            "mock",
            vec![PostError::Network("connection reset".into())],
        );

        assert!(mock.post("hello", None).await.is_err());
        assert!(mock.post("hello", None).await.is_ok());
        assert_eq!(mock.post_calls(), 2);
        assert_eq!(mock.posts().len(), 1);
    }
}
