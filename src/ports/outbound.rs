//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{ContentPayload, DomainError, FeaturedSection, LiveVideoAsset, Session};
use tokio::sync::watch;

/// Remote conference API. Each call resolves once with a typed result.
#[async_trait::async_trait]
pub trait ApiClientPort: Send + Sync {
    /// Fetch sessions together with the schedule (events, tracks).
    async fn fetch_content(&self) -> Result<ContentPayload, DomainError>;

    /// Fetch the live stream assets for sessions currently being broadcast.
    async fn fetch_live_video_assets(&self) -> Result<Vec<LiveVideoAsset>, DomainError>;

    /// Fetch curated featured sections.
    async fn fetch_featured_sections(&self) -> Result<Vec<FeaturedSection>, DomainError>;
}

/// Local store. Store operations take the raw fetch result; a failed fetch is
/// reported back as the store error so callers observe a single error path.
#[async_trait::async_trait]
pub trait StoragePort: Send + Sync {
    async fn store_content(
        &self,
        result: Result<ContentPayload, DomainError>,
    ) -> Result<(), DomainError>;

    async fn store_live_videos(
        &self,
        result: Result<Vec<LiveVideoAsset>, DomainError>,
    ) -> Result<(), DomainError>;

    async fn store_featured_sections(
        &self,
        result: Result<Vec<FeaturedSection>, DomainError>,
    ) -> Result<(), DomainError>;

    /// Last persisted content (empty before the first successful sync).
    async fn content(&self) -> ContentPayload;

    async fn live_videos(&self) -> Vec<LiveVideoAsset>;

    async fn featured_sections(&self) -> Vec<FeaturedSection>;

    /// Look up one session by id.
    async fn session(&self, id: &str) -> Option<Session> {
        self.content()
            .await
            .sessions
            .into_iter()
            .find(|s| s.id == id)
    }
}

/// Transcript indexing. Runs in the background; progress is observable.
pub trait TranscriptIndexerPort: Send + Sync {
    /// Start (or restart) indexing. With `ignoring_cache`, already indexed sessions are redone.
    fn start_indexing(&self, ignoring_cache: bool);

    fn transcript_language(&self) -> String;

    fn set_transcript_language(&self, language: &str);

    fn is_indexing(&self) -> watch::Receiver<bool>;

    /// Fraction in [0.0, 1.0] of the current indexing run.
    fn indexing_progress(&self) -> watch::Receiver<f32>;
}

/// User data (favorites, progress) sync with a remote account.
pub trait UserDataSyncPort: Send + Sync {
    fn start(&self);
}
