//! Mock API client for offline runs and tests.
//!
//! Returns a small fixture schedule without making network calls.

use crate::domain::{
    ContentPayload, DomainError, Event, FeaturedSection, LiveVideoAsset, Session, Track,
};
use crate::ports::ApiClientPort;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Mock API client.
///
/// Counts calls per endpoint so callers can assert how often each was hit.
/// Simulates network latency with configurable delay.
pub struct MockApiClient {
    delay_ms: u64,
    content: ContentPayload,
    content_error: Option<String>,
    live_error: Option<String>,
    featured_error: Option<String>,
    content_fetches: AtomicUsize,
    live_video_fetches: AtomicUsize,
    featured_fetches: AtomicUsize,
}

impl MockApiClient {
    /// Create a mock client with default delay (100ms) and the bundled fixture.
    pub fn new() -> Self {
        Self::with_delay(100)
    }

    pub fn with_delay(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            content: fixture_content(),
            content_error: None,
            live_error: None,
            featured_error: None,
            content_fetches: AtomicUsize::new(0),
            live_video_fetches: AtomicUsize::new(0),
            featured_fetches: AtomicUsize::new(0),
        }
    }

    pub fn failing_content(mut self, message: &str) -> Self {
        self.content_error = Some(message.to_string());
        self
    }

    pub fn failing_live_videos(mut self, message: &str) -> Self {
        self.live_error = Some(message.to_string());
        self
    }

    pub fn failing_featured_sections(mut self, message: &str) -> Self {
        self.featured_error = Some(message.to_string());
        self
    }

    pub fn content_fetches(&self) -> usize {
        self.content_fetches.load(Ordering::SeqCst)
    }

    pub fn live_video_fetches(&self) -> usize {
        self.live_video_fetches.load(Ordering::SeqCst)
    }

    pub fn featured_fetches(&self) -> usize {
        self.featured_fetches.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
    }
}

impl Default for MockApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ApiClientPort for MockApiClient {
    async fn fetch_content(&self) -> Result<ContentPayload, DomainError> {
        self.content_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if let Some(msg) = &self.content_error {
            return Err(DomainError::Client(msg.clone()));
        }
        info!(
            sessions = self.content.sessions.len(),
            "[MOCK] serving fixture content"
        );
        Ok(self.content.clone())
    }

    async fn fetch_live_video_assets(&self) -> Result<Vec<LiveVideoAsset>, DomainError> {
        self.live_video_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if let Some(msg) = &self.live_error {
            return Err(DomainError::Client(msg.clone()));
        }
        Ok(self
            .content
            .sessions
            .iter()
            .take(1)
            .map(|s| LiveVideoAsset {
                session_id: s.id.clone(),
                stream_url: format!("https://devstreaming.example.com/live/{}.m3u8", s.id),
            })
            .collect())
    }

    async fn fetch_featured_sections(&self) -> Result<Vec<FeaturedSection>, DomainError> {
        self.featured_fetches.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        if let Some(msg) = &self.featured_error {
            return Err(DomainError::Client(msg.clone()));
        }
        Ok(vec![FeaturedSection {
            id: "featured-swift".into(),
            title: "Get started with Swift".into(),
            summary: "Sessions picked for newcomers.".into(),
            session_ids: self.content.sessions.iter().map(|s| s.id.clone()).collect(),
        }])
    }
}

fn fixture_session(id: &str, title: &str, track: &str, minutes: u64, related: &[&str]) -> Session {
    Session {
        id: id.into(),
        title: title.into(),
        summary: format!("{}: a session from the fixture schedule.", title),
        event_id: "wwdc2024".into(),
        track_id: Some(track.into()),
        duration_secs: minutes * 60,
        starts_at: None,
        related_ids: related.iter().map(|r| r.to_string()).collect(),
        transcript: Some(format!(
            "Welcome to {}. In this session we walk through the essentials.",
            title
        )),
    }
}

fn fixture_content() -> ContentPayload {
    ContentPayload {
        events: vec![Event {
            id: "wwdc2024".into(),
            name: "WWDC24".into(),
            start_date: None,
            end_date: None,
        }],
        tracks: vec![
            Track {
                id: "swift".into(),
                name: "Swift".into(),
            },
            Track {
                id: "swiftui".into(),
                name: "SwiftUI & UI Frameworks".into(),
            },
        ],
        sessions: vec![
            fixture_session(
                "wwdc2024-10136",
                "What's new in Swift",
                "swift",
                26,
                &["wwdc2024-10169", "wwdc2024-10144"],
            ),
            fixture_session(
                "wwdc2024-10169",
                "Migrate your app to Swift 6",
                "swift",
                40,
                &["wwdc2024-10136"],
            ),
            fixture_session(
                "wwdc2024-10144",
                "What's new in SwiftUI",
                "swiftui",
                31,
                &["wwdc2024-10136"],
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_counts_fetches() {
        let client = MockApiClient::with_delay(1);

        let content = client.fetch_content().await.unwrap();
        assert_eq!(content.sessions.len(), 3);
        assert_eq!(client.content_fetches(), 1);

        let featured = client.fetch_featured_sections().await.unwrap();
        assert_eq!(featured[0].session_ids.len(), 3);
        assert_eq!(client.featured_fetches(), 1);
        assert_eq!(client.live_video_fetches(), 0);
    }

    #[tokio::test]
    async fn test_failing_endpoint_returns_client_error() {
        let client = MockApiClient::with_delay(1).failing_live_videos("503");
        let err = client.fetch_live_video_assets().await.unwrap_err();
        assert!(matches!(err, DomainError::Client(msg) if msg == "503"));
        assert_eq!(client.live_video_fetches(), 1);
    }
}
