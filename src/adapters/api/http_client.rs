//! HTTP adapter for the conference content service.
//!
//! Three JSON endpoints under one base URL; paths are configurable because the
//! service moves them between editions.

use crate::domain::{ContentPayload, DomainError, FeaturedSection, LiveVideoAsset};
use crate::ports::ApiClientPort;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Endpoint paths relative to the base URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub content: String,
    pub live_videos: String,
    pub featured_sections: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            content: "contents.json".to_string(),
            live_videos: "videos_live.json".to_string(),
            featured_sections: "explore.json".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LiveVideosResponse {
    #[serde(default)]
    live_sessions: Vec<LiveVideoAsset>,
}

#[derive(Debug, Deserialize)]
struct FeaturedSectionsResponse {
    #[serde(default)]
    sections: Vec<FeaturedSection>,
}

/// reqwest-backed implementation of `ApiClientPort`.
pub struct HttpApiClient {
    client: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
}

impl HttpApiClient {
    /// # Arguments
    /// * `base_url` - Service root (e.g. "https://api.wwdc.io/")
    /// * `endpoints` - Paths of the three JSON documents under `base_url`
    pub fn new(base_url: String, endpoints: Endpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            endpoints,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DomainError> {
        let url = self.url(path);
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Client(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Client(format!("{} returned {}", url, status)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| DomainError::Client(format!("reading {} failed: {}", url, e)))?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, DomainError> {
    serde_json::from_str(body).map_err(|e| DomainError::Decode(e.to_string()))
}

#[async_trait::async_trait]
impl ApiClientPort for HttpApiClient {
    async fn fetch_content(&self) -> Result<ContentPayload, DomainError> {
        self.get_json(&self.endpoints.content).await
    }

    async fn fetch_live_video_assets(&self) -> Result<Vec<LiveVideoAsset>, DomainError> {
        let response: LiveVideosResponse = self.get_json(&self.endpoints.live_videos).await?;
        Ok(response.live_sessions)
    }

    async fn fetch_featured_sections(&self) -> Result<Vec<FeaturedSection>, DomainError> {
        let response: FeaturedSectionsResponse =
            self.get_json(&self.endpoints.featured_sections).await?;
        Ok(response.sections)
    }
}
