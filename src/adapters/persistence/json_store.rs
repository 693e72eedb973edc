//! Implements StoragePort using JSON files.
//!
//! One document per category in the data directory: content.json,
//! live_videos.json, featured_sections.json. Reads are served from memory.

use crate::domain::{ContentPayload, DomainError, FeaturedSection, LiveVideoAsset};
use crate::ports::StoragePort;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{info, warn};

const CONTENT_FILE: &str = "content.json";
const LIVE_VIDEOS_FILE: &str = "live_videos.json";
const FEATURED_FILE: &str = "featured_sections.json";

#[derive(Debug, Default)]
struct StoreData {
    content: ContentPayload,
    live_videos: Vec<LiveVideoAsset>,
    featured_sections: Vec<FeaturedSection>,
}

/// JSON file-based content store.
pub struct JsonStore {
    dir: PathBuf,
    cache: RwLock<StoreData>,
}

impl JsonStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            cache: RwLock::new(StoreData::default()),
        }
    }

    /// Load previously synced documents. Missing or unreadable files start empty.
    pub async fn load(&self) -> Result<(), DomainError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::Storage(format!("create data dir: {}", e)))?;

        let data = StoreData {
            content: read_or_default(&self.dir.join(CONTENT_FILE)).await,
            live_videos: read_or_default(&self.dir.join(LIVE_VIDEOS_FILE)).await,
            featured_sections: read_or_default(&self.dir.join(FEATURED_FILE)).await,
        };
        info!(
            path = %self.dir.display(),
            sessions = data.content.sessions.len(),
            featured = data.featured_sections.len(),
            "loaded local store"
        );
        *self.cache.write().await = data;
        Ok(())
    }

    /// Atomic save using write-replace pattern: temp file, sync_all, rename.
    async fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<(), DomainError> {
        let json =
            serde_json::to_string_pretty(value).map_err(|e| DomainError::Storage(e.to_string()))?;
        let path = self.dir.join(file);

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DomainError::Storage(format!("create data dir: {}", e)))?;

        let temp_path = path.with_extension("json.tmp");
        let mut f = fs::File::create(&temp_path)
            .await
            .map_err(|e| DomainError::Storage(format!("create temp file: {}", e)))?;
        f.write_all(json.as_bytes())
            .await
            .map_err(|e| DomainError::Storage(format!("write temp file: {}", e)))?;
        f.sync_all()
            .await
            .map_err(|e| DomainError::Storage(format!("sync temp file: {}", e)))?;
        drop(f);

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| DomainError::Storage(format!("atomic rename failed: {}", e)))?;
        Ok(())
    }
}

async fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    match fs::read_to_string(path).await {
        Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
            T::default()
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => T::default(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "unreadable store file, starting empty");
            T::default()
        }
    }
}

#[async_trait::async_trait]
impl StoragePort for JsonStore {
    async fn store_content(
        &self,
        result: Result<ContentPayload, DomainError>,
    ) -> Result<(), DomainError> {
        let content = result?;
        self.save(CONTENT_FILE, &content).await?;
        info!(sessions = content.sessions.len(), "stored content");
        self.cache.write().await.content = content;
        Ok(())
    }

    async fn store_live_videos(
        &self,
        result: Result<Vec<LiveVideoAsset>, DomainError>,
    ) -> Result<(), DomainError> {
        let assets = result?;
        self.save(LIVE_VIDEOS_FILE, &assets).await?;
        self.cache.write().await.live_videos = assets;
        Ok(())
    }

    async fn store_featured_sections(
        &self,
        result: Result<Vec<FeaturedSection>, DomainError>,
    ) -> Result<(), DomainError> {
        let sections = result?;
        self.save(FEATURED_FILE, &sections).await?;
        self.cache.write().await.featured_sections = sections;
        Ok(())
    }

    async fn content(&self) -> ContentPayload {
        self.cache.read().await.content.clone()
    }

    async fn live_videos(&self) -> Vec<LiveVideoAsset> {
        self.cache.read().await.live_videos.clone()
    }

    async fn featured_sections(&self) -> Vec<FeaturedSection> {
        self.cache.read().await.featured_sections.clone()
    }
}
