//! Application configuration. API endpoints, paths, transcript language.

use crate::adapters::api::http_client::Endpoints;
use crate::domain::DomainError;
use serde::Deserialize;

pub const DEFAULT_API_BASE_URL: &str = "https://api.wwdc.io/";
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_TRANSCRIPT_LANGUAGE: &str = "en";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// Content service root. Read from WWDC_API_BASE_URL.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Directory for the local store. Read from WWDC_DATA_DIR.
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Transcript language code (e.g. "en", "ja"). Read from WWDC_TRANSCRIPT_LANGUAGE.
    #[serde(default)]
    pub transcript_language: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Endpoint paths (relative to api_base_url)
    // ─────────────────────────────────────────────────────────────────────────
    #[serde(default)]
    pub content_path: Option<String>,

    #[serde(default)]
    pub live_videos_path: Option<String>,

    #[serde(default)]
    pub featured_sections_path: Option<String>,

    /// Serve fixture data instead of calling the service. Read from WWDC_OFFLINE.
    #[serde(default)]
    pub offline: Option<bool>,

    /// Session whose related sessions are shown. Defaults to the first featured session.
    #[serde(default)]
    pub session_id: Option<String>,
}

impl AppConfig {
    /// Environment (WWDC_*) plus the optional file named by WWDC_CONFIG.
    pub fn load() -> Result<Self, DomainError> {
        dotenv::dotenv().ok();
        let file = std::env::var("WWDC_CONFIG").ok();
        Self::load_from(file.as_deref())
    }

    /// Environment (WWDC_*) layered over `file`, which must exist when given.
    pub fn load_from(file: Option<&str>) -> Result<Self, DomainError> {
        let mut c = config::Config::builder();
        if let Some(path) = file {
            c = c.add_source(config::File::with_name(path));
        }
        c = c.add_source(config::Environment::with_prefix("WWDC").try_parsing(true));
        c.build()
            .and_then(|built| built.try_deserialize())
            .map_err(|e| DomainError::Config(e.to_string()))
    }

    pub fn api_base_url_or_default(&self) -> String {
        self.api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    pub fn data_dir_or_default(&self) -> String {
        self.data_dir
            .clone()
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
    }

    pub fn transcript_language_or_default(&self) -> String {
        self.transcript_language
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TRANSCRIPT_LANGUAGE.to_string())
    }

    /// Endpoint paths, falling back to the service defaults per path.
    pub fn endpoints(&self) -> Endpoints {
        let defaults = Endpoints::default();
        Endpoints {
            content: self.content_path.clone().unwrap_or(defaults.content),
            live_videos: self.live_videos_path.clone().unwrap_or(defaults.live_videos),
            featured_sections: self
                .featured_sections_path
                .clone()
                .unwrap_or(defaults.featured_sections),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }
}
