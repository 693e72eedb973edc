//! Domain entities. Pure data structures for the core business.
//!
//! No HTTP/storage types here; adapters decode into these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything returned by the content endpoint: sessions plus the schedule they belong to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentPayload {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tracks: Vec<Track>,
    #[serde(default)]
    pub sessions: Vec<Session>,
}

/// A conference edition (e.g. "wwdc2024").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
}

/// A single conference session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub event_id: String,
    pub track_id: Option<String>,
    #[serde(default)]
    pub duration_secs: u64,
    pub starts_at: Option<DateTime<Utc>>,
    /// Identifiers of sessions shown in the "related" strip.
    #[serde(default)]
    pub related_ids: Vec<String>,
    /// Plain-text transcript, when one has been published.
    #[serde(default)]
    pub transcript: Option<String>,
}

/// Stream for a session that is (or will be) broadcast live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveVideoAsset {
    pub session_id: String,
    pub stream_url: String,
}

/// Curated group of sessions shown on the featured tab.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturedSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub session_ids: Vec<String>,
}

/// Display-ready projection of a [`Session`]. UI adapters never mutate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionViewModel {
    pub session_id: String,
    pub title: String,
    /// "Event · Track" line shown under the title.
    pub subtitle: String,
    pub summary: String,
    pub duration: String,
}

impl SessionViewModel {
    /// Project a session using the schedule it was synced with (for event/track names).
    pub fn from_session(session: &Session, content: &ContentPayload) -> Self {
        let event = content
            .events
            .iter()
            .find(|e| e.id == session.event_id)
            .map(|e| e.name.as_str())
            .unwrap_or(session.event_id.as_str());
        let track = session
            .track_id
            .as_deref()
            .and_then(|id| content.tracks.iter().find(|t| t.id == id))
            .map(|t| t.name.as_str());

        let subtitle = match track {
            Some(track) => format!("{} · {}", event, track),
            None => event.to_string(),
        };

        Self {
            session_id: session.id.clone(),
            title: session.title.clone(),
            subtitle,
            summary: session.summary.clone(),
            duration: format_duration(session.duration_secs),
        }
    }
}

/// "45 min", "1 h 5 min"; empty for unknown (zero) durations.
fn format_duration(secs: u64) -> String {
    let minutes = secs / 60;
    match (minutes / 60, minutes % 60) {
        (0, 0) => String::new(),
        (0, m) => format!("{} min", m),
        (h, 0) => format!("{} h", h),
        (h, m) => format!("{} h {} min", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content() -> ContentPayload {
        ContentPayload {
            events: vec![Event {
                id: "wwdc2024".into(),
                name: "WWDC24".into(),
                start_date: None,
                end_date: None,
            }],
            tracks: vec![Track {
                id: "swift".into(),
                name: "Swift".into(),
            }],
            sessions: vec![],
        }
    }

    fn session(track_id: Option<&str>, duration_secs: u64) -> Session {
        Session {
            id: "wwdc2024-10136".into(),
            title: "What's new in Swift".into(),
            summary: "Join us.".into(),
            event_id: "wwdc2024".into(),
            track_id: track_id.map(String::from),
            duration_secs,
            starts_at: None,
            related_ids: vec![],
            transcript: None,
        }
    }

    #[test]
    fn test_view_model_uses_event_and_track_names() {
        let vm = SessionViewModel::from_session(&session(Some("swift"), 1560), &content());
        assert_eq!(vm.subtitle, "WWDC24 · Swift");
        assert_eq!(vm.duration, "26 min");
        assert_eq!(vm.session_id, "wwdc2024-10136");
    }

    #[test]
    fn test_view_model_falls_back_to_event_id() {
        let vm = SessionViewModel::from_session(&session(None, 0), &ContentPayload::default());
        assert_eq!(vm.subtitle, "wwdc2024");
        assert!(vm.duration.is_empty());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(3600), "1 h");
        assert_eq!(format_duration(3900), "1 h 5 min");
        assert_eq!(format_duration(59), "");
    }
}
