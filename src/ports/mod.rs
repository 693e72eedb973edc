//! Port traits. API boundaries for the hexagon.
//!
//! Outbound only: called by the application into infrastructure. The UI-facing
//! capability traits live next to the panel in `adapters::ui::collection`.

pub mod outbound;

pub use outbound::{ApiClientPort, StoragePort, TranscriptIndexerPort, UserDataSyncPort};
