//! Sync notifications. Published by `SyncEngine` on its own broadcast channel.

use crate::domain::DomainError;
use std::sync::Arc;

/// Buffered events per subscriber before a slow subscriber starts lagging.
pub const EVENT_CAPACITY: usize = 16;

/// Fired once per sync cycle. `error` is `None` on success.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    SessionsAndScheduleSynced { error: Option<Arc<DomainError>> },
    FeaturedSectionsSynced { error: Option<Arc<DomainError>> },
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::SessionsAndScheduleSynced { .. } => "SyncEngineDidSyncSessionsAndSchedule",
            SyncEvent::FeaturedSectionsSynced { .. } => "SyncEngineDidSyncFeaturedSections",
        }
    }

    pub fn error(&self) -> Option<&DomainError> {
        match self {
            SyncEvent::SessionsAndScheduleSynced { error }
            | SyncEvent::FeaturedSectionsSynced { error } => error.as_deref(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error().is_none()
    }
}
