//! Application use cases. Orchestrate domain logic via ports.

pub mod events;
pub mod main_queue;
pub mod sync_engine;

pub use events::SyncEvent;
pub use main_queue::MainQueue;
pub use sync_engine::SyncEngine;
