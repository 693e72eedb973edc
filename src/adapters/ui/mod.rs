//! UI adapters: the related-sessions strip and the terminal surfaces that draw it.

pub mod collection;
pub mod progress;
pub mod related_sessions;
pub mod terminal;

pub use related_sessions::{Metrics, RelatedSessionsDelegate, RelatedSessionsPanel};
pub use terminal::TerminalSurface;
