//! Infrastructure adapters. Implement outbound ports.
//!
//! Remote API, filesystem store, transcript index, terminal UI. Map errors to DomainError.

pub mod api;
pub mod indexing;
pub mod persistence;
pub mod ui;
