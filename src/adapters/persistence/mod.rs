//! Persistence adapters. Implement StoragePort.

pub mod json_store;

pub use json_store::JsonStore;
