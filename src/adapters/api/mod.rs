//! API client adapters. Implement ApiClientPort.
//!
//! HTTP client for the real content service and an offline mock with fixture data.

pub mod http_client;
pub mod mock_client;

pub use http_client::HttpApiClient;
pub use mock_client::MockApiClient;
