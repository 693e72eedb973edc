//! Transcript indexing adapters. Implement TranscriptIndexerPort.

pub mod transcript_indexer;

pub use transcript_indexer::TranscriptIndexer;
