//! In-memory transcript index: term -> session ids.
//!
//! Reads sessions from the store and indexes their transcripts on a background
//! task. Sessions already indexed for the current language are skipped unless
//! the run ignores the cache.

use crate::ports::{StoragePort, TranscriptIndexerPort};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info};

/// Terms shorter than this are not indexed.
const MIN_TERM_LEN: usize = 2;

#[derive(Default)]
struct IndexCache {
    /// Language the cached entries were built for.
    language: String,
    sessions: HashSet<String>,
}

struct IndexerInner {
    storage: Arc<dyn StoragePort>,
    language: RwLock<String>,
    cache: Mutex<IndexCache>,
    terms: RwLock<HashMap<String, BTreeSet<String>>>,
    is_indexing: watch::Sender<bool>,
    progress: watch::Sender<f32>,
}

pub struct TranscriptIndexer {
    inner: Arc<IndexerInner>,
}

impl TranscriptIndexer {
    pub fn new(storage: Arc<dyn StoragePort>, language: &str) -> Self {
        Self {
            inner: Arc::new(IndexerInner {
                storage,
                language: RwLock::new(language.to_string()),
                cache: Mutex::new(IndexCache::default()),
                terms: RwLock::new(HashMap::new()),
                is_indexing: watch::channel(false).0,
                progress: watch::channel(0.0).0,
            }),
        }
    }

    /// Session ids whose transcript contains `term` (case-insensitive), sorted.
    pub fn search(&self, term: &str) -> Vec<String> {
        let terms = self.inner.terms.read().unwrap_or_else(|e| e.into_inner());
        terms
            .get(&term.to_lowercase())
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of sessions covered by the cache.
    pub async fn indexed_sessions(&self) -> usize {
        self.inner.cache.lock().await.sessions.len()
    }
}

impl TranscriptIndexerPort for TranscriptIndexer {
    fn start_indexing(&self, ignoring_cache: bool) {
        if self.inner.is_indexing.send_replace(true) {
            debug!("transcript indexing already running");
            return;
        }
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            run_indexing(&inner, ignoring_cache).await;
            inner.is_indexing.send_replace(false);
        });
    }

    fn transcript_language(&self) -> String {
        self.inner
            .language
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_transcript_language(&self, language: &str) {
        *self
            .inner
            .language
            .write()
            .unwrap_or_else(|e| e.into_inner()) = language.to_string();
    }

    fn is_indexing(&self) -> watch::Receiver<bool> {
        self.inner.is_indexing.subscribe()
    }

    fn indexing_progress(&self) -> watch::Receiver<f32> {
        self.inner.progress.subscribe()
    }
}

async fn run_indexing(inner: &IndexerInner, ignoring_cache: bool) {
    let language = inner
        .language
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    let content = inner.storage.content().await;
    let mut cache = inner.cache.lock().await;

    if ignoring_cache || cache.language != language {
        cache.sessions.clear();
        cache.language = language.clone();
        inner
            .terms
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    let pending: Vec<_> = content
        .sessions
        .iter()
        .filter(|s| !cache.sessions.contains(&s.id))
        .collect();
    let total = pending.len();
    inner.progress.send_replace(0.0);

    for (i, session) in pending.into_iter().enumerate() {
        if let Some(transcript) = &session.transcript {
            let mut terms = inner.terms.write().unwrap_or_else(|e| e.into_inner());
            for term in tokenize(transcript) {
                terms.entry(term).or_default().insert(session.id.clone());
            }
        }
        cache.sessions.insert(session.id.clone());
        inner.progress.send_replace((i + 1) as f32 / total as f32);
        tokio::task::yield_now().await;
    }

    if total == 0 {
        inner.progress.send_replace(1.0);
    }
    info!(indexed = total, language = %language, "transcript indexing finished");
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_TERM_LEN)
        .map(str::to_lowercase)
        .collect()
}
