//! Content sync: fetch -> store (on the main queue) -> notify -> fetch next.
//!
//! - `sync_content` publishes `SessionsAndScheduleSynced` and, on success only,
//!   chains into `sync_featured_sections`
//! - `sync_featured_sections` publishes `FeaturedSectionsSynced`
//! - `sync_live_videos` publishes nothing; it only runs the optional completion
//! - No retries: a failure is reported once via the event payload and ends that chain

use crate::ports::{ApiClientPort, StoragePort, TranscriptIndexerPort, UserDataSyncPort};
use crate::usecases::events::{EVENT_CAPACITY, SyncEvent};
use crate::usecases::main_queue::MainQueue;
use std::sync::{Arc, Weak};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

/// Callback run on the main queue once live videos have been stored.
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

struct Inner {
    storage: Arc<dyn StoragePort>,
    client: Arc<dyn ApiClientPort>,
    transcript_indexer: Arc<dyn TranscriptIndexerPort>,
    main: MainQueue,
    events: broadcast::Sender<SyncEvent>,
}

/// Sync coordinator. Cheap to clone; all clones share one event channel.
///
/// Entry points return immediately. Completion is observed through
/// [`SyncEngine::subscribe`] or the live-video completion callback.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<Inner>,
}

impl SyncEngine {
    /// Create the engine and register its own reaction to `SessionsAndScheduleSynced`:
    /// start transcript indexing (using the cache) and the user data sync, if any.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(
        storage: Arc<dyn StoragePort>,
        client: Arc<dyn ApiClientPort>,
        transcript_indexer: Arc<dyn TranscriptIndexerPort>,
        user_data_sync: Option<Arc<dyn UserDataSyncPort>>,
        main: MainQueue,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        spawn_content_listener(
            events.subscribe(),
            main.clone(),
            Arc::clone(&transcript_indexer),
            user_data_sync,
        );

        Self {
            inner: Arc::new(Inner {
                storage,
                client,
                transcript_indexer,
                main,
                events,
            }),
        }
    }

    /// Receive sync events published after this call. The channel closes when
    /// the last engine handle is dropped.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// Fetch sessions and schedule, store them, publish `SessionsAndScheduleSynced`,
    /// then sync featured sections if the store succeeded.
    pub fn sync_content(&self) {
        let engine = self.clone();
        tokio::spawn(async move {
            let result = engine.inner.client.fetch_content().await;
            let main = engine.inner.main.clone();
            main.dispatch(async move {
                let error = engine
                    .inner
                    .storage
                    .store_content(result)
                    .await
                    .err()
                    .map(Arc::new);

                match &error {
                    None => info!("sessions and schedule synced"),
                    Some(e) => warn!(error = %e, "sessions and schedule sync failed"),
                }

                let succeeded = error.is_none();
                engine.publish(SyncEvent::SessionsAndScheduleSynced { error });

                if succeeded {
                    engine.sync_featured_sections();
                }
            });
        });
    }

    /// Fetch live video assets and store them. Store errors are not reported;
    /// `completion` runs on the main queue either way.
    pub fn sync_live_videos(&self, completion: Option<Completion>) {
        let client = Arc::clone(&self.inner.client);
        let main = self.inner.main.clone();
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let result = client.fetch_live_video_assets().await;
            main.dispatch(async move {
                if let Some(inner) = weak.upgrade() {
                    if let Err(e) = inner.storage.store_live_videos(result).await {
                        warn!(error = %e, "live videos not stored");
                    } else {
                        debug!("live videos synced");
                    }
                }
                if let Some(completion) = completion {
                    completion();
                }
            });
        });
    }

    /// Fetch featured sections, store them and publish `FeaturedSectionsSynced`.
    pub fn sync_featured_sections(&self) {
        let client = Arc::clone(&self.inner.client);
        let main = self.inner.main.clone();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let result = client.fetch_featured_sections().await;
            main.dispatch(async move {
                let Some(inner) = weak.upgrade() else {
                    debug!("sync engine dropped before featured sections were stored");
                    return;
                };
                let error = inner
                    .storage
                    .store_featured_sections(result)
                    .await
                    .err()
                    .map(Arc::new);

                match &error {
                    None => info!("featured sections synced"),
                    Some(e) => warn!(error = %e, "featured sections sync failed"),
                }

                SyncEngine { inner }.publish(SyncEvent::FeaturedSectionsSynced { error });
            });
        });
    }

    pub fn transcript_language(&self) -> String {
        self.inner.transcript_indexer.transcript_language()
    }

    pub fn set_transcript_language(&self, language: &str) {
        self.inner.transcript_indexer.set_transcript_language(language);
    }

    pub fn is_indexing_transcripts(&self) -> watch::Receiver<bool> {
        self.inner.transcript_indexer.is_indexing()
    }

    pub fn transcript_indexing_progress(&self) -> watch::Receiver<f32> {
        self.inner.transcript_indexer.indexing_progress()
    }

    fn publish(&self, event: SyncEvent) {
        let name = event.name();
        match self.inner.events.send(event) {
            Ok(receivers) => debug!(event = name, receivers, "published sync event"),
            Err(_) => debug!(event = name, "no subscribers for sync event"),
        }
    }
}

/// Listens for the engine's own `SessionsAndScheduleSynced` events. Holds no
/// engine handle, so it ends when the engine (the only sender) is dropped.
fn spawn_content_listener(
    mut rx: broadcast::Receiver<SyncEvent>,
    main: MainQueue,
    transcript_indexer: Arc<dyn TranscriptIndexerPort>,
    user_data_sync: Option<Arc<dyn UserDataSyncPort>>,
) {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(SyncEvent::SessionsAndScheduleSynced { .. }) => {
                    let indexer = Arc::clone(&transcript_indexer);
                    let user_data = user_data_sync.clone();
                    main.dispatch(async move {
                        indexer.start_indexing(false);
                        if let Some(user_data) = user_data {
                            user_data.start();
                        }
                    });
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "sync event listener lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("sync event listener stopped");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::api::MockApiClient;
    use crate::domain::{ContentPayload, DomainError, FeaturedSection, LiveVideoAsset};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    /// In-memory store that forwards fetch errors and can be told to fail.
    #[derive(Default)]
    struct TestStorage {
        fail_content: AtomicBool,
        fail_live: AtomicBool,
        fail_featured: AtomicBool,
        content: Mutex<ContentPayload>,
        live: Mutex<Vec<LiveVideoAsset>>,
        featured: Mutex<Vec<FeaturedSection>>,
    }

    #[async_trait::async_trait]
    impl StoragePort for TestStorage {
        async fn store_content(
            &self,
            result: Result<ContentPayload, DomainError>,
        ) -> Result<(), DomainError> {
            let payload = result?;
            if self.fail_content.load(Ordering::SeqCst) {
                return Err(DomainError::Storage("disk full".into()));
            }
            *self.content.lock().unwrap() = payload;
            Ok(())
        }

        async fn store_live_videos(
            &self,
            result: Result<Vec<LiveVideoAsset>, DomainError>,
        ) -> Result<(), DomainError> {
            let assets = result?;
            if self.fail_live.load(Ordering::SeqCst) {
                return Err(DomainError::Storage("disk full".into()));
            }
            *self.live.lock().unwrap() = assets;
            Ok(())
        }

        async fn store_featured_sections(
            &self,
            result: Result<Vec<FeaturedSection>, DomainError>,
        ) -> Result<(), DomainError> {
            let sections = result?;
            if self.fail_featured.load(Ordering::SeqCst) {
                return Err(DomainError::Storage("disk full".into()));
            }
            *self.featured.lock().unwrap() = sections;
            Ok(())
        }

        async fn content(&self) -> ContentPayload {
            self.content.lock().unwrap().clone()
        }

        async fn live_videos(&self) -> Vec<LiveVideoAsset> {
            self.live.lock().unwrap().clone()
        }

        async fn featured_sections(&self) -> Vec<FeaturedSection> {
            self.featured.lock().unwrap().clone()
        }
    }

    struct TestIndexer {
        starts: AtomicUsize,
        ignored_cache: AtomicBool,
        language: Mutex<String>,
        indexing: watch::Sender<bool>,
        progress: watch::Sender<f32>,
    }

    impl TestIndexer {
        fn new() -> Self {
            Self {
                starts: AtomicUsize::new(0),
                ignored_cache: AtomicBool::new(false),
                language: Mutex::new("en".into()),
                indexing: watch::channel(false).0,
                progress: watch::channel(0.0).0,
            }
        }
    }

    impl TranscriptIndexerPort for TestIndexer {
        fn start_indexing(&self, ignoring_cache: bool) {
            self.ignored_cache.store(ignoring_cache, Ordering::SeqCst);
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn transcript_language(&self) -> String {
            self.language.lock().unwrap().clone()
        }

        fn set_transcript_language(&self, language: &str) {
            *self.language.lock().unwrap() = language.to_string();
        }

        fn is_indexing(&self) -> watch::Receiver<bool> {
            self.indexing.subscribe()
        }

        fn indexing_progress(&self) -> watch::Receiver<f32> {
            self.progress.subscribe()
        }
    }

    #[derive(Default)]
    struct TestUserData {
        starts: AtomicUsize,
    }

    impl UserDataSyncPort for TestUserData {
        fn start(&self) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        engine: SyncEngine,
        client: Arc<MockApiClient>,
        storage: Arc<TestStorage>,
        indexer: Arc<TestIndexer>,
        user_data: Arc<TestUserData>,
    }

    fn harness(client: MockApiClient) -> Harness {
        let client = Arc::new(client);
        let storage = Arc::new(TestStorage::default());
        let indexer = Arc::new(TestIndexer::new());
        let user_data = Arc::new(TestUserData::default());
        let engine = SyncEngine::new(
            Arc::clone(&storage) as Arc<dyn StoragePort>,
            Arc::clone(&client) as Arc<dyn ApiClientPort>,
            Arc::clone(&indexer) as Arc<dyn TranscriptIndexerPort>,
            Some(Arc::clone(&user_data) as Arc<dyn UserDataSyncPort>),
            MainQueue::spawn(),
        );
        Harness {
            engine,
            client,
            storage,
            indexer,
            user_data,
        }
    }

    async fn next_event(rx: &mut broadcast::Receiver<SyncEvent>) -> SyncEvent {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timed out waiting for sync event")
            .expect("event channel closed")
    }

    async fn wait_until(cond: impl Fn() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met in time");
    }

    #[tokio::test]
    async fn test_content_success_chains_featured_sections() {
        let h = harness(MockApiClient::with_delay(1));
        let mut rx = h.engine.subscribe();

        h.engine.sync_content();

        let first = next_event(&mut rx).await;
        assert!(matches!(first, SyncEvent::SessionsAndScheduleSynced { .. }));
        assert!(first.is_success());

        let second = next_event(&mut rx).await;
        assert!(matches!(second, SyncEvent::FeaturedSectionsSynced { .. }));
        assert!(second.is_success());

        assert_eq!(h.client.content_fetches(), 1);
        assert_eq!(h.client.featured_fetches(), 1);
        assert!(!h.storage.content().await.sessions.is_empty());
        assert!(!h.storage.featured_sections().await.is_empty());
    }

    #[tokio::test]
    async fn test_content_store_error_suppresses_featured_sections() {
        let h = harness(MockApiClient::with_delay(1));
        h.storage.fail_content.store(true, Ordering::SeqCst);
        let mut rx = h.engine.subscribe();

        h.engine.sync_content();

        let event = next_event(&mut rx).await;
        assert!(matches!(event, SyncEvent::SessionsAndScheduleSynced { .. }));
        assert!(matches!(event.error(), Some(DomainError::Storage(_))));

        let more = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(more.is_err(), "no further event expected after a failed store");
        assert_eq!(h.client.featured_fetches(), 0);
    }

    #[tokio::test]
    async fn test_fetch_error_surfaces_in_event_payload() {
        let h = harness(MockApiClient::with_delay(1).failing_content("offline"));
        let mut rx = h.engine.subscribe();

        h.engine.sync_content();

        let event = next_event(&mut rx).await;
        assert!(matches!(event.error(), Some(DomainError::Client(msg)) if msg == "offline"));
        assert_eq!(h.client.featured_fetches(), 0);
    }

    #[tokio::test]
    async fn test_featured_sections_error_is_reported() {
        let h = harness(MockApiClient::with_delay(1));
        h.storage.fail_featured.store(true, Ordering::SeqCst);
        let mut rx = h.engine.subscribe();

        h.engine.sync_featured_sections();

        let event = next_event(&mut rx).await;
        assert!(matches!(event, SyncEvent::FeaturedSectionsSynced { .. }));
        assert!(event.error().is_some());
    }

    #[tokio::test]
    async fn test_featured_sections_fetch_error_is_reported() {
        let h = harness(MockApiClient::with_delay(1).failing_featured_sections("503"));
        let mut rx = h.engine.subscribe();

        h.engine.sync_featured_sections();

        let event = next_event(&mut rx).await;
        assert!(matches!(event, SyncEvent::FeaturedSectionsSynced { .. }));
        assert!(matches!(event.error(), Some(DomainError::Client(msg)) if msg == "503"));
        assert_eq!(h.client.featured_fetches(), 1);
        assert!(h.storage.featured_sections().await.is_empty());
    }

    #[tokio::test]
    async fn test_content_synced_starts_indexing_and_user_data() {
        let h = harness(MockApiClient::with_delay(1));
        let mut rx = h.engine.subscribe();

        h.engine.sync_content();
        next_event(&mut rx).await;

        let indexer = Arc::clone(&h.indexer);
        wait_until(move || indexer.starts.load(Ordering::SeqCst) == 1).await;
        assert!(!h.indexer.ignored_cache.load(Ordering::SeqCst));
        let user_data = Arc::clone(&h.user_data);
        wait_until(move || user_data.starts.load(Ordering::SeqCst) == 1).await;
    }

    #[tokio::test]
    async fn test_live_videos_run_completion_and_publish_nothing() {
        let h = harness(MockApiClient::with_delay(1));
        let mut rx = h.engine.subscribe();
        let (tx, done) = oneshot::channel();

        h.engine.sync_live_videos(Some(Box::new(move || {
            let _ = tx.send(());
        })));

        tokio::time::timeout(Duration::from_secs(2), done)
            .await
            .expect("completion not called")
            .unwrap();
        assert_eq!(h.client.live_video_fetches(), 1);
        assert!(!h.storage.live_videos().await.is_empty());
        assert!(matches!(rx.try_recv(), Err(broadcast::error::TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_live_videos_store_error_still_completes() {
        let h = harness(MockApiClient::with_delay(1));
        h.storage.fail_live.store(true, Ordering::SeqCst);
        let (tx, done) = oneshot::channel();

        h.engine.sync_live_videos(Some(Box::new(move || {
            let _ = tx.send(());
        })));

        tokio::time::timeout(Duration::from_secs(2), done)
            .await
            .expect("completion not called")
            .unwrap();
        assert!(h.storage.live_videos().await.is_empty());
    }

    #[tokio::test]
    async fn test_transcript_language_forwards_to_indexer() {
        let h = harness(MockApiClient::with_delay(1));
        assert_eq!(h.engine.transcript_language(), "en");
        h.engine.set_transcript_language("pt-BR");
        assert_eq!(h.indexer.transcript_language(), "pt-BR");
        assert!(!*h.engine.is_indexing_transcripts().borrow());
    }

    #[tokio::test]
    async fn test_dropping_engine_closes_subscribers() {
        let h = harness(MockApiClient::with_delay(1));
        let mut rx = h.engine.subscribe();
        drop(h.engine);
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
    }
}
