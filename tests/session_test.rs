//! MovieSession tests against an in-memory catalog
//!
//! Covers pool refills, no-repeat selection, exhaustion, skip, failures and
//! the countdown lifecycle.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use reeltimer::api::{MovieCatalog, TmdbError};
use reeltimer::models::{DiscoverEntry, DiscoverPage, Movie, MovieId, Notification};
use reeltimer::session::sinks::{AlarmCounter, NotificationLog};
use reeltimer::session::{
    FetchPolicy, MovieSession, PoolStatus, SelectionStore, SessionError, TickOutcome, TimerPhase,
    COUNTDOWN_SECS,
};

// =============================================================================
// Fake Catalog
// =============================================================================

/// Serves the same ids on every discover page
#[derive(Default)]
struct FakeCatalog {
    ids: Vec<MovieId>,
    failing: Mutex<HashSet<MovieId>>,
    discover_down: bool,
    discover_calls: AtomicUsize,
    movie_calls: AtomicUsize,
}

impl FakeCatalog {
    fn with_ids(ids: &[MovieId]) -> Self {
        Self {
            ids: ids.to_vec(),
            ..Self::default()
        }
    }

    fn fail_movie(&self, id: MovieId) {
        self.failing.lock().unwrap().insert(id);
    }

    fn discover_calls(&self) -> usize {
        self.discover_calls.load(Ordering::SeqCst)
    }

    fn movie_calls(&self) -> usize {
        self.movie_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieCatalog for FakeCatalog {
    async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError> {
        self.discover_calls.fetch_add(1, Ordering::SeqCst);
        if self.discover_down {
            return Err(TmdbError::Status(503));
        }
        Ok(DiscoverPage {
            page,
            total_pages: 10,
            entries: self
                .ids
                .iter()
                .map(|&id| DiscoverEntry {
                    id,
                    title: format!("Movie {}", id),
                    year: None,
                    poster_path: None,
                    vote_average: 0.0,
                })
                .collect(),
        })
    }

    async fn movie(&self, id: MovieId) -> Result<Movie, TmdbError> {
        self.movie_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&id) {
            return Err(TmdbError::Status(500));
        }
        Ok(Movie {
            id,
            title: format!("Movie {}", id),
            poster_path: Some(format!("/{}.jpg", id)),
        })
    }
}

struct Harness {
    session: MovieSession,
    catalog: Arc<FakeCatalog>,
    notifications: NotificationLog,
    alarm: AlarmCounter,
}

fn harness(catalog: FakeCatalog) -> Harness {
    let catalog = Arc::new(catalog);
    let notifications = NotificationLog::new();
    let alarm = AlarmCounter::new();
    let session = MovieSession::new(catalog.clone())
        .with_notifier(notifications.clone())
        .with_alarm(alarm.clone())
        .with_rng(StdRng::seed_from_u64(7));
    Harness {
        session,
        catalog,
        notifications,
        alarm,
    }
}

fn titles(notifications: &[Notification]) -> Vec<&str> {
    notifications.iter().map(|n| n.title.as_str()).collect()
}

// =============================================================================
// Fetching
// =============================================================================

#[tokio::test]
async fn test_fetch_from_ready_pool_skips_discover() {
    let mut h = harness(FakeCatalog::with_ids(&[9, 9, 9]));
    h.session = h
        .session
        .with_store(SelectionStore::with_state(vec![1, 2, 3], vec![]));

    let id = h.session.fetch_movie().await.unwrap().id;

    assert!([1, 2, 3].contains(&id));
    assert_eq!(h.catalog.discover_calls(), 0);
    assert_eq!(h.session.store().used(), &[id]);
    assert_eq!(h.session.current().map(|m| m.id), Some(id));
    assert!(!h.session.is_loading());

    // A new movie starts a full running countdown
    assert_eq!(h.session.remaining(), COUNTDOWN_SECS);
    assert_eq!(h.session.timer_phase(), TimerPhase::Running);
}

#[tokio::test]
async fn test_first_fetch_fills_empty_pool() {
    let mut h = harness(FakeCatalog::with_ids(&[10, 11, 12]));

    let id = h.session.fetch_movie().await.unwrap().id;

    assert_eq!(h.catalog.discover_calls(), 1);
    assert_eq!(h.session.store().pool(), &[10, 11, 12]);
    assert!([10, 11, 12].contains(&id));
    assert!(h.notifications.snapshot().is_empty());
}

#[tokio::test]
async fn test_exhausted_pool_resets_and_refills_once() {
    let mut h = harness(FakeCatalog::with_ids(&[4, 5]));
    h.session = h
        .session
        .with_store(SelectionStore::with_state(vec![1], vec![1]));

    let id = h.session.fetch_movie().await.unwrap().id;

    assert!([4, 5].contains(&id));
    assert_eq!(h.catalog.discover_calls(), 1);
    assert_eq!(h.session.store().used(), &[id]);
    assert_eq!(titles(&h.notifications.snapshot()), vec!["No more movies!"]);
}

#[tokio::test]
async fn test_no_repeats_until_exhausted() {
    let ids = [21, 22, 23, 24, 25];
    let mut h = harness(FakeCatalog::with_ids(&ids));

    let mut seen = HashSet::new();
    for _ in 0..ids.len() {
        let id = h.session.fetch_movie().await.unwrap().id;
        assert!(seen.insert(id), "movie {} shown twice", id);
    }
    assert_eq!(h.session.store().status(), PoolStatus::Exhausted);
    assert!(h.notifications.snapshot().is_empty());

    // The next fetch announces exhaustion and starts over
    h.session.fetch_movie().await.unwrap();
    assert_eq!(titles(&h.notifications.snapshot()), vec!["No more movies!"]);
    assert_eq!(h.session.store().used().len(), 1);
}

#[tokio::test]
async fn test_refill_cap_ends_in_pool_exhausted() {
    let mut h = harness(FakeCatalog::with_ids(&[1]));
    h.session = h
        .session
        .with_policy(FetchPolicy {
            max_page: 10,
            max_refills: 1,
        })
        .with_store(SelectionStore::with_state(vec![], vec![1]));

    let err = h.session.fetch_movie().await.unwrap_err();

    assert!(matches!(err, SessionError::PoolExhausted { refills: 1 }));
    assert_eq!(h.catalog.discover_calls(), 1);
    assert_eq!(h.catalog.movie_calls(), 0);
    assert!(h.session.current().is_none());
    assert!(!h.session.is_loading());
    assert_eq!(
        titles(&h.notifications.snapshot()),
        vec!["No more movies!", "Error"]
    );
}

#[tokio::test]
async fn test_empty_discover_page_is_empty_result() {
    let mut h = harness(FakeCatalog::with_ids(&[]));

    let err = h.session.fetch_movie().await.unwrap_err();

    assert!(matches!(err, SessionError::EmptyResult));
    assert_eq!(h.session.store().status(), PoolStatus::Empty);
    assert_eq!(titles(&h.notifications.snapshot()), vec!["Error"]);
}

#[tokio::test]
async fn test_network_failure_keeps_previous_movie() {
    let mut h = harness(FakeCatalog::with_ids(&[1, 2]));
    h.session = h
        .session
        .with_store(SelectionStore::with_state(vec![1, 2], vec![]));

    let first = h.session.fetch_movie().await.unwrap().id;
    let other = if first == 1 { 2 } else { 1 };
    h.catalog.fail_movie(other);

    for _ in 0..3 {
        h.session.tick();
    }

    let err = h.session.skip().await.unwrap_err();
    assert!(matches!(err, SessionError::Network(TmdbError::Status(500))));

    // Previous movie and countdown untouched, failed id not marked
    assert_eq!(h.session.current().map(|m| m.id), Some(first));
    assert_eq!(h.session.remaining(), COUNTDOWN_SECS - 3);
    assert!(!h.session.store().is_used(other));
    assert!(!h.session.is_loading());
    assert_eq!(titles(&h.notifications.snapshot()), vec!["Error"]);
}

#[tokio::test]
async fn test_discover_outage_is_network_error() {
    let mut h = harness(FakeCatalog {
        discover_down: true,
        ..FakeCatalog::default()
    });

    let err = h.session.fetch_movie().await.unwrap_err();
    assert!(matches!(err, SessionError::Network(_)));
}

/// Records the discover pages it is asked for
#[derive(Default)]
struct PageRecorder {
    pages: Mutex<Vec<u32>>,
}

#[async_trait]
impl MovieCatalog for PageRecorder {
    async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError> {
        self.pages.lock().unwrap().push(page);
        Ok(DiscoverPage {
            page,
            total_pages: 500,
            entries: vec![DiscoverEntry {
                id: 1,
                title: "Only".into(),
                year: None,
                poster_path: None,
                vote_average: 0.0,
            }],
        })
    }

    async fn movie(&self, id: MovieId) -> Result<Movie, TmdbError> {
        Ok(Movie {
            id,
            title: "Only".into(),
            poster_path: None,
        })
    }
}

#[tokio::test]
async fn test_refill_pages_stay_within_max_page() {
    let catalog = Arc::new(PageRecorder::default());

    for seed in 0..100 {
        let mut session = MovieSession::new(catalog.clone())
            .with_rng(StdRng::seed_from_u64(seed))
            .with_policy(FetchPolicy {
                max_page: 10,
                max_refills: 3,
            });
        // Empty pool, then an exhausted one: two refills per session
        session.fetch_movie().await.unwrap();
        session.fetch_movie().await.unwrap();
    }

    let pages = catalog.pages.lock().unwrap().clone();
    assert_eq!(pages.len(), 200);
    assert!(pages.iter().all(|p| (1..=10).contains(p)), "pages: {:?}", pages);

    let distinct: HashSet<u32> = pages.iter().copied().collect();
    assert!(distinct.len() > 1);
}

#[tokio::test]
async fn test_single_page_policy_always_requests_page_one() {
    let catalog = Arc::new(PageRecorder::default());
    let mut session = MovieSession::new(catalog.clone()).with_policy(FetchPolicy {
        max_page: 1,
        max_refills: 3,
    });

    for _ in 0..5 {
        session.fetch_movie().await.unwrap();
    }

    let pages = catalog.pages.lock().unwrap().clone();
    assert_eq!(pages, vec![1; 5]);
}

// =============================================================================
// Skip and Busy
// =============================================================================

#[tokio::test]
async fn test_skip_without_movie_is_refused() {
    let mut h = harness(FakeCatalog::with_ids(&[1]));

    let err = h.session.skip().await.unwrap_err();

    assert!(matches!(err, SessionError::NoMovie));
    assert_eq!(h.catalog.discover_calls(), 0);
    assert!(!h.session.is_loading());
}

#[tokio::test]
async fn test_skip_shows_new_movie_and_resets_timer() {
    let mut h = harness(FakeCatalog::with_ids(&[1, 2, 3]));

    let first = h.session.fetch_movie().await.unwrap().id;
    for _ in 0..42 {
        h.session.tick();
    }
    assert_eq!(h.session.remaining(), COUNTDOWN_SECS - 42);

    let second = h.session.skip().await.unwrap().id;

    assert_ne!(first, second);
    assert_eq!(h.session.remaining(), COUNTDOWN_SECS);
    assert!(h.session.is_timer_running());
}

#[tokio::test]
async fn test_second_request_while_loading_is_busy() {
    let mut h = harness(FakeCatalog::with_ids(&[1, 2]));

    let job = h.session.begin_fetch().unwrap();
    assert!(h.session.is_loading());
    assert!(matches!(h.session.begin_fetch(), Err(SessionError::Busy)));

    let outcome = job.run().await;
    h.session.finish_fetch(outcome).unwrap();
    assert!(!h.session.is_loading());
}

// =============================================================================
// Prefill and Posters
// =============================================================================

#[tokio::test]
async fn test_prefill_only_fills_empty_pool() {
    let mut h = harness(FakeCatalog::with_ids(&[7, 8]));

    let fill = h.session.prefill_job().unwrap();
    let result = fill.run().await;
    h.session.apply_prefill(result);
    assert_eq!(h.session.store().pool(), &[7, 8]);

    // Pool no longer empty: no second prefill, and late results are dropped
    assert!(h.session.prefill_job().is_none());
    h.session.apply_prefill(Ok(vec![99]));
    assert_eq!(h.session.store().pool(), &[7, 8]);
}

#[tokio::test]
async fn test_poster_failure_falls_back_to_title() {
    let mut h = harness(FakeCatalog::with_ids(&[3]));

    let id = h.session.fetch_movie().await.unwrap().id;
    h.session.poster_failed(id + 1);
    assert!(h.session.current().unwrap().poster_path.is_some());

    h.session.poster_failed(id);
    assert!(h.session.current().unwrap().poster_path.is_none());
}

// =============================================================================
// Countdown
// =============================================================================

#[tokio::test]
async fn test_expiry_rings_alarm_once() {
    let mut h = harness(FakeCatalog::with_ids(&[1]));
    h.session.fetch_movie().await.unwrap();

    let mut expired = 0;
    for _ in 0..COUNTDOWN_SECS + 5 {
        if h.session.tick() == TickOutcome::Expired {
            expired += 1;
        }
    }

    assert_eq!(expired, 1);
    assert_eq!(h.alarm.rings(), 1);
    assert_eq!(h.session.remaining(), 0);
    assert_eq!(h.session.timer_phase(), TimerPhase::Expired);
    assert_eq!(titles(&h.notifications.snapshot()), vec!["Time's up!"]);

    // Resume at zero does nothing
    assert!(!h.session.toggle_timer());
    assert_eq!(h.session.timer_phase(), TimerPhase::Expired);
}

#[tokio::test]
async fn test_toggle_pauses_and_resumes() {
    let mut h = harness(FakeCatalog::with_ids(&[1]));
    assert!(!h.session.toggle_timer());

    h.session.fetch_movie().await.unwrap();
    h.session.tick();

    assert!(h.session.toggle_timer());
    assert_eq!(h.session.timer_phase(), TimerPhase::Idle);
    assert_eq!(h.session.tick(), TickOutcome::Ignored);
    assert_eq!(h.session.remaining(), COUNTDOWN_SECS - 1);

    assert!(h.session.toggle_timer());
    assert!(h.session.is_timer_running());
    assert_eq!(h.session.tick(), TickOutcome::Counting(COUNTDOWN_SECS - 2));
}

#[tokio::test(start_paused = true)]
async fn test_scheduled_ticks_drive_the_session() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut h = harness(FakeCatalog::with_ids(&[1, 2]));
    h.session = h.session.with_ticks(tx);

    h.session.fetch_movie().await.unwrap();
    for _ in 0..3 {
        let tick = rx.recv().await.unwrap();
        h.session.on_tick(tick);
    }
    assert_eq!(h.session.remaining(), COUNTDOWN_SECS - 3);

    // Skip restarts the cycle; ticks queued before it are stale
    tokio::time::sleep(Duration::from_millis(500)).await;
    h.session.skip().await.unwrap();
    tokio::time::sleep(Duration::from_millis(2500)).await;
    while let Ok(tick) = rx.try_recv() {
        h.session.on_tick(tick);
    }
    assert_eq!(h.session.remaining(), COUNTDOWN_SECS - 2);

    h.session.shutdown();
    assert!(!h.session.countdown().has_pending_task());
}
