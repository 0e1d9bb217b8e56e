//! Movie session controller
//!
//! Owns the selection store, the current movie, the loading flag and the
//! countdown. Network work is handed out as [`FetchJob`]s and committed back
//! with [`MovieSession::finish_fetch`], so the caller decides whether it runs
//! inline or on a background task.

pub mod countdown;
pub mod fetch;
pub mod selection;
pub mod sinks;

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{MovieCatalog, TmdbError};
use crate::models::{Movie, MovieId, Notification};

pub use countdown::{Countdown, Tick, TickOutcome, TimerPhase, COUNTDOWN_SECS};
pub use fetch::{FetchJob, FetchOutcome, FetchPolicy, PoolFill};
pub use selection::{PoolStatus, SelectionStore};
pub use sinks::{AlarmSink, NotificationSink};

/// Session error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Network error: {0}")]
    Network(TmdbError),

    #[error("No movie results found")]
    EmptyResult,

    #[error("Every candidate was already shown after {refills} refills")]
    PoolExhausted { refills: u32 },

    #[error("No movie is displayed")]
    NoMovie,

    #[error("A movie is already loading")]
    Busy,
}

/// The movie game session
pub struct MovieSession {
    catalog: Arc<dyn MovieCatalog>,
    store: SelectionStore,
    current: Option<Movie>,
    loading: bool,
    countdown: Countdown,
    rng: StdRng,
    policy: FetchPolicy,
    notifier: Box<dyn NotificationSink>,
    alarm: Box<dyn AlarmSink>,
}

impl std::fmt::Debug for MovieSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MovieSession")
            .field("store", &self.store)
            .field("current", &self.current)
            .field("loading", &self.loading)
            .field("countdown", &self.countdown)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl MovieSession {
    /// Session with tracing-only notifications and a silent alarm
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self {
            catalog,
            store: SelectionStore::new(),
            current: None,
            loading: false,
            countdown: Countdown::new(),
            rng: StdRng::from_os_rng(),
            policy: FetchPolicy::default(),
            notifier: Box::new(sinks::TracingNotifier),
            alarm: Box::new(sinks::SilentAlarm),
        }
    }

    pub fn with_notifier(mut self, notifier: impl NotificationSink + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_alarm(mut self, alarm: impl AlarmSink + 'static) -> Self {
        self.alarm = Box::new(alarm);
        self
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_store(mut self, store: SelectionStore) -> Self {
        self.store = store;
        self
    }

    /// Schedule real one-second ticks onto `ticks` while running
    pub fn with_ticks(mut self, ticks: UnboundedSender<Tick>) -> Self {
        self.countdown = Countdown::with_ticks(ticks);
        self
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn current(&self) -> Option<&Movie> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn remaining(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn timer_phase(&self) -> TimerPhase {
        self.countdown.phase()
    }

    pub fn is_timer_running(&self) -> bool {
        self.countdown.is_running()
    }

    pub fn catalog(&self) -> Arc<dyn MovieCatalog> {
        Arc::clone(&self.catalog)
    }

    // -------------------------------------------------------------------------
    // Fetching
    // -------------------------------------------------------------------------

    /// Start a "get movie" request. Sets the loading flag.
    pub fn begin_fetch(&mut self) -> Result<FetchJob, SessionError> {
        if self.loading {
            return Err(SessionError::Busy);
        }
        self.loading = true;

        Ok(FetchJob::new(
            Arc::clone(&self.catalog),
            self.store.clone(),
            StdRng::from_rng(&mut self.rng),
            self.policy,
        ))
    }

    /// Start a skip: only valid while a movie is displayed
    pub fn begin_skip(&mut self) -> Result<FetchJob, SessionError> {
        if self.current.is_none() {
            return Err(SessionError::NoMovie);
        }
        self.begin_fetch()
    }

    /// Commit a finished job: store, notices, then movie + timer reset.
    /// On failure the previous movie stays on screen.
    pub fn finish_fetch(&mut self, outcome: FetchOutcome) -> Result<&Movie, SessionError> {
        self.loading = false;
        self.store = outcome.store;
        for notice in outcome.notices {
            self.notifier.notify(notice);
        }

        match outcome.result {
            Ok(movie) => {
                self.countdown.reset();
                let movie: &Movie = self.current.insert(movie);
                Ok(movie)
            }
            Err(e) => {
                tracing::error!(error = %e, "error fetching movie");
                self.notifier.notify(Notification::fetch_failed());
                Err(e)
            }
        }
    }

    /// Fetch inline (CLI and tests)
    pub async fn fetch_movie(&mut self) -> Result<&Movie, SessionError> {
        let job = self.begin_fetch()?;
        let outcome = job.run().await;
        self.finish_fetch(outcome)
    }

    /// Skip inline; refused when nothing is displayed
    pub async fn skip(&mut self) -> Result<&Movie, SessionError> {
        let job = self.begin_skip()?;
        let outcome = job.run().await;
        self.finish_fetch(outcome)
    }

    /// Start-up fill of page 1 while the pool is still empty
    pub fn prefill_job(&self) -> Option<PoolFill> {
        (self.store.status() == PoolStatus::Empty).then(|| PoolFill::new(self.catalog()))
    }

    pub fn apply_prefill(&mut self, result: Result<Vec<MovieId>, SessionError>) {
        match result {
            Ok(ids) if self.store.status() == PoolStatus::Empty => {
                tracing::debug!(count = ids.len(), "pool prefilled");
                self.store.replace_pool(ids);
            }
            Ok(_) => tracing::debug!("pool already filled, prefill dropped"),
            Err(e) => tracing::warn!(error = %e, "error fetching movie ids"),
        }
    }

    /// Clear the poster of the displayed movie after a failed load
    pub fn poster_failed(&mut self, id: MovieId) {
        if let Some(movie) = self.current.as_mut().filter(|m| m.id == id) {
            tracing::debug!(id, "poster unavailable, falling back to text");
            movie.poster_path = None;
        }
    }

    // -------------------------------------------------------------------------
    // Timer
    // -------------------------------------------------------------------------

    /// Pause or resume; does nothing without a displayed movie
    pub fn toggle_timer(&mut self) -> bool {
        if self.current.is_none() {
            return false;
        }
        if self.countdown.is_running() {
            self.countdown.pause()
        } else {
            self.countdown.resume()
        }
    }

    /// Apply a scheduled tick; fires the alarm on expiry
    pub fn on_tick(&mut self, tick: Tick) -> TickOutcome {
        let outcome = self.countdown.on_tick(tick);
        if outcome == TickOutcome::Expired {
            self.expire();
        }
        outcome
    }

    /// Manual tick for the current generation
    pub fn tick(&mut self) -> TickOutcome {
        let outcome = self.countdown.tick();
        if outcome == TickOutcome::Expired {
            self.expire();
        }
        outcome
    }

    /// Cancel any pending tick (unmount)
    pub fn shutdown(&mut self) {
        self.countdown.stop();
    }

    fn expire(&mut self) {
        tracing::info!("countdown expired");
        self.alarm.ring();
        self.notifier.notify(Notification::times_up());
    }
}
