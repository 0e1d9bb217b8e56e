//! Fetch orchestration: keep the pool stocked, pick, resolve
//!
//! A [`FetchJob`] works on a snapshot of the selection store so it can run on
//! a background task while the UI keeps ticking. Its [`FetchOutcome`] carries
//! the updated store back for the session to commit.

use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;

use super::selection::{PoolStatus, SelectionStore};
use super::SessionError;
use crate::api::{MovieCatalog, TmdbError};
use crate::models::{Movie, MovieId, Notification};

/// Refill policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    /// Highest discover page to draw from (pages are 1-based)
    pub max_page: u32,
    /// Refills allowed within one fetch before giving up
    pub max_refills: u32,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            max_page: 10,
            max_refills: 3,
        }
    }
}

/// Everything a finished fetch hands back to the session
#[derive(Debug)]
pub struct FetchOutcome {
    /// Store after refills, clears and marking
    pub store: SelectionStore,
    /// Notifications raised along the way (exhaustion)
    pub notices: Vec<Notification>,
    pub result: Result<Movie, SessionError>,
}

/// One "get movie" request, detached from the session
pub struct FetchJob {
    catalog: Arc<dyn MovieCatalog>,
    store: SelectionStore,
    rng: StdRng,
    policy: FetchPolicy,
}

impl std::fmt::Debug for FetchJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchJob")
            .field("store", &self.store)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl FetchJob {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        store: SelectionStore,
        rng: StdRng,
        policy: FetchPolicy,
    ) -> Self {
        Self {
            catalog,
            store,
            rng,
            policy,
        }
    }

    /// Ensure the pool, pick an unused id, resolve it
    pub async fn run(mut self) -> FetchOutcome {
        let mut notices = Vec::new();
        let result = self.pick_and_resolve(&mut notices).await;
        FetchOutcome {
            store: self.store,
            notices,
            result,
        }
    }

    async fn pick_and_resolve(
        &mut self,
        notices: &mut Vec<Notification>,
    ) -> Result<Movie, SessionError> {
        self.ensure_pool(notices).await?;

        let id = self
            .store
            .pick_unused(&mut self.rng)
            .ok_or(SessionError::PoolExhausted {
                refills: self.policy.max_refills,
            })?;

        let movie = self.resolve(id).await?;
        self.store.mark_used(id);
        tracing::info!(id, title = %movie.title, "picked movie");
        Ok(movie)
    }

    /// Guarantee at least one unused id in the pool, refilling at most
    /// `max_refills` times.
    pub async fn ensure_pool(
        &mut self,
        notices: &mut Vec<Notification>,
    ) -> Result<(), SessionError> {
        let mut refills = 0;
        loop {
            match self.store.status() {
                PoolStatus::Ready => return Ok(()),
                PoolStatus::Exhausted => {
                    tracing::info!(
                        shown = self.store.used().len(),
                        "pool exhausted, resetting used set"
                    );
                    notices.push(Notification::exhausted());
                    self.store.clear_used();
                }
                PoolStatus::Empty => {}
            }

            if refills >= self.policy.max_refills {
                return Err(SessionError::PoolExhausted { refills });
            }
            refills += 1;
            self.refill().await?;
        }
    }

    async fn refill(&mut self) -> Result<(), SessionError> {
        let page = self.rng.random_range(1..=self.policy.max_page.max(1));
        tracing::debug!(page, "refilling pool");

        let ids = fetch_ids(self.catalog.as_ref(), page).await?;
        self.store.replace_pool(ids);
        Ok(())
    }

    async fn resolve(&self, id: MovieId) -> Result<Movie, SessionError> {
        Ok(self.catalog.movie(id).await?)
    }
}

/// Start-up pool fill (page 1), applied only to a still-empty pool
pub struct PoolFill {
    catalog: Arc<dyn MovieCatalog>,
    page: u32,
}

impl PoolFill {
    pub fn new(catalog: Arc<dyn MovieCatalog>) -> Self {
        Self { catalog, page: 1 }
    }

    pub async fn run(self) -> Result<Vec<MovieId>, SessionError> {
        fetch_ids(self.catalog.as_ref(), self.page).await
    }
}

async fn fetch_ids(catalog: &dyn MovieCatalog, page: u32) -> Result<Vec<MovieId>, SessionError> {
    let page = catalog.discover(page).await.map_err(SessionError::from)?;
    let ids = page.ids();
    if ids.is_empty() {
        return Err(SessionError::EmptyResult);
    }
    Ok(ids)
}

impl From<TmdbError> for SessionError {
    fn from(err: TmdbError) -> Self {
        match err {
            // A malformed body is as unusable as an empty one
            TmdbError::InvalidResponse(_) => SessionError::EmptyResult,
            other => SessionError::Network(other),
        }
    }
}
