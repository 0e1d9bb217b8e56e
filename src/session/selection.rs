//! Selection store: candidate pool and the set of already-shown movies

use rand::Rng;
use std::collections::HashSet;

use crate::models::MovieId;

/// Where the pool stands relative to the used set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolStatus {
    /// No pool fetched yet
    Empty,
    /// Every pooled id has been shown
    Exhausted,
    /// At least one pooled id is unused
    Ready,
}

/// Candidate pool plus insertion-ordered used set
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    pool: Vec<MovieId>,
    used: Vec<MovieId>,
    used_index: HashSet<MovieId>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a pool and used set already in place
    pub fn with_state(pool: Vec<MovieId>, used: Vec<MovieId>) -> Self {
        let mut store = Self {
            pool,
            ..Self::default()
        };
        for id in used {
            store.mark_used(id);
        }
        store
    }

    pub fn pool(&self) -> &[MovieId] {
        &self.pool
    }

    /// Used ids, oldest first
    pub fn used(&self) -> &[MovieId] {
        &self.used
    }

    pub fn is_used(&self, id: MovieId) -> bool {
        self.used_index.contains(&id)
    }

    /// Pooled ids not yet shown, in pool order
    pub fn unused(&self) -> Vec<MovieId> {
        self.pool
            .iter()
            .copied()
            .filter(|id| !self.is_used(*id))
            .collect()
    }

    pub fn status(&self) -> PoolStatus {
        if self.pool.is_empty() {
            PoolStatus::Empty
        } else if self.pool.iter().all(|id| self.is_used(*id)) {
            PoolStatus::Exhausted
        } else {
            PoolStatus::Ready
        }
    }

    /// Uniform random choice among unused ids; `None` means exhausted
    pub fn pick_unused<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<MovieId> {
        let unused = self.unused();
        if unused.is_empty() {
            return None;
        }
        Some(unused[rng.random_range(0..unused.len())])
    }

    /// Record an id as shown
    pub fn mark_used(&mut self, id: MovieId) {
        if self.used_index.insert(id) {
            self.used.push(id);
        }
    }

    pub fn clear_used(&mut self) {
        self.used.clear();
        self.used_index.clear();
    }

    /// Replace the pool wholesale (never merged)
    pub fn replace_pool(&mut self, pool: Vec<MovieId>) {
        self.pool = pool;
    }
}
