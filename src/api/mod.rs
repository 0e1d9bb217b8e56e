//! API clients for external services
//!
//! - TMDB: discover pages and movie details

pub mod tmdb;

use async_trait::async_trait;

use crate::models::{DiscoverPage, Movie, MovieId};

pub use tmdb::{TmdbClient, TmdbError};

/// Source of candidate movies and their display details
#[async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Fetch one discover page
    async fn discover(&self, page: u32) -> Result<DiscoverPage, TmdbError>;

    /// Resolve a movie id into display details
    async fn movie(&self, id: MovieId) -> Result<Movie, TmdbError>;

    /// Whether the poster at `poster_path` can be loaded
    async fn poster_available(&self, _poster_path: &str) -> bool {
        true
    }
}
