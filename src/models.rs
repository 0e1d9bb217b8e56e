//! Data structures shared across reeltimer
//!
//! - **Catalog**: TMDB discover entries and resolved movies
//! - **Notifications**: toast messages raised by the session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default TMDB image host
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org";

/// Poster size segment used for every poster URL
pub const POSTER_SIZE: &str = "w500";

/// Stable TMDB movie identifier
pub type MovieId = u64;

// =============================================================================
// Catalog Models (TMDB)
// =============================================================================

/// One entry of a discover page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoverEntry {
    pub id: MovieId,
    pub title: String,
    pub year: Option<u16>,
    pub poster_path: Option<String>,
    pub vote_average: f32,
}

impl fmt::Display for DiscoverEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let year_str = self.year.map(|y| format!(" ({})", y)).unwrap_or_default();
        write!(f, "{}{} [{}]", self.title, year_str, self.id)
    }
}

/// A discover page: the candidate pool for one query page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoverPage {
    pub page: u32,
    pub total_pages: u32,
    pub entries: Vec<DiscoverEntry>,
}

impl DiscoverPage {
    /// Ids in page order
    pub fn ids(&self) -> Vec<MovieId> {
        self.entries.iter().map(|e| e.id).collect()
    }
}

/// The movie currently on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
}

impl Movie {
    /// Full poster URL on the default image host
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|path| poster_url(IMAGE_BASE_URL, path))
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// Build `{base}/t/p/w500{poster_path}`
pub fn poster_url(base: &str, poster_path: &str) -> String {
    format!(
        "{}/t/p/{}{}",
        base.trim_end_matches('/'),
        POSTER_SIZE,
        poster_path
    )
}

// =============================================================================
// Notification Models
// =============================================================================

/// Toast severity. Every notice the game raises is destructive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Destructive,
}

/// A transient user-visible message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    /// Raised when every pooled movie has been shown
    pub fn exhausted() -> Self {
        Self::destructive(
            "No more movies!",
            "You've gone through all available movies. Resetting list.",
        )
    }

    /// Raised when a fetch fails
    pub fn fetch_failed() -> Self {
        Self::destructive("Error", "Failed to fetch a movie. Please try again.")
    }

    /// Raised when the countdown reaches zero
    pub fn times_up() -> Self {
        Self::destructive(
            "Time's up!",
            "5 minutes have passed. Ready for the next movie?",
        )
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.description)
    }
}
