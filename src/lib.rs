//! reeltimer - a random Hindi movie and five minutes on the clock
//!
//! Fetches random Hindi-language movies from TMDB without repeating one,
//! and runs a five minute countdown per movie that can be paused, resumed
//! or reset by skipping.
//!
//! # Modules
//!
//! - `models` - Discover entries, movies, notifications
//! - `api` - TMDB client and the [`api::MovieCatalog`] seam
//! - `session` - Selection store, fetch orchestration, countdown
//! - `ui` - TUI rendering
//! - `app` - TUI state and key handling
//! - `cli` / `commands` - scripting subcommands

pub mod api;
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;
pub mod session;
pub mod ui;

// Re-export commonly used types
pub use models::{DiscoverEntry, DiscoverPage, Movie, MovieId, Notification, Severity};

pub use api::{MovieCatalog, TmdbClient, TmdbError};
pub use app::{App, AppEvent, KeyResult};
pub use config::{Config, ConfigError};
pub use session::{MovieSession, PoolStatus, SelectionStore, SessionError, TimerPhase};
