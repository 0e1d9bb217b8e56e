//! App state and keyboard handling for the TUI
//!
//! Wraps the [`MovieSession`] with what only the terminal front end needs:
//! the running flag, toasts, and the results of background work.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

use crate::models::{MovieId, Notification};
use crate::session::sinks::NotificationLog;
use crate::session::{FetchJob, FetchOutcome, MovieSession, SessionError};

/// How long a toast stays on screen
pub const TOAST_TTL: Duration = Duration::from_secs(5);

/// Toasts shown at once
pub const MAX_TOASTS: usize = 3;

// =============================================================================
// Toasts
// =============================================================================

/// A notification with the time it was first shown
#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub notification: Notification,
    pub shown_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= TOAST_TTL
    }
}

// =============================================================================
// Background Results
// =============================================================================

/// Results delivered back to the event loop by background tasks
#[derive(Debug)]
pub enum AppEvent {
    /// A fetch job finished
    Fetched(FetchOutcome),
    /// Start-up pool fill finished
    Prefilled(Result<Vec<MovieId>, SessionError>),
    /// Poster probe finished
    Poster { id: MovieId, available: bool },
}

/// A poster the loop should check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterProbe {
    pub id: MovieId,
    pub poster_path: String,
}

/// Outcome of a key press
#[derive(Debug)]
pub enum KeyResult {
    /// Key not bound in this state
    Ignored,
    /// Handled synchronously
    Handled,
    /// Run this fetch in the background
    Fetch(FetchJob),
}

impl KeyResult {
    pub fn is_handled(&self) -> bool {
        !matches!(self, KeyResult::Ignored)
    }
}

// =============================================================================
// Main Application State
// =============================================================================

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Whether the app is running
    pub running: bool,
    /// The game session
    pub session: MovieSession,
    /// Visible toasts, oldest first
    pub toasts: Vec<Toast>,
    notifications: NotificationLog,
}

impl App {
    /// `notifications` must be the log the session notifies into
    pub fn new(session: MovieSession, notifications: NotificationLog) -> Self {
        Self {
            running: true,
            session,
            toasts: Vec::new(),
            notifications,
        }
    }

    /// Quit the application
    pub fn quit(&mut self) {
        self.running = false;
        self.session.shutdown();
    }

    /// Move new notifications into toasts and drop expired ones
    pub fn collect_notifications(&mut self, now: Instant) {
        for notification in self.notifications.drain() {
            self.toasts.push(Toast {
                notification,
                shown_at: now,
            });
        }
        self.toasts.retain(|t| !t.is_expired(now));
        if self.toasts.len() > MAX_TOASTS {
            let excess = self.toasts.len() - MAX_TOASTS;
            self.toasts.drain(..excess);
        }
    }

    pub fn dismiss_toasts(&mut self) {
        self.toasts.clear();
    }

    /// Apply a background result; may ask for a poster probe
    pub fn apply_event(&mut self, event: AppEvent) -> Option<PosterProbe> {
        match event {
            AppEvent::Fetched(outcome) => match self.session.finish_fetch(outcome) {
                Ok(movie) => movie.poster_path.clone().map(|poster_path| PosterProbe {
                    id: movie.id,
                    poster_path,
                }),
                Err(_) => None,
            },
            AppEvent::Prefilled(result) => {
                self.session.apply_prefill(result);
                None
            }
            AppEvent::Poster { id, available } => {
                if !available {
                    self.session.poster_failed(id);
                }
                None
            }
        }
    }

    // -------------------------------------------------------------------------
    // Keyboard Event Handling
    // -------------------------------------------------------------------------

    /// Handle keyboard event
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return KeyResult::Handled;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.quit();
                KeyResult::Handled
            }
            KeyCode::Char('g') | KeyCode::Enter => self.request(MovieSession::begin_fetch),
            KeyCode::Char('s') | KeyCode::Char('n') | KeyCode::Right => {
                self.request(MovieSession::begin_skip)
            }
            KeyCode::Char(' ') | KeyCode::Char('p') => {
                if self.session.current().is_none() {
                    return KeyResult::Ignored;
                }
                self.session.toggle_timer();
                KeyResult::Handled
            }
            KeyCode::Esc => {
                self.dismiss_toasts();
                KeyResult::Handled
            }
            _ => KeyResult::Ignored,
        }
    }

    fn request(
        &mut self,
        begin: fn(&mut MovieSession) -> Result<FetchJob, SessionError>,
    ) -> KeyResult {
        match begin(&mut self.session) {
            Ok(job) => KeyResult::Fetch(job),
            // Button disabled while loading
            Err(SessionError::Busy) => KeyResult::Handled,
            Err(SessionError::NoMovie) => KeyResult::Ignored,
            Err(e) => {
                tracing::warn!(error = %e, "fetch request refused");
                KeyResult::Handled
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
