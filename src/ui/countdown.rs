//! Derived display values for the countdown and the action button

use crate::session::COUNTDOWN_SECS;

/// Format seconds as `m:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Remaining time as a percentage of a full cycle (0.0 - 100.0)
pub fn progress_percent(remaining: u32) -> f64 {
    let remaining = remaining.min(COUNTDOWN_SECS);
    remaining as f64 / COUNTDOWN_SECS as f64 * 100.0
}

/// Label of the main action button
pub fn button_label(loading: bool, has_movie: bool) -> &'static str {
    if loading {
        "Loading..."
    } else if has_movie {
        "Get New Movie"
    } else {
        "Get Movie"
    }
}
