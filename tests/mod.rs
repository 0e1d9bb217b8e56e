//! Integration tests for reeltimer
//!
//! Tests are organized by component:
//! - tmdb_test: TMDB client against a mock server
//! - session_test: selection, refills, skip and countdown through MovieSession
//! - ui_test: rendering against a TestBackend
//! - cli_test: subcommand handlers and exit codes

// Note: Each test file is a separate integration test crate
// Tests are run individually by cargo, not via mod.rs
