//! CLI Command Handlers
//!
//! Each handler takes its CLI args, a ready TMDB client and Output, and
//! returns an ExitCode. `pick` goes through the same [`MovieSession`] as the
//! game, so picks never repeat within one run.

use std::path::Path;
use std::sync::Arc;

use crate::api::{TmdbClient, TmdbError};
use crate::cli::{ExitCode, Output, PickCmd, PickedMovie, PoolCmd};
use crate::config::{Config, ConfigError};
use crate::session::{MovieSession, SessionError};

// =============================================================================
// Setup
// =============================================================================

/// Load config from `path`, or the default location
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// TMDB client for the configured language and resolved API key
pub fn build_client(config: &Config, api_key: Option<&str>) -> Result<TmdbClient, ConfigError> {
    let key = config.api_key(api_key)?;
    Ok(TmdbClient::new(key).with_language(config.language.clone()))
}

/// Map a session failure to a scripting exit code
pub fn session_exit_code(error: &SessionError) -> ExitCode {
    match error {
        SessionError::Network(_) => ExitCode::NetworkError,
        SessionError::EmptyResult | SessionError::PoolExhausted { .. } => ExitCode::NoMovies,
        SessionError::NoMovie | SessionError::Busy => ExitCode::Error,
    }
}

fn tmdb_exit_code(error: &TmdbError) -> ExitCode {
    match error {
        TmdbError::InvalidResponse(_) => ExitCode::NoMovies,
        _ => ExitCode::NetworkError,
    }
}

// =============================================================================
// Pick Command
// =============================================================================

pub async fn pick_cmd(cmd: PickCmd, client: TmdbClient, config: &Config, output: &Output) -> ExitCode {
    let mut session = MovieSession::new(Arc::new(client)).with_policy(config.fetch_policy());
    let mut picked = Vec::with_capacity(cmd.count as usize);

    output.info(format!("Picking {} movie(s)...", cmd.count));

    for _ in 0..cmd.count {
        match session.fetch_movie().await {
            Ok(movie) => picked.push(PickedMovie {
                id: movie.id,
                title: movie.title.clone(),
                poster_url: movie.poster_url(),
            }),
            Err(e) => {
                return output.error(format!("Pick failed: {}", e), session_exit_code(&e));
            }
        }
    }
    session.shutdown();

    if output.json {
        if let Err(e) = output.print(&picked) {
            return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
        }
    } else {
        output.lines(picked.iter().map(|m| format!("{} [{}]", m.title, m.id)));
    }
    ExitCode::Success
}

// =============================================================================
// Pool Command
// =============================================================================

pub async fn pool_cmd(cmd: PoolCmd, client: TmdbClient, output: &Output) -> ExitCode {
    output.info(format!(
        "Fetching discover page {} (language: {})...",
        cmd.page,
        client.language()
    ));

    match client.discover(cmd.page).await {
        Ok(mut page) => {
            if page.total_pages > 0 && cmd.page > page.total_pages {
                return output.error(
                    format!(
                        "Page {} is past the last page ({})",
                        cmd.page, page.total_pages
                    ),
                    ExitCode::InvalidArgs,
                );
            }
            page.entries.truncate(cmd.limit);

            if output.json {
                if let Err(e) = output.print(&page) {
                    return output.error(format!("Failed to serialize: {}", e), ExitCode::Error);
                }
            } else {
                output.info(format!("Page {} of {}", page.page, page.total_pages));
                output.lines(&page.entries);
            }
            ExitCode::Success
        }
        Err(e) => output.error(format!("Discover failed: {}", e), tmdb_exit_code(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_exit_codes() {
        assert_eq!(
            session_exit_code(&SessionError::Network(TmdbError::Status(500))),
            ExitCode::NetworkError
        );
        assert_eq!(session_exit_code(&SessionError::EmptyResult), ExitCode::NoMovies);
        assert_eq!(
            session_exit_code(&SessionError::PoolExhausted { refills: 3 }),
            ExitCode::NoMovies
        );
        assert_eq!(session_exit_code(&SessionError::Busy), ExitCode::Error);
    }

    #[test]
    fn test_tmdb_exit_codes() {
        assert_eq!(
            tmdb_exit_code(&TmdbError::InvalidResponse("no title".into())),
            ExitCode::NoMovies
        );
        assert_eq!(tmdb_exit_code(&TmdbError::RateLimited), ExitCode::NetworkError);
    }

    #[test]
    fn test_build_client_uses_flag_and_language() {
        let config = Config {
            language: "ta".into(),
            ..Config::default()
        };
        let client = build_client(&config, Some("flag-key")).unwrap();
        assert_eq!(client.language(), "ta");
    }

    #[test]
    fn test_load_config_from_missing_path_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("none.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
