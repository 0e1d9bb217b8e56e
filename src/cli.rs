//! CLI - Command Line Interface for reeltimer
//!
//! Run without a subcommand for the interactive game. Subcommands expose the
//! movie picker for scripting; their output is JSON-parseable.
//!
//! # Examples
//!
//! ```bash
//! # Pick three movies that don't repeat
//! reeltimer pick --count 3 --json
//!
//! # Show one discover page
//! reeltimer pool --page 4
//! ```

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::PathBuf;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Invalid arguments
    InvalidArgs = 2,
    /// Network error
    NetworkError = 3,
    /// No usable movies in the response
    NoMovies = 4,
    /// Missing or unreadable configuration
    ConfigError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// reeltimer - a random Hindi movie and five minutes on the clock
///
/// Run without arguments to launch the interactive game.
/// Use subcommands for scripting.
#[derive(Parser, Debug)]
#[command(
    name = "reeltimer",
    version,
    about = "A random Hindi movie and five minutes on the clock",
    long_about = "Fetches a random Hindi-language movie from TMDB and starts a \
                  five minute countdown. Skip to a new movie or let the timer \
                  run out.\n\n\
                  Run without arguments to launch the interactive game.\n\
                  Use subcommands for scripting.",
    after_help = "EXAMPLES:\n\
                  reeltimer                       Launch the game\n\
                  reeltimer pick -n 3 --json      Pick three movies\n\
                  reeltimer pool --page 2         List a discover page"
)]
pub struct Cli {
    /// Output format as JSON (default for non-TTY)
    #[arg(long, short = 'j', global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// TMDB API key (overrides TMDB_API_KEY and the config file)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Don't sound the alarm when the countdown expires
    #[arg(long, global = true)]
    pub no_alarm: bool,

    /// Subcommand to run (omit for TUI mode)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Check if running in CLI mode (has subcommand)
    pub fn is_cli_mode(&self) -> bool {
        self.command.is_some()
    }

    /// Check if JSON output should be used
    pub fn should_json(&self) -> bool {
        self.json || !std::io::stdout().is_terminal()
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pick random movies without repeats
    #[command(visible_alias = "p")]
    Pick(PickCmd),

    /// List one discover page
    Pool(PoolCmd),
}

/// Pick random movies through the same selection logic as the game
#[derive(Args, Debug)]
pub struct PickCmd {
    /// Number of movies to pick
    #[arg(long, short = 'n', default_value = "1", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub count: u32,
}

/// List the movies on one discover page
#[derive(Args, Debug)]
pub struct PoolCmd {
    /// Page number (1-based)
    #[arg(long, short = 'p', default_value = "1", value_parser = clap::value_parser!(u32).range(1..=500))]
    pub page: u32,

    /// Maximum number of results
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,
}

// =============================================================================
// JSON Output Types
// =============================================================================

/// Generic JSON output wrapper with status
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonOutput<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "is_zero")]
    pub exit_code: i32,
}

fn is_zero(n: &i32) -> bool {
    *n == 0
}

impl<T: Serialize> JsonOutput<T> {
    /// Create success output with data
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            error: None,
            exit_code: 0,
        }
    }

    /// Create error output (no data)
    pub fn error_msg(msg: impl Into<String>, code: ExitCode) -> JsonOutput<()> {
        JsonOutput::<()> {
            data: None,
            error: Some(msg.into()),
            exit_code: code.into(),
        }
    }
}

/// A picked movie as printed by `pick`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickedMovie {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
}

// =============================================================================
// Output Helpers
// =============================================================================

/// Output handler for consistent formatting
pub struct Output {
    pub json: bool,
    pub quiet: bool,
}

impl Output {
    pub fn new(cli: &Cli) -> Self {
        Self {
            json: cli.should_json(),
            quiet: cli.quiet,
        }
    }

    /// Print success data
    pub fn print<T: Serialize>(&self, data: T) -> anyhow::Result<()> {
        if self.json {
            let output = JsonOutput::success(data);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", serde_json::to_string_pretty(&data)?);
        }
        Ok(())
    }

    /// Print plain lines (ignored in JSON mode)
    pub fn lines<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: std::fmt::Display,
    {
        if !self.json {
            for line in lines {
                println!("{}", line);
            }
        }
    }

    /// Print error and return exit code
    pub fn error(&self, msg: impl Into<String>, code: ExitCode) -> ExitCode {
        let msg = msg.into();
        if self.json {
            let output = JsonOutput::<()>::error_msg(&msg, code);
            if let Ok(json) = serde_json::to_string_pretty(&output) {
                eprintln!("{}", json);
            }
        } else if !self.quiet {
            eprintln!("Error: {}", msg);
        }
        code
    }

    /// Print info message (suppressed in quiet mode)
    pub fn info(&self, msg: impl std::fmt::Display) {
        if !self.quiet && !self.json {
            eprintln!("{}", msg);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_args_is_tui_mode() {
        let cli = Cli::parse_from(["reeltimer"]);
        assert!(!cli.is_cli_mode());
    }

    #[test]
    fn test_pick_command() {
        let cli = Cli::parse_from(["reeltimer", "pick", "-n", "3"]);
        match cli.command {
            Some(Command::Pick(cmd)) => assert_eq!(cmd.count, 3),
            other => panic!("Expected Pick command, got {:?}", other),
        }
    }

    #[test]
    fn test_pick_defaults_to_one() {
        let cli = Cli::parse_from(["reeltimer", "p"]);
        match cli.command {
            Some(Command::Pick(cmd)) => assert_eq!(cmd.count, 1),
            other => panic!("Expected Pick command, got {:?}", other),
        }
    }

    #[test]
    fn test_pick_count_zero_rejected() {
        assert!(Cli::try_parse_from(["reeltimer", "pick", "-n", "0"]).is_err());
    }

    #[test]
    fn test_pool_command() {
        let cli = Cli::parse_from(["reeltimer", "pool", "--page", "4", "-l", "5"]);
        match cli.command {
            Some(Command::Pool(cmd)) => {
                assert_eq!(cmd.page, 4);
                assert_eq!(cmd.limit, 5);
            }
            other => panic!("Expected Pool command, got {:?}", other),
        }
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from([
            "reeltimer",
            "--json",
            "--quiet",
            "--api-key",
            "k",
            "--no-alarm",
            "pool",
        ]);
        assert!(cli.json);
        assert!(cli.quiet);
        assert!(cli.no_alarm);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(i32::from(ExitCode::Success), 0);
        assert_eq!(i32::from(ExitCode::Error), 1);
        assert_eq!(i32::from(ExitCode::InvalidArgs), 2);
        assert_eq!(i32::from(ExitCode::NetworkError), 3);
        assert_eq!(i32::from(ExitCode::NoMovies), 4);
        assert_eq!(i32::from(ExitCode::ConfigError), 5);
    }

    #[test]
    fn test_json_error_output_shape() {
        let out = JsonOutput::<()>::error_msg("boom", ExitCode::NetworkError);
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["error"], "boom");
        assert_eq!(json["exit_code"], 3);
        assert!(json.get("data").is_none());
    }
}
