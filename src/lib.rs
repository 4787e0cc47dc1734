//! Spotify Listening History ETL Library
//!
//! This library pulls the recently played tracks of a Spotify account, enriches
//! them with artist metadata and audio features, and loads the result into a
//! normalized SQLite database. Repeated runs over overlapping time windows never
//! produce duplicate rows: every table is keyed by a natural key and loaded with
//! insert-or-ignore semantics.
//!
//! # Modules
//!
//! - `api` - HTTP handlers of the one-shot local OAuth callback listener
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `db` - SQLite schema and the idempotent loader
//! - `error` - Crate-wide error type
//! - `etl` - Normalization, validation and the run pipeline
//! - `management` - Persisted credential record
//! - `server` - Local HTTP server awaiting the OAuth redirect
//! - `spotify` - Token grants and Spotify Web API calls
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use sporlhist::{config, cli};
//!
//! #[tokio::main]
//! async fn main() -> sporlhist::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     cli::run(&config, None, None).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod etl;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

pub use error::{Error, ValidationError};

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation of the library reports a [`Error`], whose
/// variants tell fatal failures (authentication, validation, load integrity)
/// apart from the ones a run recovers from.
///
/// # Example
///
/// ```
/// use sporlhist::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, Error>;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Fetching recently played tracks...");
/// info!("Found {} plays", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Loaded {} plays", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only the binary uses this macro. Library code returns [`Error`] instead so
/// that callers decide how a run ends.
///
/// # Example
///
/// ```
/// error!("Failed to load configuration");
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// # Example
///
/// ```
/// warning!("Failed to open browser, please open the URL manually");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
