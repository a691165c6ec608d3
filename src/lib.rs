//! YouTube Playlist Builder Library
//!
//! This library turns a list of YouTube links into a playlist on the
//! authenticated user's account. It covers link loading and video ID
//! extraction, the OAuth 2.0 authorization flow with a cached credential,
//! the two YouTube Data API calls involved, and the batch run that ties them
//! together.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local OAuth callback server
//! - `cli` - Command implementations driven by `main`
//! - `config` - Configuration loaded once at start
//! - `links` - Link source loading and video ID extraction
//! - `management` - Credential cache management
//! - `server` - Local HTTP server for OAuth callbacks
//! - `youtube` - YouTube Data API and Google OAuth client
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod config;
pub mod links;
pub mod management;
pub mod server;
pub mod types;
pub mod utils;
pub mod youtube;

/// A convenient Result type alias for operations that may fail.
///
/// Boxed dynamic error with Send + Sync bounds so errors can cross await
/// points and task boundaries.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// info!("Loaded {} links from {}", links.len(), path.display());
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
/// Accepts the same arguments as `println!`.
///
/// # Example
///
/// ```
/// success!("Added video: https://youtu.be/{}", video_id);
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
/// Terminates with exit code 1 right after printing. Only for fatal errors
/// that end the run.
///
/// # Example
///
/// ```
/// error!("Failed to create playlist: {}", e);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, such as a link that gets skipped.
///
/// # Example
///
/// ```
/// warning!("[SKIP] Video not found (404): {}", link);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
