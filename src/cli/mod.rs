//! # CLI Module
//!
//! Command implementations behind the `ytplaylist` binary.
//!
//! - [`auth`] - Obtain (or refresh) the YouTube credential and cache it
//! - [`create`] - Build a playlist from the link source file
//!
//! ## Run Flow of `create`
//!
//! ```text
//! load links ──▶ obtain credential ──▶ create playlist ──▶ insert each video ──▶ summary
//!    fatal            fatal                fatal            skip and continue
//! ```
//!
//! [`populate_playlist`] is the part between playlist creation and the
//! summary. It only depends on [`crate::youtube::playlist::PlaylistService`],
//! so it runs the same against the real API and against test doubles.
//!
//! ## Output
//!
//! Progress is streamed through the `info!`, `success!` and `warning!`
//! macros, one line per video. Fatal errors go through `error!`, which
//! terminates the process with exit code 1.

mod auth;
mod create;

pub use auth::auth;
pub use create::EXIT_PARTIAL_FAILURE;
pub use create::create;
pub use create::populate_playlist;
pub use create::print_summary;
