//! # YouTube Integration Module
//!
//! The layer between the playlist run and Google's services.
//!
//! ```text
//! cli::create (batch run)
//!          ↓
//! youtube
//!     ├── auth      Google OAuth 2.0 (PKCE, loopback redirect, refresh)
//!     └── playlist  YouTube Data API v3 (playlists.insert, playlistItems.insert)
//!          ↓
//! reqwest
//! ```
//!
//! Both submodules expose a trait at the seam ([`auth::Authorizer`],
//! [`playlist::PlaylistService`]) next to the production implementation, so
//! the credential logic and the batch run can be exercised without Google.
//!
//! ## Error Types
//!
//! - Authorization, refresh and playlist creation return [`crate::Res`];
//!   callers treat these as fatal.
//! - Inserting a video never fails; it reports a
//!   [`crate::types::InsertOutcome`] instead.

pub mod auth;
pub mod playlist;
