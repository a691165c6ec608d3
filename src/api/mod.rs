//! # API Module
//!
//! HTTP handlers for the temporary loopback server that completes the OAuth
//! authorization flow.
//!
//! - [`callback`] - Receives Google's redirect, checks the `state`, and
//!   exchanges the authorization code for a credential.

mod callback;

pub use callback::callback;
