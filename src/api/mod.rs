//! # API Module
//!
//! HTTP handlers of the local listener that captures the OAuth redirect.
//!
//! ## Endpoints
//!
//! - `/` - [`index`] redirects the browser to the Spotify consent screen.
//! - `/callback/q` - [`callback`] takes the `code` (or `error`) query
//!   parameter, hands it to the waiting caller and stops the listener.
//!   Only the first redirect of an activation is accepted.
//! - `/shutdown` - [`shutdown`] stops the listener without a code.
//!
//! The handlers share a [`CallbackState`] through an axum `Extension`. See
//! [`crate::server`] for how a listener is started and awaited.

mod callback;

pub use callback::{CallbackOutcome, CallbackParams, CallbackState, callback, index, shutdown};
