//! # Spotify Integration Module
//!
//! Everything that talks to Spotify: the OAuth token grants and the three
//! read-only Web API resources a sync run needs.
//!
//! ## Core Modules
//!
//! - [`auth`] - Authorization-code and refresh-token grants, and the
//!   [`AuthFlow`] state machine that hands out valid access tokens:
//!
//! ```text
//! NoCode -> CodeObtained -> TokenIssued(valid) <-> TokenIssued(expired)
//!                                  ^                      |
//!                                  +----- Refreshing <----+
//! ```
//!
//! - [`client`] - The [`SpotifyApi`] trait and its reqwest implementation for
//!   `me/player/recently-played`, `artists/{id}` and `audio-features/{id}`.
//! - [`fetch`] - Deduplicated per-id enrichment with failure isolation: one
//!   id that cannot be fetched never drops the data of the others, a rejected
//!   token aborts the run.
//!
//! ## Authentication
//!
//! The token endpoint is called with `Authorization: Basic
//! base64(client_id:client_secret)`. A non-2xx answer on either grant ends the
//! run with [`crate::Error::Auth`], which carries the provider's error body.

pub mod auth;
pub mod client;
pub mod fetch;

pub use auth::{AuthFlow, AuthState, CodeSource, SpotifyTokenClient, TokenEndpoint};
pub use client::{SpotifyApi, SpotifyClient};
pub use fetch::RetryPolicy;
