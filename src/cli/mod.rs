//! # CLI Module
//!
//! User-facing commands. Each command builds its collaborators from the
//! [`Config`], reports progress on the console and returns the first fatal
//! error to `main`.
//!
//! - [`auth`] - Obtain and store a valid access token (consent screen on
//!   first use).
//! - [`run`] - One full sync of the recently played tracks into the database.
//! - [`setup`] - Create the database and its tables.
//!
//! ## Usage Patterns
//!
//! ```bash
//! sporlhist auth                         # Authorize once
//! sporlhist run                          # Scheduled sync
//! sporlhist run --after 2024-01-01       # Only plays after a day
//! ```

mod auth;
mod run;
mod setup;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Config,
    management::CredentialStore,
    server::CallbackReceiver,
    spotify::{AuthFlow, SpotifyTokenClient},
};

pub use auth::auth;
pub use run::run;
pub use setup::setup;

pub type CliAuthFlow = AuthFlow<SpotifyTokenClient, CallbackReceiver>;

pub fn auth_flow(config: &Config) -> CliAuthFlow {
    AuthFlow::new(
        CredentialStore::new(&config.credentials_path),
        SpotifyTokenClient::new(config),
        CallbackReceiver::new(config),
    )
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}
