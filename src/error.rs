//! Error types shared by every stage of a sync run.
//!
//! The variants follow the way a run reacts to a failure: authentication,
//! validation and load-integrity errors stop the run, while enrichment gaps,
//! natural-key collisions and a corrupted credential file are recovered where
//! they happen and only show up in the logs.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-2xx from the token endpoint. `body` is the provider's error payload.
    #[error("Token endpoint rejected the {grant} grant (HTTP {status}): {body}")]
    Auth {
        grant: &'static str,
        status: u16,
        body: String,
    },

    #[error("Token endpoint returned an unusable response: {0}")]
    MalformedToken(String),

    #[error("Authorization callback failed: {0}")]
    Callback(String),

    /// Non-2xx from one of the data endpoints.
    #[error("Request for {resource} failed with HTTP {status}: {body}")]
    Api {
        resource: String,
        status: u16,
        retry_after: Option<u64>,
        body: String,
    },

    #[error("Invalid batch: {0}")]
    Validation(#[from] ValidationError),

    /// A batch insert failed for a reason other than a natural-key collision.
    /// The batch of `table` was rolled back.
    #[error("Loading table {table} failed: {source}")]
    Load {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("played_at {0} occurs more than once in the batch")]
    DuplicatePlayedAt(String),

    #[error("{entity} is missing required field `{field}` (play at {played_at})")]
    MissingField {
        entity: &'static str,
        field: &'static str,
        played_at: String,
    },

    #[error("played_at value {0:?} is not an RFC 3339 timestamp")]
    InvalidTimestamp(String),

    #[error("release date {0:?} is not YYYY, YYYY-MM or YYYY-MM-DD")]
    InvalidReleaseDate(String),
}

impl Error {
    /// HTTP status of an API or token endpoint failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { status, .. } | Error::Api { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
