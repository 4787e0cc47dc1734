use std::sync::Arc;

use axum::{
    Extension,
    extract::Query,
    http::StatusCode,
    response::{Html, Redirect},
};
use serde::Deserialize;
use tokio::sync::{Mutex, Notify, oneshot};
use tracing::debug;

use crate::warning;

/// What the redirect carried: the authorization code, or the provider's
/// `error` value when the user declined.
pub type CallbackOutcome = Result<String, String>;

pub struct CallbackState {
    sender: Mutex<Option<oneshot::Sender<CallbackOutcome>>>,
    shutdown: Arc<Notify>,
    authorize_url: String,
}

impl CallbackState {
    pub fn new(
        sender: oneshot::Sender<CallbackOutcome>,
        shutdown: Arc<Notify>,
        authorize_url: String,
    ) -> Self {
        CallbackState {
            sender: Mutex::new(Some(sender)),
            shutdown,
            authorize_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(state): Extension<Arc<CallbackState>>,
) -> (StatusCode, Html<&'static str>) {
    let outcome = match (params.code, params.error) {
        (Some(code), _) if !code.trim().is_empty() => Ok(code),
        (_, Some(error)) => Err(error),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Html("<h4>Missing authorization code.</h4>"),
            );
        }
    };

    let Some(sender) = state.sender.lock().await.take() else {
        return (
            StatusCode::CONFLICT,
            Html("<h4>An authorization code was already received.</h4>"),
        );
    };

    let accepted = outcome.is_ok();
    if sender.send(outcome).is_err() {
        warning!("Authorization redirect arrived after the caller stopped waiting.");
    }
    state.shutdown.notify_one();
    debug!(accepted, "Authorization redirect captured");

    if accepted {
        (
            StatusCode::OK,
            Html("<h2>Authorization code received.</h2><p>You can close this browser window.</p>"),
        )
    } else {
        (
            StatusCode::OK,
            Html("<h2>Authorization was declined.</h2><p>You can close this browser window.</p>"),
        )
    }
}

pub async fn index(Extension(state): Extension<Arc<CallbackState>>) -> Redirect {
    Redirect::temporary(&state.authorize_url)
}

pub async fn shutdown(Extension(state): Extension<Arc<CallbackState>>) -> &'static str {
    state.shutdown.notify_one();
    "Server shutting down..."
}
