use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::{Extension, Router, routing::get};
use reqwest::Url;
use tokio::{
    net::TcpListener,
    sync::{Notify, oneshot},
    task::JoinHandle,
};
use tracing::debug;

use crate::{
    Error, Res,
    api::{self, CallbackOutcome, CallbackState},
    config::Config,
    info,
    spotify::CodeSource,
    utils, warning,
};

/// One-shot local listener for the OAuth redirect.
///
/// Every [`CodeSource::await_code`] call starts a fresh listener, opens the
/// consent screen and blocks until the first redirect lands, then shuts the
/// listener down again.
pub struct CallbackReceiver {
    addr: SocketAddr,
    callback_path: String,
    authorize_url: Url,
    timeout: Duration,
    open_browser: bool,
}

impl CallbackReceiver {
    pub fn new(config: &Config) -> Self {
        CallbackReceiver {
            addr: config.server_addr,
            callback_path: config.redirect_uri.path().to_string(),
            authorize_url: utils::authorize_url(config),
            timeout: config.callback_timeout,
            open_browser: true,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Leaves opening the consent screen to the user.
    pub fn without_browser(mut self) -> Self {
        self.open_browser = false;
        self
    }

    pub fn callback_path(&self) -> &str {
        &self.callback_path
    }

    /// Binds the listener and starts serving.
    pub async fn activate(&self) -> Res<Activation> {
        if self.callback_path == "/" || self.callback_path == "/shutdown" {
            return Err(Error::Config(format!(
                "redirect URI path {} collides with a listener route",
                self.callback_path
            )));
        }

        let (sender, receiver) = oneshot::channel();
        let shutdown = Arc::new(Notify::new());
        let state = Arc::new(CallbackState::new(
            sender,
            Arc::clone(&shutdown),
            self.authorize_url.to_string(),
        ));

        let app = Router::new()
            .route("/", get(api::index))
            .route(&self.callback_path, get(api::callback))
            .route("/shutdown", get(api::shutdown))
            .layer(Extension(state));

        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| Error::Callback(format!("cannot listen on {}: {}", self.addr, e)))?;
        let local_addr = listener.local_addr()?;
        debug!(%local_addr, path = %self.callback_path, "Callback listener started");

        let signal = Arc::clone(&shutdown);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await
        });

        Ok(Activation {
            local_addr,
            receiver,
            shutdown,
            server,
            timeout: self.timeout,
        })
    }
}

#[async_trait]
impl CodeSource for CallbackReceiver {
    async fn await_code(&self) -> Res<String> {
        let activation = self.activate().await?;

        if self.open_browser {
            info!("Opening the Spotify consent screen in your browser...");
            if webbrowser::open(self.authorize_url.as_str()).is_err() {
                warning!(
                    "Failed to open browser. Please navigate to the following URL manually:\n{}",
                    self.authorize_url
                );
            }
        } else {
            info!(
                "Please navigate to the following URL to authorize access:\n{}",
                self.authorize_url
            );
        }

        activation.wait().await
    }
}

/// A running listener waiting for its single redirect.
pub struct Activation {
    local_addr: SocketAddr,
    receiver: oneshot::Receiver<CallbackOutcome>,
    shutdown: Arc<Notify>,
    server: JoinHandle<std::io::Result<()>>,
    timeout: Duration,
}

impl Activation {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Blocks until the redirect arrives, the listener is shut down or the
    /// timeout passes. The listener is stopped in every case.
    pub async fn wait(self) -> Res<String> {
        let result = match tokio::time::timeout(self.timeout, self.receiver).await {
            Ok(Ok(Ok(code))) => Ok(code),
            Ok(Ok(Err(reason))) => Err(Error::Callback(format!(
                "authorization was declined: {}",
                reason
            ))),
            Ok(Err(_)) => Err(Error::Callback(
                "listener shut down before an authorization code arrived".to_string(),
            )),
            Err(_) => Err(Error::Callback(format!(
                "no authorization redirect within {} seconds",
                self.timeout.as_secs()
            ))),
        };

        self.shutdown.notify_one();
        match self.server.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "Callback listener stopped with an error"),
            Err(e) => debug!(error = %e, "Callback listener task failed"),
        }

        result
    }
}
