use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, header::AUTHORIZATION};
use tracing::{debug, warn};

use crate::{
    Error, Res,
    config::Config,
    management::CredentialStore,
    types::{Credential, CredentialField, TokenGrant},
    utils,
};

/// Upper bound of state transitions one token request may take
/// (no code -> code -> token, or expired -> refreshed).
const MAX_TRANSITIONS: usize = 4;

/// Grants accepted by the token endpoint.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// `grant_type=authorization_code`
    async fn exchange_code(&self, code: &str) -> Res<TokenGrant>;

    /// `grant_type=refresh_token`
    async fn refresh(&self, refresh_token: &str) -> Res<TokenGrant>;
}

/// Blocks until the user completed the consent screen and returns the
/// authorization code carried by the redirect.
#[async_trait]
pub trait CodeSource: Send + Sync {
    async fn await_code(&self) -> Res<String>;
}

/// Where the credential record currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    NoCode,
    CodeObtained(String),
    TokenValid(String),
    TokenExpired(String),
}

impl AuthState {
    /// Derives the state from the stored record. A token is valid until
    /// `now > expires_at`.
    pub fn of(credential: &Credential, now: DateTime<Utc>) -> Self {
        let issued = credential.has(CredentialField::AccessToken)
            && credential.has(CredentialField::ExpiresAt);

        if let (true, Some(token), Some(expires_at)) = (
            issued,
            credential.access_token.as_ref(),
            credential.expires_at,
        ) {
            if now <= expires_at {
                return AuthState::TokenValid(token.clone());
            }
        }

        if credential.has(CredentialField::RefreshToken) {
            if let Some(refresh_token) = &credential.refresh_token {
                return AuthState::TokenExpired(refresh_token.clone());
            }
        }

        match &credential.authorization_code {
            Some(code) if credential.has(CredentialField::AuthorizationCode) => {
                AuthState::CodeObtained(code.clone())
            }
            _ => AuthState::NoCode,
        }
    }
}

/// Turns a one-time authorization grant into a continuously renewable access
/// token.
pub struct AuthFlow<E, C> {
    store: CredentialStore,
    endpoint: E,
    codes: C,
}

impl<E: TokenEndpoint, C: CodeSource> AuthFlow<E, C> {
    pub fn new(store: CredentialStore, endpoint: E, codes: C) -> Self {
        AuthFlow {
            store,
            endpoint,
            codes,
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Returns an access token that is not past its expiry, obtaining a code,
    /// exchanging it or refreshing the token as needed.
    pub async fn get_valid_access_token(&self) -> Res<String> {
        self.get_valid_access_token_at(Utc::now()).await
    }

    pub async fn get_valid_access_token_at(&self, now: DateTime<Utc>) -> Res<String> {
        for _ in 0..MAX_TRANSITIONS {
            let credential = self.store.read().await?;
            match AuthState::of(&credential, now) {
                AuthState::TokenValid(token) => return Ok(token),
                AuthState::TokenExpired(refresh_token) => {
                    self.refresh(&refresh_token, now).await?;
                }
                AuthState::CodeObtained(code) => {
                    self.exchange_code(&code, now).await?;
                }
                AuthState::NoCode => {
                    debug!("No authorization code stored, awaiting consent redirect");
                    let code = self.codes.await_code().await?;
                    self.store
                        .write(Credential {
                            authorization_code: Some(code),
                            ..Credential::default()
                        })
                        .await?;
                }
            }
        }

        Err(Error::MalformedToken(
            "token endpoint keeps issuing tokens that are already expired".to_string(),
        ))
    }

    async fn exchange_code(&self, code: &str, now: DateTime<Utc>) -> Res<()> {
        let grant = match self.endpoint.exchange_code(code).await {
            Ok(grant) => grant,
            Err(e) => {
                // A rejected code is spent; a code that never reached the
                // endpoint stays stored for the next run.
                if matches!(e, Error::Auth { .. }) {
                    if let Err(clear_err) =
                        self.store.clear(CredentialField::AuthorizationCode).await
                    {
                        warn!(error = %clear_err, "Failed to clear rejected authorization code");
                    }
                }
                return Err(e);
            }
        };

        let Some(refresh_token) = grant.refresh_token.clone().filter(|t| !t.is_empty()) else {
            return Err(Error::MalformedToken(
                "authorization_code grant returned no refresh_token".to_string(),
            ));
        };

        self.store
            .write(Credential {
                access_token: Some(grant.access_token.clone()),
                refresh_token: Some(refresh_token),
                expires_at: Some(expiry(now, &grant)),
                ..Credential::default()
            })
            .await?;
        debug!(expires_in = grant.expires_in, "Authorization code exchanged for a token");
        Ok(())
    }

    async fn refresh(&self, refresh_token: &str, now: DateTime<Utc>) -> Res<()> {
        let grant = self.endpoint.refresh(refresh_token).await?;

        // A rotated refresh token replaces the stored one, otherwise it is kept.
        self.store
            .write(Credential {
                access_token: Some(grant.access_token.clone()),
                refresh_token: grant.refresh_token.clone().filter(|t| !t.is_empty()),
                expires_at: Some(expiry(now, &grant)),
                ..Credential::default()
            })
            .await?;
        debug!(expires_in = grant.expires_in, "Access token refreshed");
        Ok(())
    }
}

fn expiry(now: DateTime<Utc>, grant: &TokenGrant) -> DateTime<Utc> {
    now + Duration::seconds(grant.expires_in.max(0))
}

/// Token endpoint of the Spotify accounts service, authenticated with the
/// client id and secret.
pub struct SpotifyTokenClient {
    client: Client,
    token_url: String,
    redirect_uri: String,
    authorization: String,
}

impl SpotifyTokenClient {
    pub fn new(config: &Config) -> Self {
        SpotifyTokenClient {
            client: Client::new(),
            token_url: config.token_url.to_string(),
            redirect_uri: config.redirect_uri.to_string(),
            authorization: utils::basic_auth_header(&config.client_id, &config.client_secret),
        }
    }

    async fn request(&self, grant: &'static str, form: &[(&str, &str)]) -> Res<TokenGrant> {
        let response = self
            .client
            .post(&self.token_url)
            .header(AUTHORIZATION, &self.authorization)
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                grant,
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::MalformedToken(format!("{} ({})", e, grant)))
    }
}

#[async_trait]
impl TokenEndpoint for SpotifyTokenClient {
    async fn exchange_code(&self, code: &str) -> Res<TokenGrant> {
        self.request(
            "authorization_code",
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ],
        )
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> Res<TokenGrant> {
        self.request(
            "refresh_token",
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }
}
