//! Configuration management for the listening history ETL.
//!
//! This module handles loading configuration values from environment variables
//! and `.env` files. Values are collected once into a [`Config`] that is passed
//! explicitly to every component, so nothing reads the environment behind the
//! caller's back.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{
    env,
    net::{IpAddr, SocketAddr},
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use reqwest::Url;

use crate::{Error, Res};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8080/callback/q";
pub const DEFAULT_SCOPE: &str = "user-read-recently-played";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 120;

/// Largest page the recently-played endpoint serves.
pub const MAX_RECENT_PLAYS_LIMIT: u32 = 50;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives under `sporlhist/.env` in the platform-specific local data
/// directory:
/// - Linux: `~/.local/share/sporlhist/.env`
/// - macOS: `~/Library/Application Support/sporlhist/.env`
/// - Windows: `%LOCALAPPDATA%/sporlhist/.env`
///
/// A missing file is not an error: a scheduler may export the variables
/// directly. A file that exists but cannot be parsed is.
pub async fn load_env() -> Res<()> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)
            .map_err(|e| Error::Config(format!("cannot load {}: {}", path.display(), e)))?;
    }
    Ok(())
}

/// Root of everything the tool persists locally.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("sporlhist");
    path
}

/// Runtime configuration of a sync run.
#[derive(Debug, Clone)]
pub struct Config {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: Url,
    pub scope: String,
    pub show_dialog: bool,
    pub auth_url: Url,
    pub token_url: Url,
    pub api_url: String,
    pub server_addr: SocketAddr,
    pub callback_timeout: Duration,
    pub credentials_path: PathBuf,
    pub database_path: PathBuf,
    pub recent_plays_limit: u32,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| Error::Config(format!("{} must be set", key)))
        };

        let recent_plays_limit: u32 = parse_or(&get, "RECENT_PLAYS_LIMIT", MAX_RECENT_PLAYS_LIMIT)?;
        if !(1..=MAX_RECENT_PLAYS_LIMIT).contains(&recent_plays_limit) {
            return Err(Error::Config(format!(
                "RECENT_PLAYS_LIMIT must be between 1 and {}, got {}",
                MAX_RECENT_PLAYS_LIMIT, recent_plays_limit
            )));
        }

        let data_dir = data_dir();

        let config = Config {
            client_id: required("SPOTIFY_API_AUTH_CLIENT_ID")?,
            client_secret: required("SPOTIFY_API_AUTH_CLIENT_SECRET")?,
            redirect_uri: parse_url(&get, "SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI)?,
            scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.to_string()),
            show_dialog: parse_or(&get, "SPOTIFY_API_SHOW_DIALOG", false)?,
            auth_url: parse_url(&get, "SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL)?,
            token_url: parse_url(&get, "SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL)?,
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            server_addr: parse_or(
                &get,
                "SERVER_ADDRESS",
                SocketAddr::from_str(DEFAULT_SERVER_ADDRESS)
                    .map_err(|e| Error::Config(e.to_string()))?,
            )?,
            callback_timeout: Duration::from_secs(parse_or(
                &get,
                "CALLBACK_TIMEOUT_SECS",
                DEFAULT_CALLBACK_TIMEOUT_SECS,
            )?),
            credentials_path: get("SPORLHIST_CREDENTIALS")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("credentials.json")),
            database_path: get("SPORLHIST_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("history.db")),
            recent_plays_limit,
        };
        check_listener(&config.redirect_uri, config.server_addr)?;
        Ok(config)
    }
}

/// The redirect has to land on the listener: same port, and a host the
/// listener answers on.
fn check_listener(redirect_uri: &Url, server_addr: SocketAddr) -> Res<()> {
    let ip = server_addr.ip();
    let host = redirect_uri
        .host_str()
        .unwrap_or_default()
        .trim_start_matches('[')
        .trim_end_matches(']');
    let host_matches = ip.is_unspecified()
        || match host.parse::<IpAddr>() {
            Ok(host_ip) => host_ip == ip,
            Err(_) => host.eq_ignore_ascii_case("localhost") && ip.is_loopback(),
        };
    let port_matches = redirect_uri.port_or_known_default() == Some(server_addr.port());

    if host_matches && port_matches {
        return Ok(());
    }
    Err(Error::Config(format!(
        "SPOTIFY_API_REDIRECT_URI {} does not point at SERVER_ADDRESS {}",
        redirect_uri, server_addr
    )))
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Res<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| Error::Config(format!("{} has an invalid value {:?}: {}", key, raw, e))),
        None => Ok(default),
    }
}

fn parse_url<G>(get: &G, key: &str, default: &str) -> Res<Url>
where
    G: Fn(&str) -> Option<String>,
{
    let raw = get(key).unwrap_or_else(|| default.to_string());
    Url::parse(&raw).map_err(|e| Error::Config(format!("{} is not a valid URL: {}", key, e)))
}
