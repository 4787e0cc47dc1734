use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;

use crate::{
    Error, Res,
    config::Config,
    types::{AudioFeatures, FullArtist, RecentPlaysQuery, RecentlyPlayedResponse},
};

/// Read-only Spotify Web API resources a sync run needs.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// `GET /me/player/recently-played`
    async fn recently_played(
        &self,
        token: &str,
        query: &RecentPlaysQuery,
    ) -> Res<RecentlyPlayedResponse>;

    /// `GET /artists/{id}`
    async fn artist(&self, token: &str, id: &str) -> Res<FullArtist>;

    /// `GET /audio-features/{id}`
    async fn audio_features(&self, token: &str, id: &str) -> Res<AudioFeatures>;
}

pub struct SpotifyClient {
    client: Client,
    api_url: String,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Self {
        SpotifyClient {
            client: Client::new(),
            api_url: config.api_url.clone(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: String,
        token: &str,
        query: &[(&str, String)],
    ) -> Res<T> {
        let api_url = format!("{uri}/{resource}", uri = self.api_url, resource = resource);
        let response = self
            .client
            .get(&api_url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // check for retry-after header
            let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
            } else {
                None
            };
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                resource,
                status: status.as_u16(),
                retry_after,
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn recently_played(
        &self,
        token: &str,
        query: &RecentPlaysQuery,
    ) -> Res<RecentlyPlayedResponse> {
        let mut params = vec![("limit", query.limit.to_string())];
        if let Some(after) = query.after {
            params.push(("after", after.to_string()));
        }
        self.get_json("me/player/recently-played".to_string(), token, &params)
            .await
    }

    async fn artist(&self, token: &str, id: &str) -> Res<FullArtist> {
        self.get_json(format!("artists/{}", id), token, &[]).await
    }

    async fn audio_features(&self, token: &str, id: &str) -> Res<AudioFeatures> {
        self.get_json(format!("audio-features/{}", id), token, &[])
            .await
    }
}
