use std::{collections::BTreeMap, collections::BTreeSet, future::Future, time::Duration};

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    Error, Res,
    spotify::SpotifyApi,
    types::{AudioFeatures, FullArtist, PlayHistoryItem, RecentPlaysQuery},
};

/// Longest `Retry-After` honoured before an id is given up on.
const MAX_RETRY_AFTER_SECS: u64 = 120;

/// Bounded retry of a single per-id request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Never waits between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
        }
    }

    fn delay(&self, attempt: u32, retry_after: Option<u64>) -> Duration {
        match retry_after {
            Some(secs) if !self.base_delay.is_zero() => Duration::from_secs(secs),
            _ => self.base_delay * attempt,
        }
    }
}

/// Returns the most recent plays, each with its nested track, album and
/// artists.
pub async fn fetch_recent_plays<A: SpotifyApi + ?Sized>(
    api: &A,
    token: &str,
    query: &RecentPlaysQuery,
) -> Res<Vec<PlayHistoryItem>> {
    let response = api.recently_played(token, query).await?;
    debug!(plays = response.items.len(), "Fetched recently played tracks");
    Ok(response.items)
}

/// Fetches every artist once. Artists whose request fails are left out of the
/// result; a rejected token aborts.
pub async fn fetch_artist_metadata<A: SpotifyApi + ?Sized>(
    api: &A,
    token: &str,
    artist_ids: &BTreeSet<String>,
    retry: &RetryPolicy,
) -> Res<BTreeMap<String, FullArtist>> {
    let mut artists = BTreeMap::new();
    for id in artist_ids {
        if let Some(artist) = fetch_with_retry("artist", id, retry, || api.artist(token, id)).await?
        {
            artists.insert(id.clone(), artist);
        }
    }
    Ok(artists)
}

/// Fetches the audio features of every track once, with the same failure
/// isolation as [`fetch_artist_metadata`].
pub async fn fetch_audio_features<A: SpotifyApi + ?Sized>(
    api: &A,
    token: &str,
    track_ids: &BTreeSet<String>,
    retry: &RetryPolicy,
) -> Res<BTreeMap<String, AudioFeatures>> {
    let mut features = BTreeMap::new();
    for id in track_ids {
        if let Some(feature) =
            fetch_with_retry("audio features", id, retry, || api.audio_features(token, id)).await?
        {
            features.insert(id.clone(), feature);
        }
    }
    Ok(features)
}

/// `Ok(None)` means the data for this id is unavailable.
async fn fetch_with_retry<T, F, Fut>(
    kind: &str,
    id: &str,
    retry: &RetryPolicy,
    mut call: F,
) -> Res<Option<T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Res<T>>,
{
    let max_attempts = retry.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let err = match call().await {
            Ok(value) => return Ok(Some(value)),
            Err(err) => err,
        };

        if is_systemic(&err) {
            return Err(err);
        }

        let retry_after = match &err {
            Error::Api { retry_after, .. } => *retry_after,
            _ => None,
        };
        let too_long = retry_after.is_some_and(|secs| secs > MAX_RETRY_AFTER_SECS);

        if !is_transient(&err) || too_long || attempt >= max_attempts {
            warn!(
                kind,
                id,
                status = ?err.status(),
                attempts = attempt,
                error = %err,
                "Enrichment unavailable, continuing without it"
            );
            return Ok(None);
        }

        let delay = retry.delay(attempt, retry_after);
        debug!(kind, id, attempt, ?delay, "Retrying request");
        sleep(delay).await;
        attempt += 1;
    }
}

/// A rejected token fails every other id as well.
fn is_systemic(err: &Error) -> bool {
    err.status() == Some(401)
}

fn is_transient(err: &Error) -> bool {
    match err {
        Error::Api { status, .. } => *status == 429 || *status >= 500,
        Error::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        _ => false,
    }
}
