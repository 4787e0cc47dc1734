use indicatif::ProgressBar;
use tracing::debug;

use crate::{
    Res,
    db::{Database, LoadReport},
    etl::{
        normalize::{self, primary_artist},
        validate::{Verdict, validate},
    },
    spotify::{
        AuthFlow, CodeSource, SpotifyApi, TokenEndpoint,
        fetch::{self, RetryPolicy},
    },
    types::RecentPlaysQuery,
    utils,
};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub query: RecentPlaysQuery,
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The feed held no plays; nothing was loaded.
    NothingNew,
    Loaded(LoadReport),
}

/// Runs one sync: token, fetch, enrichment, normalization, validation, load.
///
/// Validation failures abort before the first write. A load failure leaves
/// the tables committed before it in place.
pub async fn run_once<E, C, A>(
    auth: &AuthFlow<E, C>,
    api: &A,
    db: &mut Database,
    options: &RunOptions,
    progress: &ProgressBar,
) -> Res<RunOutcome>
where
    E: TokenEndpoint,
    C: CodeSource,
    A: SpotifyApi + ?Sized,
{
    progress.set_message("Checking access token...");
    let token = auth.get_valid_access_token().await?;

    progress.set_message("Fetching recently played tracks...");
    let items = fetch::fetch_recent_plays(api, &token, &options.query).await?;
    if items.is_empty() {
        debug!("Feed is empty, nothing to load");
        return Ok(RunOutcome::NothingNew);
    }

    let tracks = items.iter().filter_map(|item| item.track.as_ref());
    let artist_ids = utils::unique_ids(tracks.clone().filter_map(|track| {
        track
            .album
            .as_ref()
            .and_then(|album| primary_artist(track, album))
            .map(|artist| artist.id.as_deref())
    }));
    let track_ids = utils::unique_ids(tracks.map(|track| track.id.as_deref()));

    progress.set_message(format!("Fetching {} artists...", artist_ids.len()));
    let artists = fetch::fetch_artist_metadata(api, &token, &artist_ids, &options.retry).await?;

    progress.set_message(format!("Fetching audio features of {} tracks...", track_ids.len()));
    let features = fetch::fetch_audio_features(api, &token, &track_ids, &options.retry).await?;

    let batch = normalize::normalize(&items, &artists, &features)?;
    if validate(&batch)? == Verdict::Empty {
        return Ok(RunOutcome::NothingNew);
    }

    progress.set_message("Loading into the database...");
    let report = db.load(&batch)?;
    Ok(RunOutcome::Loaded(report))
}
