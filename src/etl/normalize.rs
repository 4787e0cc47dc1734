//! Flattens the nested recently-played feed into one record list per table.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::{
    ValidationError,
    etl::records::{
        Album, Artist, ArtistGenre, Batch, Genre, PlayEvent, Track, TrackFeatures,
    },
    types::{AlbumObject, ArtistRef, AudioFeatures, FullArtist, PlayHistoryItem, TrackObject},
    utils,
};

/// Builds the batch of a run from the raw feed and the enrichment results.
///
/// Tracks, albums and artists are emitted once per id, in feed order. Artists
/// missing from `artists` keep their popularity and follower count empty and
/// get no genre rows; tracks missing from `features` keep their audio features
/// empty.
pub fn normalize(
    items: &[PlayHistoryItem],
    artists: &BTreeMap<String, FullArtist>,
    features: &BTreeMap<String, AudioFeatures>,
) -> Result<Batch, ValidationError> {
    let mut batch = Batch::default();
    let mut seen_tracks = HashSet::new();
    let mut seen_albums = HashSet::new();
    let mut seen_artists = HashSet::new();

    for item in items {
        let raw_played_at = required_text(&item.played_at, "play", "played_at", "?")?;
        let played_at = parse_played_at(&raw_played_at)?;
        let at = raw_played_at.as_str();

        let track = item.track.as_ref().ok_or_else(|| missing("play", "track", at))?;
        let album = track.album.as_ref().ok_or_else(|| missing("track", "album", at))?;
        let artist = primary_artist(track, album).ok_or_else(|| missing("album", "artists", at))?;

        let track_row = track_record(track, features, at)?;
        let album_row = album_record(album, at)?;
        let artist_row = artist_record(artist, artists, at)?;

        batch.play_events.push(PlayEvent {
            played_at,
            track_id: track_row.track_id.clone(),
            album_id: album_row.album_id.clone(),
            artist_id: artist_row.artist_id.clone(),
        });

        if seen_tracks.insert(track_row.track_id.clone()) {
            batch.tracks.push(track_row);
        }
        if seen_albums.insert(album_row.album_id.clone()) {
            batch.albums.push(album_row);
        }
        if seen_artists.insert(artist_row.artist_id.clone()) {
            if let Some(metadata) = artists.get(&artist_row.artist_id) {
                let joined = utils::join_genres(&metadata.genres);
                for genre_name in utils::explode_genres(&joined) {
                    batch.artist_genres.push(ArtistGenre {
                        artist_id: artist_row.artist_id.clone(),
                        genre_name,
                    });
                }
            }
            batch.artists.push(artist_row);
        }
    }

    batch.genres = batch
        .artist_genres
        .iter()
        .map(|ag| ag.genre_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|genre_name| Genre { genre_name })
        .collect();

    Ok(batch)
}

pub fn parse_played_at(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|at| at.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp(raw.to_string()))
}

/// The artist a play is attributed to: the first album artist, or the first
/// track artist for albums that list none.
pub fn primary_artist<'a>(track: &'a TrackObject, album: &'a AlbumObject) -> Option<&'a ArtistRef> {
    album.artists.first().or_else(|| track.artists.first())
}

fn track_record(
    track: &TrackObject,
    features: &BTreeMap<String, AudioFeatures>,
    at: &str,
) -> Result<Track, ValidationError> {
    let track_id = required_text(&track.id, "track", "id", at)?;
    let features = features.get(&track_id).map(|f| TrackFeatures {
        danceability: f.danceability,
        energy: f.energy,
        key: f.key,
        loudness: f.loudness,
        mode: f.mode,
        speechiness: f.speechiness,
        acousticness: f.acousticness,
        instrumentalness: f.instrumentalness,
        liveness: f.liveness,
        valence: f.valence,
        tempo: f.tempo,
        time_signature: f.time_signature,
    });

    Ok(Track {
        name: required_text(&track.name, "track", "name", at)?,
        popularity: track.popularity.ok_or_else(|| missing("track", "popularity", at))?,
        duration_ms: track.duration_ms.ok_or_else(|| missing("track", "duration_ms", at))?,
        explicit: track.explicit.ok_or_else(|| missing("track", "explicit", at))?,
        track_id,
        features,
    })
}

fn album_record(album: &AlbumObject, at: &str) -> Result<Album, ValidationError> {
    let release_date = required_text(&album.release_date, "album", "release_date", at)?;
    Ok(Album {
        album_id: required_text(&album.id, "album", "id", at)?,
        name: required_text(&album.name, "album", "name", at)?,
        release_date: utils::normalize_release_date(&release_date)?,
    })
}

fn artist_record(
    artist: &ArtistRef,
    artists: &BTreeMap<String, FullArtist>,
    at: &str,
) -> Result<Artist, ValidationError> {
    let artist_id = required_text(&artist.id, "artist", "id", at)?;
    let metadata = artists.get(&artist_id);
    Ok(Artist {
        name: required_text(&artist.name, "artist", "name", at)?,
        popularity: metadata.and_then(|a| a.popularity),
        follower_count: metadata
            .and_then(|a| a.followers.as_ref())
            .and_then(|f| f.total),
        artist_id,
    })
}

fn required_text(
    value: &Option<String>,
    entity: &'static str,
    field: &'static str,
    at: &str,
) -> Result<String, ValidationError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| missing(entity, field, at))
}

fn missing(entity: &'static str, field: &'static str, at: &str) -> ValidationError {
    ValidationError::MissingField {
        entity,
        field,
        played_at: at.to_string(),
    }
}
