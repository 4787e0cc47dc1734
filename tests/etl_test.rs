mod common;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use common::*;
use sporlhist::ValidationError;
use sporlhist::etl::normalize::normalize;
use sporlhist::etl::records::Batch;
use sporlhist::etl::{Verdict, validate};
use sporlhist::types::{AudioFeatures, FullArtist};
use sporlhist::utils::UNKNOWN_GENRE;

fn no_artists() -> BTreeMap<String, FullArtist> {
    BTreeMap::new()
}

fn no_features() -> BTreeMap<String, AudioFeatures> {
    BTreeMap::new()
}

#[test]
fn test_normalize_deduplicates_entities() {
    let mut artists = BTreeMap::new();
    artists.insert("ar1".to_string(), full_artist("ar1", &["pop", "rock"]));

    let batch = normalize(&three_plays(), &artists, &no_features()).unwrap();

    assert_eq!(batch.play_events.len(), 3);
    assert_eq!(batch.tracks.len(), 3);
    assert_eq!(batch.albums.len(), 2);
    assert_eq!(batch.artists.len(), 2);

    // Feed order is kept
    let track_ids: Vec<_> = batch.tracks.iter().map(|t| t.track_id.as_str()).collect();
    assert_eq!(track_ids, vec!["t1", "t2", "t3"]);

    let event = &batch.play_events[2];
    assert_eq!(event.track_id, "t3");
    assert_eq!(event.album_id, "al2");
    assert_eq!(event.artist_id, "ar2");
    assert_eq!(event.played_at_key(), "2024-01-01T10:10:00.000Z");
}

#[test]
fn test_normalize_genre_rows() {
    let mut artists = BTreeMap::new();
    artists.insert("ar1".to_string(), full_artist("ar1", &["pop", "rock"]));
    artists.insert("ar2".to_string(), full_artist("ar2", &[]));

    let batch = normalize(&three_plays(), &artists, &no_features()).unwrap();

    let pairs: Vec<_> = batch
        .artist_genres
        .iter()
        .map(|ag| (ag.artist_id.as_str(), ag.genre_name.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("ar1", "pop"), ("ar1", "rock"), ("ar2", UNKNOWN_GENRE)]
    );

    let genres: Vec<_> = batch.genres.iter().map(|g| g.genre_name.as_str()).collect();
    assert_eq!(genres, vec![UNKNOWN_GENRE, "pop", "rock"]);
}

#[test]
fn test_normalize_without_enrichment() {
    let batch = normalize(&three_plays(), &no_artists(), &no_features()).unwrap();

    assert!(batch.artist_genres.is_empty());
    assert!(batch.genres.is_empty());
    assert!(batch.artists.iter().all(|a| a.popularity.is_none()));
    assert!(batch.artists.iter().all(|a| a.follower_count.is_none()));
    assert!(batch.tracks.iter().all(|t| t.features.is_none()));
}

#[test]
fn test_normalize_attaches_features() {
    let mut audio = BTreeMap::new();
    audio.insert("t2".to_string(), features("t2"));

    let batch = normalize(&three_plays(), &no_artists(), &audio).unwrap();

    assert!(batch.tracks[0].features.is_none());
    let attached = batch.tracks[1].features.as_ref().unwrap();
    assert_eq!(attached.tempo, 128.0);
    assert_eq!(attached.key, 5);
}

#[test]
fn test_normalize_completes_release_dates() {
    let mut items = three_plays();
    items[0]
        .track
        .as_mut()
        .unwrap()
        .album
        .as_mut()
        .unwrap()
        .release_date = Some("1999".into());
    items[2]
        .track
        .as_mut()
        .unwrap()
        .album
        .as_mut()
        .unwrap()
        .release_date = Some("1999-07".into());

    let batch = normalize(&items, &no_artists(), &no_features()).unwrap();

    assert_eq!(
        batch.albums[0].release_date,
        NaiveDate::from_ymd_opt(1999, 1, 1).unwrap()
    );
    assert_eq!(
        batch.albums[1].release_date,
        NaiveDate::from_ymd_opt(1999, 7, 1).unwrap()
    );
}

#[test]
fn test_normalize_falls_back_to_track_artist() {
    let mut items = vec![play("2024-01-01T10:00:00Z", "t1", "al1", "ar1")];
    let track = items[0].track.as_mut().unwrap();
    track.album.as_mut().unwrap().artists.clear();
    track.artists = vec![artist_ref("solo")];

    let batch = normalize(&items, &no_artists(), &no_features()).unwrap();
    assert_eq!(batch.play_events[0].artist_id, "solo");
}

#[test]
fn test_normalize_missing_track_id() {
    let mut items = three_plays();
    items[1].track.as_mut().unwrap().id = None;

    let err = normalize(&items, &no_artists(), &no_features()).unwrap_err();
    assert_eq!(
        err,
        ValidationError::MissingField {
            entity: "track",
            field: "id",
            played_at: "2024-01-01T10:05:00.000Z".into(),
        }
    );
}

#[test]
fn test_normalize_invalid_played_at() {
    let items = vec![play("last tuesday", "t1", "al1", "ar1")];
    let err = normalize(&items, &no_artists(), &no_features()).unwrap_err();
    assert_eq!(err, ValidationError::InvalidTimestamp("last tuesday".into()));
}

#[test]
fn test_validate_empty_batch() {
    assert_eq!(validate(&Batch::default()), Ok(Verdict::Empty));
}

#[test]
fn test_validate_ready_batch() {
    let batch = normalize(&three_plays(), &no_artists(), &no_features()).unwrap();
    assert_eq!(validate(&batch), Ok(Verdict::Ready));
}

#[test]
fn test_validate_duplicate_played_at() {
    let items = vec![
        play("2024-01-01T10:00:00Z", "t1", "al1", "ar1"),
        play("2024-01-01T10:00:00.000Z", "t2", "al1", "ar1"),
    ];
    let batch = normalize(&items, &no_artists(), &no_features()).unwrap();

    assert_eq!(
        validate(&batch),
        Err(ValidationError::DuplicatePlayedAt(
            "2024-01-01T10:00:00.000Z".into()
        ))
    );
}

#[test]
fn test_validate_missing_name() {
    let mut batch = normalize(&three_plays(), &no_artists(), &no_features()).unwrap();
    batch.albums[1].name = " ".into();

    assert!(matches!(
        validate(&batch),
        Err(ValidationError::MissingField {
            entity: "album",
            field: "name",
            ..
        })
    ));
}

#[test]
fn test_validate_plays_equal_at_stored_precision() {
    // Distinct instants that share the same millisecond collide once stored
    let items = vec![
        play("2024-01-01T10:00:00.0001Z", "t1", "al1", "ar1"),
        play("2024-01-01T10:00:00.0002Z", "t2", "al1", "ar1"),
    ];
    let batch = normalize(&items, &no_artists(), &no_features()).unwrap();

    assert_eq!(
        validate(&batch),
        Err(ValidationError::DuplicatePlayedAt(
            "2024-01-01T10:00:00.000Z".into()
        ))
    );
}
