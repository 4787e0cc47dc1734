#![allow(dead_code)]

use sporlhist::types::{
    AlbumObject, ArtistRef, AudioFeatures, Followers, FullArtist, PlayHistoryItem, TrackObject,
};

pub fn artist_ref(id: &str) -> ArtistRef {
    ArtistRef {
        id: Some(id.to_string()),
        name: Some(format!("Artist {}", id)),
    }
}

pub fn album(id: &str, release_date: &str, artist_id: &str) -> AlbumObject {
    AlbumObject {
        id: Some(id.to_string()),
        name: Some(format!("Album {}", id)),
        release_date: Some(release_date.to_string()),
        release_date_precision: None,
        artists: vec![artist_ref(artist_id)],
    }
}

pub fn track(id: &str, album: AlbumObject) -> TrackObject {
    TrackObject {
        id: Some(id.to_string()),
        name: Some(format!("Track {}", id)),
        popularity: Some(42),
        duration_ms: Some(180_000),
        explicit: Some(false),
        artists: album.artists.clone(),
        album: Some(album),
    }
}

/// A play of `track_id` on `album_id` by `artist_id`.
pub fn play(played_at: &str, track_id: &str, album_id: &str, artist_id: &str) -> PlayHistoryItem {
    PlayHistoryItem {
        played_at: Some(played_at.to_string()),
        track: Some(track(track_id, album(album_id, "2020-05-01", artist_id))),
    }
}

pub fn full_artist(id: &str, genres: &[&str]) -> FullArtist {
    FullArtist {
        id: id.to_string(),
        name: Some(format!("Artist {}", id)),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        popularity: Some(70),
        followers: Some(Followers { total: Some(1234) }),
    }
}

pub fn features(id: &str) -> AudioFeatures {
    AudioFeatures {
        id: id.to_string(),
        danceability: 0.5,
        energy: 0.8,
        key: 5,
        loudness: -6.0,
        mode: 1,
        speechiness: 0.05,
        acousticness: 0.1,
        instrumentalness: 0.0,
        liveness: 0.2,
        valence: 0.6,
        tempo: 128.0,
        time_signature: 4,
    }
}

/// The feed of the reference scenario: three plays of three tracks by two
/// artists.
pub fn three_plays() -> Vec<PlayHistoryItem> {
    vec![
        play("2024-01-01T10:00:00.000Z", "t1", "al1", "ar1"),
        play("2024-01-01T10:05:00.000Z", "t2", "al1", "ar1"),
        play("2024-01-01T10:10:00.000Z", "t3", "al2", "ar2"),
    ]
}
