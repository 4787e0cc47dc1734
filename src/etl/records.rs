use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

/// One playback, keyed by the instant it started.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub played_at: DateTime<Utc>,
    pub track_id: String,
    pub album_id: String,
    pub artist_id: String,
}

impl PlayEvent {
    /// Canonical text form stored in the database.
    pub fn played_at_key(&self) -> String {
        format_played_at(&self.played_at)
    }
}

pub fn format_played_at(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub track_id: String,
    pub name: String,
    pub popularity: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    /// Absent when the audio features of the track could not be fetched.
    pub features: Option<TrackFeatures>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackFeatures {
    pub danceability: f64,
    pub energy: f64,
    pub key: i32,
    pub loudness: f64,
    pub mode: i32,
    pub speechiness: f64,
    pub acousticness: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub valence: f64,
    pub tempo: f64,
    pub time_signature: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub album_id: String,
    pub name: String,
    pub release_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artist {
    pub artist_id: String,
    pub name: String,
    /// Absent when the artist metadata could not be fetched.
    pub popularity: Option<u32>,
    pub follower_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Genre {
    pub genre_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ArtistGenre {
    pub artist_id: String,
    pub genre_name: String,
}

/// Everything one run loads, one vector per table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub play_events: Vec<PlayEvent>,
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub genres: Vec<Genre>,
    pub artist_genres: Vec<ArtistGenre>,
}

impl Batch {
    pub fn is_empty(&self) -> bool {
        self.play_events.is_empty()
    }
}
