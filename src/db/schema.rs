//! SQLite schema of the listening history database.
//!
//! Every table has a primary key on its natural key; play events and
//! artist/genre pairs reference their parents through foreign keys.

use rusqlite::types::Value;

use crate::etl::records::{Album, Artist, ArtistGenre, Genre, PlayEvent, Track};

pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS albums (
    album_id TEXT PRIMARY KEY NOT NULL,
    album_name TEXT NOT NULL,
    release_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS artists (
    artist_id TEXT PRIMARY KEY NOT NULL,
    artist_name TEXT NOT NULL,
    popularity INTEGER,
    follower_count INTEGER
);

CREATE TABLE IF NOT EXISTS genres (
    genre_name TEXT PRIMARY KEY NOT NULL
);

CREATE TABLE IF NOT EXISTS tracks (
    track_id TEXT PRIMARY KEY NOT NULL,
    track_name TEXT NOT NULL,
    popularity INTEGER NOT NULL,
    duration_ms INTEGER NOT NULL,
    is_explicit INTEGER NOT NULL,
    danceability REAL,
    energy REAL,
    "key" INTEGER,
    loudness REAL,
    mode INTEGER,
    speechiness REAL,
    acousticness REAL,
    instrumentalness REAL,
    liveness REAL,
    valence REAL,
    tempo REAL,
    time_signature INTEGER
);

CREATE TABLE IF NOT EXISTS play_events (
    played_at TEXT PRIMARY KEY NOT NULL,
    track_id TEXT NOT NULL REFERENCES tracks (track_id),
    album_id TEXT NOT NULL REFERENCES albums (album_id),
    artist_id TEXT NOT NULL REFERENCES artists (artist_id)
);

CREATE TABLE IF NOT EXISTS artist_genres (
    artist_id TEXT NOT NULL REFERENCES artists (artist_id),
    genre_name TEXT NOT NULL REFERENCES genres (genre_name),
    UNIQUE (artist_id, genre_name)
);

CREATE INDEX IF NOT EXISTS idx_play_events_track ON play_events (track_id);
CREATE INDEX IF NOT EXISTS idx_artist_genres_genre ON artist_genres (genre_name);
"#;

/// Insert target of one table.
#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    /// Columns of the natural key; a collision on them keeps the stored row.
    pub conflict_target: &'static str,
}

impl Table {
    pub fn insert_sql(&self) -> String {
        let placeholders = (1..=self.columns.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ");
        let columns = self
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT ({}) DO NOTHING",
            self.name, columns, placeholders, self.conflict_target
        )
    }
}

pub const ALBUMS: Table = Table {
    name: "albums",
    columns: &["album_id", "album_name", "release_date"],
    conflict_target: "album_id",
};

pub const ARTISTS: Table = Table {
    name: "artists",
    columns: &["artist_id", "artist_name", "popularity", "follower_count"],
    conflict_target: "artist_id",
};

pub const GENRES: Table = Table {
    name: "genres",
    columns: &["genre_name"],
    conflict_target: "genre_name",
};

pub const TRACKS: Table = Table {
    name: "tracks",
    columns: &[
        "track_id",
        "track_name",
        "popularity",
        "duration_ms",
        "is_explicit",
        "danceability",
        "energy",
        "key",
        "loudness",
        "mode",
        "speechiness",
        "acousticness",
        "instrumentalness",
        "liveness",
        "valence",
        "tempo",
        "time_signature",
    ],
    conflict_target: "track_id",
};

pub const PLAY_EVENTS: Table = Table {
    name: "play_events",
    columns: &["played_at", "track_id", "album_id", "artist_id"],
    conflict_target: "played_at",
};

pub const ARTIST_GENRES: Table = Table {
    name: "artist_genres",
    columns: &["artist_id", "genre_name"],
    conflict_target: "artist_id, genre_name",
};

/// Tables in load order: parents before the tables referencing them.
pub const LOAD_ORDER: [&Table; 6] = [
    &ALBUMS,
    &ARTISTS,
    &GENRES,
    &TRACKS,
    &PLAY_EVENTS,
    &ARTIST_GENRES,
];

/// A row of one of the tables.
pub trait Record {
    const TABLE: &'static Table;

    /// Column values in the order of `TABLE.columns`.
    fn values(&self) -> Vec<Value>;
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn optional<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}

impl Record for Album {
    const TABLE: &'static Table = &ALBUMS;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.album_id),
            text(&self.name),
            Value::Text(self.release_date.format("%Y-%m-%d").to_string()),
        ]
    }
}

impl Record for Artist {
    const TABLE: &'static Table = &ARTISTS;

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.artist_id),
            text(&self.name),
            optional(self.popularity.map(i64::from)),
            optional(self.follower_count.map(|f| f as i64)),
        ]
    }
}

impl Record for Genre {
    const TABLE: &'static Table = &GENRES;

    fn values(&self) -> Vec<Value> {
        vec![text(&self.genre_name)]
    }
}

impl Record for Track {
    const TABLE: &'static Table = &TRACKS;

    fn values(&self) -> Vec<Value> {
        let f = self.features.as_ref();
        vec![
            text(&self.track_id),
            text(&self.name),
            Value::Integer(i64::from(self.popularity)),
            Value::Integer(self.duration_ms as i64),
            Value::Integer(i64::from(self.explicit)),
            optional(f.map(|f| f.danceability)),
            optional(f.map(|f| f.energy)),
            optional(f.map(|f| i64::from(f.key))),
            optional(f.map(|f| f.loudness)),
            optional(f.map(|f| i64::from(f.mode))),
            optional(f.map(|f| f.speechiness)),
            optional(f.map(|f| f.acousticness)),
            optional(f.map(|f| f.instrumentalness)),
            optional(f.map(|f| f.liveness)),
            optional(f.map(|f| f.valence)),
            optional(f.map(|f| f.tempo)),
            optional(f.map(|f| i64::from(f.time_signature))),
        ]
    }
}

impl Record for PlayEvent {
    const TABLE: &'static Table = &PLAY_EVENTS;

    fn values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.played_at_key()),
            text(&self.track_id),
            text(&self.album_id),
            text(&self.artist_id),
        ]
    }
}

impl Record for ArtistGenre {
    const TABLE: &'static Table = &ARTIST_GENRES;

    fn values(&self) -> Vec<Value> {
        vec![text(&self.artist_id), text(&self.genre_name)]
    }
}
