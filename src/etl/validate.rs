use std::collections::HashSet;

use crate::{
    ValidationError,
    etl::records::Batch,
};

/// Outcome of a successful validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing was played since the last run; there is nothing to load.
    Empty,
    Ready,
}

/// Checks a normalized batch before it is handed to the loader.
///
/// An empty batch is a normal outcome. Duplicate `played_at` values and
/// missing required fields are not.
pub fn validate(batch: &Batch) -> Result<Verdict, ValidationError> {
    if batch.is_empty() {
        return Ok(Verdict::Empty);
    }

    let mut seen = HashSet::new();
    for event in &batch.play_events {
        // Compared in stored form, which is cut to milliseconds.
        let key = event.played_at_key();
        if !seen.insert(key.clone()) {
            return Err(ValidationError::DuplicatePlayedAt(key));
        }

        for (entity, field, value) in [
            ("play", "track_id", &event.track_id),
            ("play", "album_id", &event.album_id),
            ("play", "artist_id", &event.artist_id),
        ] {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField {
                    entity,
                    field,
                    played_at: key,
                });
            }
        }
    }

    let unknown = |entity: &'static str, field: &'static str| ValidationError::MissingField {
        entity,
        field,
        played_at: "-".to_string(),
    };
    if batch.tracks.iter().any(|t| t.name.trim().is_empty()) {
        return Err(unknown("track", "name"));
    }
    if batch.albums.iter().any(|a| a.name.trim().is_empty()) {
        return Err(unknown("album", "name"));
    }
    if batch.artists.iter().any(|a| a.name.trim().is_empty()) {
        return Err(unknown("artist", "name"));
    }

    Ok(Verdict::Ready)
}
