use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use tabled::Tabled;

// =============================================================================
// Credential record
// =============================================================================

/// Textual format of `expires_at` in the persisted credential record (UTC).
pub const EXPIRES_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Persisted OAuth state.
///
/// Every field is optional: the record is filled in step by step as the
/// authorization moves from "no code" to "token issued". Use
/// [`Credential::has`] instead of checking for `Some`, an empty string counts
/// as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "expires_at_format"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    AuthorizationCode,
    AccessToken,
    RefreshToken,
    ExpiresAt,
}

impl Credential {
    /// Reports whether `field` is present and non-empty.
    pub fn has(&self, field: CredentialField) -> bool {
        fn non_empty(value: &Option<String>) -> bool {
            value.as_deref().is_some_and(|v| !v.trim().is_empty())
        }

        match field {
            CredentialField::AuthorizationCode => non_empty(&self.authorization_code),
            CredentialField::AccessToken => non_empty(&self.access_token),
            CredentialField::RefreshToken => non_empty(&self.refresh_token),
            CredentialField::ExpiresAt => self.expires_at.is_some(),
        }
    }

    /// Copies every field set in `patch` over this record.
    pub fn merge(&mut self, patch: Credential) {
        if patch.authorization_code.is_some() {
            self.authorization_code = patch.authorization_code;
        }
        if patch.access_token.is_some() {
            self.access_token = patch.access_token;
        }
        if patch.refresh_token.is_some() {
            self.refresh_token = patch.refresh_token;
        }
        if patch.expires_at.is_some() {
            self.expires_at = patch.expires_at;
        }
    }

    pub fn clear(&mut self, field: CredentialField) {
        match field {
            CredentialField::AuthorizationCode => self.authorization_code = None,
            CredentialField::AccessToken => self.access_token = None,
            CredentialField::RefreshToken => self.refresh_token = None,
            CredentialField::ExpiresAt => self.expires_at = None,
        }
    }
}

mod expires_at_format {
    use super::*;
    use serde::{Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(at) => serializer.serialize_str(&at.format(EXPIRES_AT_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => NaiveDateTime::parse_from_str(text, EXPIRES_AT_FORMAT)
                .map(|naive| Some(naive.and_utc()))
                .map_err(D::Error::custom),
        }
    }
}

// =============================================================================
// Token endpoint
// =============================================================================

/// Successful response of the token endpoint.
///
/// `refresh_token` is always present on the authorization-code grant; on the
/// refresh grant it is only sent when the provider rotates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
}

// =============================================================================
// Spotify Web API payloads
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    #[serde(default)]
    pub items: Vec<PlayHistoryItem>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub cursors: Option<Cursors>,
    #[serde(default)]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    #[serde(default)]
    pub played_at: Option<String>,
    #[serde(default)]
    pub track: Option<TrackObject>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub explicit: Option<bool>,
    #[serde(default)]
    pub album: Option<AlbumObject>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlbumObject {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub release_date_precision: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtistRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Response of `GET /artists/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullArtist {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: Option<u32>,
    #[serde(default)]
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: Option<u64>,
}

/// Response of `GET /audio-features/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
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

#[derive(Debug, Clone, Default)]
pub struct RecentPlaysQuery {
    pub limit: u32,
    /// Only plays after this instant (unix milliseconds).
    pub after: Option<i64>,
}

// =============================================================================
// Console output
// =============================================================================

#[derive(Tabled)]
pub struct LoadTableRow {
    pub table: String,
    pub inserted: usize,
    pub already_stored: usize,
}
