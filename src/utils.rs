use std::collections::BTreeSet;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Url;

use crate::{Error, Res, ValidationError, config::Config};

/// Genre recorded for an artist the catalog lists without any genre.
pub const UNKNOWN_GENRE: &str = "<unknown>";

/// Separator of the flattened genre list of an artist.
pub const GENRE_DELIMITER: &str = "; ";

/// `Authorization` header value for the token endpoint.
pub fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let creds = format!("{}:{}", client_id, client_secret);
    format!("Basic {}", STANDARD.encode(creds))
}

/// Consent screen URL the browser is sent to.
pub fn authorize_url(config: &Config) -> Url {
    let mut url = config.auth_url.clone();
    url.query_pairs_mut()
        .append_pair("response_type", "code")
        .append_pair("redirect_uri", config.redirect_uri.as_str())
        .append_pair("scope", &config.scope)
        .append_pair("show_dialog", if config.show_dialog { "true" } else { "false" })
        .append_pair("client_id", &config.client_id);
    url
}

/// Completes a partial release date to day precision.
///
/// `1999` becomes `1999-01-01`, `1999-07` becomes `1999-07-01`, full dates are
/// kept as they are.
pub fn normalize_release_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    let invalid = || ValidationError::InvalidReleaseDate(raw.to_string());

    let parts: Vec<&str> = trimmed.split('-').collect();
    let full = match parts.as_slice() {
        [year] if year.len() == 4 => format!("{}-01-01", year),
        [year, month] if year.len() == 4 && month.len() == 2 => format!("{}-{}-01", year, month),
        [year, month, day] if year.len() == 4 && month.len() == 2 && day.len() == 2 => {
            trimmed.to_string()
        }
        _ => return Err(invalid()),
    };

    NaiveDate::parse_from_str(&full, "%Y-%m-%d").map_err(|_| invalid())
}

/// Flattens the genres of an artist into one delimited value.
pub fn join_genres(genres: &[String]) -> String {
    genres
        .iter()
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .collect::<Vec<_>>()
        .join(GENRE_DELIMITER)
}

/// Splits a delimited genre value back into distinct genres.
///
/// An empty value yields the [`UNKNOWN_GENRE`] placeholder, so every artist
/// ends up with at least one genre.
pub fn explode_genres(joined: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut genres: Vec<String> = joined
        .split(GENRE_DELIMITER.trim())
        .map(|g| g.trim())
        .filter(|g| !g.is_empty())
        .filter(|g| seen.insert(g.to_string()))
        .map(str::to_string)
        .collect();

    if genres.is_empty() {
        genres.push(UNKNOWN_GENRE.to_string());
    }
    genres
}

/// Collects the distinct, non-empty ids of an iterator.
pub fn unique_ids<'a, I>(ids: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    ids.into_iter()
        .flatten()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses the `--after` argument: an RFC 3339 timestamp or a `YYYY-MM-DD` day
/// (midnight UTC). Returns unix milliseconds.
pub fn parse_after(raw: &str) -> Res<i64> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc).timestamp_millis());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or_else(|| {
            Error::Config(format!(
                "--after expects an RFC 3339 timestamp or YYYY-MM-DD, got {:?}",
                raw
            ))
        })
}
