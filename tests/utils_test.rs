use std::collections::HashMap;

use chrono::NaiveDate;
use sporlhist::ValidationError;
use sporlhist::config::Config;
use sporlhist::utils::*;

// Helper function to build a config from a handful of variables
fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("SPOTIFY_API_AUTH_CLIENT_ID".into(), "client-id".into());
    vars.insert("SPOTIFY_API_AUTH_CLIENT_SECRET".into(), "client-secret".into());
    for (key, value) in extra {
        vars.insert(key.to_string(), value.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("valid config")
}

#[test]
fn test_normalize_release_date_year_precision() {
    let date = normalize_release_date("1999").unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
}

#[test]
fn test_normalize_release_date_month_precision() {
    let date = normalize_release_date("1999-07").unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(1999, 7, 1).unwrap());
}

#[test]
fn test_normalize_release_date_day_precision() {
    let date = normalize_release_date("1999-07-15").unwrap();
    assert_eq!(date, NaiveDate::from_ymd_opt(1999, 7, 15).unwrap());
}

#[test]
fn test_normalize_release_date_invalid_inputs() {
    for raw in ["", "99", "1999-7", "1999-13", "1999-02-30", "July 1999", "1999-07-15-01"] {
        assert_eq!(
            normalize_release_date(raw),
            Err(ValidationError::InvalidReleaseDate(raw.to_string())),
            "input {:?}",
            raw
        );
    }
}

#[test]
fn test_join_genres() {
    let genres = vec!["pop".to_string(), " rock ".to_string(), "".to_string()];
    assert_eq!(join_genres(&genres), "pop; rock");
    assert_eq!(join_genres(&[]), "");
}

#[test]
fn test_explode_genres() {
    assert_eq!(explode_genres("pop; rock"), vec!["pop", "rock"]);

    // Whitespace and duplicates are dropped
    assert_eq!(explode_genres(" pop ;rock; pop "), vec!["pop", "rock"]);
}

#[test]
fn test_explode_genres_empty_yields_placeholder() {
    assert_eq!(explode_genres(""), vec![UNKNOWN_GENRE]);
    assert_eq!(explode_genres(" ; "), vec![UNKNOWN_GENRE]);
    assert_eq!(explode_genres(&join_genres(&[])), vec![UNKNOWN_GENRE]);
}

#[test]
fn test_unique_ids() {
    let ids = unique_ids(vec![
        Some("b"),
        Some("a"),
        None,
        Some("b"),
        Some(" "),
        Some("a"),
    ]);

    assert_eq!(ids.len(), 2);
    assert_eq!(ids.into_iter().collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_basic_auth_header() {
    // base64("client-id:client-secret")
    assert_eq!(
        basic_auth_header("client-id", "client-secret"),
        "Basic Y2xpZW50LWlkOmNsaWVudC1zZWNyZXQ="
    );
}

#[test]
fn test_parse_after() {
    assert_eq!(parse_after("1970-01-01T00:00:01Z").unwrap(), 1000);
    assert_eq!(parse_after("1970-01-02").unwrap(), 86_400_000);
    assert_eq!(
        parse_after("2024-01-01T01:00:00+01:00").unwrap(),
        parse_after("2024-01-01").unwrap()
    );
    assert!(parse_after("yesterday").is_err());
}

#[test]
fn test_authorize_url() {
    let config = test_config(&[("SPOTIFY_API_SHOW_DIALOG", "true")]);
    let url = authorize_url(&config);

    assert!(url.as_str().starts_with("https://accounts.spotify.com/authorize?"));

    let pairs: HashMap<String, String> = url.query_pairs().into_owned().collect();
    assert_eq!(pairs["response_type"], "code");
    assert_eq!(pairs["client_id"], "client-id");
    assert_eq!(pairs["scope"], "user-read-recently-played");
    assert_eq!(pairs["redirect_uri"], "http://127.0.0.1:8080/callback/q");
    assert_eq!(pairs["show_dialog"], "true");
}
