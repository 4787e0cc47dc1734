use chrono::{TimeZone, Utc};
use sporlhist::management::CredentialStore;
use sporlhist::types::{Credential, CredentialField};
use tempfile::tempdir;

#[tokio::test]
async fn test_missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credentials.json"));

    assert_eq!(store.read().await.unwrap(), Credential::default());
    assert!(!store.has(CredentialField::AccessToken).await.unwrap());
}

#[tokio::test]
async fn test_write_merges_fields() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credentials.json"));
    let expires_at = Utc.with_ymd_and_hms(2030, 1, 1, 12, 0, 0).unwrap();

    store
        .write(Credential {
            authorization_code: Some("code".into()),
            ..Credential::default()
        })
        .await
        .unwrap();
    store
        .write(Credential {
            access_token: Some("access".into()),
            refresh_token: Some("refresh".into()),
            expires_at: Some(expires_at),
            ..Credential::default()
        })
        .await
        .unwrap();

    let credential = store.read().await.unwrap();
    assert_eq!(credential.authorization_code.as_deref(), Some("code"));
    assert_eq!(credential.access_token.as_deref(), Some("access"));
    assert_eq!(credential.refresh_token.as_deref(), Some("refresh"));
    assert_eq!(credential.expires_at, Some(expires_at));
}

#[tokio::test]
async fn test_expires_at_is_stored_as_utc_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let store = CredentialStore::new(&path);

    store
        .write(Credential {
            expires_at: Some(Utc.with_ymd_and_hms(2030, 1, 1, 12, 30, 5).unwrap()),
            ..Credential::default()
        })
        .await
        .unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"expires_at\": \"2030-01-01 12:30:05\""), "{}", raw);

    // No temp file is left next to the record
    assert!(!dir.path().join("credentials.json.tmp").exists());
}

#[tokio::test]
async fn test_has_treats_empty_string_as_absent() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credentials.json"));

    store
        .write(Credential {
            refresh_token: Some(String::new()),
            ..Credential::default()
        })
        .await
        .unwrap();

    assert!(!store.has(CredentialField::RefreshToken).await.unwrap());
}

#[tokio::test]
async fn test_clear_removes_field() {
    let dir = tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("credentials.json"));

    store
        .write(Credential {
            authorization_code: Some("code".into()),
            access_token: Some("access".into()),
            ..Credential::default()
        })
        .await
        .unwrap();
    store.clear(CredentialField::AuthorizationCode).await.unwrap();

    assert!(!store.has(CredentialField::AuthorizationCode).await.unwrap());
    assert!(store.has(CredentialField::AccessToken).await.unwrap());
}

#[tokio::test]
async fn test_corrupted_record_is_reinitialized() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    std::fs::write(&path, "{ not json").unwrap();

    let store = CredentialStore::new(&path);
    assert_eq!(store.read().await.unwrap(), Credential::default());

    // The file was rewritten as an empty record
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.trim(), "{}");
}

#[cfg(unix)]
#[tokio::test]
async fn test_record_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let path = dir.path().join("credentials.json");
    let store = CredentialStore::new(&path);

    store
        .write(Credential {
            access_token: Some("access".into()),
            ..Credential::default()
        })
        .await
        .unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}
