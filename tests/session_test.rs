mod common;

use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::atomic::{AtomicUsize, Ordering},
};

use axum::{Form, Json, Router, http::StatusCode, routing::post};
use chrono::Utc;
use serde_json::{Value, json};
use ytplaylist::{
    Res,
    config::{Config, YOUTUBE_SCOPE},
    management::TokenManager,
    types::Credential,
    youtube::auth::{Authorizer, GoogleAuthorizer},
};

fn now() -> u64 {
    Utc::now().timestamp() as u64
}

// Helper function to create a test credential
fn credential(access_token: &str, refresh_token: Option<&str>, obtained_at: u64) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: refresh_token.map(str::to_string),
        scope: YOUTUBE_SCOPE.to_string(),
        expires_in: 3600,
        obtained_at,
        token_uri: "https://oauth2.googleapis.com/token".to_string(),
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
    }
}

fn write_cache(path: &Path, credential: &Credential) {
    fs::write(path, serde_json::to_string_pretty(credential).unwrap()).unwrap();
}

fn read_cache(path: &Path) -> Credential {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

/// Authorizer that hands out canned credentials and counts calls.
struct FakeAuthorizer {
    authorized: Credential,
    refreshed: Option<Credential>,
    authorize_calls: AtomicUsize,
    refresh_calls: AtomicUsize,
}

impl FakeAuthorizer {
    fn new(refreshed: Option<Credential>) -> Self {
        Self {
            authorized: credential("interactive-access", Some("interactive-refresh"), now()),
            refreshed,
            authorize_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
        }
    }

    fn authorize_calls(&self) -> usize {
        self.authorize_calls.load(Ordering::SeqCst)
    }

    fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

impl Authorizer for FakeAuthorizer {
    async fn authorize(&self) -> Res<Credential> {
        self.authorize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.authorized.clone())
    }

    async fn refresh(&self, _credential: &Credential) -> Res<Option<Credential>> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.refreshed.clone())
    }
}

/// Authorizer whose interactive flow always fails.
struct FailingAuthorizer;

impl Authorizer for FailingAuthorizer {
    async fn authorize(&self) -> Res<Credential> {
        Err("authorization timed out after 300 seconds".into())
    }

    async fn refresh(&self, _credential: &Credential) -> Res<Option<Credential>> {
        Err("token refresh rejected: unauthorized_client".into())
    }
}

#[test]
fn test_credential_validity() {
    let fresh = credential("access", Some("refresh"), now());
    assert!(fresh.is_valid());
    assert!(!fresh.is_expired());
    assert!(!fresh.can_refresh());

    let expired = credential("access", Some("refresh"), now() - 7200);
    assert!(!expired.is_valid());
    assert!(expired.is_expired());
    assert!(expired.can_refresh());

    // Within the safety margin counts as expired
    let almost = credential("access", Some("refresh"), now() - 3500);
    assert!(almost.is_expired());

    let expired_without_refresh = credential("access", None, now() - 7200);
    assert!(!expired_without_refresh.can_refresh());

    let empty_access = credential("", Some("refresh"), now());
    assert!(!empty_access.is_valid());
    assert!(!empty_access.can_refresh());
}

#[tokio::test]
async fn test_obtain_without_cache_runs_interactive_flow() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    let authorizer = FakeAuthorizer::new(None);

    let manager = TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert_eq!(manager.access_token(), "interactive-access");
    assert_eq!(authorizer.authorize_calls(), 1);
    assert_eq!(authorizer.refresh_calls(), 0);
    assert_eq!(read_cache(&path), authorizer.authorized);
}

#[tokio::test]
async fn test_obtain_with_valid_cache_makes_no_calls() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    let cached = credential("cached-access", Some("cached-refresh"), now());
    write_cache(&path, &cached);
    let before = fs::read_to_string(&path).unwrap();

    let authorizer = FakeAuthorizer::new(None);
    let manager = TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert_eq!(manager.current_token(), &cached);
    assert_eq!(authorizer.authorize_calls(), 0);
    assert_eq!(authorizer.refresh_calls(), 0);
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn test_obtain_refreshes_expired_credential() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    write_cache(&path, &credential("old-access", Some("cached-refresh"), now() - 7200));

    let refreshed = credential("refreshed-access", Some("cached-refresh"), now());
    let authorizer = FakeAuthorizer::new(Some(refreshed.clone()));
    let manager = TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert_eq!(manager.access_token(), "refreshed-access");
    assert_eq!(authorizer.refresh_calls(), 1);
    assert_eq!(authorizer.authorize_calls(), 0);
    assert_eq!(read_cache(&path), refreshed);
}

#[tokio::test]
async fn test_obtain_expired_without_refresh_token_reauthorizes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    write_cache(&path, &credential("old-access", None, now() - 7200));

    let authorizer = FakeAuthorizer::new(None);
    let manager = TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert_eq!(manager.access_token(), "interactive-access");
    assert_eq!(authorizer.refresh_calls(), 0);
    assert_eq!(authorizer.authorize_calls(), 1);
}

#[tokio::test]
async fn test_obtain_rejected_refresh_falls_back_to_authorization() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    write_cache(&path, &credential("old-access", Some("revoked"), now() - 7200));

    let authorizer = FakeAuthorizer::new(None);
    let manager = TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert_eq!(manager.access_token(), "interactive-access");
    assert_eq!(authorizer.refresh_calls(), 1);
    assert_eq!(authorizer.authorize_calls(), 1);
    assert_eq!(read_cache(&path).access_token, "interactive-access");
}

#[tokio::test]
async fn test_obtain_with_unreadable_cache_reauthorizes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    fs::write(&path, "\u{80}\u{3}not json").unwrap();

    let authorizer = FakeAuthorizer::new(None);
    let manager = TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert_eq!(manager.access_token(), "interactive-access");
    assert_eq!(authorizer.authorize_calls(), 1);
    assert_eq!(read_cache(&path), authorizer.authorized);
}

#[test]
fn test_credential_with_huge_lifetime() {
    let far = Credential {
        expires_in: u64::MAX,
        ..credential("access", Some("refresh"), 10)
    };
    assert!(!far.is_expired());
    assert!(far.is_valid());
}

#[tokio::test]
async fn test_obtain_with_huge_cached_lifetime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    fs::write(
        &path,
        r#"{
            "access_token": "cached-access",
            "refresh_token": "cached-refresh",
            "scope": "https://www.googleapis.com/auth/youtube",
            "expires_in": 18446744073709551615,
            "obtained_at": 10,
            "token_uri": "https://oauth2.googleapis.com/token",
            "client_id": "client-id",
            "client_secret": "client-secret"
        }"#,
    )
    .unwrap();

    let authorizer = FakeAuthorizer::new(None);
    let manager = TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert_eq!(manager.access_token(), "cached-access");
    assert_eq!(authorizer.authorize_calls(), 0);
    assert_eq!(authorizer.refresh_calls(), 0);
}

#[tokio::test]
async fn test_obtain_creates_cache_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache").join("nested").join("token.json");

    let authorizer = FakeAuthorizer::new(None);
    TokenManager::obtain(&path, &authorizer).await.unwrap();

    assert!(path.is_file());
}

#[tokio::test]
async fn test_obtain_propagates_authorization_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");

    let err = TokenManager::obtain(&path, &FailingAuthorizer)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("timed out"));

    // Nothing is cached on failure
    assert!(!path.exists());
}

#[tokio::test]
async fn test_obtain_propagates_refresh_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("token_youtube.json");
    let expired = credential("old-access", Some("cached-refresh"), now() - 7200);
    write_cache(&path, &expired);

    let err = TokenManager::obtain(&path, &FailingAuthorizer)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("unauthorized_client"));

    // The old cache is left alone
    assert_eq!(read_cache(&path), expired);
}

async fn token_endpoint(Form(form): Form<HashMap<String, String>>) -> (StatusCode, Json<Value>) {
    if form.get("grant_type").map(String::as_str) != Some("refresh_token")
        || form.get("client_id").map(String::as_str) != Some("client-id")
        || form.get("client_secret").map(String::as_str) != Some("client-secret")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_request" })),
        );
    }

    match form.get("refresh_token").map(String::as_str) {
        Some("good-refresh") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "new-access",
                "expires_in": 3599,
                "scope": YOUTUBE_SCOPE,
                "token_type": "Bearer"
            })),
        ),
        Some("rotating-refresh") => (
            StatusCode::OK,
            Json(json!({
                "access_token": "new-access",
                "refresh_token": "rotated-refresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "Token has been expired or revoked."
            })),
        ),
    }
}

async fn spawn_token_endpoint() -> String {
    let app = Router::new()
        .route("/token", post(token_endpoint))
        .route(
            "/broken",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable") }),
        );
    common::spawn_server(app).await
}

fn expired_with(refresh_token: &str, token_uri: String) -> Credential {
    Credential {
        token_uri,
        ..credential("old-access", Some(refresh_token), now() - 7200)
    }
}

#[tokio::test]
async fn test_google_refresh_keeps_refresh_token() {
    let base = spawn_token_endpoint().await;
    let authorizer = GoogleAuthorizer::new(&Config::default());
    let expired = expired_with("good-refresh", format!("{}/token", base));

    let refreshed = authorizer.refresh(&expired).await.unwrap().unwrap();

    assert_eq!(refreshed.access_token, "new-access");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("good-refresh"));
    assert_eq!(refreshed.expires_in, 3599);
    assert_eq!(refreshed.client_id, "client-id");
    assert_eq!(refreshed.token_uri, expired.token_uri);
    assert!(refreshed.is_valid());
}

#[tokio::test]
async fn test_google_refresh_takes_rotated_token() {
    let base = spawn_token_endpoint().await;
    let authorizer = GoogleAuthorizer::new(&Config::default());
    let expired = expired_with("rotating-refresh", format!("{}/token", base));

    let refreshed = authorizer.refresh(&expired).await.unwrap().unwrap();

    assert_eq!(refreshed.refresh_token.as_deref(), Some("rotated-refresh"));
    // Scope falls back to the one already granted
    assert_eq!(refreshed.scope, YOUTUBE_SCOPE);
}

#[tokio::test]
async fn test_google_refresh_invalid_grant() {
    let base = spawn_token_endpoint().await;
    let authorizer = GoogleAuthorizer::new(&Config::default());
    let expired = expired_with("revoked-refresh", format!("{}/token", base));

    assert!(authorizer.refresh(&expired).await.unwrap().is_none());
}

#[tokio::test]
async fn test_google_refresh_server_error() {
    let base = spawn_token_endpoint().await;
    let authorizer = GoogleAuthorizer::new(&Config::default());
    let expired = expired_with("good-refresh", format!("{}/broken", base));

    let err = authorizer.refresh(&expired).await.err().unwrap();
    assert!(err.to_string().contains("500"));
}
