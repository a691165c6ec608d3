use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use tokio::sync::Mutex;

/// Seconds before the real expiry at which a credential stops being used.
pub const EXPIRY_MARGIN_SECS: u64 = 240;

/// OAuth credential cached between runs.
///
/// Carries the token endpoint and client identity next to the tokens so an
/// expired credential can be refreshed without the client descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
}

impl Credential {
    pub fn is_expired(&self) -> bool {
        let now = Utc::now().timestamp().max(0) as u64;
        let expires_at = self.obtained_at.saturating_add(self.expires_in);
        now.saturating_add(EXPIRY_MARGIN_SECS) >= expires_at
    }

    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    /// True when the only thing wrong with the credential is its age.
    pub fn can_refresh(&self) -> bool {
        !self.access_token.is_empty()
            && self.is_expired()
            && self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Raw response of the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Error body returned by the OAuth token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Client entry of the OAuth client descriptor file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
}

/// The descriptor as downloaded from the Google Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecretsFile {
    pub installed: Option<ClientSecrets>,
    pub web: Option<ClientSecrets>,
}

impl ClientSecretsFile {
    pub fn into_client(self) -> Option<ClientSecrets> {
        self.installed.or(self.web)
    }
}

/// State shared between the authorization flow and the callback handler.
#[derive(Debug, Clone)]
pub struct PendingAuthorization {
    pub code_verifier: String,
    pub csrf_state: String,
    pub redirect_uri: String,
    pub client: ClientSecrets,
    pub scope: String,
    pub token: Option<Credential>,
    pub error: Option<String>,
}

pub type SharedAuthorization = Arc<Mutex<Option<PendingAuthorization>>>;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistSnippet {
    pub title: String,
    pub description: String,
    pub default_language: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatus {
    pub privacy_status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub snippet: PlaylistSnippet,
    pub status: PlaylistStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceId {
    pub kind: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItemSnippet {
    pub playlist_id: String,
    pub resource_id: ResourceId,
}

#[derive(Debug, Clone, Serialize)]
pub struct InsertPlaylistItemRequest {
    pub snippet: PlaylistItemSnippet,
}

/// Playlist item as created by the API.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
}

/// Result of adding one video to the playlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Added(PlaylistItem),
    /// The API answered 404, the video does not exist (anymore).
    NotFound,
    /// Any other failure, with a human readable detail.
    Failed(String),
}

/// Outcome of a whole run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub playlist_id: String,
    pub added: usize,
    /// Original text of every skipped link, in input order.
    pub failed: Vec<String>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Tabled)]
pub struct SkippedLinkRow {
    #[tabled(rename = "#")]
    pub position: usize,
    pub link: String,
}
