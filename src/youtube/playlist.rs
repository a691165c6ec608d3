use reqwest::{Client, Response, StatusCode};

use crate::{
    Res,
    config::PlaylistSettings,
    types::{
        ApiErrorResponse, CreatePlaylistRequest, CreatePlaylistResponse, InsertOutcome,
        InsertPlaylistItemRequest, PlaylistItem, PlaylistItemSnippet, PlaylistSnippet,
        PlaylistStatus, ResourceId,
    },
};

/// The two playlist operations a run needs.
#[allow(async_fn_in_trait)]
pub trait PlaylistService {
    /// Creates an empty playlist and returns its ID.
    async fn create_playlist(&self, settings: &PlaylistSettings) -> Res<String>;

    /// Appends a video to a playlist. Never fails, see [`InsertOutcome`].
    async fn insert_item(&self, playlist_id: &str, video_id: &str) -> InsertOutcome;
}

/// YouTube Data API v3 client bound to one access token.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: Client,
    api_url: String,
    access_token: String,
}

impl YouTubeClient {
    /// Creates a client for `api_url` (e.g. `https://www.googleapis.com/youtube/v3`).
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        }
    }
}

impl PlaylistService for YouTubeClient {
    /// Issues `playlists.insert` with snippet and status parts.
    ///
    /// # Errors
    ///
    /// Transport errors and non-2xx answers, the latter described with the
    /// status and the API's error message.
    async fn create_playlist(&self, settings: &PlaylistSettings) -> Res<String> {
        let body = CreatePlaylistRequest {
            snippet: PlaylistSnippet {
                title: settings.title.clone(),
                description: settings.description.clone(),
                default_language: settings.language.clone(),
            },
            status: PlaylistStatus {
                privacy_status: settings.privacy_status.clone(),
            },
        };

        let res = self
            .http
            .post(format!("{}/playlists", self.api_url))
            .query(&[("part", "snippet,status")])
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(describe_error(res).await.into());
        }

        let playlist = res.json::<CreatePlaylistResponse>().await?;
        Ok(playlist.id)
    }

    /// Issues `playlistItems.insert` for one video.
    ///
    /// 404 maps to [`InsertOutcome::NotFound`]; every other failure, including
    /// transport errors, to [`InsertOutcome::Failed`] with a description.
    async fn insert_item(&self, playlist_id: &str, video_id: &str) -> InsertOutcome {
        let body = InsertPlaylistItemRequest {
            snippet: PlaylistItemSnippet {
                playlist_id: playlist_id.to_string(),
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: video_id.to_string(),
                },
            },
        };

        let res = match self
            .http
            .post(format!("{}/playlistItems", self.api_url))
            .query(&[("part", "snippet")])
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
        {
            Ok(res) => res,
            Err(e) => return InsertOutcome::Failed(e.to_string()),
        };

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return InsertOutcome::NotFound;
        }
        if !status.is_success() {
            return InsertOutcome::Failed(describe_error(res).await);
        }

        // The item exists at this point, an odd body does not undo that.
        InsertOutcome::Added(res.json::<PlaylistItem>().await.unwrap_or_default())
    }
}

async fn describe_error(res: Response) -> String {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    match serde_json::from_str::<ApiErrorResponse>(&body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            format!("HTTP {}: {}", status, parsed.error.message)
        }
        _ => format!("HTTP {}", status),
    }
}
