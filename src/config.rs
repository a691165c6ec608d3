//! Configuration management for the YouTube playlist builder.
//!
//! Configuration is resolved once at start and passed down explicitly:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf, time::Duration};

/// OAuth scope granting full read/write management of the YouTube account.
pub const YOUTUBE_SCOPE: &str = "https://www.googleapis.com/auth/youtube";

pub const DEFAULT_CLIENT_SECRETS: &str = "client_secret.json";
pub const DEFAULT_TOKEN_CACHE: &str = "token_youtube.json";
pub const DEFAULT_LINKS: &str = "links.txt";
pub const DEFAULT_API_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_TITLE: &str = "Neetcode 150 Pattern Recognition Edition";
pub const DEFAULT_DESCRIPTION: &str = "Playlist created via the YouTube Data API";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_PRIVACY_STATUS: &str = "private";
pub const DEFAULT_AUTH_TIMEOUT_SECS: u64 = 300;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Looks for the file in:
/// - Linux: `~/.local/share/ytplaylist/.env`
/// - macOS: `~/Library/Application Support/ytplaylist/.env`
/// - Windows: `%LOCALAPPDATA%/ytplaylist/.env`
///
/// A missing `.env` is fine, every setting has a default. A present but
/// malformed file is an error.
pub async fn load_env() -> Result<(), String> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("ytplaylist/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if !path.is_file() {
        return Ok(());
    }

    dotenv::from_path(&path)
        .map(|_| ())
        .map_err(|e| format!("{}: {}", path.display(), e))
}

/// Metadata applied to the playlist created by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistSettings {
    pub title: String,
    pub description: String,
    pub language: String,
    pub privacy_status: String,
}

impl Default for PlaylistSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            privacy_status: DEFAULT_PRIVACY_STATUS.to_string(),
        }
    }
}

/// Everything a run needs to know about its surroundings.
#[derive(Debug, Clone)]
pub struct Config {
    /// OAuth client descriptor downloaded from the Google Cloud console.
    pub client_secrets_path: PathBuf,
    /// Where the credential is cached between runs.
    pub token_path: PathBuf,
    /// Link source file, one URL per line.
    pub links_path: PathBuf,
    /// YouTube Data API base URL, without trailing slash.
    pub api_url: String,
    pub scope: String,
    /// How long to wait for the user to finish the browser authorization.
    pub auth_timeout: Duration,
    pub playlist: PlaylistSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            client_secrets_path: PathBuf::from(DEFAULT_CLIENT_SECRETS),
            token_path: PathBuf::from(DEFAULT_TOKEN_CACHE),
            links_path: PathBuf::from(DEFAULT_LINKS),
            api_url: DEFAULT_API_URL.to_string(),
            scope: YOUTUBE_SCOPE.to_string(),
            auth_timeout: Duration::from_secs(DEFAULT_AUTH_TIMEOUT_SECS),
            playlist: PlaylistSettings::default(),
        }
    }
}

impl Config {
    /// Builds the configuration from the process environment.
    ///
    /// Unset variables fall back to the defaults. Fails only when a variable
    /// is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, String> {
        let defaults = Config::default();

        let auth_timeout = match env::var("YTPLAYLIST_AUTH_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(raw.trim().parse::<u64>().map_err(|e| {
                format!("YTPLAYLIST_AUTH_TIMEOUT_SECS must be a number of seconds: {e}")
            })?),
            Err(_) => defaults.auth_timeout,
        };

        Ok(Self {
            client_secrets_path: env_path(
                "YTPLAYLIST_CLIENT_SECRETS",
                defaults.client_secrets_path,
            ),
            token_path: env_path("YTPLAYLIST_TOKEN_CACHE", defaults.token_path),
            links_path: env_path("YTPLAYLIST_LINKS", defaults.links_path),
            api_url: env_or("YOUTUBE_API_URL", defaults.api_url)
                .trim_end_matches('/')
                .to_string(),
            scope: defaults.scope,
            auth_timeout,
            playlist: PlaylistSettings {
                title: env_or("YTPLAYLIST_TITLE", defaults.playlist.title),
                description: env_or("YTPLAYLIST_DESCRIPTION", defaults.playlist.description),
                ..defaults.playlist
            },
        })
    }
}

fn env_or(key: &str, default: String) -> String {
    env::var(key).unwrap_or(default)
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    env::var_os(key).map(PathBuf::from).unwrap_or(default)
}
