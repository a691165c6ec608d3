use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::{Res, info, types::Credential, warning, youtube::auth::Authorizer};

/// Owns the credential of a run and its on-disk cache.
pub struct TokenManager {
    token: Credential,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(token: Credential, path: impl Into<PathBuf>) -> Self {
        TokenManager {
            token,
            path: path.into(),
        }
    }

    /// Produces a usable credential, touching the network only when needed.
    ///
    /// A valid cached credential is used as is. An expired one with a
    /// refresh token is refreshed. Everything else, including a refresh
    /// token the provider no longer accepts, goes through the interactive
    /// flow. The cache is rewritten whenever the credential changed.
    ///
    /// # Errors
    ///
    /// Cache I/O failures, failed refreshes and failed authorizations are
    /// returned as is; the caller treats them as fatal.
    pub async fn obtain<A: Authorizer>(path: &Path, authorizer: &A) -> Res<Self> {
        let token = match Self::load(path).await? {
            Some(manager) if manager.token.is_valid() => return Ok(manager),
            Some(manager) if manager.token.can_refresh() => {
                info!("Cached credential expired, refreshing it");
                match authorizer.refresh(&manager.token).await? {
                    Some(token) => token,
                    None => {
                        warning!("Refresh token was rejected, authorization is required again");
                        authorizer.authorize().await?
                    }
                }
            }
            _ => authorizer.authorize().await?,
        };

        let manager = Self::new(token, path);
        manager.persist().await?;
        Ok(manager)
    }

    /// Reads the cached credential.
    ///
    /// Returns `Ok(None)` when there is no cache file or when its content
    /// cannot be parsed, so a fresh authorization replaces it.
    pub async fn load(path: &Path) -> Res<Option<Self>> {
        let content = match async_fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(format!("cannot read credential cache {}: {}", path.display(), e).into());
            }
        };

        match serde_json::from_str::<Credential>(&content) {
            Ok(token) => Ok(Some(Self::new(token, path))),
            Err(e) => {
                warning!(
                    "Ignoring unreadable credential cache {}: {}",
                    path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    pub async fn persist(&self) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                async_fs::create_dir_all(parent).await.map_err(|e| {
                    format!("cannot create directory {}: {}", parent.display(), e)
                })?;
            }
        }

        let json = serde_json::to_string_pretty(&self.token)?;
        async_fs::write(&self.path, json).await.map_err(|e| {
            format!(
                "cannot write credential cache {}: {}",
                self.path.display(),
                e
            )
            .into()
        })
    }

    pub fn access_token(&self) -> &str {
        &self.token.access_token
    }

    pub fn current_token(&self) -> &Credential {
        &self.token
    }
}
