//! Credential lookups keyed by application id.
//!
//! The service only ever asks two questions: which token does this
//! application log in with, and which presence line should it show. Both
//! sit behind a trait so the binaries depend on the interface rather than
//! on the file layout backing it.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("failed to read credential file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credential file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_saphyr::Error,
    },
}

/// Keyed credential lookups. A missing key is `Ok(None)`, not an error;
/// the caller decides whether that is fatal.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Login token for the given application id.
    async fn token(&self, app_id: &str) -> Result<Option<String>, CredentialError>;

    /// Presence line for the given application id.
    async fn presence_text(&self, app_id: &str) -> Result<Option<String>, CredentialError>;
}

#[derive(Debug, Deserialize)]
struct CredentialEntry {
    token: String,
    #[serde(default)]
    presence: Option<String>,
}

/// Credential store backed by a YAML map of `appId -> {token, presence}`.
///
/// The file is re-read on every lookup, so rotating a token does not
/// require a restart.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Result<HashMap<String, CredentialEntry>, CredentialError> {
        let contents =
            tokio::fs::read_to_string(&self.path)
                .await
                .map_err(|source| CredentialError::Io {
                    path: self.path.clone(),
                    source,
                })?;
        serde_saphyr::from_str(&contents).map_err(|source| CredentialError::Parse {
            path: self.path.clone(),
            source,
        })
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn token(&self, app_id: &str) -> Result<Option<String>, CredentialError> {
        let mut entries = self.load().await?;
        Ok(entries.remove(app_id).map(|entry| entry.token))
    }

    async fn presence_text(&self, app_id: &str) -> Result<Option<String>, CredentialError> {
        let mut entries = self.load().await?;
        Ok(entries.remove(app_id).and_then(|entry| entry.presence))
    }
}
