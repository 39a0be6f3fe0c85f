//! Response archive for recording and replaying a collection run
//!
//! Each response is stored as one JSON file whose name is the blake3 hash of
//! the request URL and its query parameters, so a replayed run issues exactly
//! the same lookups as the recorded one.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use forge_core::error::ForgeError;
use crate::transport::{RawResponse, Transport};
use crate::RegistryResult;

/// One archived response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Request URL without the explicit parameters
    pub url: String,
    /// Explicit query parameters, in request order
    pub params: Vec<(String, String)>,
    /// HTTP status of the response
    pub status: u16,
    /// Raw response body
    pub body: String,
    /// When the response was stored
    pub archived_at: DateTime<Utc>,
}

/// Directory-backed response archive
#[derive(Debug, Clone)]
pub struct Archive {
    root: Utf8PathBuf,
}

impl Archive {
    /// Open an archive, creating its directory if needed
    pub async fn create(root: impl Into<Utf8PathBuf>) -> RegistryResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| ForgeError::io(format!("Failed to create archive directory {}", root), e))?;
        Ok(Self { root })
    }

    /// Open an existing archive for replay
    pub fn open(root: impl Into<Utf8PathBuf>) -> RegistryResult<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ForgeError::Archive {
                message: format!("archive directory {} does not exist", root),
            });
        }
        Ok(Self { root })
    }

    /// Archive directory
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Hash identifying a request
    pub fn entry_key(url: &Url, params: &[(String, String)]) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(url.as_str().as_bytes());
        for (key, value) in params {
            hasher.update(b"\n");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.as_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }

    fn entry_path(&self, key: &str) -> Utf8PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Store the response of a request, replacing any previous one
    pub async fn store(
        &self,
        url: &Url,
        params: &[(String, String)],
        response: &RawResponse,
    ) -> RegistryResult<()> {
        let entry = ArchiveEntry {
            url: url.to_string(),
            params: params.to_vec(),
            status: response.status,
            body: response.text.clone(),
            archived_at: Utc::now(),
        };

        let content = serde_json::to_vec_pretty(&entry)
            .map_err(|e| ForgeError::Archive { message: format!("Failed to encode entry: {}", e) })?;

        let path = self.entry_path(&Self::entry_key(url, params));
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| ForgeError::io(format!("Failed to write archive entry {}", path), e))?;

        debug!("Archived response of {} as {}", url, path);
        Ok(())
    }

    /// Look up the stored response of a request
    pub async fn retrieve(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<Option<ArchiveEntry>> {
        let path = self.entry_path(&Self::entry_key(url, params));

        let content = match tokio::fs::read(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ForgeError::io(format!("Failed to read archive entry {}", path), e)),
        };

        let entry = serde_json::from_slice(&content).map_err(|e| ForgeError::Archive {
            message: format!("corrupted archive entry {}: {}", path, e),
        })?;

        Ok(Some(entry))
    }

    /// Number of stored responses
    pub async fn len(&self) -> RegistryResult<usize> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| ForgeError::io(format!("Failed to list archive {}", self.root), e))?;

        let mut count = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ForgeError::io(format!("Failed to list archive {}", self.root), e))?
        {
            if entry.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }

        Ok(count)
    }

    /// Check whether the archive holds no responses
    pub async fn is_empty(&self) -> RegistryResult<bool> {
        Ok(self.len().await? == 0)
    }
}

/// Transport that forwards to another one and archives every response
pub struct RecordingTransport<T> {
    inner: T,
    archive: Archive,
}

impl<T: Transport> RecordingTransport<T> {
    pub fn new(inner: T, archive: Archive) -> Self {
        Self { inner, archive }
    }

    pub fn archive(&self) -> &Archive {
        &self.archive
    }
}

#[async_trait]
impl<T: Transport> Transport for RecordingTransport<T> {
    async fn get(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse> {
        let response = self.inner.get(url, params).await?;
        self.archive.store(url, params, &response).await?;
        Ok(response)
    }
}

/// Transport answering every request from an archive
pub struct ReplayTransport {
    archive: Archive,
}

impl ReplayTransport {
    pub fn new(archive: Archive) -> Self {
        Self { archive }
    }
}

#[async_trait]
impl Transport for ReplayTransport {
    async fn get(&self, url: &Url, params: &[(String, String)]) -> RegistryResult<RawResponse> {
        let entry = self.archive.retrieve(url, params).await?.ok_or_else(|| ForgeError::Archive {
            message: format!("no archived response for {} params: {:?}", url, params),
        })?;

        debug!("Replaying archived response of {}", url);

        RawResponse {
            url: entry.url,
            status: entry.status,
            text: entry.body,
        }
        .error_for_status()
    }
}
