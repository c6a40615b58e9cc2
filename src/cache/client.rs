//! HTTP client for the actions cache service
//!
//! Speaks the `_apis/artifactcache` endpoints: entry lookup, reservation,
//! chunked upload, commit. Archive downloads go to the pre-signed blob URL
//! the lookup returns, outside the authenticated session.

use crate::cache::archive::{create_archive, extract_archive};
use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const API_VERSION: &str = "application/json;api-version=6.0-preview.1";

/// Upload chunk size; the service accepts ranged PATCHes up to 32 MB
const CHUNK_SIZE: usize = 32 * 1024 * 1024;

/// A cache entry returned by lookup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The key the entry was stored under (may be a fallback match)
    pub cache_key: String,
    /// Pre-signed URL of the archive blob
    pub archive_location: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReserveRequest<'a> {
    key: &'a str,
    version: &'a str,
    cache_size: u64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReserveResponse {
    cache_id: i64,
}

#[derive(Serialize)]
struct CommitRequest {
    size: u64,
}

/// Scratch path for an in-flight archive, unique per process and key
fn temp_archive_path(op: &str, key: &str) -> std::path::PathBuf {
    let safe: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    std::env::temp_dir().join(format!("ci-kit-{op}-{}-{safe}.tgz", std::process::id()))
}

/// Client for one cache service endpoint + runtime token
pub struct CacheClient {
    http: Client,
    base_url: String,
    token: String,
}

impl CacheClient {
    /// Create a client for the service at `base_url` (`ACTIONS_CACHE_URL`)
    /// authenticated by `token` (`ACTIONS_RUNTIME_TOKEN`).
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent("ci-kit")
            .build()
            .map_err(|e| Error::Cache(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Version discriminator: caches are only shared between runs whose
    /// path set and archive format match.
    pub fn cache_version(paths: &[String]) -> String {
        let mut hasher = Sha256::new();
        for path in paths {
            hasher.update(path.as_bytes());
            hasher.update(b"\n");
        }
        hasher.update(b"tar.gz");
        format!("{:x}", hasher.finalize())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/_apis/artifactcache/{path}", self.base_url)
    }

    /// Look up a cache entry for the ordered key list.
    ///
    /// Returns `None` on a miss (204/404) — an informational condition,
    /// not an error.
    pub async fn lookup(&self, keys: &[String], version: &str) -> Result<Option<CacheEntry>> {
        debug!(?keys, "looking up cache entry");
        let response = self
            .http
            .get(self.endpoint("cache"))
            .query(&[("keys", keys.join(",")), ("version", version.to_string())])
            .bearer_auth(&self.token)
            .header("Accept", API_VERSION)
            .send()
            .await
            .map_err(|e| Error::Cache(format!("cache lookup failed: {e}")))?;

        match response.status() {
            StatusCode::NO_CONTENT | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let entry: CacheEntry = response
                    .json()
                    .await
                    .map_err(|e| Error::Cache(format!("invalid cache lookup response: {e}")))?;
                debug!(matched = %entry.cache_key, "cache hit");
                Ok(Some(entry))
            }
            status => Err(Error::Cache(format!(
                "cache lookup for keys [{}] returned {status}",
                keys.join(", ")
            ))),
        }
    }

    /// Restore cached paths into `workdir`.
    ///
    /// Returns the matched key, or `None` when no entry matched the
    /// primary key or any fallback prefix.
    pub async fn restore(
        &self,
        primary_key: &str,
        fallback_prefixes: &[String],
        paths: &[String],
        workdir: &Path,
    ) -> Result<Option<String>> {
        let mut keys = vec![primary_key.to_string()];
        keys.extend_from_slice(fallback_prefixes);

        let Some(entry) = self.lookup(&keys, &Self::cache_version(paths)).await? else {
            return Ok(None);
        };

        let archive_path =
            temp_archive_path("restore", &entry.cache_key);
        self.download(&entry.archive_location, &archive_path).await?;
        extract_archive(&archive_path, workdir)?;
        let _ = std::fs::remove_file(&archive_path);

        info!(key = %entry.cache_key, "restored cache");
        Ok(Some(entry.cache_key))
    }

    /// Archive `paths` under `workdir` and save them under `key`.
    ///
    /// Returns the new cache id, or `None` when the key was already
    /// reserved (another attempt of the run got there first).
    pub async fn save(&self, key: &str, paths: &[String], workdir: &Path) -> Result<Option<i64>> {
        let archive_path = temp_archive_path("save", key);
        let size = create_archive(workdir, paths, &archive_path)?;

        let reserved = self
            .reserve(key, &Self::cache_version(paths), size)
            .await?;
        let Some(cache_id) = reserved else {
            let _ = std::fs::remove_file(&archive_path);
            return Ok(None);
        };

        self.upload(cache_id, &archive_path).await?;
        self.commit(cache_id, size).await?;
        let _ = std::fs::remove_file(&archive_path);

        info!(key, cache_id, size, "saved cache");
        Ok(Some(cache_id))
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        debug!(url, "downloading cache archive");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Cache(format!("archive download failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Cache(format!(
                "archive download returned {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Cache(format!("archive download failed: {e}")))?;
        std::fs::write(dest, &bytes)?;
        Ok(())
    }

    async fn reserve(&self, key: &str, version: &str, size: u64) -> Result<Option<i64>> {
        debug!(key, size, "reserving cache entry");
        let response = self
            .http
            .post(self.endpoint("caches"))
            .bearer_auth(&self.token)
            .header("Accept", API_VERSION)
            .json(&ReserveRequest {
                key,
                version,
                cache_size: size,
            })
            .send()
            .await
            .map_err(|e| Error::Cache(format!("cache reservation failed: {e}")))?;

        match response.status() {
            StatusCode::CONFLICT => {
                debug!(key, "cache key already reserved");
                Ok(None)
            }
            status if status.is_success() => {
                let reserved: ReserveResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Cache(format!("invalid reservation response: {e}")))?;
                Ok(Some(reserved.cache_id))
            }
            status => Err(Error::Cache(format!(
                "cache reservation for key `{key}` returned {status}"
            ))),
        }
    }

    async fn upload(&self, cache_id: i64, archive_path: &Path) -> Result<()> {
        let mut file = std::fs::File::open(archive_path)?;
        let mut offset = 0u64;
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let read = file.read(&mut buffer)?;
            if read == 0 {
                break;
            }

            let end = offset + read as u64 - 1;
            debug!(cache_id, offset, end, "uploading cache chunk");
            let response = self
                .http
                .patch(self.endpoint(&format!("caches/{cache_id}")))
                .bearer_auth(&self.token)
                .header("Accept", API_VERSION)
                .header("Content-Type", "application/octet-stream")
                .header("Content-Range", format!("bytes {offset}-{end}/*"))
                .body(buffer[..read].to_vec())
                .send()
                .await
                .map_err(|e| Error::Cache(format!("cache upload failed: {e}")))?;

            if !response.status().is_success() {
                return Err(Error::Cache(format!(
                    "cache upload for id {cache_id} returned {}",
                    response.status()
                )));
            }

            offset = end + 1;
        }

        Ok(())
    }

    async fn commit(&self, cache_id: i64, size: u64) -> Result<()> {
        debug!(cache_id, size, "committing cache entry");
        let response = self
            .http
            .post(self.endpoint(&format!("caches/{cache_id}")))
            .bearer_auth(&self.token)
            .header("Accept", API_VERSION)
            .json(&CommitRequest { size })
            .send()
            .await
            .map_err(|e| Error::Cache(format!("cache commit failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Cache(format!(
                "cache commit for id {cache_id} returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
