//! Attachment storage backends.
//!
//! Uploaded literature files are stored outside the relational schema under a
//! generated key; the literature row only keeps the client-facing location.
//!
//! - [`FilesystemBackend`]: local directory, atomic temp-file + rename writes
//! - [`ObjectStoreBackend`]: external bucket reached over HTTP
//!
//! ## Example
//!
//! ```rust,ignore
//! use labrec_db::file_storage::{FilesystemBackend, StorageBackend};
//!
//! let backend = FilesystemBackend::new("uploads/literature");
//! backend.write("literature-1-2.pdf", &data, "application/pdf").await?;
//! assert_eq!(backend.locate("literature-1-2.pdf"), "uploads/literature/literature-1-2.pdf");
//! ```

use async_trait::async_trait;
use labrec_core::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Storage backend trait for different storage implementations.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data under the given key, replacing any previous object.
    async fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;

    /// Client-facing location of a key (relative path or URL).
    fn locate(&self, key: &str) -> String;

    /// Whether [`locate`](Self::locate) returns something other than the raw
    /// key, in which case responses also carry the bucket key separately.
    fn is_remote(&self) -> bool {
        false
    }
}

/// Reject keys that could escape the storage root.
fn check_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.contains("..")
        || key.contains('/')
        || key.contains('\\')
        || key.starts_with('.')
    {
        return Err(Error::InvalidInput(format!("invalid storage key '{}'", key)));
    }
    Ok(())
}

// =============================================================================
// FILESYSTEM
// =============================================================================

async fn write_then_rename(
    temp_path: &Path,
    full_path: &Path,
    data: &[u8],
) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(temp_path, full_path).await
}

/// Filesystem storage backend.
///
/// Files live flat in `base_path`, named by their storage key.
pub struct FilesystemBackend {
    base_path: PathBuf,
    public_prefix: Option<String>,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            public_prefix: None,
        }
    }

    /// Report locations as `{prefix}/{key}` instead of the on-disk path,
    /// for when files are served over HTTP under a fixed route.
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = Some(prefix.into().trim_end_matches('/').to_string());
        self
    }

    fn full_path(&self, key: &str) -> PathBuf {
        self.base_path.join(key)
    }

    /// Validate that the storage backend can write, read, and delete files.
    ///
    /// Creates the base directory when missing, then performs a round trip
    /// so permission problems surface at startup rather than on first upload.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_file = self.base_path.join(".health-check");

        fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", self.base_path, e))?;

        let data = b"storage-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_data = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;

        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn write(&self, key: &str, data: &[u8], _content_type: &str) -> Result<()> {
        check_key(key)?;
        let full_path = self.full_path(key);
        debug!(
            storage_key = %key,
            full_path = %full_path.display(),
            size = data.len(),
            "file_storage: write"
        );

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            warn!(
                base = %self.base_path.display(),
                error = %e,
                "file_storage: create_dir_all failed"
            );
            e
        })?;

        // Atomic write: temp file + rename. A failed attempt must not leave
        // the temp file next to served attachments.
        let temp_path = full_path.with_extension("tmp");
        if let Err(e) = write_then_rename(&temp_path, &full_path, data).await {
            warn!(temp_path = %temp_path.display(), error = %e, "file_storage: write failed");
            match fs::remove_file(&temp_path).await {
                Err(cleanup) if cleanup.kind() != std::io::ErrorKind::NotFound => {
                    warn!(error = %cleanup, "file_storage: temp cleanup failed");
                }
                _ => {}
            }
            return Err(e.into());
        }

        // rw-r--r--, no execute
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&full_path, std::fs::Permissions::from_mode(0o644)).await?;
        }

        Ok(())
    }

    fn locate(&self, key: &str) -> String {
        match &self.public_prefix {
            Some(prefix) => format!("{}/{}", prefix, key),
            None => self.full_path(key).to_string_lossy().replace('\\', "/"),
        }
    }
}

// =============================================================================
// OBJECT STORAGE
// =============================================================================

/// Object storage backend speaking a plain HTTP object API.
///
/// Objects are uploaded with `PUT {endpoint}/{bucket}/{key}` and served to
/// clients from `{public_base}/{bucket}/{key}`. Uploads carry
/// `Authorization: Bearer <token>` when a token is configured.
pub struct ObjectStoreBackend {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
    public_base: String,
}

impl ObjectStoreBackend {
    /// Create a backend for `bucket` at `endpoint`.
    ///
    /// `public_base` is the prefix used to build client-facing URLs; when
    /// `None`, the endpoint itself is used.
    pub fn new(
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        token: Option<String>,
        public_base: Option<String>,
    ) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let public_base = public_base
            .map(|p| p.trim_end_matches('/').to_string())
            .unwrap_or_else(|| endpoint.clone());
        Self {
            client: reqwest::Client::new(),
            endpoint,
            bucket: bucket.into(),
            token,
            public_base,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    fn put(&self, key: &str) -> reqwest::RequestBuilder {
        let builder = self.client.put(self.object_url(key));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl StorageBackend for ObjectStoreBackend {
    async fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        check_key(key)?;
        debug!(
            storage_key = %key,
            bucket = %self.bucket,
            size = data.len(),
            "object_store: put"
        );

        let response = self
            .put(key)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data.to_vec())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(storage_key = %key, %status, body = %body, "object_store: put rejected");
            return Err(Error::Storage(format!("upload rejected with {}: {}", status, body)));
        }
        Ok(())
    }

    fn locate(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base, self.bucket, key)
    }

    fn is_remote(&self) -> bool {
        true
    }
}
