use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncRead, AsyncWriteExt};

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        value_objects::{BucketName, ObjectKey},
    },
    services::path_mapper,
};

pub const DEFAULT_STAGING_ROOT: &str = "/tmp/backups";

/// Local spill buffer laid out as `<root>/<bucket>/<key>`.
///
/// Paths are not namespaced per call, so concurrent Put/Get on the same
/// `(bucket, key)` race on the same file. Staged files are left in place.
#[derive(Debug, Clone)]
pub struct LocalStaging {
    root: PathBuf,
}

impl LocalStaging {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic staging path of an object
    pub fn path_for(&self, bucket: &BucketName, key: &ObjectKey) -> PathBuf {
        self.root
            .join(path_mapper::staging_path(bucket.as_str(), key.as_str()))
    }

    /// Create the parent folders of an object's staging path and return the path
    pub async fn prepare(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<PathBuf> {
        let path = self.path_for(bucket, key);
        if let Some(dir) = path.parent() {
            tracing::debug!(dir = %dir.display(), "Creating staging dir");
            fs::create_dir_all(dir)
                .await
                .map_err(|e| StorageError::staging(dir, &e))?;
        }
        Ok(path)
    }

    /// Write the whole body to the object's staging path
    pub async fn stage<R>(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        body: &mut R,
    ) -> StorageResult<PathBuf>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.prepare(bucket, key).await?;

        let mut file = File::create(&path)
            .await
            .map_err(|e| StorageError::staging(&path, &e))?;
        let written = tokio::io::copy(body, &mut file)
            .await
            .map_err(|e| StorageError::staging(&path, &e))?;
        file.flush()
            .await
            .map_err(|e| StorageError::staging(&path, &e))?;

        tracing::debug!(path = %path.display(), bytes = written, "Staged object body");
        Ok(path)
    }

    /// Open a staged file for reading
    pub async fn open(&self, path: &Path) -> StorageResult<File> {
        File::open(path)
            .await
            .map_err(|e| StorageError::staging(path, &e))
    }
}

impl Default for LocalStaging {
    fn default() -> Self {
        Self::new(DEFAULT_STAGING_ROOT)
    }
}
