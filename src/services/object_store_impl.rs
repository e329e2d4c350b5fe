use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::{
    adapters::outbound::staging::LocalStaging,
    domain::{
        errors::{StorageError, StorageResult},
        models::TransferSummary,
        value_objects::{BucketName, LabelSet, ObjectKey},
    },
    ports::{
        backend::{DeleteParams, DownloadParams, RepositoryBackend, SearchParams, UploadParams},
        storage::{ObjectReader, ObjectStore},
    },
    services::{path_mapper, prefix_lister, signed_url},
};

/// Object store on top of a path-addressed repository backend.
///
/// Bodies are spilled to a local staging folder on their way in and out.
/// Every operation is scoped to the configured labels.
#[derive(Clone)]
pub struct ArtifactObjectStore {
    backend: Arc<dyn RepositoryBackend>,
    labels: LabelSet,
    staging: LocalStaging,
}

impl ArtifactObjectStore {
    pub fn new(backend: Arc<dyn RepositoryBackend>, labels: LabelSet, staging: LocalStaging) -> Self {
        Self {
            backend,
            labels,
            staging,
        }
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    pub fn staging(&self) -> &LocalStaging {
        &self.staging
    }

    pub fn backend(&self) -> &Arc<dyn RepositoryBackend> {
        &self.backend
    }
}

#[async_trait]
impl ObjectStore for ArtifactObjectStore {
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        mut body: ObjectReader,
    ) -> StorageResult<TransferSummary> {
        info!(bucket = %bucket, key = %key, "PutObject");

        let local_path = self.staging.stage(bucket, key, &mut body).await?;

        let params = UploadParams::builder()
            .local_path(local_path)
            .target(path_mapper::upload_target(bucket.as_str(), key.as_str()))
            .properties(self.labels.clone())
            .build();

        let summary = self.backend.upload(params).await.map_err(|e| {
            error!(bucket = %bucket, key = %key, error = %e, "Upload failed");
            e
        })?;

        if summary.failed > 0 {
            warn!(
                bucket = %bucket,
                key = %key,
                uploaded = summary.succeeded,
                failed = summary.failed,
                "Upload finished with failures"
            );
        } else {
            debug!(bucket = %bucket, key = %key, uploaded = summary.succeeded, "Upload finished");
        }
        Ok(summary)
    }

    async fn get_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<ObjectReader> {
        info!(bucket = %bucket, key = %key, "GetObject");

        let local_path = self.staging.prepare(bucket, key).await?;

        let params = DownloadParams::builder()
            .pattern(path_mapper::object_pattern(bucket.as_str(), key.as_str()))
            .target(local_path.clone())
            .properties(self.labels.clone())
            .build();

        let summary = self.backend.download(params).await.map_err(|e| {
            error!(bucket = %bucket, key = %key, error = %e, "Download failed");
            e
        })?;
        debug!(
            bucket = %bucket,
            key = %key,
            downloaded = summary.succeeded,
            failed = summary.failed,
            "Download finished"
        );

        // A matched item that could not be fetched is a backend failure, not a miss
        if summary.succeeded == 0 && summary.failed > 0 {
            error!(bucket = %bucket, key = %key, failed = summary.failed, "Download failed");
            return Err(StorageError::backend(
                "download",
                format!("{} matching file(s) could not be fetched", summary.failed),
            ));
        }

        // A leftover staged file from an earlier call must not be served
        if summary.succeeded == 0 {
            return Err(StorageError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        let file = self.staging.open(&local_path).await?;
        Ok(Box::new(file))
    }

    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<bool> {
        info!(bucket = %bucket, key = %key, "ObjectExists");

        let params = SearchParams::builder()
            .pattern(path_mapper::object_pattern(bucket.as_str(), key.as_str()))
            .properties(self.labels.clone())
            .recursive(true)
            .build();

        let results = self.backend.search(params).await.map_err(|e| {
            error!(bucket = %bucket, key = %key, error = %e, "Search failed");
            e
        })?;
        Ok(!results.is_empty())
    }

    async fn list_common_prefixes(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &str,
    ) -> StorageResult<Vec<String>> {
        info!(bucket = %bucket, prefix, delimiter, "ListCommonPrefixes");

        prefix_lister::list_common_prefixes(
            self.backend.as_ref(),
            &self.labels,
            bucket,
            prefix,
            delimiter,
        )
        .await
    }

    async fn delete_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
    ) -> StorageResult<TransferSummary> {
        info!(bucket = %bucket, key = %key, "DeleteObject");

        let params = DeleteParams::builder()
            .pattern(path_mapper::object_pattern(bucket.as_str(), key.as_str()))
            .properties(self.labels.clone())
            .recursive(true)
            .build();

        // Pin the victims first; the delete call only touches this set
        let set = self.backend.resolve_delete_set(params).await.map_err(|e| {
            error!(bucket = %bucket, key = %key, error = %e, "Resolving delete set failed");
            e
        })?;

        if set.is_empty() {
            debug!(bucket = %bucket, key = %key, "Nothing to delete");
            return Ok(TransferSummary::default());
        }

        let summary = self.backend.delete_files(&set).await.map_err(|e| {
            error!(bucket = %bucket, key = %key, error = %e, "Failed deleting files");
            e
        })?;
        debug!(
            bucket = %bucket,
            key = %key,
            deleted = summary.succeeded,
            failed = summary.failed,
            "Files deleted"
        );
        Ok(summary)
    }

    async fn create_signed_url(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        ttl: Duration,
    ) -> StorageResult<String> {
        info!(bucket = %bucket, key = %key, ttl_secs = ttl.as_secs(), "CreateSignedURL");
        signed_url::create_signed_url(self.backend.describe_connection(), bucket, key, ttl)
    }
}

/// Builder for ArtifactObjectStore
#[derive(Default)]
pub struct ArtifactObjectStoreBuilder {
    backend: Option<Arc<dyn RepositoryBackend>>,
    labels: LabelSet,
    staging: Option<LocalStaging>,
}

impl ArtifactObjectStoreBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, backend: Arc<dyn RepositoryBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }

    pub fn staging(mut self, staging: LocalStaging) -> Self {
        self.staging = Some(staging);
        self
    }

    pub fn build(self) -> Result<ArtifactObjectStore, &'static str> {
        let backend = self.backend.ok_or("Backend is required")?;
        let staging = self.staging.unwrap_or_default();

        Ok(ArtifactObjectStore::new(backend, self.labels, staging))
    }
}
