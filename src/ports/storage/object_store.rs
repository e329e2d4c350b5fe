use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncRead;

use crate::domain::{
    errors::StorageResult,
    models::TransferSummary,
    value_objects::{BucketName, ObjectKey},
};

/// Byte stream passed into and out of the object store
pub type ObjectReader = Box<dyn AsyncRead + Send + Unpin>;

/// Port for the bucket/key object-storage contract exposed to the host
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Store the body under `bucket/key`
    async fn put_object(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        body: ObjectReader,
    ) -> StorageResult<TransferSummary>;

    /// Open the object for streaming; `ObjectNotFound` when nothing was retrieved
    async fn get_object(&self, bucket: &BucketName, key: &ObjectKey)
        -> StorageResult<ObjectReader>;

    /// Check whether any object matches the key
    async fn object_exists(&self, bucket: &BucketName, key: &ObjectKey) -> StorageResult<bool>;

    /// List the distinct key prefixes one delimiter level below `prefix`.
    ///
    /// The result is a set; its order is whatever the backend returned.
    async fn list_common_prefixes(
        &self,
        bucket: &BucketName,
        prefix: &str,
        delimiter: &str,
    ) -> StorageResult<Vec<String>>;

    /// `list_common_prefixes` with a `/` delimiter
    async fn list_objects(&self, bucket: &BucketName, prefix: &str) -> StorageResult<Vec<String>> {
        self.list_common_prefixes(bucket, prefix, "/").await
    }

    /// Remove the object (and anything beneath it)
    async fn delete_object(&self, bucket: &BucketName, key: &ObjectKey)
        -> StorageResult<TransferSummary>;

    /// Build a directly fetchable URL for the object.
    ///
    /// `ttl` is advisory: nothing enforces expiry on the returned URL, which
    /// stays valid for as long as the embedded credential does.
    async fn create_signed_url(
        &self,
        bucket: &BucketName,
        key: &ObjectKey,
        ttl: Duration,
    ) -> StorageResult<String>;
}
