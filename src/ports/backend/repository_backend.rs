use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::{
    errors::StorageResult,
    models::{ArtifactItem, ConnectionDescriptor, TransferSummary},
    value_objects::LabelSet,
};

/// Parameters for uploading a staged local file.
///
/// Uploads are flat and best-effort: the local directory layout is ignored
/// and one failed file never aborts the call.
#[derive(Debug, Clone, bon::Builder)]
pub struct UploadParams {
    /// Local file to upload
    #[builder(into)]
    pub local_path: PathBuf,

    /// `<repo>/<path>`; a trailing `/` means "into this folder"
    #[builder(into)]
    pub target: String,

    /// Properties attached to every uploaded file
    #[builder(default)]
    pub properties: LabelSet,

    /// Extract archives after deployment
    #[builder(default)]
    pub explode_archive: bool,
}

/// Parameters for downloading matching files to a local target
#[derive(Debug, Clone, bon::Builder)]
pub struct DownloadParams {
    /// `<repo>/<path>` pattern, wildcards allowed
    #[builder(into)]
    pub pattern: String,

    /// Local file, or folder when it ends with a path separator
    #[builder(into)]
    pub target: PathBuf,

    /// Only files carrying all of these properties are downloaded
    #[builder(default)]
    pub properties: LabelSet,
}

/// Parameters for a property-filtered search
#[derive(Debug, Clone, bon::Builder)]
pub struct SearchParams {
    #[builder(into)]
    pub pattern: String,

    #[builder(default)]
    pub properties: LabelSet,

    /// Let `*` span folder boundaries
    #[builder(default = true)]
    pub recursive: bool,
}

/// Parameters for resolving the set of files a delete will remove
#[derive(Debug, Clone, bon::Builder)]
pub struct DeleteParams {
    #[builder(into)]
    pub pattern: String,

    #[builder(default)]
    pub properties: LabelSet,

    /// Include everything beneath a matching folder
    #[builder(default = true)]
    pub recursive: bool,
}

/// Files pinned for deletion before the destructive call starts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteSet {
    items: Vec<ArtifactItem>,
}

impl DeleteSet {
    pub fn new(items: Vec<ArtifactItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[ArtifactItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Capability interface of the path-addressed repository service.
///
/// Implementations own their transport, authentication and retry policy.
/// Bulk calls are best-effort: per-file failures are reported through
/// [`TransferSummary`], and `Err` is reserved for failures of the call itself.
#[async_trait]
pub trait RepositoryBackend: Send + Sync + 'static {
    /// Upload a local file to the target path
    async fn upload(&self, params: UploadParams) -> StorageResult<TransferSummary>;

    /// Download every file matching the pattern into the local target
    async fn download(&self, params: DownloadParams) -> StorageResult<TransferSummary>;

    /// Search files matching the pattern and properties
    async fn search(&self, params: SearchParams) -> StorageResult<Vec<ArtifactItem>>;

    /// Resolve the exact set of files a delete would remove
    async fn resolve_delete_set(&self, params: DeleteParams) -> StorageResult<DeleteSet>;

    /// Delete exactly the files of a previously resolved set
    async fn delete_files(&self, set: &DeleteSet) -> StorageResult<TransferSummary>;

    /// Connection details the handle was built from
    fn describe_connection(&self) -> &ConnectionDescriptor;
}
