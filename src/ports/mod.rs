pub mod backend;
pub mod storage;

// Re-export all port traits for convenience
pub use backend::{
    DeleteParams, DeleteSet, DownloadParams, RepositoryBackend, SearchParams, UploadParams,
};
pub use storage::{ObjectReader, ObjectStore};
