mod repository_backend;

pub use repository_backend::{
    DeleteParams, DeleteSet, DownloadParams, RepositoryBackend, SearchParams, UploadParams,
};
