pub mod adapters;
pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export key types for convenience

// Domain types - value objects, models and errors
pub use domain::{
    // Value objects
    BucketName,
    Label,
    LabelSet,
    ObjectKey,
    // Models
    ArtifactItem,
    ConnectionDescriptor,
    ResilienceSettings,
    TransferSummary,
    // Errors
    ConfigIssue,
    ConfigurationError,
    DomainValidationError,
    StorageError,
    StorageResult,
};

// Port types - interfaces toward the host and toward the repository service
pub use ports::{
    DeleteParams, DeleteSet, DownloadParams, ObjectReader, ObjectStore, RepositoryBackend,
    SearchParams, UploadParams,
};

// Service implementations
pub use services::{ArtifactObjectStore, ArtifactObjectStoreBuilder, EnvSource, ProcessEnv};

// Application factory and configuration
pub use app::{create_in_memory_store, create_store, AppBuilder, AppError, ResolvedConfig};

// Adapter types - infrastructure implementations
pub use adapters::outbound::{
    ArtifactoryClient, ArtifactoryError, InMemoryRepositoryBackend, LocalStaging, RetryPolicy,
};

// Public facade for easy construction
pub mod prelude {
    pub use crate::{
        create_in_memory_store, create_store, AppBuilder, ArtifactObjectStore, BucketName,
        InMemoryRepositoryBackend, LabelSet, ObjectKey, ObjectReader, ObjectStore,
        RepositoryBackend, StorageError, TransferSummary,
    };
}
