pub mod artifactory;
pub mod memory;
pub mod staging;

pub use artifactory::{ArtifactoryClient, ArtifactoryError, RetryPolicy};
pub use memory::InMemoryRepositoryBackend;
pub use staging::{LocalStaging, DEFAULT_STAGING_ROOT};
