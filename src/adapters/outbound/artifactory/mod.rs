mod aql;
mod client;
mod dto;
mod error;
mod retry;

pub use client::ArtifactoryClient;
pub use error::ArtifactoryError;
pub use retry::RetryPolicy;
