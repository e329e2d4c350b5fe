pub mod artifact;
pub mod connection;
pub mod settings;
pub mod transfer;

pub use artifact::ArtifactItem;
pub use connection::{ClientCertificate, ConnectionDescriptor, Credential};
pub use settings::ResilienceSettings;
pub use transfer::TransferSummary;
