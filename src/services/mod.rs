pub mod credential_resolver;
pub mod path_mapper;
pub mod prefix_lister;
pub mod resilience_policy;
pub mod signed_url;

mod object_store_impl;

pub use credential_resolver::{EnvSource, ProcessEnv};
pub use object_store_impl::{ArtifactObjectStore, ArtifactObjectStoreBuilder};
