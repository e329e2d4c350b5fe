use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    adapters::outbound::{
        artifactory::ArtifactoryClient,
        memory::InMemoryRepositoryBackend,
        staging::{LocalStaging, DEFAULT_STAGING_ROOT},
    },
    domain::{
        errors::ConfigurationError,
        models::{ConnectionDescriptor, ResilienceSettings},
        value_objects::LabelSet,
    },
    ports::backend::RepositoryBackend,
    services::{
        credential_resolver::{self, EnvSource, ProcessEnv},
        resilience_policy, ArtifactObjectStore,
    },
};

pub const LABELS_KEY: &str = "labels";

/// Every key the configuration map understands
pub const RECOGNIZED_KEYS: &[&str] = &[
    credential_resolver::URL_KEY,
    credential_resolver::USER_KEY,
    LABELS_KEY,
    resilience_policy::DRY_RUN_KEY,
    resilience_policy::THREADS_KEY,
    resilience_policy::DIAL_TIMEOUT_KEY,
    resilience_policy::REQUEST_TIMEOUT_KEY,
    resilience_policy::RETRIES_KEY,
];

/// Everything initialization derives from the configuration map and environment
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub connection: ConnectionDescriptor,
    pub settings: ResilienceSettings,
    pub labels: LabelSet,
}

/// Application builder for dependency injection.
///
/// Numeric settings accept any non-negative integer. `threads = 0` runs
/// transfers one at a time; a zero `dial_timeout` or `request_timeout`
/// disables that timeout.
pub struct AppBuilder {
    config: HashMap<String, String>,
    env: Box<dyn EnvSource>,
    staging_root: PathBuf,
    backend: Option<Arc<dyn RepositoryBackend>>,
}

impl AppBuilder {
    /// Create a new application builder reading credentials from the process environment
    pub fn new() -> Self {
        Self {
            config: HashMap::new(),
            env: Box::new(ProcessEnv),
            staging_root: PathBuf::from(DEFAULT_STAGING_ROOT),
            backend: None,
        }
    }

    /// Replace the whole configuration map
    pub fn with_config(mut self, config: HashMap<String, String>) -> Self {
        self.config = config;
        self
    }

    /// Set a single configuration key
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }

    /// Read credential material from somewhere other than the process environment
    pub fn with_env(mut self, env: impl EnvSource + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    pub fn with_staging_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.staging_root = root.into();
        self
    }

    /// Use an existing backend instead of building the HTTP client.
    ///
    /// Connection keys are then not required; labels and transport settings
    /// are still validated.
    pub fn with_backend(mut self, backend: Arc<dyn RepositoryBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Validate the configuration, reporting every bad key in one error
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigurationError> {
        for key in self.config.keys() {
            if !RECOGNIZED_KEYS.contains(&key.as_str()) {
                tracing::debug!(key = %key, "Ignoring unrecognized configuration key");
            }
        }

        let connection = credential_resolver::resolve_connection(&self.config, self.env.as_ref());
        let settings = resilience_policy::resolve_settings(&self.config);
        let labels = LabelSet::parse(
            self.config
                .get(LABELS_KEY)
                .map(String::as_str)
                .unwrap_or_default(),
        );

        ConfigurationError::collect([
            connection.as_ref().err().cloned(),
            settings.as_ref().err().cloned(),
            labels.as_ref().err().cloned(),
        ])?;

        Ok(ResolvedConfig {
            connection: connection?,
            settings: settings?,
            labels: labels?,
        })
    }

    /// Build the object store
    pub fn build(self) -> Result<ArtifactObjectStore, AppError> {
        let staging = LocalStaging::new(&self.staging_root);

        if let Some(backend) = self.backend.clone() {
            let settings = resilience_policy::resolve_settings(&self.config);
            let labels = LabelSet::parse(
                self.config
                    .get(LABELS_KEY)
                    .map(String::as_str)
                    .unwrap_or_default(),
            );
            ConfigurationError::collect([
                settings.as_ref().err().cloned(),
                labels.as_ref().err().cloned(),
            ])?;
            let labels = labels?;

            tracing::info!(labels = %labels.to_filter_string(), "Object store initialized");
            return Ok(ArtifactObjectStore::new(backend, labels, staging));
        }

        let resolved = self.resolve()?;
        let client = ArtifactoryClient::new(resolved.connection, resolved.settings).map_err(|e| {
            AppError::BackendInit {
                message: e.to_string(),
            }
        })?;

        tracing::info!(
            labels = %resolved.labels.to_filter_string(),
            staging_root = %self.staging_root.display(),
            "Object store initialized"
        );
        Ok(ArtifactObjectStore::new(
            Arc::new(client),
            resolved.labels,
            staging,
        ))
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Application-level errors
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("Backend initialization error: {message}")]
    BackendInit { message: String },
}

/// Build a store from a configuration map, with credentials from the process environment
pub fn create_store(config: HashMap<String, String>) -> Result<ArtifactObjectStore, AppError> {
    AppBuilder::new().with_config(config).build()
}

/// Create an in-memory store for testing and development
pub fn create_in_memory_store(
    labels: &str,
    staging_root: impl Into<PathBuf>,
) -> Result<(ArtifactObjectStore, InMemoryRepositoryBackend), AppError> {
    let backend = InMemoryRepositoryBackend::new();
    let store = AppBuilder::new()
        .with_option(LABELS_KEY, labels)
        .with_staging_root(staging_root)
        .with_backend(Arc::new(backend.clone()))
        .build()?;
    Ok((store, backend))
}
