use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{StorageError, StorageResult},
        models::{ArtifactItem, ConnectionDescriptor, TransferSummary},
        value_objects::{Label, LabelSet},
    },
    ports::backend::{
        DeleteParams, DeleteSet, DownloadParams, RepositoryBackend, SearchParams, UploadParams,
    },
    services::path_mapper::{self, PatternMatcher},
};

/// In-memory implementation of RepositoryBackend for testing and development
#[derive(Clone)]
pub struct InMemoryRepositoryBackend {
    data: Arc<RwLock<RepositoryData>>,
    connection: ConnectionDescriptor,
}

// Map of repo -> location inside the repo -> artifact
type RepositoryData = HashMap<String, BTreeMap<String, StoredArtifact>>;

#[derive(Clone)]
struct StoredArtifact {
    data: Bytes,
    properties: Vec<Label>,
    modified: DateTime<Utc>,
}

impl InMemoryRepositoryBackend {
    pub fn new() -> Self {
        Self::with_connection(ConnectionDescriptor::new(
            http::Uri::from_static("http://localhost:8081/artifactory"),
            "anonymous",
        ))
    }

    pub fn with_connection(connection: ConnectionDescriptor) -> Self {
        Self {
            data: Arc::new(RwLock::new(RepositoryData::default())),
            connection,
        }
    }

    /// Store an artifact directly, bypassing the upload path
    pub async fn insert(
        &self,
        repo: &str,
        location: &str,
        data: impl Into<Bytes>,
        properties: &LabelSet,
    ) {
        let mut repos = self.data.write().await;
        repos.entry(repo.to_string()).or_default().insert(
            location.trim_matches('/').to_string(),
            StoredArtifact {
                data: data.into(),
                properties: properties.iter().cloned().collect(),
                modified: Utc::now(),
            },
        );
    }

    /// Fetch an artifact's bytes, if present
    pub async fn get(&self, repo: &str, location: &str) -> Option<Bytes> {
        let repos = self.data.read().await;
        repos
            .get(repo)
            .and_then(|files| files.get(location.trim_matches('/')))
            .map(|artifact| artifact.data.clone())
    }

    /// Properties stored with an artifact, if present
    pub async fn properties(&self, repo: &str, location: &str) -> Option<Vec<Label>> {
        let repos = self.data.read().await;
        repos
            .get(repo)
            .and_then(|files| files.get(location.trim_matches('/')))
            .map(|artifact| artifact.properties.clone())
    }

    pub async fn contains(&self, repo: &str, location: &str) -> bool {
        self.get(repo, location).await.is_some()
    }

    /// Number of artifacts across all repositories
    pub async fn len(&self) -> usize {
        self.data.read().await.values().map(BTreeMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn find(
        &self,
        pattern: &str,
        properties: &LabelSet,
        recursive: bool,
    ) -> StorageResult<Vec<ArtifactItem>> {
        let matcher = PatternMatcher::new(pattern, recursive).map_err(|e| StorageError::Validation {
            message: e.to_string(),
        })?;
        let (repo, _) = path_mapper::split_pattern(pattern);
        let repos = self.data.read().await;

        let Some(files) = repos.get(repo) else {
            return Ok(Vec::new());
        };

        Ok(files
            .iter()
            .filter(|(_, artifact)| properties.matches(&artifact.properties))
            .map(|(location, artifact)| {
                let mut item = ArtifactItem::from_location(repo, location);
                item.size = artifact.data.len() as u64;
                item.modified = Some(artifact.modified);
                item
            })
            .filter(|item| matcher.is_match(&item.identity()))
            .collect())
    }
}

impl Default for InMemoryRepositoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryBackend for InMemoryRepositoryBackend {
    async fn upload(&self, params: UploadParams) -> StorageResult<TransferSummary> {
        let data = tokio::fs::read(&params.local_path)
            .await
            .map_err(|e| StorageError::staging(&params.local_path, &e))?;

        let (repo, path) = path_mapper::split_pattern(&params.target);
        let location = if params.target.ends_with('/') || path.is_empty() {
            let name = params
                .local_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            format!("{}{}", path, name)
        } else {
            path.to_string()
        };

        self.insert(repo, &location, data, &params.properties).await;
        Ok(TransferSummary::success())
    }

    async fn download(&self, params: DownloadParams) -> StorageResult<TransferSummary> {
        let matches = self.find(&params.pattern, &params.properties, true).await?;
        let mut summary = TransferSummary::default();

        for item in matches {
            let Some(data) = self.get(&item.repo, &item.location()).await else {
                summary.failed += 1;
                continue;
            };

            let destination = path_mapper::download_destination(&params.target, &item.name);
            tokio::fs::write(&destination, &data)
                .await
                .map_err(|e| StorageError::staging(&destination, &e))?;
            summary.succeeded += 1;
        }

        Ok(summary)
    }

    async fn search(&self, params: SearchParams) -> StorageResult<Vec<ArtifactItem>> {
        self.find(&params.pattern, &params.properties, params.recursive)
            .await
    }

    async fn resolve_delete_set(&self, params: DeleteParams) -> StorageResult<DeleteSet> {
        let items = self
            .find(&params.pattern, &params.properties, params.recursive)
            .await?;
        Ok(DeleteSet::new(items))
    }

    async fn delete_files(&self, set: &DeleteSet) -> StorageResult<TransferSummary> {
        let mut repos = self.data.write().await;

        Ok(set
            .items()
            .iter()
            .map(|item| {
                let removed = repos
                    .get_mut(&item.repo)
                    .and_then(|files| files.remove(&item.location()));
                match removed {
                    Some(_) => TransferSummary::success(),
                    None => TransferSummary::failure(),
                }
            })
            .sum())
    }

    fn describe_connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_filters_by_pattern_and_labels() {
        let backend = InMemoryRepositoryBackend::new();
        let labels = LabelSet::parse("env=prod").unwrap();

        backend.insert("b", "x/1/a", "a", &labels).await;
        backend.insert("b", "x/2/c", "c", &labels).await;
        backend.insert("b", "x/3/unlabelled", "u", &LabelSet::default()).await;
        backend.insert("other", "x/1/a", "o", &labels).await;

        let params = SearchParams::builder()
            .pattern("b/x/*")
            .properties(labels)
            .build();
        let found: Vec<String> = backend
            .search(params)
            .await
            .unwrap()
            .iter()
            .map(ArtifactItem::identity)
            .collect();

        assert_eq!(found, vec!["b/x/1/a", "b/x/2/c"]);
    }

    #[tokio::test]
    async fn test_upload_into_folder_target_keeps_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("archive.tar");
        tokio::fs::write(&local, b"tar").await.unwrap();

        let backend = InMemoryRepositoryBackend::new();
        let params = UploadParams::builder()
            .local_path(local)
            .target("b/backups/")
            .build();
        let summary = backend.upload(params).await.unwrap();

        assert_eq!(summary, TransferSummary::success());
        assert!(backend.contains("b", "backups/archive.tar").await);
    }

    #[tokio::test]
    async fn test_delete_counts_missing_items_as_failed() {
        let backend = InMemoryRepositoryBackend::new();
        backend.insert("b", "k", "v", &LabelSet::default()).await;

        let set = DeleteSet::new(vec![
            ArtifactItem::from_location("b", "k"),
            ArtifactItem::from_location("b", "gone"),
        ]);
        let summary = backend.delete_files(&set).await.unwrap();

        assert_eq!(summary, TransferSummary::new(1, 1));
        assert!(backend.is_empty().await);
    }
}
