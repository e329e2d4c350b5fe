use async_trait::async_trait;
use bytes::Bytes;
use artifact_object_store::{
    create_in_memory_store, AppBuilder, ArtifactItem, ArtifactObjectStore, BucketName,
    ConnectionDescriptor, DeleteParams, DeleteSet, DownloadParams, InMemoryRepositoryBackend,
    LabelSet, ObjectKey, ObjectStore, RepositoryBackend, SearchParams, StorageError,
    StorageResult, TransferSummary, UploadParams,
};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::AsyncReadExt;
use tokio_util::io::StreamReader;

fn bucket(name: &str) -> BucketName {
    BucketName::new(name.to_string()).unwrap()
}

fn key(raw: &str) -> ObjectKey {
    ObjectKey::new(raw.to_string()).unwrap()
}

fn setup(labels: &str) -> (ArtifactObjectStore, InMemoryRepositoryBackend, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let (store, backend) = create_in_memory_store(labels, dir.path()).unwrap();
    (store, backend, dir)
}

async fn read_all(store: &ArtifactObjectStore, b: &BucketName, k: &ObjectKey) -> Vec<u8> {
    let mut reader = store.get_object(b, k).await.unwrap();
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await.unwrap();
    body
}

#[tokio::test]
async fn test_streamed_put_then_get_round_trip() {
    let (store, backend, _dir) = setup("env=prod");

    // Body arrives in several chunks, like a network upload would
    let chunks = async_stream::stream! {
        for part in ["first-", "second-", "third"] {
            yield Ok::<_, std::io::Error>(Bytes::from(part));
        }
    };
    let body = StreamReader::new(Box::pin(chunks));

    let summary = store
        .put_object(&bucket("backups"), &key("velero/backup-1.tar.gz"), Box::new(body))
        .await
        .unwrap();
    assert_eq!(summary, TransferSummary::success());
    assert!(backend.contains("backups", "velero/backup-1.tar.gz").await);

    let body = read_all(&store, &bucket("backups"), &key("velero/backup-1.tar.gz")).await;
    assert_eq!(body, b"first-second-third");
}

#[tokio::test]
async fn test_slash_variants_address_the_same_object() {
    let (store, backend, _dir) = setup("");

    store
        .put_object(&bucket("b"), &key("/a/b/"), Box::new(&b"v1"[..]))
        .await
        .unwrap();
    store
        .put_object(&bucket("b"), &key("a/b"), Box::new(&b"v2"[..]))
        .await
        .unwrap();

    assert_eq!(backend.len().await, 1);
    assert_eq!(read_all(&store, &bucket("b"), &key("//a/b")).await, b"v2");
}

#[tokio::test]
async fn test_get_missing_object_is_not_found() {
    let (store, _backend, _dir) = setup("");

    match store.get_object(&bucket("b"), &key("nothing/here")).await {
        Err(StorageError::ObjectNotFound { bucket, key }) => {
            assert_eq!(bucket, "b");
            assert_eq!(key, "nothing/here");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected ObjectNotFound"),
    }
}

#[tokio::test]
async fn test_exists_is_label_scoped() {
    let (store, backend, _dir) = setup("cluster=a");

    backend
        .insert("b", "k1", "v", &LabelSet::parse("cluster=a").unwrap())
        .await;
    backend
        .insert("b", "k2", "v", &LabelSet::parse("cluster=b").unwrap())
        .await;

    assert!(store.object_exists(&bucket("b"), &key("k1")).await.unwrap());
    assert!(!store.object_exists(&bucket("b"), &key("k2")).await.unwrap());
    assert!(!store.object_exists(&bucket("b"), &key("k3")).await.unwrap());
}

#[tokio::test]
async fn test_get_does_not_see_other_labels() {
    let (store, backend, _dir) = setup("cluster=a");
    backend
        .insert("b", "k", "theirs", &LabelSet::parse("cluster=b").unwrap())
        .await;

    let err = store.get_object(&bucket("b"), &key("k")).await.err().unwrap();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_removes_object_and_everything_beneath() {
    let (store, backend, _dir) = setup("");
    let none = LabelSet::default();
    backend.insert("b", "backups/one", "1", &none).await;
    backend.insert("b", "backups/one/meta.json", "m", &none).await;
    backend.insert("b", "backups/one/data/part-0", "p", &none).await;
    backend.insert("b", "backups/onetwo", "keep", &none).await;

    let summary = store
        .delete_object(&bucket("b"), &key("backups/one"))
        .await
        .unwrap();

    assert_eq!(summary, TransferSummary::new(3, 0));
    assert!(backend.contains("b", "backups/onetwo").await);
    assert_eq!(backend.len().await, 1);
}

#[tokio::test]
async fn test_delete_is_label_scoped() {
    let (store, backend, _dir) = setup("cluster=a");
    backend
        .insert("b", "k", "theirs", &LabelSet::parse("cluster=b").unwrap())
        .await;

    let summary = store.delete_object(&bucket("b"), &key("k")).await.unwrap();

    assert!(summary.is_empty());
    assert!(backend.contains("b", "k").await);
}

/// Backend that adds a new matching file right after the delete set is resolved
struct RacingBackend {
    inner: InMemoryRepositoryBackend,
}

#[async_trait]
impl RepositoryBackend for RacingBackend {
    async fn upload(&self, params: UploadParams) -> StorageResult<TransferSummary> {
        self.inner.upload(params).await
    }

    async fn download(&self, params: DownloadParams) -> StorageResult<TransferSummary> {
        self.inner.download(params).await
    }

    async fn search(&self, params: SearchParams) -> StorageResult<Vec<ArtifactItem>> {
        self.inner.search(params).await
    }

    async fn resolve_delete_set(&self, params: DeleteParams) -> StorageResult<DeleteSet> {
        let set = self.inner.resolve_delete_set(params).await?;
        self.inner
            .insert("b", "victim/late-arrival", "new", &LabelSet::default())
            .await;
        Ok(set)
    }

    async fn delete_files(&self, set: &DeleteSet) -> StorageResult<TransferSummary> {
        self.inner.delete_files(set).await
    }

    fn describe_connection(&self) -> &ConnectionDescriptor {
        self.inner.describe_connection()
    }
}

#[tokio::test]
async fn test_delete_only_removes_the_resolved_set() {
    let dir = tempfile::tempdir().unwrap();
    let inner = InMemoryRepositoryBackend::new();
    inner
        .insert("b", "victim/old", "old", &LabelSet::default())
        .await;

    let store = AppBuilder::new()
        .with_staging_root(dir.path())
        .with_backend(Arc::new(RacingBackend {
            inner: inner.clone(),
        }))
        .build()
        .unwrap();

    let summary = store
        .delete_object(&bucket("b"), &key("victim"))
        .await
        .unwrap();

    assert_eq!(summary, TransferSummary::success());
    assert!(!inner.contains("b", "victim/old").await);
    assert!(inner.contains("b", "victim/late-arrival").await);
}

#[tokio::test]
async fn test_put_attaches_labels_as_properties() {
    let (store, backend, _dir) = setup("cluster=a;team=platform");

    store
        .put_object(&bucket("b"), &key("k"), Box::new(&b"v"[..]))
        .await
        .unwrap();

    let props = backend.properties("b", "k").await.unwrap();
    let rendered: Vec<String> = props
        .iter()
        .map(|p| format!("{}={}", p.name, p.value))
        .collect();
    assert_eq!(rendered, vec!["cluster=a", "team=platform"]);
}

#[tokio::test]
async fn test_put_stages_at_deterministic_path() {
    let (store, _backend, dir) = setup("");

    store
        .put_object(&bucket("b"), &key("x/y/z"), Box::new(&b"staged"[..]))
        .await
        .unwrap();

    let staged = dir.path().join("b").join("x").join("y").join("z");
    assert_eq!(std::fs::read(staged).unwrap(), b"staged");
}

#[tokio::test]
async fn test_signed_url_ignores_ttl() {
    let (store, _backend, _dir) = setup("");

    let short = store
        .create_signed_url(&bucket("b"), &key("k"), Duration::from_secs(1))
        .await
        .unwrap();
    let long = store
        .create_signed_url(&bucket("b"), &key("k"), Duration::from_secs(86_400))
        .await
        .unwrap();

    assert_eq!(short, long);
}
