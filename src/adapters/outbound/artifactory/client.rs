use async_trait::async_trait;
use futures::{stream, StreamExt, TryStreamExt};
use reqwest::{header, Body, Client, RequestBuilder, StatusCode, Url};
use std::path::Path;
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncWriteExt},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

use super::{
    aql,
    dto::AqlResponse,
    error::ArtifactoryError,
    retry::{send_with_retry, RetryPolicy},
};
use crate::{
    domain::{
        errors::StorageResult,
        models::{ArtifactItem, ConnectionDescriptor, Credential, ResilienceSettings, TransferSummary},
        value_objects::LabelSet,
    },
    ports::backend::{
        DeleteParams, DeleteSet, DownloadParams, RepositoryBackend, SearchParams, UploadParams,
    },
    services::path_mapper::{self, PatternMatcher},
};

const CHECKSUM_MD5_HEADER: &str = "X-Checksum-Md5";
const EXPLODE_ARCHIVE_HEADER: &str = "X-Explode-Archive";
const AQL_ENDPOINT: &str = "api/search/aql";

/// HTTP client for an Artifactory-compatible repository service
pub struct ArtifactoryClient {
    http: Client,
    base_url: Url,
    connection: ConnectionDescriptor,
    settings: ResilienceSettings,
    retry: RetryPolicy,
}

impl ArtifactoryClient {
    pub fn new(
        connection: ConnectionDescriptor,
        settings: ResilienceSettings,
    ) -> Result<Self, ArtifactoryError> {
        let base_url = Url::parse(&connection.base_url())
            .map_err(|e| ArtifactoryError::Setup(format!("invalid endpoint: {}", e)))?;

        let mut builder = Client::builder()
            .user_agent(concat!("artifact-object-store/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = settings.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.overall_timeout() {
            builder = builder.timeout(timeout);
        }

        if let Some(cert) = &connection.client_certificate {
            let cert_pem = std::fs::read(&cert.cert_path)?;
            builder = match &cert.key_path {
                Some(key_path) => {
                    let key_pem = std::fs::read(key_path)?;
                    builder.identity(reqwest::Identity::from_pkcs8_pem(&cert_pem, &key_pem)?)
                }
                None => builder.add_root_certificate(reqwest::Certificate::from_pem(&cert_pem)?),
            };
        }

        let http = builder.build()?;
        let retry = RetryPolicy::new(settings.retries);

        info!(
            endpoint = %connection.endpoint,
            user = %connection.user,
            credential = connection.authoritative_credential().map(|c| c.kind()).unwrap_or("none"),
            threads = settings.threads,
            retries = settings.retries,
            dry_run = settings.dry_run,
            "Repository client initialized"
        );

        Ok(Self {
            http,
            base_url,
            connection,
            settings,
            retry,
        })
    }

    /// Replace the retry policy, e.g. to shorten backoff
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.connection.authoritative_credential() {
            Some(Credential::Password(secret)) | Some(Credential::ApiKey(secret)) => {
                request.basic_auth(&self.connection.user, Some(secret))
            }
            Some(Credential::AccessToken(token)) => request.bearer_auth(token),
            None => request,
        }
    }

    /// URL of a file, each path segment percent-encoded
    fn item_url(&self, repo: &str, location: &str) -> Result<Url, ArtifactoryError> {
        let encoded = std::iter::once(repo)
            .chain(location.split('/').filter(|s| !s.is_empty() && *s != "."))
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        self.base_url
            .join(&encoded)
            .map_err(|e| ArtifactoryError::Setup(format!("invalid artifact path: {}", e)))
    }

    /// Deploy URL with properties appended as matrix parameters
    fn deploy_url(
        &self,
        repo: &str,
        location: &str,
        properties: &LabelSet,
    ) -> Result<Url, ArtifactoryError> {
        if properties.is_empty() {
            return self.item_url(repo, location);
        }

        let matrix: String = properties
            .iter()
            .map(|label| {
                format!(
                    ";{}={}",
                    urlencoding::encode(&label.name),
                    urlencoding::encode(&label.value)
                )
            })
            .collect();

        let url = self.item_url(repo, location)?;
        Url::parse(&format!("{}{}", url, matrix))
            .map_err(|e| ArtifactoryError::Setup(format!("invalid deploy url: {}", e)))
    }

    async fn run_search(
        &self,
        pattern: &str,
        properties: &LabelSet,
        recursive: bool,
    ) -> Result<Vec<ArtifactItem>, ArtifactoryError> {
        let matcher = PatternMatcher::new(pattern, recursive)?;
        let query = aql::search_query(pattern, properties, recursive);
        let url = self
            .base_url
            .join(AQL_ENDPOINT)
            .map_err(|e| ArtifactoryError::Setup(e.to_string()))?;
        debug!(pattern, query = %query, "Searching repository");

        let query = query.as_str();
        let url = &url;
        let response = send_with_retry(&self.retry, "search", move || async move {
            Ok(self
                .authorize(self.http.post(url.clone()))
                .header(header::CONTENT_TYPE, "text/plain")
                .body(query.to_string())
                .send()
                .await?)
        })
        .await?;

        let body: AqlResponse = response
            .json()
            .await
            .map_err(|e| ArtifactoryError::InvalidResponse(e.to_string()))?;

        Ok(body
            .results
            .into_iter()
            .map(ArtifactItem::from)
            .filter(|item| matcher.is_match(&item.identity()))
            .collect())
    }

    async fn upload_file(&self, params: &UploadParams) -> Result<TransferSummary, ArtifactoryError> {
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

        let url = self.deploy_url(repo, &location, &params.properties)?;
        let checksum = md5_file(&params.local_path).await?;

        if self.settings.dry_run {
            info!(url = %url, "Dry run, skipping upload");
            return Ok(TransferSummary::success());
        }

        let url = &url;
        let checksum = checksum.as_str();
        let local_path = params.local_path.as_path();
        let explode = params.explode_archive;
        let result = send_with_retry(&self.retry, "upload", move || async move {
            let file = File::open(local_path).await?;
            let length = file.metadata().await?.len();
            let mut request = self
                .authorize(self.http.put(url.clone()))
                .header(CHECKSUM_MD5_HEADER, checksum)
                .header(header::CONTENT_LENGTH, length)
                .body(Body::wrap_stream(ReaderStream::new(file)));
            if explode {
                request = request.header(EXPLODE_ARCHIVE_HEADER, "true");
            }
            Ok(request.send().await?)
        })
        .await;

        match result {
            Ok(_) => {
                debug!(repo, location = %location, "Uploaded file");
                Ok(TransferSummary::success())
            }
            Err(e) => item_failure("upload", &format!("{}/{}", repo, location), e),
        }
    }

    async fn download_item(
        &self,
        item: &ArtifactItem,
        target: &Path,
    ) -> Result<TransferSummary, ArtifactoryError> {
        let url = self.item_url(&item.repo, &item.location())?;
        let destination = path_mapper::download_destination(target, &item.name);

        let url = &url;
        let result = send_with_retry(&self.retry, "download", move || async move {
            Ok(self.authorize(self.http.get(url.clone())).send().await?)
        })
        .await;

        let response = match result {
            Ok(response) => response,
            Err(e) => return item_failure("download", &item.identity(), e),
        };

        let mut file = File::create(&destination).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.try_next().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(item = %item.identity(), destination = %destination.display(), "Downloaded file");
        Ok(TransferSummary::success())
    }

    async fn delete_item(&self, item: &ArtifactItem) -> Result<TransferSummary, ArtifactoryError> {
        if self.settings.dry_run {
            info!(item = %item.identity(), "Dry run, skipping delete");
            return Ok(TransferSummary::success());
        }

        let url = self.item_url(&item.repo, &item.location())?;
        let url = &url;
        let result = send_with_retry(&self.retry, "delete", move || async move {
            Ok(self.authorize(self.http.delete(url.clone())).send().await?)
        })
        .await;

        match result {
            Ok(_) => Ok(TransferSummary::success()),
            Err(e) => item_failure("delete", &item.identity(), e),
        }
    }

    async fn download_files(
        &self,
        params: &DownloadParams,
    ) -> Result<TransferSummary, ArtifactoryError> {
        let items = self
            .run_search(&params.pattern, &params.properties, true)
            .await?;

        // Several matches into one local file must not race each other
        let concurrency = if path_mapper::is_folder_target(&params.target) {
            self.settings.effective_threads()
        } else {
            1
        };

        let target = params.target.as_path();
        let outcomes: Vec<Result<TransferSummary, ArtifactoryError>> = stream::iter(items)
            .map(move |item| async move { self.download_item(&item, target).await })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        outcomes.into_iter().sum()
    }

    async fn delete_pinned(&self, set: &DeleteSet) -> Result<TransferSummary, ArtifactoryError> {
        let deletes: Vec<_> = set.items().iter().map(|item| self.delete_item(item)).collect();
        let outcomes: Vec<Result<TransferSummary, ArtifactoryError>> = stream::iter(deletes)
            .buffer_unordered(self.settings.effective_threads())
            .collect()
            .await;

        outcomes.into_iter().sum()
    }
}

/// Count a per-file failure, or escalate it when it concerns the whole call
fn item_failure(
    operation: &str,
    identity: &str,
    error: ArtifactoryError,
) -> Result<TransferSummary, ArtifactoryError> {
    if error.is_call_level() {
        return Err(error);
    }

    match &error {
        ArtifactoryError::Status { status, .. } if *status == StatusCode::NOT_FOUND => {
            debug!(operation, item = identity, "Item not found");
        }
        _ => warn!(operation, item = identity, error = %error, "Item transfer failed"),
    }
    Ok(TransferSummary::failure())
}

async fn md5_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path).await?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; 64 * 1024];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }

    Ok(format!("{:x}", context.compute()))
}

#[async_trait]
impl RepositoryBackend for ArtifactoryClient {
    async fn upload(&self, params: UploadParams) -> StorageResult<TransferSummary> {
        self.upload_file(&params)
            .await
            .map_err(|e| e.into_storage("upload"))
    }

    async fn download(&self, params: DownloadParams) -> StorageResult<TransferSummary> {
        self.download_files(&params)
            .await
            .map_err(|e| e.into_storage("download"))
    }

    async fn search(&self, params: SearchParams) -> StorageResult<Vec<ArtifactItem>> {
        self.run_search(&params.pattern, &params.properties, params.recursive)
            .await
            .map_err(|e| e.into_storage("search"))
    }

    async fn resolve_delete_set(&self, params: DeleteParams) -> StorageResult<DeleteSet> {
        self.run_search(&params.pattern, &params.properties, params.recursive)
            .await
            .map(DeleteSet::new)
            .map_err(|e| e.into_storage("delete"))
    }

    async fn delete_files(&self, set: &DeleteSet) -> StorageResult<TransferSummary> {
        self.delete_pinned(set)
            .await
            .map_err(|e| e.into_storage("delete"))
    }

    fn describe_connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }
}
