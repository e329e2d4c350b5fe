//! Delimiter-bounded common-prefix listing on top of a flat recursive search.
//!
//! Only the first segment after `prefix` is kept; callers drill down by
//! listing again with a returned prefix.

use std::collections::HashSet;

use crate::{
    domain::{
        errors::{StorageResult, ValidationError},
        models::ArtifactItem,
        value_objects::{BucketName, LabelSet},
    },
    ports::backend::{RepositoryBackend, SearchParams},
    services::path_mapper,
};

/// List the virtual folders one `delimiter` level below `prefix`.
///
/// Every result has the form `prefix + first_segment + delimiter` and appears
/// once. Order follows the backend's result order and carries no meaning.
pub async fn list_common_prefixes(
    backend: &dyn RepositoryBackend,
    labels: &LabelSet,
    bucket: &BucketName,
    prefix: &str,
    delimiter: &str,
) -> StorageResult<Vec<String>> {
    if delimiter.is_empty() {
        return Err(ValidationError::EmptyDelimiter.into());
    }

    let prefix = path_mapper::normalize_prefix(prefix);
    let params = SearchParams::builder()
        .pattern(path_mapper::prefix_pattern(bucket.as_str(), prefix))
        .properties(labels.clone())
        .recursive(true)
        .build();

    let results = backend.search(params).await.map_err(|e| {
        tracing::error!(bucket = %bucket, prefix, error = %e, "Search for common prefixes failed");
        e
    })?;

    Ok(collect_common_prefixes(
        &results,
        bucket.as_str(),
        prefix,
        delimiter,
    ))
}

/// Reduce raw search results to deduplicated common prefixes.
///
/// Results outside `<bucket>/<prefix>` are logged and skipped.
pub fn collect_common_prefixes(
    results: &[ArtifactItem],
    bucket: &str,
    prefix: &str,
    delimiter: &str,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut prefixes = Vec::new();

    for item in results {
        let identity = item.identity();
        let Some(sub_key) = path_mapper::sub_key(&identity, bucket, prefix) else {
            tracing::warn!(
                bucket,
                prefix,
                artifact = %identity,
                "Search returned an artifact outside the requested prefix, skipping"
            );
            continue;
        };

        let first_segment = sub_key.split(delimiter).next().unwrap_or_default();
        let candidate = format!("{}{}{}", prefix, first_segment, delimiter);

        if seen.insert(candidate.clone()) {
            prefixes.push(candidate);
        }
    }

    prefixes
}
