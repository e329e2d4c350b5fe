use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::models::ArtifactItem;

/// Body of an AQL search response
#[derive(Debug, Clone, Deserialize)]
pub struct AqlResponse {
    #[serde(default)]
    pub results: Vec<AqlItem>,
}

/// One row of an AQL search response
#[derive(Debug, Clone, Deserialize)]
pub struct AqlItem {
    pub repo: String,
    #[serde(default)]
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified: Option<String>,
}

impl From<AqlItem> for ArtifactItem {
    fn from(row: AqlItem) -> Self {
        let modified = row
            .modified
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.with_timezone(&Utc));

        ArtifactItem {
            repo: row.repo,
            path: row.path,
            name: row.name,
            size: row.size,
            modified,
        }
    }
}
