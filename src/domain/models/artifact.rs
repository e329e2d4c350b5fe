use chrono::{DateTime, Utc};

/// One file returned by a repository search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactItem {
    pub repo: String,
    /// Folder inside the repository; `.` or empty for the repository root
    pub path: String,
    pub name: String,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl ArtifactItem {
    pub fn new(repo: impl Into<String>, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            path: path.into(),
            name: name.into(),
            size: 0,
            modified: None,
        }
    }

    /// Build an item from a `<path>/<name>` location inside `repo`
    pub fn from_location(repo: &str, location: &str) -> Self {
        match location.rsplit_once('/') {
            Some((path, name)) => Self::new(repo, path, name),
            None => Self::new(repo, ".", location),
        }
    }

    /// `<path>/<name>` relative to the repository root
    pub fn location(&self) -> String {
        match self.folder() {
            Some(path) => format!("{}/{}", path, self.name),
            None => self.name.clone(),
        }
    }

    /// `<repo>/<path>/<name>`, the identity that search patterns match against
    pub fn identity(&self) -> String {
        format!("{}/{}", self.repo, self.location())
    }

    fn folder(&self) -> Option<&str> {
        let path = self.path.trim_matches('/');
        if path.is_empty() || path == "." {
            None
        } else {
            Some(path)
        }
    }
}
