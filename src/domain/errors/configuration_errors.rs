/// A single problem found while resolving the adapter configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    /// A required key is absent or empty
    Missing { key: String },

    /// A key is present but its value cannot be parsed
    Invalid {
        key: String,
        value: String,
        expected: String,
    },

    /// A label entry that is not of the form `name=value`
    MalformedLabel { entry: String },
}

impl ConfigIssue {
    pub fn missing(key: &str) -> Self {
        ConfigIssue::Missing {
            key: key.to_string(),
        }
    }

    pub fn invalid(key: &str, value: &str, expected: &str) -> Self {
        ConfigIssue::Invalid {
            key: key.to_string(),
            value: value.to_string(),
            expected: expected.to_string(),
        }
    }

    /// The configuration key this issue refers to
    pub fn key(&self) -> &str {
        match self {
            ConfigIssue::Missing { key } | ConfigIssue::Invalid { key, .. } => key,
            ConfigIssue::MalformedLabel { .. } => "labels",
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigIssue::Missing { key } => write!(f, "'{}' is required", key),
            ConfigIssue::Invalid {
                key,
                value,
                expected,
            } => write!(
                f,
                "invalid value for '{}': '{}' (expected: {})",
                key, value, expected
            ),
            ConfigIssue::MalformedLabel { entry } => {
                write!(f, "malformed label '{}' (expected: name=value)", entry)
            }
        }
    }
}

/// Fatal initialization error listing every invalid configuration field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationError {
    issues: Vec<ConfigIssue>,
}

impl ConfigurationError {
    pub fn new(issues: Vec<ConfigIssue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: ConfigIssue) -> Self {
        Self {
            issues: vec![issue],
        }
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// Whether any issue concerns the given configuration key
    pub fn mentions(&self, key: &str) -> bool {
        self.issues.iter().any(|issue| issue.key() == key)
    }

    /// Merge the issues of several partial resolutions; `Ok` only when none failed
    pub fn collect<I>(results: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = Option<ConfigurationError>>,
    {
        let issues: Vec<ConfigIssue> = results
            .into_iter()
            .flatten()
            .flat_map(|err| err.issues)
            .collect();

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ConfigurationError { issues })
        }
    }
}

impl std::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid configuration: ")?;
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigurationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_issue() {
        let err = ConfigurationError::new(vec![
            ConfigIssue::missing("url"),
            ConfigIssue::invalid("threads", "abc", "non-negative integer"),
        ]);

        let msg = err.to_string();
        assert!(msg.contains("'url' is required"));
        assert!(msg.contains("'threads': 'abc'"));
        assert!(err.mentions("threads"));
        assert!(!err.mentions("retries"));
    }

    #[test]
    fn test_collect_merges_partial_errors() {
        assert!(ConfigurationError::collect([None, None]).is_ok());

        let merged = ConfigurationError::collect([
            Some(ConfigurationError::single(ConfigIssue::missing("user"))),
            None,
            Some(ConfigurationError::single(ConfigIssue::MalformedLabel {
                entry: "badpair".to_string(),
            })),
        ])
        .unwrap_err();

        assert_eq!(merged.issues().len(), 2);
        assert!(merged.mentions("user"));
        assert!(merged.mentions("labels"));
    }
}
