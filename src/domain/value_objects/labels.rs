use crate::domain::errors::{ConfigIssue, ConfigurationError};

/// A single `name=value` property attached to uploads and used as a search filter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label {
    pub name: String,
    pub value: String,
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Ordered label set parsed from a `name=value;name=value` string.
///
/// An empty set disables property filtering.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    pub const SEPARATOR: char = ';';

    pub fn new(labels: Vec<Label>) -> Self {
        Self { labels }
    }

    /// Parse a raw label string.
    ///
    /// Empty segments (such as a trailing `;`) are skipped. Entries without
    /// `=` or with an empty name are reported together in one error.
    pub fn parse(raw: &str) -> Result<Self, ConfigurationError> {
        let mut labels = Vec::new();
        let mut issues = Vec::new();

        for entry in raw.split(Self::SEPARATOR) {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }

            match entry.split_once('=') {
                Some((name, value)) if !name.trim().is_empty() => {
                    labels.push(Label::new(name.trim(), value.trim()));
                }
                _ => issues.push(ConfigIssue::MalformedLabel {
                    entry: entry.to_string(),
                }),
            }
        }

        if issues.is_empty() {
            Ok(Self { labels })
        } else {
            Err(ConfigurationError::new(issues))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Whether every label in this set appears among the given properties
    pub fn matches(&self, properties: &[Label]) -> bool {
        self.labels.iter().all(|label| properties.contains(label))
    }

    /// Serialize back into the backend's `name=value;name=value` filter syntax
    pub fn to_filter_string(&self) -> String {
        self.labels
            .iter()
            .map(|label| format!("{}={}", label.name, label.value))
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl<'a> IntoIterator for &'a LabelSet {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}
