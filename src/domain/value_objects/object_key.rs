use crate::domain::errors::ValidationError;

/// A validated object key (path) inside a bucket.
///
/// Leading and trailing slashes are trimmed on construction, so `"a/b"`,
/// `"/a/b"` and `"a/b/"` all address the same object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    const MAX_LEN: usize = 1024;

    /// Create a new ObjectKey with validation
    pub fn new(value: String) -> Result<Self, ValidationError> {
        let trimmed = value.trim_matches('/');

        if trimmed.is_empty() {
            return Err(ValidationError::EmptyObjectKey);
        }

        if trimmed.len() > Self::MAX_LEN {
            return Err(ValidationError::ObjectKeyTooLong {
                actual: trimmed.len(),
                max: Self::MAX_LEN,
            });
        }

        if trimmed.contains('\0') {
            return Err(ValidationError::InvalidObjectKeyCharacter('\0'));
        }

        // Keys double as local staging paths
        if trimmed.split('/').any(|segment| segment == "..") {
            return Err(ValidationError::ObjectKeyParentSegment);
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Get the normalized key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for ObjectKey {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        ObjectKey::new(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slashes_are_normalized() {
        let bare = ObjectKey::new("a/b".to_string()).unwrap();
        let leading = ObjectKey::new("/a/b".to_string()).unwrap();
        let trailing = ObjectKey::new("a/b/".to_string()).unwrap();

        assert_eq!(bare, leading);
        assert_eq!(bare, trailing);
        assert_eq!(bare.as_str(), "a/b");
    }

    #[test]
    fn test_invalid_object_key() {
        assert!(ObjectKey::new("".to_string()).is_err());
        assert!(ObjectKey::new("///".to_string()).is_err());
        assert!(ObjectKey::new("null\0byte".to_string()).is_err());
        assert!(ObjectKey::new("x".repeat(1025)).is_err());
        assert_eq!(
            ObjectKey::new("backups/../etc/passwd".to_string()),
            Err(ValidationError::ObjectKeyParentSegment)
        );
    }
}
