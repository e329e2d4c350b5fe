use crate::domain::errors::ValidationError;

/// A validated bucket name; maps 1:1 to a repository name on the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketName(String);

impl BucketName {
    const MAX_LEN: usize = 64;

    /// Create a new BucketName using repository-key naming rules
    pub fn new(value: String) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::EmptyBucketName);
        }

        if value.len() > Self::MAX_LEN {
            return Err(ValidationError::BucketNameTooLong {
                actual: value.len(),
                max: Self::MAX_LEN,
            });
        }

        // Slashes and wildcards would change the meaning of search patterns
        if let Some(c) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(ValidationError::BucketNameInvalidCharacter(c));
        }

        Ok(Self(value))
    }

    /// Get the bucket name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BucketName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for BucketName {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        BucketName::new(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(BucketName::new("velero-backups".to_string()).is_ok());
        assert!(BucketName::new("generic_local".to_string()).is_ok());
        assert!(BucketName::new("Backups.2024".to_string()).is_ok());
    }

    #[test]
    fn test_invalid_bucket_names() {
        assert!(BucketName::new("".to_string()).is_err());
        assert!(BucketName::new("a".repeat(65)).is_err());
        assert_eq!(
            BucketName::new("repo/sub".to_string()),
            Err(ValidationError::BucketNameInvalidCharacter('/'))
        );
        assert!(BucketName::new("repo*".to_string()).is_err());
        assert!(BucketName::new("my repo".to_string()).is_err());
    }
}
