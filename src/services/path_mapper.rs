//! Translation between `(bucket, key)` pairs and repository `<repo>/<path>` patterns.
//!
//! Mostly string manipulation; the repository service's own
//! pattern matching stays the authority on which results come back.

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

/// Wildcard understood by repository search patterns
pub const WILDCARD: char = '*';

/// Strip leading and trailing slashes from a key
pub fn normalize_key(key: &str) -> &str {
    key.trim_matches('/')
}

/// Strip leading slashes from a listing prefix; a trailing slash is meaningful and kept
pub fn normalize_prefix(prefix: &str) -> &str {
    prefix.trim_start_matches('/')
}

/// Upload target `<bucket>/<key>`
pub fn upload_target(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, normalize_key(key))
}

/// Pattern addressing one object for download, search and delete
pub fn object_pattern(bucket: &str, key: &str) -> String {
    format!("{}/{}", bucket, normalize_key(key))
}

/// Trailing-wildcard pattern selecting everything below `prefix`
pub fn prefix_pattern(bucket: &str, prefix: &str) -> String {
    format!("{}/{}{}", bucket, normalize_prefix(prefix), WILDCARD)
}

/// The literal `<bucket>/<prefix>` that every listed identity must start with
pub fn listing_root(bucket: &str, prefix: &str) -> String {
    format!("{}/{}", bucket, normalize_prefix(prefix))
}

/// Part of a result identity after `<bucket>/<prefix>`.
///
/// `None` means the backend returned something outside the requested prefix.
pub fn sub_key<'a>(identity: &'a str, bucket: &str, prefix: &str) -> Option<&'a str> {
    identity.strip_prefix(listing_root(bucket, prefix).as_str())
}

/// Staging location of an object relative to the staging root
pub fn staging_path(bucket: &str, key: &str) -> PathBuf {
    let mut path = PathBuf::from(bucket);
    path.extend(normalize_key(key).split('/').filter(|s| !s.is_empty()));
    path
}

/// Local file a downloaded item lands in: the target itself, or the item's
/// name inside the target when the target ends with a separator
pub fn download_destination(target: &Path, name: &str) -> PathBuf {
    if is_folder_target(target) {
        target.join(name)
    } else {
        target.to_path_buf()
    }
}

/// A local target ending with a separator names a folder
pub fn is_folder_target(target: &Path) -> bool {
    let raw = target.as_os_str().to_string_lossy();
    raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR)
}

/// Split a `<repo>/<path>` pattern into the repository and the in-repo part
pub fn split_pattern(pattern: &str) -> (&str, &str) {
    let pattern = pattern.trim_start_matches('/');
    pattern.split_once('/').unwrap_or((pattern, ""))
}

/// Compiled form of a repository search pattern.
///
/// `*` matches any run of characters; it stops at `/` unless the matcher is
/// recursive. A recursive pattern that names a folder also matches everything
/// beneath that folder. Every other character is literal.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    globs: GlobSet,
}

impl PatternMatcher {
    pub fn new(pattern: &str, recursive: bool) -> Result<Self, globset::Error> {
        let glob = pattern
            .split(WILDCARD)
            .map(globset::escape)
            .collect::<Vec<_>>()
            .join("*");

        let mut builder = GlobSetBuilder::new();
        builder.add(compile(&glob, recursive)?);
        if recursive {
            builder.add(compile(&format!("{}/**", glob.trim_end_matches('/')), recursive)?);
        }

        Ok(Self {
            globs: builder.build()?,
        })
    }

    pub fn is_match(&self, candidate: &str) -> bool {
        self.globs.is_match(candidate)
    }
}

fn compile(glob: &str, recursive: bool) -> Result<Glob, globset::Error> {
    GlobBuilder::new(glob)
        .literal_separator(!recursive)
        .backslash_escape(false)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slash_variants_map_to_the_same_pattern() {
        let expected = "backups/a/b";
        for key in ["a/b", "a/b/", "/a/b", "//a/b//"] {
            assert_eq!(object_pattern("backups", key), expected);
            assert_eq!(upload_target("backups", key), expected);
        }
    }

    #[test]
    fn test_prefix_pattern_keeps_trailing_slash() {
        assert_eq!(prefix_pattern("backups", "x/"), "backups/x/*");
        assert_eq!(prefix_pattern("backups", ""), "backups/*");
        assert_eq!(prefix_pattern("backups", "/x/"), "backups/x/*");
    }

    #[test]
    fn test_sub_key_strips_bucket_and_prefix() {
        assert_eq!(sub_key("backups/x/1/a", "backups", "x/"), Some("1/a"));
        assert_eq!(sub_key("backups/x/1/a", "backups", ""), Some("x/1/a"));
        assert_eq!(sub_key("other/x/1/a", "backups", "x/"), None);
    }

    #[test]
    fn test_staging_path_is_deterministic() {
        assert_eq!(
            staging_path("backups", "/a/b/c/"),
            PathBuf::from("backups").join("a").join("b").join("c")
        );
    }

    #[test]
    fn test_download_destination() {
        assert_eq!(
            download_destination(Path::new("/tmp/backups/b/k"), "k"),
            PathBuf::from("/tmp/backups/b/k")
        );
        assert_eq!(
            download_destination(Path::new("/tmp/out/"), "k"),
            PathBuf::from("/tmp/out/k")
        );
        assert!(is_folder_target(Path::new("/tmp/out/")));
        assert!(!is_folder_target(Path::new("/tmp/out")));
    }

    #[test]
    fn test_split_pattern() {
        assert_eq!(split_pattern("backups/x/1/*"), ("backups", "x/1/*"));
        assert_eq!(split_pattern("backups"), ("backups", ""));
    }

    fn matches(pattern: &str, candidate: &str, recursive: bool) -> bool {
        PatternMatcher::new(pattern, recursive)
            .unwrap()
            .is_match(candidate)
    }

    #[test]
    fn test_wildcard_matching() {
        assert!(matches("backups/x/*", "backups/x/1/a", true));
        assert!(!matches("backups/x/*", "backups/x/1/a", false));
        assert!(matches("backups/x/*", "backups/x/a", false));
        assert!(matches("backups/*", "backups/a", true));
        assert!(!matches("backups/y*", "backups/x/1/a", true));
        assert!(matches("backups/a/b/c", "backups/a/b/c", false));
        assert!(!matches("backups/a/b/c", "backups/a/b/cd", true));
    }

    #[test]
    fn test_recursive_pattern_includes_folder_contents() {
        assert!(matches("backups/a/b", "backups/a/b/c", true));
        assert!(matches("backups/a/b", "backups/a/b/c/d", true));
        assert!(!matches("backups/a/b", "backups/a/b/c", false));
        assert!(!matches("backups/a/b", "backups/a/bc/d", true));
    }

    #[test]
    fn test_glob_metacharacters_are_literal() {
        assert!(matches("backups/v[1]?/{a,b}", "backups/v[1]?/{a,b}", false));
        assert!(!matches("backups/v[1]?/{a,b}", "backups/v1x/a", false));
        assert!(matches("backups/dir\\name/*", "backups/dir\\name/k", false));
    }
}
