use std::collections::HashMap;
use std::path::PathBuf;

use crate::domain::{
    errors::{ConfigIssue, ConfigurationError},
    models::{ClientCertificate, ConnectionDescriptor},
};

pub const URL_KEY: &str = "url";
pub const USER_KEY: &str = "user";

pub const PASSWORD_ENV: &str = "ARTIFACTORY_PASSWORD";
pub const API_KEY_ENV: &str = "ARTIFACTORY_API_KEY";
pub const ACCESS_TOKEN_ENV: &str = "ARTIFACTORY_ACCESS_TOKEN";
pub const SSH_KEY_PATH_ENV: &str = "ARTIFACTORY_SSH_KEY_PATH";
pub const CLIENT_CERT_PATH_ENV: &str = "ARTIFACTORY_CLIENT_CERT_PATH";
pub const CLIENT_CERT_KEY_PATH_ENV: &str = "ARTIFACTORY_CLIENT_CERT_KEY_PATH";

/// Source of environment variables consulted for credential material
pub trait EnvSource: Send + Sync {
    fn var(&self, name: &str) -> Option<String>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Build the connection descriptor from the configuration map and environment.
///
/// `url` and `user` are required. Credentials are optional; with none set the
/// connection is anonymous and the backend decides whether that is enough.
pub fn resolve_connection(
    config: &HashMap<String, String>,
    env: &dyn EnvSource,
) -> Result<ConnectionDescriptor, ConfigurationError> {
    let mut issues = Vec::new();

    let endpoint = match non_empty(config.get(URL_KEY).cloned()) {
        Some(raw) => match parse_endpoint(&raw) {
            Some(uri) => Some(uri),
            None => {
                issues.push(ConfigIssue::invalid(URL_KEY, &raw, "absolute http(s) URL"));
                None
            }
        },
        None => {
            issues.push(ConfigIssue::missing(URL_KEY));
            None
        }
    };

    let user = non_empty(config.get(USER_KEY).cloned());
    if user.is_none() {
        issues.push(ConfigIssue::missing(USER_KEY));
    }

    let (Some(endpoint), Some(user)) = (endpoint, user) else {
        return Err(ConfigurationError::new(issues));
    };

    let mut descriptor = ConnectionDescriptor::new(endpoint, user);
    descriptor.password = non_empty(env.var(PASSWORD_ENV));
    descriptor.api_key = non_empty(env.var(API_KEY_ENV));
    descriptor.access_token = non_empty(env.var(ACCESS_TOKEN_ENV));
    descriptor.ssh_key_path = non_empty(env.var(SSH_KEY_PATH_ENV)).map(PathBuf::from);
    descriptor.client_certificate =
        non_empty(env.var(CLIENT_CERT_PATH_ENV)).map(|cert_path| ClientCertificate {
            cert_path: PathBuf::from(cert_path),
            key_path: non_empty(env.var(CLIENT_CERT_KEY_PATH_ENV)).map(PathBuf::from),
        });

    if descriptor.is_anonymous() {
        tracing::debug!(user = %descriptor.user, "No credential found in environment, connecting anonymously");
    }

    Ok(descriptor)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_endpoint(raw: &str) -> Option<http::Uri> {
    let uri: http::Uri = raw.trim().parse().ok()?;
    let scheme_ok = matches!(uri.scheme_str(), Some("http") | Some("https"));
    // Credentials in the endpoint itself would clash with the signed-URL user-info
    let authority_ok = uri
        .authority()
        .map_or(false, |authority| !authority.as_str().contains('@'));

    (scheme_ok && authority_ok).then_some(uri)
}
