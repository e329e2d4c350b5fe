use std::path::PathBuf;

/// TLS client certificate material, referenced by path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCertificate {
    pub cert_path: PathBuf,
    pub key_path: Option<PathBuf>,
}

/// The one credential used when a secret must be embedded or presented
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    Password(&'a str),
    ApiKey(&'a str),
    AccessToken(&'a str),
}

impl<'a> Credential<'a> {
    pub fn secret(&self) -> &'a str {
        match self {
            Credential::Password(s) | Credential::ApiKey(s) | Credential::AccessToken(s) => s,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Credential::Password(_) => "password",
            Credential::ApiKey(_) => "api_key",
            Credential::AccessToken(_) => "access_token",
        }
    }
}

impl std::fmt::Debug for Credential<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential::{}(<redacted>)", self.kind())
    }
}

/// Fully resolved connection details for the repository service.
///
/// Built once during initialization and never mutated afterwards. Several
/// credential sources may be present at once; [`ConnectionDescriptor::authoritative_credential`]
/// picks the one that wins.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub endpoint: http::Uri,
    pub user: String,
    pub password: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub ssh_key_path: Option<PathBuf>,
    pub client_certificate: Option<ClientCertificate>,
}

impl ConnectionDescriptor {
    pub fn new(endpoint: http::Uri, user: impl Into<String>) -> Self {
        Self {
            endpoint,
            user: user.into(),
            password: None,
            api_key: None,
            access_token: None,
            ssh_key_path: None,
            client_certificate: None,
        }
    }

    /// First non-empty credential in the order password, API key, access token
    pub fn authoritative_credential(&self) -> Option<Credential<'_>> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        present(&self.password)
            .map(Credential::Password)
            .or_else(|| present(&self.api_key).map(Credential::ApiKey))
            .or_else(|| present(&self.access_token).map(Credential::AccessToken))
    }

    pub fn is_anonymous(&self) -> bool {
        self.authoritative_credential().is_none()
    }

    /// Endpoint rendered with exactly one trailing slash, ready for joining paths
    pub fn base_url(&self) -> String {
        let endpoint = self.endpoint.to_string();
        format!("{}/", endpoint.trim_end_matches('/'))
    }
}

impl std::fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn redact(value: &Option<String>) -> Option<&'static str> {
            value.as_ref().map(|_| "<redacted>")
        }

        f.debug_struct("ConnectionDescriptor")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &redact(&self.password))
            .field("api_key", &redact(&self.api_key))
            .field("access_token", &redact(&self.access_token))
            .field("ssh_key_path", &self.ssh_key_path)
            .field("client_certificate", &self.client_certificate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ConnectionDescriptor {
        ConnectionDescriptor::new(
            "https://repo.example.com/artifactory".parse().unwrap(),
            "deployer",
        )
    }

    #[test]
    fn test_password_wins_over_api_key_and_token() {
        let mut conn = descriptor();
        conn.api_key = Some("key".to_string());
        conn.access_token = Some("token".to_string());
        conn.password = Some("secret".to_string());

        assert_eq!(
            conn.authoritative_credential(),
            Some(Credential::Password("secret"))
        );
    }

    #[test]
    fn test_empty_values_do_not_count() {
        let mut conn = descriptor();
        conn.password = Some(String::new());
        conn.access_token = Some("token".to_string());

        assert_eq!(
            conn.authoritative_credential(),
            Some(Credential::AccessToken("token"))
        );

        conn.access_token = None;
        assert!(conn.is_anonymous());
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let mut conn = descriptor();
        conn.password = Some("hunter2".to_string());

        let rendered = format!("{:?}", conn);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_base_url_has_single_trailing_slash() {
        assert_eq!(
            descriptor().base_url(),
            "https://repo.example.com/artifactory/"
        );

        let root = ConnectionDescriptor::new("http://localhost:8081".parse().unwrap(), "u");
        assert_eq!(root.base_url(), "http://localhost:8081/");
    }
}
