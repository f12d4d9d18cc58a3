//! Client configuration.

use std::time::Duration;

use crate::error::{GitlabError, Result};

/// API path prefix of the GitLab v3 API.
pub const API_V3: &str = "/api/v3";

/// API path prefix of the GitLab v4 API.
pub const API_V4: &str = "/api/v4";

pub(crate) const USER_AGENT: &str = concat!("glapi/", env!("CARGO_PKG_VERSION"));

/// Environment variable holding the GitLab host URL.
pub const ENV_URL: &str = "GITLAB_URL";
/// Environment variable holding the private token.
pub const ENV_TOKEN: &str = "GITLAB_TOKEN";
/// Environment variable overriding the API path prefix.
pub const ENV_API_PATH: &str = "GITLAB_API_PATH";
/// Environment variable naming a user to impersonate.
pub const ENV_SUDO: &str = "GITLAB_SUDO";
/// Environment variable that disables TLS certificate checks when truthy.
pub const ENV_INSECURE: &str = "GITLAB_INSECURE";

/// Connection settings fixed when a client is constructed.
///
/// Children created with [`GitlabClient::child`](crate::GitlabClient::child)
/// share the configuration of their parent.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Path prefix placed between the host and every resource path.
    pub api_path: String,
    /// Whether TLS certificates are verified.
    pub verify_tls: bool,
    /// Deadline for a whole request, including reading the body.
    pub timeout: Duration,
    /// User-Agent header value.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_path: API_V4.to_string(),
            verify_tls: true,
            timeout: Duration::from_secs(300),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    /// Set the API path prefix (e.g. [`API_V3`]).
    pub fn with_api_path(mut self, api_path: impl Into<String>) -> Self {
        self.api_path = api_path.into();
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Everything needed to open a client, as read from the environment.
#[derive(Debug, Clone)]
pub(crate) struct EnvSettings {
    pub url: String,
    pub token: String,
    pub sudo: Option<String>,
    pub config: ClientConfig,
}

impl EnvSettings {
    /// Read settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let url = lookup(ENV_URL).ok_or_else(|| {
            GitlabError::ConfigMissing(format!("{ENV_URL} environment variable not set"))
        })?;
        let token = lookup(ENV_TOKEN).ok_or_else(|| {
            GitlabError::ConfigMissing(format!("{ENV_TOKEN} environment variable not set"))
        })?;

        let mut config = ClientConfig::default();
        if let Some(api_path) = lookup(ENV_API_PATH) {
            config.api_path = api_path;
        }
        if let Some(insecure) = lookup(ENV_INSECURE) {
            config.verify_tls = !is_truthy(&insecure);
        }

        Ok(Self {
            url,
            token,
            sudo: lookup(ENV_SUDO).filter(|s| !s.is_empty()),
            config,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_path, API_V4);
        assert!(config.verify_tls);
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert!(config.user_agent.starts_with("glapi/"));
    }

    #[test]
    fn test_env_requires_url_and_token() {
        let err = EnvSettings::from_lookup(lookup(&[(ENV_TOKEN, "t")])).unwrap_err();
        assert!(matches!(err, GitlabError::ConfigMissing(msg) if msg.contains(ENV_URL)));

        let err =
            EnvSettings::from_lookup(lookup(&[(ENV_URL, "https://gitlab.com")])).unwrap_err();
        assert!(matches!(err, GitlabError::ConfigMissing(msg) if msg.contains(ENV_TOKEN)));
    }

    #[test]
    fn test_env_optional_settings() {
        let settings = EnvSettings::from_lookup(lookup(&[
            (ENV_URL, "https://gitlab.example.com"),
            (ENV_TOKEN, "secret"),
            (ENV_API_PATH, API_V3),
            (ENV_SUDO, "alice"),
            (ENV_INSECURE, "true"),
        ]))
        .unwrap();

        assert_eq!(settings.url, "https://gitlab.example.com");
        assert_eq!(settings.token, "secret");
        assert_eq!(settings.sudo.as_deref(), Some("alice"));
        assert_eq!(settings.config.api_path, API_V3);
        assert!(!settings.config.verify_tls);
    }

    #[test]
    fn test_env_empty_sudo_is_ignored() {
        let settings = EnvSettings::from_lookup(lookup(&[
            (ENV_URL, "https://gitlab.example.com"),
            (ENV_TOKEN, "secret"),
            (ENV_SUDO, ""),
            (ENV_INSECURE, "0"),
        ]))
        .unwrap();
        assert_eq!(settings.sudo, None);
        assert!(settings.config.verify_tls);
    }
}
