//! GitLab API client handle.
//!
//! Holds the connection settings and credentials for one session. Resource
//! operations are implemented via traits and functions on model types.

use std::env;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ClientConfig, EnvSettings, API_V3, API_V4};
use crate::error::{GitlabError, Result};
use crate::pagination::{collect_all, Page, Paged};
use crate::params::Params;
use crate::request::RequestBuilder;
use crate::transport::RequestLogger;

/// Handle to a GitLab server.
///
/// The HTTP transport is shared by every clone and child of a handle;
/// credentials, impersonation and default parameters belong to each handle
/// and change only through its `&mut self` setters.
///
/// # Example
///
/// ```no_run
/// use glapi::GitlabClient;
///
/// # fn example() -> glapi::Result<()> {
/// let server = GitlabClient::open_v4("https://gitlab.example.com")?;
///
/// // One handle per session, each with its own credentials.
/// let mut session = server.child();
/// session.set_token("glpat-xxxxxxxx");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GitlabClient {
    http: Client,
    host: Arc<Url>,
    origin: Arc<str>,
    config: Arc<ClientConfig>,
    token: String,
    sudo: Option<String>,
    params: Params,
    logger: Option<Arc<dyn RequestLogger>>,
}

impl std::fmt::Debug for GitlabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitlabClient")
            .field("host", &self.host.as_str())
            .field("api_path", &self.config.api_path)
            .field("sudo", &self.sudo)
            .finish_non_exhaustive()
    }
}

impl GitlabClient {
    /// Create a client from environment variables.
    ///
    /// Reads `GITLAB_URL` and `GITLAB_TOKEN`, and optionally
    /// `GITLAB_API_PATH` (default `/api/v4`), `GITLAB_SUDO` and
    /// `GITLAB_INSECURE`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or the URL is invalid.
    pub fn from_env() -> Result<Self> {
        let settings = EnvSettings::from_lookup(|key| env::var(key).ok())?;
        let mut client = Self::with_config(&settings.url, settings.config)?;
        client.set_token(settings.token);
        if let Some(sudo) = settings.sudo {
            client.set_sudo(sudo);
        }
        Ok(client)
    }

    /// Create a client for the given host and API path.
    ///
    /// TLS certificates are not verified when `cert_check` is false.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::InvalidUrl`] if `host` is not an absolute
    /// http(s) URL.
    pub fn new(host: &str, api_path: &str, cert_check: bool) -> Result<Self> {
        Self::with_config(
            host,
            ClientConfig::default()
                .with_api_path(api_path)
                .with_verify_tls(cert_check),
        )
    }

    /// Create a client that verifies TLS certificates.
    pub fn open(host: &str, api_path: &str) -> Result<Self> {
        Self::new(host, api_path, true)
    }

    /// Create a client for the v3 API.
    pub fn open_v3(host: &str) -> Result<Self> {
        Self::open(host, API_V3)
    }

    /// Create a client for the v4 API.
    pub fn open_v4(host: &str) -> Result<Self> {
        Self::open(host, API_V4)
    }

    /// Create a client with full control over the configuration.
    pub fn with_config(host: &str, config: ClientConfig) -> Result<Self> {
        let url = Url::parse(host).map_err(|e| GitlabError::invalid_url(host, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(GitlabError::invalid_url(
                host,
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if !url.has_host() {
            return Err(GitlabError::invalid_url(host, url::ParseError::EmptyHost));
        }
        let origin = url.origin().ascii_serialization();

        let http = Client::builder()
            .user_agent(config.user_agent.as_str())
            .brotli(true)
            .gzip(true)
            .deflate(true)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(GitlabError::Network)?;

        Ok(Self {
            http,
            host: Arc::new(url),
            origin: origin.into(),
            config: Arc::new(config),
            token: String::new(),
            sudo: None,
            params: Params::new(),
            logger: None,
        })
    }

    /// Derive a handle that shares this handle's transport, host, API path
    /// and logger.
    ///
    /// The child gets a copy of the default parameters and starts without
    /// a token or impersonation. Changing either handle afterwards never
    /// affects the other.
    #[must_use]
    pub fn child(&self) -> Self {
        Self {
            http: self.http.clone(),
            host: Arc::clone(&self.host),
            origin: Arc::clone(&self.origin),
            config: Arc::clone(&self.config),
            token: String::new(),
            sudo: None,
            params: self.params.clone(),
            logger: self.logger.clone(),
        }
    }

    /// Set the private token sent with every request.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = token.into();
    }

    /// Act as another user (requires an administrator token).
    pub fn set_sudo(&mut self, user: impl Into<String>) {
        self.sudo = Some(user.into());
    }

    /// Stop impersonating.
    pub fn clear_sudo(&mut self) {
        self.sudo = None;
    }

    /// Set a parameter sent in the query string of every request.
    pub fn set_default_param(&mut self, key: impl Into<String>, value: impl ToString) {
        self.params.set(key, value);
    }

    /// Attach a logger notified of every executed request.
    pub fn set_logger(&mut self, logger: Arc<dyn RequestLogger>) {
        self.logger = Some(logger);
    }

    /// Builder-style [`set_token`](Self::set_token).
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.set_token(token);
        self
    }

    /// Builder-style [`set_sudo`](Self::set_sudo).
    #[must_use]
    pub fn with_sudo(mut self, user: impl Into<String>) -> Self {
        self.set_sudo(user);
        self
    }

    /// Builder-style [`set_logger`](Self::set_logger).
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn RequestLogger>) -> Self {
        self.set_logger(logger);
        self
    }

    /// The host URL this client was opened with.
    pub fn host_url(&self) -> &Url {
        &self.host
    }

    /// The API path prefix.
    pub fn api_path(&self) -> &str {
        &self.config.api_path
    }

    /// The configuration fixed at construction.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The current private token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The impersonated user, if any.
    pub fn sudo(&self) -> Option<&str> {
        self.sudo.as_deref()
    }

    /// Parameters sent with every request.
    pub fn default_params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn logger(&self) -> Option<&Arc<dyn RequestLogger>> {
        self.logger.as_ref()
    }

    /// `{scheme}://{authority}{api_path}{path}`; any path on the host URL
    /// itself is not used.
    pub(crate) fn endpoint_url(&self, path: &str) -> Result<Url> {
        let raw = format!("{}{}{}", self.origin, self.config.api_path, path);
        Url::parse(&raw).map_err(|e| GitlabError::invalid_url(&raw, e))
    }

    /// Start building a request for a resource path (after templating).
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, path.into())
    }

    /// GET a single resource.
    #[tracing::instrument(skip(self, params))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T> {
        self.request(Method::GET, path)
            .params(params.clone())
            .json()
            .await
    }

    /// GET one page of a list.
    #[tracing::instrument(skip(self, params))]
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &Params,
        page: Option<Page>,
    ) -> Result<Paged<T>> {
        self.request(Method::GET, path)
            .params(params.clone())
            .page(page)
            .json_page()
            .await
    }

    /// GET every page of a list, following the server's `next` links.
    pub async fn get_all<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<Vec<T>> {
        collect_all(|page| self.get_page(path, params, page)).await
    }

    /// GET a raw-byte resource (file contents, archives).
    ///
    /// Like every read, this carries the default `page`/`per_page`.
    #[tracing::instrument(skip(self, params))]
    pub async fn get_raw(&self, path: &str, params: &Params) -> Result<Bytes> {
        self.request(Method::GET, path)
            .params(params.clone())
            .bytes()
            .await
    }

    /// POST form parameters and decode the response.
    #[tracing::instrument(skip(self, params))]
    pub async fn post<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T> {
        self.request(Method::POST, path)
            .params(params.clone())
            .json()
            .await
    }

    /// PUT form parameters and decode the response.
    #[tracing::instrument(skip(self, params))]
    pub async fn put<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T> {
        self.request(Method::PUT, path)
            .params(params.clone())
            .json()
            .await
    }

    /// DELETE a resource and decode the response.
    #[tracing::instrument(skip(self, params))]
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T> {
        self.request(Method::DELETE, path)
            .params(params.clone())
            .json()
            .await
    }

    /// DELETE a resource and ignore the response body.
    #[tracing::instrument(skip(self, params))]
    pub async fn delete_discard(&self, path: &str, params: &Params) -> Result<()> {
        self.request(Method::DELETE, path)
            .params(params.clone())
            .discard()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_debug() {
        let client = GitlabClient::open_v4("https://gitlab.example.com")
            .unwrap()
            .with_token("test-token");
        let debug = format!("{:?}", client);
        assert!(debug.contains("GitlabClient"));
        assert!(debug.contains("host"));
        // Token should not be in debug output
        assert!(!debug.contains("test-token"));
    }

    #[test]
    fn test_insecure_client() {
        let client = GitlabClient::new("https://myhost", "/myapi", false).unwrap();
        assert_eq!(client.host_url().as_str(), "https://myhost/");
        assert_eq!(client.api_path(), "/myapi");
        assert!(!client.config().verify_tls);
    }

    #[test]
    fn test_secure_clients() {
        let client = GitlabClient::open("https://myhost", "/myapi").unwrap();
        assert!(client.config().verify_tls);

        let v3 = GitlabClient::open_v3("https://myhost").unwrap();
        assert_eq!(v3.api_path(), API_V3);
        assert!(v3.config().verify_tls);

        let v4 = GitlabClient::open_v4("https://myhost").unwrap();
        assert_eq!(v4.api_path(), API_V4);
    }

    #[test]
    fn test_invalid_hosts() {
        for host in ["", "myhost", "://nope", "mailto:someone@example.com", "ftp://host"] {
            let err = GitlabClient::open_v4(host).unwrap_err();
            assert!(
                matches!(err, GitlabError::InvalidUrl { .. }),
                "{host}: {err:?}"
            );
        }
    }

    #[test]
    fn test_endpoint_url_ignores_host_path() {
        let client = GitlabClient::open("http://localhost:8080/ignored", "/api/v4").unwrap();
        assert_eq!(
            client.endpoint_url("/projects").unwrap().as_str(),
            "http://localhost:8080/api/v4/projects"
        );
    }

    #[test]
    fn test_child_isolation() {
        let mut parent = GitlabClient::open_v4("https://gitlab.example.com").unwrap();
        parent.set_token("parent-token");
        parent.set_default_param("statistics", true);

        let mut child = parent.child();
        assert_eq!(child.token(), "");
        assert_eq!(child.sudo(), None);
        assert_eq!(child.default_params().get("statistics"), Some("true"));

        child.set_token("child-token");
        child.set_sudo("alice");
        child.set_default_param("simple", true);
        assert_eq!(parent.token(), "parent-token");
        assert_eq!(parent.sudo(), None);
        assert_eq!(parent.default_params().get("simple"), None);

        parent.set_token("rotated");
        assert_eq!(child.token(), "child-token");

        let sibling = parent.child();
        assert_eq!(sibling.token(), "");
        assert_eq!(child.token(), "child-token");
    }

    #[test]
    fn test_clear_sudo() {
        let mut client = GitlabClient::open_v4("https://gitlab.example.com")
            .unwrap()
            .with_sudo("root");
        assert_eq!(client.sudo(), Some("root"));
        client.clear_sudo();
        assert_eq!(client.sudo(), None);
    }
}
