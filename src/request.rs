//! Request construction.
//!
//! A [`RequestBuilder`] turns a resource path and its parameters into a
//! [`RequestSpec`]: the fully qualified URL, the credential headers and an
//! optional form-encoded body. Building never touches the network, so
//! every precondition failure surfaces before a request is sent.

use bytes::Bytes;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::GitlabClient;
use crate::decode::decode;
use crate::error::{GitlabError, Result};
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::transport::RawResponse;

/// Header carrying the private token.
pub const PRIVATE_TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Header carrying the impersonated user.
pub const SUDO_HEADER: &str = "SUDO";

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Where request parameters are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamPlacement {
    /// In the query string.
    Query,
    /// As a form-encoded body.
    Body,
}

impl ParamPlacement {
    /// GitLab's convention: POST, PUT and PATCH take a body, everything
    /// else takes a query string.
    pub fn for_method(method: &Method) -> Self {
        if *method == Method::POST || *method == Method::PUT || *method == Method::PATCH {
            Self::Body
        } else {
            Self::Query
        }
    }
}

#[derive(Debug, Clone)]
struct RawBody {
    bytes: Bytes,
    content_type: Option<String>,
}

/// A fully built request, ready to execute.
#[derive(Clone)]
pub struct RequestSpec {
    method: Method,
    url: Url,
    headers: Vec<(&'static str, String)>,
    body: Option<Bytes>,
}

impl std::fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| *name).collect();
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &header_names)
            .field("body_len", &self.body.as_ref().map(Bytes::len))
            .finish()
    }
}

impl RequestSpec {
    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Fully qualified URL, including the query string.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// URL path (API prefix plus resource path).
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Encoded query string, if any.
    pub fn query(&self) -> Option<&str> {
        self.url.query()
    }

    /// Value of a query parameter.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// Value of the first header with exactly this name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Number of headers with exactly this name.
    pub fn header_count(&self, name: &str) -> usize {
        self.headers.iter().filter(|(n, _)| *n == name).count()
    }

    /// Request body, if any.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Parameters as text, for logging: the body if it is UTF-8, else the query.
    pub(crate) fn params_text(&self) -> Option<String> {
        match &self.body {
            Some(body) => std::str::from_utf8(body).ok().map(str::to_string),
            None => self.query().map(str::to_string),
        }
    }

    pub(crate) fn into_request(self) -> Result<reqwest::Request> {
        let mut request = reqwest::Request::new(self.method, self.url);
        let headers = request.headers_mut();
        for (name, value) in self.headers {
            headers.append(header_name(name)?, header_value(name, &value)?);
        }
        *request.body_mut() = self.body.map(reqwest::Body::from);
        Ok(request)
    }
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| GitlabError::InvalidParameter(format!("header {name}: {e}")))
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|_| {
        GitlabError::InvalidParameter(format!(
            "{name} value contains characters not allowed in a header"
        ))
    })
}

/// Builder for one GitLab request.
///
/// Created by [`GitlabClient::request`]. GET requests are paginated by
/// default and always carry `page` and `per_page`.
///
/// # Example
///
/// ```no_run
/// use glapi::{GitlabClient, Page, Params};
/// use reqwest::Method;
///
/// # async fn example(client: &GitlabClient) -> glapi::Result<()> {
/// let issues: Vec<serde_json::Value> = client
///     .request(Method::GET, "/issues")
///     .params(Params::new().with("state", "opened"))
///     .page(Some(Page::new(2, 20)))
///     .json()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[must_use = "a request builder does nothing until it is sent"]
pub struct RequestBuilder<'a> {
    client: &'a GitlabClient,
    method: Method,
    path: String,
    params: Params,
    placement: ParamPlacement,
    body: Option<RawBody>,
    page: Option<Page>,
    paginated: bool,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a GitlabClient, method: Method, path: String) -> Self {
        Self {
            client,
            placement: ParamPlacement::for_method(&method),
            paginated: method == Method::GET,
            method,
            path,
            params: Params::new(),
            body: None,
            page: None,
        }
    }

    /// Replace the request parameters.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Set one request parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.set(key, value);
        self
    }

    /// Override where parameters are sent.
    pub fn placement(mut self, placement: ParamPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Send a raw body. Body-placed parameters are then dropped.
    pub fn body(mut self, bytes: impl Into<Bytes>, content_type: Option<&str>) -> Self {
        self.body = Some(RawBody {
            bytes: bytes.into(),
            content_type: content_type.map(str::to_string),
        });
        self
    }

    /// Request a specific page; `None` means the default page.
    ///
    /// This also turns on pagination for non-GET methods.
    pub fn page(mut self, page: Option<Page>) -> Self {
        self.page = page;
        self.paginated = true;
        self
    }

    /// Turn the `page`/`per_page` query parameters on or off.
    pub fn paginated(mut self, paginated: bool) -> Self {
        self.paginated = paginated;
        self
    }

    /// Build the request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`GitlabError::InvalidParameter`] for a page with a zero
    /// index or size and for credentials that cannot be sent as headers.
    pub fn build(&self) -> Result<RequestSpec> {
        let client = self.client;
        let mut url = client.endpoint_url(&self.path)?;

        let mut query = client.default_params().clone();
        if self.placement == ParamPlacement::Query {
            query.merge(&self.params);
        }
        if self.paginated {
            let page = self.page.unwrap_or_default();
            page.validate()?;
            query.set("page", page.page);
            query.set("per_page", page.per_page);
        }
        if !query.is_empty() {
            url.set_query(Some(&query.encode()));
        }

        let mut headers = vec![(PRIVATE_TOKEN_HEADER, client.token().to_string())];
        if let Some(sudo) = client.sudo() {
            headers.push((SUDO_HEADER, sudo.to_string()));
        }

        let body = match (&self.body, self.placement) {
            (Some(raw), _) => Some(raw.clone()),
            (None, ParamPlacement::Body) if !self.params.is_empty() => Some(RawBody {
                bytes: Bytes::from(self.params.encode()),
                content_type: Some(FORM_CONTENT_TYPE.to_string()),
            }),
            _ => None,
        };
        if let Some(content_type) = body.as_ref().and_then(|b| b.content_type.clone()) {
            headers.push((CONTENT_TYPE_HEADER, content_type));
        }

        for (name, value) in &headers {
            header_value(name, value)?;
        }

        Ok(RequestSpec {
            method: self.method.clone(),
            url,
            headers,
            body: body.map(|b| b.bytes),
        })
    }

    /// Send the request and return the raw response.
    pub async fn send(self) -> Result<RawResponse> {
        let spec = self.build()?;
        self.client.execute(spec).await
    }

    /// Send the request and decode the body as JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.send().await?;
        decode(&response.body)
    }

    /// Send the request and decode the body as one page of a list.
    pub async fn json_page<T: DeserializeOwned>(self) -> Result<Paged<T>> {
        let response = self.send().await?;
        let items = decode(&response.body)?;
        Ok(Paged::new(items, response.pagination))
    }

    /// Send the request and return the body without decoding it.
    pub async fn bytes(self) -> Result<Bytes> {
        Ok(self.send().await?.body)
    }

    /// Send the request and ignore the body.
    pub async fn discard(self) -> Result<()> {
        self.send().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GitlabClient;

    fn client() -> GitlabClient {
        let mut client = GitlabClient::open("https://gitlab.example.com", "/api/v4").unwrap();
        client.set_token("secret");
        client
    }

    #[test]
    fn test_get_defaults_to_first_page_of_100() {
        let client = client();
        let spec = client.request(Method::GET, "/projects").build().unwrap();
        assert_eq!(
            spec.url().as_str(),
            "https://gitlab.example.com/api/v4/projects?page=1&per_page=100"
        );
        assert!(spec.body().is_none());
    }

    #[test]
    fn test_get_merges_params_with_page() {
        let client = client();
        let spec = client
            .request(Method::GET, "/users")
            .param("search", "ali ce")
            .page(Some(Page::new(3, 20)))
            .build()
            .unwrap();
        assert_eq!(spec.path(), "/api/v4/users");
        assert_eq!(spec.query(), Some("search=ali+ce&page=3&per_page=20"));
    }

    #[test]
    fn test_caller_page_params_are_overridden() {
        let client = client();
        let spec = client
            .request(Method::GET, "/users")
            .param("page", 9)
            .build()
            .unwrap();
        assert_eq!(spec.query_param("page").as_deref(), Some("1"));
    }

    #[test]
    fn test_post_sends_form_body_without_paging() {
        let client = client();
        let spec = client
            .request(Method::POST, "/projects")
            .param("name", "demo")
            .param("description", "a b")
            .build()
            .unwrap();
        assert_eq!(spec.query(), None);
        assert_eq!(spec.body(), Some(&b"name=demo&description=a+b"[..]));
        assert_eq!(spec.header("Content-Type"), Some(FORM_CONTENT_TYPE));
    }

    #[test]
    fn test_post_without_params_has_no_body() {
        let client = client();
        let spec = client.request(Method::POST, "/projects/1/star").build().unwrap();
        assert!(spec.body().is_none());
        assert_eq!(spec.header("Content-Type"), None);
    }

    #[test]
    fn test_delete_sends_params_in_query() {
        let client = client();
        let spec = client
            .request(Method::DELETE, "/projects/1/repository/files")
            .param("file_path", "README.md")
            .build()
            .unwrap();
        assert_eq!(spec.query(), Some("file_path=README.md"));
        assert!(spec.body().is_none());
    }

    #[test]
    fn test_raw_body_overrides_body_params() {
        let client = client();
        let spec = client
            .request(Method::PUT, "/x")
            .param("ignored", 1)
            .body(&b"{\"a\":1}"[..], Some("application/json"))
            .build()
            .unwrap();
        assert_eq!(spec.body(), Some(&b"{\"a\":1}"[..]));
        assert_eq!(spec.header("Content-Type"), Some("application/json"));
        assert_eq!(spec.query(), None);
    }

    #[test]
    fn test_exactly_one_token_header_for_every_method() {
        let client = client();
        for method in [Method::GET, Method::POST, Method::PUT, Method::DELETE] {
            let spec = client.request(method, "/user").build().unwrap();
            assert_eq!(spec.header_count(PRIVATE_TOKEN_HEADER), 1);
            assert_eq!(spec.header(PRIVATE_TOKEN_HEADER), Some("secret"));
            assert_eq!(spec.header_count(SUDO_HEADER), 0);
        }
    }

    #[test]
    fn test_sudo_header_when_impersonating() {
        let mut client = client();
        client.set_sudo("alice");
        let spec = client.request(Method::GET, "/user").build().unwrap();
        assert_eq!(spec.header_count(SUDO_HEADER), 1);
        assert_eq!(spec.header(SUDO_HEADER), Some("alice"));
    }

    #[test]
    fn test_zero_per_page_is_rejected() {
        let client = client();
        let err = client
            .request(Method::GET, "/projects")
            .page(Some(Page::new(1, 0)))
            .build()
            .unwrap_err();
        assert!(matches!(err, GitlabError::InvalidParameter(_)));
    }

    #[test]
    fn test_token_with_newline_is_rejected() {
        let mut client = client();
        client.set_token("bad\ntoken");
        let err = client.request(Method::GET, "/user").build().unwrap_err();
        assert!(matches!(err, GitlabError::InvalidParameter(_)));
    }

    #[test]
    fn test_encoded_path_segments_survive() {
        let client = client();
        let spec = client
            .request(Method::GET, "/projects/group%2Fproject")
            .build()
            .unwrap();
        assert_eq!(spec.path(), "/api/v4/projects/group%2Fproject");
    }

    #[test]
    fn test_default_params_are_sent() {
        let mut client = client();
        client.set_default_param("statistics", true);
        let spec = client.request(Method::GET, "/projects").build().unwrap();
        assert_eq!(spec.query_param("statistics").as_deref(), Some("true"));
    }

    #[test]
    fn test_into_request_carries_headers_and_body() {
        let mut client = client();
        client.set_sudo("bob");
        let request = client
            .request(Method::POST, "/groups")
            .param("name", "g")
            .build()
            .unwrap()
            .into_request()
            .unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.headers().get_all("private-token").iter().count(), 1);
        assert_eq!(request.headers()["sudo"], "bob");
        assert_eq!(
            request.body().and_then(|b| b.as_bytes()),
            Some(&b"name=g"[..])
        );
    }
}
