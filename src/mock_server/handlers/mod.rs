//! HTTP request handlers for the mock server.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use url::form_urlencoded;

use crate::mock_server::state::MockState;

pub mod issues;
pub mod projects;
pub mod users;

pub use issues::*;
pub use projects::*;
pub use users::*;

pub type SharedState = Arc<RwLock<MockState>>;

const DEFAULT_PER_PAGE: u32 = 20;

/// `page`/`per_page` as sent by clients.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// GitLab-style error body: `{"message": "404 Project Not Found"}`.
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "message": message }))).into_response()
}

/// Reject API requests that lack the configured `PRIVATE-TOKEN`.
pub async fn require_token(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let required = state.read().await.required_token.clone();
    if let Some(required) = required {
        let sent = request
            .headers()
            .get("private-token")
            .and_then(|v| v.to_str().ok());
        if sent != Some(required.as_str()) {
            return error_response(StatusCode::UNAUTHORIZED, "401 Unauthorized");
        }
    }
    next.run(request).await
}

/// Serve one page of `items` with GitLab's pagination headers.
///
/// `Link` carries `first`, `last` and, where they exist, `prev` and `next`.
/// Every target keeps the request's other query parameters.
pub fn paginated<T: Serialize>(
    items: Vec<T>,
    query: PageQuery,
    base_url: &str,
    uri: &Uri,
) -> Response {
    let per_page = query.per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE);
    let page = query.page.filter(|n| *n > 0).unwrap_or(1);
    let total = items.len();
    let total_pages = u32::try_from(total.div_ceil(per_page as usize))
        .unwrap_or(u32::MAX)
        .max(1);

    let start = (page as usize - 1).saturating_mul(per_page as usize);
    let page_items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page as usize)
        .collect();

    let mut links = vec![
        format!(r#"<{}>; rel="first""#, page_link(base_url, uri, 1, per_page)),
        format!(r#"<{}>; rel="last""#, page_link(base_url, uri, total_pages, per_page)),
    ];
    if page > 1 {
        let target = page_link(base_url, uri, page - 1, per_page);
        links.push(format!(r#"<{target}>; rel="prev""#));
    }
    if page < total_pages {
        let target = page_link(base_url, uri, page + 1, per_page);
        links.push(format!(r#"<{target}>; rel="next""#));
    }

    let mut response = Json(page_items).into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&links.join(", ")) {
        headers.insert(header::LINK, value);
    }
    headers.insert("x-total", HeaderValue::from(total));
    headers.insert("x-total-pages", HeaderValue::from(total_pages));
    headers.insert("x-page", HeaderValue::from(page));
    headers.insert("x-per-page", HeaderValue::from(per_page));
    response
}

fn page_link(base_url: &str, uri: &Uri, page: u32, per_page: u32) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(existing) = uri.query() {
        query.extend_pairs(
            form_urlencoded::parse(existing.as_bytes())
                .filter(|(k, _)| k != "page" && k != "per_page"),
        );
    }
    query.append_pair("page", &page.to_string());
    query.append_pair("per_page", &per_page.to_string());
    format!("{base_url}{}?{}", uri.path(), query.finish())
}

/// Decode a `:id` path segment that may be a URL-encoded project path.
pub fn decode_id(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
