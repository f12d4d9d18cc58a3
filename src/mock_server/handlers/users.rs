//! User endpoint handlers.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use super::{error_response, paginated, PageQuery, SharedState};

/// Query parameters for listing users.
#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub search: Option<String>,
    pub username: Option<String>,
}

/// GET /users
pub async fn list_users(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageQuery>,
    Query(query): Query<ListUsersQuery>,
) -> Response {
    let state = state.read().await;
    let users: Vec<_> = state
        .list_users(query.search.as_deref())
        .into_iter()
        .filter(|u| query.username.as_deref().map_or(true, |name| u.username == name))
        .cloned()
        .collect();
    paginated(users, page, &state.base_url, &uri)
}

/// GET /users/{id}
pub async fn get_user(State(state): State<SharedState>, Path(id): Path<u64>) -> Response {
    let state = state.read().await;
    match state.users.get(&id) {
        Some(user) => Json(user.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "404 User Not Found"),
    }
}

/// GET /user
///
/// Answers with the token owner, or with the user named by the `SUDO`
/// header when the token owner is an administrator.
pub async fn current_user(State(state): State<SharedState>, headers: HeaderMap) -> Response {
    let state = state.read().await;
    let Some(owner) = state.token_owner.and_then(|id| state.users.get(&id)) else {
        return error_response(StatusCode::UNAUTHORIZED, "401 Unauthorized");
    };

    let Some(sudo) = headers.get("sudo").and_then(|v| v.to_str().ok()) else {
        return Json(owner.clone()).into_response();
    };
    if !owner.is_admin {
        return error_response(StatusCode::FORBIDDEN, "403 Forbidden - Must be admin to use sudo");
    }
    match state.find_user(sudo) {
        Some(user) => Json(user.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "404 User Not Found"),
    }
}
