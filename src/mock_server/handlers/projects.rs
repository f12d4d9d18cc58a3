//! Project endpoint handlers.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use super::{decode_id, error_response, paginated, PageQuery, SharedState};
use crate::mock_server::Fixtures;
use crate::Visibility;

/// Query parameters for listing projects.
#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsQuery {
    pub search: Option<String>,
}

/// Form body for creating a project.
#[derive(Debug, Deserialize)]
pub struct CreateProjectForm {
    pub name: String,
    pub path: Option<String>,
    pub description: Option<String>,
    pub visibility: Option<Visibility>,
}

/// GET /projects
pub async fn list_projects(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageQuery>,
    Query(query): Query<ListProjectsQuery>,
) -> Response {
    let state = state.read().await;
    let projects: Vec<_> = state
        .list_projects(query.search.as_deref())
        .into_iter()
        .cloned()
        .collect();
    paginated(projects, page, &state.base_url, &uri)
}

/// GET /projects/{id}
pub async fn get_project(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let state = state.read().await;
    match state.find_project(&decode_id(&id)) {
        Some(project) => Json(project.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "404 Project Not Found"),
    }
}

/// POST /projects
pub async fn create_project(
    State(state): State<SharedState>,
    Form(form): Form<CreateProjectForm>,
) -> Response {
    let mut state = state.write().await;

    let namespace = state
        .token_owner
        .and_then(|id| state.users.get(&id))
        .map_or_else(|| "root".to_string(), |u| u.username.clone());
    let path = form
        .path
        .unwrap_or_else(|| form.name.to_lowercase().replace(' ', "-"));

    let taken = state
        .projects
        .values()
        .any(|p| p.path_with_namespace == format!("{namespace}/{path}"));
    if taken {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "message": { "path": ["has already been taken"] }
            })),
        )
            .into_response();
    }

    let mut project = Fixtures::project(state.next_id(), &namespace, &path);
    project.name = form.name;
    project.description = form.description;
    project.visibility = form.visibility.or(project.visibility);
    project.created_at = Some(chrono::Utc::now());

    state.projects.insert(project.id, project.clone());
    (StatusCode::CREATED, Json(project)).into_response()
}

/// DELETE /projects/{id}
pub async fn delete_project(State(state): State<SharedState>, Path(id): Path<String>) -> Response {
    let mut state = state.write().await;
    let Some(project_id) = state.find_project(&decode_id(&id)).map(|p| p.id) else {
        return error_response(StatusCode::NOT_FOUND, "404 Project Not Found");
    };
    state.projects.remove(&project_id);
    state.issues.retain(|_, issue| issue.project_id != project_id);
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "message": "202 Accepted" })),
    )
        .into_response()
}
