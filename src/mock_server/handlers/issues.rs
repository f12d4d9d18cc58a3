//! Issue endpoint handlers.

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;

use super::{decode_id, error_response, paginated, PageQuery, SharedState};

/// Query parameters for listing issues.
#[derive(Debug, Default, Deserialize)]
pub struct ListIssuesQuery {
    pub state: Option<String>,
}

/// Form body for opening an issue.
#[derive(Debug, Deserialize)]
pub struct CreateIssueForm {
    pub title: String,
    pub description: Option<String>,
    pub labels: Option<String>,
}

/// Form body for editing an issue.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateIssueForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub labels: Option<String>,
    pub state_event: Option<String>,
}

fn split_labels(labels: &str) -> Vec<String> {
    labels
        .split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// GET /issues
pub async fn list_issues(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    Query(page): Query<PageQuery>,
    Query(query): Query<ListIssuesQuery>,
) -> Response {
    let state = state.read().await;
    let issues: Vec<_> = state
        .list_issues(None, query.state.as_deref())
        .into_iter()
        .cloned()
        .collect();
    paginated(issues, page, &state.base_url, &uri)
}

/// GET /projects/{id}/issues
pub async fn list_project_issues(
    State(state): State<SharedState>,
    OriginalUri(uri): OriginalUri,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ListIssuesQuery>,
) -> Response {
    let state = state.read().await;
    let Some(project) = state.find_project(&decode_id(&id)) else {
        return error_response(StatusCode::NOT_FOUND, "404 Project Not Found");
    };
    let issues: Vec<_> = state
        .list_issues(Some(project.id), query.state.as_deref())
        .into_iter()
        .cloned()
        .collect();
    paginated(issues, page, &state.base_url, &uri)
}

/// GET /projects/{id}/issues/{iid}
pub async fn get_project_issue(
    State(state): State<SharedState>,
    Path((id, iid)): Path<(String, u64)>,
) -> Response {
    let mut state = state.write().await;
    let Some(project_id) = state.find_project(&decode_id(&id)).map(|p| p.id) else {
        return error_response(StatusCode::NOT_FOUND, "404 Project Not Found");
    };
    match state.find_issue_mut(project_id, iid) {
        Some(issue) => Json(issue.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "404 Issue Not Found"),
    }
}

/// POST /projects/{id}/issues
pub async fn create_project_issue(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Form(form): Form<CreateIssueForm>,
) -> Response {
    if form.title.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "400 (Bad request) \"title\" not given");
    }

    let mut state = state.write().await;
    let Some(project_id) = state.find_project(&decode_id(&id)).map(|p| p.id) else {
        return error_response(StatusCode::NOT_FOUND, "404 Project Not Found");
    };
    let labels = form.labels.as_deref().map(split_labels).unwrap_or_default();
    let issue = state.open_issue(project_id, form.title, form.description, labels);
    (StatusCode::CREATED, Json(issue)).into_response()
}

/// PUT /projects/{id}/issues/{iid}
pub async fn update_project_issue(
    State(state): State<SharedState>,
    Path((id, iid)): Path<(String, u64)>,
    Form(form): Form<UpdateIssueForm>,
) -> Response {
    let mut state = state.write().await;
    let Some(project_id) = state.find_project(&decode_id(&id)).map(|p| p.id) else {
        return error_response(StatusCode::NOT_FOUND, "404 Project Not Found");
    };
    let Some(issue) = state.find_issue_mut(project_id, iid) else {
        return error_response(StatusCode::NOT_FOUND, "404 Issue Not Found");
    };

    if let Some(title) = form.title {
        issue.title = title;
    }
    if let Some(description) = form.description {
        issue.description = Some(description);
    }
    if let Some(labels) = form.labels {
        issue.labels = split_labels(&labels);
    }
    match form.state_event.as_deref() {
        Some("close") => {
            issue.state = "closed".to_string();
            issue.closed_at = Some(chrono::Utc::now());
        }
        Some("reopen") => {
            issue.state = "opened".to_string();
            issue.closed_at = None;
        }
        Some(other) => {
            let message = format!("400 (Bad request) \"state_event\" does not have a valid value: {other}");
            return error_response(StatusCode::BAD_REQUEST, &message);
        }
        None => {}
    }
    issue.updated_at = Some(chrono::Utc::now());

    Json(issue.clone()).into_response()
}
