//! Mock GitLab API server.
//!
//! Provides an axum-based HTTP server that answers a subset of the GitLab v4
//! REST API from in-memory state.

use std::io;
use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use super::fixtures::{DefaultScenario, Fixtures, DEFAULT_TOKEN};
use super::handlers::{self, SharedState};
use super::state::MockState;
use crate::config::API_V4;

/// A mock GitLab server for testing.
///
/// The server runs on a background task; point a client at [`url`](Self::url)
/// with [`API_V4`] as the API path.
pub struct MockServer {
    url: String,
    handle: JoinHandle<()>,
    state: SharedState,
}

impl MockServer {
    /// Start a server loaded with [`Fixtures::default_scenario`], accepting
    /// [`DEFAULT_TOKEN`] as `root`.
    pub async fn start() -> io::Result<Self> {
        Self::with_state(Self::default_state()).await
    }

    /// Start a server with no data and no token check.
    pub async fn start_empty() -> io::Result<Self> {
        Self::with_state(MockState::new()).await
    }

    /// Start a server with custom state.
    pub async fn with_state(mut state: MockState) -> io::Result<Self> {
        // Bind to a random available port
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let url = format!("http://{addr}");
        state.base_url = url.clone();

        let shared_state = state.shared();
        let app = router(shared_state.clone());

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(error = %err, "mock server stopped");
            }
        });

        Ok(Self {
            url,
            handle,
            state: shared_state,
        })
    }

    /// Base URL of the server, without the API path.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Shared state, for inspecting or changing data mid-test.
    pub fn state(&self) -> Arc<RwLock<MockState>> {
        self.state.clone()
    }

    /// Stop the server. Aborts the background task.
    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    fn default_state() -> MockState {
        state_from_scenario(Fixtures::default_scenario())
            .with_required_token(DEFAULT_TOKEN, 1)
    }
}

fn state_from_scenario(scenario: DefaultScenario) -> MockState {
    let mut state = MockState::new();
    for user in scenario.users {
        state.users.insert(user.id, user);
    }
    for project in scenario.projects {
        state.projects.insert(project.id, project);
    }
    for issue in scenario.issues {
        state.issues.insert(issue.id, issue);
    }
    state
}

/// Build the router: `/health` at the root, the API under `/api/v4`.
pub(crate) fn router(state: SharedState) -> Router {
    let api = Router::new()
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/:id",
            get(handlers::get_project).delete(handlers::delete_project),
        )
        .route(
            "/projects/:id/issues",
            get(handlers::list_project_issues).post(handlers::create_project_issue),
        )
        .route(
            "/projects/:id/issues/:iid",
            get(handlers::get_project_issue).put(handlers::update_project_issue),
        )
        .route("/issues", get(handlers::list_issues))
        .route("/users", get(handlers::list_users))
        .route("/users/:id", get(handlers::get_user))
        .route("/user", get(handlers::current_user))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            handlers::require_token,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest(API_V4, api)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}
