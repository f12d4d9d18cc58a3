//! In-memory GitLab server for end-to-end tests.
//!
//! Unlike wiremock, which matches individual requests, this server keeps
//! state across requests: projects created through the API can be listed,
//! issues can be closed and reopened, and list endpoints paginate with real
//! `Link` headers.
//!
//! # Example
//!
//! ```ignore
//! use glapi::mock_server::{MockServer, DEFAULT_TOKEN};
//! use glapi::{GitlabClient, Get, Project, ProjectRef};
//!
//! #[tokio::test]
//! async fn test_workflow() {
//!     let server = MockServer::start().await.unwrap();
//!     let client = GitlabClient::open_v4(server.url())
//!         .unwrap()
//!         .with_token(DEFAULT_TOKEN);
//!
//!     let project = Project::get(&client, ProjectRef::path("platform/api")).await.unwrap();
//!     assert_eq!(project.id, 10);
//!
//!     server.shutdown().await;
//! }
//! ```

mod fixtures;
mod handlers;
mod server;
mod state;

pub use fixtures::{DefaultScenario, Fixtures, DEFAULT_TOKEN};
pub use server::MockServer;
pub use state::MockState;
