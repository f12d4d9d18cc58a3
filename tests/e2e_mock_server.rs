//! E2E tests against the in-memory GitLab server.
//!
//! These exercise whole workflows (create, list, walk pages, close) rather
//! than single requests.

#![cfg(feature = "test-server")]

use glapi::mock_server::{Fixtures, MockServer, MockState, DEFAULT_TOKEN};
use glapi::{
    close_issue, collect_all, create_issue, create_project, current_user, remove_project,
    reopen_issue, CreateIssueParams, CreateProjectParams, Get, GitlabClient, Issue, IssueId,
    IssueListQuery, List, Page, Project, ProjectListQuery, ProjectRef, User, Visibility,
};

fn client_for(server: &MockServer) -> GitlabClient {
    GitlabClient::open_v4(server.url())
        .unwrap()
        .with_token(DEFAULT_TOKEN)
}

// =============================================================================
// Server Lifecycle
// =============================================================================

#[tokio::test]
async fn test_servers_get_distinct_ports() {
    let first = MockServer::start().await.unwrap();
    let second = MockServer::start().await.unwrap();

    assert_ne!(first.url(), second.url());

    first.shutdown().await;
    second.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_serving() {
    let server = MockServer::start().await.unwrap();
    let url = server.url().to_string();
    server.shutdown().await;

    let result = reqwest::get(format!("{url}/health")).await;
    assert!(result.is_err());
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_wrong_token_is_unauthorized() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server).with_token("wrong");

    let err = Project::get(&client, ProjectRef::Id(10)).await.unwrap_err();
    assert_eq!(err.status_code(), Some(401));

    server.shutdown().await;
}

#[tokio::test]
async fn test_sudo_switches_current_user() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);

    let me = current_user(&client).await.unwrap();
    assert_eq!(me.username, "root");

    let as_bob = client.clone().with_sudo("bob");
    let bob = current_user(&as_bob).await.unwrap();
    assert_eq!(bob.id, 3);

    let as_ghost = client.clone().with_sudo("ghost");
    let err = current_user(&as_ghost).await.unwrap_err();
    assert!(err.is_not_found());

    server.shutdown().await;
}

#[tokio::test]
async fn test_sudo_needs_admin() {
    let state = MockState::new()
        .with_user(Fixtures::user(2, "alice", false))
        .with_user(Fixtures::user(3, "bob", false))
        .with_required_token("alice-token", 2);
    let server = MockServer::with_state(state).await.unwrap();
    let client = GitlabClient::open_v4(server.url())
        .unwrap()
        .with_token("alice-token")
        .with_sudo("bob");

    let err = current_user(&client).await.unwrap_err();
    assert_eq!(err.status_code(), Some(403));

    // A child starts without the parent's sudo.
    let child = client.child().with_token("alice-token");
    assert_eq!(current_user(&child).await.unwrap().username, "alice");

    server.shutdown().await;
}

// =============================================================================
// Projects
// =============================================================================

#[tokio::test]
async fn test_get_project_by_id_and_path() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);

    let by_id = Project::get(&client, ProjectRef::Id(11)).await.unwrap();
    let by_path = Project::get(&client, ProjectRef::path("platform/web")).await.unwrap();
    assert_eq!(by_id.id, by_path.id);
    assert_eq!(by_path.path_with_namespace, "platform/web");

    let err = Project::get(&client, ProjectRef::path("platform/nope")).await.unwrap_err();
    assert!(err.is_not_found());

    server.shutdown().await;
}

#[tokio::test]
async fn test_walk_projects_two_per_page() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);
    let query = ProjectListQuery::default();

    let first = Project::list_page(&client, &query, Some(Page::new(1, 2))).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.pagination.next, Some(Page::new(2, 2)));
    assert_eq!(first.pagination.last, Some(Page::new(3, 2)));
    assert_eq!(first.pagination.prev, None);

    let mut calls = 0;
    let all = collect_all(|page| {
        calls += 1;
        Project::list_page(&client, &query, page.or(Some(Page::new(1, 2))))
    })
    .await
    .unwrap();
    assert_eq!(calls, 3);
    let ids: Vec<_> = all.iter().map(|p| p.id).collect();
    assert_eq!(ids, [10, 11, 12, 13, 14]);

    // The default page size covers everything in one request.
    assert_eq!(Project::list_all(&client, &query).await.unwrap().len(), 5);

    server.shutdown().await;
}

#[tokio::test]
async fn test_search_keeps_filter_across_pages() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);
    let query = ProjectListQuery {
        search: Some("platform".to_string()),
        ..Default::default()
    };

    let all = collect_all(|page| {
        Project::list_page(&client, &query, page.or(Some(Page::new(1, 1))))
    })
    .await
    .unwrap();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|p| p.path_with_namespace.starts_with("platform/")));

    server.shutdown().await;
}

#[tokio::test]
async fn test_create_and_remove_project() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);

    let params = CreateProjectParams {
        description: Some("Scratch space".to_string()),
        visibility: Some(Visibility::Internal),
        ..CreateProjectParams::named("Sandbox")
    };
    let created = create_project(&client, &params).await.unwrap();
    assert_eq!(created.path_with_namespace, "root/sandbox");
    assert_eq!(created.visibility, Some(Visibility::Internal));

    let err = create_project(&client, &params).await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));

    let fetched = Project::get(&client, ProjectRef::path("root/sandbox")).await.unwrap();
    assert_eq!(fetched.id, created.id);

    remove_project(&client, &created.project_ref()).await.unwrap();
    let err = Project::get(&client, ProjectRef::Id(created.id)).await.unwrap_err();
    assert!(err.is_not_found());

    server.shutdown().await;
}

// =============================================================================
// Issues
// =============================================================================

#[tokio::test]
async fn test_issue_lifecycle() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);

    let issue = create_issue(
        &client,
        &ProjectRef::path("tools/linter"),
        &CreateIssueParams {
            title: "Crash on empty file".to_string(),
            labels: Some(vec!["bug".to_string(), "p1".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(issue.iid, 2);
    assert_eq!(issue.labels, ["bug", "p1"]);
    assert!(issue.is_open());

    let closed = close_issue(&client, issue.issue_id()).await.unwrap();
    assert_eq!(closed.state, "closed");
    assert!(closed.closed_at.is_some());

    let query = IssueListQuery {
        state: Some("closed".to_string()),
        ..IssueListQuery::for_project(13u64)
    };
    let closed_issues = Issue::list_all(&client, &query).await.unwrap();
    assert_eq!(closed_issues.len(), 1);

    let reopened = reopen_issue(&client, IssueId::new(13u64, issue.iid)).await.unwrap();
    assert!(reopened.is_open());

    let fetched = Issue::get(&client, IssueId::new("tools/linter", issue.iid)).await.unwrap();
    assert_eq!(fetched.title, "Crash on empty file");

    server.shutdown().await;
}

#[tokio::test]
async fn test_list_all_issues_across_projects() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);

    let issues = Issue::list_all(&client, &IssueListQuery::default()).await.unwrap();
    assert_eq!(issues.len(), 3);

    let api_issues = Issue::list_all(&client, &IssueListQuery::for_project("platform/api"))
        .await
        .unwrap();
    assert_eq!(api_issues.len(), 2);

    server.shutdown().await;
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_users() {
    let server = MockServer::start().await.unwrap();
    let client = client_for(&server);

    let alice = User::get(&client, 2).await.unwrap();
    assert_eq!(alice.username, "alice");

    let everyone = User::list_all(&client, &Default::default()).await.unwrap();
    assert_eq!(everyone.len(), 3);

    let err = User::get(&client, 99).await.unwrap_err();
    assert!(err.is_not_found());

    server.shutdown().await;
}
