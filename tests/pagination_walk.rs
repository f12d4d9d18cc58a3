//! Walking paginated collections over `Link` headers.

use glapi::{
    collect_all, fetch_all, GitlabClient, List, Page, Params, User, UserListQuery,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitlabClient {
    GitlabClient::open_v4(&server.uri())
        .unwrap()
        .with_token("secret")
}

fn link(server: &MockServer, rels: &[(&str, u32)]) -> String {
    rels.iter()
        .map(|(rel, page)| {
            format!(
                r#"<{}/api/v4/users?page={page}&per_page=2>; rel="{rel}""#,
                server.uri()
            )
        })
        .collect::<Vec<_>>()
        .join(", ")
}

async fn mount_user_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link(server, &[("next", 2), ("first", 1), ("last", 3)]).as_str())
                .set_body_json(json!([
                    {"id": 1, "username": "root"},
                    {"id": 2, "username": "alice"}
                ])),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Link",
                    link(server, &[("prev", 1), ("next", 3), ("first", 1), ("last", 3)]).as_str(),
                )
                .set_body_json(json!([
                    {"id": 3, "username": "bob"},
                    {"id": 4, "username": "carol"}
                ])),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link(server, &[("prev", 2), ("first", 1), ("last", 3)]).as_str())
                .set_body_json(json!([{"id": 5, "username": "dave"}])),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_all_follows_next_links() {
    let server = MockServer::start().await;
    mount_user_pages(&server).await;

    let client = client_for(&server);
    let users = User::list_all(&client, &UserListQuery::default()).await.unwrap();

    let names: Vec<_> = users.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["root", "alice", "bob", "carol", "dave"]);
}

#[tokio::test]
async fn test_single_page_reports_links() {
    let server = MockServer::start().await;
    mount_user_pages(&server).await;

    let client = client_for(&server);
    let page = User::list_page(&client, &UserListQuery::default(), Some(Page::new(2, 2)))
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.pagination.prev, Some(Page::new(1, 2)));
    assert_eq!(page.pagination.next, Some(Page::new(3, 2)));
    assert_eq!(page.pagination.last, Some(Page::new(3, 2)));
}

#[tokio::test]
async fn test_walk_stops_without_link_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let projects: Vec<Value> = client.get_all("/projects", &Params::new()).await.unwrap();
    assert_eq!(projects.len(), 1);
}

#[tokio::test]
async fn test_walk_error_keeps_earlier_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Link", link(&server, &[("next", 2)]).as_str())
                .set_body_json(json!([{"id": 1, "username": "root"}])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let query = UserListQuery::default();
    let mut users: Vec<User> = Vec::new();
    let err = fetch_all(
        |page| User::list_page(&client, &query, page),
        &mut users,
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), Some(500));
    assert_eq!(users.len(), 1);

    let again = collect_all(|page| User::list_page(&client, &query, page)).await;
    assert!(again.is_err());
}
