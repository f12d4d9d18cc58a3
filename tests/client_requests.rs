//! Request construction as seen by a live HTTP server.

use glapi::{GitlabClient, Method, Page, Params, ProjectRef};
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GitlabClient {
    GitlabClient::open_v4(&server.uri())
        .unwrap()
        .with_token("secret")
}

#[tokio::test]
async fn test_get_sends_token_and_default_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/42"))
        .and(header("PRIVATE-TOKEN", "secret"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let project: Value = client
        .get("/projects/42", &Params::new())
        .await
        .expect("request should succeed");
    assert_eq!(project["id"], 42);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].headers.get_all("private-token").iter().count(), 1);
    assert!(requests[0].headers.get("sudo").is_none());
}

#[tokio::test]
async fn test_sudo_header_sent_when_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .and(header("SUDO", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2, "username": "alice"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).with_sudo("alice");
    let user = glapi::current_user(&client).await.unwrap();
    assert_eq!(user.username, "alice");
}

#[tokio::test]
async fn test_post_sends_form_body_without_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v4/projects/7/issues"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("title=Broken+build&labels=ci%2Cbug"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 500, "iid": 3, "project_id": 7, "title": "Broken build", "state": "opened"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let issue = glapi::create_issue(
        &client,
        &ProjectRef::Id(7),
        &glapi::CreateIssueParams {
            title: "Broken build".to_string(),
            labels: Some(vec!["ci".to_string(), "bug".to_string()]),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(issue.iid, 3);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_delete_sends_params_in_query() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v4/projects/7/labels"))
        .and(query_param("name", "wontfix"))
        .and(body_string(""))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = Params::new().with("name", "wontfix");
    client
        .delete_discard("/projects/7/labels", &params)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("name=wontfix"));
}

#[tokio::test]
async fn test_explicit_page_on_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/users"))
        .and(query_param("page", "3"))
        .and(query_param("per_page", "5"))
        .and(query_param("search", "ali"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .get_page::<Value>("/users", &Params::new().with("search", "ali"), Some(Page::new(3, 5)))
        .await
        .unwrap();
    assert!(page.is_empty());
    assert!(!page.has_more());
}

#[tokio::test]
async fn test_default_params_merge_into_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/issues"))
        .and(query_param("scope", "all"))
        .and(query_param("state", "opened"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = client_for(&server);
    client.set_default_param("scope", "created_by_me");
    client.set_default_param("state", "opened");

    client
        .request(Method::GET, "/issues")
        .param("scope", "all")
        .bytes()
        .await
        .unwrap();
}

#[tokio::test]
async fn test_child_does_not_inherit_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/user"))
        .and(header("PRIVATE-TOKEN", "other"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 3, "username": "bob"})))
        .expect(1)
        .mount(&server)
        .await;

    let parent = client_for(&server).with_sudo("alice");
    let child = parent.child().with_token("other");

    let user = glapi::current_user(&child).await.unwrap();
    assert_eq!(user.username, "bob");
    assert_eq!(parent.token(), "secret");
    assert_eq!(parent.sudo(), Some("alice"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("sudo").is_none());
}

#[tokio::test]
async fn test_raw_reads_carry_default_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/group%2Fapp/repository/files/src%2Fmain.rs/raw"))
        .and(query_param("ref", "main"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fn main() {}\n"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v4/projects/1/repository/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x1f, 0x8b]))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let bytes = glapi::get_raw_file(&client, &ProjectRef::path("group/app"), "src/main.rs", "main")
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"fn main() {}\n");

    let archive = client
        .get_raw("/projects/1/repository/archive", &Params::new())
        .await
        .unwrap();
    assert_eq!(&archive[..], [0x1f, 0x8b]);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("ref=main&page=1&per_page=100"));
    assert_eq!(requests[1].url.query(), Some("page=1&per_page=100"));
}
