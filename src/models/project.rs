//! Project model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::models::common::{
    encode_segment, project_url, AccessLevel, AddMemberParams, Member, ProjectRef, UserBasic,
    Visibility,
};
use crate::pagination::{collect_all, Page, Paged};
use crate::params::Params;
use crate::template::expand_url;
use crate::traits::{Get, List};

const PROJECTS: &str = "/projects";
const PROJECT: &str = "/projects/:id";
const PROJECT_EVENTS: &str = "/projects/:id/events";
const USER_PROJECT_CREATE: &str = "/projects/user/:user_id";
const USER_PROJECTS: &str = "/users/:user_id/projects";
const PROJECT_MEMBERS: &str = "/projects/:id/members";
const PROJECT_MEMBER: &str = "/projects/:id/members/:user_id";
const PROJECT_HOOKS: &str = "/projects/:id/hooks";
const PROJECT_HOOK: &str = "/projects/:id/hooks/:hook_id";

/// A GitLab project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub name_with_namespace: Option<String>,
    pub path: String,
    pub path_with_namespace: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub ssh_url_to_repo: Option<String>,
    #[serde(default)]
    pub http_url_to_repo: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub owner: Option<UserBasic>,
    #[serde(default)]
    pub namespace: Option<Namespace>,
    #[serde(default)]
    pub issues_enabled: Option<bool>,
    #[serde(default)]
    pub merge_requests_enabled: Option<bool>,
    #[serde(default)]
    pub wiki_enabled: Option<bool>,
    #[serde(default)]
    pub snippets_enabled: Option<bool>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub star_count: u32,
    #[serde(default)]
    pub forks_count: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_activity_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub permissions: Option<Permissions>,
}

/// The namespace (user or group) a project lives in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub id: u64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub full_path: Option<String>,
}

/// The caller's access to a project, directly and through its group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(default)]
    pub project_access: Option<Permission>,
    #[serde(default)]
    pub group_access: Option<Permission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub access_level: AccessLevel,
    #[serde(default)]
    pub notification_level: Option<u32>,
}

impl Project {
    /// Reference usable with the other project operations.
    pub fn project_ref(&self) -> ProjectRef {
        ProjectRef::Id(self.id)
    }

    /// Whether the project is visible without authentication.
    pub fn is_public(&self) -> bool {
        self.visibility == Some(Visibility::Public)
    }

    /// Events of this project, every page.
    pub async fn events(&self, client: &GitlabClient) -> Result<Vec<Event>> {
        get_project_events(client, &self.project_ref()).await
    }

    /// Members of this project, every page.
    pub async fn members(&self, client: &GitlabClient) -> Result<Vec<Member>> {
        get_project_members(client, &self.project_ref()).await
    }
}

/// Query parameters for listing projects.
///
/// With every field unset the listing covers all projects visible to the
/// caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectListQuery {
    /// Only projects owned by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,

    /// Only projects the caller is a member of.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership: Option<bool>,

    /// Only projects starred by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starred: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    /// Match against the project name and path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// `id`, `name`, `path`, `created_at`, `updated_at` or `last_activity_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    /// Return only limited fields for each project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple: Option<bool>,
}

/// Parameters for creating a project.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateProjectParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wiki_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snippets_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_url: Option<String>,
}

impl CreateProjectParams {
    /// Parameters naming only the project.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// An entry of a project's activity feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub action_name: Option<String>,
    #[serde(default)]
    pub target_id: Option<u64>,
    #[serde(default)]
    pub target_iid: Option<u64>,
    #[serde(default)]
    pub target_type: Option<String>,
    #[serde(default)]
    pub target_title: Option<String>,
    #[serde(default)]
    pub author_id: Option<u64>,
    #[serde(default)]
    pub author: Option<UserBasic>,
    #[serde(default)]
    pub push_data: Option<PushData>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Details of a push event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushData {
    #[serde(default)]
    pub commit_count: u32,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub ref_type: Option<String>,
    #[serde(default)]
    pub commit_from: Option<String>,
    #[serde(default)]
    pub commit_to: Option<String>,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub commit_title: Option<String>,
}

/// A project webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectHook {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub push_events: bool,
    #[serde(default)]
    pub issues_events: bool,
    #[serde(default)]
    pub merge_requests_events: bool,
    #[serde(default)]
    pub tag_push_events: bool,
    #[serde(default)]
    pub note_events: bool,
    #[serde(default)]
    pub enable_ssl_verification: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters for adding a project webhook.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddHookParams {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_requests_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_push_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note_events: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_ssl_verification: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[async_trait]
impl Get for Project {
    type Id = ProjectRef;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: ProjectRef) -> Result<Self> {
        let path = project_url(PROJECT, &id, &[])?;
        client.get(&path, &Params::new()).await
    }
}

#[async_trait]
impl List for Project {
    type Query = ProjectListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        query: &Self::Query,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let params = Params::from_serialize(query)?;
        client.get_page(PROJECTS, &params, page).await
    }
}

/// One page of the projects owned by a user.
#[tracing::instrument(skip(client))]
pub async fn get_user_projects_page(
    client: &GitlabClient,
    user: &str,
    page: Option<Page>,
) -> Result<Paged<Project>> {
    let user = encode_segment(user);
    let path = expand_url(USER_PROJECTS, &[(":user_id", &user)]);
    client.get_page(&path, &Params::new(), page).await
}

/// Every project owned by a user (numeric id or username).
pub async fn get_user_projects(client: &GitlabClient, user: &str) -> Result<Vec<Project>> {
    collect_all(|page| get_user_projects_page(client, user, page)).await
}

/// One page of a project's events.
#[tracing::instrument(skip(client))]
pub async fn get_project_events_page(
    client: &GitlabClient,
    project: &ProjectRef,
    page: Option<Page>,
) -> Result<Paged<Event>> {
    let path = project_url(PROJECT_EVENTS, project, &[])?;
    client.get_page(&path, &Params::new(), page).await
}

/// Every event of a project.
pub async fn get_project_events(client: &GitlabClient, project: &ProjectRef) -> Result<Vec<Event>> {
    let path = project_url(PROJECT_EVENTS, project, &[])?;
    client.get_all(&path, &Params::new()).await
}

/// Create a project owned by the caller.
#[tracing::instrument(skip(client))]
pub async fn create_project(client: &GitlabClient, params: &CreateProjectParams) -> Result<Project> {
    client.post(PROJECTS, &Params::from_serialize(params)?).await
}

/// Create a project owned by another user (administrators only).
#[tracing::instrument(skip(client))]
pub async fn create_project_for_user(
    client: &GitlabClient,
    user_id: u64,
    params: &CreateProjectParams,
) -> Result<Project> {
    let path = expand_url(USER_PROJECT_CREATE, &[(":user_id", &user_id)]);
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Remove a project.
#[tracing::instrument(skip(client))]
pub async fn remove_project(client: &GitlabClient, project: &ProjectRef) -> Result<()> {
    let path = project_url(PROJECT, project, &[])?;
    client.delete_discard(&path, &Params::new()).await
}

/// Every member of a project.
pub async fn get_project_members(client: &GitlabClient, project: &ProjectRef) -> Result<Vec<Member>> {
    let path = project_url(PROJECT_MEMBERS, project, &[])?;
    client.get_all(&path, &Params::new()).await
}

/// One member of a project.
#[tracing::instrument(skip(client))]
pub async fn get_project_member(
    client: &GitlabClient,
    project: &ProjectRef,
    user_id: u64,
) -> Result<Member> {
    let path = project_url(PROJECT_MEMBER, project, &[(":user_id", &user_id)])?;
    client.get(&path, &Params::new()).await
}

/// Give a user access to a project.
#[tracing::instrument(skip(client))]
pub async fn add_project_member(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &AddMemberParams,
) -> Result<Member> {
    let path = project_url(PROJECT_MEMBERS, project, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Change a member's access level.
#[tracing::instrument(skip(client))]
pub async fn edit_project_member(
    client: &GitlabClient,
    project: &ProjectRef,
    user_id: u64,
    access_level: AccessLevel,
) -> Result<Member> {
    let path = project_url(PROJECT_MEMBER, project, &[(":user_id", &user_id)])?;
    let params = Params::new().with("access_level", access_level);
    client.put(&path, &params).await
}

/// Revoke a user's access to a project.
#[tracing::instrument(skip(client))]
pub async fn remove_project_member(
    client: &GitlabClient,
    project: &ProjectRef,
    user_id: u64,
) -> Result<()> {
    let path = project_url(PROJECT_MEMBER, project, &[(":user_id", &user_id)])?;
    client.delete_discard(&path, &Params::new()).await
}

/// Every webhook of a project.
pub async fn get_project_hooks(client: &GitlabClient, project: &ProjectRef) -> Result<Vec<ProjectHook>> {
    let path = project_url(PROJECT_HOOKS, project, &[])?;
    client.get_all(&path, &Params::new()).await
}

/// Add a webhook to a project.
#[tracing::instrument(skip(client, params), fields(url = %params.url))]
pub async fn add_project_hook(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &AddHookParams,
) -> Result<ProjectHook> {
    let path = project_url(PROJECT_HOOKS, project, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Remove a webhook from a project.
#[tracing::instrument(skip(client))]
pub async fn remove_project_hook(
    client: &GitlabClient,
    project: &ProjectRef,
    hook_id: u64,
) -> Result<()> {
    let path = project_url(PROJECT_HOOK, project, &[(":hook_id", &hook_id)])?;
    client.delete_discard(&path, &Params::new()).await
}
