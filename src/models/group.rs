//! Group model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::{GitlabError, Result};
use crate::models::common::{AddMemberParams, Member, ProjectRef, Visibility};
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::template::expand_url;
use crate::traits::{Get, List};

const GROUPS: &str = "/groups";
const GROUP: &str = "/groups/:id";
const GROUP_PROJECT: &str = "/groups/:id/projects/:project_id";
const GROUP_MEMBERS: &str = "/groups/:id/members";
const GROUP_MEMBER: &str = "/groups/:id/members/:user_id";

/// A GitLab group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub full_path: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing groups.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroupListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Only groups owned by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owned: Option<bool>,

    /// Every group, for administrators.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_available: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Parameters for creating a group.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateGroupParams {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

/// A group, by numeric id or full path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupRef {
    Id(u64),
    Path(String),
}

impl GroupRef {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Path(path) if path.trim().is_empty() => Err(GitlabError::InvalidParameter(
                "group needs an id or a path".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn url(&self, template: &str, rest: &[(&str, &dyn std::fmt::Display)]) -> Result<String> {
        self.validate()?;
        let mut substitutions: Vec<(&str, &dyn std::fmt::Display)> = vec![(":id", self)];
        substitutions.extend_from_slice(rest);
        Ok(expand_url(template, &substitutions))
    }
}

impl std::fmt::Display for GroupRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(&urlencoding::encode(path)),
        }
    }
}

impl From<u64> for GroupRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for GroupRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

#[async_trait]
impl Get for Group {
    type Id = GroupRef;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: GroupRef) -> Result<Self> {
        client.get(&id.url(GROUP, &[])?, &Params::new()).await
    }
}

#[async_trait]
impl List for Group {
    type Query = GroupListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        query: &Self::Query,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let params = Params::from_serialize(query)?;
        client.get_page(GROUPS, &params, page).await
    }
}

/// Create a group.
#[tracing::instrument(skip(client))]
pub async fn create_group(client: &GitlabClient, params: &CreateGroupParams) -> Result<Group> {
    client.post(GROUPS, &Params::from_serialize(params)?).await
}

/// Delete a group and everything in it.
#[tracing::instrument(skip(client))]
pub async fn delete_group(client: &GitlabClient, group: &GroupRef) -> Result<()> {
    let path = group.url(GROUP, &[])?;
    client.delete_discard(&path, &Params::new()).await
}

/// Move a project into a group (administrators only).
#[tracing::instrument(skip(client))]
pub async fn transfer_project_to_group(
    client: &GitlabClient,
    group: &GroupRef,
    project: &ProjectRef,
) -> Result<Group> {
    project.validate()?;
    let path = group.url(GROUP_PROJECT, &[(":project_id", project)])?;
    client.post(&path, &Params::new()).await
}

/// Every member of a group.
pub async fn get_group_members(client: &GitlabClient, group: &GroupRef) -> Result<Vec<Member>> {
    let path = group.url(GROUP_MEMBERS, &[])?;
    client.get_all(&path, &Params::new()).await
}

/// Give a user access to a group.
#[tracing::instrument(skip(client))]
pub async fn add_group_member(
    client: &GitlabClient,
    group: &GroupRef,
    params: &AddMemberParams,
) -> Result<Member> {
    let path = group.url(GROUP_MEMBERS, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Revoke a user's access to a group.
#[tracing::instrument(skip(client))]
pub async fn remove_group_member(client: &GitlabClient, group: &GroupRef, user_id: u64) -> Result<()> {
    let path = group.url(GROUP_MEMBER, &[(":user_id", &user_id)])?;
    client.delete_discard(&path, &Params::new()).await
}
