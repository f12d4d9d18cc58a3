//! User model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::template::expand_url;
use crate::traits::{Get, List, Update};

const USERS: &str = "/users";
const USER: &str = "/users/:id";
const CURRENT_USER: &str = "/user";
const CURRENT_USER_KEYS: &str = "/user/keys";
const CURRENT_USER_KEY: &str = "/user/keys/:id";
const USER_KEYS: &str = "/users/:uid/keys";
const USER_KEY: &str = "/users/:uid/keys/:id";

/// A GitLab user account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// `active` or `blocked`.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skype: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub extern_uid: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub theme_id: Option<u32>,
    #[serde(default)]
    pub color_scheme_id: Option<u32>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub can_create_group: bool,
    #[serde(default)]
    pub can_create_project: bool,
    #[serde(default)]
    pub projects_limit: Option<u32>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_blocked(&self) -> bool {
        self.state.as_deref() == Some("blocked")
    }
}

/// An SSH key registered for a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshKey {
    pub id: u64,
    pub title: String,
    pub key: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing users.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserListQuery {
    /// Match against name, username and email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// Exact username match.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
}

impl UserListQuery {
    /// Query matching `text` against name, username and email.
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            search: Some(text.into()),
            ..Default::default()
        }
    }
}

/// Parameters for creating a user (administrators only).
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateUserParams {
    pub email: String,
    pub username: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_password: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extern_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_create_group: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_confirmation: Option<bool>,
}

/// Parameters for editing a user. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skype: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_create_group: Option<bool>,
}

#[async_trait]
impl Get for User {
    type Id = u64;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: u64) -> Result<Self> {
        let path = expand_url(USER, &[(":id", &id)]);
        client.get(&path, &Params::new()).await
    }
}

#[async_trait]
impl List for User {
    type Query = UserListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        query: &Self::Query,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let params = Params::from_serialize(query)?;
        client.get_page(USERS, &params, page).await
    }
}

#[async_trait]
impl Update for User {
    type Id = u64;
    type Params = UserUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &GitlabClient, id: u64, params: Self::Params) -> Result<Self> {
        let path = expand_url(USER, &[(":id", &id)]);
        client.put(&path, &Params::from_serialize(&params)?).await
    }
}

/// The user owning the token, or the impersonated user when sudo is set.
#[tracing::instrument(skip(client))]
pub async fn current_user(client: &GitlabClient) -> Result<User> {
    client.get(CURRENT_USER, &Params::new()).await
}

/// Create a user account.
#[tracing::instrument(skip(client, params), fields(username = %params.username))]
pub async fn create_user(client: &GitlabClient, params: &CreateUserParams) -> Result<User> {
    client.post(USERS, &Params::from_serialize(params)?).await
}

/// Delete a user account.
#[tracing::instrument(skip(client))]
pub async fn delete_user(client: &GitlabClient, id: u64) -> Result<()> {
    let path = expand_url(USER, &[(":id", &id)]);
    client.delete_discard(&path, &Params::new()).await
}

/// SSH keys of the current user.
pub async fn current_user_keys(client: &GitlabClient) -> Result<Vec<SshKey>> {
    client.get_all(CURRENT_USER_KEYS, &Params::new()).await
}

/// One SSH key of the current user.
#[tracing::instrument(skip(client))]
pub async fn get_current_user_key(client: &GitlabClient, key_id: u64) -> Result<SshKey> {
    let path = expand_url(CURRENT_USER_KEY, &[(":id", &key_id)]);
    client.get(&path, &Params::new()).await
}

/// SSH keys of another user.
pub async fn user_keys(client: &GitlabClient, user_id: u64) -> Result<Vec<SshKey>> {
    let path = expand_url(USER_KEYS, &[(":uid", &user_id)]);
    client.get_all(&path, &Params::new()).await
}

/// Register an SSH key for the current user.
#[tracing::instrument(skip(client, key))]
pub async fn add_current_user_key(client: &GitlabClient, title: &str, key: &str) -> Result<SshKey> {
    let params = Params::new().with("title", title).with("key", key);
    client.post(CURRENT_USER_KEYS, &params).await
}

/// Register an SSH key for another user (administrators only).
#[tracing::instrument(skip(client, key))]
pub async fn add_user_key(
    client: &GitlabClient,
    user_id: u64,
    title: &str,
    key: &str,
) -> Result<SshKey> {
    let path = expand_url(USER_KEYS, &[(":uid", &user_id)]);
    let params = Params::new().with("title", title).with("key", key);
    client.post(&path, &params).await
}

/// Remove one of the current user's SSH keys.
#[tracing::instrument(skip(client))]
pub async fn delete_current_user_key(client: &GitlabClient, key_id: u64) -> Result<()> {
    let path = expand_url(CURRENT_USER_KEY, &[(":id", &key_id)]);
    client.delete_discard(&path, &Params::new()).await
}

/// Remove another user's SSH key (administrators only).
#[tracing::instrument(skip(client))]
pub async fn delete_user_key(client: &GitlabClient, user_id: u64, key_id: u64) -> Result<()> {
    let path = expand_url(USER_KEY, &[(":uid", &user_id), (":id", &key_id)]);
    client.delete_discard(&path, &Params::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialize() {
        let json = r#"{
            "id": 1,
            "username": "john_smith",
            "name": "John Smith",
            "state": "blocked",
            "email": "john@example.com",
            "is_admin": true,
            "created_at": "2012-05-23T08:00:58Z"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.username, "john_smith");
        assert!(user.is_admin);
        assert!(user.is_blocked());
    }

    #[test]
    fn test_user_key_template() {
        let path = expand_url(USER_KEY, &[(":uid", &5), (":id", &9)]);
        assert_eq!(path, "/users/5/keys/9");
    }

    #[test]
    fn test_update_params_only_set_fields() {
        let params = Params::from_serialize(&UserUpdateParams {
            name: Some("New Name".to_string()),
            admin: Some(false),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(params.encode(), "name=New+Name&admin=false");
    }
}
