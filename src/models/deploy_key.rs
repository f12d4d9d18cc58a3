//! Project deploy keys.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::models::common::{project_url, ProjectRef};
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::traits::{Get, List};

const DEPLOY_KEYS: &str = "/projects/:id/deploy_keys";
const DEPLOY_KEY: &str = "/projects/:id/deploy_keys/:key_id";

/// An SSH key granting repository access to one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployKey {
    pub id: u64,
    pub title: String,
    pub key: String,
    /// Whether the key may push.
    #[serde(default)]
    pub can_push: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A deploy key, by project and key id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployKeyId {
    pub project: ProjectRef,
    pub key_id: u64,
}

impl DeployKeyId {
    pub fn new(project: impl Into<ProjectRef>, key_id: u64) -> Self {
        Self {
            project: project.into(),
            key_id,
        }
    }

    fn url(&self) -> Result<String> {
        project_url(DEPLOY_KEY, &self.project, &[(":key_id", &self.key_id)])
    }
}

#[async_trait]
impl Get for DeployKey {
    type Id = DeployKeyId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: DeployKeyId) -> Result<Self> {
        client.get(&id.url()?, &Params::new()).await
    }
}

#[async_trait]
impl List for DeployKey {
    type Query = ProjectRef;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        project: &ProjectRef,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let path = project_url(DEPLOY_KEYS, project, &[])?;
        client.get_page(&path, &Params::new(), page).await
    }
}

/// Register a deploy key on a project.
#[tracing::instrument(skip(client, key))]
pub async fn add_deploy_key(
    client: &GitlabClient,
    project: &ProjectRef,
    title: &str,
    key: &str,
    can_push: bool,
) -> Result<DeployKey> {
    let path = project_url(DEPLOY_KEYS, project, &[])?;
    let params = Params::new()
        .with("title", title)
        .with("key", key)
        .with("can_push", can_push);
    client.post(&path, &params).await
}

/// Remove a deploy key from a project.
#[tracing::instrument(skip(client))]
pub async fn remove_deploy_key(client: &GitlabClient, id: &DeployKeyId) -> Result<()> {
    client.delete_discard(&id.url()?, &Params::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_key_deserialize() {
        let json = r#"{
            "id": 1,
            "title": "Public key",
            "key": "ssh-rsa AAAAB3NzaC1yc2E...",
            "created_at": "2013-10-02T10:12:29Z"
        }"#;
        let key: DeployKey = serde_json::from_str(json).unwrap();
        assert_eq!(key.title, "Public key");
        assert!(!key.can_push);
        assert!(key.created_at.is_some());
    }

    #[test]
    fn test_deploy_key_url() {
        let id = DeployKeyId::new(5u64, 13);
        assert_eq!(id.url().unwrap(), "/projects/5/deploy_keys/13");
    }
}
