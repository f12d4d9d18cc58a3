//! System hooks (administrators only).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::template::expand_url;

const SYSTEM_HOOKS: &str = "/hooks";
const SYSTEM_HOOK: &str = "/hooks/:id";

/// An instance-wide webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHook {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// The sample event a hook test sends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemHookResult {
    #[serde(default)]
    pub event_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub owner_name: Option<String>,
    #[serde(default)]
    pub owner_email: Option<String>,
    #[serde(default)]
    pub project_id: Option<u64>,
}

/// One page of system hooks.
#[tracing::instrument(skip(client))]
pub async fn get_system_hooks_page(
    client: &GitlabClient,
    page: Option<Page>,
) -> Result<Paged<SystemHook>> {
    client.get_page(SYSTEM_HOOKS, &Params::new(), page).await
}

/// Every system hook.
pub async fn get_system_hooks(client: &GitlabClient) -> Result<Vec<SystemHook>> {
    client.get_all(SYSTEM_HOOKS, &Params::new()).await
}

/// Register a system hook.
#[tracing::instrument(skip(client))]
pub async fn add_system_hook(client: &GitlabClient, url: &str) -> Result<SystemHook> {
    client
        .post(SYSTEM_HOOKS, &Params::new().with("url", url))
        .await
}

/// Fire a test event at a hook.
#[tracing::instrument(skip(client))]
pub async fn test_system_hook(client: &GitlabClient, hook_id: u64) -> Result<SystemHookResult> {
    let path = expand_url(SYSTEM_HOOK, &[(":id", &hook_id)]);
    client.post(&path, &Params::new()).await
}

/// Remove a system hook.
#[tracing::instrument(skip(client))]
pub async fn delete_system_hook(client: &GitlabClient, hook_id: u64) -> Result<()> {
    let path = expand_url(SYSTEM_HOOK, &[(":id", &hook_id)]);
    client.delete_discard(&path, &Params::new()).await
}
