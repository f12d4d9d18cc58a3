//! GitLab API client library.
//!
//! A Rust library for the GitLab REST API. A [`GitlabClient`] handle holds
//! the server address and credentials, and entity types implement the
//! [`Get`], [`List`] and [`Update`] traits for the operations their
//! endpoints support.
//!
//! # Quick Start
//!
//! ```no_run
//! use glapi::{GitlabClient, Get, List, Project, ProjectListQuery, ProjectRef};
//!
//! #[tokio::main]
//! async fn main() -> glapi::Result<()> {
//!     // Create client from environment variables
//!     let client = GitlabClient::from_env()?;
//!
//!     // Get a project by path
//!     let project = Project::get(&client, ProjectRef::path("group/project")).await?;
//!     println!("Project: {}", project.name);
//!
//!     // List every project the caller can see
//!     let projects = Project::list_all(&client, &ProjectListQuery::default()).await?;
//!     println!("Found {} projects", projects.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Requests and pagination
//!
//! Every request carries the `PRIVATE-TOKEN` header, plus `SUDO` when the
//! handle impersonates another user. GET requests always carry `page` and
//! `per_page` (1 and 100 by default). Lists are walked with [`fetch_all`],
//! which follows the `rel="next"` entry of each response's `Link` header.
//!
//! Endpoints without a model can be reached directly:
//!
//! ```no_run
//! use glapi::{expand_url, GitlabClient, Params};
//!
//! # async fn example(client: &GitlabClient) -> glapi::Result<()> {
//! let path = expand_url("/projects/:id/pipelines", &[(":id", &42)]);
//! let pipelines: Vec<serde_json::Value> = client.get_all(&path, &Params::new()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! [`GitlabClient::from_env`] reads:
//!
//! - `GITLAB_URL` (required) - Server URL, e.g. `https://gitlab.example.com`
//! - `GITLAB_TOKEN` (required) - Private or personal access token
//! - `GITLAB_API_PATH` (optional) - API prefix (defaults to `/api/v4`)
//! - `GITLAB_SUDO` (optional) - User to impersonate
//! - `GITLAB_INSECURE` (optional) - Skip TLS certificate checks when truthy

mod client;
mod config;
mod decode;
mod error;
mod models;
mod pagination;
mod params;
mod request;
mod template;
mod traits;
mod transport;

#[cfg(feature = "test-server")]
pub mod mock_server;

// Re-export core types
pub use client::GitlabClient;
pub use reqwest::Method;
pub use config::{
    ClientConfig, API_V3, API_V4, ENV_API_PATH, ENV_INSECURE, ENV_SUDO, ENV_TOKEN, ENV_URL,
};
pub use decode::decode;
pub use error::{GitlabError, Result};
pub use pagination::{collect_all, fetch_all, Page, Paged, Pagination, DEFAULT_PER_PAGE};
pub use params::Params;
pub use request::{
    ParamPlacement, RequestBuilder, RequestSpec, PRIVATE_TOKEN_HEADER, SUDO_HEADER,
};
pub use template::expand_url;
pub use transport::{RawResponse, RequestLogger, RequestRecord, TracingLogger};

// Re-export traits
pub use traits::{Get, List, Update};

// Re-export models
pub use models::{
    // Shared types
    AccessLevel,
    AddMemberParams,
    Member,
    ProjectRef,
    StateEvent,
    UserBasic,
    Visibility,
    // Project types
    AddHookParams,
    CreateProjectParams,
    Event,
    Namespace,
    Permission,
    Permissions,
    Project,
    ProjectHook,
    ProjectListQuery,
    PushData,
    // User types
    CreateUserParams,
    SshKey,
    User,
    UserListQuery,
    UserUpdateParams,
    // Group types
    CreateGroupParams,
    Group,
    GroupListQuery,
    GroupRef,
    // Deploy key types
    DeployKey,
    DeployKeyId,
    // Label types
    CreateLabelParams,
    Label,
    LabelId,
    LabelUpdateParams,
    // Milestone types
    CreateMilestoneParams,
    Milestone,
    MilestoneId,
    MilestoneListQuery,
    MilestoneStateEvent,
    MilestoneUpdateParams,
    // Note types
    Note,
    NoteId,
    Noteable,
    // Issue types
    CreateIssueParams,
    Issue,
    IssueId,
    IssueListQuery,
    IssueUpdateParams,
    // Merge request types
    AcceptMergeRequestParams,
    CreateMergeRequestParams,
    MergeComment,
    MergeRequest,
    MergeRequestId,
    MergeRequestListQuery,
    MergeRequestUpdateParams,
    MergeState,
    // Repository types
    Branch,
    Commit,
    CommitListQuery,
    Comparison,
    Contributor,
    Diff,
    FileCommit,
    FileWriteParams,
    RepoFile,
    Tag,
    TreeEntry,
    TreeQuery,
    // Snippet types
    CreateSnippetParams,
    Snippet,
    SnippetId,
    SnippetUpdateParams,
    // System hook types
    SystemHook,
    SystemHookResult,
};

// Re-export convenience functions
pub use models::{
    add_project_hook, add_project_member, create_project, create_project_for_user,
    edit_project_member, get_project_events, get_project_events_page, get_project_hooks,
    get_project_member, get_project_members, get_user_projects, get_user_projects_page,
    remove_project, remove_project_hook, remove_project_member,
};
pub use models::{
    add_current_user_key, add_user_key, create_user, current_user, current_user_keys,
    delete_current_user_key, delete_user, delete_user_key, get_current_user_key, user_keys,
};
pub use models::{
    add_group_member, create_group, delete_group, get_group_members, remove_group_member,
    transfer_project_to_group,
};
pub use models::{close_issue, create_issue, reopen_issue};
pub use models::{add_deploy_key, remove_deploy_key};
pub use models::{create_label, delete_label, update_label};
pub use models::create_milestone;
pub use models::create_note;
pub use models::{
    accept_merge_request, comment_merge_request, create_merge_request,
    get_merge_request_comments,
};
pub use models::{
    compare, create_file, create_tag, delete_file, get_archive, get_branch, get_branches,
    get_commit, get_commit_diff, get_commits, get_contributors, get_file, get_raw_blob,
    get_raw_file, get_tags, get_tree, protect_branch, unprotect_branch, update_file,
};
pub use models::{create_snippet, delete_snippet, get_snippet_content};
pub use models::{
    add_system_hook, delete_system_hook, get_system_hooks, get_system_hooks_page,
    test_system_hook,
};
