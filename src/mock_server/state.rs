//! Mock server state management.
//!
//! Provides the in-memory data store for the mock GitLab API server.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{Issue, Project, User};

/// Shared state for the mock server.
///
/// Collections are ordered by id so listings are stable across pages.
#[derive(Debug, Default)]
pub struct MockState {
    /// Projects indexed by id.
    pub projects: BTreeMap<u64, Project>,

    /// Users indexed by id.
    pub users: BTreeMap<u64, User>,

    /// Issues indexed by global id.
    pub issues: BTreeMap<u64, Issue>,

    /// If set, requests must send this value as `PRIVATE-TOKEN`.
    pub required_token: Option<String>,

    /// The user the token belongs to; `/user` answers with it.
    pub token_owner: Option<u64>,

    /// Externally visible base URL, used to build `Link` headers.
    pub base_url: String,

    next_id: u64,
}

impl MockState {
    /// Create a new empty state.
    pub fn new() -> Self {
        Self {
            next_id: 1000,
            ..Self::default()
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Add a project to the state.
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.insert(project.id, project);
        self
    }

    /// Add a user to the state.
    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id, user);
        self
    }

    /// Add an issue to the state.
    pub fn with_issue(mut self, issue: Issue) -> Self {
        self.issues.insert(issue.id, issue);
        self
    }

    /// Require `token` on every API request, owned by `user_id`.
    pub fn with_required_token(mut self, token: &str, user_id: u64) -> Self {
        self.required_token = Some(token.to_string());
        self.token_owner = Some(user_id);
        self
    }

    /// Allocate an id for a new entity.
    pub fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Find a project by numeric id or `namespace/path`.
    pub fn find_project(&self, id: &str) -> Option<&Project> {
        match id.parse::<u64>() {
            Ok(id) => self.projects.get(&id),
            Err(_) => self
                .projects
                .values()
                .find(|p| p.path_with_namespace == id),
        }
    }

    /// Find a user by numeric id or username.
    pub fn find_user(&self, id: &str) -> Option<&User> {
        match id.parse::<u64>() {
            Ok(id) => self.users.get(&id),
            Err(_) => self.users.values().find(|u| u.username == id),
        }
    }

    /// Projects whose name or path contains `search` (case-insensitive).
    pub fn list_projects(&self, search: Option<&str>) -> Vec<&Project> {
        let search = search.map(str::to_lowercase);
        self.projects
            .values()
            .filter(|p| match &search {
                Some(s) => {
                    p.name.to_lowercase().contains(s)
                        || p.path_with_namespace.to_lowercase().contains(s)
                }
                None => true,
            })
            .collect()
    }

    /// Users matching `search` against username, name and email.
    pub fn list_users(&self, search: Option<&str>) -> Vec<&User> {
        let search = search.map(str::to_lowercase);
        self.users
            .values()
            .filter(|u| match &search {
                Some(s) => {
                    u.username.to_lowercase().contains(s)
                        || u.name.to_lowercase().contains(s)
                        || u.email
                            .as_deref()
                            .is_some_and(|e| e.to_lowercase().contains(s))
                }
                None => true,
            })
            .collect()
    }

    /// Issues, optionally restricted to a project and a state.
    pub fn list_issues(&self, project_id: Option<u64>, state: Option<&str>) -> Vec<&Issue> {
        self.issues
            .values()
            .filter(|i| project_id.map_or(true, |p| i.project_id == p))
            .filter(|i| match state {
                None | Some("all") => true,
                Some(s) => i.state == s,
            })
            .collect()
    }

    /// Find an issue by project and per-project number.
    pub fn find_issue_mut(&mut self, project_id: u64, iid: u64) -> Option<&mut Issue> {
        self.issues
            .values_mut()
            .find(|i| i.project_id == project_id && i.iid == iid)
    }

    /// Open an issue in a project, assigning the next per-project number.
    pub fn open_issue(
        &mut self,
        project_id: u64,
        title: String,
        description: Option<String>,
        labels: Vec<String>,
    ) -> Issue {
        let iid = self
            .issues
            .values()
            .filter(|i| i.project_id == project_id)
            .map(|i| i.iid)
            .max()
            .unwrap_or(0)
            + 1;
        let issue = Issue {
            id: self.next_id(),
            iid,
            project_id,
            title,
            description,
            state: "opened".to_string(),
            labels,
            created_at: Some(chrono::Utc::now()),
            ..Default::default()
        };
        self.issues.insert(issue.id, issue.clone());
        issue
    }
}
