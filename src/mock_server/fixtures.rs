//! Test data fixtures for the mock server.
//!
//! Provides factory functions for creating realistic test data.

use chrono::{TimeZone, Utc};

use crate::{Issue, Namespace, Project, User, UserBasic, Visibility};

/// Token accepted by the default scenario.
pub const DEFAULT_TOKEN: &str = "test-token";

/// Collection of fixture factories for test data.
pub struct Fixtures;

impl Fixtures {
    /// A private project at `namespace/name`.
    pub fn project(id: u64, namespace: &str, name: &str) -> Project {
        Project {
            id,
            name: name.to_string(),
            name_with_namespace: Some(format!("{namespace} / {name}")),
            path: name.to_string(),
            path_with_namespace: format!("{namespace}/{name}"),
            default_branch: Some("main".to_string()),
            visibility: Some(Visibility::Private),
            namespace: Some(Namespace {
                id: 1,
                name: namespace.to_string(),
                path: namespace.to_string(),
                kind: Some("group".to_string()),
                full_path: Some(namespace.to_string()),
            }),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single(),
            ..Default::default()
        }
    }

    /// An active user.
    pub fn user(id: u64, username: &str, is_admin: bool) -> User {
        User {
            id,
            username: username.to_string(),
            name: username.to_string(),
            email: Some(format!("{username}@example.com")),
            state: Some("active".to_string()),
            is_admin,
            ..Default::default()
        }
    }

    /// An open issue.
    pub fn issue(id: u64, project_id: u64, iid: u64, title: &str, author: &User) -> Issue {
        Issue {
            id,
            iid,
            project_id,
            title: title.to_string(),
            state: "opened".to_string(),
            author: Some(UserBasic {
                id: author.id,
                username: author.username.clone(),
                name: author.name.clone(),
                state: author.state.clone(),
                avatar_url: None,
                web_url: None,
            }),
            ..Default::default()
        }
    }

    /// Create a default set of test data for common scenarios.
    pub fn default_scenario() -> DefaultScenario {
        DefaultScenario::new()
    }
}

/// A complete test scenario with related entities.
///
/// `root` (id 1) is an administrator owning [`DEFAULT_TOKEN`]; `alice` and
/// `bob` are regular users. There are five projects so small page sizes
/// produce several pages.
pub struct DefaultScenario {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub issues: Vec<Issue>,
}

impl DefaultScenario {
    fn new() -> Self {
        let root = Fixtures::user(1, "root", true);
        let alice = Fixtures::user(2, "alice", false);
        let bob = Fixtures::user(3, "bob", false);

        let projects = vec![
            Fixtures::project(10, "platform", "api"),
            Fixtures::project(11, "platform", "web"),
            Fixtures::project(12, "platform", "worker"),
            Fixtures::project(13, "tools", "linter"),
            Fixtures::project(14, "tools", "formatter"),
        ];

        let issues = vec![
            Fixtures::issue(100, 10, 1, "Login fails behind proxy", &alice),
            Fixtures::issue(101, 10, 2, "Rate limit headers missing", &bob),
            Fixtures::issue(102, 13, 1, "False positive on unused import", &alice),
        ];

        Self {
            users: vec![root, alice, bob],
            projects,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_fixture() {
        let project = Fixtures::project(5, "group", "app");
        assert_eq!(project.path_with_namespace, "group/app");
        assert!(!project.is_public());
    }

    #[test]
    fn test_default_scenario() {
        let scenario = Fixtures::default_scenario();
        assert_eq!(scenario.users.len(), 3);
        assert!(scenario.users[0].is_admin);
        assert_eq!(scenario.projects.len(), 5);
        assert!(scenario
            .issues
            .iter()
            .all(|i| scenario.projects.iter().any(|p| p.id == i.project_id)));
    }
}
