//! Types shared by several resources.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GitlabError, Result};
use crate::template::expand_url;

/// A project, by numeric id or by namespaced path.
///
/// Paths are percent-encoded when substituted into a URL, so
/// `group/project` becomes `group%2Fproject`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProjectRef {
    Id(u64),
    Path(String),
}

impl ProjectRef {
    /// Refer to a project by `namespace/name`.
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::Path(path) if path.trim().is_empty() => Err(GitlabError::InvalidParameter(
                "project needs an id or a path".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Path(path) => f.write_str(&urlencoding::encode(path)),
        }
    }
}

impl From<u64> for ProjectRef {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ProjectRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for ProjectRef {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

/// Expand a template whose `:id` placeholder is a project.
pub(crate) fn project_url(
    template: &str,
    project: &ProjectRef,
    rest: &[(&str, &dyn fmt::Display)],
) -> Result<String> {
    project.validate()?;
    let mut substitutions: Vec<(&str, &dyn fmt::Display)> = vec![(":id", project)];
    substitutions.extend_from_slice(rest);
    Ok(expand_url(template, &substitutions))
}

/// Encode a value that may contain `/` (branch names, file paths) as one
/// path segment.
pub(crate) fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Membership access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum AccessLevel {
    Guest,
    Reporter,
    Developer,
    Maintainer,
    Owner,
    /// A level this client does not know by name.
    Other(u32),
}

impl From<u32> for AccessLevel {
    fn from(value: u32) -> Self {
        match value {
            10 => Self::Guest,
            20 => Self::Reporter,
            30 => Self::Developer,
            40 => Self::Maintainer,
            50 => Self::Owner,
            other => Self::Other(other),
        }
    }
}

impl From<AccessLevel> for u32 {
    fn from(level: AccessLevel) -> Self {
        match level {
            AccessLevel::Guest => 10,
            AccessLevel::Reporter => 20,
            AccessLevel::Developer => 30,
            AccessLevel::Maintainer => 40,
            AccessLevel::Owner => 50,
            AccessLevel::Other(value) => value,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u32::from(*self))
    }
}

/// Project and snippet visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Internal,
    Public,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Private => "private",
            Self::Internal => "internal",
            Self::Public => "public",
        })
    }
}

/// State transition requested through an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateEvent {
    Close,
    Reopen,
}

/// The short user representation embedded in other resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBasic {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
}

/// A user as seen through a project or group membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub access_level: AccessLevel,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<chrono::NaiveDate>,
}

/// Parameters for adding a member to a project or group.
#[derive(Debug, Clone, Serialize)]
pub struct AddMemberParams {
    pub user_id: u64,
    pub access_level: AccessLevel,
    /// `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<chrono::NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_ref_display_encodes_path() {
        assert_eq!(ProjectRef::Id(42).to_string(), "42");
        assert_eq!(
            ProjectRef::path("group/sub group/project").to_string(),
            "group%2Fsub%20group%2Fproject"
        );
    }

    #[test]
    fn test_project_url() {
        let url = project_url(
            "/projects/:id/issues/:issue_iid",
            &ProjectRef::path("a/b"),
            &[(":issue_iid", &7)],
        )
        .unwrap();
        assert_eq!(url, "/projects/a%2Fb/issues/7");
    }

    #[test]
    fn test_empty_project_path_is_invalid() {
        let err = project_url("/projects/:id", &ProjectRef::path(" "), &[]).unwrap_err();
        assert!(matches!(err, GitlabError::InvalidParameter(_)));
    }

    #[test]
    fn test_access_level_round_trips_as_integer() {
        let json = serde_json::to_string(&AccessLevel::Developer).unwrap();
        assert_eq!(json, "30");
        let level: AccessLevel = serde_json::from_str("40").unwrap();
        assert_eq!(level, AccessLevel::Maintainer);
        let level: AccessLevel = serde_json::from_str("5").unwrap();
        assert_eq!(level, AccessLevel::Other(5));
        assert_eq!(AccessLevel::Owner.to_string(), "50");
    }

    #[test]
    fn test_add_member_params_form() {
        let params = crate::Params::from_serialize(&AddMemberParams {
            user_id: 3,
            access_level: AccessLevel::Reporter,
            expires_at: None,
        })
        .unwrap();
        assert_eq!(params.encode(), "user_id=3&access_level=20");
    }
}
