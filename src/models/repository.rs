//! Repository contents: branches, tags, trees, files and commits.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::models::common::{encode_segment, project_url, ProjectRef};
use crate::params::Params;

const BRANCHES: &str = "/projects/:id/repository/branches";
const BRANCH: &str = "/projects/:id/repository/branches/:branch";
const BRANCH_PROTECT: &str = "/projects/:id/repository/branches/:branch/protect";
const BRANCH_UNPROTECT: &str = "/projects/:id/repository/branches/:branch/unprotect";
const TAGS: &str = "/projects/:id/repository/tags";
const TREE: &str = "/projects/:id/repository/tree";
const BLOB_RAW: &str = "/projects/:id/repository/blobs/:sha/raw";
const ARCHIVE: &str = "/projects/:id/repository/archive";
const COMPARE: &str = "/projects/:id/repository/compare";
const CONTRIBUTORS: &str = "/projects/:id/repository/contributors";
const FILE: &str = "/projects/:id/repository/files/:file_path";
const FILE_RAW: &str = "/projects/:id/repository/files/:file_path/raw";
const COMMITS: &str = "/projects/:id/repository/commits";
const COMMIT: &str = "/projects/:id/repository/commits/:sha";
const COMMIT_DIFF: &str = "/projects/:id/repository/commits/:sha/diff";

/// A commit as returned by the commit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    #[serde(default)]
    pub short_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
    #[serde(default)]
    pub committer_name: Option<String>,
    #[serde(default)]
    pub committer_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authored_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub committed_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
}

/// A branch and its head commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Branch {
    pub name: String,
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub default: bool,
}

/// A tag and the commit it points at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub protected: bool,
}

/// One entry of a repository tree listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub id: String,
    pub name: String,
    /// `tree` or `blob`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

impl TreeEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == "tree"
    }
}

/// Changes to one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diff {
    pub old_path: String,
    pub new_path: String,
    #[serde(default)]
    pub a_mode: Option<String>,
    #[serde(default)]
    pub b_mode: Option<String>,
    #[serde(default)]
    pub diff: String,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
}

/// The difference between two refs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    #[serde(default)]
    pub commit: Option<Commit>,
    #[serde(default)]
    pub commits: Vec<Commit>,
    #[serde(default)]
    pub diffs: Vec<Diff>,
    #[serde(default)]
    pub compare_timeout: bool,
    #[serde(default)]
    pub compare_same_ref: bool,
}

/// Commit statistics for one author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub commits: u32,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
}

/// A file read from the repository. `content` is encoded as `encoding` says.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoFile {
    pub file_name: String,
    pub file_path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(rename = "ref", default)]
    pub git_ref: Option<String>,
    #[serde(default)]
    pub blob_id: Option<String>,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub last_commit_id: Option<String>,
}

/// Result of creating or updating a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCommit {
    pub file_path: String,
    pub branch: String,
}

/// Parameters for writing a file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FileWriteParams {
    /// Path of the file within the repository.
    #[serde(skip)]
    pub file_path: String,
    pub branch: String,
    pub content: String,
    pub commit_message: String,
    /// `text` or `base64`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
}

/// Filters for the tree listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TreeQuery {
    /// Directory to list; the root when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recursive: Option<bool>,
}

/// Filters for the commit listing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CommitListQuery {
    /// Branch or tag; the default branch when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    /// Only commits touching this file path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn branch_url(template: &str, project: &ProjectRef, branch: &str) -> Result<String> {
    project_url(template, project, &[(":branch", &encode_segment(branch))])
}

fn file_url(template: &str, project: &ProjectRef, file_path: &str) -> Result<String> {
    project_url(template, project, &[(":file_path", &encode_segment(file_path))])
}

/// Every branch of a repository.
pub async fn get_branches(client: &GitlabClient, project: &ProjectRef) -> Result<Vec<Branch>> {
    client
        .get_all(&project_url(BRANCHES, project, &[])?, &Params::new())
        .await
}

/// One branch.
#[tracing::instrument(skip(client))]
pub async fn get_branch(client: &GitlabClient, project: &ProjectRef, branch: &str) -> Result<Branch> {
    client
        .get(&branch_url(BRANCH, project, branch)?, &Params::new())
        .await
}

/// Protect a branch from force pushes and deletion.
#[tracing::instrument(skip(client))]
pub async fn protect_branch(
    client: &GitlabClient,
    project: &ProjectRef,
    branch: &str,
) -> Result<Branch> {
    client
        .put(&branch_url(BRANCH_PROTECT, project, branch)?, &Params::new())
        .await
}

/// Remove the protection from a branch.
#[tracing::instrument(skip(client))]
pub async fn unprotect_branch(
    client: &GitlabClient,
    project: &ProjectRef,
    branch: &str,
) -> Result<Branch> {
    client
        .put(&branch_url(BRANCH_UNPROTECT, project, branch)?, &Params::new())
        .await
}

/// Every tag of a repository.
pub async fn get_tags(client: &GitlabClient, project: &ProjectRef) -> Result<Vec<Tag>> {
    client
        .get_all(&project_url(TAGS, project, &[])?, &Params::new())
        .await
}

/// Create a tag at `git_ref`; a message makes it an annotated tag.
#[tracing::instrument(skip(client))]
pub async fn create_tag(
    client: &GitlabClient,
    project: &ProjectRef,
    tag_name: &str,
    git_ref: &str,
    message: Option<&str>,
) -> Result<Tag> {
    let mut params = Params::new()
        .with("tag_name", tag_name)
        .with("ref", git_ref);
    params.set_opt("message", message);
    client
        .post(&project_url(TAGS, project, &[])?, &params)
        .await
}

/// Every entry of a directory in the repository.
#[tracing::instrument(skip(client))]
pub async fn get_tree(
    client: &GitlabClient,
    project: &ProjectRef,
    query: &TreeQuery,
) -> Result<Vec<TreeEntry>> {
    client
        .get_all(&project_url(TREE, project, &[])?, &Params::from_serialize(query)?)
        .await
}

/// Raw contents of a file at a ref.
#[tracing::instrument(skip(client))]
pub async fn get_raw_file(
    client: &GitlabClient,
    project: &ProjectRef,
    file_path: &str,
    git_ref: &str,
) -> Result<Bytes> {
    let params = Params::new().with("ref", git_ref);
    client
        .get_raw(&file_url(FILE_RAW, project, file_path)?, &params)
        .await
}

/// Raw contents of a blob.
#[tracing::instrument(skip(client))]
pub async fn get_raw_blob(client: &GitlabClient, project: &ProjectRef, sha: &str) -> Result<Bytes> {
    let path = project_url(BLOB_RAW, project, &[(":sha", &encode_segment(sha))])?;
    client.get_raw(&path, &Params::new()).await
}

/// A `tar.gz` archive of the repository at `sha`, or at the default
/// branch when unset.
#[tracing::instrument(skip(client))]
pub async fn get_archive(
    client: &GitlabClient,
    project: &ProjectRef,
    sha: Option<&str>,
) -> Result<Bytes> {
    let mut params = Params::new();
    params.set_opt("sha", sha);
    client
        .get_raw(&project_url(ARCHIVE, project, &[])?, &params)
        .await
}

/// Commits and diffs between two refs.
#[tracing::instrument(skip(client))]
pub async fn compare(
    client: &GitlabClient,
    project: &ProjectRef,
    from: &str,
    to: &str,
) -> Result<Comparison> {
    let params = Params::new().with("from", from).with("to", to);
    client
        .get(&project_url(COMPARE, project, &[])?, &params)
        .await
}

/// Commit statistics per author.
pub async fn get_contributors(
    client: &GitlabClient,
    project: &ProjectRef,
) -> Result<Vec<Contributor>> {
    client
        .get_all(&project_url(CONTRIBUTORS, project, &[])?, &Params::new())
        .await
}

/// A file with its metadata and encoded content.
#[tracing::instrument(skip(client))]
pub async fn get_file(
    client: &GitlabClient,
    project: &ProjectRef,
    file_path: &str,
    git_ref: &str,
) -> Result<RepoFile> {
    let params = Params::new().with("ref", git_ref);
    client
        .get(&file_url(FILE, project, file_path)?, &params)
        .await
}

/// Commit a new file.
#[tracing::instrument(skip(client, params), fields(file_path = %params.file_path))]
pub async fn create_file(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &FileWriteParams,
) -> Result<FileCommit> {
    client
        .post(
            &file_url(FILE, project, &params.file_path)?,
            &Params::from_serialize(params)?,
        )
        .await
}

/// Commit new contents for an existing file.
#[tracing::instrument(skip(client, params), fields(file_path = %params.file_path))]
pub async fn update_file(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &FileWriteParams,
) -> Result<FileCommit> {
    client
        .put(
            &file_url(FILE, project, &params.file_path)?,
            &Params::from_serialize(params)?,
        )
        .await
}

/// Commit the removal of a file.
#[tracing::instrument(skip(client))]
pub async fn delete_file(
    client: &GitlabClient,
    project: &ProjectRef,
    file_path: &str,
    branch: &str,
    commit_message: &str,
) -> Result<()> {
    let params = Params::new()
        .with("branch", branch)
        .with("commit_message", commit_message);
    client
        .delete_discard(&file_url(FILE, project, file_path)?, &params)
        .await
}

/// Every commit matching the query, newest first.
#[tracing::instrument(skip(client))]
pub async fn get_commits(
    client: &GitlabClient,
    project: &ProjectRef,
    query: &CommitListQuery,
) -> Result<Vec<Commit>> {
    client
        .get_all(&project_url(COMMITS, project, &[])?, &Params::from_serialize(query)?)
        .await
}

/// One commit by SHA, branch or tag.
#[tracing::instrument(skip(client))]
pub async fn get_commit(client: &GitlabClient, project: &ProjectRef, sha: &str) -> Result<Commit> {
    let path = project_url(COMMIT, project, &[(":sha", &encode_segment(sha))])?;
    client.get(&path, &Params::new()).await
}

/// The diff introduced by one commit.
#[tracing::instrument(skip(client))]
pub async fn get_commit_diff(
    client: &GitlabClient,
    project: &ProjectRef,
    sha: &str,
) -> Result<Vec<Diff>> {
    let path = project_url(COMMIT_DIFF, project, &[(":sha", &encode_segment(sha))])?;
    client.get_all(&path, &Params::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_names_are_one_segment() {
        let path = branch_url(BRANCH_PROTECT, &ProjectRef::Id(1), "feature/login").unwrap();
        assert_eq!(path, "/projects/1/repository/branches/feature%2Flogin/protect");
    }

    #[test]
    fn test_file_paths_are_one_segment() {
        let path = file_url(FILE_RAW, &ProjectRef::path("g/p"), "src/lib.rs").unwrap();
        assert_eq!(path, "/projects/g%2Fp/repository/files/src%2Flib.rs/raw");
    }

    #[test]
    fn test_file_write_params_keep_path_out_of_body() {
        let params = Params::from_serialize(&FileWriteParams {
            file_path: "docs/README.md".to_string(),
            branch: "main".to_string(),
            content: "hello".to_string(),
            commit_message: "add readme".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(params.get("file_path"), None);
        assert_eq!(params.encode(), "branch=main&content=hello&commit_message=add+readme");
    }

    #[test]
    fn test_tree_entry_deserialize() {
        let json = r#"[
            {"id": "a1e8f8d745cc87e3a9248358d9352bb7f9a0aeba", "name": "html", "type": "tree", "path": "files/html", "mode": "040000"},
            {"id": "4535904260b1082e14f867f7a24fd8c21495bde3", "name": "README.md", "type": "blob", "path": "README.md", "mode": "100644"}
        ]"#;
        let entries: Vec<TreeEntry> = serde_json::from_str(json).unwrap();
        assert!(entries[0].is_dir());
        assert!(!entries[1].is_dir());
    }

    #[test]
    fn test_comparison_deserialize() {
        let json = r#"{
            "commit": {"id": "12d65c8dd2b2676fa3ac47d955accc085a37a9c1", "short_id": "12d65c8dd2b"},
            "commits": [{"id": "12d65c8dd2b2676fa3ac47d955accc085a37a9c1", "title": "JS fix"}],
            "diffs": [{"old_path": "files/js/application.js", "new_path": "files/js/application.js", "diff": "--- a\n+++ b", "new_file": false}],
            "compare_timeout": false,
            "compare_same_ref": false
        }"#;
        let comparison: Comparison = serde_json::from_str(json).unwrap();
        assert_eq!(comparison.commits.len(), 1);
        assert_eq!(comparison.diffs[0].new_path, "files/js/application.js");
    }
}
