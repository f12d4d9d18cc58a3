//! Notes (comments) on issues, snippets and merge requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::{GitlabError, Result};
use crate::models::common::{project_url, ProjectRef, UserBasic};
use crate::models::issue::IssueId;
use crate::models::merge_request::MergeRequestId;
use crate::models::snippet::SnippetId;
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::traits::{Get, List};

const ISSUE_NOTES: &str = "/projects/:id/issues/:issue_iid/notes";
const ISSUE_NOTE: &str = "/projects/:id/issues/:issue_iid/notes/:note_id";
const SNIPPET_NOTES: &str = "/projects/:id/snippets/:snippet_id/notes";
const SNIPPET_NOTE: &str = "/projects/:id/snippets/:snippet_id/notes/:note_id";
const MERGE_REQUEST_NOTES: &str = "/projects/:id/merge_requests/:merge_request_iid/notes";
const MERGE_REQUEST_NOTE: &str =
    "/projects/:id/merge_requests/:merge_request_iid/notes/:note_id";

/// A comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub body: String,
    #[serde(default)]
    pub author: Option<UserBasic>,
    /// Set for notes GitLab writes itself (state changes, label edits).
    #[serde(default)]
    pub system: bool,
    #[serde(default)]
    pub attachment: Option<String>,
    #[serde(default)]
    pub noteable_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// The thing a note hangs off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Noteable {
    Issue(IssueId),
    Snippet(SnippetId),
    MergeRequest(MergeRequestId),
}

impl From<IssueId> for Noteable {
    fn from(id: IssueId) -> Self {
        Noteable::Issue(id)
    }
}

impl From<SnippetId> for Noteable {
    fn from(id: SnippetId) -> Self {
        Noteable::Snippet(id)
    }
}

impl From<MergeRequestId> for Noteable {
    fn from(id: MergeRequestId) -> Self {
        Noteable::MergeRequest(id)
    }
}

impl Noteable {
    fn project(&self) -> &ProjectRef {
        match self {
            Noteable::Issue(id) => &id.project,
            Noteable::Snippet(id) => &id.project,
            Noteable::MergeRequest(id) => &id.project,
        }
    }

    fn notes_url(&self) -> Result<String> {
        match self {
            Noteable::Issue(id) => {
                project_url(ISSUE_NOTES, self.project(), &[(":issue_iid", &id.iid)])
            }
            Noteable::Snippet(id) => project_url(
                SNIPPET_NOTES,
                self.project(),
                &[(":snippet_id", &id.snippet_id)],
            ),
            Noteable::MergeRequest(id) => project_url(
                MERGE_REQUEST_NOTES,
                self.project(),
                &[(":merge_request_iid", &id.iid)],
            ),
        }
    }

    fn note_url(&self, note_id: u64) -> Result<String> {
        match self {
            Noteable::Issue(id) => project_url(
                ISSUE_NOTE,
                self.project(),
                &[(":issue_iid", &id.iid), (":note_id", &note_id)],
            ),
            Noteable::Snippet(id) => project_url(
                SNIPPET_NOTE,
                self.project(),
                &[(":snippet_id", &id.snippet_id), (":note_id", &note_id)],
            ),
            Noteable::MergeRequest(id) => project_url(
                MERGE_REQUEST_NOTE,
                self.project(),
                &[(":merge_request_iid", &id.iid), (":note_id", &note_id)],
            ),
        }
    }
}

/// A single note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteId {
    pub on: Noteable,
    pub note_id: u64,
}

impl NoteId {
    pub fn new(on: impl Into<Noteable>, note_id: u64) -> Self {
        Self {
            on: on.into(),
            note_id,
        }
    }
}

#[async_trait]
impl Get for Note {
    type Id = NoteId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: NoteId) -> Result<Self> {
        client
            .get(&id.on.note_url(id.note_id)?, &Params::new())
            .await
    }
}

#[async_trait]
impl List for Note {
    type Query = Noteable;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        on: &Noteable,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        client.get_page(&on.notes_url()?, &Params::new(), page).await
    }
}

/// Add a note.
#[tracing::instrument(skip(client, body))]
pub async fn create_note(client: &GitlabClient, on: &Noteable, body: &str) -> Result<Note> {
    if body.trim().is_empty() {
        return Err(GitlabError::InvalidParameter(
            "note body must not be empty".to_string(),
        ));
    }
    let params = Params::new().with("body", body);
    client.post(&on.notes_url()?, &params).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_urls_per_noteable() {
        let on = Noteable::from(IssueId::new(4u64, 12));
        assert_eq!(on.notes_url().unwrap(), "/projects/4/issues/12/notes");

        let on = Noteable::from(SnippetId::new("ops/scripts", 3));
        assert_eq!(on.note_url(9).unwrap(), "/projects/ops%2Fscripts/snippets/3/notes/9");

        let on = Noteable::from(MergeRequestId::new(4u64, 2));
        assert_eq!(on.notes_url().unwrap(), "/projects/4/merge_requests/2/notes");
    }

    #[test]
    fn test_system_note_deserialize() {
        let json = r#"{
            "id": 302,
            "body": "closed",
            "author": {"id": 1, "username": "pipin", "name": "Pip"},
            "system": true,
            "noteable_type": "Issue",
            "created_at": "2013-10-02T09:22:45Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert!(note.system);
        assert_eq!(note.author.unwrap().username, "pipin");
        assert_eq!(note.attachment, None);
    }
}
