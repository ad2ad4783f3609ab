use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::git::GitError;

/// A commit as handed to the layout engine. The engine never reorders these;
/// the position of a commit in the supplied slice is its row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    pub id: String,
    pub short_id: String,
    pub parent_ids: Vec<String>,
    pub message: String,
    pub summary: String,
    pub author: GitSignature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitSignature {
    pub name: String,
    pub email: String,
    pub when: DateTime<Utc>,
}

/// What kind of reference a [`BranchHead`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RefKind {
    #[default]
    LocalBranch,
    RemoteBranch,
    Tag,
    DetachedHead,
}

/// A named reference pointing at a commit. Several heads may share a commit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchHead {
    pub name: String,
    pub commit_id: String,
    pub is_head: bool,
    #[serde(default)]
    pub kind: RefKind,
}

impl Commit {
    /// Build a bare commit record with an empty message and an epoch date.
    pub fn new(id: impl Into<String>, parent_ids: Vec<String>) -> Self {
        let id = id.into();
        let short_id = id.chars().take(7).collect();
        Self {
            id,
            short_id,
            parent_ids,
            message: String::new(),
            summary: String::new(),
            author: GitSignature {
                name: String::new(),
                email: String::new(),
                when: DateTime::<Utc>::default(),
            },
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.summary = message.lines().next().unwrap_or("").to_string();
        self.message = message;
        self
    }

    pub fn from_git2(commit: &git2::Commit) -> Result<Self, GitError> {
        let id = commit.id().to_string();
        let short_id = commit
            .as_object()
            .short_id()?
            .as_str()
            .unwrap_or("")
            .to_string();

        let signature = commit.author();
        let author = GitSignature {
            name: signature.name().unwrap_or("Unknown").to_string(),
            email: signature.email().unwrap_or("").to_string(),
            when: DateTime::from_timestamp(signature.when().seconds(), 0)
                .unwrap_or(DateTime::<Utc>::default()),
        };

        let message = commit.message().unwrap_or("").trim().to_string();
        let summary = commit.summary().unwrap_or("").to_string();
        let parent_ids = commit.parent_ids().map(|id| id.to_string()).collect();

        Ok(Commit {
            id,
            short_id,
            parent_ids,
            message,
            summary,
            author,
        })
    }

    pub fn is_merge(&self) -> bool {
        self.parent_ids.len() > 1
    }
}

impl BranchHead {
    pub fn new(name: impl Into<String>, commit_id: impl Into<String>, is_head: bool) -> Self {
        Self {
            name: name.into(),
            commit_id: commit_id.into(),
            is_head,
            kind: RefKind::LocalBranch,
        }
    }

    pub fn with_kind(mut self, kind: RefKind) -> Self {
        self.kind = kind;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_commit_derives_short_id() {
        let commit = Commit::new("0123456789abcdef", vec![]);
        assert_eq!(commit.short_id, "0123456");
        assert!(!commit.is_merge());
    }

    #[test]
    fn test_with_message_sets_summary() {
        let commit = Commit::new("c1", vec![]).with_message("Fix lane reuse\n\nLonger body");
        assert_eq!(commit.summary, "Fix lane reuse");
        assert!(commit.message.ends_with("Longer body"));
    }

    #[test]
    fn test_branch_head_defaults_to_local_branch() {
        let head = BranchHead::new("main", "c3", true);
        assert_eq!(head.kind, RefKind::LocalBranch);

        let json = r#"{"name":"v1","commit_id":"c1","is_head":false}"#;
        let parsed: BranchHead = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, RefKind::LocalBranch);
    }
}
