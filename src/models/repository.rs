use git2::{BranchType, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where HEAD pointed when the repository was last read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeadState {
    Branch(String),
    /// Short id of the checked out commit.
    Detached(String),
    /// Branch HEAD names before its first commit exists.
    Unborn(String),
}

impl HeadState {
    fn read(repo: &git2::Repository) -> Result<Option<Self>, git2::Error> {
        let head = match repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == ErrorCode::UnbornBranch => {
                let symbolic = repo.find_reference("HEAD")?;
                let name = symbolic
                    .symbolic_target()
                    .map(|target| target.trim_start_matches("refs/heads/").to_string());
                return Ok(name.map(HeadState::Unborn));
            }
            Err(_) => return Ok(None),
        };

        if repo.head_detached()? {
            let commit = head.peel_to_commit()?;
            let short_id = commit.as_object().short_id()?;
            return Ok(short_id.as_str().map(|id| HeadState::Detached(id.to_string())));
        }

        Ok(head.shorthand().map(|name| HeadState::Branch(name.to_string())))
    }
}

impl fmt::Display for HeadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeadState::Branch(name) => write!(f, "{}", name),
            HeadState::Detached(id) => write!(f, "detached at {}", id),
            HeadState::Unborn(name) => write!(f, "{} (no commits yet)", name),
        }
    }
}

/// Summary of an opened repository for the status bar and recent list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub path: PathBuf,
    pub name: String,
    pub is_bare: bool,
    pub is_empty: bool,
    pub head: Option<HeadState>,
}

impl RepositoryInfo {
    pub fn from_repo(repo: &git2::Repository) -> Result<Self, git2::Error> {
        let path = repo.workdir().unwrap_or_else(|| repo.path()).to_path_buf();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();

        let head = HeadState::read(repo)?;
        // git2 only reports empty when HEAD names the configured default branch
        let is_empty = repo.is_empty()?
            || (matches!(head, Some(HeadState::Unborn(_)))
                && repo.branches(Some(BranchType::Local))?.next().is_none());

        Ok(RepositoryInfo {
            name,
            is_bare: repo.is_bare(),
            is_empty,
            head,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_head_state_display() {
        assert_eq!(HeadState::Branch("main".into()).to_string(), "main");
        assert_eq!(
            HeadState::Detached("abc1234".into()).to_string(),
            "detached at abc1234"
        );
        assert_eq!(
            HeadState::Unborn("main".into()).to_string(),
            "main (no commits yet)"
        );
    }
}
