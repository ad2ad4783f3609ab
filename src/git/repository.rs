use crate::git::GitError;
use crate::models::{BranchHead, RefKind, RepositoryInfo};
use git2::{BranchType, Repository, RepositoryOpenFlags, Sort};
use std::path::Path;
use tracing::{debug, warn};

/// Which references besides local branches become labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefSelection {
    pub remote_branches: bool,
    pub tags: bool,
}

pub struct GitRepository {
    repo: Repository,
    info: RepositoryInfo,
}

impl std::fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitRepository")
            .field("info", &self.info)
            .finish()
    }
}

impl GitRepository {
    /// Open the repository at exactly `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let repo = Repository::open_ext(
            path.as_ref(),
            RepositoryOpenFlags::NO_SEARCH,
            &[] as &[&std::ffi::OsStr],
        )?;
        Self::from_repository(repo)
    }

    /// Open the repository containing `path`, searching parent directories.
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let repo = Repository::open_ext(
            path.as_ref(),
            RepositoryOpenFlags::empty(),
            &[] as &[&std::ffi::OsStr],
        )?;
        Self::from_repository(repo)
    }

    fn from_repository(repo: Repository) -> Result<Self, GitError> {
        let info = RepositoryInfo::from_repo(&repo)?;
        debug!("Opened repository '{}' at {:?}", info.name, info.path);
        Ok(GitRepository { repo, info })
    }

    pub fn info(&self) -> &RepositoryInfo {
        &self.info
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Re-read name, HEAD branch and emptiness after refs moved.
    pub fn refresh_info(&mut self) -> Result<(), GitError> {
        self.info = RepositoryInfo::from_repo(&self.repo)?;
        Ok(())
    }

    /// Full id of the commit a revision (id prefix, branch, tag, `HEAD~2`)
    /// names.
    pub fn resolve_commit(&self, revision: &str) -> Result<String, GitError> {
        let revision = revision.trim();
        if revision.is_empty() {
            return Err(GitError::invalid_input(revision, "empty revision"));
        }
        let object = self
            .repo
            .revparse_single(revision)
            .map_err(|e| GitError::invalid_input(revision, e.message().to_string()))?;
        let commit = object.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    /// A revision walk over everything reachable from local branches,
    /// newest first, parents never before their children.
    ///
    /// Falls back to HEAD when the repository has no local branches.
    pub fn history_walk(&self) -> Result<git2::Revwalk<'_>, GitError> {
        let mut revwalk = self.repo.revwalk()?;

        let mut has_branches = false;
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            match branch.get().peel_to_commit() {
                Ok(commit) => {
                    revwalk.push(commit.id())?;
                    has_branches = true;
                }
                Err(e) => warn!("Skipping branch without a commit: {}", e.message()),
            }
        }

        if !has_branches {
            revwalk
                .push_head()
                .map_err(|_| GitError::repository("No branches and no HEAD commit to show"))?;
        }

        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        Ok(revwalk)
    }

    /// Current set of branch heads, local branches first.
    pub fn branch_heads(&self, selection: RefSelection) -> Result<Vec<BranchHead>, GitError> {
        let mut heads = Vec::new();

        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if let Ok(commit) = branch.get().peel_to_commit() {
                heads.push(BranchHead {
                    name: name.to_string(),
                    commit_id: commit.id().to_string(),
                    is_head: branch.is_head(),
                    kind: RefKind::LocalBranch,
                });
            }
        }

        if self.repo.head_detached().unwrap_or(false) {
            if let Ok(commit) = self.repo.head().and_then(|head| head.peel_to_commit()) {
                heads.push(
                    BranchHead::new("HEAD", commit.id().to_string(), true)
                        .with_kind(RefKind::DetachedHead),
                );
            }
        }

        if selection.remote_branches {
            for branch in self.repo.branches(Some(BranchType::Remote))? {
                let (branch, _) = branch?;
                let Some(name) = branch.name()? else {
                    continue;
                };
                // origin/HEAD is a symbolic alias of another remote branch
                if name.ends_with("/HEAD") {
                    continue;
                }
                if let Ok(commit) = branch.get().peel_to_commit() {
                    heads.push(
                        BranchHead::new(name, commit.id().to_string(), false)
                            .with_kind(RefKind::RemoteBranch),
                    );
                }
            }
        }

        if selection.tags {
            for reference in self.repo.references_glob("refs/tags/*")? {
                let reference = reference?;
                let Some(name) = reference.shorthand() else {
                    continue;
                };
                match reference.peel_to_commit() {
                    Ok(commit) => heads.push(
                        BranchHead::new(name, commit.id().to_string(), false)
                            .with_kind(RefKind::Tag),
                    ),
                    Err(_) => debug!("Tag '{}' does not point at a commit", name),
                }
            }
        }

        debug!("Loaded {} branch heads", heads.len());
        Ok(heads)
    }
}
