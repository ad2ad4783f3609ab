use crate::git::{GitError, GitRepository};
use crate::models::Commit;
use tracing::{debug, warn};

/// Batched access to the ordered commit history with a "load more" step.
///
/// Each batch continues the same topological walk where the previous batch
/// stopped, so concatenating batches yields the same order as one long walk.
pub struct CommitHistory {
    limit: usize,
    loaded: usize,
    batch_size: usize,
    is_complete: bool,
    next_skip: usize,
}

pub struct CommitBatch {
    pub commits: Vec<Commit>,
    pub has_more: bool,
    pub total_loaded: usize,
}

impl CommitHistory {
    pub fn new(batch_size: usize, limit: usize) -> Self {
        Self {
            limit,
            loaded: 0,
            batch_size: batch_size.max(1),
            is_complete: false,
            next_skip: 0,
        }
    }

    /// A history with nothing to load, for repositories without commits.
    pub fn empty() -> Self {
        Self {
            is_complete: true,
            ..Self::new(1, 0)
        }
    }

    /// Stop offering more batches after a failed load. A refresh starts a
    /// new history.
    pub fn abandon(&mut self) {
        if !self.is_complete {
            warn!("Giving up on history after {} commits", self.loaded);
            self.is_complete = true;
        }
    }

    pub fn load_next_batch(&mut self, repo: &GitRepository) -> Result<CommitBatch, GitError> {
        if self.is_complete {
            return Ok(CommitBatch {
                commits: Vec::new(),
                has_more: false,
                total_loaded: self.loaded,
            });
        }

        debug!("Loading batch of commits, loaded so far: {}", self.loaded);
        // git2 cannot resume a walk across calls, so start over and skip
        let mut revwalk = repo.history_walk()?;

        let mut skipped = 0;
        while skipped < self.next_skip {
            if revwalk.next().is_none() {
                self.is_complete = true;
                return Ok(CommitBatch {
                    commits: Vec::new(),
                    has_more: false,
                    total_loaded: self.loaded,
                });
            }
            skipped += 1;
        }

        let wanted = self.batch_size.min(self.limit.saturating_sub(self.loaded));
        let mut commits = Vec::with_capacity(wanted);
        let mut exhausted = true;

        for oid in revwalk.by_ref() {
            if commits.len() >= wanted {
                exhausted = false;
                break;
            }
            self.next_skip += 1;

            let oid = match oid {
                Ok(oid) => oid,
                Err(e) => {
                    warn!("Error in revwalk: {}", e.message());
                    continue;
                }
            };
            let commit = repo
                .repo()
                .find_commit(oid)
                .map_err(GitError::from)
                .and_then(|c| Commit::from_git2(&c));
            match commit {
                Ok(commit) => commits.push(commit),
                Err(e) => warn!("Skipping unreadable commit {}: {}", oid, e),
            }
        }

        self.loaded += commits.len();
        if exhausted || self.loaded >= self.limit {
            self.is_complete = true;
        }

        debug!(
            "Batch complete: {} commits in this batch, total loaded: {}, is_complete: {}",
            commits.len(),
            self.loaded,
            self.is_complete
        );

        Ok(CommitBatch {
            commits,
            has_more: !self.is_complete,
            total_loaded: self.loaded,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }
}

impl std::fmt::Debug for CommitHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommitHistory")
            .field("limit", &self.limit)
            .field("loaded", &self.loaded)
            .field("batch_size", &self.batch_size)
            .field("is_complete", &self.is_complete)
            .field("next_skip", &self.next_skip)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history_is_complete() {
        let history = CommitHistory::empty();
        assert!(history.is_complete());
        assert_eq!(history.loaded_count(), 0);
    }

    #[test]
    fn test_abandoned_history_offers_no_more() {
        let mut history = CommitHistory::new(10, 100);
        assert!(!history.is_complete());
        history.abandon();
        assert!(history.is_complete());
    }
}
