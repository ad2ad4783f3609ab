use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::git::{GitError, GitRepository};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Git directory entries whose churn never moves a ref.
const IGNORED_PATHS: &[&str] = &["objects", "logs", "hooks"];

/// What moved in a watched repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RepositoryChange {
    /// A branch, remote branch or tag was created, moved or deleted.
    RefsChanged,
    /// HEAD names another branch or commit.
    HeadMoved,
}

/// Map a changed path to the kind of change it signals, if any.
///
/// `git_dirs` are the directories holding HEAD and the refs. Lock files are
/// skipped; git renames them onto the real name once the update is done.
pub fn classify_change(git_dirs: &[PathBuf], path: &Path) -> Option<RepositoryChange> {
    let relative = git_dirs
        .iter()
        .find_map(|dir| path.strip_prefix(dir).ok())?;
    if relative.extension().is_some_and(|ext| ext == "lock") {
        return None;
    }

    let Some(Component::Normal(first)) = relative.components().next() else {
        return None;
    };
    let first = first.to_str()?;
    if IGNORED_PATHS.contains(&first) {
        return None;
    }

    match first {
        "HEAD" if relative.components().count() == 1 => Some(RepositoryChange::HeadMoved),
        "refs" | "packed-refs" => Some(RepositoryChange::RefsChanged),
        _ => None,
    }
}

/// Debounced watch on a repository's git directory.
///
/// Changes are queued on a channel and drained on the UI thread with
/// [`RepositoryWatcher::poll`]. Dropping the watcher stops it.
pub struct RepositoryWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    changes: UnboundedReceiver<RepositoryChange>,
}

impl RepositoryWatcher {
    /// Start watching `repo`. `wake` runs on the watcher thread after each
    /// batch of relevant changes, e.g. to request a repaint.
    pub fn start<F>(repo: &GitRepository, wake: F) -> Result<Self, GitError>
    where
        F: Fn() + Send + 'static,
    {
        let mut roots = vec![repo.repo().path().to_path_buf()];
        let common = repo.repo().commondir().to_path_buf();
        if !roots.contains(&common) {
            roots.push(common);
        }
        // Some platforms report canonical paths
        let mut git_dirs = roots.clone();
        for root in &roots {
            if let Ok(canonical) = root.canonicalize() {
                if !git_dirs.contains(&canonical) {
                    git_dirs.push(canonical);
                }
            }
        }

        let (sender, changes) = mpsc::unbounded_channel();
        let handler_dirs = git_dirs.clone();
        let mut debouncer = new_debouncer(DEBOUNCE, move |result: DebounceEventResult| {
            let events = match result {
                Ok(events) => events,
                Err(e) => {
                    warn!("Repository watcher error: {}", e);
                    return;
                }
            };
            let change = events
                .iter()
                .filter(|event| event.kind == DebouncedEventKind::Any)
                .filter_map(|event| classify_change(&handler_dirs, &event.path))
                .max();
            if let Some(change) = change {
                debug!("Repository changed: {:?}", change);
                if sender.send(change).is_ok() {
                    wake();
                }
            }
        })?;

        for root in &roots {
            debouncer.watcher().watch(root, RecursiveMode::Recursive)?;
        }
        info!("Watching {:?} for ref changes", roots);

        Ok(Self {
            _debouncer: debouncer,
            changes,
        })
    }

    /// Drain queued changes. Returns the most significant one.
    pub fn poll(&mut self) -> Option<RepositoryChange> {
        let mut latest = None;
        while let Ok(change) = self.changes.try_recv() {
            latest = latest.max(Some(change));
        }
        latest
    }
}

impl std::fmt::Debug for RepositoryWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryWatcher").finish_non_exhaustive()
    }
}
