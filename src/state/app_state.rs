use tracing::{debug, info};

use crate::git::{CommitHistory, GitError, GitRepository, RefSelection};
use crate::graph::{layout_with_colors, ColorAssigner, GraphEvent};
use crate::models::{BranchHead, Commit, GraphLayout, RepositoryInfo};
use crate::state::AppConfig;

/// Everything outside the graph core: loaded commits and heads, the current
/// layout, and the selection that the graph only ever reads.
#[derive(Debug)]
pub struct AppState {
    pub repository: Option<GitRepository>,
    pub commits: Vec<Commit>,
    pub heads: Vec<BranchHead>,
    pub layout: GraphLayout,
    pub selected_commit: Option<String>,
    pub open_commit: Option<String>,
    pub error_message: Option<String>,
    history: Option<CommitHistory>,
    colors: ColorAssigner,
    ref_selection: RefSelection,
    batch_size: usize,
    commit_limit: usize,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let mut state = Self {
            repository: None,
            commits: Vec::new(),
            heads: Vec::new(),
            layout: GraphLayout::default(),
            selected_commit: None,
            open_commit: None,
            error_message: None,
            history: None,
            colors: ColorAssigner::default(),
            ref_selection: RefSelection::default(),
            batch_size: 1,
            commit_limit: 0,
        };
        state.apply_config(config);
        state
    }

    /// Pick up palette, ref and batching settings. Relays out if needed.
    pub fn apply_config(&mut self, config: &AppConfig) {
        match config.color_assigner() {
            Ok(colors) => self.colors = colors,
            Err(e) => {
                e.log("applying palettes");
                self.colors = ColorAssigner::default();
            }
        }
        self.colors.assign_branches(&self.heads);
        self.ref_selection = config.ref_selection();
        self.batch_size = config.performance.commit_batch_size.max(1);
        self.commit_limit = config.performance.max_commits_to_load;
        self.relayout();
    }

    pub fn colors(&self) -> &ColorAssigner {
        &self.colors
    }

    pub fn has_repository(&self) -> bool {
        self.repository.is_some()
    }

    pub fn repository_info(&self) -> Option<&RepositoryInfo> {
        self.repository.as_ref().map(|repo| repo.info())
    }

    pub fn set_repository(&mut self, repo: GitRepository) {
        info!("Opening repository '{}'", repo.info().name);
        self.repository = Some(repo);
        self.selected_commit = None;
        self.open_commit = None;
        self.commits.clear();
        self.refresh();
    }

    /// Re-read branch heads and restart the history from the newest commit,
    /// loading at least as many commits as were shown before.
    pub fn refresh(&mut self) {
        if let Err(e) = self.try_refresh() {
            self.report(e, "refreshing repository");
        }
    }

    fn try_refresh(&mut self) -> Result<(), GitError> {
        let shown = self.commits.len();
        let Some(repo) = self.repository.as_mut() else {
            return Ok(());
        };
        repo.refresh_info()?;
        let heads = repo.branch_heads(self.ref_selection)?;

        let (history, commits) = if repo.info().is_empty {
            debug!("Repository has no commits yet");
            (CommitHistory::empty(), Vec::new())
        } else {
            let mut history = CommitHistory::new(self.batch_size, self.commit_limit);
            let mut commits = history.load_next_batch(repo)?.commits;
            while commits.len() < shown && !history.is_complete() {
                commits.extend(history.load_next_batch(repo)?.commits);
            }
            (history, commits)
        };

        self.history = Some(history);
        self.commits = commits;
        self.set_heads(heads);
        Ok(())
    }

    pub fn has_more_commits(&self) -> bool {
        self.history
            .as_ref()
            .is_some_and(|history| !history.is_complete())
    }

    /// Append the next batch of history and lay everything out again.
    pub fn load_more(&mut self) {
        if let Err(e) = self.try_load_more() {
            self.report(e, "loading more commits");
        }
    }

    fn try_load_more(&mut self) -> Result<(), GitError> {
        let (Some(repo), Some(history)) = (self.repository.as_ref(), self.history.as_mut()) else {
            return Ok(());
        };
        if history.is_complete() {
            return Ok(());
        }
        let batch = match history.load_next_batch(repo) {
            Ok(batch) => batch,
            Err(e) => {
                history.abandon();
                return Err(e);
            }
        };
        debug!(
            "Loaded {} more commits ({} total, more: {})",
            batch.commits.len(),
            batch.total_loaded,
            batch.has_more
        );
        self.commits.extend(batch.commits);
        self.relayout();
        Ok(())
    }

    /// Replace the commit list. The layout is recomputed from scratch.
    pub fn set_commits(&mut self, commits: Vec<Commit>) {
        self.commits = commits;
        self.relayout();
    }

    /// Replace the branch heads. Branch colors follow the new head order.
    pub fn set_heads(&mut self, heads: Vec<BranchHead>) {
        self.heads = heads;
        self.colors.assign_branches(&self.heads);
        self.relayout();
    }

    pub fn relayout(&mut self) {
        self.layout = layout_with_colors(&self.commits, &self.heads, &self.colors);
    }

    pub fn handle_graph_event(&mut self, event: GraphEvent) {
        match event {
            GraphEvent::Activate { commit_id } => {
                self.selected_commit = Some(commit_id);
            }
            GraphEvent::Open { commit_id } => {
                self.selected_commit = Some(commit_id.clone());
                self.open_commit = Some(commit_id);
            }
        }
    }

    /// Resolve `revision` in the open repository and select the commit.
    /// Returns the commit id when it is among the loaded rows.
    pub fn select_revision(&mut self, revision: &str) -> Option<String> {
        let repo = self.repository.as_ref()?;
        let id = match repo.resolve_commit(revision) {
            Ok(id) => id,
            Err(e) => {
                self.report(e, "resolving revision");
                return None;
            }
        };
        if self.layout.row_of(&id).is_none() {
            self.error_message = Some(format!(
                "'{}' is not among the {} loaded commits",
                revision.trim(),
                self.layout.len()
            ));
            return None;
        }
        self.selected_commit = Some(id.clone());
        Some(id)
    }

    pub fn selected_commit_details(&self) -> Option<&Commit> {
        let id = self.selected_commit.as_deref()?;
        let row = self.layout.row_of(id)?;
        self.layout.node(row).map(|node| &node.commit)
    }

    pub fn open_commit_details(&self) -> Option<&Commit> {
        let id = self.open_commit.as_deref()?;
        self.commits.iter().find(|commit| commit.id == id)
    }

    pub fn close_commit_details(&mut self) {
        self.open_commit = None;
    }

    pub fn clear_error(&mut self) {
        self.error_message = None;
    }

    fn report(&mut self, error: GitError, context: &str) {
        error.log(context);
        self.error_message = Some(error.user_friendly_message());
    }
}
