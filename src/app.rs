use anyhow::Context;
use eframe::egui;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::git::{GitRepository, RepositoryChange, RepositoryWatcher};
use crate::graph::{GraphEvent, InteractionLayer};
use crate::models::Commit;
use crate::state::{AppConfig, AppState};
use crate::ui::CommitGraphView;

pub struct LaneGraphApp {
    state: AppState,
    config: AppConfig,
    graph_view: CommitGraphView,
    events: UnboundedReceiver<GraphEvent>,
    visible_rows: std::ops::Range<usize>,
    goto_revision: String,
    watcher: Option<RepositoryWatcher>,
    watch_pending: bool,
}

impl LaneGraphApp {
    pub fn new(config: AppConfig, initial_repository: Option<PathBuf>) -> Self {
        let (interaction, events) = InteractionLayer::new();
        let mut app = Self {
            state: AppState::new(&config),
            graph_view: CommitGraphView::new(&config.graph, interaction),
            config,
            events,
            visible_rows: 0..0,
            goto_revision: String::new(),
            watcher: None,
            watch_pending: false,
        };

        if let Some(path) = initial_repository {
            app.open_repository(path);
        }
        app
    }

    fn open_repository(&mut self, path: PathBuf) {
        if let Err(e) = self.try_open_repository(&path) {
            warn!("{:#}", e);
            if !path.exists() {
                self.config.remove_recent_repository(&path);
            }
            self.state.error_message = Some(format!("{:#}", e));
        }
    }

    fn try_open_repository(&mut self, path: &Path) -> anyhow::Result<()> {
        let repo = GitRepository::discover(path)
            .with_context(|| format!("Failed to open repository at {}", path.display()))?;
        self.config.add_recent_repository(repo.info().path.clone());
        self.state.set_repository(repo);
        self.set_watching(self.config.refs.watch_for_changes);
        self.jump_to_head();
        self.config.save().context("Failed to save settings")?;
        Ok(())
    }

    fn pick_repository(&mut self) {
        if let Some(path) = rfd::FileDialog::new().pick_folder() {
            self.open_repository(path);
        }
    }

    fn jump_to_head(&mut self) {
        match self.state.layout.head_row() {
            Some(row) => self.graph_view.jump_to(row),
            None => info!("HEAD is not among the loaded commits"),
        }
    }

    fn go_to_revision(&mut self) {
        if let Some(id) = self.state.select_revision(&self.goto_revision) {
            self.graph_view.jump_to_commit(&self.state.layout, &id);
        }
    }

    fn show_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("Go to:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut self.goto_revision)
                        .hint_text("commit id, branch or tag")
                        .desired_width(240.0),
                );
                let submitted =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                if submitted || ui.button("Go").clicked() {
                    self.go_to_revision();
                }

                ui.separator();

                if ui.button("Jump to HEAD").clicked() {
                    self.jump_to_head();
                }
            });
        });
    }

    /// Start a pending watcher and refresh if the repository changed on disk.
    fn update_watcher(&mut self, ctx: &egui::Context) {
        if std::mem::take(&mut self.watch_pending) {
            self.watcher = self.start_watcher(ctx);
        }

        let Some(change) = self.watcher.as_mut().and_then(|watcher| watcher.poll()) else {
            return;
        };
        info!("Repository changed on disk ({:?}), refreshing", change);
        self.state.refresh();
        if change == RepositoryChange::HeadMoved {
            self.jump_to_head();
        }
    }

    fn start_watcher(&self, ctx: &egui::Context) -> Option<RepositoryWatcher> {
        let repo = self.state.repository.as_ref()?;
        let ctx = ctx.clone();
        match RepositoryWatcher::start(repo, move || ctx.request_repaint()) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                e.log("watching repository");
                None
            }
        }
    }

    /// Drop the current watcher and start a new one on the next frame.
    fn set_watching(&mut self, enabled: bool) {
        self.watcher = None;
        self.watch_pending = enabled && self.state.has_repository();
    }

    fn refs_changed(&mut self) {
        self.state.apply_config(&self.config);
        self.state.refresh();
        if let Err(e) = self.config.save() {
            e.log("saving settings");
        }
    }

    /// Hand queued graph events to the state. Returns true if any arrived.
    fn drain_graph_events(&mut self) -> bool {
        let mut received = false;
        while let Ok(event) = self.events.try_recv() {
            self.state.handle_graph_event(event);
            received = true;
        }
        received
    }

    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Repository...").clicked() {
                        ui.close();
                        self.pick_repository();
                    }

                    ui.menu_button("Recent Repositories", |ui| {
                        if self.config.recent_repositories.is_empty() {
                            ui.label("None");
                        }
                        for path in self.config.recent_repositories.clone() {
                            if ui.button(path.display().to_string()).clicked() {
                                ui.close();
                                self.open_repository(path);
                            }
                        }
                    });

                    ui.separator();

                    if ui.button("Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("View", |ui| {
                    let has_repo = self.state.has_repository();
                    if ui.add_enabled(has_repo, egui::Button::new("Refresh")).clicked() {
                        self.state.refresh();
                        ui.close();
                    }
                    if ui
                        .add_enabled(self.state.has_more_commits(), egui::Button::new("Load More"))
                        .clicked()
                    {
                        self.state.load_more();
                        ui.close();
                    }
                    if ui.add_enabled(has_repo, egui::Button::new("Jump to HEAD")).clicked() {
                        self.jump_to_head();
                        ui.close();
                    }

                    ui.separator();

                    let remote = ui
                        .checkbox(
                            &mut self.config.refs.show_remote_branches,
                            "Show Remote Branches",
                        )
                        .changed();
                    let tags = ui.checkbox(&mut self.config.refs.show_tags, "Show Tags").changed();
                    if remote || tags {
                        self.refs_changed();
                    }

                    if ui
                        .checkbox(
                            &mut self.config.refs.watch_for_changes,
                            "Refresh on Repository Changes",
                        )
                        .changed()
                    {
                        self.set_watching(self.config.refs.watch_for_changes);
                        if let Err(e) = self.config.save() {
                            e.log("saving settings");
                        }
                    }
                });
            });
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(repo_info) = self.state.repository_info() {
                    ui.label(format!("Repository: {}", repo_info.name));
                    ui.separator();
                    if let Some(head) = &repo_info.head {
                        ui.label(format!("HEAD: {}", head));
                        ui.separator();
                    }
                    let more = if self.state.has_more_commits() { "+" } else { "" };
                    ui.label(format!("Commits: {}{}", self.state.commits.len(), more));
                    ui.separator();
                    ui.label(format!("Lanes: {}", self.state.layout.lane_count()));
                } else {
                    ui.label("No repository opened");
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !self.visible_rows.is_empty() {
                        ui.label(format!(
                            "Rows {}-{}",
                            self.visible_rows.start + 1,
                            self.visible_rows.end
                        ));
                    }
                });
            });
        });
    }

    fn show_details_panel(&mut self, ctx: &egui::Context) {
        let Some(commit) = self.state.selected_commit_details() else {
            return;
        };
        let mut close = false;
        egui::SidePanel::right("commit_details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Commit");
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        close = ui.small_button("✕").clicked();
                    });
                });
                ui.separator();
                commit_details(ui, commit);
            });
        if close {
            self.state.selected_commit = None;
        }
    }

    fn show_open_commit_window(&mut self, ctx: &egui::Context) {
        let Some(commit) = self.state.open_commit_details() else {
            return;
        };
        let mut open = true;
        egui::Window::new(format!("Commit {}", commit.short_id))
            .open(&mut open)
            .default_width(520.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    commit_details(ui, commit);
                    ui.separator();
                    ui.label(egui::RichText::new(&commit.message).monospace());
                });
            });
        if !open {
            self.state.close_commit_details();
        }
    }

    fn show_error_dialog(&mut self, ctx: &egui::Context) {
        if let Some(error) = self.state.error_message.clone() {
            egui::Window::new("Error")
                .collapsible(false)
                .resizable(false)
                .show(ctx, |ui| {
                    ui.label(&error);
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            self.state.clear_error();
                        }
                    });
                });
        }
    }

    fn show_welcome_screen(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);
            ui.heading("lanegraph");
            ui.add_space(20.0);
            ui.label("Browse the branch and merge history of a Git repository");
            ui.add_space(40.0);

            if ui.button("Open Repository").clicked() {
                self.pick_repository();
            }

            ui.add_space(20.0);

            if !self.config.recent_repositories.is_empty() {
                ui.label("Recent Repositories:");
                ui.add_space(10.0);

                for repo_path in self.config.recent_repositories.clone().into_iter().take(5) {
                    let display_name = repo_path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("Unknown")
                        .to_string();

                    if ui
                        .button(display_name)
                        .on_hover_text(repo_path.display().to_string())
                        .clicked()
                    {
                        self.open_repository(repo_path);
                    }
                }
            }
        });
    }

    fn handle_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::CTRL, egui::Key::O)) {
            self.pick_repository();
        }

        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::CTRL, egui::Key::Q)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if !self.state.has_repository() {
            return;
        }

        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::F5)) {
            self.state.refresh();
        }

        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::CTRL, egui::Key::H)) {
            self.jump_to_head();
        }

        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::Home)) {
            self.graph_view.jump_to(0);
        }

        if ctx.input_mut(|i| i.consume_key(egui::Modifiers::NONE, egui::Key::End)) {
            if let Some(last) = self.state.layout.len().checked_sub(1) {
                self.graph_view.jump_to(last);
            }
        }
    }

    fn track_window_size(&mut self, ctx: &egui::Context) {
        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.config.window_size = (rect.width(), rect.height());
        }
    }
}

fn commit_details(ui: &mut egui::Ui, commit: &Commit) {
    egui::Grid::new(("commit_details", &commit.id))
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Id");
            ui.label(egui::RichText::new(&commit.id).monospace());
            ui.end_row();

            ui.label("Author");
            ui.label(format!("{} <{}>", commit.author.name, commit.author.email));
            ui.end_row();

            ui.label("Date");
            ui.label(commit.author.when.format("%Y-%m-%d %H:%M:%S UTC").to_string());
            ui.end_row();

            ui.label("Parents");
            ui.vertical(|ui| {
                for parent in &commit.parent_ids {
                    ui.label(egui::RichText::new(parent).monospace());
                }
            });
            ui.end_row();
        });

    ui.add_space(8.0);
    ui.label(egui::RichText::new(&commit.summary).strong());
}

impl eframe::App for LaneGraphApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keyboard_shortcuts(ctx);
        self.track_window_size(ctx);
        self.update_watcher(ctx);

        self.show_menu_bar(ctx);
        if self.state.has_repository() {
            self.show_toolbar(ctx);
        }
        self.show_status_bar(ctx);
        self.show_error_dialog(ctx);
        self.show_details_panel(ctx);
        self.show_open_commit_window(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            if !self.state.has_repository() {
                self.show_welcome_screen(ui);
                return;
            }
            if self.state.layout.is_empty() {
                ui.label("No commits to display");
                return;
            }

            self.visible_rows = self.graph_view.show(
                ui,
                &self.state.layout,
                self.state.colors(),
                self.state.selected_commit.as_deref(),
            );

            let at_end = self.visible_rows.end == self.state.layout.len();
            if at_end && self.state.has_more_commits() && self.state.error_message.is_none() {
                self.state.load_more();
                ctx.request_repaint();
            }
        });

        if self.drain_graph_events() {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, _storage: &mut dyn eframe::Storage) {
        if let Err(e) = self.config.save() {
            e.log("saving settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_repository_reports_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let missing = dir.path().join("gone");

        let mut config = AppConfig::default();
        config.add_recent_repository(missing.clone());

        let mut app = LaneGraphApp::new(config, None);
        app.open_repository(missing.clone());

        assert!(!app.state.has_repository());
        assert!(app.state.error_message.is_some());
        assert!(!app.config.recent_repositories.contains(&missing));
    }

    #[test]
    fn test_opening_repository_starts_watcher() {
        let dir = tempfile::TempDir::new().unwrap();
        git2::Repository::init(dir.path()).unwrap();
        let ctx = egui::Context::default();

        let mut app = LaneGraphApp::new(AppConfig::default(), None);
        app.state.set_repository(GitRepository::open(dir.path()).unwrap());
        app.set_watching(true);
        assert!(app.watch_pending);

        app.update_watcher(&ctx);
        assert!(!app.watch_pending);
        assert!(app.watcher.is_some());

        app.set_watching(false);
        app.update_watcher(&ctx);
        assert!(app.watcher.is_none());
    }

    #[test]
    fn test_graph_events_reach_state() {
        let mut app = LaneGraphApp::new(AppConfig::default(), None);
        app.state.set_commits(vec![Commit::new("c1", vec![])]);

        let (layer, events) = InteractionLayer::new();
        app.events = events;
        layer.on_pointer(&app.state.layout, 0, crate::graph::PointerAction::Primary);

        assert!(app.drain_graph_events());
        assert_eq!(app.state.selected_commit.as_deref(), Some("c1"));
        assert!(!app.drain_graph_events());
    }
}
