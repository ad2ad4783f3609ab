use std::ops::Range;

use eframe::egui;
use tracing::debug;

use crate::graph::{ColorAssigner, InteractionLayer, PointerAction, Viewport};
use crate::models::{GraphLayout, GraphNode};
use crate::state::GraphSettings;
use crate::ui::graph::{GraphGeometry, GraphPainter};

/// Virtualized commit list with the lane graph drawn in its left column.
///
/// Only rows in the viewport's visible range are painted or hit-tested.
/// Clicks become [`crate::graph::GraphEvent`]s on the interaction layer's
/// channel; the selection to highlight is passed in on every frame.
pub struct CommitGraphView {
    viewport: Viewport,
    interaction: InteractionLayer,
    settings: GraphSettings,
}

impl CommitGraphView {
    pub fn new(settings: &GraphSettings, interaction: InteractionLayer) -> Self {
        Self {
            viewport: Viewport::new(settings.row_height, settings.buffer_rows),
            interaction,
            settings: settings.clone(),
        }
    }

    /// Smoothly scroll so `commit_id` ends up in the middle of the list.
    pub fn jump_to_commit(&mut self, layout: &GraphLayout, commit_id: &str) -> bool {
        match layout.row_of(commit_id) {
            Some(row) => {
                self.jump_to(row);
                true
            }
            None => false,
        }
    }

    pub fn jump_to(&mut self, row: usize) {
        let request = self.viewport.scroll_to_commit(row);
        debug!("Scroll request {} to row {}", request.id, request.row);
    }

    /// Draw the list and return the rows that were rendered.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        layout: &GraphLayout,
        colors: &ColorAssigner,
        selected_commit: Option<&str>,
    ) -> Range<usize> {
        let total_rows = layout.len();
        let scroll_request = self.viewport.take_scroll_request();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show_viewport(ui, |ui, visible| {
                ui.set_height(self.viewport.content_height(total_rows));
                self.viewport.on_resize(visible.height());
                self.viewport.set_scroll_offset(visible.min.y);

                let content = ui.max_rect();
                if let Some(request) = scroll_request {
                    let target = egui::Rect::from_min_size(
                        egui::pos2(content.min.x, content.min.y + request.target),
                        egui::vec2(1.0, self.viewport.viewport_height()),
                    );
                    ui.scroll_to_rect(target, Some(egui::Align::TOP));
                }

                let rows = self.viewport.visible_range(total_rows);

                let response = ui.interact(
                    ui.clip_rect(),
                    ui.id().with("commit_rows"),
                    egui::Sense::click(),
                );
                let row_under = |pos: Option<egui::Pos2>| {
                    pos.and_then(|pos| self.viewport.row_at(pos.y - content.min.y, total_rows))
                };
                let hovered_row = row_under(response.hover_pos());
                let action = if response.double_clicked() {
                    row_under(response.interact_pointer_pos())
                        .map(|row| (row, PointerAction::Secondary))
                } else if response.clicked() {
                    row_under(response.interact_pointer_pos())
                        .map(|row| (row, PointerAction::Primary))
                } else {
                    None
                };

                let geometry = GraphGeometry::new(content.min, &self.settings);
                let graph_painter = GraphPainter {
                    painter: ui.painter(),
                    geometry,
                    colors,
                };
                let text_x = content.min.x + geometry.graph_width(layout.lane_count());

                for node in &layout.nodes[rows.clone()] {
                    let row_rect = egui::Rect::from_min_size(
                        egui::pos2(content.min.x, content.min.y + self.viewport.row_top(node.row)),
                        egui::vec2(content.width(), self.viewport.row_height()),
                    );
                    if InteractionLayer::is_highlighted(&node.commit.id, selected_commit) {
                        ui.painter()
                            .rect_filled(row_rect, 0.0, ui.visuals().selection.bg_fill);
                    } else if hovered_row == Some(node.row) {
                        ui.painter()
                            .rect_filled(row_rect, 0.0, ui.visuals().widgets.hovered.weak_bg_fill);
                    }
                }

                for (node, conn) in layout.connections_through(rows.clone()) {
                    graph_painter.draw_connection(node, conn);
                }

                for node in &layout.nodes[rows.clone()] {
                    let is_selected =
                        InteractionLayer::is_highlighted(&node.commit.id, selected_commit);
                    graph_painter.draw_node(node, is_selected);
                    draw_row_text(ui, &graph_painter, node, text_x, is_selected);
                }

                if let Some((row, action)) = action {
                    self.interaction.on_pointer(layout, row, action);
                }

                rows
            })
            .inner
    }
}

fn draw_row_text(
    ui: &egui::Ui,
    graph_painter: &GraphPainter<'_>,
    node: &GraphNode,
    text_x: f32,
    is_selected: bool,
) {
    let painter = graph_painter.painter;
    let center_y = graph_painter.geometry.node_center(node.lane, node.row).y;
    let text_color = if is_selected {
        ui.visuals().selection.stroke.color
    } else {
        ui.visuals().text_color()
    };

    let id_rect = painter.text(
        egui::pos2(text_x, center_y),
        egui::Align2::LEFT_CENTER,
        &node.commit.short_id,
        egui::FontId::monospace(12.0),
        ui.visuals().weak_text_color(),
    );

    let x = graph_painter.draw_labels(
        &node.branch_labels,
        egui::pos2(id_rect.max.x + 8.0, center_y),
    );

    let summary_rect = painter.text(
        egui::pos2(x + 4.0, center_y),
        egui::Align2::LEFT_CENTER,
        &node.commit.summary,
        egui::FontId::proportional(12.0),
        text_color,
    );

    let meta = format!(
        "{}  {}",
        node.commit.author.name,
        node.commit.author.when.format("%Y-%m-%d %H:%M")
    );
    painter.text(
        egui::pos2(summary_rect.max.x + 12.0, center_y),
        egui::Align2::LEFT_CENTER,
        meta,
        egui::FontId::proportional(11.0),
        ui.visuals().weak_text_color(),
    );
}
