use eframe::egui;

use crate::graph::ColorAssigner;
use crate::models::{BranchLabel, GraphNode, ParentConnection, RefKind};
use crate::state::GraphSettings;

const CURVE_SEGMENTS: usize = 10;

/// Screen-space geometry for graph rows whose content starts at `origin`.
#[derive(Debug, Clone, Copy)]
pub struct GraphGeometry {
    pub origin: egui::Pos2,
    pub lane_width: f32,
    pub row_height: f32,
    pub node_radius: f32,
}

impl GraphGeometry {
    pub fn new(origin: egui::Pos2, settings: &GraphSettings) -> Self {
        Self {
            origin,
            lane_width: settings.lane_width,
            row_height: settings.row_height,
            node_radius: settings.node_radius,
        }
    }

    pub fn node_center(&self, lane: usize, row: usize) -> egui::Pos2 {
        egui::Pos2::new(
            self.origin.x + (lane as f32 + 0.5) * self.lane_width,
            self.origin.y + (row as f32 + 0.5) * self.row_height,
        )
    }

    /// Width of the graph column for `lane_count` lanes plus a gutter.
    pub fn graph_width(&self, lane_count: usize) -> f32 {
        (lane_count.max(1) as f32 + 0.5) * self.lane_width
    }

    /// Polyline for an edge from `node` to one of its parents.
    ///
    /// Lane changes bend inside the child's row and then run straight down
    /// the parent's lane, which stays reserved for the parent until its row.
    pub fn connection_points(&self, node: &GraphNode, conn: &ParentConnection) -> Vec<egui::Pos2> {
        let start = self.node_center(node.lane, node.row);
        let end = self.node_center(conn.parent_lane, conn.parent_row);

        if conn.kind.is_straight() || conn.parent_row <= node.row {
            return vec![start, end];
        }

        let bend_end = self.node_center(conn.parent_lane, node.row + 1);
        let mid_y = (start.y + bend_end.y) / 2.0;
        let control1 = egui::Pos2::new(start.x, mid_y);
        let control2 = egui::Pos2::new(bend_end.x, mid_y);

        let mut points: Vec<egui::Pos2> = (0..=CURVE_SEGMENTS)
            .map(|i| {
                let t = i as f32 / CURVE_SEGMENTS as f32;
                cubic_bezier(start, control1, control2, bend_end, t)
            })
            .collect();
        if end.y > bend_end.y {
            points.push(end);
        }
        points
    }
}

/// Point on a cubic Bezier curve.
fn cubic_bezier(
    p0: egui::Pos2,
    p1: egui::Pos2,
    p2: egui::Pos2,
    p3: egui::Pos2,
    t: f32,
) -> egui::Pos2 {
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;
    let uuu = uu * u;
    let ttt = tt * t;

    let x = uuu * p0.x + 3.0 * uu * t * p1.x + 3.0 * u * tt * p2.x + ttt * p3.x;
    let y = uuu * p0.y + 3.0 * uu * t * p1.y + 3.0 * u * tt * p2.y + ttt * p3.y;

    egui::Pos2::new(x, y)
}

/// Draws graph primitives with a fixed geometry and palette.
pub struct GraphPainter<'a> {
    pub painter: &'a egui::Painter,
    pub geometry: GraphGeometry,
    pub colors: &'a ColorAssigner,
}

impl<'a> GraphPainter<'a> {
    pub fn draw_connection(&self, node: &GraphNode, conn: &ParentConnection) {
        let color = self.colors.lane_color(conn.parent_lane);
        let points = self.geometry.connection_points(node, conn);

        if conn.off_screen {
            let stroke = egui::Stroke::new(1.5, color.gamma_multiply(0.6));
            self.painter
                .extend(egui::Shape::dashed_line(&points, stroke, 3.0, 3.0));
        } else {
            self.painter
                .add(egui::Shape::line(points, egui::Stroke::new(2.0, color)));
        }
    }

    pub fn draw_node(&self, node: &GraphNode, is_selected: bool) {
        let center = self.geometry.node_center(node.lane, node.row);
        let color = self.colors.lane_color(node.lane);
        let radius = self.geometry.node_radius;
        let is_head = node.branch_labels.iter().any(|label| label.is_head);

        if node.commit.is_merge() {
            // Merges are drawn hollow
            self.painter.circle(
                center,
                radius,
                self.painter.ctx().style().visuals.panel_fill,
                egui::Stroke::new(2.0, color),
            );
        } else {
            self.painter
                .circle(center, radius, color, egui::Stroke::new(1.0, egui::Color32::BLACK));
        }

        if is_head {
            self.painter
                .circle_stroke(center, radius + 2.5, egui::Stroke::new(1.5, color));
        }
        if is_selected {
            self.painter
                .circle_stroke(center, radius + 4.0, egui::Stroke::new(2.0, egui::Color32::YELLOW));
        }
    }

    /// Draw labels left to right from `pos`; returns the x after the last one.
    pub fn draw_labels(&self, labels: &[BranchLabel], pos: egui::Pos2) -> f32 {
        let font = egui::FontId::proportional(11.0);
        let mut x = pos.x;

        for label in labels {
            let text = if label.is_head && label.kind != RefKind::DetachedHead {
                format!("HEAD → {}", label.name)
            } else {
                label.name.clone()
            };

            let galley = self
                .painter
                .layout_no_wrap(text, font.clone(), egui::Color32::WHITE);
            let padding = egui::vec2(4.0, 1.0);
            let rect = egui::Rect::from_min_size(
                egui::pos2(x, pos.y - galley.size().y / 2.0 - padding.y),
                galley.size() + padding * 2.0,
            );

            let fill = match label.kind {
                RefKind::RemoteBranch | RefKind::Tag => label.color.gamma_multiply(0.7),
                RefKind::LocalBranch | RefKind::DetachedHead => label.color,
            };
            self.painter.rect_filled(rect, 3.0, fill);
            self.painter
                .galley(rect.min + padding, galley, egui::Color32::WHITE);

            x = rect.max.x + 4.0;
        }

        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout;
    use crate::models::Commit;

    fn geometry() -> GraphGeometry {
        GraphGeometry {
            origin: egui::Pos2::new(10.0, 100.0),
            lane_width: 16.0,
            row_height: 26.0,
            node_radius: 4.0,
        }
    }

    #[test]
    fn test_node_center() {
        let center = geometry().node_center(2, 3);
        assert_eq!(center, egui::Pos2::new(10.0 + 40.0, 100.0 + 91.0));
    }

    #[test]
    fn test_straight_connection_is_one_segment() {
        let layout = layout(
            &[
                Commit::new("c2", vec!["c1".to_string()]),
                Commit::new("c1", vec![]),
            ],
            &[],
        );
        let node = &layout.nodes[0];
        let points = geometry().connection_points(node, &node.parent_connections[0]);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].x, points[1].x);
    }

    #[test]
    fn test_lane_change_bends_within_child_row() {
        let layout = layout(
            &[
                Commit::new("m", vec!["a".to_string(), "b".to_string()]),
                Commit::new("a", vec!["root".to_string()]),
                Commit::new("b", vec!["root".to_string()]),
                Commit::new("root", vec![]),
            ],
            &[],
        );
        let geometry = geometry();
        let merge = &layout.nodes[0];
        let side = &merge.parent_connections[1];
        let points = geometry.connection_points(merge, side);

        let start = geometry.node_center(merge.lane, merge.row);
        let bend_end = geometry.node_center(side.parent_lane, merge.row + 1);
        let end = geometry.node_center(side.parent_lane, side.parent_row);

        assert_eq!(points.first(), Some(&start));
        assert_eq!(points[CURVE_SEGMENTS], bend_end);
        assert_eq!(points.last(), Some(&end));
        assert_eq!(points.len(), CURVE_SEGMENTS + 2);
    }

    #[test]
    fn test_graph_width_reserves_at_least_one_lane() {
        assert_eq!(geometry().graph_width(0), 24.0);
        assert_eq!(geometry().graph_width(3), 56.0);
    }
}
