use eframe::egui::Color32;
use std::ops::Range;

use crate::models::{Commit, RefKind};

/// How a line from a commit bends toward one of its parents.
///
/// The kind is derived purely from the relative lane positions of the two
/// ends. `Merge*` is used for a first parent, `Branch*` for any later parent;
/// the distinction only changes the drawing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    Straight,
    MergeLeft,
    MergeRight,
    BranchLeft,
    BranchRight,
}

impl ConnectionKind {
    pub fn classify(node_lane: usize, parent_lane: usize, parent_index: usize) -> Self {
        let first_parent = parent_index == 0;
        if parent_lane < node_lane {
            if first_parent {
                ConnectionKind::MergeLeft
            } else {
                ConnectionKind::BranchLeft
            }
        } else if parent_lane > node_lane {
            if first_parent {
                ConnectionKind::MergeRight
            } else {
                ConnectionKind::BranchRight
            }
        } else {
            ConnectionKind::Straight
        }
    }

    pub fn is_straight(self) -> bool {
        self == ConnectionKind::Straight
    }
}

/// Geometry of one edge from a node to a parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentConnection {
    pub parent_id: String,
    pub parent_lane: usize,
    pub parent_row: usize,
    pub kind: ConnectionKind,
    /// True when the parent is not part of the laid out commits and the
    /// edge is a synthetic "continues below" marker.
    pub off_screen: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchLabel {
    pub name: String,
    pub is_head: bool,
    pub kind: RefKind,
    pub color: Color32,
}

/// One laid out commit. Produced in a batch by the layout engine and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    pub commit: Commit,
    pub lane: usize,
    pub row: usize,
    pub max_active_lane: usize,
    pub parent_connections: Vec<ParentConnection>,
    pub branch_labels: Vec<BranchLabel>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphLayout {
    pub nodes: Vec<GraphNode>,
    pub max_lane: usize,
}

impl GraphLayout {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of lane columns a renderer needs to reserve.
    pub fn lane_count(&self) -> usize {
        if self.nodes.is_empty() {
            0
        } else {
            self.max_lane + 1
        }
    }

    pub fn node(&self, row: usize) -> Option<&GraphNode> {
        self.nodes.get(row)
    }

    pub fn row_of(&self, commit_id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.commit.id == commit_id)
    }

    /// Row of the commit the checked out branch (or detached HEAD) points at.
    pub fn head_row(&self) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.branch_labels.iter().any(|label| label.is_head))
    }

    /// Every parent connection whose vertical span touches `rows`.
    ///
    /// Edges are stored on the child, so an edge crossing the window from a
    /// child above it is still reported. Only children up to `rows.end` are
    /// scanned since an edge always runs downwards.
    pub fn connections_through(
        &self,
        rows: Range<usize>,
    ) -> impl Iterator<Item = (&GraphNode, &ParentConnection)> + '_ {
        let end = rows.end.min(self.nodes.len());
        let start = rows.start;
        self.nodes[..end].iter().flat_map(move |node| {
            node.parent_connections
                .iter()
                .filter(move |conn| conn.parent_row.max(node.row) >= start)
                .map(move |conn| (node, conn))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(2, 2, 0 => ConnectionKind::Straight ; "same lane first parent")]
    #[test_case(2, 2, 1 => ConnectionKind::Straight ; "same lane second parent")]
    #[test_case(2, 0, 0 => ConnectionKind::MergeLeft ; "left first parent")]
    #[test_case(2, 0, 1 => ConnectionKind::BranchLeft ; "left second parent")]
    #[test_case(0, 3, 0 => ConnectionKind::MergeRight ; "right first parent")]
    #[test_case(0, 3, 2 => ConnectionKind::BranchRight ; "right octopus parent")]
    fn test_classify(node_lane: usize, parent_lane: usize, index: usize) -> ConnectionKind {
        ConnectionKind::classify(node_lane, parent_lane, index)
    }

    fn node(row: usize, parent_rows: &[usize]) -> GraphNode {
        GraphNode {
            commit: Commit::new(format!("c{row}"), vec![]),
            lane: 0,
            row,
            max_active_lane: 0,
            parent_connections: parent_rows
                .iter()
                .map(|&parent_row| ParentConnection {
                    parent_id: format!("c{parent_row}"),
                    parent_lane: 0,
                    parent_row,
                    kind: ConnectionKind::Straight,
                    off_screen: false,
                })
                .collect(),
            branch_labels: Vec::new(),
        }
    }

    #[test]
    fn test_connections_through_includes_edges_from_above() {
        let layout = GraphLayout {
            nodes: vec![node(0, &[9]), node(1, &[2]), node(2, &[3]), node(3, &[])],
            max_lane: 0,
        };

        let rows: Vec<(usize, usize)> = layout
            .connections_through(3..4)
            .map(|(node, conn)| (node.row, conn.parent_row))
            .collect();
        assert_eq!(rows, vec![(0, 9), (2, 3)]);
    }

    #[test]
    fn test_lane_count_of_empty_layout() {
        let layout = GraphLayout::default();
        assert_eq!(layout.lane_count(), 0);
        assert!(layout.head_row().is_none());
    }
}
