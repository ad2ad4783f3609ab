//! Lane assignment for an ordered commit list.
//!
//! The layout is a single forward pass over the commits. A row's lane is
//! chosen from a growable set of lane slots, each remembering which commit
//! id is expected to appear next in that lane:
//!
//! 1. A commit takes the lane that is waiting for it, otherwise the lowest
//!    free lane, otherwise a new lane on the right.
//! 2. The lane then waits for the commit's first parent. A root commit frees
//!    its lane. If another lane already waits for the first parent, the
//!    commit joins that lane and frees its own, so a commit id is never
//!    awaited by two lanes at once.
//! 3. Every further parent gets the lane already waiting for it, or the
//!    lowest free lane, or a new lane.
//!
//! A lane waiting for a commit keeps waiting until that commit's row, so the
//! lane recorded for a parent at its child's row is the lane the parent ends
//! up in. That lets connections be emitted during the same pass.

use std::collections::HashMap;
use tracing::debug;

use crate::graph::ColorAssigner;
use crate::models::{
    BranchHead, BranchLabel, Commit, ConnectionKind, GraphLayout, GraphNode, ParentConnection,
};

/// Lay out `commits` in the given order using the built-in palettes.
pub fn layout(commits: &[Commit], heads: &[BranchHead]) -> GraphLayout {
    let colors = ColorAssigner::for_heads(heads);
    layout_with_colors(commits, heads, &colors)
}

/// Lay out `commits` in the given order, coloring branch labels with
/// `colors`. The caller is expected to have assigned `heads` to `colors`.
pub fn layout_with_colors(
    commits: &[Commit],
    heads: &[BranchHead],
    colors: &ColorAssigner,
) -> GraphLayout {
    if commits.is_empty() {
        return GraphLayout::default();
    }

    let rows: HashMap<&str, usize> = commits
        .iter()
        .enumerate()
        .map(|(row, commit)| (commit.id.as_str(), row))
        .collect();

    let mut heads_by_commit: HashMap<&str, Vec<&BranchHead>> = HashMap::new();
    for head in heads {
        heads_by_commit
            .entry(head.commit_id.as_str())
            .or_default()
            .push(head);
    }

    let mut track = LaneTrack::default();
    let mut nodes = Vec::with_capacity(commits.len());

    for (row, commit) in commits.iter().enumerate() {
        let lane = track.occupy(&commit.id);
        let mut parent_lanes = Vec::with_capacity(commit.parent_ids.len());

        match commit.parent_ids.first() {
            None => track.release(lane),
            Some(first) => match track.lane_of(first) {
                Some(existing) if existing != lane => {
                    track.release(lane);
                    parent_lanes.push(existing);
                }
                _ => {
                    track.assign(lane, first);
                    parent_lanes.push(lane);
                }
            },
        }

        for parent in commit.parent_ids.iter().skip(1) {
            let side = match track.lane_of(parent) {
                Some(existing) => existing,
                None => {
                    let free = track.free_lane();
                    track.assign(free, parent);
                    free
                }
            };
            parent_lanes.push(side);
        }

        debug_assert!(track.is_consistent(), "lane awaited twice at row {row}");

        let parent_connections = commit
            .parent_ids
            .iter()
            .zip(parent_lanes)
            .enumerate()
            .map(|(index, (parent_id, parent_lane))| match rows.get(parent_id.as_str()) {
                Some(&parent_row) => ParentConnection {
                    parent_id: parent_id.clone(),
                    parent_lane,
                    parent_row,
                    kind: ConnectionKind::classify(lane, parent_lane, index),
                    off_screen: false,
                },
                None => ParentConnection {
                    parent_id: parent_id.clone(),
                    parent_lane: lane,
                    parent_row: row + 1,
                    kind: ConnectionKind::Straight,
                    off_screen: true,
                },
            })
            .collect();

        let branch_labels = heads_by_commit
            .get(commit.id.as_str())
            .map(|heads| {
                heads
                    .iter()
                    .map(|head| BranchLabel {
                        name: head.name.clone(),
                        is_head: head.is_head,
                        kind: head.kind,
                        color: colors.branch_color(&head.name),
                    })
                    .collect()
            })
            .unwrap_or_default();

        nodes.push(GraphNode {
            commit: commit.clone(),
            lane,
            row,
            max_active_lane: track.highest_active().unwrap_or(0),
            parent_connections,
            branch_labels,
        });
    }

    let max_lane = track.highest_allocated();
    debug!("Laid out {} commits across {} lanes", nodes.len(), max_lane + 1);

    GraphLayout { nodes, max_lane }
}

/// Lane slots for one layout pass. `None` marks a free lane.
#[derive(Debug, Default)]
struct LaneTrack<'a> {
    slots: Vec<Option<&'a str>>,
}

impl<'a> LaneTrack<'a> {
    fn lane_of(&self, id: &str) -> Option<usize> {
        self.slots.iter().position(|slot| *slot == Some(id))
    }

    /// Lowest free lane, growing the track when every lane is in use.
    fn free_lane(&mut self) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(lane) => lane,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        }
    }

    fn occupy(&mut self, id: &str) -> usize {
        match self.lane_of(id) {
            Some(lane) => lane,
            None => self.free_lane(),
        }
    }

    fn assign(&mut self, lane: usize, id: &'a str) {
        self.slots[lane] = Some(id);
    }

    fn release(&mut self, lane: usize) {
        self.slots[lane] = None;
    }

    fn highest_active(&self) -> Option<usize> {
        self.slots.iter().rposition(Option::is_some)
    }

    fn highest_allocated(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    fn is_consistent(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.slots.iter().flatten().all(|id| seen.insert(*id))
    }
}
