use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::warn;

use crate::models::GraphLayout;

/// Outbound events produced by pointer activity on graph rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphEvent {
    /// Primary click on a row.
    Activate { commit_id: String },
    /// Secondary activation (double click) on a row.
    Open { commit_id: String },
}

impl GraphEvent {
    pub fn commit_id(&self) -> &str {
        match self {
            GraphEvent::Activate { commit_id } | GraphEvent::Open { commit_id } => commit_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Primary,
    Secondary,
}

/// Translates pointer activity on rendered rows into [`GraphEvent`]s.
///
/// Selection is owned by whoever consumes the events; the layer only reads
/// the selected id it is handed when asked what to highlight.
#[derive(Debug, Clone)]
pub struct InteractionLayer {
    sender: UnboundedSender<GraphEvent>,
}

impl InteractionLayer {
    pub fn new() -> (Self, UnboundedReceiver<GraphEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Emit the event for `action` on `row`. Returns the event that was sent,
    /// or `None` if the row does not exist.
    pub fn on_pointer(
        &self,
        layout: &GraphLayout,
        row: usize,
        action: PointerAction,
    ) -> Option<GraphEvent> {
        let node = layout.node(row)?;
        let commit_id = node.commit.id.clone();
        let event = match action {
            PointerAction::Primary => GraphEvent::Activate { commit_id },
            PointerAction::Secondary => GraphEvent::Open { commit_id },
        };

        if self.sender.send(event.clone()).is_err() {
            warn!("Dropping {:?}: no listener for graph events", event);
        }
        Some(event)
    }

    pub fn is_highlighted(commit_id: &str, selected_commit_id: Option<&str>) -> bool {
        selected_commit_id == Some(commit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::layout;
    use crate::models::Commit;

    fn sample_layout() -> GraphLayout {
        layout(
            &[
                Commit::new("c2", vec!["c1".to_string()]),
                Commit::new("c1", vec![]),
            ],
            &[],
        )
    }

    #[test]
    fn test_pointer_actions_map_to_events() {
        let (layer, mut events) = InteractionLayer::new();
        let layout = sample_layout();

        layer.on_pointer(&layout, 1, PointerAction::Primary);
        layer.on_pointer(&layout, 0, PointerAction::Secondary);

        assert_eq!(
            events.try_recv().unwrap(),
            GraphEvent::Activate {
                commit_id: "c1".to_string()
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            GraphEvent::Open {
                commit_id: "c2".to_string()
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_pointer_outside_layout_is_ignored() {
        let (layer, mut events) = InteractionLayer::new();
        assert!(layer
            .on_pointer(&sample_layout(), 5, PointerAction::Primary)
            .is_none());
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_closed_receiver_does_not_panic() {
        let (layer, events) = InteractionLayer::new();
        drop(events);
        let event = layer.on_pointer(&sample_layout(), 0, PointerAction::Primary);
        assert_eq!(event.map(|e| e.commit_id().to_string()), Some("c2".to_string()));
    }

    #[test]
    fn test_highlight_uses_external_selection() {
        assert!(InteractionLayer::is_highlighted("c1", Some("c1")));
        assert!(!InteractionLayer::is_highlighted("c1", Some("c2")));
        assert!(!InteractionLayer::is_highlighted("c1", None));
    }
}
