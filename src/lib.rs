//! # lanegraph
//!
//! An interactive, multi-lane commit graph for Git repositories.
//!
//! The library turns an ordered commit history and its branch heads into a
//! lane layout, renders only the rows currently in view, and reports clicks
//! on rows as events for the surrounding application to act on.
//!
//! ## Architecture
//!
//! - [`graph`] - lane layout, coloring, viewport and interaction (no I/O)
//! - [`git`] - repository access, branch heads, batched history and the
//!   change watcher
//! - [`models`] - data structures shared by the other modules
//! - [`state`] - application state and persisted configuration
//! - [`ui`] - egui rendering of the graph
//!
//! ## Example
//!
//! ```rust
//! use lanegraph::graph::layout;
//! use lanegraph::models::{BranchHead, Commit};
//!
//! let commits = vec![
//!     Commit::new("b", vec!["a".to_string()]),
//!     Commit::new("a", vec![]),
//! ];
//! let heads = vec![BranchHead::new("main", "b", true)];
//!
//! let graph = layout(&commits, &heads);
//! assert_eq!(graph.len(), 2);
//! assert_eq!(graph.max_lane, 0);
//! ```

pub mod app;
pub mod git;
pub mod graph;
pub mod models;
pub mod state;
pub mod ui;

pub use app::LaneGraphApp;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
        assert!(!NAME.is_empty());
        assert!(!DESCRIPTION.is_empty());
    }

    #[test]
    fn test_library_metadata() {
        assert_eq!(NAME, "lanegraph");
        assert!(VERSION.chars().next().unwrap().is_ascii_digit());
    }
}
