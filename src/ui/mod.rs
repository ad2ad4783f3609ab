pub mod commit_graph;
pub mod graph;

pub use commit_graph::*;
pub use graph::{GraphGeometry, GraphPainter};
