pub mod commit;
pub mod graph;
pub mod repository;

pub use commit::*;
pub use graph::*;
pub use repository::*;
