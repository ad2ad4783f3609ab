pub mod error;
pub mod history;
pub mod repository;
pub mod watcher;

pub use error::*;
pub use history::*;
pub use repository::*;
pub use watcher::*;
