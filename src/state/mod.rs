pub mod app_state;
pub mod config;

pub use app_state::*;
pub use config::*;
