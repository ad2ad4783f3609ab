//! The commit-graph core: lane layout, coloring, the virtualized viewport
//! and pointer-to-event translation. Nothing here touches a repository or
//! a UI toolkit's widgets.

pub mod colors;
pub mod interaction;
pub mod layout;
pub mod viewport;

pub use colors::*;
pub use interaction::*;
pub use layout::{layout, layout_with_colors};
pub use viewport::*;
