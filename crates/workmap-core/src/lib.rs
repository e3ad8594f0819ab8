//! Layout engine for work-item boards.
//!
//! - Algorithms: squarified treemap (area proportional to worked hours) and grid bin-packing
//!   ("block explorer": size classes, first-fit, bottom anchored)
//! - Pipeline: `layout_treemap` / `layout_blocks` take borrowed work items and return tiles;
//!   `layout_board(s)` picks the algorithm from config
//! - Both layouts are pure: identical input gives identical output, no shared state.
//!
//! Quick example:
//! ```ignore
//! use workmap_core::{LayoutConfig, WorkItem, layout_blocks, layout_treemap};
//! # fn main() -> workmap_core::Result<()> {
//! let items = vec![
//!     WorkItem::new(1, "Task", 2.0, 1.0),
//!     WorkItem::new(2, "Bug", 0.5, 0.0),
//! ];
//! let cfg = LayoutConfig::default();
//! let tm = layout_treemap(&items, 400.0, 400.0, &cfg)?;
//! let blocks = layout_blocks(&items, 400.0, Some(80.0), &cfg)?;
//! println!("treemap tiles: {}, blocks: {}", tm.tiles.len(), blocks.tiles.len());
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod layout;
pub mod model;
pub mod pipeline;

pub use config::*;
pub use error::*;
pub use export::*;
pub use filter::*;
pub use layout::*;
pub use model::*;
pub use pipeline::*;

/// Convenience prelude for common types and functions.
/// Importing `workmap_core::prelude::*` brings the primary APIs into scope.
pub mod prelude {
    pub use crate::config::{LayoutConfig, LayoutConfigBuilder, LayoutKind, SizeBucket};
    pub use crate::layout::TileSet;
    pub use crate::model::{
        BlockLayout, Board, LayoutStats, Priority, Rect, Tile, TreemapLayout, WorkItem,
    };
    pub use crate::{
        BoardLayout, layout_blocks, layout_board, layout_boards, layout_treemap, to_json,
        to_json_by_id,
    };
}
