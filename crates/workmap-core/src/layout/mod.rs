use crate::model::{BlockLayout, LayoutStats, Rect, Tile, TreemapLayout, WorkItem};

pub mod blocks;
pub mod treemap;

/// A finished layout: tiles inside a canvas, plus any items that did not fit.
///
/// Implementations guarantee pairwise disjoint tiles (blocks keep an explicit
/// gap) and at most one tile per input item.
pub trait TileSet<'a> {
    fn canvas(&self) -> Rect;
    fn tiles(&self) -> &[Tile<'a>];
    fn unplaced(&self) -> &[&'a WorkItem] {
        &[]
    }
    fn stats(&self) -> LayoutStats {
        LayoutStats::from_tiles(&self.canvas(), self.tiles(), self.unplaced().len())
    }
}

impl<'a> TileSet<'a> for TreemapLayout<'a> {
    fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
    fn tiles(&self) -> &[Tile<'a>] {
        &self.tiles
    }
}

impl<'a> TileSet<'a> for BlockLayout<'a> {
    fn canvas(&self) -> Rect {
        Rect::new(0.0, 0.0, self.container_size, self.container_size)
    }
    fn tiles(&self) -> &[Tile<'a>] {
        &self.tiles
    }
    fn unplaced(&self) -> &[&'a WorkItem] {
        &self.unplaced
    }
}
