use crate::config::{LayoutConfig, LayoutKind};
use crate::error::Result;
use crate::filter::{focus_items, leaf_items};
use crate::layout::TileSet;
use crate::layout::blocks::BlockPacker;
use crate::layout::treemap::SquarifiedTreemap;
use crate::model::{BlockLayout, Board, Rect, Tile, TreemapLayout, WorkItem};
use serde::Serialize;
use tracing::instrument;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[instrument(skip_all, fields(items = items.len(), width = width, height = height))]
/// Lays `items` out as a squarified treemap over `width x height`.
///
/// Notes:
/// - Only items of `cfg.focus_type` are shown; when none exist every item is shown.
/// - Tile area is proportional to `max(total_work, cfg.min_weight)`; the tiles cover the canvas.
/// - An empty input yields an empty layout.
pub fn layout_treemap<'a>(
    items: &'a [WorkItem],
    width: f64,
    height: f64,
    cfg: &LayoutConfig,
) -> Result<TreemapLayout<'a>> {
    let treemap = SquarifiedTreemap::new(cfg)?;
    let candidates = focus_items(items, cfg.focus_type.as_deref());
    let tiles = treemap.layout(&candidates, width, height)?;
    Ok(TreemapLayout {
        width,
        height,
        tiles,
    })
}

#[instrument(skip_all, fields(items = items.len(), container_size = container_size, fill = ?fill_percentage))]
/// Lays the leaf items of `items` out as square blocks in a `container_size` square.
///
/// Notes:
/// - Container types (`cfg.container_types`) are skipped.
/// - `fill_percentage` (completed / estimate x 100, `None` without an estimate)
///   only drives the grid resolution and is clamped to the configured range.
/// - Items that do not fit the virtual grid are returned in `unplaced`.
pub fn layout_blocks<'a>(
    items: &'a [WorkItem],
    container_size: f64,
    fill_percentage: Option<f64>,
    cfg: &LayoutConfig,
) -> Result<BlockLayout<'a>> {
    let packer = BlockPacker::new(cfg)?;
    let leaves = leaf_items(items, &cfg.container_types);
    packer.layout(&leaves, container_size, fill_percentage)
}

/// Layout of one board, by algorithm.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BoardLayout<'a> {
    Treemap(TreemapLayout<'a>),
    Blocks(BlockLayout<'a>),
}

impl<'a> TileSet<'a> for BoardLayout<'a> {
    fn canvas(&self) -> Rect {
        match self {
            BoardLayout::Treemap(l) => l.canvas(),
            BoardLayout::Blocks(l) => l.canvas(),
        }
    }
    fn tiles(&self) -> &[Tile<'a>] {
        match self {
            BoardLayout::Treemap(l) => l.tiles(),
            BoardLayout::Blocks(l) => l.tiles(),
        }
    }
    fn unplaced(&self) -> &[&'a WorkItem] {
        match self {
            BoardLayout::Treemap(l) => l.unplaced(),
            BoardLayout::Blocks(l) => l.unplaced(),
        }
    }
}

/// Lays out one board with the algorithm and canvas selected by `cfg`.
pub fn layout_board<'a>(board: &'a Board, cfg: &LayoutConfig) -> Result<BoardLayout<'a>> {
    Ok(match cfg.kind {
        LayoutKind::Treemap => {
            BoardLayout::Treemap(layout_treemap(&board.items, cfg.width, cfg.height, cfg)?)
        }
        LayoutKind::Blocks => BoardLayout::Blocks(layout_blocks(
            &board.items,
            cfg.container_size,
            board.effective_fill_percentage(),
            cfg,
        )?),
    })
}

/// Lays out many boards. Results keep the input order.
/// With feature "parallel" and `cfg.parallel`, boards are evaluated on the rayon pool.
pub fn layout_boards<'a>(boards: &'a [Board], cfg: &LayoutConfig) -> Vec<Result<BoardLayout<'a>>> {
    #[cfg(feature = "parallel")]
    {
        if cfg.parallel {
            return boards.par_iter().map(|b| layout_board(b, cfg)).collect();
        }
    }
    boards.iter().map(|b| layout_board(b, cfg)).collect()
}
