use crate::config::{LayoutConfig, SizeBucket, check_dimensions};
use crate::error::Result;
use crate::model::{BlockLayout, Rect, Tile, WorkItem};
use tracing::{debug, warn};

/// Dense occupancy matrix for the virtual grid (row-major).
#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: usize,
    rows: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    fn new(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![false; columns * rows],
        }
    }

    fn is_free(&self, col: usize, row: usize, size: usize) -> bool {
        (row..row + size).all(|r| {
            let base = r * self.columns;
            self.cells[base + col..base + col + size].iter().all(|c| !c)
        })
    }

    fn occupy(&mut self, col: usize, row: usize, size: usize) {
        for r in row..row + size {
            let base = r * self.columns;
            self.cells[base + col..base + col + size].fill(true);
        }
    }

    /// First free `size x size` block scanning rows top-to-bottom, columns left-to-right.
    fn first_fit(&self, size: usize) -> Option<(usize, usize)> {
        if size == 0 || size > self.columns || size > self.rows {
            return None;
        }
        for row in 0..=(self.rows - size) {
            for col in 0..=(self.columns - size) {
                if self.is_free(col, row, size) {
                    return Some((col, row));
                }
            }
        }
        None
    }
}

/// Grid bin-packing ("block explorer") layout.
///
/// Hours are quantized into square size classes, the grid resolution follows
/// from the target fill, items are placed first-fit and the result is flipped
/// so dense rows sit at the bottom of the container.
pub struct BlockPacker {
    padding: f64,
    min_fill: f64,
    max_fill: f64,
    max_columns: u32,
    row_headroom: u32,
    buckets: Vec<SizeBucket>,
    overflow_size: u32,
}

impl BlockPacker {
    pub fn new(config: &LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            padding: config.block_padding,
            min_fill: config.min_fill_percentage,
            max_fill: config.max_fill_percentage,
            max_columns: config.max_columns,
            row_headroom: config.row_headroom,
            buckets: config.size_buckets.clone(),
            overflow_size: config.overflow_size,
        })
    }

    /// Side length (in cells) of an item's footprint for `hours` of total work.
    pub fn size_class(&self, hours: f64) -> u32 {
        self.buckets
            .iter()
            .find(|b| hours <= b.max_hours)
            .map(|b| b.size)
            .unwrap_or(self.overflow_size)
            .max(1)
    }

    /// Fill ratio used to size the grid. Missing percentages mean a full grid.
    pub fn target_fill(&self, fill_percentage: Option<f64>) -> f64 {
        fill_percentage
            .filter(|p| !p.is_nan())
            .unwrap_or(100.0)
            .clamp(self.min_fill, self.max_fill)
            / 100.0
    }

    /// Column count: enough cells for `total_cells` at `target_fill`, at least
    /// the largest item, at most `max_columns`.
    pub fn grid_columns(&self, total_cells: u64, largest: u32, target_fill: f64) -> u32 {
        let wanted = (total_cells as f64 / target_fill).sqrt().ceil() as u32;
        wanted.max(largest).min(self.max_columns)
    }

    pub fn layout<'a>(
        &self,
        leaves: &[&'a WorkItem],
        container_size: f64,
        fill_percentage: Option<f64>,
    ) -> Result<BlockLayout<'a>> {
        check_dimensions(container_size, container_size)?;
        let target_fill = self.target_fill(fill_percentage);
        if leaves.is_empty() {
            return Ok(BlockLayout {
                container_size,
                columns: 0,
                rows: 0,
                cell_size: 0.0,
                target_fill,
                tiles: Vec::new(),
                unplaced: Vec::new(),
            });
        }

        let mut sized: Vec<(u32, &'a WorkItem)> = leaves
            .iter()
            .map(|&it| (self.size_class(it.total_work()), it))
            .collect();
        let total_cells: u64 = sized.iter().map(|(s, _)| (*s as u64) * (*s as u64)).sum();
        let largest = sized.iter().map(|(s, _)| *s).max().unwrap_or(1);

        let columns = self.grid_columns(total_cells, largest, target_fill);
        let rows = columns.saturating_mul(self.row_headroom);
        let cell_size = container_size / columns as f64;
        debug!(
            items = sized.len(),
            total_cells,
            columns,
            rows,
            cell_size,
            target_fill,
            "block grid"
        );

        // stable: equal sizes keep input order
        sized.sort_by(|a, b| b.0.cmp(&a.0));

        let mut grid = OccupancyGrid::new(columns as usize, rows as usize);
        let mut tiles = Vec::with_capacity(sized.len());
        let mut unplaced = Vec::new();
        let pad = self.padding;

        for (size, item) in sized {
            let Some((col, row)) = grid.first_fit(size as usize) else {
                warn!(id = item.id, size, columns, rows, "no room left in block grid, item not placed");
                unplaced.push(item);
                continue;
            };
            grid.occupy(col, row, size as usize);
            let side = size as f64 * cell_size - 2.0 * pad;
            let rect = Rect::new(
                col as f64 * cell_size + pad,
                row as f64 * cell_size + pad,
                side,
                side,
            );
            tiles.push(Tile {
                rect,
                weight: size as f64,
                item,
            });
        }

        anchor_bottom(&mut tiles, container_size, pad);

        Ok(BlockLayout {
            container_size,
            columns,
            rows,
            cell_size,
            target_fill,
            tiles,
            unplaced,
        })
    }
}

fn max_extent(tiles: &[Tile<'_>], pad: f64) -> f64 {
    tiles
        .iter()
        .map(|t| t.rect.bottom() + pad)
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Flips the packing vertically so the first (densest) rows end up at the
/// bottom, then pushes the block flush against the container's bottom edge.
fn anchor_bottom(tiles: &mut [Tile<'_>], container_size: f64, pad: f64) {
    if tiles.is_empty() {
        return;
    }
    let extent = max_extent(tiles, pad);
    for t in tiles.iter_mut() {
        t.rect.y = extent - t.rect.y - t.rect.h - 2.0 * pad;
    }
    let slack = container_size - max_extent(tiles, pad);
    if slack > 0.0 {
        for t in tiles.iter_mut() {
            t.rect.y += slack;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::WorkmapError;

    fn packer() -> BlockPacker {
        BlockPacker::new(&LayoutConfig::default()).expect("config")
    }

    #[test]
    fn size_class_buckets() {
        let p = packer();
        let cases = [
            (0.0, 1),
            (0.25, 1),
            (0.5, 1),
            (0.75, 2),
            (1.0, 2),
            (2.0, 3),
            (3.0, 4),
            (4.0, 4),
            (5.0, 6),
            (8.0, 8),
            (8.5, 16),
            (100.0, 16),
        ];
        for (hours, size) in cases {
            assert_eq!(p.size_class(hours), size, "hours={hours}");
        }
    }

    #[test]
    fn target_fill_is_clamped() {
        let p = packer();
        assert_eq!(p.target_fill(None), 1.0);
        assert_eq!(p.target_fill(Some(250.0)), 1.0);
        assert_eq!(p.target_fill(Some(5.0)), 0.1);
        assert_eq!(p.target_fill(Some(50.0)), 0.5);
        assert_eq!(p.target_fill(Some(f64::NAN)), 1.0);
    }

    #[test]
    fn grid_columns_bounds() {
        let p = packer();
        assert_eq!(p.grid_columns(5, 1, 1.0), 3);
        assert_eq!(p.grid_columns(1, 16, 1.0), 16);
        assert_eq!(p.grid_columns(10_000, 1, 1.0), 32);
        assert_eq!(p.grid_columns(4, 1, 0.25), 4);
    }

    #[test]
    fn first_fit_scans_rows_then_columns() {
        let mut g = OccupancyGrid::new(4, 8);
        assert_eq!(g.first_fit(2), Some((0, 0)));
        g.occupy(0, 0, 2);
        assert_eq!(g.first_fit(2), Some((2, 0)));
        g.occupy(2, 0, 2);
        assert_eq!(g.first_fit(1), Some((0, 2)));
        assert_eq!(g.first_fit(5), None);
    }

    #[test]
    fn rejects_bad_container() {
        let item = WorkItem::new(1, "Task", 1.0, 0.0);
        let p = packer();
        for size in [0.0, -300.0, f64::INFINITY] {
            assert!(matches!(
                p.layout(&[&item], size, None),
                Err(WorkmapError::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn rejects_bad_config() {
        let cfg = LayoutConfig::builder().max_columns(0).build();
        assert!(matches!(
            BlockPacker::new(&cfg),
            Err(WorkmapError::InvalidConfig(_))
        ));
    }
}
