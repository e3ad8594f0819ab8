use crate::config::{LayoutConfig, check_dimensions};
use crate::error::Result;
use crate::model::{Rect, Tile, WorkItem};
use tracing::debug;

/// Squarified treemap over a rectangular canvas.
///
/// Rows are laid along the longer side of the remaining region and grow greedily
/// while their worst aspect ratio stays within `max_aspect_ratio`. Orientation is
/// re-evaluated after every row. A row never extends past the remaining region,
/// so the 1-unit band floor can only shrink the rows that come after it.
pub struct SquarifiedTreemap {
    max_aspect_ratio: f64,
    min_weight: f64,
}

/// Remaining free region of the canvas.
#[derive(Clone, Copy, Debug)]
struct Region {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

impl SquarifiedTreemap {
    pub fn new(config: &LayoutConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_aspect_ratio: config.max_aspect_ratio,
            min_weight: config.min_weight,
        })
    }

    /// Continuous weight: total hours, floored so every item gets some area.
    pub fn weight(&self, item: &WorkItem) -> f64 {
        item.total_work().max(self.min_weight)
    }

    /// Lays `items` out over `width x height`. Tiles come back in placement order.
    pub fn layout<'a>(
        &self,
        items: &[&'a WorkItem],
        width: f64,
        height: f64,
    ) -> Result<Vec<Tile<'a>>> {
        check_dimensions(width, height)?;
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let mut weighted: Vec<(f64, &'a WorkItem)> =
            items.iter().map(|&it| (self.weight(it), it)).collect();
        // stable: equal weights keep input order
        weighted.sort_by(|a, b| b.0.total_cmp(&a.0));

        let total: f64 = weighted.iter().map(|(w, _)| *w).sum();
        let scale = width * height / total;

        let mut region = Region {
            x: 0.0,
            y: 0.0,
            w: width,
            h: height,
        };
        let mut tiles = Vec::with_capacity(weighted.len());
        let mut start = 0usize;
        let mut rows = 0usize;

        while start < weighted.len() {
            let horizontal = region.w >= region.h;
            let (side, extent) = if horizontal {
                (region.h, region.w)
            } else {
                (region.w, region.h)
            };

            // Grow the row: tentatively take the next item, keep it unless it
            // breaks the threshold for a row that already holds something.
            // An exhausted region takes everything left as zero-area tiles.
            let mut end = start;
            let mut row_value = 0.0;
            while end < weighted.len() {
                let candidate = row_value + weighted[end].0;
                if side > 0.0 && end > start {
                    let band = band_length(candidate * scale, side, extent);
                    let worst = worst_aspect_ratio(&weighted[start..=end], candidate, side, band);
                    if worst > self.max_aspect_ratio {
                        break;
                    }
                }
                row_value = candidate;
                end += 1;
            }

            let band = band_length(row_value * scale, side, extent);
            let mut offset = 0.0;
            for &(weight, item) in &weighted[start..end] {
                let len = weight / row_value * side;
                let rect = if horizontal {
                    Rect::new(region.x, region.y + offset, band, len)
                } else {
                    Rect::new(region.x + offset, region.y, len, band)
                };
                tiles.push(Tile { rect, weight, item });
                offset += len;
            }

            if horizontal {
                region.x += band;
                region.w = (region.w - band).max(0.0);
            } else {
                region.y += band;
                region.h = (region.h - band).max(0.0);
            }
            start = end;
            rows += 1;
        }

        debug!(items = tiles.len(), rows, "treemap rows built");
        Ok(tiles)
    }
}

/// Perpendicular extent of a row of `area` spread along `side`: never below 1,
/// never past the `extent` left in the region.
#[inline]
fn band_length(area: f64, side: f64, extent: f64) -> f64 {
    if side <= 0.0 {
        return extent;
    }
    (area / side).max(1.0).min(extent)
}

/// Worst aspect ratio of the row `row` (total weight `row_value`) laid along `side`.
fn worst_aspect_ratio(row: &[(f64, &WorkItem)], row_value: f64, side: f64, band: f64) -> f64 {
    row.iter()
        .map(|(w, _)| {
            let item_len = w / row_value * side;
            (band / item_len).max(item_len / band)
        })
        .fold(0.0, f64::max)
}
