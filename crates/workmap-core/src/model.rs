use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Work item priority. Carried through layouts untouched for downstream coloring.
/// Parsed case-insensitively on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String")]
pub enum Priority {
    Urgent,
    High,
    Normal,
    Low,
}

impl FromStr for Priority {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "urgent" => Ok(Self::Urgent),
            "high" => Ok(Self::High),
            "normal" => Ok(Self::Normal),
            "low" => Ok(Self::Low),
            _ => Err(()),
        }
    }
}

impl TryFrom<String> for Priority {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse().map_err(|_| format!("unknown priority: {s}"))
    }
}

/// A unit of tracked work as delivered by the work-item source.
///
/// Hours are expected to be non-negative; `total_work` treats negative or
/// non-finite values as zero so a bad record cannot produce a degenerate tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub id: u64,
    /// Item type as reported by the tracker ("Task", "Bug", "User Story", ...).
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub completed_work: f64,
    #[serde(default)]
    pub remaining_work: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl WorkItem {
    pub fn new(id: u64, kind: impl Into<String>, completed_work: f64, remaining_work: f64) -> Self {
        Self {
            id,
            kind: kind.into(),
            completed_work,
            remaining_work,
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Completed plus remaining hours.
    pub fn total_work(&self) -> f64 {
        sanitize_hours(self.completed_work) + sanitize_hours(self.remaining_work)
    }
}

fn sanitize_hours(h: f64) -> f64 {
    if h.is_finite() { h.max(0.0) } else { 0.0 }
}

/// Ratio of completed work to the effort estimate, in percent.
/// Returns `None` when there is no usable estimate.
pub fn fill_percentage(completed_work: f64, effort_estimate: f64) -> Option<f64> {
    if effort_estimate.is_finite() && effort_estimate > 0.0 && completed_work.is_finite() {
        Some(completed_work / effort_estimate * 100.0)
    } else {
        None
    }
}

/// A named batch of work items (one board / one parent item).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<WorkItem>,
    /// Explicit fill percentage; wins over `effort_estimate` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effort_estimate: Option<f64>,
}

impl Board {
    pub fn new(name: impl Into<String>, items: Vec<WorkItem>) -> Self {
        Self {
            name: name.into(),
            items,
            ..Default::default()
        }
    }

    /// Fill percentage used to size the block layout grid.
    pub fn effective_fill_percentage(&self) -> Option<f64> {
        if let Some(p) = self.fill_percentage {
            return Some(p);
        }
        let estimate = self.effort_estimate?;
        let completed: f64 = self.items.iter().map(|i| sanitize_hours(i.completed_work)).sum();
        fill_percentage(completed, estimate)
    }
}

/// Axis-aligned rectangle in canvas units. `x,y` is top-left; `w,h` are sizes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }
    /// Exclusive right edge (`x + w`).
    pub fn right(&self) -> f64 {
        self.x + self.w
    }
    /// Exclusive bottom edge (`y + h`).
    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }
    pub fn area(&self) -> f64 {
        self.w * self.h
    }
    /// `max(w/h, h/w)`; infinite for degenerate rectangles.
    pub fn aspect_ratio(&self) -> f64 {
        if self.w <= 0.0 || self.h <= 0.0 {
            return f64::INFINITY;
        }
        (self.w / self.h).max(self.h / self.w)
    }
    /// True if the interiors intersect by more than `eps` on both axes.
    pub fn overlaps(&self, other: &Rect, eps: f64) -> bool {
        self.x + eps < other.right()
            && other.x + eps < self.right()
            && self.y + eps < other.bottom()
            && other.y + eps < self.bottom()
    }
    /// True if `self` lies inside `outer`, allowing `eps` of numeric slack.
    pub fn contained_in(&self, outer: &Rect, eps: f64) -> bool {
        self.x >= outer.x - eps
            && self.y >= outer.y - eps
            && self.right() <= outer.right() + eps
            && self.bottom() <= outer.bottom() + eps
    }
}

/// A placed work item.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Tile<'a> {
    pub rect: Rect,
    /// Continuous weight (treemap) or size class (blocks).
    pub weight: f64,
    pub item: &'a WorkItem,
}

/// Output of the squarified treemap layout.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TreemapLayout<'a> {
    pub width: f64,
    pub height: f64,
    /// Tiles in placement order (weight descending).
    pub tiles: Vec<Tile<'a>>,
}

/// Output of the block (grid bin-packing) layout.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BlockLayout<'a> {
    pub container_size: f64,
    /// Grid resolution (columns); the virtual grid has `rows` rows.
    pub columns: u32,
    pub rows: u32,
    pub cell_size: f64,
    /// Fill ratio (0.1..=1.0 with default config) used to size the grid.
    pub target_fill: f64,
    /// Tiles in placement order (size class descending).
    pub tiles: Vec<Tile<'a>>,
    /// Leaf items that did not fit in the virtual grid.
    pub unplaced: Vec<&'a WorkItem>,
}

/// Statistics about how well a layout covers its canvas.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LayoutStats {
    pub num_tiles: usize,
    pub num_unplaced: usize,
    pub canvas_area: f64,
    /// Sum of tile areas.
    pub covered_area: f64,
    /// covered_area / canvas_area (0.0 to 1.0 for layouts inside the canvas).
    pub coverage: f64,
    /// Largest tile aspect ratio (1.0 is a square). 0.0 when there are no tiles.
    pub worst_aspect_ratio: f64,
    pub mean_aspect_ratio: f64,
}

impl LayoutStats {
    pub fn from_tiles(canvas: &Rect, tiles: &[Tile<'_>], num_unplaced: usize) -> Self {
        let canvas_area = canvas.area();
        let mut covered_area = 0.0;
        let mut worst_aspect_ratio: f64 = 0.0;
        let mut aspect_sum = 0.0;
        for t in tiles {
            covered_area += t.rect.area();
            let ar = t.rect.aspect_ratio();
            worst_aspect_ratio = worst_aspect_ratio.max(ar);
            aspect_sum += ar;
        }
        let coverage = if canvas_area > 0.0 {
            covered_area / canvas_area
        } else {
            0.0
        };
        let mean_aspect_ratio = if tiles.is_empty() {
            0.0
        } else {
            aspect_sum / tiles.len() as f64
        };
        Self {
            num_tiles: tiles.len(),
            num_unplaced,
            canvas_area,
            covered_area,
            coverage,
            worst_aspect_ratio,
            mean_aspect_ratio,
        }
    }

    /// Returns a human-readable summary of the statistics.
    pub fn summary(&self) -> String {
        format!(
            "Tiles: {}, Unplaced: {}, Coverage: {:.2}%, Canvas: {:.0} u², Covered: {:.0} u², Worst aspect: {:.2}",
            self.num_tiles,
            self.num_unplaced,
            self.coverage * 100.0,
            self.canvas_area,
            self.covered_area,
            self.worst_aspect_ratio,
        )
    }

    pub fn uncovered_area(&self) -> f64 {
        (self.canvas_area - self.covered_area).max(0.0)
    }

    /// Uncovered space as a percentage (0.0 to 100.0).
    pub fn waste_percentage(&self) -> f64 {
        if self.canvas_area > 0.0 {
            self.uncovered_area() / self.canvas_area * 100.0
        } else {
            0.0
        }
    }
}
