use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Layout algorithms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LayoutKind {
    /// Squarified treemap: area proportional to worked hours.
    Treemap,
    /// Grid bin-packing ("block explorer"): discrete size classes, first-fit, bottom anchored.
    Blocks,
}

impl FromStr for LayoutKind {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "treemap" | "squarify" => Ok(Self::Treemap),
            "blocks" | "grid" | "block_explorer" => Ok(Self::Blocks),
            _ => Err(()),
        }
    }
}

/// Upper bound (inclusive, in hours) of one size class bucket.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SizeBucket {
    pub max_hours: f64,
    /// Side length of the item's square footprint, in grid cells.
    pub size: u32,
}

impl SizeBucket {
    pub const fn new(max_hours: f64, size: u32) -> Self {
        Self { max_hours, size }
    }
}

/// Layout configuration.
/// Key notes:
///   - `kind` selects which algorithm board-level calls (`layout_board`) run
///   - defaults reproduce the dashboard's fixed policy constants; the treemap
///     aspect threshold and the fill clamp range are the usual knobs to turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_kind")]
    pub kind: LayoutKind,

    /// Treemap canvas width for board-level calls.
    #[serde(default = "default_canvas")]
    pub width: f64,
    /// Treemap canvas height for board-level calls.
    #[serde(default = "default_canvas")]
    pub height: f64,
    /// Square block canvas side for board-level calls.
    #[serde(default = "default_canvas")]
    pub container_size: f64,

    // treemap
    /// A row stops growing once its worst aspect ratio would exceed this.
    #[serde(default = "default_max_aspect_ratio")]
    pub max_aspect_ratio: f64,
    /// Floor for an item's treemap weight (hours).
    #[serde(default = "default_min_weight")]
    pub min_weight: f64,
    /// Most specific item type shown by the treemap. When no item has this
    /// type the treemap shows every item instead. `None` disables the filter.
    #[serde(default = "default_focus_type")]
    pub focus_type: Option<String>,

    // blocks
    /// Item types treated as hierarchy containers (compared case-insensitively).
    #[serde(default = "default_container_types")]
    pub container_types: Vec<String>,
    /// Inset applied on every side of a block.
    #[serde(default = "default_block_padding")]
    pub block_padding: f64,
    #[serde(default = "default_min_fill")]
    pub min_fill_percentage: f64,
    #[serde(default = "default_max_fill")]
    pub max_fill_percentage: f64,
    #[serde(default = "default_max_columns")]
    pub max_columns: u32,
    /// Virtual grid height as a multiple of the column count.
    #[serde(default = "default_row_headroom")]
    pub row_headroom: u32,
    /// Ascending `max_hours` buckets mapping total work to a size class.
    #[serde(default = "default_size_buckets")]
    pub size_buckets: Vec<SizeBucket>,
    /// Size class for work above the last bucket.
    #[serde(default = "default_overflow_size")]
    pub overflow_size: u32,

    /// Lay out boards in parallel when feature "parallel" is on.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            width: default_canvas(),
            height: default_canvas(),
            container_size: default_canvas(),
            max_aspect_ratio: default_max_aspect_ratio(),
            min_weight: default_min_weight(),
            focus_type: default_focus_type(),
            container_types: default_container_types(),
            block_padding: default_block_padding(),
            min_fill_percentage: default_min_fill(),
            max_fill_percentage: default_max_fill(),
            max_columns: default_max_columns(),
            row_headroom: default_row_headroom(),
            size_buckets: default_size_buckets(),
            overflow_size: default_overflow_size(),
            parallel: false,
        }
    }
}

impl LayoutConfig {
    /// Validates the configuration parameters.
    ///
    /// Returns an error if:
    /// - Canvas dimensions are zero, negative or not finite
    /// - A policy constant is outside the range the algorithms can honor
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::WorkmapError;

        check_dimensions(self.width, self.height)?;
        check_dimensions(self.container_size, self.container_size)?;

        if !(self.max_aspect_ratio.is_finite() && self.max_aspect_ratio >= 1.0) {
            return Err(WorkmapError::InvalidConfig(format!(
                "max_aspect_ratio must be >= 1 (got {})",
                self.max_aspect_ratio
            )));
        }
        if !(self.min_weight.is_finite() && self.min_weight > 0.0) {
            return Err(WorkmapError::InvalidConfig(format!(
                "min_weight must be > 0 (got {})",
                self.min_weight
            )));
        }
        if !(self.block_padding.is_finite() && self.block_padding >= 0.0) {
            return Err(WorkmapError::InvalidConfig(format!(
                "block_padding must be >= 0 (got {})",
                self.block_padding
            )));
        }
        if !(self.min_fill_percentage > 0.0
            && self.min_fill_percentage <= self.max_fill_percentage
            && self.max_fill_percentage.is_finite())
        {
            return Err(WorkmapError::InvalidConfig(format!(
                "fill percentage range {}..={} is empty or not positive",
                self.min_fill_percentage, self.max_fill_percentage
            )));
        }
        if self.row_headroom == 0 {
            return Err(WorkmapError::InvalidConfig(
                "row_headroom must be >= 1".into(),
            ));
        }

        let mut prev = f64::NEG_INFINITY;
        for b in &self.size_buckets {
            if b.size == 0 {
                return Err(WorkmapError::InvalidConfig(format!(
                    "size bucket <= {}h has size 0",
                    b.max_hours
                )));
            }
            if b.max_hours.is_nan() || b.max_hours <= prev {
                return Err(WorkmapError::InvalidConfig(
                    "size_buckets must have strictly ascending max_hours".into(),
                ));
            }
            prev = b.max_hours;
        }
        if self.overflow_size == 0 {
            return Err(WorkmapError::InvalidConfig(
                "overflow_size must be >= 1".into(),
            ));
        }
        let largest = self.largest_size_class();
        if self.max_columns == 0 || self.max_columns < largest {
            return Err(WorkmapError::InvalidConfig(format!(
                "max_columns ({}) must fit the largest size class ({})",
                self.max_columns, largest
            )));
        }

        Ok(())
    }

    /// Largest size class any item can be assigned.
    pub fn largest_size_class(&self) -> u32 {
        self.size_buckets
            .iter()
            .map(|b| b.size)
            .chain(std::iter::once(self.overflow_size))
            .max()
            .unwrap_or(1)
    }
}

pub(crate) fn check_dimensions(width: f64, height: f64) -> crate::error::Result<()> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(crate::error::WorkmapError::InvalidDimensions { width, height });
    }
    Ok(())
}

fn default_kind() -> LayoutKind {
    LayoutKind::Blocks
}
fn default_canvas() -> f64 {
    400.0
}
fn default_max_aspect_ratio() -> f64 {
    4.0
}
fn default_min_weight() -> f64 {
    1.0
}
fn default_focus_type() -> Option<String> {
    Some("Task".into())
}
fn default_container_types() -> Vec<String> {
    vec!["User Story".into(), "Feature".into(), "Epic".into()]
}
fn default_block_padding() -> f64 {
    2.0
}
fn default_min_fill() -> f64 {
    10.0
}
fn default_max_fill() -> f64 {
    100.0
}
fn default_max_columns() -> u32 {
    32
}
fn default_row_headroom() -> u32 {
    2
}
// Every third bucket is a 4x area jump.
fn default_size_buckets() -> Vec<SizeBucket> {
    vec![
        SizeBucket::new(0.25, 1),
        SizeBucket::new(0.5, 1),
        SizeBucket::new(1.0, 2),
        SizeBucket::new(2.0, 3),
        SizeBucket::new(4.0, 4),
        SizeBucket::new(6.0, 6),
        SizeBucket::new(8.0, 8),
    ]
}
fn default_overflow_size() -> u32 {
    16
}

/// Builder for `LayoutConfig` for ergonomic construction.
#[derive(Debug, Default, Clone)]
pub struct LayoutConfigBuilder {
    cfg: LayoutConfig,
}

impl LayoutConfigBuilder {
    pub fn new() -> Self {
        Self {
            cfg: LayoutConfig::default(),
        }
    }
    pub fn kind(mut self, v: LayoutKind) -> Self {
        self.cfg.kind = v;
        self
    }
    pub fn with_canvas(mut self, w: f64, h: f64) -> Self {
        self.cfg.width = w;
        self.cfg.height = h;
        self
    }
    pub fn container_size(mut self, v: f64) -> Self {
        self.cfg.container_size = v;
        self
    }
    pub fn max_aspect_ratio(mut self, v: f64) -> Self {
        self.cfg.max_aspect_ratio = v;
        self
    }
    pub fn min_weight(mut self, v: f64) -> Self {
        self.cfg.min_weight = v;
        self
    }
    pub fn focus_type(mut self, v: Option<String>) -> Self {
        self.cfg.focus_type = v;
        self
    }
    pub fn container_types(mut self, v: Vec<String>) -> Self {
        self.cfg.container_types = v;
        self
    }
    pub fn block_padding(mut self, v: f64) -> Self {
        self.cfg.block_padding = v;
        self
    }
    pub fn fill_range(mut self, min: f64, max: f64) -> Self {
        self.cfg.min_fill_percentage = min;
        self.cfg.max_fill_percentage = max;
        self
    }
    pub fn max_columns(mut self, v: u32) -> Self {
        self.cfg.max_columns = v;
        self
    }
    pub fn row_headroom(mut self, v: u32) -> Self {
        self.cfg.row_headroom = v;
        self
    }
    pub fn size_buckets(mut self, buckets: Vec<SizeBucket>, overflow_size: u32) -> Self {
        self.cfg.size_buckets = buckets;
        self.cfg.overflow_size = overflow_size;
        self
    }
    pub fn parallel(mut self, v: bool) -> Self {
        self.cfg.parallel = v;
        self
    }
    pub fn build(self) -> LayoutConfig {
        self.cfg
    }
}

impl LayoutConfig {
    /// Create a fluent builder for `LayoutConfig`.
    pub fn builder() -> LayoutConfigBuilder {
        LayoutConfigBuilder::new()
    }
}
