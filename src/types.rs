use serde::{Deserialize, Serialize};

/// Tolerance for fit tests, containment checks and sliver emission.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    pub fn max_side(&self) -> f64 {
        self.w.max(self.h)
    }

    /// Grows both sides by the blade width.
    pub fn inflated(&self, kerf: f64) -> Self {
        Self {
            w: self.w + kerf,
            h: self.h + kerf,
        }
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        self.w <= other.w + EPSILON && self.h <= other.h + EPSILON
    }

    /// Zero, negative and non-finite sizes are not packable.
    pub fn is_valid(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

fn default_true() -> bool {
    true
}

/// One normalized cut-list line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieceRequest {
    pub width: f64,
    pub height: f64,
    /// Original dimension text, kept for labels only.
    #[serde(default)]
    pub display_width: String,
    #[serde(default)]
    pub display_height: String,
    pub quantity: u32,
    /// Edge-banding operations per instance.
    #[serde(default)]
    pub edge_banding_units: u32,
    #[serde(default = "default_true")]
    pub allow_rotate: bool,
}

impl PieceRequest {
    pub fn new(width: f64, height: f64, quantity: u32) -> Self {
        Self {
            width,
            height,
            display_width: String::new(),
            display_height: String::new(),
            quantity,
            edge_banding_units: 0,
            allow_rotate: true,
        }
    }

    pub fn with_edge_banding(mut self, units: u32) -> Self {
        self.edge_banding_units = units;
        self
    }

    pub fn with_display(mut self, width: impl Into<String>, height: impl Into<String>) -> Self {
        self.display_width = width.into();
        self.display_height = height.into();
        self
    }

    pub fn with_rotation(mut self, allow_rotate: bool) -> Self {
        self.allow_rotate = allow_rotate;
        self
    }

    pub fn size(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn label(&self) -> String {
        let w = if self.display_width.is_empty() {
            self.width.to_string()
        } else {
            self.display_width.clone()
        };
        let h = if self.display_height.is_empty() {
            self.height.to_string()
        } else {
            self.display_height.clone()
        };
        format!("{w} x {h}")
    }
}

/// A single physical instance of a [`PieceRequest`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementItem {
    /// Index of the originating request.
    pub piece: usize,
    pub size: Rect,
    pub allow_rotate: bool,
}

/// Realized footprint of one item on a sheet; kerf is not included.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlacedPiece {
    pub x: f64,
    pub y: f64,
    pub rect: Rect,
    pub rotated: bool,
    pub piece: usize,
}

impl PlacedPiece {
    pub fn right(&self) -> f64 {
        self.x + self.rect.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.rect.h
    }

    /// Interior overlap; pieces sharing an edge do not overlap.
    pub fn overlaps(&self, other: &PlacedPiece) -> bool {
        self.x < other.right() - EPSILON
            && other.x < self.right() - EPSILON
            && self.y < other.bottom() - EPSILON
            && other.y < self.bottom() - EPSILON
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Sheet {
    pub placements: Vec<PlacedPiece>,
    pub cut_count: u32,
    pub edge_banding_total: u32,
    pub used_area: f64,
    /// Produced by the uniform-width column pass.
    pub strip: bool,
}

/// Placement rectangle handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotated: bool,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedReason {
    /// Fits the sheet in none of its allowed orientations.
    Oversized,
    /// Zero, negative or non-finite dimensions.
    InvalidSize,
    /// A fresh sheet could not take any remaining piece.
    NoFit,
    /// The sheet ceiling stopped the run.
    SheetLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unplaced {
    pub piece: usize,
    pub label: String,
    pub count: u32,
    pub reason: UnplacedReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    SheetLimit,
    NoProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Done,
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub sheet_count: usize,
    pub piece_count: usize,
    pub cut_count: u32,
    pub edge_banding_total: u32,
    pub efficient_pieces: usize,
    pub inefficient_pieces: usize,
    pub waste_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PackingResult {
    pub stock: Rect,
    pub sheets: Vec<Sheet>,
    /// Parallel to `sheets`.
    pub placements: Vec<Vec<LayoutRect>>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub unplaced: Vec<Unplaced>,
    pub totals: Totals,
    pub status: RunStatus,
}

impl PackingResult {
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placed_count(&self, piece: usize) -> u32 {
        self.sheets
            .iter()
            .flat_map(|s| &s.placements)
            .filter(|p| p.piece == piece)
            .count() as u32
    }

    pub fn unplaced_count(&self, piece: usize) -> u32 {
        self.unplaced
            .iter()
            .filter(|u| u.piece == piece)
            .map(|u| u.count)
            .sum()
    }

    pub fn total_waste_percent(&self) -> f64 {
        self.totals.waste_percent
    }
}
