//! Run parameters for the packing engine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{PieceRequest, PlacementItem, Rect};

/// Order in which the general pass offers items to each sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemOrder {
    /// Longest side first, then larger area.
    #[default]
    MaxSideThenArea,
    AreaThenMaxSide,
    HeightThenWidth,
    WidthThenHeight,
}

impl ItemOrder {
    pub const ALL: [ItemOrder; 4] = [
        ItemOrder::MaxSideThenArea,
        ItemOrder::AreaThenMaxSide,
        ItemOrder::HeightThenWidth,
        ItemOrder::WidthThenHeight,
    ];

    /// Stable descending sort; equal items keep their input order.
    pub fn sort(self, items: &mut [PlacementItem]) {
        match self {
            ItemOrder::MaxSideThenArea => items.sort_by(|a, b| {
                b.size
                    .max_side()
                    .total_cmp(&a.size.max_side())
                    .then(b.size.area().total_cmp(&a.size.area()))
            }),
            ItemOrder::AreaThenMaxSide => items.sort_by(|a, b| {
                b.size
                    .area()
                    .total_cmp(&a.size.area())
                    .then(b.size.max_side().total_cmp(&a.size.max_side()))
            }),
            ItemOrder::HeightThenWidth => items.sort_by(|a, b| {
                b.size
                    .h
                    .total_cmp(&a.size.h)
                    .then(b.size.w.total_cmp(&a.size.w))
            }),
            ItemOrder::WidthThenHeight => items.sort_by(|a, b| {
                b.size
                    .w
                    .total_cmp(&a.size.w)
                    .then(b.size.h.total_cmp(&a.size.h))
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackingConfig {
    pub sheet_width: f64,
    pub sheet_height: f64,
    /// Blade width reserved after every placed piece.
    pub kerf: f64,
    /// A piece with a side within 0.01 of one of these needs a single cut.
    pub efficient_dims: Vec<f64>,
    pub strip_mode: bool,
    pub strip_width_tolerance: f64,
    /// Minimum share of items in the dominant width bucket, inclusive.
    pub strip_threshold: f64,
    pub conservative_mode: bool,
    /// Distinct dimension pairs allowed per general-pass sheet.
    pub conservative_max_distinct: usize,
    pub max_sheets: usize,
    pub explore_orders: bool,
}

impl PackingConfig {
    pub const DEFAULT_SHEET_WIDTH: f64 = 48.0;
    pub const DEFAULT_SHEET_HEIGHT: f64 = 96.0;
    pub const DEFAULT_STRIP_WIDTH_TOLERANCE: f64 = 1.0 / 32.0;
    pub const DEFAULT_STRIP_THRESHOLD: f64 = 0.7;
    pub const DEFAULT_CONSERVATIVE_MAX_DISTINCT: usize = 6;
    pub const DEFAULT_MAX_SHEETS: usize = 200;
    pub const EFFICIENT_TOLERANCE: f64 = 0.01;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, width: f64, height: f64) -> Self {
        self.sheet_width = width;
        self.sheet_height = height;
        self
    }

    pub fn with_kerf(mut self, kerf: f64) -> Self {
        self.kerf = kerf;
        self
    }

    pub fn with_efficient_dims(mut self, dims: Vec<f64>) -> Self {
        self.efficient_dims = dims;
        self
    }

    pub fn with_strip_mode(mut self, enabled: bool) -> Self {
        self.strip_mode = enabled;
        self
    }

    pub fn with_conservative_mode(mut self, enabled: bool) -> Self {
        self.conservative_mode = enabled;
        self
    }

    pub fn with_max_sheets(mut self, max_sheets: usize) -> Self {
        self.max_sheets = max_sheets;
        self
    }

    pub fn with_explore_orders(mut self, enabled: bool) -> Self {
        self.explore_orders = enabled;
        self
    }

    pub fn stock(&self) -> Rect {
        Rect::new(self.sheet_width, self.sheet_height)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.stock().is_valid() {
            return Err(ConfigError::InvalidSheet {
                width: self.sheet_width,
                height: self.sheet_height,
            });
        }
        if !self.kerf.is_finite() || self.kerf < 0.0 {
            return Err(ConfigError::InvalidKerf(self.kerf));
        }
        if !(self.strip_width_tolerance.is_finite() && self.strip_width_tolerance > 0.0) {
            return Err(ConfigError::InvalidStripTolerance(
                self.strip_width_tolerance,
            ));
        }
        if !(0.0..=1.0).contains(&self.strip_threshold) {
            return Err(ConfigError::InvalidStripThreshold(self.strip_threshold));
        }
        if self.max_sheets == 0 {
            return Err(ConfigError::ZeroSheetCeiling);
        }
        if self.conservative_max_distinct == 0 {
            return Err(ConfigError::ZeroDistinctCap);
        }
        Ok(())
    }
}

impl Default for PackingConfig {
    fn default() -> Self {
        Self {
            sheet_width: Self::DEFAULT_SHEET_WIDTH,
            sheet_height: Self::DEFAULT_SHEET_HEIGHT,
            kerf: 0.0,
            efficient_dims: vec![Self::DEFAULT_SHEET_WIDTH, Self::DEFAULT_SHEET_HEIGHT],
            strip_mode: true,
            strip_width_tolerance: Self::DEFAULT_STRIP_WIDTH_TOLERANCE,
            strip_threshold: Self::DEFAULT_STRIP_THRESHOLD,
            conservative_mode: false,
            conservative_max_distinct: Self::DEFAULT_CONSERVATIVE_MAX_DISTINCT,
            max_sheets: Self::DEFAULT_MAX_SHEETS,
            explore_orders: false,
        }
    }
}

/// A complete packing request as accepted by the CLI and the HTTP service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub config: PackingConfig,
    pub pieces: Vec<PieceRequest>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(piece: usize, w: f64, h: f64) -> PlacementItem {
        PlacementItem {
            piece,
            size: Rect::new(w, h),
            allow_rotate: true,
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert_eq!(PackingConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = PackingConfig::default();
        assert!(matches!(
            base.clone().with_sheet(0.0, 96.0).validate(),
            Err(ConfigError::InvalidSheet { .. })
        ));
        assert_eq!(
            base.clone().with_kerf(-0.1).validate(),
            Err(ConfigError::InvalidKerf(-0.1))
        );
        assert_eq!(
            base.clone().with_max_sheets(0).validate(),
            Err(ConfigError::ZeroSheetCeiling)
        );
        let mut cfg = base.clone().with_conservative_mode(true);
        cfg.conservative_max_distinct = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroDistinctCap));
        let mut cfg = base.clone();
        cfg.strip_threshold = 1.5;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidStripThreshold(1.5)));
        let mut cfg = base;
        cfg.strip_width_tolerance = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::InvalidStripTolerance(0.0)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let job: Job = serde_json::from_str(
            r#"{"config": {"kerf": 0.125, "conservative_mode": true},
                "pieces": [{"width": 10, "height": 20, "quantity": 2}]}"#,
        )
        .unwrap();
        assert_eq!(job.config.kerf, 0.125);
        assert!(job.config.conservative_mode);
        assert_eq!(job.config.sheet_width, 48.0);
        assert_eq!(job.config.max_sheets, 200);
        assert_eq!(job.pieces.len(), 1);
    }

    #[test]
    fn test_max_side_order_breaks_ties_by_area() {
        let mut items = vec![
            item(0, 10.0, 5.0),
            item(1, 20.0, 2.0),
            item(2, 4.0, 20.0),
            item(3, 10.0, 8.0),
        ];
        ItemOrder::MaxSideThenArea.sort(&mut items);
        let order: Vec<usize> = items.iter().map(|i| i.piece).collect();
        assert_eq!(order, vec![2, 1, 3, 0]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_items() {
        let mut items = vec![item(0, 5.0, 5.0), item(1, 5.0, 5.0), item(2, 5.0, 5.0)];
        for order in ItemOrder::ALL {
            order.sort(&mut items);
            let seq: Vec<usize> = items.iter().map(|i| i.piece).collect();
            assert_eq!(seq, vec![0, 1, 2]);
        }
    }
}
