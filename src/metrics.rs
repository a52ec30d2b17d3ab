//! Cut counts, edge-banding totals and waste figures.
//!
//! A piece with a side matching one of the configured "full sheet" dimensions
//! comes off the sheet with a single rip; every other piece needs two cuts.

use crate::config::PackingConfig;
use crate::types::{PieceRequest, PlacedPiece, Rect, Sheet, Totals};

pub struct MetricsAggregator<'a> {
    requests: &'a [PieceRequest],
    efficient_dims: &'a [f64],
    stock: Rect,
}

impl<'a> MetricsAggregator<'a> {
    pub fn new(requests: &'a [PieceRequest], config: &'a PackingConfig) -> Self {
        Self {
            requests,
            efficient_dims: &config.efficient_dims,
            stock: config.stock(),
        }
    }

    pub fn is_efficient(&self, size: Rect) -> bool {
        is_efficient(size, self.efficient_dims)
    }

    pub fn cut_count(&self, placed: &PlacedPiece) -> u32 {
        if self.is_efficient(self.requests[placed.piece].size()) {
            1
        } else {
            2
        }
    }

    pub fn finish_sheet(&self, placements: Vec<PlacedPiece>, strip: bool) -> Sheet {
        let cut_count = placements.iter().map(|p| self.cut_count(p)).sum();
        let edge_banding_total = placements
            .iter()
            .map(|p| self.requests[p.piece].edge_banding_units)
            .sum();
        let used_area = placements.iter().map(|p| p.rect.area()).sum();
        Sheet {
            placements,
            cut_count,
            edge_banding_total,
            used_area,
            strip,
        }
    }

    pub fn totals(&self, sheets: &[Sheet]) -> Totals {
        let mut totals = Totals {
            sheet_count: sheets.len(),
            ..Totals::default()
        };
        let mut used = 0.0;
        for sheet in sheets {
            totals.piece_count += sheet.placements.len();
            totals.cut_count += sheet.cut_count;
            totals.edge_banding_total += sheet.edge_banding_total;
            used += sheet.used_area;
            for p in &sheet.placements {
                if self.is_efficient(self.requests[p.piece].size()) {
                    totals.efficient_pieces += 1;
                } else {
                    totals.inefficient_pieces += 1;
                }
            }
        }
        let stock_area = self.stock.area() * sheets.len() as f64;
        if stock_area > 0.0 {
            totals.waste_percent = (stock_area - used) / stock_area * 100.0;
        }
        totals
    }
}

/// Either side within 0.01 of a configured dimension.
pub fn is_efficient(size: Rect, efficient_dims: &[f64]) -> bool {
    efficient_dims.iter().any(|&d| {
        (size.w - d).abs() <= PackingConfig::EFFICIENT_TOLERANCE
            || (size.h - d).abs() <= PackingConfig::EFFICIENT_TOLERANCE
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placed(piece: usize, x: f64, y: f64, w: f64, h: f64) -> PlacedPiece {
        PlacedPiece {
            x,
            y,
            rect: Rect::new(w, h),
            rotated: false,
            piece,
        }
    }

    #[test]
    fn test_efficient_classification() {
        let dims = [48.0, 96.0];
        assert!(is_efficient(Rect::new(48.0, 12.0), &dims));
        assert!(is_efficient(Rect::new(12.0, 95.995), &dims));
        assert!(!is_efficient(Rect::new(47.9, 10.0), &dims));
        assert!(!is_efficient(Rect::new(20.0, 30.0), &[]));
    }

    #[test]
    fn test_sheet_and_grand_totals() {
        let requests = vec![
            PieceRequest::new(48.0, 24.0, 2).with_edge_banding(1),
            PieceRequest::new(20.0, 30.0, 1).with_edge_banding(3),
        ];
        let config = PackingConfig::default();
        let metrics = MetricsAggregator::new(&requests, &config);

        let sheet = metrics.finish_sheet(
            vec![
                placed(0, 0.0, 0.0, 48.0, 24.0),
                placed(0, 0.0, 24.0, 48.0, 24.0),
                placed(1, 0.0, 48.0, 20.0, 30.0),
            ],
            false,
        );
        assert_eq!(sheet.cut_count, 1 + 1 + 2);
        assert_eq!(sheet.edge_banding_total, 1 + 1 + 3);
        assert_eq!(sheet.used_area, 48.0 * 48.0 + 600.0);

        let totals = metrics.totals(std::slice::from_ref(&sheet));
        assert_eq!(totals.sheet_count, 1);
        assert_eq!(totals.piece_count, 3);
        assert_eq!(totals.efficient_pieces, 2);
        assert_eq!(totals.inefficient_pieces, 1);
        let expected = (4608.0 - 2904.0) / 4608.0 * 100.0;
        assert!((totals.waste_percent - expected).abs() < 1e-9);
    }

    #[test]
    fn test_rotation_does_not_change_classification() {
        let requests = vec![PieceRequest::new(96.0, 10.0, 1)];
        let config = PackingConfig::default().with_sheet(100.0, 100.0);
        let metrics = MetricsAggregator::new(&requests, &config);
        let mut p = placed(0, 0.0, 0.0, 10.0, 96.0);
        p.rotated = true;
        assert_eq!(metrics.cut_count(&p), 1);
    }

    #[test]
    fn test_no_sheets_no_waste() {
        let config = PackingConfig::default();
        let metrics = MetricsAggregator::new(&[], &config);
        assert_eq!(metrics.totals(&[]), Totals::default());
    }
}
