use crate::free_rects::{FreeRect, FreeRectangleSet};
use crate::types::{PlacedPiece, PlacementItem, Rect};

/// Leftover after fitting a kerf-inflated footprint into a free rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub short: f64,
    pub long: f64,
}

impl Score {
    fn short_side_fit(piece: Rect, free: Rect) -> Self {
        let dw = (free.w - piece.w).abs();
        let dh = (free.h - piece.h).abs();
        Self {
            short: dw.min(dh),
            long: dw.max(dh),
        }
    }

    pub fn is_better_than(&self, other: &Score) -> bool {
        self.short < other.short || (self.short == other.short && self.long < other.long)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredPlacement {
    pub free_idx: usize,
    pub rotated: bool,
    pub score: Score,
}

/// Best-Short-Side-Fit over `free`. Rectangles are visited in order, the
/// unrotated orientation first; only a strictly better score replaces the
/// current best.
pub fn best_short_side_fit(
    free: &FreeRectangleSet,
    piece: Rect,
    kerf: f64,
    allow_rotate: bool,
) -> Option<ScoredPlacement> {
    let mut best: Option<ScoredPlacement> = None;
    let normal = piece.inflated(kerf);
    let rotated = piece.rotated().inflated(kerf);

    let orientations = [(false, normal), (true, rotated)];
    let tried = if allow_rotate {
        &orientations[..]
    } else {
        &orientations[..1]
    };

    let mut candidates: Vec<(usize, bool, Rect)> = tried
        .iter()
        .flat_map(|&(is_rotated, footprint)| {
            free.query(footprint.w, footprint.h)
                .into_iter()
                .map(move |idx| (idx, is_rotated, footprint))
        })
        .collect();
    candidates.sort_by_key(|&(idx, is_rotated, _)| (idx, is_rotated));

    for (idx, is_rotated, footprint) in candidates {
        let score = Score::short_side_fit(footprint, free.rects()[idx].rect);
        if best.is_none_or(|b| score.is_better_than(&b.score)) {
            best = Some(ScoredPlacement {
                free_idx: idx,
                rotated: is_rotated,
                score,
            });
        }
    }

    best
}

/// One stock sheet being filled by the general pass.
#[derive(Debug, Clone)]
pub struct SheetPacker {
    kerf: f64,
    free: FreeRectangleSet,
    placements: Vec<PlacedPiece>,
}

impl SheetPacker {
    pub fn new(stock: Rect, kerf: f64) -> Self {
        // The trailing kerf of a piece flush with the far edge falls off the sheet.
        let usable = stock.inflated(kerf);
        Self {
            kerf,
            free: FreeRectangleSet::new(usable.w, usable.h),
            placements: Vec::new(),
        }
    }

    pub fn free_rects(&self) -> &FreeRectangleSet {
        &self.free
    }

    pub fn placements(&self) -> &[PlacedPiece] {
        &self.placements
    }

    pub fn into_placements(self) -> Vec<PlacedPiece> {
        self.placements
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn find_best(&self, piece: Rect, allow_rotate: bool) -> Option<ScoredPlacement> {
        best_short_side_fit(&self.free, piece, self.kerf, allow_rotate)
    }

    pub fn insert(&mut self, item: &PlacementItem) -> Option<PlacedPiece> {
        let scored = self.find_best(item.size, item.allow_rotate)?;
        Some(self.place(scored, item))
    }

    pub fn place(&mut self, scored: ScoredPlacement, item: &PlacementItem) -> PlacedPiece {
        let free = self.free.rects()[scored.free_idx];
        let rect = if scored.rotated {
            item.size.rotated()
        } else {
            item.size
        };

        let placed = PlacedPiece {
            x: free.x,
            y: free.y,
            rect,
            rotated: scored.rotated,
            piece: item.piece,
        };

        let consumed = rect.inflated(self.kerf);
        self.free
            .consume(&FreeRect::new(free.x, free.y, consumed.w, consumed.h));
        self.placements.push(placed);

        placed
    }
}
