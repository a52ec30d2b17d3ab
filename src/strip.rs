//! Column packing for jobs dominated by one part width.
//!
//! Pieces of the dominant width are stacked into full-height columns laid
//! side by side across the sheet, longest first. Everything else is handed
//! back to the general packer.

use crate::config::PackingConfig;
use crate::types::{EPSILON, PlacedPiece, PlacementItem};

/// Items split by the width eligibility test.
#[derive(Debug, Clone)]
pub struct StripPlan {
    /// Largest width found in the dominant bucket.
    pub common_width: f64,
    pub eligible: Vec<PlacementItem>,
    pub others: Vec<PlacementItem>,
}

#[derive(Debug, Clone, Default)]
pub struct StripOutcome {
    pub sheets: Vec<Vec<PlacedPiece>>,
    pub leftovers: Vec<PlacementItem>,
}

/// Share of `items` falling into the most populated width bucket, together
/// with that bucket's key. Ties keep the bucket seen first.
pub fn dominant_width_share(items: &[PlacementItem], tolerance: f64) -> Option<(i64, f64)> {
    let mut buckets: Vec<(i64, usize)> = Vec::new();
    for item in items {
        let key = (item.size.w / tolerance).round() as i64;
        match buckets.iter_mut().find(|(k, _)| *k == key) {
            Some((_, count)) => *count += 1,
            None => buckets.push((key, 1)),
        }
    }

    let mut best: Option<(i64, usize)> = None;
    for &(key, count) in &buckets {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((key, count));
        }
    }

    best.map(|(key, count)| (key, count as f64 / items.len() as f64))
}

/// Decides whether the strip pass runs and which items it takes.
pub fn plan(items: &[PlacementItem], config: &PackingConfig) -> Option<StripPlan> {
    if !config.strip_mode || items.is_empty() {
        return None;
    }
    let tolerance = config.strip_width_tolerance;
    let (key, share) = dominant_width_share(items, tolerance)?;
    if share + EPSILON < config.strip_threshold {
        return None;
    }

    let (eligible, others): (Vec<PlacementItem>, Vec<PlacementItem>) = items
        .iter()
        .partition(|item| (item.size.w / tolerance).round() as i64 == key);
    let common_width = eligible
        .iter()
        .map(|item| item.size.w)
        .fold(0.0_f64, f64::max);
    if common_width > config.sheet_width + EPSILON {
        return None;
    }

    Some(StripPlan {
        common_width,
        eligible,
        others,
    })
}

/// `floor((W + kerf) / (w + kerf))`, backed off while rounding overstates the
/// fit, never below one.
pub fn columns_per_sheet(sheet_width: f64, kerf: f64, common_width: f64) -> usize {
    let mut columns = ((sheet_width + kerf) / (common_width + kerf)).floor() as usize;
    while columns > 1
        && columns as f64 * common_width + (columns - 1) as f64 * kerf > sheet_width + EPSILON
    {
        columns -= 1;
    }
    columns.max(1)
}

pub struct StripPacker {
    common_width: f64,
    columns: usize,
    sheet_height: f64,
    kerf: f64,
}

impl StripPacker {
    pub fn new(config: &PackingConfig, common_width: f64) -> Self {
        Self {
            common_width,
            columns: columns_per_sheet(config.sheet_width, config.kerf, common_width),
            sheet_height: config.sheet_height,
            kerf: config.kerf,
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    fn column_x(&self, column: usize) -> f64 {
        column as f64 * (self.common_width + self.kerf)
    }

    /// Fills sheets until every item is placed, a fresh sheet takes nothing,
    /// or `max_sheets` sheets exist.
    pub fn pack(&self, mut items: Vec<PlacementItem>, max_sheets: usize) -> StripOutcome {
        items.sort_by(|a, b| b.size.h.total_cmp(&a.size.h));

        let mut outcome = StripOutcome::default();
        while !items.is_empty() && outcome.sheets.len() < max_sheets {
            // Running top of each column; `None` while the column is empty.
            let mut tops: Vec<Option<f64>> = vec![None; self.columns];
            let mut placements = Vec::new();
            let mut deferred = Vec::new();

            for item in items {
                let slot = tops.iter().enumerate().find_map(|(column, top)| {
                    let y = top.map_or(0.0, |used| used + self.kerf);
                    (y + item.size.h <= self.sheet_height + EPSILON).then_some((column, y))
                });
                match slot {
                    Some((column, y)) => {
                        tops[column] = Some(y + item.size.h);
                        placements.push(PlacedPiece {
                            x: self.column_x(column),
                            y,
                            rect: item.size,
                            rotated: false,
                            piece: item.piece,
                        });
                    }
                    None => deferred.push(item),
                }
            }

            items = deferred;
            if placements.is_empty() {
                break;
            }
            tracing::debug!(
                sheet = outcome.sheets.len() + 1,
                pieces = placements.len(),
                "closed strip sheet"
            );
            outcome.sheets.push(placements);
        }

        outcome.leftovers = items;
        outcome
    }
}
