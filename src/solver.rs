use crate::config::{ItemOrder, PackingConfig};
use crate::error::ConfigError;
use crate::metrics::MetricsAggregator;
use crate::packer::SheetPacker;
use crate::strip::{self, StripPacker};
use crate::types::{
    AbortReason, LayoutRect, PackingResult, PieceRequest, PlacedPiece, PlacementItem, Rect,
    RunStatus, Sheet, Unplaced, UnplacedReason,
};

/// Runs the strip pass and the general pass over one cut list.
pub struct PackingOrchestrator {
    config: PackingConfig,
}

/// Outcome of the general pass for one item order.
#[derive(Debug, Clone)]
struct GeneralPass {
    order: ItemOrder,
    sheets: Vec<Vec<PlacedPiece>>,
    leftovers: Vec<PlacementItem>,
    status: RunStatus,
}

impl GeneralPass {
    /// Fewer unplaced, then fewer sheets, then the emptiest least-filled sheet.
    fn rank(&self) -> (usize, usize, f64) {
        let lightest = self
            .sheets
            .iter()
            .map(|s| s.iter().map(|p| p.rect.area()).sum::<f64>())
            .fold(f64::INFINITY, f64::min);
        (self.leftovers.len(), self.sheets.len(), lightest)
    }

    fn is_better_than(&self, other: &GeneralPass) -> bool {
        let (a_left, a_sheets, a_light) = self.rank();
        let (b_left, b_sheets, b_light) = other.rank();
        a_left
            .cmp(&b_left)
            .then(a_sheets.cmp(&b_sheets))
            .then(a_light.total_cmp(&b_light))
            .is_lt()
    }
}

/// Unrotated dimensions rounded to 1/1000 inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DimKey(i64, i64);

impl DimKey {
    fn of(size: Rect) -> Self {
        Self(
            (size.w * 1000.0).round() as i64,
            (size.h * 1000.0).round() as i64,
        )
    }
}

/// Whether `size` fits the stock in one of its allowed orientations.
pub fn fits_sheet(size: Rect, allow_rotate: bool, stock: Rect) -> bool {
    size.fits_in(&stock) || (allow_rotate && size.rotated().fits_in(&stock))
}

/// Splits requests into packable items (one per physical piece, in request
/// order) and rejected requests. Zero-quantity lines are dropped silently.
pub fn screen(requests: &[PieceRequest], stock: Rect) -> (Vec<PlacementItem>, Vec<Unplaced>) {
    let mut items = Vec::new();
    let mut rejected = Vec::new();

    for (piece, req) in requests.iter().enumerate() {
        if req.quantity == 0 {
            continue;
        }
        let size = req.size();
        let reason = if !size.is_valid() {
            Some(UnplacedReason::InvalidSize)
        } else if !fits_sheet(size, req.allow_rotate, stock) {
            Some(UnplacedReason::Oversized)
        } else {
            None
        };

        match reason {
            Some(reason) => rejected.push(Unplaced {
                piece,
                label: req.label(),
                count: req.quantity,
                reason,
            }),
            None => items.extend((0..req.quantity).map(|_| PlacementItem {
                piece,
                size,
                allow_rotate: req.allow_rotate,
            })),
        }
    }

    (items, rejected)
}

impl PackingOrchestrator {
    pub fn new(config: PackingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn solve(&self, requests: &[PieceRequest]) -> PackingResult {
        let stock = self.config.stock();
        let metrics = MetricsAggregator::new(requests, &self.config);

        let (items, mut unplaced) = screen(requests, stock);
        let errors: Vec<String> = unplaced.iter().map(|u| describe_rejection(u, stock)).collect();
        for error in &errors {
            tracing::warn!("{error}");
        }

        let mut sheets: Vec<Sheet> = Vec::new();
        let mut general_items = items;

        if let Some(plan) = strip::plan(&general_items, &self.config) {
            let packer = StripPacker::new(&self.config, plan.common_width);
            tracing::debug!(
                width = plan.common_width,
                columns = packer.columns(),
                pieces = plan.eligible.len(),
                "strip mode active"
            );
            let outcome = packer.pack(plan.eligible, self.config.max_sheets);
            sheets.extend(
                outcome
                    .sheets
                    .into_iter()
                    .map(|placements| metrics.finish_sheet(placements, true)),
            );
            general_items = plan.others;
            general_items.extend(outcome.leftovers);
        }

        let pass = if self.config.explore_orders {
            self.explore_orders(&general_items, sheets.len())
        } else {
            self.general_pass(general_items, ItemOrder::default(), sheets.len())
        };
        tracing::debug!(order = ?pass.order, sheets = pass.sheets.len(), "general pass done");

        sheets.extend(
            pass.sheets
                .into_iter()
                .map(|placements| metrics.finish_sheet(placements, false)),
        );

        let mut warnings = Vec::new();
        let leftover_reason = match pass.status {
            RunStatus::Done => UnplacedReason::NoFit,
            RunStatus::Aborted(AbortReason::SheetLimit) => {
                warnings.push(format!(
                    "sheet limit of {} reached; remaining pieces were not placed",
                    self.config.max_sheets
                ));
                UnplacedReason::SheetLimit
            }
            RunStatus::Aborted(AbortReason::NoProgress) => {
                warnings.push("some pieces could not be placed".to_string());
                UnplacedReason::NoFit
            }
        };
        for left in tally(&pass.leftovers, requests, leftover_reason) {
            warnings.push(format!("{} x {} not placed", left.count, left.label));
            unplaced.push(left);
        }
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let placements = sheets
            .iter()
            .map(|sheet| {
                sheet
                    .placements
                    .iter()
                    .map(|p| LayoutRect {
                        x: p.x,
                        y: p.y,
                        width: p.rect.w,
                        height: p.rect.h,
                        rotated: p.rotated,
                        label: requests[p.piece].label(),
                    })
                    .collect()
            })
            .collect();
        let totals = metrics.totals(&sheets);

        tracing::info!(
            sheets = totals.sheet_count,
            pieces = totals.piece_count,
            cuts = totals.cut_count,
            edge_banding = totals.edge_banding_total,
            waste_percent = totals.waste_percent,
            "packing finished"
        );

        PackingResult {
            stock,
            sheets,
            placements,
            warnings,
            errors,
            unplaced,
            totals,
            status: pass.status,
        }
    }

    /// Evaluates every item order and keeps the best-ranked pass; ties go to
    /// the earlier order.
    fn explore_orders(&self, items: &[PlacementItem], sheets_before: usize) -> GeneralPass {
        let mut best = self.general_pass(items.to_vec(), ItemOrder::ALL[0], sheets_before);
        for order in ItemOrder::ALL.into_iter().skip(1) {
            let candidate = self.general_pass(items.to_vec(), order, sheets_before);
            tracing::debug!(
                ?order,
                sheets = candidate.sheets.len(),
                unplaced = candidate.leftovers.len(),
                "evaluated item order"
            );
            if candidate.is_better_than(&best) {
                best = candidate;
            }
        }
        best
    }

    fn general_pass(
        &self,
        mut items: Vec<PlacementItem>,
        order: ItemOrder,
        sheets_before: usize,
    ) -> GeneralPass {
        order.sort(&mut items);

        let stock = self.config.stock();
        let mut sheets = Vec::new();
        let mut status = RunStatus::Done;

        while !items.is_empty() {
            if sheets_before + sheets.len() >= self.config.max_sheets {
                status = RunStatus::Aborted(AbortReason::SheetLimit);
                break;
            }

            let mut packer = SheetPacker::new(stock, self.config.kerf);
            let mut dims: Vec<DimKey> = Vec::new();
            loop {
                let before = items.len();
                items.retain(|item| !self.try_place(&mut packer, &mut dims, item));
                if items.len() == before {
                    break;
                }
            }

            if packer.is_empty() {
                status = RunStatus::Aborted(AbortReason::NoProgress);
                break;
            }
            tracing::debug!(
                sheet = sheets_before + sheets.len() + 1,
                pieces = packer.placements().len(),
                "closed sheet"
            );
            sheets.push(packer.into_placements());
        }

        GeneralPass {
            order,
            sheets,
            leftovers: items,
            status,
        }
    }

    /// Returns true when `item` was placed on the sheet.
    fn try_place(&self, packer: &mut SheetPacker, dims: &mut Vec<DimKey>, item: &PlacementItem) -> bool {
        let key = DimKey::of(item.size);
        let is_new = !dims.contains(&key);
        if self.config.conservative_mode
            && is_new
            && dims.len() >= self.config.conservative_max_distinct
        {
            return false;
        }
        if packer.insert(item).is_none() {
            return false;
        }
        if is_new {
            dims.push(key);
        }
        true
    }
}

fn describe_rejection(unplaced: &Unplaced, stock: Rect) -> String {
    match unplaced.reason {
        UnplacedReason::InvalidSize => {
            format!("piece {} has no usable size", unplaced.label)
        }
        _ => format!(
            "piece {} (x{}) does not fit on a {} sheet",
            unplaced.label, unplaced.count, stock
        ),
    }
}

/// Groups leftover items per request, in request order.
fn tally(leftovers: &[PlacementItem], requests: &[PieceRequest], reason: UnplacedReason) -> Vec<Unplaced> {
    let mut counts = vec![0u32; requests.len()];
    for item in leftovers {
        counts[item.piece] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .filter(|&(_, count)| count > 0)
        .map(|(piece, count)| Unplaced {
            piece,
            label: requests[piece].label(),
            count,
            reason,
        })
        .collect()
}
