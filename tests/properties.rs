use panel_cutlist::types::{EPSILON, RunStatus};
use panel_cutlist::{PackingConfig, PackingOrchestrator, PackingResult, PieceRequest};
use proptest::prelude::*;

fn piece() -> impl Strategy<Value = PieceRequest> {
    (1u32..60, 1u32..110, 0u32..5, 0u32..4, any::<bool>()).prop_map(|(w, h, qty, bands, rot)| {
        PieceRequest::new(w as f64, h as f64, qty)
            .with_edge_banding(bands)
            .with_rotation(rot)
    })
}

fn config() -> impl Strategy<Value = PackingConfig> {
    (
        20u32..60,
        40u32..100,
        0u32..3,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        1usize..30,
    )
        .prop_map(|(w, h, kerf, strip, conservative, explore, max_sheets)| {
            PackingConfig::default()
                .with_sheet(w as f64, h as f64)
                .with_kerf(kerf as f64)
                .with_strip_mode(strip)
                .with_conservative_mode(conservative)
                .with_explore_orders(explore)
                .with_max_sheets(max_sheets)
        })
}

fn check_layout(result: &PackingResult, requests: &[PieceRequest]) -> Result<(), TestCaseError> {
    let stock = result.stock;
    for sheet in &result.sheets {
        prop_assert!(!sheet.placements.is_empty());
        for (i, a) in sheet.placements.iter().enumerate() {
            prop_assert!(a.x >= 0.0 && a.y >= 0.0);
            prop_assert!(a.right() <= stock.w + EPSILON, "{:?} exceeds width", a);
            prop_assert!(a.bottom() <= stock.h + EPSILON, "{:?} exceeds height", a);

            let req = &requests[a.piece];
            let expected = if a.rotated {
                req.size().rotated()
            } else {
                req.size()
            };
            prop_assert_eq!(a.rect, expected);
            prop_assert!(req.allow_rotate || !a.rotated);

            for b in &sheet.placements[i + 1..] {
                prop_assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn layouts_are_valid_and_conserve_pieces(
        config in config(),
        requests in prop::collection::vec(piece(), 0..10),
    ) {
        let max_sheets = config.max_sheets;
        let result = PackingOrchestrator::new(config).unwrap().solve(&requests);

        check_layout(&result, &requests)?;
        prop_assert!(result.sheet_count() <= max_sheets);
        prop_assert_eq!(result.placements.len(), result.sheet_count());

        for (idx, req) in requests.iter().enumerate() {
            prop_assert_eq!(
                result.placed_count(idx) + result.unplaced_count(idx),
                req.quantity
            );
        }
        if result.status == RunStatus::Done {
            prop_assert!(result.unplaced.iter().all(|u| u.reason
                != panel_cutlist::types::UnplacedReason::SheetLimit));
        }
    }

    #[test]
    fn kerf_keeps_pieces_apart(
        requests in prop::collection::vec(piece(), 1..8),
    ) {
        let kerf = 2.0;
        let config = PackingConfig::default().with_kerf(kerf);
        let result = PackingOrchestrator::new(config).unwrap().solve(&requests);
        check_layout(&result, &requests)?;

        for sheet in &result.sheets {
            for (i, a) in sheet.placements.iter().enumerate() {
                for b in &sheet.placements[i + 1..] {
                    let gap_x = (b.x - a.right()).max(a.x - b.right());
                    let gap_y = (b.y - a.bottom()).max(a.y - b.bottom());
                    prop_assert!(
                        gap_x >= kerf - EPSILON || gap_y >= kerf - EPSILON,
                        "{:?} and {:?} closer than the kerf", a, b
                    );
                }
            }
        }
    }
}
