//! Property tests for the fee split conservation invariants

use proptest::prelude::*;

use crate::pricing::{compute_split, to_lovelace};
use crate::types::PurchaseRequest;

proptest! {
    /// For every allowed quantity and a wide range of prices, discounts
    /// and fees: the three outputs conserve the purchase total exactly,
    /// and the treasury and dev shares are equal.
    #[test]
    fn split_conserves_total_and_shares_are_equal(
        quantity in prop::sample::select(vec![1u8, 5]),
        base_price_ada in 1u32..=500,
        discount_pct in prop::option::of(1u32..=100),
        app_fee_tenths in 0u32..=50,
    ) {
        let request = PurchaseRequest {
            quantity,
            unit_price_ada: base_price_ada as f64,
            discount_factor: discount_pct.map(|pct| pct as f64 / 100.0),
        };
        let app_fee_ada = app_fee_tenths as f64 / 10.0;

        // Skip combinations the calculator rejects by contract
        prop_assume!(app_fee_ada < request.unit_price_ada);
        let unit_total = to_lovelace(request.effective_unit_price_ada());
        prop_assume!(to_lovelace(app_fee_ada) <= unit_total);

        let split = compute_split(&request, app_fee_ada, &[1, 5]).unwrap();

        prop_assert_eq!(split.total_lovelace(), quantity as u64 * unit_total);
        prop_assert_eq!(split.treasury_share_lovelace, split.dev_share_lovelace);
    }

    /// Quantities outside the allowed set are always rejected
    #[test]
    fn disallowed_quantities_rejected(quantity in 0u8..=20) {
        prop_assume!(quantity != 1 && quantity != 5);
        let request = PurchaseRequest {
            quantity,
            unit_price_ada: 49.0,
            discount_factor: None,
        };
        prop_assert!(compute_split(&request, 2.0, &[1, 5]).is_err());
    }
}
