//! Fee and price calculation for purchase requests
//!
//! Pure arithmetic, no side effects. All amounts are converted to lovelace
//! before splitting so the conservation invariant holds exactly:
//! `app_fee + treasury_share + dev_share == quantity * effective_price`.

use thiserror::Error;

use crate::types::{FeeSplit, PurchaseRequest, LOVELACE_PER_ADA};

/// Errors from the fee/price calculator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    /// Requested quantity is not in the allowed batch-size set
    #[error("invalid quantity {quantity}, allowed: {allowed:?}")]
    InvalidQuantity { quantity: u8, allowed: Vec<u8> },

    /// Input constraint violation (non-positive price, bad discount, fee
    /// exceeding the unit price)
    #[error("pricing configuration error: {0}")]
    Configuration(String),
}

/// Convert an ADA amount to lovelace, rounding to the nearest unit
pub fn to_lovelace(ada: f64) -> u64 {
    (ada * LOVELACE_PER_ADA as f64).round() as u64
}

/// Compute the three-way fee split for a purchase request
///
/// The split is derived per unit and scaled by the quantity:
/// - the app fee output receives `app_fee_per_unit_ada` per unit;
/// - the remainder of the effective unit price is divided evenly between
///   the treasury and dev outputs.
///
/// When the per-unit remainder is an odd number of lovelace the spare
/// lovelace folds into the app fee, keeping the treasury and dev shares
/// equal while conserving the total.
pub fn compute_split(
    request: &PurchaseRequest,
    app_fee_per_unit_ada: f64,
    allowed_quantities: &[u8],
) -> Result<FeeSplit, PricingError> {
    if !allowed_quantities.contains(&request.quantity) {
        return Err(PricingError::InvalidQuantity {
            quantity: request.quantity,
            allowed: allowed_quantities.to_vec(),
        });
    }
    if request.unit_price_ada <= 0.0 {
        return Err(PricingError::Configuration(format!(
            "base price must be positive, got {}",
            request.unit_price_ada
        )));
    }
    if let Some(factor) = request.discount_factor {
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(PricingError::Configuration(format!(
                "discount factor {} outside (0, 1]",
                factor
            )));
        }
    }
    if app_fee_per_unit_ada < 0.0 || app_fee_per_unit_ada >= request.unit_price_ada {
        return Err(PricingError::Configuration(format!(
            "app fee {} must be in [0, base price)",
            app_fee_per_unit_ada
        )));
    }

    let unit_total = to_lovelace(request.effective_unit_price_ada());
    let unit_app_fee = to_lovelace(app_fee_per_unit_ada);

    // The discount applies to the whole price, so a large fee combined with
    // a deep discount can leave nothing to split.
    let unit_remainder = unit_total.checked_sub(unit_app_fee).ok_or_else(|| {
        PricingError::Configuration(format!(
            "app fee {} lovelace exceeds discounted unit price {} lovelace",
            unit_app_fee, unit_total
        ))
    })?;

    let unit_share = unit_remainder / 2;
    let odd_lovelace = unit_remainder % 2;
    let quantity = request.quantity as u64;

    Ok(FeeSplit {
        app_fee_lovelace: (unit_app_fee + odd_lovelace) * quantity,
        treasury_share_lovelace: unit_share * quantity,
        dev_share_lovelace: unit_share * quantity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(quantity: u8) -> PurchaseRequest {
        PurchaseRequest {
            quantity,
            unit_price_ada: 49.0,
            discount_factor: Some(0.5),
        }
    }

    #[test]
    fn test_discounted_split_single() {
        // 49 ADA at 50% off with a 2 ADA fee: 24.5 total, 11.25 per share
        let split = compute_split(&request(1), 2.0, &[1, 5]).unwrap();
        assert_eq!(split.app_fee_lovelace, 2_000_000);
        assert_eq!(split.treasury_share_lovelace, 11_250_000);
        assert_eq!(split.dev_share_lovelace, 11_250_000);
        assert_eq!(split.total_lovelace(), 24_500_000);
    }

    #[test]
    fn test_split_scales_with_quantity() {
        let split = compute_split(&request(5), 2.0, &[1, 5]).unwrap();
        assert_eq!(split.app_fee_lovelace, 10_000_000);
        assert_eq!(split.treasury_share_lovelace, 56_250_000);
        assert_eq!(split.dev_share_lovelace, 56_250_000);
        assert_eq!(split.total_lovelace(), 5 * 24_500_000);
    }

    #[test]
    fn test_full_price_when_no_discount() {
        let full = PurchaseRequest {
            quantity: 1,
            unit_price_ada: 49.0,
            discount_factor: None,
        };
        let split = compute_split(&full, 2.0, &[1, 5]).unwrap();
        assert_eq!(split.total_lovelace(), 49_000_000);
        assert_eq!(split.treasury_share_lovelace, 23_500_000);
    }

    #[test]
    fn test_odd_remainder_folds_into_app_fee() {
        // 10.000001 ADA with a 1 ADA fee leaves an odd remainder of
        // 9_000_001 lovelace; the spare lovelace goes to the app fee.
        let odd = PurchaseRequest {
            quantity: 1,
            unit_price_ada: 10.000001,
            discount_factor: None,
        };
        let split = compute_split(&odd, 1.0, &[1]).unwrap();
        assert_eq!(split.treasury_share_lovelace, split.dev_share_lovelace);
        assert_eq!(split.app_fee_lovelace, 1_000_001);
        assert_eq!(split.total_lovelace(), 10_000_001);
    }

    #[test]
    fn test_invalid_quantity_rejected() {
        let err = compute_split(&request(3), 2.0, &[1, 5]).unwrap_err();
        assert!(matches!(
            err,
            PricingError::InvalidQuantity { quantity: 3, .. }
        ));
    }

    #[test]
    fn test_constraint_violations_rejected() {
        let mut bad = request(1);
        bad.unit_price_ada = 0.0;
        assert!(matches!(
            compute_split(&bad, 2.0, &[1]),
            Err(PricingError::Configuration(_))
        ));

        let mut bad = request(1);
        bad.discount_factor = Some(1.1);
        assert!(matches!(
            compute_split(&bad, 2.0, &[1]),
            Err(PricingError::Configuration(_))
        ));

        // Fee below base price but above the discounted unit price
        let deep_discount = PurchaseRequest {
            quantity: 1,
            unit_price_ada: 49.0,
            discount_factor: Some(0.01),
        };
        assert!(matches!(
            compute_split(&deep_discount, 2.0, &[1]),
            Err(PricingError::Configuration(_))
        ));
    }
}
