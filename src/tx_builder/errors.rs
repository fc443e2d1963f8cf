//! Error types for the Transaction Builder

use thiserror::Error;

use crate::pricing::PricingError;

/// Errors raised while assembling an unsigned transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxBuildError {
    /// No subset of the spendable inputs covers the required total
    ///
    /// Surfaces to the user as `PurchaseError::InsufficientFunds` once
    /// classified upstream.
    #[error(
        "insufficient inputs: required {required_lovelace} lovelace, spendable {available_lovelace}"
    )]
    InsufficientInputs {
        required_lovelace: u64,
        available_lovelace: u64,
    },

    /// The fee split could not be computed for this request
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

impl TxBuildError {
    /// Error category for metrics and structured logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::InsufficientInputs { .. } => "insufficient_inputs",
            Self::Pricing(_) => "pricing",
        }
    }
}
