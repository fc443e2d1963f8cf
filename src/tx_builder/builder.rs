//! Coin selection and transaction assembly

use tracing::debug;

use crate::config::{PricingConfig, TreasuryConfig};
use crate::pricing;
use crate::tx_builder::errors::TxBuildError;
use crate::tx_builder::output::{OutputRole, TxOutput, UnsignedTransaction};
use crate::types::{PurchaseRequest, Utxo};

/// Keep-relevant coin selection
///
/// Selects the smallest prefix of inputs, largest first, whose combined
/// lovelace covers the required total. Ties are broken by tx hash and
/// output index so the selection is fully deterministic for a given input
/// set.
pub fn keep_relevant(
    required_lovelace: u64,
    spendable: &[Utxo],
) -> Result<Vec<Utxo>, TxBuildError> {
    let mut ordered: Vec<Utxo> = spendable.to_vec();
    ordered.sort_by(|a, b| {
        b.lovelace
            .cmp(&a.lovelace)
            .then_with(|| a.tx_hash.cmp(&b.tx_hash))
            .then_with(|| a.output_index.cmp(&b.output_index))
    });

    let mut selected = Vec::new();
    let mut covered: u64 = 0;
    for utxo in ordered {
        if covered >= required_lovelace {
            break;
        }
        covered += utxo.lovelace;
        selected.push(utxo);
    }

    if covered < required_lovelace {
        return Err(TxBuildError::InsufficientInputs {
            required_lovelace,
            available_lovelace: covered,
        });
    }
    Ok(selected)
}

/// Builds unsigned purchase transactions against fixed payout addresses
#[derive(Debug, Clone)]
pub struct TxBuilder {
    treasury: TreasuryConfig,
    pricing: PricingConfig,
}

impl TxBuilder {
    pub fn new(treasury: TreasuryConfig, pricing: PricingConfig) -> Self {
        Self { treasury, pricing }
    }

    /// Assemble an unsigned transaction for the request
    ///
    /// Deterministic given the same request and spendable inputs. The
    /// output order is fixed (app, treasury, dev) to keep the transaction
    /// format stable for audits.
    pub fn build(
        &self,
        request: &PurchaseRequest,
        spendable: &[Utxo],
    ) -> Result<UnsignedTransaction, TxBuildError> {
        let split = pricing::compute_split(
            request,
            self.pricing.app_fee_ada,
            &self.pricing.allowed_quantities,
        )?;
        let required_lovelace = split.total_lovelace();

        let inputs = keep_relevant(required_lovelace, spendable)?;

        debug!(
            quantity = request.quantity,
            required_lovelace,
            inputs = inputs.len(),
            "Assembled purchase transaction"
        );

        Ok(UnsignedTransaction {
            inputs,
            outputs: vec![
                TxOutput {
                    address: self.treasury.app_address.clone(),
                    lovelace: split.app_fee_lovelace,
                    role: OutputRole::AppFee,
                },
                TxOutput {
                    address: self.treasury.treasury_address.clone(),
                    lovelace: split.treasury_share_lovelace,
                    role: OutputRole::Treasury,
                },
                TxOutput {
                    address: self.treasury.dev_address.clone(),
                    lovelace: split.dev_share_lovelace,
                    role: OutputRole::Dev,
                },
            ],
            required_lovelace,
        })
    }
}
