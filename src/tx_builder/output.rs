//! Unsigned transaction artifact and its payment outputs
//!
//! `UnsignedTransaction` is owned by the builder until it is handed to the
//! wallet collaborator for signing; it is never mutated afterwards. The
//! signed form is an opaque blob owned by the submission collaborator.

use serde::{Deserialize, Serialize};

use crate::types::Utxo;

/// Role of a payment output within the purchase transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputRole {
    AppFee,
    Treasury,
    Dev,
}

/// A single lovelace payment output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub lovelace: u64,
    pub role: OutputRole,
}

/// An assembled, unsigned purchase transaction
///
/// Outputs are always in fixed order (app fee, treasury, dev). Change back
/// to the purchaser is computed by the wallet at signing time, as is the
/// network fee; the builder only guarantees the selected inputs cover the
/// three payment outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Inputs chosen by coin selection
    pub inputs: Vec<Utxo>,

    /// Payment outputs in fixed order
    pub outputs: Vec<TxOutput>,

    /// Lovelace total the inputs were selected to cover
    pub required_lovelace: u64,
}

impl UnsignedTransaction {
    /// Total lovelace held by the selected inputs
    pub fn input_lovelace(&self) -> u64 {
        self.inputs.iter().map(|utxo| utxo.lovelace).sum()
    }

    /// Total lovelace across the payment outputs
    pub fn output_lovelace(&self) -> u64 {
        self.outputs.iter().map(|out| out.lovelace).sum()
    }
}

/// A wallet-signed transaction, opaque to the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction(pub String);
