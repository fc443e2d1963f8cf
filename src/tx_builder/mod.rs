//! Transaction Builder component
//!
//! Assembles the unsigned ledger transaction for a purchase: selects
//! spendable inputs covering the required total via the keep-relevant
//! heuristic, then appends the three payment outputs in fixed order
//! (app fee, treasury share, dev share) so the transaction format stays
//! stable for audits.
//!
//! Split into focused modules:
//! - **errors**: builder error taxonomy
//! - **output**: the opaque `UnsignedTransaction` artifact and its outputs
//! - **builder**: coin selection and output assembly

pub mod builder;
pub mod errors;
pub mod output;

pub use builder::{keep_relevant, TxBuilder};
pub use errors::TxBuildError;
pub use output::{OutputRole, SignedTransaction, TxOutput, UnsignedTransaction};
