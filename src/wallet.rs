//! Wallet collaborator port
//!
//! The core treats the user's wallet as an opaque capability: it can report
//! its connection status, list spendable inputs, sign an unsigned
//! transaction and submit the signed result. Connection lifecycle
//! (connecting, disconnecting, picking a wallet) is managed outside the
//! core.
//!
//! Failures are surfaced as `anyhow::Error` carrying the vendor's raw
//! message text; the engine runs that text through the error classifier.

use anyhow::Result;
use async_trait::async_trait;

use crate::tx_builder::{SignedTransaction, UnsignedTransaction};
use crate::types::{Utxo, WalletStatus};

/// Operations the purchase flow consumes from a connected wallet
#[async_trait]
pub trait WalletPort: Send + Sync {
    /// Current connection status; checked by the eligibility guards
    fn status(&self) -> WalletStatus;

    /// Spendable UTXOs available for coin selection
    async fn spendable_inputs(&self) -> Result<Vec<Utxo>>;

    /// Request a signature; may block indefinitely on user interaction.
    /// A decline fails with the wallet's decline message.
    async fn sign(&self, unsigned: &UnsignedTransaction) -> Result<SignedTransaction>;

    /// Submit the signed transaction; returns the transaction hash
    async fn submit(&self, signed: &SignedTransaction) -> Result<String>;
}
