//! Common types used throughout the purchase flow

use serde::{Deserialize, Serialize};

/// Lovelace per ADA (the ledger's smallest unit)
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// A purchase request for a fixed batch of mints
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseRequest {
    /// Requested batch size; must belong to the configured allowed set
    pub quantity: u8,

    /// Base unit price in ADA
    pub unit_price_ada: f64,

    /// Optional discount factor in (0, 1]
    pub discount_factor: Option<f64>,
}

impl PurchaseRequest {
    /// Effective per-unit price in ADA after applying the discount, if any
    pub fn effective_unit_price_ada(&self) -> f64 {
        match self.discount_factor {
            Some(factor) => self.unit_price_ada * factor,
            None => self.unit_price_ada,
        }
    }
}

/// Deterministic three-way split of the purchase total, in lovelace
///
/// Invariants (enforced by `pricing::compute_split`):
/// - `app_fee + treasury_share + dev_share == quantity * effective_price`
/// - `treasury_share == dev_share`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    pub app_fee_lovelace: u64,
    pub treasury_share_lovelace: u64,
    pub dev_share_lovelace: u64,
}

impl FeeSplit {
    /// Total lovelace the purchase moves across all three outputs
    pub fn total_lovelace(&self) -> u64 {
        self.app_fee_lovelace + self.treasury_share_lovelace + self.dev_share_lovelace
    }
}

/// Lifecycle of a single purchase flow
///
/// The engine is the sole writer; observers read it through a watch channel.
/// Exactly one flow may occupy a non-`Idle` state at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionLifecycleState {
    Idle,
    Building,
    AwaitingSignature,
    Submitting,
    AwaitingConfirmation,
    PostProcessing,
    Succeeded,
    Failed,
}

impl TransactionLifecycleState {
    /// Terminal states end the flow and release the single-flow guard
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Remaining-item counts derived from the counts endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    /// Items remaining in the single-mint category
    pub single_remaining: u64,

    /// Full sets remaining: minimum across the configured set categories,
    /// a missing category counting as zero
    pub set_remaining: u64,
}

/// An unspent transaction output usable as a transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    /// Hash of the transaction that created this output
    pub tx_hash: String,

    /// Index of the output within that transaction
    pub output_index: u32,

    /// Spendable lovelace held by this output
    pub lovelace: u64,
}

/// Wallet connection mode as reported by the wallet collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionMode {
    /// Normal dApp connector session; full signing capability
    Standard,
    /// Manually-entered address; signing is unavailable
    Manual,
}

/// Connection status snapshot from the wallet collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletStatus {
    pub connected: bool,
    pub mode: ConnectionMode,
}

impl WalletStatus {
    /// True when the wallet can actually sign a transaction
    pub fn can_sign(&self) -> bool {
        self.connected && self.mode == ConnectionMode::Standard
    }
}

/// User-visible status notification emitted by the purchase engine
///
/// Notices arrive in lifecycle order. A `Dismiss` retracts the previous
/// transient (`Loading`) notice before its successor is shown, mirroring
/// how a toast renderer replaces an in-progress message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Transient progress message for the current stage
    Loading(String),
    /// Retract the previous transient notice
    Dismiss,
    /// Terminal or milestone success message
    Success(String),
    /// Terminal failure message (already classified, human readable)
    Error(String),
}

/// Terminal outcome of a successful purchase flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    /// On-chain transfer confirmed and the mint request was accepted
    Minted { tx_hash: String },
    /// On-chain transfer confirmed but the mint request was deferred to a
    /// background retry; the item will be minted later
    MintPending { tx_hash: String },
}

impl PurchaseOutcome {
    pub fn tx_hash(&self) -> &str {
        match self {
            Self::Minted { tx_hash } | Self::MintPending { tx_hash } => tx_hash,
        }
    }
}
