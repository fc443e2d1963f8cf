//! User-facing purchase error taxonomy and the raw-message classifier
//!
//! Wallet and ledger libraries report failures as vendor-specific message
//! strings. The classifier maps those strings into a small, stable taxonomy
//! through an ordered list of substring rules; the first matching rule
//! governs. The rule list is configuration-driven so new vendor strings can
//! be added without touching control flow. Anything unmatched falls back to
//! `Unknown(message)` deliberately; no further guessing is attempted.

use thiserror::Error;

use crate::config::{ClassifierConfig, ClassifierRuleConfig};
use crate::pricing::PricingError;
use crate::tx_builder::TxBuildError;

/// Terminal, user-facing purchase failure
///
/// `UserDeclined`, `LockedUtxos`, `InsufficientFunds` and `Unknown` are
/// produced by the classifier from raw message text. The remaining variants
/// are produced structurally by the engine and builder.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PurchaseError {
    #[error("TX build failed: you declined the transaction.")]
    UserDeclined,

    #[error(
        "TX build failed: not enough ADA to process TX, please add ADA to your wallet, then try again."
    )]
    InsufficientFunds,

    #[error("TX build failed: your UTXOs are locked, please unlock them using https://unfrack.it")]
    LockedUtxos,

    #[error("the network did not confirm the transaction within {waited_secs} seconds")]
    ConfirmationTimeout { waited_secs: u64 },

    #[error("invalid quantity {quantity}: choose one of the offered batch sizes")]
    InvalidQuantity { quantity: u8 },

    #[error("a purchase is already in progress, please wait for it to finish")]
    FlowBusy,

    #[error(
        "The portal is closed at the moment, please check in with our community for further announcements."
    )]
    EventClosed,

    #[error("sold out!")]
    SoldOut,

    #[error("only {remaining} remain, requested {requested}")]
    NotEnoughRemaining { requested: u64, remaining: u64 },

    #[error("no wallet connected")]
    WalletNotConnected,

    #[error("you connected manually, please re-connect in a non-manual way")]
    ManualConnection,

    #[error("{0}")]
    Unknown(String),
}

impl PurchaseError {
    /// Whether re-initiating the purchase could plausibly succeed without
    /// the user changing anything first
    pub fn is_retryable(&self) -> bool {
        match self {
            // The transaction may well have landed; the user can retry the
            // flow once the prior one is observed on chain.
            Self::ConfirmationTimeout { .. } => true,
            Self::FlowBusy => true,
            Self::Unknown(_) => true,

            // The user must act first (fund, unfrack, reconnect, wait for
            // the event) before retrying.
            Self::UserDeclined => false,
            Self::InsufficientFunds => false,
            Self::LockedUtxos => false,
            Self::InvalidQuantity { .. } => false,
            Self::EventClosed => false,
            Self::SoldOut => false,
            Self::NotEnoughRemaining { .. } => false,
            Self::WalletNotConnected => false,
            Self::ManualConnection => false,
        }
    }

    /// Error category label for metrics and structured logs
    pub fn category(&self) -> &'static str {
        match self {
            Self::UserDeclined => "user_declined",
            Self::InsufficientFunds => "insufficient_funds",
            Self::LockedUtxos => "locked_utxos",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::FlowBusy => "flow_busy",
            Self::EventClosed => "event_closed",
            Self::SoldOut => "sold_out",
            Self::NotEnoughRemaining { .. } => "not_enough_remaining",
            Self::WalletNotConnected => "wallet_not_connected",
            Self::ManualConnection => "manual_connection",
            Self::Unknown(_) => "unknown",
        }
    }
}

impl From<PricingError> for PurchaseError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InvalidQuantity { quantity, .. } => Self::InvalidQuantity { quantity },
            PricingError::Configuration(msg) => Self::Unknown(msg),
        }
    }
}

impl From<TxBuildError> for PurchaseError {
    fn from(err: TxBuildError) -> Self {
        match err {
            // Builder-level input shortage surfaces to the user as the
            // insufficient-funds message.
            TxBuildError::InsufficientInputs { .. } => Self::InsufficientFunds,
            TxBuildError::Pricing(pricing) => pricing.into(),
        }
    }
}

/// Error kind a classifier rule maps to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedKind {
    UserDeclined,
    LockedUtxos,
    InsufficientFunds,
}

impl ClassifiedKind {
    fn to_error(self) -> PurchaseError {
        match self {
            Self::UserDeclined => PurchaseError::UserDeclined,
            Self::LockedUtxos => PurchaseError::LockedUtxos,
            Self::InsufficientFunds => PurchaseError::InsufficientFunds,
        }
    }

    fn parse(kind: &str) -> Option<Self> {
        match kind {
            "user_declined" => Some(Self::UserDeclined),
            "locked_utxos" => Some(Self::LockedUtxos),
            "insufficient_funds" => Some(Self::InsufficientFunds),
            _ => None,
        }
    }
}

/// A single (substring, kind) classification rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierRule {
    pub pattern: String,
    pub kind: ClassifiedKind,
}

/// Ordered-rule error classifier
///
/// Rules are evaluated top to bottom; the first rule whose pattern appears
/// in the raw message wins. Configured rules run before the defaults so a
/// deployment can shadow them when a vendor changes its wording.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    rules: Vec<ClassifierRule>,
}

impl ErrorClassifier {
    /// Built-in rules matching the wallet/ledger libraries in production
    /// use today, in priority order
    pub fn default_rules() -> Vec<ClassifierRule> {
        vec![
            ClassifierRule {
                // [BrowserWallet] An error occurred during signTx:
                // {"code":2,"info":"User declined to sign the transaction."}
                pattern: "User declined to sign the transaction.".to_string(),
                kind: ClassifiedKind::UserDeclined,
            },
            ClassifierRule {
                // [Transaction] An error occurred during build: Not enough
                // ADA leftover to include non-ADA assets in a change address.
                pattern: "Not enough ADA leftover to include non-ADA assets".to_string(),
                kind: ClassifiedKind::LockedUtxos,
            },
            ClassifierRule {
                // [Transaction] An error occurred during build: UTxO Balance
                // Insufficient.
                pattern: "UTxO Balance Insufficient".to_string(),
                kind: ClassifiedKind::InsufficientFunds,
            },
        ]
    }

    /// Classifier with only the built-in rules
    pub fn new() -> Self {
        Self {
            rules: Self::default_rules(),
        }
    }

    /// Classifier with configured rules ahead of the built-ins
    ///
    /// Configured rules with an unrecognised kind are skipped with a
    /// warning rather than rejected, so a config typo cannot take the
    /// purchase flow down.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        let mut rules: Vec<ClassifierRule> = config
            .rules
            .iter()
            .filter_map(|rule| Self::parse_rule(rule))
            .collect();
        rules.extend(Self::default_rules());
        Self { rules }
    }

    fn parse_rule(rule: &ClassifierRuleConfig) -> Option<ClassifierRule> {
        match ClassifiedKind::parse(&rule.kind) {
            Some(kind) => Some(ClassifierRule {
                pattern: rule.pattern.clone(),
                kind,
            }),
            None => {
                tracing::warn!(
                    pattern = %rule.pattern,
                    kind = %rule.kind,
                    "Skipping classifier rule with unknown kind"
                );
                None
            }
        }
    }

    /// Map a raw failure message to a `PurchaseError`
    ///
    /// Deterministic: the same message always yields the same variant, and
    /// when a message matches several rules the earliest rule governs.
    pub fn classify(&self, raw_message: &str) -> PurchaseError {
        for rule in &self.rules {
            if raw_message.contains(&rule.pattern) {
                return rule.kind.to_error();
            }
        }
        PurchaseError::Unknown(raw_message.to_string())
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}
