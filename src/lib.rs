//! Bling Portal - NFT purchase transaction orchestrator
//!
//! This library exposes the core purchase-flow modules for embedding and
//! integration testing: pricing, inventory tracking, transaction building,
//! error classification and the purchase engine itself.

pub mod classifier;
pub mod config;
pub mod confirm;
pub mod endpoints;
pub mod engine;
pub mod flow_logging;
pub mod inventory;
pub mod metrics;
pub mod minting;
pub mod pricing;
pub mod tx_builder;
pub mod types;
pub mod wallet;

// Re-export commonly used types
pub use classifier::{ErrorClassifier, PurchaseError};
pub use engine::{PurchaseEngine, PurchaseFeed};
pub use types::{
    FeeSplit, InventorySnapshot, Notice, PurchaseOutcome, PurchaseRequest,
    TransactionLifecycleState,
};

#[cfg(test)]
mod tests {
    mod engine_tests;
    mod http_endpoint_tests;
    mod pricing_property_tests;
    mod test_helpers;
}
