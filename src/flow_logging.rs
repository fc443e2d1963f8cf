//! Structured logging and flow context

use uuid::Uuid;

use crate::types::TransactionLifecycleState;

/// Structured logger for purchase flow events
#[derive(Debug, Clone)]
pub struct FlowLogger {
    flow_id: String,
}

impl FlowLogger {
    pub fn new(flow_id: String) -> Self {
        Self { flow_id }
    }

    pub fn log_flow_started(&self, quantity: u8, total_lovelace: u64) {
        tracing::info!(
            flow_id = %self.flow_id,
            quantity = %quantity,
            total_lovelace = %total_lovelace,
            "Purchase flow started"
        );
    }

    pub fn log_state_transition(
        &self,
        from: TransactionLifecycleState,
        to: TransactionLifecycleState,
    ) {
        tracing::debug!(
            flow_id = %self.flow_id,
            from = ?from,
            to = ?to,
            "Lifecycle transition"
        );
    }

    pub fn log_purchase_success(&self, tx_hash: &str, latency_ms: u64, mint_deferred: bool) {
        tracing::info!(
            flow_id = %self.flow_id,
            tx_hash = %tx_hash,
            latency_ms = %latency_ms,
            mint_deferred = %mint_deferred,
            "Purchase succeeded"
        );
    }

    pub fn log_purchase_failure(&self, category: &str, message: &str, latency_ms: u64) {
        tracing::warn!(
            flow_id = %self.flow_id,
            category = %category,
            error = %message,
            latency_ms = %latency_ms,
            "Purchase failed"
        );
    }

    pub fn log_guard_rejection(&self, category: &str) {
        tracing::info!(
            flow_id = %self.flow_id,
            category = %category,
            "Eligibility guard rejected purchase"
        );
    }
}

/// Per-flow execution context
#[derive(Debug, Clone)]
pub struct FlowContext {
    /// Unique flow ID, carried through every log line of the purchase
    pub flow_id: String,

    /// Structured logger bound to this flow
    pub logger: FlowLogger,
}

impl FlowContext {
    pub fn new() -> Self {
        let flow_id = Uuid::new_v4().to_string();
        Self {
            logger: FlowLogger::new(flow_id.clone()),
            flow_id,
        }
    }
}

impl Default for FlowContext {
    fn default() -> Self {
        Self::new()
    }
}
