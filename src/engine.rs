//! Purchase Orchestrator
//!
//! Drives the end-to-end purchase flow: eligibility guards, transaction
//! build, wallet signature, ledger submission, bounded confirmation
//! polling, and the best-effort minting notification. The engine is the
//! sole owner and writer of `TransactionLifecycleState`; presentation code
//! observes it through a watch channel and consumes user-visible `Notice`
//! values from an unbounded channel, in lifecycle order.
//!
//! At most one flow may be active per engine. The start operation is an
//! atomic check-and-set on the lifecycle cell; a start while a flow is in
//! progress is rejected with `FlowBusy` and mutates nothing. A terminal
//! transition (either way) resets the cell to `Idle` so the next purchase
//! can start.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use tokio::sync::{mpsc, watch};

use crate::classifier::{ErrorClassifier, PurchaseError};
use crate::config::Config;
use crate::confirm::{self, ChainQuery};
use crate::flow_logging::FlowContext;
use crate::inventory::InventoryTracker;
use crate::metrics::metrics;
use crate::minting::{self, MintPort};
use crate::tx_builder::TxBuilder;
use crate::types::{
    Notice, PurchaseOutcome, PurchaseRequest, TransactionLifecycleState as Lifecycle,
};
use crate::wallet::WalletPort;

/// Observation side of a purchase engine: lifecycle state plus the notice
/// stream a renderer subscribes to
pub struct PurchaseFeed {
    pub lifecycle: watch::Receiver<Lifecycle>,
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

/// Orchestrates purchase flows against the wallet, ledger and minting
/// collaborators
pub struct PurchaseEngine {
    wallet: Arc<dyn WalletPort>,
    chain: Arc<dyn ChainQuery>,
    mint: Arc<dyn MintPort>,
    inventory: Arc<InventoryTracker>,
    builder: TxBuilder,
    classifier: ErrorClassifier,
    config: Config,

    /// Single-flow guard; the watch channel mirrors it for observers
    state: Mutex<Lifecycle>,
    lifecycle_tx: watch::Sender<Lifecycle>,
    notices_tx: mpsc::UnboundedSender<Notice>,
}

impl PurchaseEngine {
    pub fn new(
        config: Config,
        wallet: Arc<dyn WalletPort>,
        chain: Arc<dyn ChainQuery>,
        mint: Arc<dyn MintPort>,
        inventory: Arc<InventoryTracker>,
    ) -> (Self, PurchaseFeed) {
        let (lifecycle_tx, lifecycle_rx) = watch::channel(Lifecycle::Idle);
        let (notices_tx, notices_rx) = mpsc::unbounded_channel();

        let engine = Self {
            wallet,
            chain,
            mint,
            inventory,
            builder: TxBuilder::new(config.treasury.clone(), config.pricing.clone()),
            classifier: ErrorClassifier::from_config(&config.classifier),
            config,
            state: Mutex::new(Lifecycle::Idle),
            lifecycle_tx,
            notices_tx,
        };
        let feed = PurchaseFeed {
            lifecycle: lifecycle_rx,
            notices: notices_rx,
        };
        (engine, feed)
    }

    /// Run one purchase flow for the given batch size
    ///
    /// Returns the terminal outcome, or the classified error that moved
    /// the flow to `Failed`. A call while another flow is active returns
    /// `FlowBusy` without touching any state.
    pub async fn purchase(&self, quantity: u8) -> Result<PurchaseOutcome, PurchaseError> {
        let ctx = FlowContext::new();
        self.try_begin(&ctx)?;

        let started = Instant::now();
        match self.run_flow(&ctx, quantity).await {
            Ok(outcome) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                ctx.logger.log_purchase_success(
                    outcome.tx_hash(),
                    latency_ms,
                    matches!(outcome, PurchaseOutcome::MintPending { .. }),
                );
                metrics().purchases_succeeded.inc();
                metrics().purchase_latency.observe(started.elapsed().as_secs_f64());
                self.finish(&ctx, Lifecycle::Succeeded);
                Ok(outcome)
            }
            Err(err) => {
                let latency_ms = started.elapsed().as_millis() as u64;
                ctx.logger
                    .log_purchase_failure(err.category(), &err.to_string(), latency_ms);
                self.notify(Notice::Dismiss);
                self.notify(Notice::Error(err.to_string()));
                metrics().purchases_failed.inc();
                self.finish(&ctx, Lifecycle::Failed);
                Err(err)
            }
        }
    }

    /// Atomic `Idle -> Building` check-and-set
    fn try_begin(&self, ctx: &FlowContext) -> Result<(), PurchaseError> {
        let mut state = self.state.lock().expect("lifecycle lock");
        if *state != Lifecycle::Idle {
            metrics().purchases_rejected_busy.inc();
            return Err(PurchaseError::FlowBusy);
        }
        *state = Lifecycle::Building;
        drop(state);

        self.lifecycle_tx.send_replace(Lifecycle::Building);
        ctx.logger
            .log_state_transition(Lifecycle::Idle, Lifecycle::Building);
        metrics().purchases_started.inc();
        metrics().active_flows.set(1);
        Ok(())
    }

    async fn run_flow(
        &self,
        ctx: &FlowContext,
        quantity: u8,
    ) -> Result<PurchaseOutcome, PurchaseError> {
        self.check_eligibility(ctx, quantity).await?;

        // Build
        self.notify(Notice::Loading("Building transaction".to_string()));
        let request = PurchaseRequest {
            quantity,
            unit_price_ada: self.config.pricing.base_price_ada,
            discount_factor: self.config.pricing.discount_factor,
        };
        let spendable = self
            .wallet
            .spendable_inputs()
            .await
            .map_err(|err| self.classifier.classify(&err.to_string()))?;
        let unsigned = self.builder.build(&request, &spendable)?;
        ctx.logger
            .log_flow_started(quantity, unsigned.required_lovelace);

        // Sign
        self.transition(ctx, Lifecycle::AwaitingSignature);
        self.notify(Notice::Dismiss);
        self.notify(Notice::Loading("Awaiting signature".to_string()));
        let signed = self
            .wallet
            .sign(&unsigned)
            .await
            .map_err(|err| self.classifier.classify(&err.to_string()))?;

        // Submit
        self.transition(ctx, Lifecycle::Submitting);
        self.notify(Notice::Dismiss);
        self.notify(Notice::Loading("Submitting transaction".to_string()));
        let tx_hash = self
            .wallet
            .submit(&signed)
            .await
            .map_err(|err| self.classifier.classify(&err.to_string()))?;

        // Confirm
        self.transition(ctx, Lifecycle::AwaitingConfirmation);
        self.notify(Notice::Dismiss);
        self.notify(Notice::Loading("Awaiting network confirmation".to_string()));
        let confirm_started = Instant::now();
        confirm::await_confirmation(self.chain.as_ref(), &tx_hash, &self.config.confirmation)
            .await?;
        metrics()
            .confirmation_latency
            .observe(confirm_started.elapsed().as_secs_f64());
        self.notify(Notice::Dismiss);
        self.notify(Notice::Success("Transaction submitted!".to_string()));

        // Post-process: best-effort mint notification. The funds have
        // already moved on chain, so a failure here is a soft success.
        self.transition(ctx, Lifecycle::PostProcessing);
        self.notify(Notice::Loading("Minting NFT...".to_string()));
        match self.mint.request_mint(&tx_hash).await {
            Ok(()) => {
                self.notify(Notice::Dismiss);
                self.notify(Notice::Success("Minted!".to_string()));
                Ok(PurchaseOutcome::Minted { tx_hash })
            }
            Err(err) => {
                minting::defer_mint(
                    Arc::clone(&self.mint),
                    &tx_hash,
                    &self.config.minting,
                    &err.to_string(),
                );
                self.notify(Notice::Dismiss);
                self.notify(Notice::Success("Soon to be minted!".to_string()));
                Ok(PurchaseOutcome::MintPending { tx_hash })
            }
        }
    }

    /// Eligibility guards, all checked before any external system is
    /// contacted. Any failure moves the flow straight to `Failed` with a
    /// descriptive, non-retryable error.
    async fn check_eligibility(&self, ctx: &FlowContext, quantity: u8) -> Result<(), PurchaseError> {
        let guard_result = self.eligibility(quantity).await;
        if let Err(err) = &guard_result {
            ctx.logger.log_guard_rejection(err.category());
        }
        guard_result
    }

    async fn eligibility(&self, quantity: u8) -> Result<(), PurchaseError> {
        if !self.config.pricing.allowed_quantities.contains(&quantity) {
            return Err(PurchaseError::InvalidQuantity { quantity });
        }
        if !self.config.event.open {
            return Err(PurchaseError::EventClosed);
        }
        if self.config.event.sold_out {
            return Err(PurchaseError::SoldOut);
        }

        let snapshot = self.inventory.snapshot().await;
        if snapshot.single_remaining < quantity as u64 {
            return Err(PurchaseError::NotEnoughRemaining {
                requested: quantity as u64,
                remaining: snapshot.single_remaining,
            });
        }

        let status = self.wallet.status();
        if !status.connected {
            return Err(PurchaseError::WalletNotConnected);
        }
        if !status.can_sign() {
            return Err(PurchaseError::ManualConnection);
        }
        Ok(())
    }

    fn transition(&self, ctx: &FlowContext, to: Lifecycle) {
        let mut state = self.state.lock().expect("lifecycle lock");
        let from = *state;
        *state = to;
        drop(state);

        self.lifecycle_tx.send_replace(to);
        ctx.logger.log_state_transition(from, to);
    }

    /// Publish the terminal state and release the single-flow guard
    fn finish(&self, ctx: &FlowContext, terminal: Lifecycle) {
        debug_assert!(terminal.is_terminal());
        let mut state = self.state.lock().expect("lifecycle lock");
        let from = *state;
        *state = Lifecycle::Idle;
        drop(state);

        self.lifecycle_tx.send_replace(terminal);
        ctx.logger.log_state_transition(from, terminal);
        metrics().active_flows.set(0);
    }

    fn notify(&self, notice: Notice) {
        // A dropped feed just means nobody is rendering notices
        let _ = self.notices_tx.send(notice);
    }
}
