//! Remote minting notification
//!
//! Once the on-chain transfer has confirmed, the engine notifies the
//! minting service of the transaction hash. The call is best-effort: the
//! funds have already irrevocably moved, so a failure here never fails the
//! purchase flow. Instead the notification is handed to an independent
//! background task that retries on a fixed interval for a bounded number
//! of attempts.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{error, info, warn};

use crate::config::MintingConfig;
use crate::metrics::metrics;

/// Minting collaborator port
#[async_trait]
pub trait MintPort: Send + Sync {
    /// Ask the minting service to mint for a confirmed transaction
    async fn request_mint(&self, tx_hash: &str) -> Result<()>;
}

#[derive(Serialize)]
struct MintRequestBody<'a> {
    #[serde(rename = "txHash")]
    tx_hash: &'a str,
}

/// HTTP minting service client: `POST { txHash }`
pub struct MintService {
    client: reqwest::Client,
    endpoint_url: String,
}

impl MintService {
    pub fn new(client: reqwest::Client, endpoint_url: String) -> Self {
        Self {
            client,
            endpoint_url,
        }
    }
}

#[async_trait]
impl MintPort for MintService {
    async fn request_mint(&self, tx_hash: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint_url)
            .json(&MintRequestBody { tx_hash })
            .send()
            .await
            .with_context(|| format!("mint request failed: {}", self.endpoint_url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("mint endpoint returned {}", status);
        }
        Ok(())
    }
}

/// Retry a failed mint notification in the background
///
/// Spawned after the inline attempt fails; the purchase flow has already
/// reported the softer "soon to be minted" success by the time this runs.
/// The final failure after all attempts is logged for manual follow-up.
pub fn spawn_mint_retry(mint: Arc<dyn MintPort>, tx_hash: String, config: &MintingConfig) {
    let strategy = FixedInterval::from_millis(config.retry_interval_secs * 1_000)
        .take(config.retry_attempts);
    let attempts = config.retry_attempts;

    tokio::spawn(async move {
        let result = Retry::spawn(strategy, || {
            let mint = Arc::clone(&mint);
            let tx_hash = tx_hash.clone();
            async move { mint.request_mint(&tx_hash).await }
        })
        .await;

        match result {
            Ok(()) => {
                info!(tx_hash = %tx_hash, "Deferred mint request accepted");
                metrics().mint_deferred_recovered.inc();
            }
            Err(err) => {
                error!(
                    tx_hash = %tx_hash,
                    attempts,
                    error = %err,
                    "Deferred mint request exhausted retries, manual follow-up required"
                );
                metrics().mint_deferred_exhausted.inc();
            }
        }
    });
}

/// Convenience wrapper used by the engine: log and count a deferral
pub fn defer_mint(mint: Arc<dyn MintPort>, tx_hash: &str, config: &MintingConfig, reason: &str) {
    warn!(tx_hash = %tx_hash, error = %reason, "Mint request failed, deferring to background retry");
    metrics().mint_deferrals.inc();
    spawn_mint_retry(mint, tx_hash.to_string(), config);
}
