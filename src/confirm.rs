//! Bounded confirmation polling
//!
//! After submission, the engine waits for the transaction to reach finality
//! by polling a chain-query collaborator at a fixed interval until it
//! confirms or an upper wait bound elapses. Transport hiccups while polling
//! are logged and treated as "still pending"; only the wait bound ends the
//! loop unsuccessfully.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::classifier::PurchaseError;
use crate::config::ConfirmationConfig;

/// Chain-query collaborator: can a submitted transaction be seen as final?
#[async_trait]
pub trait ChainQuery: Send + Sync {
    async fn transaction_confirmed(&self, tx_hash: &str) -> Result<bool>;
}

/// HTTP chain query against a transaction status endpoint
///
/// `GET {status_url}/{tx_hash}`: 200 means confirmed, 404 means not yet
/// visible. Other statuses are transport-level errors.
pub struct HttpChainQuery {
    client: reqwest::Client,
    status_url: String,
}

impl HttpChainQuery {
    pub fn new(client: reqwest::Client, status_url: String) -> Self {
        Self { client, status_url }
    }
}

#[async_trait]
impl ChainQuery for HttpChainQuery {
    async fn transaction_confirmed(&self, tx_hash: &str) -> Result<bool> {
        let url = format!("{}/{}", self.status_url.trim_end_matches('/'), tx_hash);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("confirmation query failed: {}", url))?;

        match response.status() {
            reqwest::StatusCode::OK => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => anyhow::bail!("unexpected confirmation status {} from {}", status, url),
        }
    }
}

/// Poll until the transaction confirms or the wait bound elapses
pub async fn await_confirmation(
    query: &dyn ChainQuery,
    tx_hash: &str,
    config: &ConfirmationConfig,
) -> Result<(), PurchaseError> {
    let interval = Duration::from_millis(config.poll_interval_ms);
    let deadline = Instant::now() + Duration::from_secs(config.max_wait_secs);
    let mut polls: u32 = 0;

    loop {
        match query.transaction_confirmed(tx_hash).await {
            Ok(true) => {
                debug!(tx_hash = %tx_hash, polls, "Transaction confirmed");
                return Ok(());
            }
            Ok(false) => {
                debug!(tx_hash = %tx_hash, polls, "Transaction not yet confirmed");
            }
            Err(err) => {
                // Treated as still-pending; the bound below is the only
                // way out of the loop on a persistently failing endpoint.
                warn!(tx_hash = %tx_hash, error = %err, "Confirmation query failed, will retry");
            }
        }

        polls += 1;
        if Instant::now() + interval > deadline {
            return Err(PurchaseError::ConfirmationTimeout {
                waited_secs: config.max_wait_secs,
            });
        }
        sleep(interval).await;
    }
}
