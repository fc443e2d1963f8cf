//! Inventory Tracker
//!
//! Fetches the remote counts endpoint and derives the remaining-item
//! snapshot. The endpoint returns a JSON object mapping each sub-inventory
//! name to an array of the items still available; only array lengths are
//! read. A transport failure is never raised to the caller: the prior
//! snapshot is republished unchanged and the failure is logged, so
//! eligibility checks degrade to stale (or zero) counts rather than crash.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::InventoryConfig;
use crate::metrics::metrics;
use crate::types::InventorySnapshot;

/// Tracks remaining-item counts from the remote counts endpoint
pub struct InventoryTracker {
    client: reqwest::Client,
    config: InventoryConfig,
    snapshot: RwLock<InventorySnapshot>,
}

impl InventoryTracker {
    pub fn new(client: reqwest::Client, config: InventoryConfig) -> Self {
        Self {
            client,
            config,
            snapshot: RwLock::new(InventorySnapshot::default()),
        }
    }

    /// Current snapshot; the default (all-zero) snapshot until the first
    /// successful refresh
    pub async fn snapshot(&self) -> InventorySnapshot {
        *self.snapshot.read().await
    }

    /// Replace the published snapshot
    ///
    /// Used by `refresh` and by embedders that warm-start the tracker from
    /// server-rendered counts.
    pub async fn publish(&self, snapshot: InventorySnapshot) {
        *self.snapshot.write().await = snapshot;
    }

    /// Fetch the counts endpoint and republish the derived snapshot
    ///
    /// On transport failure the prior snapshot is returned unchanged.
    pub async fn refresh(&self) -> InventorySnapshot {
        match self.fetch_counts().await {
            Ok(counts) => {
                let snapshot = derive_snapshot(
                    &counts,
                    &self.config.single_category,
                    &self.config.set_categories,
                );
                debug!(
                    single_remaining = snapshot.single_remaining,
                    set_remaining = snapshot.set_remaining,
                    "Inventory refreshed"
                );
                self.publish(snapshot).await;
                snapshot
            }
            Err(err) => {
                warn!(
                    url = %self.config.counts_url,
                    error = %err,
                    "Inventory fetch failed, keeping prior snapshot"
                );
                metrics().inventory_refresh_failures.inc();
                self.snapshot().await
            }
        }
    }

    async fn fetch_counts(&self) -> anyhow::Result<HashMap<String, serde_json::Value>> {
        let response = self
            .client
            .get(&self.config.counts_url)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Derive the snapshot from the raw counts mapping
///
/// A category that is missing, or whose value is not an array, counts as
/// zero. `set_remaining` is the minimum across the configured set
/// categories.
fn derive_snapshot(
    counts: &HashMap<String, serde_json::Value>,
    single_category: &str,
    set_categories: &[String],
) -> InventorySnapshot {
    let remaining = |name: &str| -> u64 {
        counts
            .get(name)
            .and_then(|value| value.as_array())
            .map(|items| items.len() as u64)
            .unwrap_or(0)
    };

    InventorySnapshot {
        single_remaining: remaining(single_category),
        set_remaining: set_categories
            .iter()
            .map(|name| remaining(name))
            .min()
            .unwrap_or(0),
    }
}
