//! Metrics collection and export module

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntGauge, Opts, Registry};

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Purchase flow counters
    pub purchases_started: IntCounter,
    pub purchases_succeeded: IntCounter,
    pub purchases_failed: IntCounter,
    pub purchases_rejected_busy: IntCounter,

    // Mint notification counters
    pub mint_deferrals: IntCounter,
    pub mint_deferred_recovered: IntCounter,
    pub mint_deferred_exhausted: IntCounter,

    // Inventory counters
    pub inventory_refresh_failures: IntCounter,

    // Gauges
    pub active_flows: IntGauge,

    // Histograms
    pub purchase_latency: Histogram,
    pub confirmation_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let purchases_started = IntCounter::with_opts(Opts::new(
            "purchases_started",
            "Purchase flows entering the Building state",
        ))?;

        let purchases_succeeded = IntCounter::with_opts(Opts::new(
            "purchases_succeeded",
            "Purchase flows reaching the Succeeded state",
        ))?;

        let purchases_failed = IntCounter::with_opts(Opts::new(
            "purchases_failed",
            "Purchase flows reaching the Failed state",
        ))?;

        let purchases_rejected_busy = IntCounter::with_opts(Opts::new(
            "purchases_rejected_busy",
            "Purchase starts rejected by the single-flow guard",
        ))?;

        let mint_deferrals = IntCounter::with_opts(Opts::new(
            "mint_deferrals",
            "Mint notifications deferred to the background retry task",
        ))?;

        let mint_deferred_recovered = IntCounter::with_opts(Opts::new(
            "mint_deferred_recovered",
            "Deferred mint notifications eventually accepted",
        ))?;

        let mint_deferred_exhausted = IntCounter::with_opts(Opts::new(
            "mint_deferred_exhausted",
            "Deferred mint notifications that exhausted all retries",
        ))?;

        let inventory_refresh_failures = IntCounter::with_opts(Opts::new(
            "inventory_refresh_failures",
            "Counts endpoint fetches that failed and kept the stale snapshot",
        ))?;

        let active_flows = IntGauge::with_opts(Opts::new(
            "active_flows",
            "Purchase flows currently in a non-Idle state (0 or 1)",
        ))?;

        let purchase_latency = Histogram::with_opts(
            HistogramOpts::new(
                "purchase_latency_seconds",
                "End-to-end purchase flow latency",
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;

        let confirmation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "confirmation_latency_seconds",
                "Time spent awaiting network confirmation",
            )
            .buckets(vec![5.0, 15.0, 30.0, 60.0, 120.0, 300.0]),
        )?;

        registry.register(Box::new(purchases_started.clone()))?;
        registry.register(Box::new(purchases_succeeded.clone()))?;
        registry.register(Box::new(purchases_failed.clone()))?;
        registry.register(Box::new(purchases_rejected_busy.clone()))?;
        registry.register(Box::new(mint_deferrals.clone()))?;
        registry.register(Box::new(mint_deferred_recovered.clone()))?;
        registry.register(Box::new(mint_deferred_exhausted.clone()))?;
        registry.register(Box::new(inventory_refresh_failures.clone()))?;
        registry.register(Box::new(active_flows.clone()))?;
        registry.register(Box::new(purchase_latency.clone()))?;
        registry.register(Box::new(confirmation_latency.clone()))?;

        Ok(Self {
            registry,
            purchases_started,
            purchases_succeeded,
            purchases_failed,
            purchases_rejected_busy,
            mint_deferrals,
            mint_deferred_recovered,
            mint_deferred_exhausted,
            inventory_refresh_failures,
            active_flows,
            purchase_latency,
            confirmation_latency,
        })
    }

    /// Gather all registered metric families for export
    pub fn gather(&self) -> Vec<prometheus::proto::MetricFamily> {
        self.registry.gather()
    }
}

static METRICS: Lazy<Metrics> = Lazy::new(|| Metrics::new().expect("metrics registry"));

/// Access the global metrics instance
pub fn metrics() -> &'static Metrics {
    &METRICS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_register_without_collision() {
        let m = Metrics::new().unwrap();
        m.purchases_started.inc();
        m.purchases_failed.inc();
        m.active_flows.set(1);
        assert_eq!(m.purchases_started.get(), 1);
        assert!(!m.gather().is_empty());
    }

    #[test]
    fn test_global_accessor() {
        metrics().purchases_rejected_busy.inc();
        assert!(metrics().purchases_rejected_busy.get() >= 1);
    }
}
