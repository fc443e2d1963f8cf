//! Configuration module for the Bling purchase portal
//!
//! This module handles all configuration loading from TOML files,
//! environment variables, and provides structured configuration types.

use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Mint event window configuration
    pub event: EventConfig,

    /// Pricing and fee-split configuration
    pub pricing: PricingConfig,

    /// Fixed payout addresses for the three transaction outputs
    pub treasury: TreasuryConfig,

    /// Remote counts endpoint and category layout
    pub inventory: InventoryConfig,

    /// Confirmation polling configuration
    pub confirmation: ConfirmationConfig,

    /// Remote minting endpoint configuration
    pub minting: MintingConfig,

    /// Error classification rules (ordered, first match wins)
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Monitoring and metrics
    pub monitoring: MonitoringConfig,
}

/// Whether the mint event is currently accepting purchases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    /// Purchases are only possible while the event window is open
    #[serde(default)]
    pub open: bool,

    /// Hard sold-out switch, independent of live inventory counts
    #[serde(default)]
    pub sold_out: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Base unit price in ADA
    pub base_price_ada: f64,

    /// Optional discount factor in (0, 1]; absent means full price
    #[serde(default)]
    pub discount_factor: Option<f64>,

    /// Per-unit platform fee in ADA, paid to the app wallet
    #[serde(default = "default_app_fee_ada")]
    pub app_fee_ada: f64,

    /// Allowed purchase batch sizes
    #[serde(default = "default_allowed_quantities")]
    pub allowed_quantities: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryConfig {
    /// Platform fee address
    pub app_address: String,

    /// Team treasury address
    pub treasury_address: String,

    /// Developer address
    pub dev_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    /// Counts endpoint URL (GET, returns category -> array of items)
    pub counts_url: String,

    /// Category whose length is the single-mint remaining count
    #[serde(default = "default_single_category")]
    pub single_category: String,

    /// Ordered set categories; set_remaining is their minimum length
    #[serde(default = "default_set_categories")]
    pub set_categories: Vec<String>,

    /// Refresh interval for the background counts loop, in seconds
    #[serde(default = "default_inventory_refresh_secs")]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationConfig {
    /// Transaction status endpoint base URL; the poller appends the tx hash
    pub status_url: String,

    /// Polling interval in milliseconds
    #[serde(default = "default_confirm_poll_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on the total wait, in seconds
    #[serde(default = "default_confirm_max_wait_secs")]
    pub max_wait_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MintingConfig {
    /// Minting endpoint URL (POST { txHash })
    pub endpoint_url: String,

    /// Background retry attempts after the initial best-effort call fails
    #[serde(default = "default_mint_retry_attempts")]
    pub retry_attempts: usize,

    /// Interval between background retries, in seconds
    #[serde(default = "default_mint_retry_secs")]
    pub retry_interval_secs: u64,
}

/// Ordered substring rules for classifying raw wallet/ledger errors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Extra rules evaluated before the built-in defaults
    #[serde(default)]
    pub rules: Vec<ClassifierRuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRuleConfig {
    /// Substring to look for in the raw error message
    pub pattern: String,

    /// Error kind to map to: "user_declined", "locked_utxos" or
    /// "insufficient_funds"
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Metrics port
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,
}

// Default value functions
fn default_app_fee_ada() -> f64 { 2.0 }
fn default_allowed_quantities() -> Vec<u8> { vec![1, 5] }
fn default_single_category() -> String { "NationNote".to_string() }
fn default_set_categories() -> Vec<String> {
    [
        "RubyChain",
        "TopazChain",
        "EmeraldChain",
        "SapphireChain",
        "AmethystChain",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_inventory_refresh_secs() -> u64 { 60 }
fn default_confirm_poll_ms() -> u64 { 5_000 }
fn default_confirm_max_wait_secs() -> u64 { 300 }
fn default_mint_retry_attempts() -> usize { 5 }
fn default_mint_retry_secs() -> u64 { 60 }
fn default_metrics_port() -> u16 { 9090 }
fn default_true() -> bool { true }

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn from_file_with_env(path: &str) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_file(path)
    }

    /// Basic sanity checks beyond what serde can express
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pricing.base_price_ada <= 0.0 {
            anyhow::bail!(
                "base_price_ada must be positive, got {}",
                self.pricing.base_price_ada
            );
        }
        if let Some(factor) = self.pricing.discount_factor {
            if !(factor > 0.0 && factor <= 1.0) {
                anyhow::bail!("discount_factor {} outside (0, 1]", factor);
            }
        }
        if self.pricing.app_fee_ada < 0.0 || self.pricing.app_fee_ada >= self.pricing.base_price_ada
        {
            anyhow::bail!(
                "app_fee_ada {} must be in [0, base_price_ada)",
                self.pricing.app_fee_ada
            );
        }
        if self.pricing.allowed_quantities.is_empty() {
            anyhow::bail!("allowed_quantities must not be empty");
        }
        if self.inventory.set_categories.is_empty() {
            anyhow::bail!("set_categories must not be empty");
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event: EventConfig {
                open: false,
                sold_out: false,
            },
            pricing: PricingConfig {
                base_price_ada: 49.0,
                discount_factor: Some(0.5),
                app_fee_ada: default_app_fee_ada(),
                allowed_quantities: default_allowed_quantities(),
            },
            treasury: TreasuryConfig {
                app_address: "addr1_app".to_string(),
                treasury_address: "addr1_treasury".to_string(),
                dev_address: "addr1_dev".to_string(),
            },
            inventory: InventoryConfig {
                counts_url: "http://localhost:3000/api/bling".to_string(),
                single_category: default_single_category(),
                set_categories: default_set_categories(),
                refresh_interval_secs: default_inventory_refresh_secs(),
            },
            confirmation: ConfirmationConfig {
                status_url: "http://localhost:3000/api/tx".to_string(),
                poll_interval_ms: default_confirm_poll_ms(),
                max_wait_secs: default_confirm_max_wait_secs(),
            },
            minting: MintingConfig {
                endpoint_url: "http://localhost:3000/api/bling".to_string(),
                retry_attempts: default_mint_retry_attempts(),
                retry_interval_secs: default_mint_retry_secs(),
            },
            classifier: ClassifierConfig::default(),
            monitoring: MonitoringConfig {
                enable_metrics: default_true(),
                metrics_port: default_metrics_port(),
            },
        }
    }
}
