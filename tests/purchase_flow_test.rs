//! End-to-end purchase flow against live HTTP collaborators
//!
//! Runs the engine with the real counts, confirmation and minting clients
//! pointed at a local mock server; only the wallet is scripted.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use bling_portal::config::Config;
use bling_portal::confirm::HttpChainQuery;
use bling_portal::engine::PurchaseEngine;
use bling_portal::inventory::InventoryTracker;
use bling_portal::minting::MintService;
use bling_portal::tx_builder::{SignedTransaction, UnsignedTransaction};
use bling_portal::types::{
    ConnectionMode, PurchaseOutcome, TransactionLifecycleState, Utxo, WalletStatus,
};
use bling_portal::wallet::WalletPort;

struct StubWallet;

#[async_trait]
impl WalletPort for StubWallet {
    fn status(&self) -> WalletStatus {
        WalletStatus {
            connected: true,
            mode: ConnectionMode::Standard,
        }
    }

    async fn spendable_inputs(&self) -> Result<Vec<Utxo>> {
        Ok(vec![Utxo {
            tx_hash: "feed0000".to_string(),
            output_index: 0,
            lovelace: 200_000_000,
        }])
    }

    async fn sign(&self, _unsigned: &UnsignedTransaction) -> Result<SignedTransaction> {
        Ok(SignedTransaction("signed".to_string()))
    }

    async fn submit(&self, _signed: &SignedTransaction) -> Result<String> {
        Ok("cafebabe".to_string())
    }
}

fn config_for(server_url: &str) -> Config {
    let mut config = Config::default();
    config.event.open = true;
    config.inventory.counts_url = format!("{}/api/bling", server_url);
    config.confirmation.status_url = format!("{}/api/tx", server_url);
    config.confirmation.poll_interval_ms = 10;
    config.confirmation.max_wait_secs = 2;
    config.minting.endpoint_url = format!("{}/api/bling", server_url);
    config.minting.retry_attempts = 1;
    config.minting.retry_interval_secs = 0;
    config
}

#[tokio::test]
async fn purchase_flow_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/api/bling")
        .with_status(200)
        .with_body(
            json!({
                "NationNote": [1, 2, 3, 4, 5],
                "RubyChain": [1, 2],
                "TopazChain": [1, 2],
                "EmeraldChain": [1, 2],
                "SapphireChain": [1, 2],
                "AmethystChain": [1, 2],
            })
            .to_string(),
        )
        .create_async()
        .await;
    server
        .mock("GET", "/api/tx/cafebabe")
        .with_status(200)
        .create_async()
        .await;
    let mint_mock = server
        .mock("POST", "/api/bling")
        .match_body(mockito::Matcher::Json(json!({ "txHash": "cafebabe" })))
        .with_status(200)
        .create_async()
        .await;

    let config = config_for(&server.url());
    let client = reqwest::Client::new();

    let tracker = Arc::new(InventoryTracker::new(
        client.clone(),
        config.inventory.clone(),
    ));
    let snapshot = tracker.refresh().await;
    assert_eq!(snapshot.single_remaining, 5);
    assert_eq!(snapshot.set_remaining, 2);

    let chain = Arc::new(HttpChainQuery::new(
        client.clone(),
        config.confirmation.status_url.clone(),
    ));
    let mint = Arc::new(MintService::new(
        client,
        config.minting.endpoint_url.clone(),
    ));

    let (engine, feed) = PurchaseEngine::new(config, Arc::new(StubWallet), chain, mint, tracker);

    let outcome = engine.purchase(1).await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::Minted {
            tx_hash: "cafebabe".to_string()
        }
    );
    assert_eq!(*feed.lifecycle.borrow(), TransactionLifecycleState::Succeeded);
    mint_mock.assert_async().await;
}

#[tokio::test]
async fn purchase_flow_defers_mint_when_endpoint_down() {
    let mut server = mockito::Server::new_async().await;

    server
        .mock("GET", "/api/tx/cafebabe")
        .with_status(200)
        .create_async()
        .await;
    server
        .mock("POST", "/api/bling")
        .with_status(500)
        .expect_at_least(1)
        .create_async()
        .await;

    let config = config_for(&server.url());
    let client = reqwest::Client::new();

    let tracker = Arc::new(InventoryTracker::new(
        client.clone(),
        config.inventory.clone(),
    ));
    tracker
        .publish(bling_portal::types::InventorySnapshot {
            single_remaining: 10,
            set_remaining: 2,
        })
        .await;

    let chain = Arc::new(HttpChainQuery::new(
        client.clone(),
        config.confirmation.status_url.clone(),
    ));
    let mint = Arc::new(MintService::new(
        client,
        config.minting.endpoint_url.clone(),
    ));

    let (engine, _feed) = PurchaseEngine::new(config, Arc::new(StubWallet), chain, mint, tracker);

    let outcome = engine.purchase(1).await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::MintPending {
            tx_hash: "cafebabe".to_string()
        }
    );
}
