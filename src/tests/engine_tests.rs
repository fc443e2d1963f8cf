//! Purchase engine state-machine tests

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::test_helpers::*;
use crate::classifier::PurchaseError;
use crate::types::{
    ConnectionMode, InventorySnapshot, Notice, PurchaseOutcome, TransactionLifecycleState,
};

#[tokio::test]
async fn test_happy_path_mints() {
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let chain = Arc::new(MockChain::immediate());
    let mint = Arc::new(MockMint::accepting());
    let (engine, feed) = engine_with(
        test_config(),
        Arc::clone(&wallet),
        Arc::clone(&chain),
        Arc::clone(&mint),
        plentiful(),
    )
    .await;

    let outcome = engine.purchase(1).await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::Minted {
            tx_hash: "deadbeef".to_string()
        }
    );
    assert_eq!(wallet.sign_calls.load(Ordering::SeqCst), 1);
    assert_eq!(wallet.submit_calls.load(Ordering::SeqCst), 1);
    assert_eq!(mint.calls.load(Ordering::SeqCst), 1);
    assert_eq!(*feed.lifecycle.borrow(), TransactionLifecycleState::Succeeded);
}

#[tokio::test]
async fn test_notice_ordering_on_success() {
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let (engine, mut feed) = engine_with(
        test_config(),
        wallet,
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    engine.purchase(1).await.unwrap();

    let notices = drain_notices(&mut feed);
    let expected = vec![
        Notice::Loading("Building transaction".to_string()),
        Notice::Dismiss,
        Notice::Loading("Awaiting signature".to_string()),
        Notice::Dismiss,
        Notice::Loading("Submitting transaction".to_string()),
        Notice::Dismiss,
        Notice::Loading("Awaiting network confirmation".to_string()),
        Notice::Dismiss,
        Notice::Success("Transaction submitted!".to_string()),
        Notice::Loading("Minting NFT...".to_string()),
        Notice::Dismiss,
        Notice::Success("Minted!".to_string()),
    ];
    assert_eq!(notices, expected);
}

#[tokio::test]
async fn test_declined_signature_fails_with_user_declined() {
    let mut wallet = MockWallet::connected(rich_utxos());
    wallet.sign_failure = Some(
        r#"[BrowserWallet] An error occurred during signTx: {"code":2,"info":"User declined to sign the transaction."}"#
            .to_string(),
    );
    let wallet = Arc::new(wallet);
    let mint = Arc::new(MockMint::accepting());
    let (engine, feed) = engine_with(
        test_config(),
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::clone(&mint),
        plentiful(),
    )
    .await;

    let err = engine.purchase(1).await.unwrap_err();
    assert_eq!(err, PurchaseError::UserDeclined);
    assert_eq!(*feed.lifecycle.borrow(), TransactionLifecycleState::Failed);
    // A declined signature never reaches submission or minting
    assert_eq!(wallet.submit_calls.load(Ordering::SeqCst), 0);
    assert_eq!(mint.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_inventory_guard_rejects_without_contacting_wallet() {
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let (engine, feed) = engine_with(
        test_config(),
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        InventorySnapshot {
            single_remaining: 3,
            set_remaining: 0,
        },
    )
    .await;

    let err = engine.purchase(5).await.unwrap_err();
    assert_eq!(
        err,
        PurchaseError::NotEnoughRemaining {
            requested: 5,
            remaining: 3
        }
    );
    assert_eq!(*feed.lifecycle.borrow(), TransactionLifecycleState::Failed);
    assert!(!wallet.was_contacted());
}

#[tokio::test]
async fn test_event_closed_guard() {
    let mut config = test_config();
    config.event.open = false;
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let (engine, _feed) = engine_with(
        config,
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    assert_eq!(
        engine.purchase(1).await.unwrap_err(),
        PurchaseError::EventClosed
    );
    assert!(!wallet.was_contacted());
}

#[tokio::test]
async fn test_sold_out_guard() {
    let mut config = test_config();
    config.event.sold_out = true;
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let (engine, _feed) = engine_with(
        config,
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    assert_eq!(engine.purchase(1).await.unwrap_err(), PurchaseError::SoldOut);
    assert!(!wallet.was_contacted());
}

#[tokio::test]
async fn test_manual_connection_guard() {
    let mut wallet = MockWallet::connected(rich_utxos());
    wallet.status.mode = ConnectionMode::Manual;
    let wallet = Arc::new(wallet);
    let (engine, _feed) = engine_with(
        test_config(),
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    assert_eq!(
        engine.purchase(1).await.unwrap_err(),
        PurchaseError::ManualConnection
    );
    assert!(!wallet.was_contacted());
}

#[tokio::test]
async fn test_disconnected_wallet_guard() {
    let mut wallet = MockWallet::connected(rich_utxos());
    wallet.status.connected = false;
    let wallet = Arc::new(wallet);
    let (engine, _feed) = engine_with(
        test_config(),
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    assert_eq!(
        engine.purchase(1).await.unwrap_err(),
        PurchaseError::WalletNotConnected
    );
    assert!(!wallet.was_contacted());
}

#[tokio::test]
async fn test_invalid_quantity_guard() {
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let (engine, _feed) = engine_with(
        test_config(),
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    assert_eq!(
        engine.purchase(3).await.unwrap_err(),
        PurchaseError::InvalidQuantity { quantity: 3 }
    );
    assert!(!wallet.was_contacted());
}

#[tokio::test]
async fn test_underfunded_wallet_surfaces_insufficient_funds() {
    let wallet = Arc::new(MockWallet::connected(vec![crate::types::Utxo {
        tx_hash: "aa".to_string(),
        output_index: 0,
        lovelace: 1_000_000,
    }]));
    let (engine, _feed) = engine_with(
        test_config(),
        wallet,
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    assert_eq!(
        engine.purchase(1).await.unwrap_err(),
        PurchaseError::InsufficientFunds
    );
}

#[tokio::test]
async fn test_confirmation_timeout_fails_flow() {
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let mint = Arc::new(MockMint::accepting());
    let (engine, _feed) = engine_with(
        test_config(),
        wallet,
        Arc::new(MockChain::never()),
        Arc::clone(&mint),
        plentiful(),
    )
    .await;

    let err = engine.purchase(1).await.unwrap_err();
    assert!(matches!(err, PurchaseError::ConfirmationTimeout { .. }));
    assert_eq!(mint.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_mint_failure_is_soft_success() {
    let wallet = Arc::new(MockWallet::connected(rich_utxos()));
    let mint = Arc::new(MockMint::failing());
    let (engine, feed) = engine_with(
        test_config(),
        wallet,
        Arc::new(MockChain::immediate()),
        Arc::clone(&mint),
        plentiful(),
    )
    .await;

    let outcome = engine.purchase(1).await.unwrap();
    assert_eq!(
        outcome,
        PurchaseOutcome::MintPending {
            tx_hash: "deadbeef".to_string()
        }
    );
    // The funds-moved determination stays a success even though the mint
    // side effect failed
    assert_eq!(*feed.lifecycle.borrow(), TransactionLifecycleState::Succeeded);
}

#[tokio::test]
async fn test_concurrent_start_rejected_then_guard_released() {
    let mut wallet = MockWallet::connected(rich_utxos());
    wallet.sign_delay = Duration::from_millis(200);
    let wallet = Arc::new(wallet);
    let (engine, feed) = engine_with(
        test_config(),
        Arc::clone(&wallet),
        Arc::new(MockChain::immediate()),
        Arc::new(MockMint::accepting()),
        plentiful(),
    )
    .await;

    let first = {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move { engine.purchase(1).await })
    };

    // Let the first flow reach the signature stage
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(
        *feed.lifecycle.borrow(),
        TransactionLifecycleState::AwaitingSignature
    );

    // Concurrent start is rejected without disturbing the active flow
    assert_eq!(engine.purchase(1).await.unwrap_err(), PurchaseError::FlowBusy);

    let outcome = first.await.unwrap().unwrap();
    assert_eq!(outcome.tx_hash(), "deadbeef");

    // Terminal transition released the guard; a new purchase can start
    let again = engine.purchase(1).await.unwrap();
    assert_eq!(again.tx_hash(), "deadbeef");
    assert_eq!(wallet.sign_calls.load(Ordering::SeqCst), 2);
}
