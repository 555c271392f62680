//! Integration tests for the JSON-RPC ledger client
//!
//! A mockito server stands in for the cluster node.

use mockito::{Matcher, Server, ServerGuard};
use serde_json::json;
use solana_sdk::{
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::sync::Arc;
use std::time::Duration;
use txkit::rpc_manager::{LedgerClient, RpcLedgerClient, RpcManagerError};
use txkit::structured_logging::TxLogger;
use txkit::tx_builder::{
    build, errors::TransactionBuilderError, sign, InstructionPlan, SignedTransaction,
    SubmitOptions, TxBuilder,
};
use txkit::types::{Commitment, RecentAnchor, SubmitMode};

const LAST_VALID_BLOCK_HEIGHT: u64 = 300;

async fn mock_rpc(server: &mut ServerGuard, method: &str, result: serde_json::Value) -> mockito::Mock {
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": method })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "jsonrpc": "2.0", "result": result, "id": 1 }).to_string())
        .create_async()
        .await
}

async fn client_for(server: &mut ServerGuard) -> RpcLedgerClient {
    // Older client paths ask for the node version before some calls
    mock_rpc(server, "getVersion", json!({ "solana-core": "2.3.0", "feature-set": 1 })).await;
    RpcLedgerClient::new(server.url(), Commitment::Confirmed, Duration::from_secs(5))
}

#[tokio::test]
async fn test_get_balance() {
    let mut server = Server::new_async().await;
    let balance = mock_rpc(
        &mut server,
        "getBalance",
        json!({ "context": { "slot": 1 }, "value": 42 }),
    )
    .await;
    let client = client_for(&mut server).await;

    let lamports = client.get_balance(&Pubkey::new_unique()).await.unwrap();

    assert_eq!(lamports, 42);
    balance.assert_async().await;
}

#[tokio::test]
async fn test_get_minimum_balance_for_rent_exemption() {
    let mut server = Server::new_async().await;
    mock_rpc(&mut server, "getMinimumBalanceForRentExemption", json!(890_880)).await;
    let client = client_for(&mut server).await;

    let minimum = client.get_minimum_balance_for_rent_exemption(0).await.unwrap();

    assert_eq!(minimum, 890_880);
}

#[tokio::test]
async fn test_get_latest_anchor() {
    let mut server = Server::new_async().await;
    let blockhash = Hash::new_unique();
    mock_rpc(
        &mut server,
        "getLatestBlockhash",
        json!({
            "context": { "slot": 7 },
            "value": { "blockhash": blockhash.to_string(), "lastValidBlockHeight": 300 }
        }),
    )
    .await;
    let client = client_for(&mut server).await;

    let anchor = client.get_latest_anchor().await.unwrap();

    assert_eq!(anchor.blockhash, blockhash);
    assert_eq!(anchor.last_valid_block_height, 300);
    assert!(!anchor.is_expired_at(300));
    assert!(anchor.is_expired_at(301));
}

#[tokio::test]
async fn test_error_response_keeps_code() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "getBalance" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32602, "message": "Invalid param: WrongSize" },
                "id": 1
            })
            .to_string(),
        )
        .create_async()
        .await;
    let client = client_for(&mut server).await;

    let err = client.get_balance(&Pubkey::new_unique()).await.unwrap_err();

    match &err {
        RpcManagerError::RpcResponse { code, endpoint, .. } => {
            assert_eq!(*code, Some(-32602));
            assert_eq!(endpoint, &server.url());
        }
        other => panic!("expected RpcResponse, got {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    let client = RpcLedgerClient::new(
        "http://127.0.0.1:1",
        Commitment::Confirmed,
        Duration::from_secs(2),
    );

    let err = client.get_block_height().await.unwrap_err();

    assert!(
        matches!(err, RpcManagerError::Transport { .. } | RpcManagerError::Timeout { .. }),
        "unexpected error {:?}",
        err
    );
    assert!(err.is_retryable());
    assert_eq!(client.endpoint(), "http://127.0.0.1:1");
}

fn signed_transfer(payer: &Keypair) -> SignedTransaction {
    let mut plan = InstructionPlan::new();
    plan.transfer(&payer.pubkey(), &Pubkey::new_unique(), 5_000);
    let anchor = RecentAnchor::new(Hash::new_unique(), LAST_VALID_BLOCK_HEIGHT);
    let output = build(&payer.pubkey(), plan.instructions(), &anchor).unwrap();
    sign(output, &[payer as &dyn Signer]).unwrap()
}

/// Send through the builder against a node that answers `sendTransaction`
/// with `error`
async fn submit_against(error: serde_json::Value) -> (SignedTransaction, TransactionBuilderError) {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "sendTransaction" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "jsonrpc": "2.0", "error": error, "id": 1 }).to_string())
        .create_async()
        .await;
    let client = client_for(&mut server).await;
    let builder = TxBuilder::new(
        Arc::new(client),
        SubmitOptions::default().with_mode(SubmitMode::FireAndForget),
    );

    let tx = signed_transfer(&Keypair::new());
    let err = builder
        .submit(&tx, &TxLogger::new("transfer"))
        .await
        .unwrap_err();
    (tx, err)
}

#[tokio::test]
async fn test_send_with_unknown_blockhash_is_stale_anchor() {
    let (tx, err) = submit_against(json!({
        "code": -32002,
        "message": "Transaction simulation failed: Blockhash not found"
    }))
    .await;

    match err {
        TransactionBuilderError::StaleAnchor {
            signature,
            last_valid_block_height,
        } => {
            assert_eq!(signature, tx.signature());
            assert_eq!(last_valid_block_height, LAST_VALID_BLOCK_HEIGHT);
        }
        other => panic!("expected StaleAnchor, got {:?}", other),
    }
}

#[tokio::test]
async fn test_send_with_bad_signature_is_missing_signature() {
    let (tx, err) = submit_against(json!({
        "code": -32003,
        "message": "Transaction signature verification failure"
    }))
    .await;

    assert!(matches!(err, TransactionBuilderError::MissingSignature { .. }));
    assert_eq!(err.signature(), Some(&tx.signature()));
}

#[tokio::test]
async fn test_preflight_failure_carries_logs() {
    let (_, err) = submit_against(json!({
        "code": -32002,
        "message": "Transaction simulation failed: Error processing Instruction 0: custom program error: 0x1",
        "data": {
            "err": null,
            "logs": [
                "Program 11111111111111111111111111111111 invoke [1]",
                "Program log: boom"
            ],
            "accounts": null,
            "unitsConsumed": 150,
            "returnData": null
        }
    }))
    .await;

    match &err {
        TransactionBuilderError::Simulation { logs, .. } => {
            assert_eq!(logs.len(), 2);
            assert_eq!(logs[1], "Program log: boom");
        }
        other => panic!("expected Simulation, got {:?}", other),
    }
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_unfunded_payer_is_insufficient_funds() {
    let (_, err) = submit_against(json!({
        "code": -32002,
        "message": "Transaction simulation failed: Attempt to debit an account but found no record of a prior credit."
    }))
    .await;

    assert!(
        matches!(err, TransactionBuilderError::InsufficientFunds { .. }),
        "unexpected error {:?}",
        err
    );
}

#[tokio::test]
async fn test_transaction_logs_use_confirmed_for_processed_clients() {
    let mut server = Server::new_async().await;
    mock_rpc(&mut server, "getVersion", json!({ "solana-core": "2.3.0", "feature-set": 1 })).await;
    let history = server
        .mock("POST", "/")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({ "method": "getTransaction" })),
            Matcher::Regex(r#""commitment":"confirmed""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "jsonrpc": "2.0", "result": null, "id": 1 }).to_string())
        .create_async()
        .await;
    let client = RpcLedgerClient::new(server.url(), Commitment::Processed, Duration::from_secs(5));

    // A null result does not decode; only the request matters here
    let _ = client.get_transaction_logs(&Signature::default()).await;

    history.assert_async().await;
}
