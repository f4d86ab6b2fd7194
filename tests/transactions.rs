//! Contract reads and writes, including confirmation and failure paths.

mod common;

use common::*;
use serde_json::{json, Value};
use storage_dapp::error::{FailureKind, ReadError, TxError};
use storage_dapp::provider::HostEnvironment;
use storage_dapp::session::{Notice, PendingOperation, WritePhase};
use storage_dapp::DappClient;

#[tokio::test]
async fn test_write_rejected_when_disconnected() {
    let provider = FakeProvider::metamask();
    let client = client_with(&provider);

    let err = client.write_value("7").await.unwrap_err();

    assert_eq!(err, TxError::NotConnected);
    assert!(!err.was_broadcast_attempted());
    assert_eq!(provider.calls("eth_sendTransaction"), 0);
}

#[tokio::test]
async fn test_write_without_provider() {
    let client = DappClient::new(&test_config(), &HostEnvironment::empty()).unwrap();

    assert_eq!(
        client.write_value("7").await.unwrap_err(),
        TxError::CapabilityUnavailable
    );
}

#[tokio::test]
async fn test_write_rejects_empty_and_invalid_values() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;

    assert_eq!(client.write_value("  ").await.unwrap_err(), TxError::EmptyValue);
    assert!(matches!(
        client.write_value("-3").await.unwrap_err(),
        TxError::InvalidValue(_)
    ));
    assert!(matches!(
        client.write_value("12abc").await.unwrap_err(),
        TxError::InvalidValue(_)
    ));
    assert_eq!(provider.calls("eth_sendTransaction"), 0);
    assert!(client.state().session.connected);
}

#[tokio::test]
async fn test_write_confirms_and_refreshes_value() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    let reads_before = provider.calls("eth_call");
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond("eth_getTransactionReceipt", Ok(receipt("0x1")))
        .respond("eth_call", Ok(encoded_value(7)));
    let mut notices = client.notices();

    let confirmation = client.write_value("7").await.unwrap();

    assert_eq!(confirmation.hash, tx_hash());
    assert_eq!(confirmation.block_number, Some(16));
    assert_eq!(provider.calls("eth_call"), reads_before + 1);
    let state = client.state();
    assert_eq!(state.stored_value, "7");
    assert_eq!(state.pending_operation(), PendingOperation::None);
    assert!(state.can_write());

    let sent = provider.params_of("eth_sendTransaction");
    assert_eq!(sent.len(), 1);
    let tx = &sent[0][0];
    assert_eq!(tx["to"].as_str().unwrap().to_lowercase(), CONTRACT.to_lowercase());
    assert_eq!(tx["from"].as_str().unwrap().to_lowercase(), ACCOUNT_A.to_string().to_lowercase());
    assert!(tx["data"].as_str().unwrap().starts_with("0x55241077"));

    let notices = drain(&mut notices);
    assert!(matches!(
        notices.as_slice(),
        [Notice::TxSubmitted { .. }, Notice::TxConfirmed { block_number: Some(16), .. }]
    ));
}

#[tokio::test]
async fn test_write_waits_for_pending_receipt() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond("eth_getTransactionReceipt", Ok(Value::Null))
        .respond("eth_getTransactionReceipt", Ok(Value::Null))
        .respond("eth_getTransactionReceipt", Ok(receipt("0x1")))
        .respond("eth_call", Ok(encoded_value(8)));

    client.write_value("8").await.unwrap();

    assert_eq!(provider.calls("eth_getTransactionReceipt"), 3);
    assert_eq!(client.state().stored_value, "8");
}

#[tokio::test]
async fn test_refresh_runs_before_write_lane_clears() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond("eth_getTransactionReceipt", Ok(receipt("0x1")))
        .respond("eth_call", Ok(encoded_value(7)));
    let reads_before = provider.calls("eth_call");

    let pending = client.submit_value("7").await.unwrap();
    assert_eq!(pending.tx_hash(), tx_hash());
    assert_eq!(
        client.state().pending_operation(),
        PendingOperation::AwaitingConfirmation
    );

    let gate = provider.gate("eth_call");
    let (outcome, ()) = tokio::join!(pending.confirmed(), async {
        while provider.calls("eth_call") == reads_before {
            tokio::task::yield_now().await;
        }
        let state = client.state();
        assert_eq!(state.write_phase, WritePhase::AwaitingConfirmation);
        assert!(state.reading);
        assert!(!state.can_write());
        gate.notify_one();
    });

    outcome.unwrap();
    assert_eq!(provider.calls("eth_call"), reads_before + 1);
    let state = client.state();
    assert_eq!(state.write_phase, WritePhase::Idle);
    assert!(!state.reading);
    assert_eq!(state.stored_value, "7");
}

#[tokio::test]
async fn test_second_write_rejected_while_pending() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond("eth_getTransactionReceipt", Ok(receipt("0x1")));

    let pending = client.submit_value("7").await.unwrap();
    let err = client.submit_value("9").await.unwrap_err();

    assert_eq!(err, TxError::Busy);
    assert_eq!(provider.calls("eth_sendTransaction"), 1);

    pending.confirmed().await.unwrap();
    assert!(client.state().can_write());
}

#[tokio::test]
async fn test_dropping_pending_write_releases_lane() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider.respond("eth_sendTransaction", Ok(json!(tx_hash())));

    let pending = client.submit_value("7").await.unwrap();
    drop(pending);

    assert_eq!(client.state().write_phase, WritePhase::Idle);
}

#[tokio::test]
async fn test_confirmation_failure_keeps_session_and_reports_reason() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    let reads_before = provider.calls("eth_call");
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond(
            "eth_getTransactionReceipt",
            Err(rpc_error(3, "execution reverted: value locked")),
        );
    let mut notices = client.notices();

    let err = client.write_value("7").await.unwrap_err();

    assert!(matches!(err, TxError::ConfirmationFailed(ref reason) if reason.contains("value locked")));
    assert_eq!(err.kind(), FailureKind::TxConfirmationFailed);
    let state = client.state();
    assert_eq!(state.pending_operation(), PendingOperation::None);
    assert_eq!(state.session.account, Some(ACCOUNT_A));
    assert!(state.session.connected);
    assert_eq!(state.stored_value, "42");
    assert_eq!(provider.calls("eth_call"), reads_before);

    let notices = drain(&mut notices);
    match notices.as_slice() {
        [Notice::TxSubmitted { .. }, Notice::TxFailed { kind, message, .. }] => {
            assert_eq!(*kind, FailureKind::TxConfirmationFailed);
            assert!(message.contains("value locked"));
        }
        other => panic!("unexpected notices: {other:?}"),
    }
}

#[tokio::test]
async fn test_reverted_receipt_fails_write() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond("eth_getTransactionReceipt", Ok(receipt("0x0")));

    let err = client.write_value("7").await.unwrap_err();

    assert_eq!(
        err,
        TxError::ConfirmationFailed("transaction reverted".to_string())
    );
    assert!(client.state().can_write());
}

#[tokio::test]
async fn test_submission_rejected_by_user() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider.respond("eth_sendTransaction", Err(user_rejected()));
    let mut notices = client.notices();

    let err = client.write_value("7").await.unwrap_err();

    assert!(matches!(err, TxError::SubmissionFailed(_)));
    assert!(err.was_broadcast_attempted());
    assert_eq!(provider.calls("eth_getTransactionReceipt"), 0);
    assert!(client.state().can_write());
    assert!(matches!(
        drain(&mut notices).as_slice(),
        [Notice::TxFailed { kind: FailureKind::TxSubmissionFailed, .. }]
    ));
}

#[tokio::test]
async fn test_read_failure_keeps_previous_value() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider.respond("eth_call", Err(rpc_error(-32603, "header not found")));

    assert_eq!(client.refresh().await, "42");
    assert_eq!(client.state().stored_value, "42");
    assert!(!client.state().reading);
}

#[tokio::test]
async fn test_undecodable_read_keeps_previous_value() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider.respond("eth_call", Ok(json!("0x01")));

    assert_eq!(client.refresh().await, "42");
}

#[tokio::test]
async fn test_read_skipped_without_account() {
    let provider = FakeProvider::metamask();
    let client = client_with(&provider);

    assert_eq!(client.refresh().await, "0");
    assert_eq!(provider.calls("eth_call"), 0);
    assert!(!client.state().reading);
}

#[tokio::test]
async fn test_read_lane_is_exclusive() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider.respond("eth_call", Ok(encoded_value(3)));
    let gate = provider.gate("eth_call");

    let (value, ()) = tokio::join!(client.refresh(), async {
        while !client.state().reading {
            tokio::task::yield_now().await;
        }
        assert_eq!(client.gateway().fetch_value().await, Err(ReadError::Busy));
        gate.notify_one();
    });

    assert_eq!(value, "3");
}

#[tokio::test]
async fn test_refresh_on_off_target_session_is_skipped() {
    let provider = FakeProvider::metamask();
    provider
        .respond("eth_accounts", Ok(json!([ACCOUNT_A])))
        .respond("eth_chainId", Ok(json!("0x1")))
        .always("eth_call", Ok(encoded_value(999)));
    let client = client_with(&provider);
    client.start().await;

    assert_eq!(client.refresh().await, "0");
    assert_eq!(
        client.gateway().fetch_value().await,
        Err(ReadError::NotConnected)
    );
    assert_eq!(provider.calls("eth_call"), 0);
    assert_eq!(client.state().stored_value, "0");
}

#[tokio::test]
async fn test_confirmation_refresh_waits_for_in_flight_read() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond("eth_getTransactionReceipt", Ok(receipt("0x1")))
        .respond("eth_call", Ok(encoded_value(42)))
        .respond("eth_call", Ok(encoded_value(7)));
    let reads_before = provider.calls("eth_call");
    let pending = client.submit_value("7").await.unwrap();
    let gate = provider.gate("eth_call");

    let (earlier_read, outcome, ()) = tokio::join!(
        client.refresh(),
        async {
            while provider.calls("eth_call") == reads_before {
                tokio::task::yield_now().await;
            }
            pending.confirmed().await
        },
        async {
            while provider.calls("eth_getTransactionReceipt") == 0 {
                tokio::task::yield_now().await;
            }
            for _ in 0..5 {
                tokio::task::yield_now().await;
            }
            // the post-confirmation read is queued behind the gated one
            assert_eq!(provider.calls("eth_call"), reads_before + 1);
            assert_eq!(
                client.state().write_phase,
                WritePhase::AwaitingConfirmation
            );
            gate.notify_one();
        }
    );

    assert_eq!(earlier_read, "42");
    outcome.unwrap();
    assert_eq!(provider.calls("eth_call"), reads_before + 2);
    let state = client.state();
    assert_eq!(state.stored_value, "7");
    assert!(state.can_write());
}

#[tokio::test]
async fn test_receipt_polling_survives_disconnection() {
    let provider = FakeProvider::metamask();
    let client = connected_client(&provider, 42).await;
    provider
        .respond("eth_sendTransaction", Ok(json!(tx_hash())))
        .respond(
            "eth_getTransactionReceipt",
            Err(rpc_error(4900, "error sending request: connection refused")),
        )
        .respond("eth_getTransactionReceipt", Ok(receipt("0x1")))
        .respond("eth_call", Ok(encoded_value(7)));

    client.write_value("7").await.unwrap();

    assert_eq!(provider.calls("eth_getTransactionReceipt"), 2);
    assert_eq!(client.state().stored_value, "7");
}
