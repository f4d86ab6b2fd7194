//! Network reconciliation against a scripted wallet.

mod common;

use common::*;
use serde_json::{json, Value};
use storage_dapp::network::{ChainSpec, NetworkReconciler};

fn reconciler() -> NetworkReconciler {
    NetworkReconciler::new(ChainSpec::base_sepolia())
}

#[tokio::test]
async fn test_switch_success_returns_true() {
    let provider = FakeProvider::metamask();
    provider.respond("wallet_switchEthereumChain", Ok(Value::Null));

    assert!(reconciler().ensure_target_chain(provider.as_ref()).await);
    assert_eq!(provider.calls("wallet_addEthereumChain"), 0);
}

#[tokio::test]
async fn test_unrecognized_chain_is_added() {
    let provider = FakeProvider::metamask();
    provider
        .respond(
            "wallet_switchEthereumChain",
            Err(rpc_error(4902, "Unrecognized chain ID \"0x14a34\"")),
        )
        .respond("wallet_addEthereumChain", Ok(Value::Null));

    assert!(reconciler().ensure_target_chain(provider.as_ref()).await);
    assert_eq!(provider.calls("wallet_addEthereumChain"), 1);
}

#[tokio::test]
async fn test_add_failure_returns_false() {
    let provider = FakeProvider::metamask();
    provider
        .respond(
            "wallet_switchEthereumChain",
            Err(rpc_error(4902, "Unrecognized chain ID")),
        )
        .respond("wallet_addEthereumChain", Err(rpc_error(-32602, "bad rpcUrls")));

    assert!(!reconciler().ensure_target_chain(provider.as_ref()).await);
}

#[tokio::test]
async fn test_other_switch_error_returns_false_without_adding() {
    let provider = FakeProvider::metamask();
    provider.respond("wallet_switchEthereumChain", Err(user_rejected()));

    assert!(!reconciler().ensure_target_chain(provider.as_ref()).await);
    assert_eq!(provider.calls("wallet_addEthereumChain"), 0);
}

#[tokio::test]
async fn test_skip_redundant_switch() {
    let provider = FakeProvider::metamask();
    provider.respond("eth_chainId", Ok(json!(TARGET_CHAIN_HEX)));
    let reconciler = reconciler().with_skip_redundant_switch(true);

    assert!(reconciler.ensure_target_chain(provider.as_ref()).await);
    assert_eq!(provider.calls("wallet_switchEthereumChain"), 0);
}

#[tokio::test]
async fn test_skip_redundant_switch_still_switches_from_other_chain() {
    let provider = FakeProvider::metamask();
    provider
        .respond("eth_chainId", Ok(json!("0x1")))
        .respond("wallet_switchEthereumChain", Ok(Value::Null));
    let reconciler = reconciler().with_skip_redundant_switch(true);

    assert!(reconciler.ensure_target_chain(provider.as_ref()).await);
    assert_eq!(provider.calls("wallet_switchEthereumChain"), 1);
}

#[tokio::test]
async fn test_unreadable_chain_id_falls_back_to_switch() {
    let provider = FakeProvider::metamask();
    provider.respond("wallet_switchEthereumChain", Ok(Value::Null));
    let reconciler = reconciler().with_skip_redundant_switch(true);

    assert!(reconciler.ensure_target_chain(provider.as_ref()).await);
    assert_eq!(provider.calls("eth_chainId"), 1);
}
