//! Configuration file to flow, the way the binary wires things

use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;
use txkit::config::{Cluster, Config};
use txkit::explorer::Explorer;
use txkit::flows::{self, FlowContext};
use txkit::keystore::KeyStore;
use txkit::rpc_manager::LocalLedger;
use txkit::tx_builder::{SubmitOptions, TxBuilder};
use txkit::types::SubmitMode;

#[tokio::test]
async fn test_config_file_drives_a_flow() {
    let dir = tempfile::tempdir().unwrap();
    let payer_path = dir.path().join("payer.json");
    let payer = KeyStore::generate();
    payer.write_to_file(&payer_path).unwrap();

    let config_path = dir.path().join("txkit.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[rpc]
endpoint = "http://127.0.0.1:8899"

[wallet]
keypair_path = "{}"

[submission]
confirm = false
poll_interval_ms = 20
"#,
            payer_path.display()
        ),
    )
    .unwrap();

    let config = Config::from_file(&config_path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.rpc.cluster().unwrap(), Cluster::Localnet);

    let options = SubmitOptions::from_config(&config).unwrap();
    assert_eq!(options.mode, SubmitMode::FireAndForget);
    assert_eq!(options.poll_interval, Duration::from_millis(20));

    let loaded = KeyStore::load_from_file(config.wallet.expanded_keypair_path()).unwrap();
    assert_eq!(loaded.pubkey(), payer.pubkey());

    let ledger = Arc::new(LocalLedger::new());
    ledger.fund(&loaded.pubkey(), 1_000_000);
    let ctx = FlowContext::new(
        TxBuilder::new(ledger.clone(), options),
        Explorer::new(&config.explorer.base_url, config.rpc.cluster().unwrap()),
        false,
    );

    let to = Pubkey::new_unique();
    let receipt = flows::transfer(&ctx, loaded.keypair(), &to, 5_000).await.unwrap();

    assert_eq!(ledger.balance(&to), 5_000);
    assert!(receipt
        .explorer_url
        .unwrap()
        .ends_with("?cluster=custom&customUrl=http%3A%2F%2F127.0.0.1%3A8899"));
}

#[test]
fn test_env_overrides_file_values() {
    let mut config = Config::default();
    config.apply_env(|key| match key {
        "TXKIT_CLUSTER" => Some("testnet".to_string()),
        "LOCAL_PAYER_JSON_ABSPATH" => Some("/keys/payer.json".to_string()),
        _ => None,
    });

    assert_eq!(config.rpc.resolved_endpoint().unwrap(), "https://api.testnet.solana.com");
    assert_eq!(config.wallet.keypair_path, "/keys/payer.json");
}
