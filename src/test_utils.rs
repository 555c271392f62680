//! Test Utilities Module
//!
//! Fixtures for deterministic tests: funded in-process ledgers, builders
//! with fast polling, and a [`MockLedger`] whose submission behavior can be
//! scripted.
//!
//! These utilities are only compiled when running tests or when the
//! `test_utils` feature is enabled.

#![cfg(any(test, feature = "test_utils"))]

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::{
    account::Account,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    transaction::VersionedTransaction,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::rpc_manager::{LedgerClient, LocalLedger, RpcManagerError};
use crate::tx_builder::{SubmitOptions, TxBuilder};
use crate::types::{Commitment, RecentAnchor, SignatureStatus, SimulationOutcome, SubmitMode};

/// One SOL, enough for every flow in the crate
pub const DEFAULT_FUNDING: u64 = 1_000_000_000;

/// Keypair plus a local ledger where it holds `lamports`
pub fn funded_ledger(lamports: u64) -> (Arc<LocalLedger>, Keypair) {
    let ledger = Arc::new(LocalLedger::new());
    let payer = Keypair::new();
    ledger.fund(&payer.pubkey(), lamports);
    (ledger, payer)
}

/// Options that confirm quickly and give up after one second
pub fn fast_options() -> SubmitOptions {
    SubmitOptions {
        mode: SubmitMode::Confirmed(Commitment::Confirmed),
        poll_interval: Duration::from_millis(10),
        confirm_timeout: Duration::from_secs(1),
    }
}

/// Builder over `ledger` with [`fast_options`]
pub fn test_builder(ledger: Arc<dyn LedgerClient>) -> TxBuilder {
    TxBuilder::new(ledger, fast_options())
}

/// How [`MockLedger`] treats submissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBehavior {
    /// Forward to the local ledger
    Process,
    /// Accept the transaction but never process it
    Drop,
    /// Accept it and report this execution error on status polls
    Reject(String),
}

/// Local ledger with scriptable submission and call counters
pub struct MockLedger {
    inner: Arc<LocalLedger>,
    behavior: Mutex<SubmitBehavior>,
    rejected: Mutex<Vec<Signature>>,
    sent: Mutex<Vec<VersionedTransaction>>,
    send_count: AtomicUsize,
    status_polls: AtomicUsize,
}

impl MockLedger {
    pub fn new(inner: Arc<LocalLedger>) -> Self {
        Self {
            inner,
            behavior: Mutex::new(SubmitBehavior::Process),
            rejected: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            send_count: AtomicUsize::new(0),
            status_polls: AtomicUsize::new(0),
        }
    }

    pub fn with_behavior(inner: Arc<LocalLedger>, behavior: SubmitBehavior) -> Self {
        let ledger = Self::new(inner);
        ledger.set_behavior(behavior);
        ledger
    }

    pub fn set_behavior(&self, behavior: SubmitBehavior) {
        *self.behavior.lock() = behavior;
    }

    pub fn inner(&self) -> &Arc<LocalLedger> {
        &self.inner
    }

    pub fn send_count(&self) -> usize {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn status_polls(&self) -> usize {
        self.status_polls.load(Ordering::SeqCst)
    }

    /// Most recent transaction handed to `send_transaction`
    pub fn last_sent(&self) -> Option<VersionedTransaction> {
        self.sent.lock().last().cloned()
    }

    /// Reset counters and go back to processing submissions
    pub fn reset(&self) {
        self.set_behavior(SubmitBehavior::Process);
        self.rejected.lock().clear();
        self.sent.lock().clear();
        self.send_count.store(0, Ordering::SeqCst);
        self.status_polls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn endpoint(&self) -> &str {
        "mock"
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcManagerError> {
        self.inner.get_balance(address).await
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        space: usize,
    ) -> Result<u64, RpcManagerError> {
        self.inner.get_minimum_balance_for_rent_exemption(space).await
    }

    async fn get_latest_anchor(&self) -> Result<RecentAnchor, RpcManagerError> {
        self.inner.get_latest_anchor().await
    }

    async fn get_block_height(&self) -> Result<u64, RpcManagerError> {
        self.inner.get_block_height().await
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcManagerError> {
        self.inner.get_account(address).await
    }

    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<Signature, RpcManagerError> {
        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().push(tx.clone());
        let signature = tx.signatures.first().copied().unwrap_or_default();

        let behavior = self.behavior.lock().clone();
        match behavior {
            SubmitBehavior::Process => self.inner.send_transaction(tx).await,
            SubmitBehavior::Drop => Ok(signature),
            SubmitBehavior::Reject(_) => {
                self.rejected.lock().push(signature);
                Ok(signature)
            }
        }
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcManagerError> {
        self.status_polls.fetch_add(1, Ordering::SeqCst);

        if let SubmitBehavior::Reject(reason) = self.behavior.lock().clone() {
            if self.rejected.lock().contains(signature) {
                return Ok(Some(SignatureStatus {
                    slot: self.inner.block_height(),
                    commitment: Commitment::Processed,
                    err: Some(reason),
                }));
            }
        }
        self.inner.get_signature_status(signature).await
    }

    async fn get_transaction_logs(
        &self,
        signature: &Signature,
    ) -> Result<Vec<String>, RpcManagerError> {
        if self.rejected.lock().contains(signature) {
            return Ok(vec!["Program log: scripted failure".to_string()]);
        }
        self.inner.get_transaction_logs(signature).await
    }

    async fn simulate_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationOutcome, RpcManagerError> {
        self.inner.simulate_transaction(tx).await
    }
}
