//! RPC Manager Module
//!
//! The ledger side of transaction submission: balance and rent queries,
//! recency anchors, submission, status polling and simulation, behind one
//! async trait so the builder does not care whether it talks to a cluster
//! or to the in-process [`LocalLedger`].

use async_trait::async_trait;
use solana_sdk::{
    account::Account, pubkey::Pubkey, signature::Signature, transaction::VersionedTransaction,
};

use crate::types::{RecentAnchor, SignatureStatus, SimulationOutcome};

// Submodules
pub mod local_ledger;
pub mod rpc_client;
pub mod rpc_errors;

// Re-exports for convenience
pub use local_ledger::LocalLedger;
pub use rpc_client::RpcLedgerClient;
pub use rpc_errors::RpcManagerError;

/// Read and write access to an account-model ledger
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Endpoint label used in errors and logs
    fn endpoint(&self) -> &str;

    /// Balance of `address` in lamports (0 for accounts that do not exist)
    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcManagerError>;

    /// Minimum balance that exempts an account of `space` bytes from rent
    async fn get_minimum_balance_for_rent_exemption(
        &self,
        space: usize,
    ) -> Result<u64, RpcManagerError>;

    /// Latest blockhash together with its last valid block height
    async fn get_latest_anchor(&self) -> Result<RecentAnchor, RpcManagerError>;

    async fn get_block_height(&self) -> Result<u64, RpcManagerError>;

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcManagerError>;

    /// Hand a signed transaction to the ledger and return its signature
    ///
    /// Returns as soon as the ledger accepted the transaction for
    /// processing; it does not wait for any commitment level.
    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<Signature, RpcManagerError>;

    /// Current status of a submitted transaction, `None` while unknown
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcManagerError>;

    /// Program logs of a processed transaction, empty when unavailable
    async fn get_transaction_logs(
        &self,
        _signature: &Signature,
    ) -> Result<Vec<String>, RpcManagerError> {
        Ok(Vec::new())
    }

    /// Execute without committing
    async fn simulate_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationOutcome, RpcManagerError>;
}
