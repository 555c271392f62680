use async_trait::async_trait;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcSendTransactionConfig, RpcTransactionConfig},
};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey,
    signature::Signature, transaction::VersionedTransaction,
};
use solana_transaction_status::{TransactionConfirmationStatus, UiTransactionEncoding};
use std::time::Duration;
use tracing::debug;

use super::{LedgerClient, RpcManagerError};
use crate::config::RpcConfig;
use crate::types::{Commitment, RecentAnchor, SignatureStatus, SimulationOutcome};

/// [`LedgerClient`] backed by a JSON-RPC node
pub struct RpcLedgerClient {
    client: RpcClient,
    endpoint: String,
    commitment: CommitmentConfig,
    skip_preflight: bool,
}

impl RpcLedgerClient {
    pub fn new(endpoint: impl Into<String>, commitment: Commitment, timeout: Duration) -> Self {
        let endpoint = endpoint.into();
        let commitment = commitment_config(commitment);
        let client =
            RpcClient::new_with_timeout_and_commitment(endpoint.clone(), timeout, commitment);

        Self {
            client,
            endpoint,
            commitment,
            skip_preflight: false,
        }
    }

    /// Build a client from the `[rpc]` section of the configuration
    pub fn from_config(config: &RpcConfig) -> Result<Self, RpcManagerError> {
        let commitment = Commitment::parse(&config.commitment).ok_or_else(|| {
            RpcManagerError::Validation(format!("unknown commitment '{}'", config.commitment))
        })?;
        let endpoint = config
            .resolved_endpoint()
            .map_err(|e| RpcManagerError::Validation(e.to_string()))?;

        let mut client = Self::new(endpoint, commitment, Duration::from_secs(config.timeout_secs));
        client.skip_preflight = config.skip_preflight;
        Ok(client)
    }

    fn map_err(&self, err: solana_client::client_error::ClientError) -> RpcManagerError {
        RpcManagerError::from_client_error(err, &self.endpoint)
    }
}

fn commitment_config(commitment: Commitment) -> CommitmentConfig {
    match commitment {
        Commitment::Processed => CommitmentConfig::processed(),
        Commitment::Confirmed => CommitmentConfig::confirmed(),
        Commitment::Finalized => CommitmentConfig::finalized(),
    }
}

/// `getTransaction` refuses `processed`, so history lookups use at least
/// `confirmed`
fn history_commitment(commitment: CommitmentConfig) -> CommitmentConfig {
    if commitment.is_finalized() {
        commitment
    } else {
        CommitmentConfig::confirmed()
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcManagerError> {
        self.client
            .get_balance_with_commitment(address, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(|e| self.map_err(e))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        space: usize,
    ) -> Result<u64, RpcManagerError> {
        self.client
            .get_minimum_balance_for_rent_exemption(space)
            .await
            .map_err(|e| self.map_err(e))
    }

    async fn get_latest_anchor(&self) -> Result<RecentAnchor, RpcManagerError> {
        let (blockhash, last_valid_block_height) = self
            .client
            .get_latest_blockhash_with_commitment(self.commitment)
            .await
            .map_err(|e| self.map_err(e))?;

        debug!(
            endpoint = %self.endpoint,
            blockhash = %blockhash,
            last_valid_block_height,
            "Fetched recent anchor"
        );
        Ok(RecentAnchor::new(blockhash, last_valid_block_height))
    }

    async fn get_block_height(&self) -> Result<u64, RpcManagerError> {
        self.client
            .get_block_height_with_commitment(self.commitment)
            .await
            .map_err(|e| self.map_err(e))
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcManagerError> {
        self.client
            .get_account_with_commitment(address, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(|e| self.map_err(e))
    }

    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<Signature, RpcManagerError> {
        let config = RpcSendTransactionConfig {
            skip_preflight: self.skip_preflight,
            preflight_commitment: Some(self.commitment.commitment),
            ..RpcSendTransactionConfig::default()
        };

        self.client
            .send_transaction_with_config(tx, config)
            .await
            .map_err(|e| self.map_err(e))
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcManagerError> {
        let response = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| self.map_err(e))?;

        let status = response.value.into_iter().next().flatten();
        Ok(status.map(|status| {
            let commitment = match status.confirmation_status {
                Some(TransactionConfirmationStatus::Finalized) => Commitment::Finalized,
                Some(TransactionConfirmationStatus::Confirmed) => Commitment::Confirmed,
                Some(TransactionConfirmationStatus::Processed) => Commitment::Processed,
                // Nodes that omit the field report rooted transactions with no confirmation count
                None if status.confirmations.is_none() => Commitment::Finalized,
                None => Commitment::Processed,
            };

            SignatureStatus {
                slot: status.slot,
                commitment,
                err: status.err.map(|e| format!("{:?}", e)),
            }
        }))
    }

    async fn get_transaction_logs(
        &self,
        signature: &Signature,
    ) -> Result<Vec<String>, RpcManagerError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(history_commitment(self.commitment)),
            max_supported_transaction_version: Some(0),
        };

        let tx = self
            .client
            .get_transaction_with_config(signature, config)
            .await
            .map_err(|e| self.map_err(e))?;

        Ok(tx
            .transaction
            .meta
            .and_then(|meta| Option::<Vec<String>>::from(meta.log_messages))
            .unwrap_or_default())
    }

    async fn simulate_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationOutcome, RpcManagerError> {
        let response = self
            .client
            .simulate_transaction(tx)
            .await
            .map_err(|e| self.map_err(e))?;

        let result = response.value;
        Ok(SimulationOutcome {
            err: result.err.map(|e| format!("{:?}", e)),
            logs: result.logs.unwrap_or_default(),
            units_consumed: result.units_consumed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_commitment_is_at_least_confirmed() {
        assert_eq!(
            history_commitment(CommitmentConfig::processed()),
            CommitmentConfig::confirmed()
        );
        assert_eq!(
            history_commitment(CommitmentConfig::confirmed()),
            CommitmentConfig::confirmed()
        );
        assert_eq!(
            history_commitment(CommitmentConfig::finalized()),
            CommitmentConfig::finalized()
        );
    }
}
