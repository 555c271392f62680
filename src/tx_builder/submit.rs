//! Transaction submission and confirmation
//!
//! Two modes, chosen per call or by [`SubmitOptions`]:
//! - confirmed: send, then poll the signature status until the target
//!   commitment, an execution error, an expired anchor, or the timeout
//! - fire-and-forget: send and return the signature
//!
//! Nothing is retried automatically. A confirmation timeout is ambiguous and
//! callers should look the signature up rather than resubmit.

use crate::config::Config;
use crate::metrics::{metrics, Timer};
use crate::structured_logging::TxLogger;
use crate::tx_builder::builder::TxBuilder;
use crate::tx_builder::errors::TransactionBuilderError;
use crate::tx_builder::output::SignedTransaction;
use crate::types::{Commitment, RecentAnchor, SubmitMode};
use futures::future::join_all;
use solana_sdk::signature::Signature;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Submission settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOptions {
    pub mode: SubmitMode,

    /// Delay between signature status polls
    pub poll_interval: Duration,

    /// Upper bound on waiting for the target commitment
    pub confirm_timeout: Duration,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            mode: SubmitMode::default(),
            poll_interval: Duration::from_millis(500),
            confirm_timeout: Duration::from_secs(60),
        }
    }
}

impl SubmitOptions {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mode = if config.submission.confirm {
            SubmitMode::Confirmed(config.rpc.commitment()?)
        } else {
            SubmitMode::FireAndForget
        };

        Ok(Self {
            mode,
            poll_interval: Duration::from_millis(config.submission.poll_interval_ms),
            confirm_timeout: Duration::from_secs(config.submission.confirm_timeout_secs),
        })
    }

    pub fn with_mode(mut self, mode: SubmitMode) -> Self {
        self.mode = mode;
        self
    }
}

impl TxBuilder {
    /// Submit using the configured mode
    pub async fn submit(
        &self,
        tx: &SignedTransaction,
        logger: &TxLogger,
    ) -> Result<Signature, TransactionBuilderError> {
        self.submit_with_mode(tx, self.options.mode, logger).await
    }

    /// Submit and wait for `commitment`
    pub async fn send_and_confirm(
        &self,
        tx: &SignedTransaction,
        commitment: Commitment,
        logger: &TxLogger,
    ) -> Result<Signature, TransactionBuilderError> {
        self.submit_with_mode(tx, SubmitMode::Confirmed(commitment), logger)
            .await
    }

    pub async fn submit_with_mode(
        &self,
        tx: &SignedTransaction,
        mode: SubmitMode,
        logger: &TxLogger,
    ) -> Result<Signature, TransactionBuilderError> {
        let result = self.submit_inner(tx, mode, logger).await;
        if let Err(err) = &result {
            metrics().record_failure(err.category());
            logger.log_failure(
                err.signature().map(|s| s.to_string()).as_deref(),
                &err.to_string(),
                err.category(),
            );
        }
        result
    }

    async fn submit_inner(
        &self,
        tx: &SignedTransaction,
        mode: SubmitMode,
        logger: &TxLogger,
    ) -> Result<Signature, TransactionBuilderError> {
        // Incomplete signature sets never reach the network
        tx.ensure_fully_signed()?;

        let signature = tx.signature();
        let anchor = *tx.anchor();

        let sent = self
            .ledger
            .send_transaction(tx.tx())
            .await
            .map_err(|e| {
                TransactionBuilderError::from_submission(e, signature, anchor.last_valid_block_height)
            })?;
        if sent != signature {
            return Err(TransactionBuilderError::internal(format!(
                "ledger returned signature {} for transaction {}",
                sent, signature
            )));
        }

        metrics().transactions_submitted.inc();
        let confirm = matches!(mode, SubmitMode::Confirmed(_));
        logger.log_submitted(&signature.to_string(), confirm);

        match mode {
            SubmitMode::FireAndForget => Ok(signature),
            SubmitMode::Confirmed(target) => {
                let timer = Timer::new();
                let reached = self.wait_for_commitment(&signature, target, &anchor).await?;
                timer.observe_duration(&metrics().confirmation_latency);
                metrics().transactions_confirmed.inc();
                logger.log_confirmed(&signature.to_string(), reached.as_str(), timer.elapsed_ms());
                Ok(signature)
            }
        }
    }

    /// Poll until `signature` reaches `target`
    ///
    /// Returns the commitment actually observed, which may be stronger than
    /// the target.
    pub async fn wait_for_commitment(
        &self,
        signature: &Signature,
        target: Commitment,
        anchor: &RecentAnchor,
    ) -> Result<Commitment, TransactionBuilderError> {
        let started = Instant::now();
        let deadline = started + self.options.confirm_timeout;

        loop {
            match self.ledger.get_signature_status(signature).await {
                Ok(Some(status)) => {
                    if let Some(reason) = status.err {
                        let logs = self
                            .ledger
                            .get_transaction_logs(signature)
                            .await
                            .unwrap_or_default();
                        return Err(TransactionBuilderError::TransactionRejected {
                            signature: *signature,
                            reason,
                            logs,
                        });
                    }
                    if status.satisfies(target) {
                        return Ok(status.commitment);
                    }
                    debug!(
                        signature = %signature,
                        commitment = %status.commitment,
                        target = %target,
                        "Waiting for commitment"
                    );
                }
                Ok(None) => {
                    // Unknown and past its anchor: it can no longer land
                    if let Ok(height) = self.ledger.get_block_height().await {
                        if anchor.is_expired_at(height) {
                            return Err(TransactionBuilderError::StaleAnchor {
                                signature: *signature,
                                last_valid_block_height: anchor.last_valid_block_height,
                            });
                        }
                    }
                }
                Err(err) => {
                    debug!(signature = %signature, error = %err, "Status poll failed");
                }
            }

            if Instant::now() >= deadline {
                return Err(TransactionBuilderError::ConfirmationTimeout {
                    signature: *signature,
                    waited_ms: started.elapsed().as_millis() as u64,
                });
            }
            sleep(self.options.poll_interval).await;
        }
    }

    /// Submit independent transactions concurrently
    ///
    /// Results are returned in input order. One failure does not affect the
    /// others.
    pub async fn submit_all(
        &self,
        txs: &[SignedTransaction],
        logger: &TxLogger,
    ) -> Vec<Result<Signature, TransactionBuilderError>> {
        join_all(txs.iter().map(|tx| self.submit(tx, logger))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc_manager::LedgerClient;
    use crate::test_utils::{
        fast_options, funded_ledger, test_builder, MockLedger, SubmitBehavior, DEFAULT_FUNDING,
    };
    use crate::tx_builder::InstructionPlan;
    use solana_sdk::{
        pubkey::Pubkey,
        signature::{Keypair, Signer},
    };
    use std::sync::Arc;

    async fn signed_transfer(
        builder: &TxBuilder,
        payer: &Keypair,
        to: &Pubkey,
        lamports: u64,
    ) -> SignedTransaction {
        let logger = TxLogger::new("test");
        let mut plan = InstructionPlan::new();
        plan.transfer(&payer.pubkey(), to, lamports);
        builder
            .build_and_sign(payer, &mut plan, &[], &logger)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_confirmed_submission_lands() {
        let (ledger, payer) = funded_ledger(DEFAULT_FUNDING);
        let builder = test_builder(ledger.clone());
        let to = Pubkey::new_unique();

        let tx = signed_transfer(&builder, &payer, &to, 5_000).await;
        let signature = builder.submit(&tx, &TxLogger::new("test")).await.unwrap();

        assert_eq!(signature, tx.signature());
        assert_eq!(ledger.balance(&to), 5_000);
        let status = ledger.get_signature_status(&signature).await.unwrap().unwrap();
        assert!(status.satisfies(Commitment::Finalized));
    }

    #[tokio::test]
    async fn test_fire_and_forget_does_not_poll() {
        let (local, payer) = funded_ledger(DEFAULT_FUNDING);
        let mock = Arc::new(MockLedger::with_behavior(local, SubmitBehavior::Drop));
        let builder = TxBuilder::new(
            mock.clone(),
            fast_options().with_mode(SubmitMode::FireAndForget),
        );

        let tx = signed_transfer(&builder, &payer, &Pubkey::new_unique(), 1).await;
        let signature = builder.submit(&tx, &TxLogger::new("test")).await.unwrap();

        assert_eq!(signature, tx.signature());
        assert_eq!(mock.send_count(), 1);
        assert_eq!(mock.status_polls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unconfirmed_transaction_times_out() {
        let (local, payer) = funded_ledger(DEFAULT_FUNDING);
        let mock = Arc::new(MockLedger::with_behavior(local, SubmitBehavior::Drop));
        let builder = test_builder(mock.clone());

        let tx = signed_transfer(&builder, &payer, &Pubkey::new_unique(), 1).await;
        let err = builder.submit(&tx, &TxLogger::new("test")).await.unwrap_err();

        match &err {
            TransactionBuilderError::ConfirmationTimeout { signature, waited_ms } => {
                assert_eq!(*signature, tx.signature());
                assert!(*waited_ms >= 1_000);
            }
            other => panic!("expected ConfirmationTimeout, got {:?}", other),
        }
        assert!(err.is_ambiguous());
        assert!(!err.is_retryable());
        assert!(mock.status_polls() > 1);
    }

    #[tokio::test]
    async fn test_expired_anchor_is_reported_while_polling() {
        let (local, payer) = funded_ledger(DEFAULT_FUNDING);
        let mock = Arc::new(MockLedger::with_behavior(local.clone(), SubmitBehavior::Drop));
        let builder = test_builder(mock.clone());

        let tx = signed_transfer(&builder, &payer, &Pubkey::new_unique(), 1).await;
        local.advance_blocks(151);
        let err = builder.submit(&tx, &TxLogger::new("test")).await.unwrap_err();

        assert!(matches!(err, TransactionBuilderError::StaleAnchor { .. }));
        assert_eq!(err.signature(), Some(&tx.signature()));
    }

    #[tokio::test]
    async fn test_rejected_transaction_carries_logs() {
        let (local, payer) = funded_ledger(DEFAULT_FUNDING);
        let mock = Arc::new(MockLedger::with_behavior(
            local,
            SubmitBehavior::Reject("custom program error: 0x1".to_string()),
        ));
        let builder = test_builder(mock);

        let tx = signed_transfer(&builder, &payer, &Pubkey::new_unique(), 1).await;
        let err = builder.submit(&tx, &TxLogger::new("test")).await.unwrap_err();

        match &err {
            TransactionBuilderError::TransactionRejected { reason, logs, .. } => {
                assert_eq!(reason, "custom program error: 0x1");
                assert!(!logs.is_empty());
            }
            other => panic!("expected TransactionRejected, got {:?}", other),
        }
        assert_eq!(err.category(), "rejected");
    }

    #[tokio::test]
    async fn test_partially_signed_transaction_is_never_sent() {
        let (local, payer) = funded_ledger(DEFAULT_FUNDING);
        let mock = Arc::new(MockLedger::new(local.clone()));
        let builder = test_builder(mock.clone());
        let logger = TxLogger::new("test");
        let new_account = Keypair::new();

        let mut plan = InstructionPlan::new();
        plan.create_account(&payer.pubkey(), &new_account.pubkey(), 890_880, 0, &Pubkey::default());
        let output = builder.build_plan(&payer.pubkey(), &mut plan, &logger).await.unwrap();
        let tx = output.sign(&[&payer]).unwrap();

        let err = builder.submit(&tx, &logger).await.unwrap_err();
        match err {
            TransactionBuilderError::MissingSignature { missing, .. } => {
                assert_eq!(missing, vec![new_account.pubkey()]);
            }
            other => panic!("expected MissingSignature, got {:?}", other),
        }
        assert_eq!(mock.send_count(), 0);
        assert_eq!(local.balance(&payer.pubkey()), DEFAULT_FUNDING);
    }

    #[tokio::test]
    async fn test_submit_all_keeps_failures_separate() {
        let (ledger, payer) = funded_ledger(DEFAULT_FUNDING);
        let broke = Keypair::new();
        let builder = test_builder(ledger.clone());
        let to = Pubkey::new_unique();

        let txs = vec![
            signed_transfer(&builder, &payer, &to, 1_000).await,
            signed_transfer(&builder, &broke, &to, 1_000).await,
        ];
        let results = builder.submit_all(&txs, &TxLogger::new("test")).await;

        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(matches!(
            results[1],
            Err(TransactionBuilderError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.balance(&to), 1_000);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        let options = SubmitOptions::from_config(&config).unwrap();
        assert_eq!(options.mode, SubmitMode::Confirmed(Commitment::Confirmed));
        assert_eq!(options.poll_interval, Duration::from_millis(500));

        config.submission.confirm = false;
        let options = SubmitOptions::from_config(&config).unwrap();
        assert_eq!(options.mode, SubmitMode::FireAndForget);

        config.submission.confirm = true;
        config.rpc.commitment = "finalized".to_string();
        let options = SubmitOptions::from_config(&config).unwrap();
        assert_eq!(options.mode, SubmitMode::Confirmed(Commitment::Finalized));
    }
}
