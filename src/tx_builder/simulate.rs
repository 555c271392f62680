//! Dry runs
//!
//! Simulation executes a transaction against current ledger state without
//! committing anything. It is what `--dry-run` uses in place of submission.

use crate::structured_logging::TxLogger;
use crate::tx_builder::builder::TxBuilder;
use crate::tx_builder::errors::TransactionBuilderError;
use crate::tx_builder::output::SignedTransaction;
use crate::types::SimulationOutcome;

impl TxBuilder {
    /// Simulate `tx` and return the ledger's verdict
    ///
    /// An execution failure is reported in the outcome, not as an `Err`.
    pub async fn simulate(
        &self,
        tx: &SignedTransaction,
        logger: &TxLogger,
    ) -> Result<SimulationOutcome, TransactionBuilderError> {
        let outcome = self.ledger.simulate_transaction(tx.tx()).await?;
        logger.log_simulated(outcome.is_success(), outcome.units_consumed, outcome.logs.len());
        Ok(outcome)
    }

    /// Simulate and turn an execution failure into `Simulation`
    pub async fn simulate_checked(
        &self,
        tx: &SignedTransaction,
        logger: &TxLogger,
    ) -> Result<SimulationOutcome, TransactionBuilderError> {
        let outcome = self.simulate(tx, logger).await?;
        match &outcome.err {
            None => Ok(outcome),
            Some(message) => Err(TransactionBuilderError::Simulation {
                signature: tx.signature(),
                message: message.clone(),
                logs: outcome.logs,
            }),
        }
    }
}
