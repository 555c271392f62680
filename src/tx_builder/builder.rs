//! Core transaction building
//!
//! [`build`] and [`sign`] are pure: they compile an instruction list into a
//! V0 message against a given anchor and fill signature slots. [`TxBuilder`]
//! adds the ledger queries a flow needs around them (rent-exempt minimums and
//! the latest anchor) and owns the submission settings.

use crate::metrics::{metrics, Timer};
use crate::rpc_manager::LedgerClient;
use crate::structured_logging::TxLogger;
use crate::tx_builder::errors::TransactionBuilderError;
use crate::tx_builder::instructions::{sanity_check_ix_order, InstructionPlan};
use crate::tx_builder::output::{SignedTransaction, TxBuildOutput};
use crate::tx_builder::submit::SubmitOptions;
use crate::types::RecentAnchor;
use solana_sdk::{
    instruction::Instruction,
    message::{v0::Message as MessageV0, VersionedMessage},
    packet::PACKET_DATA_SIZE,
    pubkey::Pubkey,
    signature::{Signature, Signer},
    transaction::VersionedTransaction,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Compile `instructions` into one atomic transaction paid by `payer`
///
/// Instructions run in the order given. The result has one empty signature
/// slot per required signer.
///
/// # Errors
///
/// `InvalidInstructionSet` for an empty list, an account referenced before
/// its creation, or a message that cannot be compiled.
pub fn build(
    payer: &Pubkey,
    instructions: &[Instruction],
    anchor: &RecentAnchor,
) -> Result<TxBuildOutput, TransactionBuilderError> {
    sanity_check_ix_order(instructions)?;

    let message = MessageV0::try_compile(payer, instructions, &[], anchor.blockhash)
        .map_err(|e| TransactionBuilderError::invalid_set(format!("failed to compile message: {}", e)))?;
    let message = VersionedMessage::V0(message);

    let num_signers = message.header().num_required_signatures as usize;
    let tx = VersionedTransaction {
        signatures: vec![Signature::default(); num_signers],
        message,
    };

    Ok(TxBuildOutput::new(tx, *anchor))
}

/// Sign a built transaction with any subset of its required signers
pub fn sign(
    output: TxBuildOutput,
    signers: &[&dyn Signer],
) -> Result<SignedTransaction, TransactionBuilderError> {
    output.sign(signers)
}

/// Builds transactions against a ledger and submits them
pub struct TxBuilder {
    pub(crate) ledger: Arc<dyn LedgerClient>,
    pub(crate) options: SubmitOptions,
}

impl TxBuilder {
    pub fn new(ledger: Arc<dyn LedgerClient>, options: SubmitOptions) -> Self {
        Self { ledger, options }
    }

    pub fn ledger(&self) -> &Arc<dyn LedgerClient> {
        &self.ledger
    }

    pub fn options(&self) -> &SubmitOptions {
        &self.options
    }

    /// Minimum balance that exempts an account of `space` bytes from rent
    pub async fn rent_exempt_minimum(&self, space: usize) -> Result<u64, TransactionBuilderError> {
        Ok(self.ledger.get_minimum_balance_for_rent_exemption(space).await?)
    }

    /// Fetch a fresh recency anchor
    pub async fn latest_anchor(&self) -> Result<RecentAnchor, TransactionBuilderError> {
        Ok(self.ledger.get_latest_anchor().await?)
    }

    /// Query the rent-exempt minimum for every creation in `plan` that
    /// does not have one yet
    pub async fn resolve_rent(&self, plan: &mut InstructionPlan) -> Result<(), TransactionBuilderError> {
        for space in plan.unresolved_spaces() {
            let minimum = self.rent_exempt_minimum(space as usize).await?;
            plan.set_rent_exempt_minimum(space, minimum);
        }
        Ok(())
    }

    /// Resolve rent, fetch an anchor and build `plan`
    ///
    /// Under-funded creations are not rejected; they are logged and remain
    /// visible through [`InstructionPlan::underfunded_accounts`].
    pub async fn build_plan(
        &self,
        payer: &Pubkey,
        plan: &mut InstructionPlan,
        logger: &TxLogger,
    ) -> Result<TxBuildOutput, TransactionBuilderError> {
        plan.validate()?;
        self.resolve_rent(plan).await?;

        let anchor = self.latest_anchor().await?;
        let timer = Timer::new();
        let output = build(payer, plan.instructions(), &anchor)?;
        timer.observe_duration(&metrics().build_latency);
        metrics().transactions_built.inc();

        for creation in plan.underfunded_accounts() {
            metrics().underfunded_creations.inc();
            logger.log_underfunded(
                &creation.address.to_string(),
                creation.lamports,
                creation.rent_exempt_minimum.unwrap_or_default(),
            );
        }

        let size = output.serialized_size()?;
        if size > PACKET_DATA_SIZE {
            warn!(
                context_id = %logger.context_id(),
                size_bytes = size,
                limit = PACKET_DATA_SIZE,
                "Transaction exceeds the packet size limit and will be rejected"
            );
        }
        logger.log_built(plan.len(), output.required_signers().len(), size);
        debug!(
            blockhash = %anchor.blockhash,
            last_valid_block_height = anchor.last_valid_block_height,
            "Transaction anchored"
        );

        Ok(output)
    }

    /// Build `plan` and sign it with the payer and any extra signers
    pub async fn build_and_sign(
        &self,
        payer: &dyn Signer,
        plan: &mut InstructionPlan,
        extra_signers: &[&dyn Signer],
        logger: &TxLogger,
    ) -> Result<SignedTransaction, TransactionBuilderError> {
        let output = self.build_plan(&payer.pubkey(), plan, logger).await?;

        let mut signers: Vec<&dyn Signer> = Vec::with_capacity(extra_signers.len() + 1);
        signers.push(payer);
        signers.extend_from_slice(extra_signers);

        sign(output, &signers)
    }
}
