//! Transaction Builder
//!
//! Assembles an ordered list of instructions into one atomic transaction,
//! anchors it to a recent blockhash, signs it and hands it to a ledger.
//!
//! ## Architecture
//!
//! - **errors**: error taxonomy shared by every stage
//! - **instructions**: [`InstructionPlan`] with creation tracking and the
//!   dependency-order check
//! - **builder**: pure [`build`] / [`sign`] and the ledger-aware [`TxBuilder`]
//! - **output**: [`TxBuildOutput`] and [`SignedTransaction`]
//! - **submit**: confirmed and fire-and-forget submission
//! - **simulate**: dry runs
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use solana_sdk::{pubkey::Pubkey, signature::{Keypair, Signer}};
//! use txkit::rpc_manager::LocalLedger;
//! use txkit::structured_logging::TxLogger;
//! use txkit::tx_builder::{InstructionPlan, SubmitOptions, TxBuilder, TransactionBuilderError};
//!
//! # async fn example() -> Result<(), TransactionBuilderError> {
//! let payer = Keypair::new();
//! let builder = TxBuilder::new(Arc::new(LocalLedger::new()), SubmitOptions::default());
//! let logger = TxLogger::new("transfer");
//!
//! let mut plan = InstructionPlan::new();
//! plan.transfer(&payer.pubkey(), &Pubkey::new_unique(), 1_000);
//!
//! let signed = builder.build_and_sign(&payer, &mut plan, &[], &logger).await?;
//! let signature = builder.submit(&signed, &logger).await?;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub use errors::TransactionBuilderError;

mod builder;
mod instructions;
mod output;
mod simulate;
mod submit;

pub use builder::{build, sign, TxBuilder};
pub use instructions::{parse_create_account, sanity_check_ix_order, AccountCreation, InstructionPlan};
pub use output::{SignedTransaction, TxBuildOutput};
pub use submit::SubmitOptions;

pub type Result<T> = std::result::Result<T, TransactionBuilderError>;
