//! txkit - Solana transaction toolkit
//!
//! Builds, signs, submits and confirms atomic multi-instruction transactions
//! against a Solana cluster or an in-process ledger, plus the account, token
//! and NFT flows built on top.

pub mod address_book;
pub mod compat;
pub mod config;
pub mod derive;
pub mod explorer;
pub mod flows;
pub mod keystore;
pub mod metadata_store;
pub mod metrics;
pub mod programs;
pub mod rpc_manager;
pub mod structured_logging;
pub mod test_utils;
pub mod tx_builder;
pub mod types;

// Re-export commonly used types
pub use solana_sdk::{pubkey::Pubkey, signature::Signature};
