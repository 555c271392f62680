//! Error types for the transaction builder
//!
//! Covers the whole lifecycle: instruction planning, building, signing,
//! submission and confirmation. Errors raised after a transaction was
//! signed carry its signature so the caller can look it up on the ledger.

use solana_sdk::{pubkey::Pubkey, signature::Signature};
use thiserror::Error;

use crate::rpc_manager::RpcManagerError;

/// Error type for all transaction builder operations
#[derive(Error, Debug)]
pub enum TransactionBuilderError {
    /// The instruction list is empty or not in dependency order
    #[error("Invalid instruction set: {0}")]
    InvalidInstructionSet(String),

    /// Failed to build an instruction for a specific program
    #[error("Instruction build error (program={program}): {reason}")]
    InstructionBuild {
        /// The program that failed to build an instruction
        program: String,
        /// Detailed reason for the failure
        reason: String,
    },

    /// A keypair could not produce a signature
    #[error("Signing failed: {0}")]
    Signing(String),

    /// One or more required signatures are absent or invalid
    ///
    /// `missing` is empty when the ledger rejected the signature set without
    /// saying which signer was at fault.
    #[error("Missing signature (signature={signature}, missing={missing:?})")]
    MissingSignature {
        signature: Signature,
        missing: Vec<Pubkey>,
    },

    /// A keypair was offered that the transaction does not require
    #[error("Unexpected signer: {0}")]
    UnexpectedSigner(Pubkey),

    /// The payer cannot cover rent, transfers and fees
    #[error("Insufficient funds (signature={signature})")]
    InsufficientFunds {
        signature: Signature,
        logs: Vec<String>,
    },

    /// The recency anchor expired before the transaction landed
    #[error("Stale recency anchor (signature={signature}, last_valid_block_height={last_valid_block_height})")]
    StaleAnchor {
        signature: Signature,
        last_valid_block_height: u64,
    },

    /// Preflight simulation or execution failed before commit
    #[error("Simulation failed (signature={signature}): {message}")]
    Simulation {
        signature: Signature,
        message: String,
        logs: Vec<String>,
    },

    /// Gave up waiting for the target commitment
    ///
    /// The transaction may still land. Re-query by signature instead of
    /// resubmitting.
    #[error("Confirmation timed out after {waited_ms}ms (signature={signature})")]
    ConfirmationTimeout { signature: Signature, waited_ms: u64 },

    /// The ledger processed the transaction and reported an execution error
    #[error("Transaction rejected (signature={signature}): {reason}")]
    TransactionRejected {
        signature: Signature,
        reason: String,
        logs: Vec<String>,
    },

    /// Ledger communication failure
    #[error("RPC error: {source}")]
    Rpc {
        /// Set when the failure happened while submitting or confirming
        signature: Option<Signature>,
        #[source]
        source: RpcManagerError,
    },

    /// Configuration or validation error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal invariant violation or unexpected state
    #[error("Internal error: {0}")]
    Internal(String),

    /// Wrapped error from external crates
    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl From<RpcManagerError> for TransactionBuilderError {
    fn from(source: RpcManagerError) -> Self {
        Self::Rpc {
            signature: None,
            source,
        }
    }
}

impl TransactionBuilderError {
    /// Translate a ledger rejection of a signed transaction
    pub fn from_submission(
        err: RpcManagerError,
        signature: Signature,
        last_valid_block_height: u64,
    ) -> Self {
        match err {
            RpcManagerError::BlockhashNotFound { .. } => Self::StaleAnchor {
                signature,
                last_valid_block_height,
            },
            RpcManagerError::InsufficientFunds { logs, .. } => {
                Self::InsufficientFunds { signature, logs }
            }
            RpcManagerError::SignatureVerification { .. } => Self::MissingSignature {
                signature,
                missing: Vec::new(),
            },
            RpcManagerError::Simulation { message, logs, .. } => Self::Simulation {
                signature,
                message,
                logs,
            },
            source => Self::Rpc {
                signature: Some(signature),
                source,
            },
        }
    }

    /// Check if this error is potentially retryable
    ///
    /// A stale anchor is retryable only by rebuilding and re-signing against
    /// a fresh one. Ambiguous outcomes are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::StaleAnchor { .. } => true,
            Self::Rpc { source, .. } => !self.is_ambiguous() && source.is_retryable(),

            Self::InvalidInstructionSet(_) => false,
            Self::InstructionBuild { .. } => false,
            Self::Signing(_) => false,
            Self::MissingSignature { .. } => false,
            Self::UnexpectedSigner(_) => false,
            Self::InsufficientFunds { .. } => false,
            Self::Simulation { .. } => false,
            Self::ConfirmationTimeout { .. } => false,
            Self::TransactionRejected { .. } => false,
            Self::Configuration(_) => false,
            Self::Internal(_) => false,
            Self::External(_) => false,
        }
    }

    /// Whether the transaction may or may not have landed
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Self::ConfirmationTimeout { .. } => true,
            // A transport failure after the bytes left may still have delivered them
            Self::Rpc {
                signature: Some(_),
                source: RpcManagerError::Transport { .. } | RpcManagerError::Timeout { .. },
            } => true,
            _ => false,
        }
    }

    /// Get the error category for metrics and observability
    pub fn category(&self) -> &'static str {
        match self {
            Self::InvalidInstructionSet(_) => "invalid_instruction_set",
            Self::InstructionBuild { .. } => "instruction",
            Self::Signing(_) => "signing",
            Self::MissingSignature { .. } => "missing_signature",
            Self::UnexpectedSigner(_) => "unexpected_signer",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::StaleAnchor { .. } => "stale_anchor",
            Self::Simulation { .. } => "simulation",
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::TransactionRejected { .. } => "rejected",
            Self::Rpc { .. } => "rpc",
            Self::Configuration(_) => "config",
            Self::Internal(_) => "internal",
            Self::External(_) => "external",
        }
    }

    /// Signature of the transaction this error is about, if it was signed
    pub fn signature(&self) -> Option<&Signature> {
        match self {
            Self::MissingSignature { signature, .. }
            | Self::InsufficientFunds { signature, .. }
            | Self::StaleAnchor { signature, .. }
            | Self::Simulation { signature, .. }
            | Self::ConfirmationTimeout { signature, .. }
            | Self::TransactionRejected { signature, .. } => Some(signature),
            Self::Rpc { signature, .. } => signature.as_ref(),
            _ => None,
        }
    }

    /// Program logs reported by the ledger, empty when there were none
    pub fn logs(&self) -> &[String] {
        match self {
            Self::InsufficientFunds { logs, .. }
            | Self::Simulation { logs, .. }
            | Self::TransactionRejected { logs, .. } => logs,
            Self::Rpc { source, .. } => source.logs(),
            _ => &[],
        }
    }
}

// Convenience constructors for common error scenarios
impl TransactionBuilderError {
    /// Create an instruction build error for a specific program
    pub fn instruction_failed(program: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InstructionBuild {
            program: program.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid instruction set error
    pub fn invalid_set(reason: impl Into<String>) -> Self {
        Self::InvalidInstructionSet(reason.into())
    }

    /// Create an internal error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal(reason.into())
    }
}
