use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_rpc_client_api::request::{RpcError, RpcResponseErrorData};
use thiserror::Error;

/// Errors reported by a [`LedgerClient`](super::LedgerClient)
#[derive(Debug, Clone, Error)]
pub enum RpcManagerError {
    /// Transport-level errors (network, connection)
    #[error("Transport error: {message} (endpoint: {endpoint})")]
    Transport { endpoint: String, message: String },

    /// Timeout errors
    #[error("Timeout after {timeout_ms}ms (endpoint: {endpoint})")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// RPC response errors (from the RPC server)
    #[error("RPC response error: {message} (endpoint: {endpoint}, code: {code:?})")]
    RpcResponse {
        endpoint: String,
        message: String,
        code: Option<i64>,
    },

    /// The transaction's recent blockhash is unknown to the ledger or past
    /// its last valid block height
    #[error("Blockhash not found or expired (endpoint: {endpoint})")]
    BlockhashNotFound { endpoint: String },

    #[error("Insufficient funds (endpoint: {endpoint})")]
    InsufficientFunds { endpoint: String, logs: Vec<String> },

    /// One or more required signatures are absent or invalid
    #[error("Signature verification failed (endpoint: {endpoint})")]
    SignatureVerification { endpoint: String },

    /// Preflight simulation or instruction execution failed
    #[error("Transaction simulation failed: {message} (endpoint: {endpoint})")]
    Simulation {
        endpoint: String,
        message: String,
        logs: Vec<String>,
    },

    #[error("Transaction already processed (endpoint: {endpoint})")]
    AlreadyProcessed { endpoint: String },

    #[error("Account not found: {account} (endpoint: {endpoint})")]
    AccountNotFound { account: String, endpoint: String },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RpcManagerError {
    /// Check if this error is retryable
    ///
    /// Retrying never resubmits the same signed bytes blindly: a blockhash
    /// error means the caller has to rebuild against a fresh anchor.
    pub fn is_retryable(&self) -> bool {
        match self {
            RpcManagerError::Transport { .. } => true,
            RpcManagerError::Timeout { .. } => true,
            RpcManagerError::BlockhashNotFound { .. } => true,

            RpcManagerError::InsufficientFunds { .. } => false,
            RpcManagerError::SignatureVerification { .. } => false,
            RpcManagerError::Simulation { .. } => false,
            RpcManagerError::AlreadyProcessed { .. } => false,
            RpcManagerError::AccountNotFound { .. } => false,
            RpcManagerError::Validation(_) => false,
            RpcManagerError::Internal(_) => false,

            // Retry on server errors (5xx)
            RpcManagerError::RpcResponse { code, .. } => {
                matches!(code, Some(c) if (500..600).contains(c))
            }
        }
    }

    /// Get the endpoint associated with this error, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            RpcManagerError::Transport { endpoint, .. }
            | RpcManagerError::Timeout { endpoint, .. }
            | RpcManagerError::RpcResponse { endpoint, .. }
            | RpcManagerError::BlockhashNotFound { endpoint }
            | RpcManagerError::InsufficientFunds { endpoint, .. }
            | RpcManagerError::SignatureVerification { endpoint }
            | RpcManagerError::Simulation { endpoint, .. }
            | RpcManagerError::AlreadyProcessed { endpoint }
            | RpcManagerError::AccountNotFound { endpoint, .. } => Some(endpoint),
            RpcManagerError::Validation(_) | RpcManagerError::Internal(_) => None,
        }
    }

    /// Program logs attached to the error, empty when the ledger sent none
    pub fn logs(&self) -> &[String] {
        match self {
            RpcManagerError::InsufficientFunds { logs, .. }
            | RpcManagerError::Simulation { logs, .. } => logs,
            _ => &[],
        }
    }

    /// Create from ClientError with context
    pub fn from_client_error(err: ClientError, endpoint: &str) -> Self {
        let err_str = err.to_string().to_lowercase();
        let logs = preflight_logs(&err);
        let endpoint = endpoint.to_string();

        // Classify based on error message
        if err_str.contains("blockhash not found")
            || err_str.contains("block height exceeded")
            || err_str.contains("transaction expired")
        {
            RpcManagerError::BlockhashNotFound { endpoint }
        } else if err_str.contains("signature verification")
            || err_str.contains("signature failure")
            || err_str.contains("missing signature")
            || err_str.contains("not enough signers")
        {
            RpcManagerError::SignatureVerification { endpoint }
        } else if err_str.contains("insufficient funds")
            || err_str.contains("insufficient lamports")
            || err_str.contains("insufficientfundsforfee")
            // Fee payer has never been funded
            || err_str.contains("no record of a prior credit")
            || err_str.contains("accountnotfound")
        {
            RpcManagerError::InsufficientFunds { endpoint, logs }
        } else if err_str.contains("already been processed")
            || err_str.contains("alreadyprocessed")
        {
            RpcManagerError::AlreadyProcessed { endpoint }
        } else if err_str.contains("account not found") {
            RpcManagerError::AccountNotFound {
                account: "unknown".to_string(),
                endpoint,
            }
        } else if err_str.contains("simulation failed") || !logs.is_empty() {
            RpcManagerError::Simulation {
                endpoint,
                message: err.to_string(),
                logs,
            }
        } else if err_str.contains("timeout") || err_str.contains("timed out") {
            RpcManagerError::Timeout {
                endpoint,
                timeout_ms: 0,
            }
        } else if matches!(
            err.kind(),
            ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_)
        ) {
            RpcManagerError::Transport {
                endpoint,
                message: err.to_string(),
            }
        } else {
            let code = match err.kind() {
                ClientErrorKind::RpcError(RpcError::RpcResponseError { code, .. }) => Some(*code),
                _ => None,
            };

            RpcManagerError::RpcResponse {
                endpoint,
                message: err.to_string(),
                code,
            }
        }
    }
}

/// Pull the simulation logs out of a preflight failure, if the node sent any
fn preflight_logs(err: &ClientError) -> Vec<String> {
    match err.kind() {
        ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
            ..
        }) => sim.logs.clone().unwrap_or_default(),
        _ => Vec::new(),
    }
}
