//! Common types shared by the ledger client and the transaction builder

use serde::{Deserialize, Serialize};
use solana_sdk::hash::Hash;
use std::time::{Duration, Instant};

/// Lamports per SOL
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Recency anchor for a transaction
///
/// Wraps the blockhash a transaction is built against together with the last
/// block height at which the ledger still accepts it. The anchor is fetched
/// immediately before building and is only good for a short window, so it
/// also records when it was fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecentAnchor {
    /// The blockhash to use for the transaction
    pub blockhash: Hash,

    /// Last block height at which a transaction using `blockhash` is accepted
    pub last_valid_block_height: u64,

    /// When the anchor was fetched from the ledger
    pub fetched_at: Instant,
}

impl RecentAnchor {
    pub fn new(blockhash: Hash, last_valid_block_height: u64) -> Self {
        Self {
            blockhash,
            last_valid_block_height,
            fetched_at: Instant::now(),
        }
    }

    /// Whether the ledger would reject this anchor at `block_height`
    pub fn is_expired_at(&self, block_height: u64) -> bool {
        block_height > self.last_valid_block_height
    }

    /// Time elapsed since the anchor was fetched
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }
}

/// Commitment levels reported for a submitted transaction, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    Confirmed,
    Finalized,
}

impl Commitment {
    /// Parse a commitment name as used in config files and RPC requests
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "processed" => Some(Self::Processed),
            "confirmed" => Some(Self::Confirmed),
            "finalized" => Some(Self::Finalized),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Processed => "processed",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
        }
    }
}

impl Default for Commitment {
    fn default() -> Self {
        Self::Confirmed
    }
}

impl std::fmt::Display for Commitment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger-side status of a submitted transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureStatus {
    pub slot: u64,

    /// Highest commitment reached so far
    pub commitment: Commitment,

    /// Execution error, if the transaction landed but failed
    pub err: Option<String>,
}

impl SignatureStatus {
    /// Whether the transaction reached at least `target`
    pub fn satisfies(&self, target: Commitment) -> bool {
        self.commitment >= target
    }
}

/// Result of a dry run of a signed transaction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationOutcome {
    /// Execution error, `None` when the transaction would succeed
    pub err: Option<String>,

    /// Program logs emitted while executing
    pub logs: Vec<String>,

    pub units_consumed: Option<u64>,
}

impl SimulationOutcome {
    pub fn is_success(&self) -> bool {
        self.err.is_none()
    }
}

/// How a signed transaction is handed to the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    /// Submit and wait until the target commitment is reached
    Confirmed(Commitment),

    /// Submit and return the signature without observing the outcome
    FireAndForget,
}

impl Default for SubmitMode {
    fn default() -> Self {
        Self::Confirmed(Commitment::Confirmed)
    }
}

/// Convert lamports to SOL for display
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}
