//! Structured logging and flow context

use uuid::Uuid;

/// Structured logger for transaction lifecycle events
///
/// Every event carries the same `context_id` so the build, sign, submit and
/// confirm lines of one flow can be correlated.
#[derive(Debug, Clone)]
pub struct TxLogger {
    context_id: String,
    flow: String,
}

impl TxLogger {
    pub fn new(flow: &str) -> Self {
        Self {
            context_id: Uuid::new_v4().to_string(),
            flow: flow.to_string(),
        }
    }

    pub fn context_id(&self) -> &str {
        &self.context_id
    }

    pub fn flow(&self) -> &str {
        &self.flow
    }

    pub fn log_built(&self, instructions: usize, signers: usize, size: usize) {
        tracing::debug!(
            context_id = %self.context_id,
            flow = %self.flow,
            instructions,
            signers,
            size_bytes = size,
            "Transaction built"
        );
    }

    pub fn log_underfunded(&self, address: &str, lamports: u64, minimum: u64) {
        tracing::warn!(
            context_id = %self.context_id,
            flow = %self.flow,
            address = %address,
            lamports,
            rent_exempt_minimum = minimum,
            "Account creation funded below rent-exempt minimum"
        );
    }

    pub fn log_submitted(&self, signature: &str, confirm: bool) {
        tracing::info!(
            context_id = %self.context_id,
            flow = %self.flow,
            signature = %signature,
            confirm,
            "Transaction submitted"
        );
    }

    pub fn log_confirmed(&self, signature: &str, commitment: &str, latency_ms: u64) {
        tracing::info!(
            context_id = %self.context_id,
            flow = %self.flow,
            signature = %signature,
            commitment = %commitment,
            latency_ms,
            "Transaction confirmed"
        );
    }

    pub fn log_failure(&self, signature: Option<&str>, error: &str, category: &str) {
        tracing::warn!(
            context_id = %self.context_id,
            flow = %self.flow,
            signature = ?signature,
            error = %error,
            category = %category,
            "Transaction failed"
        );
    }

    pub fn log_simulated(&self, success: bool, units_consumed: Option<u64>, log_lines: usize) {
        tracing::info!(
            context_id = %self.context_id,
            flow = %self.flow,
            success,
            units_consumed = ?units_consumed,
            log_lines,
            "Transaction simulated"
        );
    }
}

impl Default for TxLogger {
    fn default() -> Self {
        Self::new("default")
    }
}
