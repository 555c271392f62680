//! In-process ledger
//!
//! Executes System-program transactions against an in-memory account map
//! with the same acceptance rules a cluster applies before anything lands:
//! serialized size, complete signature set, recent blockhash within its
//! validity window, fee-payer balance, and all-or-nothing execution of the
//! instruction list. Compute-budget instructions are accepted as no-ops;
//! any other program is rejected.
//!
//! Failed transactions behave like a preflight rejection: no fee is charged
//! and no account changes.

use async_trait::async_trait;
use parking_lot::RwLock;
use solana_sdk::{
    account::Account,
    compute_budget,
    hash::{hashv, Hash},
    message::VersionedMessage,
    pubkey::Pubkey,
    rent::Rent,
    signature::Signature,
    system_program,
    transaction::VersionedTransaction,
};
use std::collections::HashMap;
use tracing::{debug, warn};

use super::{LedgerClient, RpcManagerError};
use crate::types::{Commitment, RecentAnchor, SignatureStatus, SimulationOutcome};

/// Default fee per required signature
pub const LAMPORTS_PER_SIGNATURE: u64 = 5_000;

/// Largest serialized transaction the ledger accepts
pub const MAX_TRANSACTION_SIZE: usize = 1232;

/// Number of blocks a blockhash stays valid after it was issued
pub const MAX_PROCESSING_AGE: u64 = 150;

/// Compute units charged per System-program instruction
const SYSTEM_INSTRUCTION_UNITS: u64 = 150;

const ENDPOINT: &str = "local";

// System instruction discriminants (u32 little-endian)
const CREATE_ACCOUNT: u32 = 0;
const TRANSFER: u32 = 2;

struct LedgerState {
    accounts: HashMap<Pubkey, Account>,
    block_height: u64,
    latest_blockhash: Hash,
    /// blockhash -> block height at which it was issued
    blockhashes: HashMap<Hash, u64>,
    statuses: HashMap<Signature, SignatureStatus>,
    transaction_logs: HashMap<Signature, Vec<String>>,
}

/// Account changes and logs produced by executing one transaction
struct Execution {
    accounts: HashMap<Pubkey, Account>,
    logs: Vec<String>,
    units_consumed: u64,
}

/// Why execution stopped
struct Failure {
    error: RpcManagerError,
    logs: Vec<String>,
}

impl Failure {
    fn simulation(message: impl Into<String>, logs: Vec<String>) -> Self {
        let message = message.into();
        Self {
            error: RpcManagerError::Simulation {
                endpoint: ENDPOINT.to_string(),
                message,
                logs: logs.clone(),
            },
            logs,
        }
    }

    fn insufficient_funds(logs: Vec<String>) -> Self {
        Self {
            error: RpcManagerError::InsufficientFunds {
                endpoint: ENDPOINT.to_string(),
                logs: logs.clone(),
            },
            logs,
        }
    }

    fn rejected(error: RpcManagerError) -> Self {
        Self {
            error,
            logs: Vec::new(),
        }
    }
}

/// Instruction-level error raised by a program handler
enum ProgramError {
    InsufficientLamports { have: u64, need: u64 },
    Other(String),
}

/// In-memory [`LedgerClient`]
pub struct LocalLedger {
    state: RwLock<LedgerState>,
    rent: Rent,
    lamports_per_signature: u64,
}

impl Default for LocalLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalLedger {
    pub fn new() -> Self {
        let genesis = blockhash_for_height(0);
        let mut blockhashes = HashMap::new();
        blockhashes.insert(genesis, 0);

        Self {
            state: RwLock::new(LedgerState {
                accounts: HashMap::new(),
                block_height: 0,
                latest_blockhash: genesis,
                blockhashes,
                statuses: HashMap::new(),
                transaction_logs: HashMap::new(),
            }),
            rent: Rent::default(),
            lamports_per_signature: LAMPORTS_PER_SIGNATURE,
        }
    }

    /// Credit `lamports` to a system-owned account, creating it if needed
    pub fn fund(&self, address: &Pubkey, lamports: u64) {
        let mut state = self.state.write();
        let account = state
            .accounts
            .entry(*address)
            .or_insert_with(|| Account::new(0, 0, &system_program::id()));
        account.lamports = account.lamports.saturating_add(lamports);
    }

    /// Replace an account wholesale
    pub fn set_account(&self, address: &Pubkey, account: Account) {
        self.state.write().accounts.insert(*address, account);
    }

    pub fn account(&self, address: &Pubkey) -> Option<Account> {
        self.state.read().accounts.get(address).cloned()
    }

    pub fn balance(&self, address: &Pubkey) -> u64 {
        self.state
            .read()
            .accounts
            .get(address)
            .map(|a| a.lamports)
            .unwrap_or(0)
    }

    /// Fee charged for a transaction with `signatures` required signers
    pub fn fee_for(&self, signatures: usize) -> u64 {
        self.lamports_per_signature * signatures as u64
    }

    pub fn rent(&self) -> &Rent {
        &self.rent
    }

    /// Whether an existing account holds at least the rent-exempt minimum
    pub fn is_rent_exempt(&self, address: &Pubkey) -> bool {
        self.account(address)
            .map(|a| a.lamports >= self.rent.minimum_balance(a.data.len()))
            .unwrap_or(false)
    }

    /// Accounts the ledger would eventually purge for holding less than
    /// their rent-exempt minimum
    pub fn rent_delinquent_accounts(&self) -> Vec<Pubkey> {
        let state = self.state.read();
        let mut delinquent: Vec<Pubkey> = state
            .accounts
            .iter()
            .filter(|(_, a)| a.lamports < self.rent.minimum_balance(a.data.len()))
            .map(|(k, _)| *k)
            .collect();
        delinquent.sort();
        delinquent
    }

    /// Produce `blocks` new blocks, issuing a fresh blockhash
    pub fn advance_blocks(&self, blocks: u64) {
        let mut state = self.state.write();
        state.block_height += blocks;
        let height = state.block_height;
        let blockhash = blockhash_for_height(height);
        state.latest_blockhash = blockhash;
        state.blockhashes.insert(blockhash, height);

        // Drop hashes nobody can use any more
        state
            .blockhashes
            .retain(|_, issued| issued.saturating_add(MAX_PROCESSING_AGE) >= height);
    }

    pub fn block_height(&self) -> u64 {
        self.state.read().block_height
    }

    /// Number of transactions committed so far
    pub fn transaction_count(&self) -> usize {
        self.state.read().statuses.len()
    }

    fn process(
        &self,
        state: &LedgerState,
        tx: &VersionedTransaction,
    ) -> Result<Execution, Failure> {
        if let VersionedMessage::V0(message) = &tx.message {
            if !message.address_table_lookups.is_empty() {
                return Err(Failure::rejected(RpcManagerError::Validation(
                    "address lookup tables are not supported by the local ledger".to_string(),
                )));
            }
        }

        let size = bincode::serialize(tx)
            .map_err(|e| Failure::rejected(RpcManagerError::Internal(e.to_string())))?
            .len();
        if size > MAX_TRANSACTION_SIZE {
            return Err(Failure::simulation(
                format!(
                    "transaction too large: {} bytes (max {})",
                    size, MAX_TRANSACTION_SIZE
                ),
                Vec::new(),
            ));
        }

        let header = tx.message.header();
        let num_signers = header.num_required_signatures as usize;
        if tx.signatures.len() != num_signers
            || !tx.verify_with_results().into_iter().all(|ok| ok)
        {
            return Err(Failure::rejected(RpcManagerError::SignatureVerification {
                endpoint: ENDPOINT.to_string(),
            }));
        }

        let blockhash = tx.message.recent_blockhash();
        let fresh = state
            .blockhashes
            .get(blockhash)
            .map(|issued| state.block_height <= issued.saturating_add(MAX_PROCESSING_AGE))
            .unwrap_or(false);
        if !fresh {
            return Err(Failure::rejected(RpcManagerError::BlockhashNotFound {
                endpoint: ENDPOINT.to_string(),
            }));
        }

        let keys = tx.message.static_account_keys();
        let payer = keys.first().copied().ok_or_else(|| {
            Failure::rejected(RpcManagerError::Validation(
                "transaction has no fee payer".to_string(),
            ))
        })?;

        let mut working: HashMap<Pubkey, Account> = HashMap::new();
        let mut logs = Vec::new();
        let mut units_consumed = 0;

        let fee = self.fee_for(num_signers);
        let payer_account = load(state, &mut working, &payer);
        if payer_account.lamports < fee {
            return Err(Failure::insufficient_funds(vec![format!(
                "Fee payer {} has {} lamports, fee is {}",
                payer, payer_account.lamports, fee
            )]));
        }
        payer_account.lamports -= fee;

        for (index, ix) in tx.message.instructions().iter().enumerate() {
            let program_id = *keys.get(ix.program_id_index as usize).ok_or_else(|| {
                Failure::simulation(format!("instruction {} has no program", index), logs.clone())
            })?;
            let mut accounts = Vec::with_capacity(ix.accounts.len());
            for &account_index in &ix.accounts {
                let position = account_index as usize;
                let key = keys.get(position).copied().ok_or_else(|| {
                    Failure::simulation(
                        format!("instruction {} references a missing account", index),
                        logs.clone(),
                    )
                })?;
                accounts.push((key, position < num_signers));
            }

            logs.push(format!("Program {} invoke [1]", program_id));

            let result = if program_id == system_program::id() {
                units_consumed += SYSTEM_INSTRUCTION_UNITS;
                execute_system(state, &mut working, &accounts, &ix.data)
            } else if program_id == compute_budget::id() {
                Ok(())
            } else {
                Err(ProgramError::Other(
                    "program is not loaded on the local ledger".to_string(),
                ))
            };

            match result {
                Ok(()) => logs.push(format!("Program {} success", program_id)),
                Err(ProgramError::InsufficientLamports { have, need }) => {
                    logs.push(format!(
                        "Transfer: insufficient lamports {}, need {}",
                        have, need
                    ));
                    logs.push(format!(
                        "Program {} failed: custom program error: 0x1",
                        program_id
                    ));
                    return Err(Failure::insufficient_funds(logs));
                }
                Err(ProgramError::Other(reason)) => {
                    logs.push(format!("Program {} failed: {}", program_id, reason));
                    return Err(Failure::simulation(
                        format!("instruction {} failed: {}", index, reason),
                        logs,
                    ));
                }
            }
        }

        Ok(Execution {
            accounts: working,
            logs,
            units_consumed,
        })
    }
}

fn blockhash_for_height(height: u64) -> Hash {
    hashv(&[b"txkit-local-ledger", &height.to_le_bytes()])
}

/// Copy-on-write access to an account for the duration of one transaction
fn load<'a>(
    state: &LedgerState,
    working: &'a mut HashMap<Pubkey, Account>,
    address: &Pubkey,
) -> &'a mut Account {
    working.entry(*address).or_insert_with(|| {
        state
            .accounts
            .get(address)
            .cloned()
            .unwrap_or_else(|| Account::new(0, 0, &system_program::id()))
    })
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    data.get(offset..offset + 4)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u32::from_le_bytes)
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    data.get(offset..offset + 8)
        .and_then(|bytes| bytes.try_into().ok())
        .map(u64::from_le_bytes)
}

fn read_pubkey(data: &[u8], offset: usize) -> Option<Pubkey> {
    data.get(offset..offset + 32)
        .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
        .map(Pubkey::new_from_array)
}

fn execute_system(
    state: &LedgerState,
    working: &mut HashMap<Pubkey, Account>,
    accounts: &[(Pubkey, bool)],
    data: &[u8],
) -> Result<(), ProgramError> {
    let invalid = || ProgramError::Other("invalid instruction data".to_string());
    let discriminant = read_u32(data, 0).ok_or_else(invalid)?;

    match discriminant {
        CREATE_ACCOUNT => {
            let lamports = read_u64(data, 4).ok_or_else(invalid)?;
            let space = read_u64(data, 12).ok_or_else(invalid)?;
            let owner = read_pubkey(data, 20).ok_or_else(invalid)?;
            let [(from, from_signed), (to, to_signed)] = two_accounts(accounts)?;

            if !from_signed || !to_signed {
                return Err(ProgramError::Other(
                    "Create Account: missing required signature".to_string(),
                ));
            }

            let existing = load(state, working, &to);
            if existing.lamports > 0 || !existing.data.is_empty() {
                return Err(ProgramError::Other(format!(
                    "Create Account: account {} already in use",
                    to
                )));
            }

            debit(state, working, &from, lamports)?;
            let created = load(state, working, &to);
            *created = Account::new(lamports, space as usize, &owner);
            Ok(())
        }
        TRANSFER => {
            let lamports = read_u64(data, 4).ok_or_else(invalid)?;
            let [(from, from_signed), (to, _)] = two_accounts(accounts)?;

            if !from_signed {
                return Err(ProgramError::Other(
                    "Transfer: `from` account must sign".to_string(),
                ));
            }
            if !load(state, working, &from).data.is_empty() {
                return Err(ProgramError::Other(
                    "Transfer: `from` must not carry data".to_string(),
                ));
            }

            debit(state, working, &from, lamports)?;
            let recipient = load(state, working, &to);
            recipient.lamports = recipient.lamports.saturating_add(lamports);
            Ok(())
        }
        other => Err(ProgramError::Other(format!(
            "system instruction {} is not supported by the local ledger",
            other
        ))),
    }
}

fn two_accounts(accounts: &[(Pubkey, bool)]) -> Result<[(Pubkey, bool); 2], ProgramError> {
    match accounts {
        [first, second, ..] => Ok([*first, *second]),
        _ => Err(ProgramError::Other("not enough account keys".to_string())),
    }
}

fn debit(
    state: &LedgerState,
    working: &mut HashMap<Pubkey, Account>,
    address: &Pubkey,
    lamports: u64,
) -> Result<(), ProgramError> {
    let account = load(state, working, address);
    if account.lamports < lamports {
        return Err(ProgramError::InsufficientLamports {
            have: account.lamports,
            need: lamports,
        });
    }
    account.lamports -= lamports;
    Ok(())
}

#[async_trait]
impl LedgerClient for LocalLedger {
    fn endpoint(&self) -> &str {
        ENDPOINT
    }

    async fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcManagerError> {
        Ok(self.balance(address))
    }

    async fn get_minimum_balance_for_rent_exemption(
        &self,
        space: usize,
    ) -> Result<u64, RpcManagerError> {
        Ok(self.rent.minimum_balance(space))
    }

    async fn get_latest_anchor(&self) -> Result<RecentAnchor, RpcManagerError> {
        let state = self.state.read();
        let issued = state
            .blockhashes
            .get(&state.latest_blockhash)
            .copied()
            .unwrap_or(state.block_height);
        Ok(RecentAnchor::new(
            state.latest_blockhash,
            issued + MAX_PROCESSING_AGE,
        ))
    }

    async fn get_block_height(&self) -> Result<u64, RpcManagerError> {
        Ok(self.block_height())
    }

    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, RpcManagerError> {
        Ok(self.account(address))
    }

    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<Signature, RpcManagerError> {
        let signature = tx.signatures.first().copied().unwrap_or_default();
        let mut state = self.state.write();

        if state.statuses.contains_key(&signature) {
            return Err(RpcManagerError::AlreadyProcessed {
                endpoint: ENDPOINT.to_string(),
            });
        }

        let execution = match self.process(&state, tx) {
            Ok(execution) => execution,
            Err(failure) => {
                warn!(
                    signature = %signature,
                    error = %failure.error,
                    log_lines = failure.logs.len(),
                    "Local ledger rejected transaction"
                );
                return Err(failure.error);
            }
        };

        for (address, account) in execution.accounts {
            if account.lamports == 0 && account.data.is_empty() {
                state.accounts.remove(&address);
            } else {
                state.accounts.insert(address, account);
            }
        }

        let slot = state.block_height;
        state.statuses.insert(
            signature,
            SignatureStatus {
                slot,
                commitment: Commitment::Finalized,
                err: None,
            },
        );

        state.transaction_logs.insert(signature, execution.logs);

        debug!(
            signature = %signature,
            slot,
            units_consumed = execution.units_consumed,
            "Local ledger committed transaction"
        );
        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> Result<Option<SignatureStatus>, RpcManagerError> {
        Ok(self.state.read().statuses.get(signature).cloned())
    }

    async fn get_transaction_logs(
        &self,
        signature: &Signature,
    ) -> Result<Vec<String>, RpcManagerError> {
        Ok(self
            .state
            .read()
            .transaction_logs
            .get(signature)
            .cloned()
            .unwrap_or_default())
    }

    async fn simulate_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<SimulationOutcome, RpcManagerError> {
        let state = self.state.read();
        Ok(match self.process(&state, tx) {
            Ok(execution) => SimulationOutcome {
                err: None,
                logs: execution.logs,
                units_consumed: Some(execution.units_consumed),
            },
            Err(failure) => SimulationOutcome {
                err: Some(failure.error.to_string()),
                logs: failure.logs,
                units_consumed: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{
        message::{v0::Message as MessageV0, VersionedMessage},
        signature::{Keypair, Signer},
        system_instruction,
    };

    fn signed(
        ledger: &LocalLedger,
        payer: &Keypair,
        extra: &[&Keypair],
        ixs: &[solana_sdk::instruction::Instruction],
    ) -> VersionedTransaction {
        let blockhash = ledger.state.read().latest_blockhash;
        let message = MessageV0::try_compile(&payer.pubkey(), ixs, &[], blockhash).unwrap();
        let mut signers: Vec<&Keypair> = vec![payer];
        signers.extend_from_slice(extra);
        VersionedTransaction::try_new(VersionedMessage::V0(message), &signers).unwrap()
    }

    #[tokio::test]
    async fn test_transfer_charges_fee_and_moves_lamports() {
        let ledger = LocalLedger::new();
        let payer = Keypair::new();
        let to = Pubkey::new_unique();
        ledger.fund(&payer.pubkey(), 1_000_000);

        let tx = signed(
            &ledger,
            &payer,
            &[],
            &[system_instruction::transfer(&payer.pubkey(), &to, 7_000)],
        );
        ledger.send_transaction(&tx).await.unwrap();

        assert_eq!(ledger.balance(&payer.pubkey()), 1_000_000 - 7_000 - 5_000);
        assert_eq!(ledger.balance(&to), 7_000);
        assert_eq!(ledger.transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_rejected() {
        let ledger = LocalLedger::new();
        let payer = Keypair::new();
        ledger.fund(&payer.pubkey(), 1_000_000);

        let tx = signed(
            &ledger,
            &payer,
            &[],
            &[system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1)],
        );
        ledger.send_transaction(&tx).await.unwrap();
        let err = ledger.send_transaction(&tx).await.unwrap_err();

        assert!(matches!(err, RpcManagerError::AlreadyProcessed { .. }));
        assert_eq!(ledger.transaction_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_program_fails_without_fee() {
        let ledger = LocalLedger::new();
        let payer = Keypair::new();
        ledger.fund(&payer.pubkey(), 1_000_000);

        let foreign = solana_sdk::instruction::Instruction::new_with_bytes(
            Pubkey::new_unique(),
            &[1],
            vec![],
        );
        let tx = signed(&ledger, &payer, &[], &[foreign]);
        let err = ledger.send_transaction(&tx).await.unwrap_err();

        assert!(matches!(err, RpcManagerError::Simulation { .. }));
        assert_eq!(ledger.balance(&payer.pubkey()), 1_000_000);
    }

    #[tokio::test]
    async fn test_create_account_in_use() {
        let ledger = LocalLedger::new();
        let payer = Keypair::new();
        let existing = Keypair::new();
        ledger.fund(&payer.pubkey(), 10_000_000);
        ledger.fund(&existing.pubkey(), 1);

        let ix = system_instruction::create_account(
            &payer.pubkey(),
            &existing.pubkey(),
            1_000_000,
            0,
            &system_program::id(),
        );
        let tx = signed(&ledger, &payer, &[&existing], &[ix]);
        let outcome = ledger.simulate_transaction(&tx).await.unwrap();

        assert!(!outcome.is_success());
        assert!(outcome.logs.iter().any(|l| l.contains("already in use")));
    }

    #[tokio::test]
    async fn test_anchor_rolls_forward() {
        let ledger = LocalLedger::new();
        let first = ledger.get_latest_anchor().await.unwrap();
        assert_eq!(first.last_valid_block_height, MAX_PROCESSING_AGE);

        ledger.advance_blocks(10);
        let second = ledger.get_latest_anchor().await.unwrap();
        assert_ne!(first.blockhash, second.blockhash);
        assert_eq!(second.last_valid_block_height, 10 + MAX_PROCESSING_AGE);
    }

    #[test]
    fn test_rent_delinquency() {
        let ledger = LocalLedger::new();
        let exempt = Pubkey::new_unique();
        let short = Pubkey::new_unique();
        ledger.fund(&exempt, ledger.rent().minimum_balance(0));
        ledger.fund(&short, 1);

        assert!(ledger.is_rent_exempt(&exempt));
        assert!(!ledger.is_rent_exempt(&short));
        assert_eq!(ledger.rent_delinquent_accounts(), vec![short]);
    }
}
