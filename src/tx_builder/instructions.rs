//! Instruction planning and ordering validation
//!
//! An [`InstructionPlan`] is an ordered instruction list that remembers every
//! System-program account creation it contains. The record is used for two
//! checks:
//! - dependency order: no instruction may reference an account before the
//!   instruction that creates it
//! - funding: creations below the rent-exempt minimum are reported by
//!   [`InstructionPlan::underfunded_accounts`]

use crate::tx_builder::errors::TransactionBuilderError;
#[allow(deprecated)]
use solana_sdk::{
    instruction::Instruction, pubkey::Pubkey, system_instruction, system_program,
};
use std::collections::HashSet;

/// System instruction discriminant for `CreateAccount`
const CREATE_ACCOUNT_TAG: u32 = 0;

/// An account creation found in a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountCreation {
    /// Position of the creating instruction in the plan
    pub index: usize,
    pub address: Pubkey,
    pub funder: Pubkey,
    pub lamports: u64,
    pub space: u64,
    pub owner: Pubkey,
    /// Rent-exempt minimum for `space`, once queried
    pub rent_exempt_minimum: Option<u64>,
}

impl AccountCreation {
    /// Whether the account is funded below its queried minimum
    ///
    /// Unknown minimums are not reported.
    pub fn is_underfunded(&self) -> bool {
        matches!(self.rent_exempt_minimum, Some(min) if self.lamports < min)
    }
}

/// Ordered instructions plus the account creations they contain
#[derive(Debug, Clone, Default)]
pub struct InstructionPlan {
    instructions: Vec<Instruction>,
    creations: Vec<AccountCreation>,
}

impl InstructionPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Plan from an existing list, recording any creations it contains
    pub fn from_instructions(instructions: impl IntoIterator<Item = Instruction>) -> Self {
        let mut plan = Self::new();
        plan.extend(instructions);
        plan
    }

    /// Append one instruction
    pub fn push(&mut self, ix: Instruction) -> &mut Self {
        if let Some(mut creation) = parse_create_account(&ix) {
            creation.index = self.instructions.len();
            creation.rent_exempt_minimum = self
                .creations
                .iter()
                .find(|c| c.space == creation.space)
                .and_then(|c| c.rent_exempt_minimum);
            self.creations.push(creation);
        }
        self.instructions.push(ix);
        self
    }

    pub fn extend(&mut self, instructions: impl IntoIterator<Item = Instruction>) -> &mut Self {
        for ix in instructions {
            self.push(ix);
        }
        self
    }

    /// Create a System-owned or program-owned account with explicit funding
    ///
    /// Funding below the rent-exempt minimum is accepted and reported by
    /// [`underfunded_accounts`](Self::underfunded_accounts) once the minimum
    /// is known.
    pub fn create_account(
        &mut self,
        funder: &Pubkey,
        new_account: &Pubkey,
        lamports: u64,
        space: u64,
        owner: &Pubkey,
    ) -> &mut Self {
        self.push(system_instruction::create_account(
            funder,
            new_account,
            lamports,
            space,
            owner,
        ))
    }

    /// Create an account funded with exactly the rent-exempt minimum
    pub fn create_account_rent_exempt(
        &mut self,
        funder: &Pubkey,
        new_account: &Pubkey,
        space: u64,
        owner: &Pubkey,
        rent_exempt_minimum: u64,
    ) -> &mut Self {
        self.create_account(funder, new_account, rent_exempt_minimum, space, owner);
        self.set_rent_exempt_minimum(space, rent_exempt_minimum);
        self
    }

    pub fn transfer(&mut self, from: &Pubkey, to: &Pubkey, lamports: u64) -> &mut Self {
        self.push(system_instruction::transfer(from, to, lamports))
    }

    /// Record the rent-exempt minimum for every creation of `space` bytes
    pub fn set_rent_exempt_minimum(&mut self, space: u64, minimum: u64) {
        for creation in self.creations.iter_mut().filter(|c| c.space == space) {
            creation.rent_exempt_minimum = Some(minimum);
        }
    }

    /// Account sizes whose rent-exempt minimum is not known yet
    pub fn unresolved_spaces(&self) -> Vec<u64> {
        let mut spaces: Vec<u64> = self
            .creations
            .iter()
            .filter(|c| c.rent_exempt_minimum.is_none())
            .map(|c| c.space)
            .collect();
        spaces.sort_unstable();
        spaces.dedup();
        spaces
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }

    pub fn creations(&self) -> &[AccountCreation] {
        &self.creations
    }

    /// Creations funded below their rent-exempt minimum
    pub fn underfunded_accounts(&self) -> Vec<&AccountCreation> {
        self.creations.iter().filter(|c| c.is_underfunded()).collect()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Check the plan is buildable
    pub fn validate(&self) -> Result<(), TransactionBuilderError> {
        sanity_check_ix_order(&self.instructions)
    }
}

/// Decode a System `CreateAccount` instruction
///
/// Layout after the u32 tag: lamports (u64), space (u64), owner (32 bytes).
/// Accounts: funder, new account.
pub fn parse_create_account(ix: &Instruction) -> Option<AccountCreation> {
    if ix.program_id != system_program::id() {
        return None;
    }
    let data = &ix.data;
    let tag = u32::from_le_bytes(data.get(0..4)?.try_into().ok()?);
    if tag != CREATE_ACCOUNT_TAG {
        return None;
    }
    let lamports = u64::from_le_bytes(data.get(4..12)?.try_into().ok()?);
    let space = u64::from_le_bytes(data.get(12..20)?.try_into().ok()?);
    let owner = Pubkey::new_from_array(data.get(20..52)?.try_into().ok()?);

    Some(AccountCreation {
        index: 0,
        address: ix.accounts.get(1)?.pubkey,
        funder: ix.accounts.first()?.pubkey,
        lamports,
        space,
        owner,
        rent_exempt_minimum: None,
    })
}

/// Validate an instruction list before it is compiled
///
/// # Errors
///
/// Returns `TransactionBuilderError::InvalidInstructionSet` if:
/// - the list is empty
/// - the same account is created twice
/// - an instruction references an account before the instruction that
///   creates it
pub fn sanity_check_ix_order(instructions: &[Instruction]) -> Result<(), TransactionBuilderError> {
    if instructions.is_empty() {
        return Err(TransactionBuilderError::invalid_set(
            "Instruction list is empty",
        ));
    }

    let mut created = HashSet::new();
    for (index, ix) in instructions.iter().enumerate() {
        if let Some(creation) = parse_create_account(ix) {
            if !created.insert(creation.address) {
                return Err(TransactionBuilderError::invalid_set(format!(
                    "Account {} is created twice (second creation at position {})",
                    creation.address, index
                )));
            }

            if let Some(earlier) = instructions[..index]
                .iter()
                .position(|prev| prev.accounts.iter().any(|m| m.pubkey == creation.address))
            {
                return Err(TransactionBuilderError::invalid_set(format!(
                    "Instruction at position {} references account {} before it is created at position {}",
                    earlier, creation.address, index
                )));
            }
        }
    }

    Ok(())
}
