//! SPL Token and associated-token-account instructions

use solana_sdk::{account::Account, instruction::Instruction, pubkey::Pubkey};
use spl_token::solana_program::program_pack::Pack;

use crate::derive;
use crate::tx_builder::{InstructionPlan, TransactionBuilderError};

/// Size of a mint account
pub const MINT_SIZE: usize = spl_token::state::Mint::LEN;

/// Size of a token account
pub const TOKEN_ACCOUNT_SIZE: usize = spl_token::state::Account::LEN;

/// Append mint creation and initialization to `plan`
///
/// The mint account is funded with `rent_exempt_minimum` and owned by the
/// token program. `mint` must sign the transaction.
pub fn create_mint(
    plan: &mut InstructionPlan,
    payer: &Pubkey,
    mint: &Pubkey,
    mint_authority: &Pubkey,
    freeze_authority: Option<&Pubkey>,
    decimals: u8,
    rent_exempt_minimum: u64,
) -> Result<(), TransactionBuilderError> {
    let initialize = spl_token::instruction::initialize_mint2(
        &spl_token::id(),
        mint,
        mint_authority,
        freeze_authority,
        decimals,
    )
    .map_err(|e| TransactionBuilderError::instruction_failed("spl_token", e.to_string()))?;

    plan.create_account_rent_exempt(
        payer,
        mint,
        MINT_SIZE as u64,
        &spl_token::id(),
        rent_exempt_minimum,
    )
    .push(initialize);
    Ok(())
}

/// Create the associated token account of `owner` for `mint`
///
/// The idempotent form succeeds when the account already exists.
pub fn create_associated_token_account(
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    idempotent: bool,
) -> Instruction {
    if idempotent {
        spl_associated_token_account::instruction::create_associated_token_account_idempotent(
            payer,
            owner,
            mint,
            &spl_token::id(),
        )
    } else {
        spl_associated_token_account::instruction::create_associated_token_account(
            payer,
            owner,
            mint,
            &spl_token::id(),
        )
    }
}

/// Mint `amount` base units of `mint` into `destination`
///
/// The checked form makes the token program reject a `decimals` that does
/// not match the mint.
pub fn mint_to(
    mint: &Pubkey,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
) -> Result<Instruction, TransactionBuilderError> {
    spl_token::instruction::mint_to_checked(
        &spl_token::id(),
        mint,
        destination,
        authority,
        &[],
        amount,
        decimals,
    )
    .map_err(|e| TransactionBuilderError::instruction_failed("spl_token", e.to_string()))
}

/// Decode an initialized mint owned by the token program
pub fn unpack_mint(
    address: &Pubkey,
    account: &Account,
) -> Result<spl_token::state::Mint, TransactionBuilderError> {
    if account.owner != spl_token::id() {
        return Err(TransactionBuilderError::Configuration(format!(
            "{} is owned by {}, not the token program",
            address, account.owner
        )));
    }
    spl_token::state::Mint::unpack(&account.data).map_err(|e| {
        TransactionBuilderError::Configuration(format!("{} is not a token mint: {}", address, e))
    })
}

/// Append "create associated account and mint into it" to `plan`
///
/// Returns the associated token address.
pub fn mint_to_owner(
    plan: &mut InstructionPlan,
    payer: &Pubkey,
    owner: &Pubkey,
    mint: &Pubkey,
    authority: &Pubkey,
    amount: u64,
    decimals: u8,
    idempotent: bool,
) -> Result<Pubkey, TransactionBuilderError> {
    let ata = derive::associated_token_address(owner, mint).address;
    plan.push(create_associated_token_account(payer, owner, mint, idempotent))
        .push(mint_to(mint, &ata, authority, amount, decimals)?);
    Ok(ata)
}

/// Convert whole tokens to base units for `decimals`
pub fn to_base_units(amount: u64, decimals: u8) -> Result<u64, TransactionBuilderError> {
    10u64
        .checked_pow(decimals as u32)
        .and_then(|scale| amount.checked_mul(scale))
        .ok_or_else(|| {
            TransactionBuilderError::instruction_failed(
                "spl_token",
                format!("{} tokens with {} decimals overflows u64", amount, decimals),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mint_plan() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut plan = InstructionPlan::new();

        create_mint(&mut plan, &payer, &mint, &payer, Some(&payer), 6, 1_461_600).unwrap();

        assert_eq!(plan.len(), 2);
        let creation = &plan.creations()[0];
        assert_eq!(creation.address, mint);
        assert_eq!(creation.space, 82);
        assert_eq!(creation.owner, spl_token::id());
        assert_eq!(creation.lamports, 1_461_600);
        assert!(plan.underfunded_accounts().is_empty());
        assert_eq!(plan.instructions()[1].program_id, spl_token::id());
    }

    #[test]
    fn test_mint_to_owner() {
        let payer = Pubkey::new_unique();
        let mint = Pubkey::new_unique();
        let mut plan = InstructionPlan::new();

        let ata =
            mint_to_owner(&mut plan, &payer, &payer, &mint, &payer, 100_000_000, 6, true).unwrap();

        assert_eq!(ata, derive::associated_token_address(&payer, &mint).address);
        assert_eq!(plan.instructions()[0].program_id, spl_associated_token_account::id());
        // Idempotent create carries discriminator 1
        assert_eq!(plan.instructions()[0].data, vec![1]);

        let mint_ix = &plan.instructions()[1];
        assert_eq!(mint_ix.accounts[1].pubkey, ata);
        assert_eq!(
            spl_token::instruction::TokenInstruction::unpack(&mint_ix.data).unwrap(),
            spl_token::instruction::TokenInstruction::MintToChecked {
                amount: 100_000_000,
                decimals: 6
            }
        );
    }

    fn mint_account(decimals: u8, owner: Pubkey) -> Account {
        let mint = spl_token::state::Mint {
            mint_authority: Some(Pubkey::new_unique()).into(),
            supply: 0,
            decimals,
            is_initialized: true,
            freeze_authority: None.into(),
        };
        let mut data = vec![0; MINT_SIZE];
        spl_token::state::Mint::pack(mint, &mut data).unwrap();
        Account {
            lamports: 1_461_600,
            data,
            owner,
            executable: false,
            rent_epoch: 0,
        }
    }

    #[test]
    fn test_unpack_mint() {
        let address = Pubkey::new_unique();

        let mint = unpack_mint(&address, &mint_account(9, spl_token::id())).unwrap();
        assert_eq!(mint.decimals, 9);

        let foreign = unpack_mint(&address, &mint_account(9, Pubkey::new_unique()));
        assert!(matches!(foreign, Err(TransactionBuilderError::Configuration(_))));

        let empty = Account::new(1, MINT_SIZE, &spl_token::id());
        assert!(unpack_mint(&address, &empty).is_err());
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(100, 6).unwrap(), 100_000_000);
        assert_eq!(to_base_units(1, 0).unwrap(), 1);
        assert!(to_base_units(u64::MAX, 1).is_err());
    }
}
