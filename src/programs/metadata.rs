//! Token-metadata program instructions
//!
//! Only the two instructions the token and NFT flows need are encoded:
//! `CreateMetadataAccountV3` and `CreateMasterEditionV3`. Payloads are Borsh,
//! prefixed with a one-byte instruction discriminator.

use borsh::BorshSerialize;
use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    sysvar,
};
#[allow(deprecated)]
use solana_sdk::system_program;

use crate::derive;
use crate::tx_builder::TransactionBuilderError;

/// Token-metadata program
pub const ID: Pubkey = solana_sdk::pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

pub fn id() -> Pubkey {
    ID
}

/// First seed of every metadata-program address
pub const PREFIX: &[u8] = b"metadata";

/// Last seed of edition addresses
pub const EDITION: &[u8] = b"edition";

pub const MAX_NAME_LENGTH: usize = 32;
pub const MAX_SYMBOL_LENGTH: usize = 10;
pub const MAX_URI_LENGTH: usize = 200;
pub const MAX_CREATOR_LIMIT: usize = 5;

/// Royalties are expressed in basis points of the sale price
pub const MAX_SELLER_FEE_BASIS_POINTS: u16 = 10_000;

const CREATE_METADATA_ACCOUNT_V3: u8 = 33;
const CREATE_MASTER_EDITION_V3: u8 = 17;

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct Creator {
    pub address: [u8; 32],
    pub verified: bool,
    /// Percentage of royalties, all creators sum to 100
    pub share: u8,
}

impl Creator {
    pub fn new(address: &Pubkey, verified: bool, share: u8) -> Self {
        Self {
            address: address.to_bytes(),
            verified,
            share,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct Collection {
    pub verified: bool,
    pub key: [u8; 32],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, BorshSerialize)]
#[borsh(use_discriminant = true)]
pub enum UseMethod {
    Burn = 0,
    Multiple = 1,
    Single = 2,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct Uses {
    pub use_method: UseMethod,
    pub remaining: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub enum CollectionDetails {
    V1 { size: u64 },
}

/// On-chain metadata fields
#[derive(Debug, Clone, PartialEq, Eq, BorshSerialize)]
pub struct DataV2 {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
    pub collection: Option<Collection>,
    pub uses: Option<Uses>,
}

impl DataV2 {
    /// Metadata without creators, collection or uses
    pub fn simple(name: impl Into<String>, symbol: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            uri: uri.into(),
            seller_fee_basis_points: 0,
            creators: None,
            collection: None,
            uses: None,
        }
    }

    /// Reject values the metadata program would refuse
    pub fn validate(&self) -> Result<(), TransactionBuilderError> {
        let fail = |reason: String| Err(TransactionBuilderError::instruction_failed("token_metadata", reason));

        if self.name.len() > MAX_NAME_LENGTH {
            return fail(format!("name is {} bytes, max {}", self.name.len(), MAX_NAME_LENGTH));
        }
        if self.symbol.len() > MAX_SYMBOL_LENGTH {
            return fail(format!("symbol is {} bytes, max {}", self.symbol.len(), MAX_SYMBOL_LENGTH));
        }
        if self.uri.len() > MAX_URI_LENGTH {
            return fail(format!("uri is {} bytes, max {}", self.uri.len(), MAX_URI_LENGTH));
        }
        if self.seller_fee_basis_points > MAX_SELLER_FEE_BASIS_POINTS {
            return fail(format!(
                "seller fee is {} basis points, max {}",
                self.seller_fee_basis_points, MAX_SELLER_FEE_BASIS_POINTS
            ));
        }
        if let Some(creators) = &self.creators {
            if creators.is_empty() || creators.len() > MAX_CREATOR_LIMIT {
                return fail(format!(
                    "{} creators given, expected 1 to {}",
                    creators.len(),
                    MAX_CREATOR_LIMIT
                ));
            }
            let total: u32 = creators.iter().map(|c| c.share as u32).sum();
            if total != 100 {
                return fail(format!("creator shares sum to {}, expected 100", total));
            }
        }
        Ok(())
    }
}

#[derive(BorshSerialize)]
struct CreateMetadataAccountArgsV3<'a> {
    data: &'a DataV2,
    is_mutable: bool,
    collection_details: Option<CollectionDetails>,
}

#[derive(BorshSerialize)]
struct CreateMasterEditionArgs {
    max_supply: Option<u64>,
}

fn encode(discriminator: u8, args: &impl BorshSerialize) -> Result<Vec<u8>, TransactionBuilderError> {
    let mut data = vec![discriminator];
    args.serialize(&mut data)
        .map_err(|e| TransactionBuilderError::instruction_failed("token_metadata", e.to_string()))?;
    Ok(data)
}

/// Create the metadata account for `mint`
///
/// `mint_authority` must sign. `update_authority` signs as well so the
/// program accepts verified creators equal to it.
pub fn create_metadata_account_v3(
    mint: &Pubkey,
    mint_authority: &Pubkey,
    payer: &Pubkey,
    update_authority: &Pubkey,
    data: &DataV2,
    is_mutable: bool,
) -> Result<Instruction, TransactionBuilderError> {
    data.validate()?;

    let args = CreateMetadataAccountArgsV3 {
        data,
        is_mutable,
        collection_details: None,
    };

    let accounts = vec![
        AccountMeta::new(derive::metadata_address(mint).address, false),
        AccountMeta::new_readonly(*mint, false),
        AccountMeta::new_readonly(*mint_authority, true),
        AccountMeta::new(*payer, true),
        AccountMeta::new_readonly(*update_authority, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Ok(Instruction {
        program_id: id(),
        accounts,
        data: encode(CREATE_METADATA_ACCOUNT_V3, &args)?,
    })
}

/// Create the master edition of `mint`
///
/// The program takes over mint and freeze authority, which caps supply at
/// what was minted before this instruction. `max_supply` of `Some(0)` forbids
/// printed editions.
pub fn create_master_edition_v3(
    mint: &Pubkey,
    update_authority: &Pubkey,
    mint_authority: &Pubkey,
    payer: &Pubkey,
    max_supply: Option<u64>,
) -> Result<Instruction, TransactionBuilderError> {
    let accounts = vec![
        AccountMeta::new(derive::master_edition_address(mint).address, false),
        AccountMeta::new(*mint, false),
        AccountMeta::new_readonly(*update_authority, true),
        AccountMeta::new_readonly(*mint_authority, true),
        AccountMeta::new(*payer, true),
        AccountMeta::new(derive::metadata_address(mint).address, false),
        AccountMeta::new_readonly(spl_token::id(), false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(sysvar::rent::id(), false),
    ];

    Ok(Instruction {
        program_id: id(),
        accounts,
        data: encode(CREATE_MASTER_EDITION_V3, &CreateMasterEditionArgs { max_supply })?,
    })
}
