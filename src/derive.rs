//! Program-derived addresses
//!
//! Every address here is a pure function of a program id and seeds. None of
//! them has a private key.

use solana_sdk::pubkey::Pubkey;

use crate::programs::metadata;

/// An address derived from a program id and seeds, with its bump seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedAddress {
    pub address: Pubkey,
    pub bump: u8,
    pub program_id: Pubkey,
}

impl DerivedAddress {
    /// Find the canonical (highest-bump) off-curve address for `seeds`
    pub fn find(seeds: &[&[u8]], program_id: &Pubkey) -> Self {
        let (address, bump) = Pubkey::find_program_address(seeds, program_id);
        Self {
            address,
            bump,
            program_id: *program_id,
        }
    }
}

impl std::fmt::Display for DerivedAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.address.fmt(f)
    }
}

/// Token-metadata account of `mint`: `["metadata", program, mint]`
pub fn metadata_address(mint: &Pubkey) -> DerivedAddress {
    let program_id = metadata::id();
    DerivedAddress::find(
        &[metadata::PREFIX, program_id.as_ref(), mint.as_ref()],
        &program_id,
    )
}

/// Master-edition account of `mint`: `["metadata", program, mint, "edition"]`
pub fn master_edition_address(mint: &Pubkey) -> DerivedAddress {
    let program_id = metadata::id();
    DerivedAddress::find(
        &[
            metadata::PREFIX,
            program_id.as_ref(),
            mint.as_ref(),
            metadata::EDITION,
        ],
        &program_id,
    )
}

/// Associated token account of `owner` for `mint` under the classic token program
pub fn associated_token_address(owner: &Pubkey, mint: &Pubkey) -> DerivedAddress {
    let program_id = spl_associated_token_account::id();
    DerivedAddress::find(
        &[owner.as_ref(), spl_token::id().as_ref(), mint.as_ref()],
        &program_id,
    )
}
