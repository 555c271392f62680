//! End-to-end flows
//!
//! Each flow derives or generates the addresses it needs, queries rent and a
//! fresh anchor, composes one transaction in dependency order, signs it and
//! either submits it or, in dry-run mode, simulates it. The result is a
//! [`Receipt`] naming the signature and every address the flow produced.

use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::collections::BTreeMap;
use tracing::info;
#[allow(deprecated)]
use solana_sdk::system_program;

use crate::address_book::{AddressBook, TOKEN_MINT};
use crate::derive;
use crate::explorer::Explorer;
use crate::metadata_store::{MetadataStore, OffChainMetadata};
use crate::programs::{metadata, token};
use crate::structured_logging::TxLogger;
use crate::tx_builder::{InstructionPlan, SignedTransaction, TransactionBuilderError, TxBuilder};
use crate::types::{lamports_to_sol, SimulationOutcome};

/// Everything a flow needs besides its own parameters
pub struct FlowContext {
    pub builder: TxBuilder,
    pub explorer: Explorer,
    /// Simulate instead of submitting
    pub dry_run: bool,
}

/// What a flow produced
#[derive(Debug, Clone)]
pub struct Receipt {
    pub flow: &'static str,

    /// Transaction id; also set for dry runs, where nothing was submitted
    pub signature: Signature,

    /// Transaction page, `None` for dry runs
    pub explorer_url: Option<String>,

    /// Named addresses created or used by the flow
    pub addresses: BTreeMap<&'static str, Pubkey>,

    /// Present for dry runs only
    pub simulation: Option<SimulationOutcome>,

    /// Base64 wire encoding, kept for dry runs so the transaction can be
    /// inspected or sent later
    pub encoded: Option<String>,

    /// Creations funded below their rent-exempt minimum
    pub underfunded: Vec<Pubkey>,
}

impl Receipt {
    pub fn submitted(&self) -> bool {
        self.simulation.is_none()
    }
}

/// Balance of one address
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceReport {
    pub address: Pubkey,
    pub lamports: u64,
    pub sol: f64,
}

/// Token presentation for `create_token`
#[derive(Debug, Clone)]
pub struct TokenParams {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    /// Whole tokens minted to the payer in the same transaction
    pub initial_supply: Option<u64>,
}

/// Presentation and royalty for `create_nft`
#[derive(Debug, Clone)]
pub struct NftParams {
    pub metadata: OffChainMetadata,
    pub seller_fee_basis_points: u16,
    pub is_mutable: bool,
}

impl FlowContext {
    pub fn new(builder: TxBuilder, explorer: Explorer, dry_run: bool) -> Self {
        Self {
            builder,
            explorer,
            dry_run,
        }
    }

    /// Submit or simulate a signed transaction and wrap the result
    async fn finish(
        &self,
        flow: &'static str,
        signed: SignedTransaction,
        plan: &InstructionPlan,
        addresses: BTreeMap<&'static str, Pubkey>,
        logger: &TxLogger,
    ) -> Result<Receipt, TransactionBuilderError> {
        let (simulation, encoded) = if self.dry_run {
            let outcome = self.builder.simulate_checked(&signed, logger).await?;
            (Some(outcome), Some(signed.to_base64()?))
        } else {
            self.builder.submit(&signed, logger).await?;
            (None, None)
        };

        let signature = signed.signature();
        let explorer_url = simulation.is_none().then(|| self.explorer.tx_url(&signature));
        Ok(Receipt {
            flow,
            signature,
            explorer_url,
            addresses,
            simulation,
            encoded,
            underfunded: plan.underfunded_accounts().iter().map(|c| c.address).collect(),
        })
    }
}

/// Read-only: balance of `address`
pub async fn check_balance(
    ctx: &FlowContext,
    address: &Pubkey,
) -> Result<BalanceReport, TransactionBuilderError> {
    let lamports = ctx.builder.ledger().get_balance(address).await?;
    Ok(BalanceReport {
        address: *address,
        lamports,
        sol: lamports_to_sol(lamports),
    })
}

/// Create a rent-exempt System account of `space` bytes
pub async fn create_account(
    ctx: &FlowContext,
    payer: &Keypair,
    new_account: &Keypair,
    space: u64,
) -> Result<Receipt, TransactionBuilderError> {
    let logger = TxLogger::new("create_account");
    let minimum = ctx.builder.rent_exempt_minimum(space as usize).await?;

    let mut plan = InstructionPlan::new();
    plan.create_account_rent_exempt(
        &payer.pubkey(),
        &new_account.pubkey(),
        space,
        &system_program::id(),
        minimum,
    );

    let signed = ctx
        .builder
        .build_and_sign(payer, &mut plan, &[new_account], &logger)
        .await?;
    let addresses = BTreeMap::from([("newAccount", new_account.pubkey())]);
    ctx.finish("create_account", signed, &plan, addresses, &logger).await
}

/// Move `lamports` from the payer to `to`
pub async fn transfer(
    ctx: &FlowContext,
    payer: &Keypair,
    to: &Pubkey,
    lamports: u64,
) -> Result<Receipt, TransactionBuilderError> {
    let logger = TxLogger::new("transfer");

    let mut plan = InstructionPlan::new();
    plan.transfer(&payer.pubkey(), to, lamports);

    let signed = ctx.builder.build_and_sign(payer, &mut plan, &[], &logger).await?;
    let addresses = BTreeMap::from([("recipient", *to)]);
    ctx.finish("transfer", signed, &plan, addresses, &logger).await
}

/// Create a zero-space account and transfer `lamports` to it, atomically
///
/// The new account ends with its rent-exempt minimum plus `lamports`.
pub async fn create_and_fund(
    ctx: &FlowContext,
    payer: &Keypair,
    new_account: &Keypair,
    lamports: u64,
) -> Result<Receipt, TransactionBuilderError> {
    let logger = TxLogger::new("create_and_fund");
    let minimum = ctx.builder.rent_exempt_minimum(0).await?;

    let mut plan = InstructionPlan::new();
    plan.create_account_rent_exempt(
        &payer.pubkey(),
        &new_account.pubkey(),
        0,
        &system_program::id(),
        minimum,
    )
    .transfer(&payer.pubkey(), &new_account.pubkey(), lamports);

    let signed = ctx
        .builder
        .build_and_sign(payer, &mut plan, &[new_account], &logger)
        .await?;
    let addresses = BTreeMap::from([("newAccount", new_account.pubkey())]);
    ctx.finish("create_and_fund", signed, &plan, addresses, &logger).await
}

/// Create an account, fund it, and pay an existing account, all or nothing
pub async fn create_and_distribute(
    ctx: &FlowContext,
    payer: &Keypair,
    new_account: &Keypair,
    to_new: u64,
    existing: &Pubkey,
    to_existing: u64,
) -> Result<Receipt, TransactionBuilderError> {
    let logger = TxLogger::new("create_and_distribute");
    let minimum = ctx.builder.rent_exempt_minimum(0).await?;

    let mut plan = InstructionPlan::new();
    plan.create_account_rent_exempt(
        &payer.pubkey(),
        &new_account.pubkey(),
        0,
        &system_program::id(),
        minimum,
    )
    .transfer(&payer.pubkey(), &new_account.pubkey(), to_new)
    .transfer(&payer.pubkey(), existing, to_existing);

    let signed = ctx
        .builder
        .build_and_sign(payer, &mut plan, &[new_account], &logger)
        .await?;
    let addresses = BTreeMap::from([
        ("newAccount", new_account.pubkey()),
        ("existingAccount", *existing),
    ]);
    ctx.finish("create_and_distribute", signed, &plan, addresses, &logger)
        .await
}

/// Create a fungible token mint with metadata
///
/// With an initial supply, the payer's associated account is created and
/// funded in the same transaction. The mint is saved to `book` under
/// [`TOKEN_MINT`] once the transaction was submitted.
pub async fn create_token(
    ctx: &FlowContext,
    payer: &Keypair,
    mint: &Keypair,
    params: &TokenParams,
    book: &mut AddressBook,
) -> Result<Receipt, TransactionBuilderError> {
    let logger = TxLogger::new("create_token");
    let payer_key = payer.pubkey();
    let mint_key = mint.pubkey();
    let minimum = ctx.builder.rent_exempt_minimum(token::MINT_SIZE).await?;

    let mut plan = InstructionPlan::new();
    token::create_mint(
        &mut plan,
        &payer_key,
        &mint_key,
        &payer_key,
        Some(&payer_key),
        params.decimals,
        minimum,
    )?;

    let data = metadata::DataV2::simple(&params.name, &params.symbol, &params.uri);
    plan.push(metadata::create_metadata_account_v3(
        &mint_key, &payer_key, &payer_key, &payer_key, &data, true,
    )?);

    let mut addresses = BTreeMap::from([
        ("mint", mint_key),
        ("metadata", derive::metadata_address(&mint_key).address),
    ]);

    if let Some(supply) = params.initial_supply {
        let amount = token::to_base_units(supply, params.decimals)?;
        let ata = token::mint_to_owner(
            &mut plan,
            &payer_key,
            &payer_key,
            &mint_key,
            &payer_key,
            amount,
            params.decimals,
            false,
        )?;
        addresses.insert("tokenAccount", ata);
    }

    let signed = ctx
        .builder
        .build_and_sign(payer, &mut plan, &[mint], &logger)
        .await?;
    let receipt = ctx.finish("create_token", signed, &plan, addresses, &logger).await?;

    if receipt.submitted() {
        book.save(TOKEN_MINT, &mint_key)?;
        info!(mint = %mint_key, path = %book.path().display(), "Saved token mint");
    }
    Ok(receipt)
}

/// Mint `amount` whole tokens of `mint` to the payer
///
/// The payer's associated token account is created idempotently in the same
/// transaction. `mint` defaults to the address book's [`TOKEN_MINT`].
/// Decimals are read from the mint account; `expected_decimals`, when given,
/// must match them.
pub async fn mint_tokens(
    ctx: &FlowContext,
    payer: &Keypair,
    mint: Option<Pubkey>,
    amount: u64,
    expected_decimals: Option<u8>,
    book: &AddressBook,
) -> Result<Receipt, TransactionBuilderError> {
    let logger = TxLogger::new("mint_tokens");
    let payer_key = payer.pubkey();

    let mint_key = match mint {
        Some(mint) => mint,
        None => book.get(TOKEN_MINT)?.ok_or_else(|| {
            TransactionBuilderError::Configuration(format!(
                "no '{}' in address book {}; run create-token first or pass --mint",
                TOKEN_MINT,
                book.path().display()
            ))
        })?,
    };

    let account = ctx.builder.ledger().get_account(&mint_key).await?.ok_or_else(|| {
        TransactionBuilderError::Configuration(format!("mint {} does not exist", mint_key))
    })?;
    let decimals = token::unpack_mint(&mint_key, &account)?.decimals;
    if let Some(expected) = expected_decimals {
        if expected != decimals {
            return Err(TransactionBuilderError::Configuration(format!(
                "mint {} has {} decimals, expected {}",
                mint_key, decimals, expected
            )));
        }
    }

    let base_units = token::to_base_units(amount, decimals)?;
    let mut plan = InstructionPlan::new();
    let ata = token::mint_to_owner(
        &mut plan, &payer_key, &payer_key, &mint_key, &payer_key, base_units, decimals, true,
    )?;

    let signed = ctx.builder.build_and_sign(payer, &mut plan, &[], &logger).await?;
    let addresses = BTreeMap::from([("mint", mint_key), ("tokenAccount", ata)]);
    ctx.finish("mint_tokens", signed, &plan, addresses, &logger).await
}

/// Mint a one-of-one NFT with royalties
///
/// One transaction: mint (0 decimals), payer's associated account, mint 1,
/// metadata with the payer as sole verified creator, master edition with
/// max supply 0.
pub async fn create_nft(
    ctx: &FlowContext,
    payer: &Keypair,
    mint: &Keypair,
    params: &NftParams,
    store: &dyn MetadataStore,
) -> Result<Receipt, TransactionBuilderError> {
    let logger = TxLogger::new("create_nft");
    let payer_key = payer.pubkey();
    let mint_key = mint.pubkey();

    let uri = store.upload(&params.metadata).await?;
    let minimum = ctx.builder.rent_exempt_minimum(token::MINT_SIZE).await?;

    let mut plan = InstructionPlan::new();
    token::create_mint(&mut plan, &payer_key, &mint_key, &payer_key, Some(&payer_key), 0, minimum)?;
    let ata =
        token::mint_to_owner(&mut plan, &payer_key, &payer_key, &mint_key, &payer_key, 1, 0, false)?;

    let data = metadata::DataV2 {
        name: params.metadata.name.clone(),
        symbol: params.metadata.symbol.clone(),
        uri,
        seller_fee_basis_points: params.seller_fee_basis_points,
        creators: Some(vec![metadata::Creator::new(&payer_key, true, 100)]),
        collection: None,
        uses: None,
    };
    plan.push(metadata::create_metadata_account_v3(
        &mint_key,
        &payer_key,
        &payer_key,
        &payer_key,
        &data,
        params.is_mutable,
    )?)
    .push(metadata::create_master_edition_v3(
        &mint_key,
        &payer_key,
        &payer_key,
        &payer_key,
        Some(0),
    )?);

    let signed = ctx
        .builder
        .build_and_sign(payer, &mut plan, &[mint], &logger)
        .await?;
    let addresses = BTreeMap::from([
        ("mint", mint_key),
        ("tokenAccount", ata),
        ("metadata", derive::metadata_address(&mint_key).address),
        ("masterEdition", derive::master_edition_address(&mint_key).address),
    ]);
    ctx.finish("create_nft", signed, &plan, addresses, &logger).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Cluster;
    use crate::rpc_manager::LocalLedger;
    use crate::tx_builder::SubmitOptions;
    use std::sync::Arc;

    fn context(ledger: Arc<LocalLedger>, dry_run: bool) -> FlowContext {
        FlowContext::new(
            TxBuilder::new(ledger, SubmitOptions::default()),
            Explorer::new("https://explorer.solana.com", Cluster::Devnet),
            dry_run,
        )
    }

    #[tokio::test]
    async fn test_create_and_fund_balances() {
        let ledger = Arc::new(LocalLedger::new());
        let payer = Keypair::new();
        let new_account = Keypair::new();
        let start = 1_000_000_000;
        ledger.fund(&payer.pubkey(), start);
        let ctx = context(ledger.clone(), false);

        let receipt = create_and_fund(&ctx, &payer, &new_account, 5_000).await.unwrap();

        let rent = ledger.rent().minimum_balance(0);
        assert_eq!(ledger.balance(&new_account.pubkey()), rent + 5_000);
        assert_eq!(
            ledger.balance(&payer.pubkey()),
            start - rent - 5_000 - ledger.fee_for(2)
        );
        assert!(receipt.submitted());
        assert!(receipt.underfunded.is_empty());
        assert!(receipt.explorer_url.unwrap().ends_with("?cluster=devnet"));
        assert_eq!(receipt.addresses["newAccount"], new_account.pubkey());
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let ledger = Arc::new(LocalLedger::new());
        let payer = Keypair::new();
        ledger.fund(&payer.pubkey(), 1_000_000);
        let ctx = context(ledger.clone(), true);

        let to = Pubkey::new_unique();
        let receipt = transfer(&ctx, &payer, &to, 5_000).await.unwrap();

        assert!(!receipt.submitted());
        assert!(receipt.encoded.is_some());
        assert_eq!(receipt.explorer_url, None);
        assert!(receipt.simulation.unwrap().is_success());
        assert_eq!(ledger.balance(&to), 0);
        assert_eq!(ledger.balance(&payer.pubkey()), 1_000_000);
        assert_eq!(ledger.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_check_balance() {
        let ledger = Arc::new(LocalLedger::new());
        let address = Pubkey::new_unique();
        ledger.fund(&address, 1_500_000_000);
        let ctx = context(ledger, false);

        let report = check_balance(&ctx, &address).await.unwrap();
        assert_eq!(report.lamports, 1_500_000_000);
        assert_eq!(report.sol, 1.5);
    }

    #[tokio::test]
    async fn test_mint_tokens_requires_known_mint() {
        let ledger = Arc::new(LocalLedger::new());
        let ctx = context(ledger, false);
        let dir = tempfile::tempdir().unwrap();
        let book = AddressBook::load(dir.path().join("book.json")).unwrap();

        let err = mint_tokens(&ctx, &Keypair::new(), None, 100, None, &book)
            .await
            .unwrap_err();
        assert!(matches!(err, TransactionBuilderError::Configuration(_)));
    }

    mod composition {
        use super::*;
        use crate::metadata_store::PinnedUriStore;
        use crate::programs::metadata::{Creator, DataV2};
        use crate::test_utils::{
            fast_options, funded_ledger, MockLedger, SubmitBehavior, DEFAULT_FUNDING,
        };
        use crate::tx_builder::parse_create_account;
        use crate::types::SubmitMode;
        use solana_sdk::{
            account::Account,
            instruction::{AccountMeta, Instruction},
            transaction::VersionedTransaction,
        };
        use spl_token::instruction::TokenInstruction;
        use spl_token::solana_program::program_pack::Pack;

        /// Flows over a ledger that records what was sent and never executes it
        fn capturing_context() -> (Arc<MockLedger>, FlowContext, Keypair) {
            let (ledger, payer) = funded_ledger(DEFAULT_FUNDING);
            let mock = Arc::new(MockLedger::with_behavior(ledger, SubmitBehavior::Drop));
            let ctx = FlowContext::new(
                TxBuilder::new(
                    mock.clone(),
                    fast_options().with_mode(SubmitMode::FireAndForget),
                ),
                Explorer::new("https://explorer.solana.com", Cluster::Devnet),
                false,
            );
            (mock, ctx, payer)
        }

        fn decompile(tx: &VersionedTransaction) -> Vec<Instruction> {
            let keys = tx.message.static_account_keys();
            tx.message
                .instructions()
                .iter()
                .map(|ix| Instruction {
                    program_id: keys[ix.program_id_index as usize],
                    accounts: ix
                        .accounts
                        .iter()
                        .map(|&i| AccountMeta::new_readonly(keys[i as usize], false))
                        .collect(),
                    data: ix.data.clone(),
                })
                .collect()
        }

        fn program_ids(ixs: &[Instruction]) -> Vec<Pubkey> {
            ixs.iter().map(|ix| ix.program_id).collect()
        }

        fn mint_account(decimals: u8) -> Account {
            let mint = spl_token::state::Mint {
                mint_authority: Some(Pubkey::new_unique()).into(),
                supply: 0,
                decimals,
                is_initialized: true,
                freeze_authority: None.into(),
            };
            let mut data = vec![0; token::MINT_SIZE];
            spl_token::state::Mint::pack(mint, &mut data).unwrap();
            Account {
                lamports: 1_461_600,
                data,
                owner: spl_token::id(),
                executable: false,
                rent_epoch: 0,
            }
        }

        #[tokio::test]
        async fn test_create_token_composes_in_dependency_order() {
            let (mock, ctx, payer) = capturing_context();
            let mint = Keypair::new();
            let dir = tempfile::tempdir().unwrap();
            let mut book = AddressBook::load(dir.path().join("book.json")).unwrap();
            let params = TokenParams {
                name: "Solana Bootcamp: FPTU".to_string(),
                symbol: "SB".to_string(),
                uri: "https://example.com/sb.json".to_string(),
                decimals: 6,
                initial_supply: Some(100),
            };

            let receipt = create_token(&ctx, &payer, &mint, &params, &mut book).await.unwrap();

            let ixs = decompile(&mock.last_sent().unwrap());
            assert_eq!(
                program_ids(&ixs),
                [
                    system_program::id(),
                    spl_token::id(),
                    metadata::id(),
                    spl_associated_token_account::id(),
                    spl_token::id(),
                ]
            );

            let creation = parse_create_account(&ixs[0]).unwrap();
            assert_eq!(creation.address, mint.pubkey());
            assert_eq!(creation.space, 82);
            assert_eq!(creation.owner, spl_token::id());
            assert_eq!(creation.lamports, mock.inner().rent().minimum_balance(82));

            let initialize = spl_token::instruction::initialize_mint2(
                &spl_token::id(),
                &mint.pubkey(),
                &payer.pubkey(),
                Some(&payer.pubkey()),
                6,
            )
            .unwrap();
            assert_eq!(ixs[1].data, initialize.data);

            let expected_metadata = metadata::create_metadata_account_v3(
                &mint.pubkey(),
                &payer.pubkey(),
                &payer.pubkey(),
                &payer.pubkey(),
                &DataV2::simple(&params.name, &params.symbol, &params.uri),
                true,
            )
            .unwrap();
            assert_eq!(ixs[2].data, expected_metadata.data);
            assert_eq!(ixs[2].accounts[0].pubkey, receipt.addresses["metadata"]);

            // Plain create: the account must not exist yet
            assert_eq!(ixs[3].data, vec![0]);
            assert_eq!(
                TokenInstruction::unpack(&ixs[4].data).unwrap(),
                TokenInstruction::MintToChecked {
                    amount: 100_000_000,
                    decimals: 6
                }
            );
            assert_eq!(ixs[4].accounts[1].pubkey, receipt.addresses["tokenAccount"]);

            assert_eq!(book.get(TOKEN_MINT).unwrap(), Some(mint.pubkey()));
        }

        #[tokio::test]
        async fn test_mint_tokens_uses_decimals_of_the_mint() {
            let (mock, ctx, payer) = capturing_context();
            let dir = tempfile::tempdir().unwrap();
            let mut book = AddressBook::load(dir.path().join("book.json")).unwrap();
            let mint = Pubkey::new_unique();
            mock.inner().set_account(&mint, mint_account(9));
            book.save(TOKEN_MINT, &mint).unwrap();

            let receipt = mint_tokens(&ctx, &payer, None, 100, None, &book).await.unwrap();

            let ixs = decompile(&mock.last_sent().unwrap());
            assert_eq!(
                program_ids(&ixs),
                [spl_associated_token_account::id(), spl_token::id()]
            );
            assert_eq!(ixs[0].data, vec![1]);
            assert_eq!(
                TokenInstruction::unpack(&ixs[1].data).unwrap(),
                TokenInstruction::MintToChecked {
                    amount: 100_000_000_000,
                    decimals: 9
                }
            );
            assert_eq!(ixs[1].accounts[0].pubkey, mint);
            assert_eq!(receipt.addresses["mint"], mint);

            let sent = mock.send_count();
            let err = mint_tokens(&ctx, &payer, None, 100, Some(6), &book)
                .await
                .unwrap_err();
            assert!(matches!(err, TransactionBuilderError::Configuration(_)));
            assert_eq!(mock.send_count(), sent);
        }

        #[tokio::test]
        async fn test_create_nft_composes_in_dependency_order() {
            let (mock, ctx, payer) = capturing_context();
            let mint = Keypair::new();
            let store = PinnedUriStore::new("https://example.com/nft.json");
            let params = NftParams {
                metadata: OffChainMetadata {
                    name: "Bootcamp NFT".to_string(),
                    symbol: "SBN".to_string(),
                    ..Default::default()
                },
                seller_fee_basis_points: 1_000,
                is_mutable: true,
            };

            let receipt = create_nft(&ctx, &payer, &mint, &params, &store).await.unwrap();

            let ixs = decompile(&mock.last_sent().unwrap());
            assert_eq!(
                program_ids(&ixs),
                [
                    system_program::id(),
                    spl_token::id(),
                    spl_associated_token_account::id(),
                    spl_token::id(),
                    metadata::id(),
                    metadata::id(),
                ]
            );
            assert_eq!(parse_create_account(&ixs[0]).unwrap().space, 82);
            assert_eq!(
                TokenInstruction::unpack(&ixs[3].data).unwrap(),
                TokenInstruction::MintToChecked {
                    amount: 1,
                    decimals: 0
                }
            );

            let data = DataV2 {
                name: "Bootcamp NFT".to_string(),
                symbol: "SBN".to_string(),
                uri: "https://example.com/nft.json".to_string(),
                seller_fee_basis_points: 1_000,
                creators: Some(vec![Creator::new(&payer.pubkey(), true, 100)]),
                collection: None,
                uses: None,
            };
            let expected_metadata = metadata::create_metadata_account_v3(
                &mint.pubkey(),
                &payer.pubkey(),
                &payer.pubkey(),
                &payer.pubkey(),
                &data,
                true,
            )
            .unwrap();
            assert_eq!(ixs[4].data, expected_metadata.data);

            let expected_edition = metadata::create_master_edition_v3(
                &mint.pubkey(),
                &payer.pubkey(),
                &payer.pubkey(),
                &payer.pubkey(),
                Some(0),
            )
            .unwrap();
            assert_eq!(ixs[5].data, expected_edition.data);
            assert_eq!(ixs[5].accounts[0].pubkey, receipt.addresses["masterEdition"]);
        }
    }
}
