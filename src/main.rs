//! txkit command line
//!
//! One subcommand per flow. Configuration comes from `txkit.toml` (or
//! `--config`), then `.env` and environment variables, then the flags below.

#![deny(unused_imports)]
#![deny(unused_mut)]
#![deny(unused_variables)]
#![warn(unused_must_use)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use txkit::address_book::AddressBook;
use txkit::config::{Config, LoggingConfig};
use txkit::explorer::Explorer;
use txkit::flows::{self, FlowContext, NftParams, Receipt, TokenParams};
use txkit::keystore::KeyStore;
use txkit::metadata_store::{Attribute, OffChainMetadata, PinnedUriStore};
use txkit::metrics::metrics;
use txkit::rpc_manager::RpcLedgerClient;
use txkit::tx_builder::{SubmitOptions, TxBuilder};
use txkit::types::SubmitMode;

/// Existing account the transfer flows pay by default
const DEFAULT_RECIPIENT: &str = "63EEC9FfGyksm7PkVC6z8uAmqozbQcTzbkWJNsgqjkFs";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to ./txkit.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Return after sending instead of waiting for confirmation
    #[arg(long, global = true)]
    no_confirm: bool,

    /// Simulate instead of submitting
    #[arg(long, global = true)]
    dry_run: bool,

    /// Cluster moniker, overrides the configuration
    #[arg(long, global = true)]
    cluster: Option<String>,

    /// RPC endpoint, overrides the cluster
    #[arg(long, global = true)]
    rpc_url: Option<String>,

    /// Payer keypair file
    #[arg(short, long, global = true)]
    keypair: Option<String>,

    /// Print Prometheus metrics before exiting
    #[arg(long, global = true)]
    print_metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the balance of an address (the payer by default)
    Balance {
        address: Option<Pubkey>,
    },

    /// Create a rent-exempt system account
    CreateAccount {
        #[arg(long, default_value_t = 0)]
        space: u64,

        /// Write the new account's keypair here
        #[arg(long)]
        save_keypair: Option<PathBuf>,
    },

    /// Transfer lamports from the payer
    Transfer {
        #[arg(long, default_value = DEFAULT_RECIPIENT)]
        to: Pubkey,

        #[arg(long, default_value_t = 5_000)]
        lamports: u64,
    },

    /// Create an account and fund it in one transaction
    CreateAndFund {
        #[arg(long, default_value_t = 5_000)]
        lamports: u64,

        #[arg(long)]
        save_keypair: Option<PathBuf>,
    },

    /// Create an account, fund it and pay an existing account in one transaction
    CreateAndDistribute {
        #[arg(long, default_value_t = 5_000)]
        to_new: u64,

        #[arg(long, default_value = DEFAULT_RECIPIENT)]
        existing: Pubkey,

        #[arg(long, default_value_t = 7_000)]
        to_existing: u64,

        #[arg(long)]
        save_keypair: Option<PathBuf>,
    },

    /// Create a token mint with metadata
    CreateToken {
        #[arg(long, default_value = "Solana Bootcamp: FPTU")]
        name: String,

        #[arg(long, default_value = "SB")]
        symbol: String,

        /// Metadata URI (defaults to metadata.uri from the configuration)
        #[arg(long)]
        uri: Option<String>,

        #[arg(long, default_value_t = 6)]
        decimals: u8,

        /// Whole tokens minted to the payer in the same transaction
        #[arg(long)]
        initial_supply: Option<u64>,
    },

    /// Mint tokens to the payer's associated account
    MintTokens {
        /// Mint address (defaults to the address book's tokenMint)
        #[arg(long)]
        mint: Option<Pubkey>,

        #[arg(long, default_value_t = 100)]
        amount: u64,

        /// Expected decimals; the mint's own value is used either way
        #[arg(long)]
        decimals: Option<u8>,
    },

    /// Mint a one-of-one NFT
    CreateNft {
        #[arg(long)]
        name: String,

        #[arg(long)]
        symbol: String,

        #[arg(long)]
        uri: Option<String>,

        #[arg(long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        image: String,

        /// Trait as `type=value`, repeatable
        #[arg(long = "attribute", value_parser = parse_attribute)]
        attributes: Vec<Attribute>,

        /// Royalty in basis points
        #[arg(long, default_value_t = 1_000)]
        royalty_bps: u16,

        #[arg(long)]
        immutable: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    apply_overrides(&mut config, &args);
    config.validate().context("Invalid configuration")?;

    init_logging(args.verbose, &config.logging)?;
    info!("🚀 txkit {}", env!("CARGO_PKG_VERSION"));

    let endpoint = config.rpc.resolved_endpoint()?;
    info!("🌐 Ledger endpoint: {}", endpoint);
    let ledger = Arc::new(
        RpcLedgerClient::from_config(&config.rpc).context("Failed to create RPC client")?,
    );

    let mut options = SubmitOptions::from_config(&config)?;
    if args.no_confirm {
        options = options.with_mode(SubmitMode::FireAndForget);
    }
    let ctx = FlowContext::new(
        TxBuilder::new(ledger, options),
        Explorer::new(&config.explorer.base_url, config.rpc.cluster()?),
        args.dry_run,
    );
    if ctx.dry_run {
        info!("🧪 Dry run: transactions are simulated, not submitted");
    }

    run(&args.command, &config, &ctx).await?;

    if args.print_metrics {
        println!("{}", metrics().render()?);
    }
    Ok(())
}

async fn run(command: &Command, config: &Config, ctx: &FlowContext) -> Result<()> {
    let payer = || -> Result<KeyStore> {
        let payer = load_payer(config)?;
        info!("💼 Payer: {}", payer.pubkey());
        Ok(payer)
    };

    let receipt = match command {
        Command::Balance { address } => {
            let address = match address {
                Some(address) => *address,
                None => load_payer(config)?.pubkey(),
            };
            let report = flows::check_balance(ctx, &address).await?;
            info!(
                "💰 {} holds {} lamports ({} SOL)",
                report.address, report.lamports, report.sol
            );
            info!("🔗 {}", ctx.explorer.address_url(&report.address));
            return Ok(());
        }
        Command::CreateAccount { space, save_keypair } => {
            let payer = payer()?;
            let new_account = new_keystore(save_keypair.as_deref(), ctx.dry_run)?;
            flows::create_account(ctx, payer.keypair(), new_account.keypair(), *space).await?
        }
        Command::Transfer { to, lamports } => {
            let payer = payer()?;
            flows::transfer(ctx, payer.keypair(), to, *lamports).await?
        }
        Command::CreateAndFund {
            lamports,
            save_keypair,
        } => {
            let payer = payer()?;
            let new_account = new_keystore(save_keypair.as_deref(), ctx.dry_run)?;
            flows::create_and_fund(ctx, payer.keypair(), new_account.keypair(), *lamports).await?
        }
        Command::CreateAndDistribute {
            to_new,
            existing,
            to_existing,
            save_keypair,
        } => {
            let payer = payer()?;
            let new_account = new_keystore(save_keypair.as_deref(), ctx.dry_run)?;
            flows::create_and_distribute(
                ctx,
                payer.keypair(),
                new_account.keypair(),
                *to_new,
                existing,
                *to_existing,
            )
            .await?
        }
        Command::CreateToken {
            name,
            symbol,
            uri,
            decimals,
            initial_supply,
        } => {
            let payer = payer()?;
            let params = TokenParams {
                name: name.clone(),
                symbol: symbol.clone(),
                uri: metadata_uri(uri.as_deref(), config)?,
                decimals: *decimals,
                initial_supply: *initial_supply,
            };
            let mut book = AddressBook::load(&config.address_book.path)?;
            let mint = KeyStore::generate();
            flows::create_token(ctx, payer.keypair(), mint.keypair(), &params, &mut book).await?
        }
        Command::MintTokens {
            mint,
            amount,
            decimals,
        } => {
            let payer = payer()?;
            let book = AddressBook::load(&config.address_book.path)?;
            flows::mint_tokens(ctx, payer.keypair(), *mint, *amount, *decimals, &book).await?
        }
        Command::CreateNft {
            name,
            symbol,
            uri,
            description,
            image,
            attributes,
            royalty_bps,
            immutable,
        } => {
            let payer = payer()?;
            let store = PinnedUriStore::new(metadata_uri(uri.as_deref(), config)?);
            let params = NftParams {
                metadata: OffChainMetadata {
                    name: name.clone(),
                    symbol: symbol.clone(),
                    description: description.clone(),
                    image: image.clone(),
                    attributes: attributes.clone(),
                },
                seller_fee_basis_points: *royalty_bps,
                is_mutable: !immutable,
            };
            let mint = KeyStore::generate();
            flows::create_nft(ctx, payer.keypair(), mint.keypair(), &params, &store).await?
        }
    };

    report(&receipt);
    Ok(())
}

fn report(receipt: &Receipt) {
    for (name, address) in &receipt.addresses {
        info!("📍 {}: {}", name, address);
    }
    for address in &receipt.underfunded {
        warn!("⚠️ {} is funded below its rent-exempt minimum", address);
    }

    match &receipt.simulation {
        Some(outcome) => {
            info!(
                "🧪 {} simulated successfully ({} compute units)",
                receipt.flow,
                outcome.units_consumed.unwrap_or_default()
            );
            for line in &outcome.logs {
                info!("   {}", line);
            }
            if let Some(encoded) = &receipt.encoded {
                info!("📦 Transaction (base64): {}", encoded);
            }
        }
        None => {
            info!("✅ {} submitted: {}", receipt.flow, receipt.signature);
            if let Some(url) = &receipt.explorer_url {
                info!("🔗 {}", url);
            }
        }
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(cluster) = &args.cluster {
        config.rpc.cluster = cluster.clone();
        config.rpc.endpoint = None;
    }
    if let Some(url) = &args.rpc_url {
        config.rpc.endpoint = Some(url.clone());
    }
    if let Some(path) = &args.keypair {
        config.wallet.keypair_path = path.clone();
    }
    if args.no_confirm {
        config.submission.confirm = false;
    }
}

fn load_payer(config: &Config) -> Result<KeyStore> {
    let path = config.wallet.expanded_keypair_path();
    KeyStore::load_from_file(&path)
        .with_context(|| format!("Failed to load payer keypair from {}", path.display()))
}

/// Fresh keypair for a new account, optionally written to disk
fn new_keystore(save_to: Option<&std::path::Path>, dry_run: bool) -> Result<KeyStore> {
    let keystore = KeyStore::generate();
    match save_to {
        Some(path) if !dry_run => {
            keystore
                .write_to_file(path)
                .with_context(|| format!("Failed to save keypair to {}", path.display()))?;
            info!("🔑 New account keypair saved to {}", path.display());
        }
        _ => {}
    }
    Ok(keystore)
}

fn metadata_uri(flag: Option<&str>, config: &Config) -> Result<String> {
    flag.map(str::to_string)
        .or_else(|| config.metadata.uri.clone())
        .context("No metadata URI: pass --uri or set metadata.uri in the configuration")
}

fn parse_attribute(value: &str) -> Result<Attribute, String> {
    let (trait_type, value) = value
        .split_once('=')
        .ok_or_else(|| format!("expected type=value, got '{}'", value))?;
    Ok(Attribute {
        trait_type: trait_type.trim().to_string(),
        value: value.trim().to_string(),
    })
}

/// Initialize logging subsystem
fn init_logging(verbose: bool, logging: &LoggingConfig) -> Result<()> {
    let default_filter = if verbose {
        "txkit=debug,info".to_string()
    } else {
        logging.level.clone()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&default_filter))
        .context("Invalid log filter")?;

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    Ok(())
}
