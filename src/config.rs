//! Configuration module for txkit
//!
//! This module handles all configuration loading from TOML files,
//! `.env` files and environment variables, and provides structured
//! configuration types. A `Config` value is always passed explicitly to the
//! flows that need it.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::types::Commitment;

/// Overrides the RPC endpoint
pub const ENV_RPC_URL: &str = "TXKIT_RPC_URL";

/// Overrides the cluster moniker
pub const ENV_CLUSTER: &str = "TXKIT_CLUSTER";

/// Absolute path of the payer keypair file
pub const ENV_PAYER_PATH: &str = "LOCAL_PAYER_JSON_ABSPATH";

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ledger connection
    #[serde(default)]
    pub rpc: RpcConfig,

    /// Payer keypair location
    #[serde(default)]
    pub wallet: WalletConfig,

    /// How transactions are submitted and observed
    #[serde(default)]
    pub submission: SubmissionConfig,

    #[serde(default)]
    pub explorer: ExplorerConfig,

    #[serde(default)]
    pub address_book: AddressBookConfig,

    /// Off-chain metadata for token and NFT flows
    #[serde(default)]
    pub metadata: MetadataConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Cluster moniker (`devnet`, `testnet`, `mainnet-beta`, `localnet`)
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// Explicit endpoint; takes precedence over `cluster`
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Commitment used for queries and as the confirmation target
    #[serde(default = "default_commitment")]
    pub commitment: String,

    /// Request timeout in seconds
    #[serde(default = "default_rpc_timeout")]
    pub timeout_secs: u64,

    /// Skip the node's preflight simulation
    #[serde(default)]
    pub skip_preflight: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletConfig {
    /// Path to the payer keypair file
    #[serde(default = "default_keypair_path")]
    pub keypair_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionConfig {
    /// Wait for the target commitment after sending
    #[serde(default = "default_true")]
    pub confirm: bool,

    /// Give up waiting for confirmation after this many seconds
    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout_secs: u64,

    /// Signature status poll interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressBookConfig {
    /// JSON file holding named addresses produced by earlier runs
    #[serde(default = "default_address_book_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Pre-uploaded metadata URI handed out by the pinned store
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,

    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_cluster() -> String { "devnet".to_string() }
fn default_commitment() -> String { "confirmed".to_string() }
fn default_rpc_timeout() -> u64 { 30 }
fn default_keypair_path() -> String { "~/.config/solana/id.json".to_string() }
fn default_true() -> bool { true }
fn default_confirm_timeout() -> u64 { 60 }
fn default_poll_interval() -> u64 { 500 }
fn default_explorer_url() -> String { "https://explorer.solana.com".to_string() }
fn default_address_book_path() -> PathBuf { PathBuf::from("txkit-addresses.json") }
fn default_log_level() -> String { "info".to_string() }

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            cluster: default_cluster(),
            endpoint: None,
            commitment: default_commitment(),
            timeout_secs: default_rpc_timeout(),
            skip_preflight: false,
        }
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            keypair_path: default_keypair_path(),
        }
    }
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            confirm: default_true(),
            confirm_timeout_secs: default_confirm_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
        }
    }
}

impl Default for AddressBookConfig {
    fn default() -> Self {
        Self {
            path: default_address_book_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            json: false,
            level: default_log_level(),
        }
    }
}

/// Known clusters and their public endpoints
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cluster {
    Devnet,
    Testnet,
    MainnetBeta,
    Localnet,
    /// Anything reached through an explicit endpoint
    Custom(String),
}

impl Cluster {
    pub fn parse(moniker: &str) -> Option<Self> {
        match moniker.to_ascii_lowercase().as_str() {
            "devnet" | "d" => Some(Self::Devnet),
            "testnet" | "t" => Some(Self::Testnet),
            "mainnet-beta" | "mainnet" | "m" => Some(Self::MainnetBeta),
            "localnet" | "localhost" | "l" => Some(Self::Localnet),
            _ => None,
        }
    }

    pub fn rpc_url(&self) -> &str {
        match self {
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Localnet => "http://127.0.0.1:8899",
            Self::Custom(url) => url,
        }
    }

    /// Name used in explorer `cluster=` query parameters
    pub fn moniker(&self) -> &str {
        match self {
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::MainnetBeta => "mainnet-beta",
            Self::Localnet | Self::Custom(_) => "custom",
        }
    }
}

impl RpcConfig {
    /// The cluster this configuration points at
    ///
    /// An explicit endpoint matching a public cluster URL maps back to that
    /// cluster; any other endpoint is `Custom`.
    pub fn cluster(&self) -> anyhow::Result<Cluster> {
        if let Some(endpoint) = &self.endpoint {
            let known = [Cluster::Devnet, Cluster::Testnet, Cluster::MainnetBeta, Cluster::Localnet];
            let endpoint = endpoint.trim_end_matches('/');
            return Ok(known
                .into_iter()
                .find(|c| c.rpc_url() == endpoint)
                .unwrap_or_else(|| Cluster::Custom(endpoint.to_string())));
        }

        match Cluster::parse(&self.cluster) {
            Some(cluster) => Ok(cluster),
            None => bail!("unknown cluster '{}'", self.cluster),
        }
    }

    /// Endpoint to connect to
    pub fn resolved_endpoint(&self) -> anyhow::Result<String> {
        Ok(self.cluster()?.rpc_url().to_string())
    }

    pub fn commitment(&self) -> anyhow::Result<Commitment> {
        Commitment::parse(&self.commitment)
            .with_context(|| format!("unknown commitment '{}'", self.commitment))
    }
}

impl WalletConfig {
    /// Keypair path with a leading `~` expanded to `$HOME`
    pub fn expanded_keypair_path(&self) -> PathBuf {
        match self.keypair_path.strip_prefix("~/") {
            Some(rest) => match std::env::var_os("HOME") {
                Some(home) => Path::new(&home).join(rest),
                None => PathBuf::from(&self.keypair_path),
            },
            None => PathBuf::from(&self.keypair_path),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration with `.env` and environment variable overrides
    ///
    /// A missing file is not an error when no path was given explicitly;
    /// defaults are used instead.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = Path::new("txkit.toml");
                if fallback.exists() {
                    Self::from_file(fallback)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(cluster) = lookup(ENV_CLUSTER).filter(|v| !v.is_empty()) {
            self.rpc.cluster = cluster;
            self.rpc.endpoint = None;
        }
        if let Some(url) = lookup(ENV_RPC_URL).filter(|v| !v.is_empty()) {
            self.rpc.endpoint = Some(url);
        }
        if let Some(path) = lookup(ENV_PAYER_PATH).filter(|v| !v.is_empty()) {
            self.wallet.keypair_path = path;
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.rpc.cluster()?;
        self.rpc.commitment()?;

        if self.rpc.timeout_secs == 0 {
            bail!("rpc.timeout_secs must be positive");
        }
        if self.submission.poll_interval_ms == 0 {
            bail!("submission.poll_interval_ms must be positive");
        }
        if self.submission.confirm_timeout_secs == 0 {
            bail!("submission.confirm_timeout_secs must be positive");
        }
        if self.wallet.keypair_path.is_empty() {
            bail!("wallet.keypair_path must not be empty");
        }
        Ok(())
    }
}
