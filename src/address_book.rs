//! Named addresses persisted between runs
//!
//! Flows that create something later flows need (a token mint, for example)
//! save its address here under a well-known name.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Entry name of the mint created by `create-token`
pub const TOKEN_MINT: &str = "tokenMint";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    /// Base58 address
    pub address: String,
    pub saved_at: DateTime<Utc>,
}

/// JSON file mapping names to addresses
#[derive(Debug, Clone)]
pub struct AddressBook {
    path: PathBuf,
    entries: BTreeMap<String, AddressEntry>,
}

impl AddressBook {
    /// Open the book at `path`; a missing file is an empty book
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read address book {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse address book {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, entries })
    }

    /// Address saved under `name`
    pub fn get(&self, name: &str) -> Result<Option<Pubkey>> {
        self.entries
            .get(name)
            .map(|entry| {
                Pubkey::from_str(&entry.address)
                    .with_context(|| format!("Address book entry '{}' is not a valid address", name))
            })
            .transpose()
    }

    pub fn entry(&self, name: &str) -> Option<&AddressEntry> {
        self.entries.get(name)
    }

    /// Record `address` under `name` and write the book to disk
    pub fn save(&mut self, name: &str, address: &Pubkey) -> Result<()> {
        self.entries.insert(
            name.to_string(),
            AddressEntry {
                address: address.to_string(),
                saved_at: Utc::now(),
            },
        );

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write address book {}", self.path.display()))?;

        debug!(name, address = %address, path = %self.path.display(), "Saved address");
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
