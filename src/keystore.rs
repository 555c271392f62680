//! Keypair loading and generation

use anyhow::{bail, Context, Result};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signer},
};
use std::path::Path;
use std::sync::Arc;

/// Holds one keypair loaded from disk or generated in memory
pub struct KeyStore {
    keypair: Arc<Keypair>,
}

impl KeyStore {
    /// Load a keypair file
    ///
    /// Accepts the Solana CLI JSON byte array, a base58-encoded secret key,
    /// or 64 raw bytes. All-zero keys are rejected.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let keypair_bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read keypair file: {}", path.display()))?;

        let keypair = parse_keypair(&keypair_bytes)
            .with_context(|| format!("Invalid keypair file: {}", path.display()))?;

        Ok(Self::from_keypair(keypair))
    }

    /// Generate a fresh random keypair
    pub fn generate() -> Self {
        Self::from_keypair(Keypair::new())
    }

    pub fn from_keypair(keypair: Keypair) -> Self {
        Self {
            keypair: Arc::new(keypair),
        }
    }

    /// Write the keypair as a JSON byte array, the format the Solana CLI reads
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string(&self.keypair.to_bytes().to_vec())?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write keypair file: {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Get the public key
    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    /// Get a reference to the keypair
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    pub fn keypair_arc(&self) -> Arc<Keypair> {
        Arc::clone(&self.keypair)
    }
}

impl Clone for KeyStore {
    fn clone(&self) -> Self {
        Self {
            keypair: Arc::clone(&self.keypair),
        }
    }
}

fn parse_keypair(raw: &[u8]) -> Result<Keypair> {
    let bytes: Vec<u8> = if raw.len() == 64 {
        // Raw bytes format
        raw.to_vec()
    } else {
        let text = std::str::from_utf8(raw)
            .context("Keypair file is neither raw bytes nor text")?
            .trim();

        if text.starts_with('[') {
            serde_json::from_str(text).context("Failed to parse keypair JSON")?
        } else {
            bs58::decode(text)
                .into_vec()
                .context("Failed to decode base58 keypair")?
        }
    };

    if bytes.len() != 64 {
        bail!("Invalid keypair length: expected 64 bytes, got {}", bytes.len());
    }
    if bytes.iter().all(|&b| b == 0) {
        bail!("Invalid keypair: all-zero key rejected");
    }
    Keypair::try_from(bytes.as_slice()).context("Invalid keypair bytes")
}
