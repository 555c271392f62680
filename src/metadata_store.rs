//! Off-chain metadata storage
//!
//! Token and NFT metadata accounts point at a JSON document by URI. Where the
//! document lives is up to the [`MetadataStore`]; the crate ships only
//! [`PinnedUriStore`], which hands back a URI uploaded ahead of time.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Off-chain metadata document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffChainMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub trait_type: String,
    pub value: String,
}

/// Stores a metadata document and returns its URI
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn upload(&self, metadata: &OffChainMetadata) -> anyhow::Result<String>;
}

/// Returns a fixed, already-uploaded URI
#[derive(Debug, Clone)]
pub struct PinnedUriStore {
    uri: String,
}

impl PinnedUriStore {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

#[async_trait]
impl MetadataStore for PinnedUriStore {
    async fn upload(&self, metadata: &OffChainMetadata) -> anyhow::Result<String> {
        tracing::debug!(
            name = %metadata.name,
            uri = %self.uri,
            "Using pinned metadata URI"
        );
        Ok(self.uri.clone())
    }
}
