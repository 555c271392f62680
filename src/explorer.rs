//! Block explorer links

use crate::config::Cluster;
use url::form_urlencoded;

/// Builds explorer URLs for one cluster
#[derive(Debug, Clone)]
pub struct Explorer {
    base_url: String,
    cluster: Cluster,
}

impl Explorer {
    pub fn new(base_url: impl Into<String>, cluster: Cluster) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cluster,
        }
    }

    /// Link to a transaction by signature
    pub fn tx_url(&self, signature: &impl ToString) -> String {
        self.url("tx", &signature.to_string())
    }

    /// Link to an account by address
    pub fn address_url(&self, address: &impl ToString) -> String {
        self.url("address", &address.to_string())
    }

    fn url(&self, kind: &str, id: &str) -> String {
        let base = format!("{}/{}/{}", self.base_url, kind, id);
        match &self.cluster {
            Cluster::MainnetBeta => base,
            Cluster::Devnet | Cluster::Testnet => {
                format!("{}?cluster={}", base, self.cluster.moniker())
            }
            Cluster::Localnet | Cluster::Custom(_) => format!(
                "{}?cluster=custom&customUrl={}",
                base,
                form_urlencoded::byte_serialize(self.cluster.rpc_url().as_bytes())
                    .collect::<String>()
            ),
        }
    }
}
