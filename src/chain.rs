//! # Chain Registry
//!
//! Host applications register one [`ChainConfig`] per network an ORGiD may
//! be anchored on. Each config carries a [`ChainLookup`] that returns the
//! organization record held by the registry contract.

use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Looks up organization records in a blockchain registry.
#[async_trait]
pub trait ChainLookup: Send + Sync {
    /// Fetch the record for `organization_id`, returning `None` when the
    /// registry does not know the organization.
    async fn organization(&self, organization_id: &str) -> anyhow::Result<Option<OrganizationRecord>>;
}

/// A snapshot of an organization's on-chain record.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    /// The organization identifier.
    #[serde(alias = "orgId")]
    pub organization_id: String,

    /// Owner account address.
    pub owner: String,

    /// Director account address, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,

    /// Primary ORG.JSON location.
    #[serde(alias = "orgJsonUri")]
    pub document_uri: String,

    /// Fallback ORG.JSON locations, tried in order.
    #[serde(default, alias = "orgJsonUriBackup", alias = "orgJsonUriBackups")]
    pub document_uri_backups: Vec<String>,

    /// keccak-256 of the ORG.JSON bytes.
    #[serde(default, alias = "orgJsonHash", skip_serializing_if = "Option::is_none")]
    pub document_hash: Option<String>,

    /// Verification methods registered as capability delegates.
    #[serde(default, alias = "delegates")]
    pub delegate_ids: Vec<String>,

    /// Whether the organization is active.
    #[serde(default = "default_true", alias = "state")]
    pub is_active: bool,

    /// Whether the director accepted the directorship.
    #[serde(default, alias = "directorConfirmed")]
    pub is_directorship_accepted: bool,

    /// Registration time as reported by the registry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl OrganizationRecord {
    /// Candidate ORG.JSON locations, primary first.
    pub fn document_uris(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.document_uri.as_str())
            .chain(self.document_uri_backups.iter().map(String::as_str))
            .filter(|uri| !uri.is_empty())
    }

    /// Whether a director is set, ignoring the zero address.
    #[must_use]
    pub fn has_director(&self) -> bool {
        self.director.as_deref().is_some_and(|d| {
            !d.is_empty() && !d.trim_start_matches("0x").chars().all(|c| c == '0')
        })
    }
}

/// Configuration for one supported network.
#[derive(Clone)]
pub struct ChainConfig {
    /// Network id used as the DID submethod (e.g. `1`, `77`).
    pub id: String,

    /// Blockchain type (e.g. `eip155`).
    pub blockchain_type: String,

    /// Registry lookup for the network.
    pub lookup: Arc<dyn ChainLookup>,
}

impl ChainConfig {
    /// Create a chain config.
    pub fn new(
        id: impl Into<String>, blockchain_type: impl Into<String>, lookup: impl ChainLookup + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            blockchain_type: blockchain_type.into(),
            lookup: Arc::new(lookup),
        }
    }
}

impl Debug for ChainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainConfig")
            .field("id", &self.id)
            .field("blockchain_type", &self.blockchain_type)
            .finish_non_exhaustive()
    }
}

/// Chains keyed by network id.
#[derive(Clone, Debug, Default)]
pub struct ChainRegistry {
    chains: HashMap<String, ChainConfig>,
}

impl ChainRegistry {
    /// Build the registry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlugin`] when a config has an empty id or
    /// type, or when two configs share an id.
    pub fn new(configs: Vec<ChainConfig>) -> crate::Result<Self> {
        let mut chains = HashMap::with_capacity(configs.len());
        for config in configs {
            if config.id.trim().is_empty() {
                return Err(Error::InvalidPlugin("chain id must not be empty".into()));
            }
            if config.blockchain_type.trim().is_empty() {
                return Err(Error::InvalidPlugin(format!(
                    "chain \"{}\" must declare a blockchain type",
                    config.id
                )));
            }
            if chains.contains_key(&config.id) {
                return Err(Error::InvalidPlugin(format!("chain \"{}\" registered twice", config.id)));
            }
            chains.insert(config.id.clone(), config);
        }
        Ok(Self { chains })
    }

    /// Chain config for `network`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedChain`] when the network is not registered.
    pub fn get(&self, network: &str) -> crate::Result<&ChainConfig> {
        self.chains.get(network).ok_or_else(|| Error::UnsupportedChain(network.to_string()))
    }

    /// Whether no chains are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    struct Empty;

    #[async_trait]
    impl ChainLookup for Empty {
        async fn organization(&self, _: &str) -> anyhow::Result<Option<OrganizationRecord>> {
            Ok(None)
        }
    }

    #[test]
    fn lookup_by_network() {
        let registry = ChainRegistry::new(vec![ChainConfig::new("77", "eip155", Empty)])
            .expect("should build");
        assert_eq!(registry.get("77").expect("should exist").blockchain_type, "eip155");
        assert!(matches!(registry.get("1111"), Err(Error::UnsupportedChain(id)) if id == "1111"));
    }

    #[test]
    fn duplicate_chain() {
        let result = ChainRegistry::new(vec![
            ChainConfig::new("1", "eip155", Empty),
            ChainConfig::new("1", "eip155", Empty),
        ]);
        assert!(matches!(result, Err(Error::InvalidPlugin(_))));
    }

    #[test]
    fn empty_type() {
        let result = ChainRegistry::new(vec![ChainConfig::new("1", " ", Empty)]);
        assert!(matches!(result, Err(Error::InvalidPlugin(_))));
    }

    #[test]
    fn record_aliases() {
        let record: OrganizationRecord = serde_json::from_value(json!({
            "orgId": "0x01",
            "owner": "0xabc",
            "director": "0x0000000000000000000000000000000000000000",
            "orgJsonUri": "https://example.com/org.json",
            "orgJsonHash": "0x02",
            "delegates": ["did:orgid:1:0x03#key"],
            "state": true
        }))
        .expect("should deserialize");

        assert_eq!(record.document_uris().collect::<Vec<_>>(), vec!["https://example.com/org.json"]);
        assert_eq!(record.document_hash.as_deref(), Some("0x02"));
        assert_eq!(record.delegate_ids.len(), 1);
        assert!(!record.has_director());
    }
}
