//! # Resolver Options

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::did::DEFAULT_NETWORK;
use crate::error::Error;

/// Options controlling resolution.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    /// Maximum capability delegation depth.
    pub max_depth: usize,

    /// Timeout, in milliseconds, for every chain lookup and fetch.
    pub fetch_timeout_ms: u64,

    /// Network used for DIDs that do not name one.
    pub default_network: String,

    /// Fail resolution on schema problems instead of reporting warnings.
    pub strict_schema: bool,

    /// Verify trust assertions.
    pub verify_trust: bool,

    /// Issuers whose credentials are accepted as trust proofs. Any issuer is
    /// accepted when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trusted_issuers: Option<Vec<String>>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            max_depth: 3,
            fetch_timeout_ms: 7000,
            default_network: DEFAULT_NETWORK.to_string(),
            strict_schema: true,
            verify_trust: true,
            trusted_issuers: None,
        }
    }
}

impl ResolverOptions {
    /// The fetch timeout as a [`Duration`].
    #[must_use]
    pub const fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Check the options are usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when the timeout is zero or the
    /// default network is not a valid network identifier.
    pub fn validate(&self) -> crate::Result<()> {
        if self.fetch_timeout_ms == 0 {
            return Err(Error::InvalidOptions("fetchTimeoutMs must be greater than 0".into()));
        }
        if self.default_network.is_empty()
            || !self.default_network.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(Error::InvalidOptions(format!(
                "defaultNetwork \"{}\" is not a valid network id",
                self.default_network
            )));
        }
        if let Some(issuers) = &self.trusted_issuers {
            if let Some(bad) = issuers.iter().find(|i| !i.starts_with("did:")) {
                return Err(Error::InvalidOptions(format!("trusted issuer \"{bad}\" is not a DID")));
            }
        }
        Ok(())
    }
}
