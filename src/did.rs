//! # DID Syntax
//!
//! Parsing and canonicalization of `did:orgid` identifiers.
//!
//! An ORGiD DID has the form `did:orgid:[<network>:]<orgId>[?query][#fragment]`
//! where `orgId` is a `0x`-prefixed 32-byte hex hash. When the network
//! segment is omitted the DID is anchored on the default network.

use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The only DID method supported by this crate.
pub const METHOD: &str = "orgid";

/// The network used when a DID does not name one.
pub const DEFAULT_NETWORK: &str = "1";

static DID_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^did:(?<method>[a-zA-Z0-9]+):(?:(?<network>[a-zA-Z0-9_]+):)?(?<id>0x[a-fA-F0-9]{64})(?:\?(?<query>[^#]*))?(?:#(?<fragment>.*))?$",
    )
    .expect("should compile")
});

/// A parsed `did:orgid` reference.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidReference {
    /// DID method. Always `orgid`.
    pub method: String,

    /// Network (chain) the organization is anchored on.
    pub network: String,

    /// Organization identifier, lowercase `0x`-prefixed hex.
    pub organization_id: String,

    /// Optional query component, without the leading `?`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Optional fragment component, without the leading `#`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
}

impl DidReference {
    /// Parse a DID, defaulting the network to `default_network` when absent.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDidFormat`] when the string does not match the
    /// ORGiD DID grammar and [`Error::UnsupportedMethod`] when the method is
    /// not `orgid`.
    pub fn parse_with_default(did: &str, default_network: &str) -> crate::Result<Self> {
        let Some(caps) = DID_REGEX.captures(did.trim()) else {
            return Err(Error::InvalidDidFormat(did.to_string()));
        };

        let method = &caps["method"];
        if method != METHOD {
            return Err(Error::UnsupportedMethod(method.to_string()));
        }

        Ok(Self {
            method: METHOD.to_string(),
            network: caps
                .name("network")
                .map_or_else(|| default_network.to_string(), |m| m.as_str().to_string()),
            organization_id: caps["id"].to_lowercase(),
            query: caps.name("query").map(|m| m.as_str().to_string()),
            fragment: caps.name("fragment").map(|m| m.as_str().to_string()),
        })
    }

    /// The canonical, network-qualified DID without query or fragment.
    #[must_use]
    pub fn did(&self) -> String {
        format!("did:{}:{}:{}", self.method, self.network, self.organization_id)
    }

    /// Whether `other` names the same organization on the same network.
    #[must_use]
    pub fn same_subject(&self, other: &Self) -> bool {
        self.network == other.network && self.organization_id == other.organization_id
    }
}

/// Canonicalize a DID string, returning `None` when it is not an ORGiD DID.
#[must_use]
pub fn canonical(did: &str, default_network: &str) -> Option<String> {
    DidReference::parse_with_default(did, default_network).ok().map(|r| r.did())
}

/// Split a DID URL into the DID and the fragment (if any).
#[must_use]
pub fn split_fragment(did_url: &str) -> (&str, Option<&str>) {
    did_url.split_once('#').map_or((did_url, None), |(did, frag)| (did, Some(frag)))
}

impl FromStr for DidReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default(s, DEFAULT_NETWORK)
    }
}

impl Display for DidReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.did())?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}
