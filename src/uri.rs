//! # URI Classification
//!
//! Maps a document or proof location to the kind of fetch method able to
//! retrieve it.

use std::fmt::{self, Display};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Error;

static HTTP_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:[a-zA-Z0-9-]+\.)*[a-zA-Z0-9-]+(?::\d{1,5})?(?:[/?#]\S*)?$")
        .expect("should compile")
});

static IPFS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:ipfs://)?(?<cid>Q[mM][1-9A-HJ-NP-Za-km-z]{44}|b[a-z2-7]{58,}|z[1-9A-HJ-NP-Za-km-z]{48,})$",
    )
    .expect("should compile")
});

/// Kind of fetch method needed for a URI.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FetchKind {
    /// Plain HTTP(S) resource.
    Http,

    /// IPFS content identifier.
    Ipfs,

    /// DNS resource records.
    Dns,

    /// Social network post or profile.
    Social,

    /// Resource hosted under an organization's own domain.
    Domain,

    /// Credential issued by another ORGiD.
    Vc,
}

impl FetchKind {
    /// The registry key for the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Ipfs => "ipfs",
            Self::Dns => "dns",
            Self::Social => "social",
            Self::Domain => "domain",
            Self::Vc => "vc",
        }
    }
}

impl Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URI together with its fetch kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassifiedUri {
    /// The URI to hand to the fetch method. For IPFS this is the bare CID.
    pub uri: String,

    /// The fetch kind.
    pub kind: FetchKind,
}

/// Classify a document location.
///
/// # Errors
///
/// Returns [`Error::UnsupportedUri`] when the URI is neither HTTP(S) nor an
/// IPFS content identifier.
pub fn classify(uri: &str) -> crate::Result<ClassifiedUri> {
    let uri = uri.trim();

    if HTTP_REGEX.is_match(uri) {
        return Ok(ClassifiedUri {
            uri: uri.to_string(),
            kind: FetchKind::Http,
        });
    }
    if let Some(caps) = IPFS_REGEX.captures(uri) {
        return Ok(ClassifiedUri {
            uri: caps["cid"].to_string(),
            kind: FetchKind::Ipfs,
        });
    }

    Err(Error::UnsupportedUri(uri.to_string()))
}

/// Classify a trust-assertion proof location. ORGiD DIDs are credential
/// references.
///
/// # Errors
///
/// Returns [`Error::UnsupportedUri`] when the proof is not a DID, an HTTP(S)
/// URL or an IPFS content identifier.
pub fn classify_proof(proof: &str) -> crate::Result<ClassifiedUri> {
    let proof = proof.trim();
    if proof.starts_with("did:orgid:") {
        return Ok(ClassifiedUri {
            uri: proof.to_string(),
            kind: FetchKind::Vc,
        });
    }
    classify(proof)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CID_V0: &str = "QmPChd2hVbrJ6bfo3WBcTW4iZnpHm8TEzWkLHmLpXhF68A";

    #[test]
    fn http() {
        for uri in [
            "https://example.com/org.json",
            "http://localhost:8080/0x01.json",
            "https://www.example.com",
            "https://api.example.com/path?query=1#frag",
        ] {
            assert_eq!(classify(uri).expect("should classify").kind, FetchKind::Http, "{uri}");
        }
    }

    #[test]
    fn ipfs() {
        let classified = classify(&format!("ipfs://{CID_V0}")).expect("should classify");
        assert_eq!(classified.kind, FetchKind::Ipfs);
        assert_eq!(classified.uri, CID_V0);

        let cid_v1 = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";
        assert_eq!(classify(cid_v1).expect("should classify").kind, FetchKind::Ipfs);
    }

    #[test]
    fn unsupported() {
        for uri in [
            "ws://example.com",
            "https://exa^mple.com",
            "http://user@8080",
            "ftp://example.com/file",
            "not a uri",
            "Qm123",
        ] {
            assert!(matches!(classify(uri), Err(Error::UnsupportedUri(_))), "{uri}");
        }
    }

    #[test]
    fn proof() {
        let did = "did:orgid:1:0x6d98103810d50b3711ea81c187a48245109ba094644ddbc54f8d0c4c7e2bb0b6";
        assert_eq!(classify_proof(did).expect("should classify").kind, FetchKind::Vc);
        assert_eq!(
            classify_proof("https://twitter.com/org/status/1").expect("should classify").kind,
            FetchKind::Http
        );
    }
}
