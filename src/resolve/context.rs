//! # Resolution Context
//!
//! State carried through one top-level resolution. A context frame is never
//! mutated: delegate and issuer resolutions receive a new frame.

use std::sync::Arc;

use dashmap::DashMap;

use super::ResolutionResult;

/// One frame of resolution state.
#[derive(Clone, Debug)]
pub struct ResolutionContext {
    root_did: String,
    depth: usize,
    visited: Vec<String>,
    trust_path: Vec<String>,
    results: Arc<DashMap<String, ResolutionResult>>,
}

impl ResolutionContext {
    /// The frame for a top-level resolution of `root_did` (canonical).
    pub(crate) fn root(root_did: impl Into<String>) -> Self {
        Self {
            root_did: root_did.into(),
            depth: 0,
            visited: Vec::new(),
            trust_path: Vec::new(),
            results: Arc::new(DashMap::new()),
        }
    }

    /// The frame for resolving a capability delegate of `did`.
    #[must_use]
    pub(crate) fn descend(&self, did: &str) -> Self {
        let mut visited = self.visited.clone();
        visited.push(did.to_string());
        Self {
            root_did: self.root_did.clone(),
            depth: self.depth + 1,
            visited,
            trust_path: self.trust_path.clone(),
            results: Arc::clone(&self.results),
        }
    }

    /// The frame for resolving a trust-credential issuer while `did` has its
    /// trust verified. Depth and cycle state start afresh.
    #[must_use]
    pub(crate) fn spawn(&self, issuer_did: &str, did: &str) -> Self {
        let mut trust_path = self.trust_path.clone();
        trust_path.push(did.to_string());
        Self {
            root_did: issuer_did.to_string(),
            depth: 0,
            visited: Vec::new(),
            trust_path,
            results: Arc::clone(&self.results),
        }
    }

    /// Delegation depth of this frame.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether resolving `did` in this frame revisits the delegation chain.
    #[must_use]
    pub fn is_cycle(&self, did: &str) -> bool {
        self.depth > 0 && (did == self.root_did || self.visited.iter().any(|v| v == did))
    }

    /// Whether trust verification of `did` must be skipped to stop trust
    /// claims recursing.
    #[must_use]
    pub fn skip_trust(&self, did: &str, max_depth: usize) -> bool {
        self.trust_path.len() >= max_depth || self.trust_path.iter().any(|t| t == did)
    }

    /// A result already produced during this top-level resolution.
    #[must_use]
    pub fn cached(&self, did: &str) -> Option<ResolutionResult> {
        self.results.get(did).map(|r| r.value().clone())
    }

    pub(crate) fn remember(&self, did: &str, result: &ResolutionResult) {
        self.results.insert(did.to_string(), result.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames() {
        let root = ResolutionContext::root("did:orgid:1:0xa");
        assert!(!root.is_cycle("did:orgid:1:0xa"));

        let delegate = root.descend("did:orgid:1:0xa");
        assert_eq!(delegate.depth(), 1);
        assert!(delegate.is_cycle("did:orgid:1:0xa"));
        assert!(!delegate.is_cycle("did:orgid:1:0xb"));

        let next = delegate.descend("did:orgid:1:0xb");
        assert!(next.is_cycle("did:orgid:1:0xb"));
        assert_eq!(root.depth(), 0);
    }

    #[test]
    fn spawned() {
        let root = ResolutionContext::root("did:orgid:1:0xa").descend("did:orgid:1:0xa");
        let issuer = root.spawn("did:orgid:1:0xb", "did:orgid:1:0xa");
        assert_eq!(issuer.depth(), 0);
        assert!(!issuer.is_cycle("did:orgid:1:0xa"));
        assert!(issuer.skip_trust("did:orgid:1:0xa", 3));
        assert!(!issuer.skip_trust("did:orgid:1:0xb", 3));
        assert!(issuer.skip_trust("did:orgid:1:0xb", 1));
    }

    #[test]
    fn shared_results() {
        let root = ResolutionContext::root("did:orgid:1:0xa");
        let delegate = root.descend("did:orgid:1:0xa");
        delegate.remember("did:orgid:1:0xb", &ResolutionResult::new("did:orgid:1:0xb"));
        assert!(root.cached("did:orgid:1:0xb").is_some());
    }
}
