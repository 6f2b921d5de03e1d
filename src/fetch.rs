//! # Fetch Registry
//!
//! Fetch methods retrieve ORG.JSON documents and trust-assertion proofs. The
//! host application registers them with a name, a [`FetchKind`] and a URI
//! pattern. Methods are kept in priority order: social and domain specific
//! methods are consulted before DNS and credential methods, which come before
//! the generic HTTP and IPFS methods. Registration order is kept within a
//! priority band.
//!
//! DNS fetch methods receive `dns:<domain>?type=<TYPE>` URIs and return a
//! DNS-over-HTTPS JSON body (`{"Answer": [{"data": ...}]}`).

pub mod http;

use std::fmt::{self, Debug};
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

pub use self::http::{DnsFetcher, HttpFetcher, IpfsFetcher};
use crate::error::Error;
use crate::uri::FetchKind;

/// Retrieves the resource at a URI.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the raw bytes of the resource at `uri`.
    async fn fetch(&self, uri: &str) -> anyhow::Result<Vec<u8>>;
}

/// A registered fetch method.
#[derive(Clone)]
pub struct FetchMethod {
    /// Human-readable name.
    pub name: String,

    /// The kind of URI the method handles.
    pub kind: FetchKind,

    /// Regular expression a URI must match to use this method.
    pub uri_pattern: String,

    /// The fetch implementation.
    pub fetcher: Arc<dyn Fetch>,
}

impl FetchMethod {
    /// Create a fetch method.
    pub fn new(
        name: impl Into<String>, kind: FetchKind, uri_pattern: impl Into<String>,
        fetcher: impl Fetch + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            uri_pattern: uri_pattern.into(),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Fetch `uri` with this method.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying fetcher returns.
    pub async fn fetch(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        self.fetcher.fetch(uri).await
    }
}

impl Debug for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FetchMethod")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("uri_pattern", &self.uri_pattern)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
struct Registered {
    method: FetchMethod,
    pattern: Regex,
}

/// Fetch methods in priority order.
#[derive(Clone, Debug, Default)]
pub struct FetchRegistry {
    methods: Vec<Registered>,
}

const fn priority(kind: FetchKind) -> u8 {
    match kind {
        FetchKind::Social | FetchKind::Domain => 0,
        FetchKind::Dns | FetchKind::Vc => 1,
        FetchKind::Http | FetchKind::Ipfs => 2,
    }
}

impl FetchRegistry {
    /// Build the registry, compiling every URI pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlugin`] when a method has an empty name or an
    /// invalid URI pattern.
    pub fn new(methods: Vec<FetchMethod>) -> crate::Result<Self> {
        let mut registered = Vec::with_capacity(methods.len());
        for method in methods {
            if method.name.trim().is_empty() {
                return Err(Error::InvalidPlugin("fetch method name must not be empty".into()));
            }
            let pattern = Regex::new(&method.uri_pattern).map_err(|e| {
                Error::InvalidPlugin(format!("fetch method \"{}\" pattern: {e}", method.name))
            })?;
            registered.push(Registered { method, pattern });
        }
        registered.sort_by_key(|r| priority(r.method.kind));
        Ok(Self { methods: registered })
    }

    /// First method of `kind` whose pattern matches `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFetcher`] when no method matches.
    pub fn select_kind(&self, kind: FetchKind, uri: &str) -> crate::Result<&FetchMethod> {
        self.select_any(&[kind], uri)
    }

    /// First method, in priority order, of any of `kinds` whose pattern
    /// matches `uri`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFetcher`] naming the first kind when no
    /// method matches.
    pub fn select_any(&self, kinds: &[FetchKind], uri: &str) -> crate::Result<&FetchMethod> {
        self.methods
            .iter()
            .find(|r| kinds.contains(&r.method.kind) && r.pattern.is_match(uri))
            .map(|r| &r.method)
            .ok_or_else(|| {
                let kind = kinds.first().map_or("unknown", FetchKind::as_str);
                Error::UnsupportedFetcher(kind.to_string())
            })
    }

    /// Registered methods in priority order.
    pub fn methods(&self) -> impl Iterator<Item = &FetchMethod> {
        self.methods.iter().map(|r| &r.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl Fetch for Fixed {
        async fn fetch(&self, _: &str) -> anyhow::Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    fn registry() -> FetchRegistry {
        FetchRegistry::new(vec![
            FetchMethod::new("http", FetchKind::Http, "^https?://", Fixed("http")),
            FetchMethod::new("twitter", FetchKind::Social, r"^https://(www\.)?twitter\.com/", Fixed("twitter")),
            FetchMethod::new("ipfs", FetchKind::Ipfs, ".*", Fixed("ipfs")),
        ])
        .expect("should build")
    }

    #[test]
    fn priority_order() {
        let names = registry().methods().map(|m| m.name.clone()).collect::<Vec<_>>();
        assert_eq!(names, vec!["twitter", "http", "ipfs"]);
    }

    #[tokio::test]
    async fn social_before_http() {
        let registry = registry();
        let kinds = [FetchKind::Social, FetchKind::Http];
        let method = registry.select_any(&kinds, "https://twitter.com/org/status/1").expect("should select");
        assert_eq!(method.name, "twitter");
        assert_eq!(method.fetch("").await.expect("should fetch"), b"twitter");

        let method = registry.select_any(&kinds, "https://example.com").expect("should select");
        assert_eq!(method.name, "http");
    }

    #[test]
    fn by_kind() {
        let registry = registry();
        let method =
            registry.select_kind(FetchKind::Http, "https://twitter.com/org").expect("should select");
        assert_eq!(method.name, "http");

        let err = registry.select_kind(FetchKind::Dns, "dns:example.com?type=TXT").expect_err("should fail");
        assert_eq!(err.to_string(), "Unsupported URI fetcher \"dns\"");
    }

    #[test]
    fn invalid_pattern() {
        let result = FetchRegistry::new(vec![FetchMethod::new("bad", FetchKind::Http, "(", Fixed(""))]);
        assert!(matches!(result, Err(Error::InvalidPlugin(_))));
    }
}
