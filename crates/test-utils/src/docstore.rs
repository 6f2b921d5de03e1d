//! In-memory document store serving every fetch kind.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use dashmap::DashMap;
use orgid_resolver::fetch::http::dns_uri;
use orgid_resolver::{Fetch, FetchKind, FetchMethod};
use serde_json::json;

/// Documents keyed by URI.
#[derive(Clone, Debug, Default)]
pub struct DocStore {
    store: Arc<DashMap<String, Vec<u8>>>,
}

impl DocStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` at `uri`.
    pub fn put(&self, uri: &str, bytes: impl Into<Vec<u8>>) {
        self.store.insert(uri.to_string(), bytes.into());
    }

    /// Serve a DNS-over-HTTPS answer with `records` for `domain`.
    pub fn put_dns(&self, domain: &str, record_type: &str, records: &[&str]) {
        let answers = records.iter().map(|data| json!({"name": domain, "data": data})).collect::<Vec<_>>();
        self.put(&dns_uri(domain, record_type), json!({"Status": 0, "Answer": answers}).to_string());
    }

    /// Stop serving `uri`.
    pub fn remove(&self, uri: &str) {
        self.store.remove(uri);
    }

    /// Fetch methods backed by this store: HTTP, IPFS and DNS.
    #[must_use]
    pub fn methods(&self) -> Vec<FetchMethod> {
        vec![
            FetchMethod::new("http", FetchKind::Http, "^https?://", self.clone()),
            FetchMethod::new("ipfs", FetchKind::Ipfs, "^[A-Za-z0-9]+$", self.clone()),
            FetchMethod::new("dns", FetchKind::Dns, "^dns:", self.clone()),
        ]
    }
}

#[async_trait]
impl Fetch for DocStore {
    async fn fetch(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        self.store.get(uri).map(|b| b.value().clone()).ok_or_else(|| anyhow!("404 Not Found: {uri}"))
    }
}

/// A fetcher that never answers within a test.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stalled;

#[async_trait]
impl Fetch for Stalled {
    async fn fetch(&self, _: &str) -> anyhow::Result<Vec<u8>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Err(anyhow!("stalled"))
    }
}
