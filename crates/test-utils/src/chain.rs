//! In-memory organization registry.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use orgid_resolver::{ChainLookup, OrganizationRecord};

/// Organization records keyed by organization id.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    records: Arc<DashMap<String, OrganizationRecord>>,
    lookups: Arc<AtomicUsize>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a record.
    pub fn register(&self, record: OrganizationRecord) {
        self.records.insert(record.organization_id.to_lowercase(), record);
    }

    /// Remove the record of `organization_id`.
    pub fn remove(&self, organization_id: &str) {
        self.records.remove(&organization_id.to_lowercase());
    }

    /// Number of lookups served.
    #[must_use]
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainLookup for Registry {
    async fn organization(&self, organization_id: &str) -> anyhow::Result<Option<OrganizationRecord>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.get(&organization_id.to_lowercase()).map(|r| r.value().clone()))
    }
}
