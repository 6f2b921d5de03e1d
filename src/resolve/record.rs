//! # Organization Record Lookup

use std::time::Duration;

use tokio::time::timeout;

use crate::chain::{ChainConfig, OrganizationRecord};
use crate::error::Error;

/// A record together with the non-fatal problems found in it.
#[derive(Clone, Debug)]
pub struct FoundRecord {
    /// The on-chain record.
    pub record: OrganizationRecord,

    /// Problems that do not stop resolution.
    pub warnings: Vec<String>,
}

/// Look up `organization_id` on `chain`.
///
/// # Errors
///
/// Returns [`Error::ChainLookup`] when the chain plugin fails or times out
/// and [`Error::OrganizationNotFound`] when the registry does not know the
/// organization.
pub async fn lookup(
    chain: &ChainConfig, organization_id: &str, limit: Duration,
) -> crate::Result<FoundRecord> {
    let found = timeout(limit, chain.lookup.organization(organization_id))
        .await
        .map_err(|_| {
            Error::ChainLookup(format!(
                "chain \"{}\" did not answer within {} ms",
                chain.id,
                limit.as_millis()
            ))
        })?
        .map_err(|e| Error::ChainLookup(e.to_string()))?;

    let Some(mut record) = found else {
        return Err(Error::OrganizationNotFound(organization_id.to_string()));
    };
    if record.organization_id.is_empty() {
        record.organization_id = organization_id.to_string();
    }

    let mut warnings = Vec::new();
    if !record.is_active {
        warnings.push(format!("ORGiD \"{organization_id}\" is not active"));
    }
    if record.has_director() && !record.is_directorship_accepted {
        warnings.push(format!(
            "ORGiD director \"{}\" has not accepted the directorship",
            record.director.as_deref().unwrap_or_default()
        ));
    }
    if record.document_hash.as_deref().map_or(true, str::is_empty) {
        warnings.push(
            "ORG.JSON hash is not registered; document integrity relies on the VC proof only"
                .to_string(),
        );
    }
    for warning in &warnings {
        tracing::warn!("{warning}");
    }

    Ok(FoundRecord { record, warnings })
}
