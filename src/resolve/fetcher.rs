//! # Document Fetcher
//!
//! Retrieves the ORG.JSON credential registered for an organization and
//! checks it against the on-chain record.

use std::time::Duration;

use serde_json::Value;
use sha3::{Digest, Keccak256};
use tokio::time::timeout;

use crate::chain::OrganizationRecord;
use crate::did::{DidReference, canonical};
use crate::document::OrgJsonCredential;
use crate::error::Error;
use crate::fetch::FetchRegistry;
use crate::uri;

/// keccak-256 of `bytes` as `0x`-prefixed hex.
#[must_use]
pub fn document_hash(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(Keccak256::digest(bytes)))
}

/// A fetched ORG.JSON credential that matches its on-chain record.
#[derive(Clone, Debug)]
pub struct FetchedDocument {
    /// Location the credential was fetched from.
    pub uri: String,

    /// The credential as fetched.
    pub raw: Value,

    /// The parsed credential.
    pub credential: OrgJsonCredential,
}

/// Fetches ORG.JSON documents with the registered fetch methods.
#[derive(Clone, Copy, Debug)]
pub struct DocumentFetcher<'a> {
    fetchers: &'a FetchRegistry,
    limit: Duration,
}

impl<'a> DocumentFetcher<'a> {
    /// Create a fetcher bounding every fetch by `limit`.
    #[must_use]
    pub const fn new(fetchers: &'a FetchRegistry, limit: Duration) -> Self {
        Self { fetchers, limit }
    }

    /// Fetch the ORG.JSON credential for `record` and check it belongs to
    /// `did`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DocumentUnreachable`] when every candidate location
    /// fails, [`Error::HashMismatch`] when the content does not hash to the
    /// registered hash, [`Error::MalformedDocument`] for content that is not
    /// an ORG.JSON credential, [`Error::InvalidCredentialType`] when the
    /// credential is not typed `OrgJson` and [`Error::IdMismatch`] when the
    /// document describes another DID.
    pub async fn fetch(
        &self, record: &OrganizationRecord, did: &DidReference,
    ) -> crate::Result<FetchedDocument> {
        let (uri, bytes) = self.first_available(record).await?;

        if let Some(expected) = record.document_hash.as_deref().filter(|h| !h.is_empty()) {
            let actual = document_hash(&bytes);
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(Error::HashMismatch {
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        let raw: Value = serde_json::from_slice(&bytes)
            .map_err(|e| Error::MalformedDocument(format!("{uri}: {e}")))?;

        let credential: OrgJsonCredential = serde_json::from_value(raw.clone())
            .map_err(|e| Error::MalformedDocument(format!("{uri}: {e}")))?;
        if !credential.is_org_json() {
            return Err(Error::InvalidCredentialType);
        }

        let expected = did.did();
        let actual = &credential.credential_subject.id;
        if canonical(actual, &did.network).as_deref() != Some(expected.as_str()) {
            return Err(Error::IdMismatch {
                expected,
                actual: actual.clone(),
            });
        }

        Ok(FetchedDocument { uri, raw, credential })
    }

    // try the primary location, then each backup, stopping at the first success
    async fn first_available(&self, record: &OrganizationRecord) -> crate::Result<(String, Vec<u8>)> {
        let mut failures: Vec<(String, Error)> = Vec::new();

        for location in record.document_uris() {
            match self.fetch_uri(location).await {
                Ok(bytes) => return Ok((location.to_string(), bytes)),
                Err(e) => {
                    tracing::warn!("ORG.JSON not available at {location}: {e}");
                    failures.push((location.to_string(), e));
                }
            }
        }

        match failures.len() {
            0 => Err(Error::DocumentUnreachable("no ORG.JSON location registered".into())),
            1 if matches!(failures[0].1, Error::UnsupportedUri(_) | Error::UnsupportedFetcher(_)) => {
                Err(failures.remove(0).1)
            }
            _ => {
                let joined = failures
                    .iter()
                    .map(|(u, e)| match e {
                        Error::DocumentUnreachable(reason) => format!("{u}: {reason}"),
                        other => format!("{u}: {other}"),
                    })
                    .collect::<Vec<_>>();
                Err(Error::DocumentUnreachable(joined.join("; ")))
            }
        }
    }

    async fn fetch_uri(&self, location: &str) -> crate::Result<Vec<u8>> {
        let classified = uri::classify(location)?;
        let method = self.fetchers.select_kind(classified.kind, &classified.uri)?;
        tracing::debug!("fetching ORG.JSON from {} with {}", classified.uri, method.name);

        let bytes = timeout(self.limit, method.fetch(&classified.uri))
            .await
            .map_err(|_| {
                Error::DocumentUnreachable(format!("timed out after {} ms", self.limit.as_millis()))
            })?
            .map_err(|e| Error::DocumentUnreachable(e.to_string()))?;

        if bytes.is_empty() {
            return Err(Error::DocumentUnreachable("empty response".into()));
        }
        Ok(bytes)
    }
}
