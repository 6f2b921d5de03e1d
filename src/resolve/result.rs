//! # Resolution Result
//!
//! The externally visible output of resolution. Field names follow W3C DID
//! resolution.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::checks::{Check, CheckType};
use crate::chain::OrganizationRecord;
use crate::document::{OrgJson, TrustAssertion};

/// JSON-LD context of a resolution result.
pub const DID_RESOLUTION_CONTEXT: &str = "https://w3id.org/did-resolution/v1";

/// Result of resolving a DID.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionResult {
    /// The DID resolution context.
    #[serde(rename = "@context")]
    pub context: String,

    /// The resolved DID. Canonical when the input could be parsed.
    pub did: String,

    /// The verified ORG.JSON subject, or `null` on failure.
    pub did_document: Option<Value>,

    /// Resolution metadata.
    pub did_resolution_metadata: ResolutionMetadata,

    /// Document metadata, or `null` on failure.
    pub did_document_metadata: Option<DocumentMetadata>,
}

impl ResolutionResult {
    /// An empty result for `did`.
    #[must_use]
    pub fn new(did: impl Into<String>) -> Self {
        Self {
            context: DID_RESOLUTION_CONTEXT.to_string(),
            did: did.into(),
            did_document: None,
            did_resolution_metadata: ResolutionMetadata::default(),
            did_document_metadata: None,
        }
    }

    /// The resolution error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.did_resolution_metadata.error.as_deref()
    }

    /// Whether resolution produced a verified document.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.did_resolution_metadata.error.is_none() && self.did_document.is_some()
    }

    /// The resolved document as ORG.JSON.
    #[must_use]
    pub fn document(&self) -> Option<OrgJson> {
        self.did_document.as_ref().and_then(|d| serde_json::from_value(d.clone()).ok())
    }

    /// The on-chain record the result was resolved from.
    #[must_use]
    pub fn record(&self) -> Option<&OrganizationRecord> {
        self.did_document_metadata.as_ref().and_then(|m| m.data.as_ref())
    }

    /// The reported check of `type_`.
    #[must_use]
    pub fn check(&self, type_: CheckType) -> Option<&Check> {
        self.did_resolution_metadata.checks.iter().find(|c| c.type_ == type_)
    }

    pub(crate) fn finish(mut self, started: Instant) -> Self {
        self.did_resolution_metadata.retrieved = Utc::now();
        self.did_resolution_metadata.duration_ms =
            u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        self
    }
}

/// Resolution metadata.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionMetadata {
    /// Media type of the returned document.
    pub content_type: ContentType,

    /// When the result was produced.
    pub retrieved: DateTime<Utc>,

    /// Time taken to resolve, in milliseconds.
    pub duration_ms: u64,

    /// Version of this resolver.
    pub resolver_version: String,

    /// The error that stopped resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// The raw ORG.JSON credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<Value>,

    /// Outcome of each check.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<Check>,
}

impl Default for ResolutionMetadata {
    fn default() -> Self {
        Self {
            content_type: ContentType::default(),
            retrieved: Utc::now(),
            duration_ms: 0,
            resolver_version: env!("CARGO_PKG_VERSION").to_string(),
            error: None,
            credential: None,
            checks: Vec::new(),
        }
    }
}

/// The media type of a DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub enum ContentType {
    /// JSON-LD representation of a DID document.
    #[default]
    #[serde(rename = "application/did+ld+json")]
    DidLdJson,
}

/// Metadata about the resolved document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    /// Document creation time, as declared by the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Document update time, as declared by the document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    /// Set when the document is deactivated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<bool>,

    /// The on-chain organization record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<OrganizationRecord>,

    /// Trust assertions annotated with their verification outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust_assertions: Option<Vec<TrustAssertion>>,
}

impl DocumentMetadata {
    pub(crate) fn from_document(document: &OrgJson, record: OrganizationRecord) -> Self {
        Self {
            created: document.created.clone(),
            updated: document.updated.clone(),
            deactivated: document.is_deactivated().then_some(true),
            data: Some(record),
            trust_assertions: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_json_snapshot as assert_snapshot;

    use super::*;

    #[test]
    fn failure_shape() {
        let mut result = ResolutionResult::new("did:orgid:1111:0x01");
        result.did_resolution_metadata.error = Some("Unsupported blockchain Id \"1111\"".into());

        assert!(!result.is_success());
        assert_snapshot!(result, {
            ".didResolutionMetadata.retrieved" => "[retrieved]",
            ".didResolutionMetadata.resolverVersion" => "[version]"
        }, @r###"
        {
          "@context": "https://w3id.org/did-resolution/v1",
          "did": "did:orgid:1111:0x01",
          "didDocument": null,
          "didResolutionMetadata": {
            "contentType": "application/did+ld+json",
            "retrieved": "[retrieved]",
            "durationMs": 0,
            "resolverVersion": "[version]",
            "error": "Unsupported blockchain Id \"1111\""
          },
          "didDocumentMetadata": null
        }
        "###);
    }

    #[test]
    fn deactivated_metadata() {
        let document = OrgJson {
            id: "did:orgid:1:0x01".into(),
            created: Some("2021-01-01T00:00:00Z".into()),
            deactivated: Some(serde_json::json!("2022-01-01T00:00:00Z")),
            ..OrgJson::default()
        };
        let metadata = DocumentMetadata::from_document(&document, OrganizationRecord::default());
        assert_eq!(metadata.deactivated, Some(true));
        assert_eq!(metadata.created.as_deref(), Some("2021-01-01T00:00:00Z"));
    }
}
