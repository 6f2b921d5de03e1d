//! # Trust Assertions
//!
//! Verifies the `trust.assertions` of a resolved ORG.JSON document.
//!
//! - `dns`: a TXT, HINFO or SPF record of the claimed domain contains the DID.
//! - `domain` / `social` with a URL proof: the proof is published under the
//!   claimed domain or profile and its content contains the DID.
//! - `domain` / `social` with a DID proof, and `vc-proof`: the proof names a
//!   credential held in the issuer's ORG.JSON. The issuer is resolved, the
//!   credential verified and its subject must be this DID and claim.
//!
//! Assertions are verified concurrently. A failed assertion never stops the
//! others or the resolution.

use std::time::Duration;

use futures::future::join_all;
use regex::Regex;
use serde_json::Value;
use tokio::time::timeout;

use crate::credential::BlockchainAccountId;
use crate::did::{DidReference, canonical, split_fragment};
use crate::document::{OrgJson, TrustAssertion};
use crate::error::Error;
use crate::fetch::FetchMethod;
use crate::fetch::http::{DNS_RECORD_TYPES, dns_answers, dns_uri};
use crate::resolve::{OrgIdResolver, ResolutionContext, find_method, key_material};
use crate::uri::{self, FetchKind};

/// Outcome of verifying a document's trust assertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrustReport {
    /// The assertions, annotated with `verified`.
    pub assertions: Vec<TrustAssertion>,

    /// One entry per failed assertion.
    pub errors: Vec<String>,

    /// Problems that do not fail an assertion.
    pub warnings: Vec<String>,
}

impl TrustReport {
    /// `None` when there is nothing to verify, otherwise whether every
    /// assertion verified.
    #[must_use]
    pub fn passed(&self) -> Option<bool> {
        if self.assertions.is_empty() {
            return None;
        }
        Some(self.errors.is_empty() && self.assertions.iter().all(|a| a.verified == Some(true)))
    }
}

/// Verifies trust assertions of one resolved document.
pub struct TrustVerifier<'a> {
    resolver: &'a OrgIdResolver,
    ctx: &'a ResolutionContext,
    did: &'a str,
}

impl<'a> TrustVerifier<'a> {
    /// Create a verifier for the document of `did` (canonical), resolved in
    /// frame `ctx`.
    #[must_use]
    pub const fn new(resolver: &'a OrgIdResolver, ctx: &'a ResolutionContext, did: &'a str) -> Self {
        Self { resolver, ctx, did }
    }

    /// Verify every assertion of `document`. An entry that cannot be read
    /// fails on its own.
    pub async fn verify(&self, document: &OrgJson) -> TrustReport {
        let entries = document.assertions();
        let outcomes = join_all(entries.iter().map(|entry| async move {
            let assertion = TrustAssertion::from_entry(entry)?;
            self.verify_one(&assertion, document).await
        }))
        .await;

        let mut report = TrustReport::default();
        for (entry, outcome) in entries.iter().zip(outcomes) {
            let mut annotated = TrustAssertion::lossy(entry);
            annotated.verified = Some(outcome.is_ok());
            if let Err(e) = outcome {
                tracing::warn!("{}: {e}", self.did);
                report.errors.push(e.to_string());
            }
            report.assertions.push(annotated);
        }
        report
    }

    async fn verify_one(&self, assertion: &TrustAssertion, document: &OrgJson) -> crate::Result<()> {
        let outcome = match assertion.type_.as_str() {
            "dns" => self.dns(assertion, document).await,
            "domain" | "social" => match uri::classify_proof(&assertion.proof) {
                Ok(proof) if proof.kind == FetchKind::Vc => self.credential(assertion).await,
                Ok(_) => self.published(assertion, document).await,
                Err(e) => Err(e.to_string()),
            },
            "vc-proof" | "vc" => self.credential(assertion).await,
            other => return Err(Error::UnknownAssertionType(other.to_string())),
        };

        outcome.map_err(|reason| Error::AssertionNotVerified {
            claim: assertion.claim.clone(),
            reason,
        })
    }

    // a DNS record of the claimed domain contains the DID
    async fn dns(&self, assertion: &TrustAssertion, document: &OrgJson) -> Result<(), String> {
        let record_type = assertion.proof.trim().to_uppercase();
        if !DNS_RECORD_TYPES.contains(&record_type.as_str()) {
            return Err(format!("unsupported DNS record type \"{}\"", assertion.proof));
        }

        let query = dns_uri(assertion.claim.trim(), &record_type);
        let method = self
            .resolver
            .fetchers()
            .select_kind(FetchKind::Dns, &query)
            .map_err(|e| e.to_string())?;
        let body = self.fetch(method, &query).await?;
        let answers = dns_answers(&body).map_err(|e| format!("invalid DNS response: {e}"))?;

        if answers.is_empty() {
            return Err(format!("no {record_type} records found"));
        }
        if !answers.iter().any(|a| self.mentions_did(a, document)) {
            return Err(format!("DID not found in {record_type} records"));
        }
        Ok(())
    }

    // the proof URL lives under the claim and its content contains the DID
    async fn published(&self, assertion: &TrustAssertion, document: &OrgJson) -> Result<(), String> {
        let claim = assertion.claim.trim().trim_end_matches('/');
        if !published_under(claim, &assertion.proof).map_err(|e| e.to_string())? {
            return Err(format!("proof \"{}\" is not published under \"{claim}\"", assertion.proof));
        }

        let preferred = if assertion.type_ == "social" { FetchKind::Social } else { FetchKind::Domain };
        let method = self
            .resolver
            .fetchers()
            .select_any(&[preferred, FetchKind::Http], &assertion.proof)
            .map_err(|e| e.to_string())?;
        let body = self.fetch(method, &assertion.proof).await?;

        if !self.mentions_did(&String::from_utf8_lossy(&body), document) {
            return Err("DID not found in the proof content".to_string());
        }
        Ok(())
    }

    // the credential named by the proof is held by its issuer and states
    // this DID and claim
    async fn credential(&self, assertion: &TrustAssertion) -> Result<(), String> {
        let options = self.resolver.options();
        let network = &options.default_network;
        let proof = assertion.proof.trim();

        let (issuer_did, _) = split_fragment(proof);
        let issuer = DidReference::parse_with_default(issuer_did, network).map_err(|e| e.to_string())?;
        let issuer_did = issuer.did();

        if let Some(trusted) = &options.trusted_issuers {
            if !trusted.iter().any(|t| canonical(t, network).as_deref() == Some(issuer_did.as_str())) {
                return Err(format!("issuer \"{issuer_did}\" is not trusted"));
            }
        }

        tracing::debug!("resolving trust issuer {issuer_did} for {}", self.did);
        let frame = self.ctx.spawn(&issuer_did, self.did);
        let chain_id = issuer.network.clone();
        let resolved = self.resolver.resolve_in(issuer, frame).await;
        if let Some(error) = resolved.error() {
            return Err(format!("issuer resolution error: {error}"));
        }
        let (Some(issuer_document), Some(issuer_record)) = (resolved.document(), resolved.record())
        else {
            return Err("unable to resolve issuer ORG.JSON".to_string());
        };

        let Some(credential) = issuer_document.credentials().iter().find(|c| c["id"] == proof) else {
            return Err(format!("credential \"{proof}\" not found in issuer ORG.JSON"));
        };

        let Some(method_id) = credential["proof"]["verificationMethod"].as_str() else {
            return Err("credential proof has no verification method".to_string());
        };
        let method = find_method(&issuer_document, method_id, network).map_err(|e| e.to_string())?;
        let chain = self.resolver.chains().get(&chain_id).map_err(|e| e.to_string())?;
        let owner = BlockchainAccountId::new(&issuer_record.owner, &chain.blockchain_type, &chain.id);
        let key = key_material(method, &owner).map_err(|e| e.to_string())?;

        let subject = self
            .resolver
            .verifier()
            .verify(credential, &key)
            .await
            .map_err(|e| format!("invalid credential signature: {e}"))?;

        self.check_subject(credential, &subject, &assertion.claim)
    }

    fn check_subject(&self, credential: &Value, subject: &Value, claim: &str) -> Result<(), String> {
        let network = &self.resolver.options().default_network;
        let is_this_did =
            |v: &Value| v.as_str().and_then(|id| canonical(id, network)).as_deref() == Some(self.did);

        if let Some(holder) = credential.get("holder") {
            let holder_id = holder.get("id").unwrap_or(holder);
            if !is_this_did(holder_id) {
                return Err(format!("unknown holder id {holder_id}"));
            }
        }
        if !is_this_did(&subject["id"]) {
            return Err(format!("unknown credential subject id {}", subject["id"]));
        }
        if subject["claim"].as_str() != Some(claim) {
            return Err(format!("unknown credential subject claim {}", subject["claim"]));
        }
        Ok(())
    }

    async fn fetch(&self, method: &FetchMethod, uri: &str) -> Result<Vec<u8>, String> {
        let limit: Duration = self.resolver.options().fetch_timeout();
        timeout(limit, method.fetch(uri))
            .await
            .map_err(|_| format!("{uri} timed out after {} ms", limit.as_millis()))?
            .map_err(|e| e.to_string())
    }

    // the DID as written in the document, or in canonical form
    fn mentions_did(&self, content: &str, document: &OrgJson) -> bool {
        content.contains(self.did) || (!document.id.is_empty() && content.contains(&document.id))
    }
}

// `proof` is an http(s) URL on the claimed host or profile: the claim must
// end at a path, query, fragment or port
fn published_under(claim: &str, proof: &str) -> Result<bool, regex::Error> {
    let pattern = format!(r"^https?://(www\.)?{}(?:[/?#:]|$)", regex::escape(claim));
    Ok(Regex::new(&pattern)?.is_match(proof))
}
