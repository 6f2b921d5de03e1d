//! # Signer Resolution
//!
//! Decides whether the verification method named in an ORG.JSON proof may
//! sign for the organization and returns its key material.
//!
//! A method of the organization itself must be bound to the on-chain owner.
//! Any other method is a capability delegate: it must be declared in the
//! document's `capabilityDelegation` and registered on chain, and its own
//! DID is resolved (and so fully verified) before its key is used.

use std::str::FromStr;

use super::{OrgIdResolver, ResolutionContext};
use crate::chain::{ChainConfig, OrganizationRecord};
use crate::credential::{BlockchainAccountId, PublicKeyMaterial};
use crate::did::{DidReference, canonical, split_fragment};
use crate::document::{MethodType, OrgJson, VerificationMethod};
use crate::error::Error;

/// Resolves the signer of one ORG.JSON document.
pub struct SignerResolver<'a> {
    resolver: &'a OrgIdResolver,
    ctx: &'a ResolutionContext,
    chain: &'a ChainConfig,
    record: &'a OrganizationRecord,
    did: &'a DidReference,
    document: &'a OrgJson,
}

impl<'a> SignerResolver<'a> {
    /// Create a resolver for the document of `did`.
    pub const fn new(
        resolver: &'a OrgIdResolver, ctx: &'a ResolutionContext, chain: &'a ChainConfig,
        record: &'a OrganizationRecord, did: &'a DidReference, document: &'a OrgJson,
    ) -> Self {
        Self {
            resolver,
            ctx,
            chain,
            record,
            did,
            document,
        }
    }

    /// Key material of `method_id`, if it may sign the document.
    ///
    /// # Errors
    ///
    /// Returns the first failed delegation or method check.
    pub async fn resolve(&self, method_id: &str) -> crate::Result<PublicKeyMaterial> {
        let network = &self.resolver.options().default_network;
        let (method_did, _) = split_fragment(method_id);
        let signer = DidReference::parse_with_default(method_did, network);

        if signer.as_ref().is_ok_and(|s| s.same_subject(self.did)) {
            let method = find_method(self.document, method_id, network)?;
            let owner = BlockchainAccountId::new(&self.record.owner, &self.chain.blockchain_type, &self.chain.id);
            return key_material(method, &owner);
        }

        if !self.document.delegates().any(|d| same_method(d, method_id, network)) {
            return Err(Error::DelegateNotDeclared(method_id.to_string()));
        }
        if !self.record.delegate_ids.iter().any(|d| same_method(d, method_id, network)) {
            return Err(Error::DelegateNotRegistered(method_id.to_string()));
        }

        let signer = signer.map_err(|e| Error::DelegateResolution(e.to_string()))?;
        self.delegate_key(signer, method_id).await
    }

    // resolve the delegate DID one level deeper and take the key from its
    // verified document
    async fn delegate_key(
        &self, delegate: DidReference, method_id: &str,
    ) -> crate::Result<PublicKeyMaterial> {
        tracing::debug!("resolving capability delegate {method_id} at depth {}", self.ctx.depth() + 1);

        let network = &self.resolver.options().default_network;
        let frame = self.ctx.descend(&self.did.did());
        let chain_id = delegate.network.clone();
        let result = self.resolver.resolve_in(delegate, frame).await;

        if let Some(error) = result.error() {
            return Err(Error::DelegateResolution(error.to_string()));
        }
        let (Some(document), Some(record)) = (result.document(), result.record()) else {
            return Err(Error::DelegateResolution(format!(
                "Unable to resolve verificationMethod \"{method_id}\" of delegate"
            )));
        };

        let chain = self.resolver.chains().get(&chain_id)?;
        let method = find_method(&document, method_id, network)?;
        let owner = BlockchainAccountId::new(&record.owner, &chain.blockchain_type, &chain.id);
        key_material(method, &owner)
    }
}

/// Key material of `method`, checking revocation, type and, for recovery
/// methods, the bound account against `owner`.
///
/// # Errors
///
/// Returns [`Error::MethodRevoked`], [`Error::UnsupportedMethodType`],
/// [`Error::MissingBlockchainAccountId`],
/// [`Error::VerificationMethodMismatch`] or [`Error::MissingKeyMaterial`].
pub fn key_material(
    method: &VerificationMethod, owner: &BlockchainAccountId,
) -> crate::Result<PublicKeyMaterial> {
    if let Some(revocation) = &method.verification_method_revocation {
        return Err(Error::MethodRevoked {
            id: method.id.clone(),
            invalidity_date: revocation.invalidity_date.clone(),
        });
    }

    match MethodType::from_str(&method.type_)? {
        MethodType::EcdsaSecp256k1RecoveryMethod2020 => {
            let Some(account_id) = &method.blockchain_account_id else {
                return Err(Error::MissingBlockchainAccountId);
            };
            let account = BlockchainAccountId::from_str(account_id)?;
            if !owner.matches(&account) {
                return Err(Error::VerificationMethodMismatch {
                    expected: owner.to_string(),
                    actual: account.to_string(),
                });
            }
            Ok(PublicKeyMaterial::BlockchainAccountId(account_id.clone()))
        }
        MethodType::JsonWebKey2020 | MethodType::EcdsaSecp256k1VerificationKey2019 => {
            if let Some(account_id) = &method.blockchain_account_id {
                return Ok(PublicKeyMaterial::BlockchainAccountId(account_id.clone()));
            }
            method
                .public_key_jwk
                .clone()
                .map(PublicKeyMaterial::Jwk)
                .ok_or_else(|| Error::MissingKeyMaterial(method.id.clone()))
        }
    }
}

/// The verification method `method_id` of `document`.
///
/// # Errors
///
/// Returns [`Error::MethodNotFound`] when the document does not define it.
pub fn find_method<'d>(
    document: &'d OrgJson, method_id: &str, network: &str,
) -> crate::Result<&'d VerificationMethod> {
    document
        .verification_method(method_id)
        .or_else(|| document.verification_method.iter().find(|vm| same_method(&vm.id, method_id, network)))
        .ok_or_else(|| Error::MethodNotFound(method_id.to_string()))
}

// equal ids, or the same fragment of the same (canonical) DID
fn same_method(a: &str, b: &str, network: &str) -> bool {
    if a == b {
        return true;
    }
    let (a_did, a_fragment) = split_fragment(a);
    let (b_did, b_fragment) = split_fragment(b);
    a_fragment == b_fragment
        && canonical(a_did, network).is_some_and(|a| canonical(b_did, network) == Some(a))
}
