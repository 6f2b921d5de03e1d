//! # Errors
//!
//! Errors raised while configuring the resolver or while resolving a DID.
//!
//! Configuration errors are returned synchronously from the builder and the
//! registries. Resolution errors never escape [`crate::OrgIdResolver::resolve`]:
//! they are captured in the returned [`crate::ResolutionResult`], using the
//! error's display text as `didResolutionMetadata.error`.

use thiserror::Error;

use crate::resolve::CheckType;

/// Errors produced by the resolver.
#[derive(Error, Debug)]
pub enum Error {
    // ---- Configuration errors ----  //
    /// The resolver options are malformed.
    #[error("Resolver options validation: {0}")]
    InvalidOptions(String),

    /// A chain or fetch plugin registration is malformed.
    #[error("Invalid plugin configuration: {0}")]
    InvalidPlugin(String),

    // ---- DID syntax ----  //
    /// The DID does not match `did:orgid:[<network>:]<hash>[?query][#fragment]`.
    #[error("Invalid DID format: {0}")]
    InvalidDidFormat(String),

    /// The DID method is not `orgid`.
    #[error("Unsupported DID method: {0}")]
    UnsupportedMethod(String),

    // ---- Registry lookups ----  //
    /// No chain is registered for the DID network.
    #[error("Unsupported blockchain Id \"{0}\"")]
    UnsupportedChain(String),

    /// The chain plugin failed to answer.
    #[error("ORGiD lookup failed: {0}")]
    ChainLookup(String),

    /// The chain reports the organization does not exist.
    #[error("ORGiD \"{0}\" not found")]
    OrganizationNotFound(String),

    /// The URI is neither HTTP(S) nor an IPFS content identifier.
    #[error("Invalid URI: {0}")]
    UnsupportedUri(String),

    /// No fetch method is registered for the URI kind or pattern.
    #[error("Unsupported URI fetcher \"{0}\"")]
    UnsupportedFetcher(String),

    // ---- Document retrieval ----  //
    /// Every candidate URI failed. Carries the joined per-URI errors.
    #[error("Unable to fetch ORG.JSON: {0}")]
    DocumentUnreachable(String),

    /// The fetched bytes do not hash to the on-chain hash.
    #[error("Invalid DID Document hash. Expected to be: {expected}, but actual is: {actual}")]
    HashMismatch {
        /// Hash registered on chain.
        expected: String,
        /// Hash of the fetched content.
        actual: String,
    },

    /// The document `id` is not the resolved DID.
    #[error("Invalid DID Document id. Expected to be: {expected}, but actual is: {actual}")]
    IdMismatch {
        /// The DID being resolved.
        expected: String,
        /// The `id` found in the document.
        actual: String,
    },

    /// The fetched content is not a well-formed ORG.JSON credential.
    #[error("Malformed ORG.JSON: {0}")]
    MalformedDocument(String),

    /// The credential `type` list does not include `OrgJson`.
    #[error("VC must include \"OrgJson\" type")]
    InvalidCredentialType,

    // ---- Signer resolution ----  //
    /// The credential proof names no verification method.
    #[error("Verification method definition not found in VC proof")]
    MissingVerificationMethod,

    /// The signer is not listed in the document `capabilityDelegation`.
    #[error("Verification method \"{0}\" not defined as capability delegate in ORG.JSON")]
    DelegateNotDeclared(String),

    /// The signer is not in the on-chain delegate allow-list.
    #[error("Verification method \"{0}\" not registered as capability delegate in ORGID")]
    DelegateNotRegistered(String),

    /// Resolving the delegate DID failed.
    #[error("Delegate resolution error: {0}")]
    DelegateResolution(String),

    /// The delegation chain is deeper than allowed.
    #[error("Maximum depth \"{0}\" of capability delegation is reached")]
    MaxDepthExceeded(usize),

    /// The delegation chain revisits a DID.
    #[error("Capability delegation recursion detected at \"{0}\"")]
    DelegationCycleDetected(String),

    /// The signer is not defined in the owning document.
    #[error("Verification method \"{0}\" not found in ORG.JSON")]
    MethodNotFound(String),

    /// The signer has been revoked.
    #[error("Verification method \"{id}\" is revoked at \"{invalidity_date}\"")]
    MethodRevoked {
        /// Verification method id.
        id: String,
        /// Date from which the method is invalid.
        invalidity_date: String,
    },

    /// The verification method type is not supported.
    #[error("Unknown verificationMethod type {0}")]
    UnsupportedMethodType(String),

    /// A recovery method carries no `blockchainAccountId`.
    #[error(
        "Verification method of type \"EcdsaSecp256k1RecoveryMethod2020\" must include blockchainAccountId"
    )]
    MissingBlockchainAccountId,

    /// The `blockchainAccountId` cannot be parsed.
    #[error("Invalid blockchainAccountId: {0}")]
    InvalidBlockchainAccountId(String),

    /// The `blockchainAccountId` does not match the on-chain owner and chain.
    #[error(
        "Verification method blockchain account \"{expected}\" is expected but found \"{actual}\" in the VC proof"
    )]
    VerificationMethodMismatch {
        /// Owner account on the resolving chain.
        expected: String,
        /// Account declared by the verification method.
        actual: String,
    },

    /// The verification method has neither `blockchainAccountId` nor
    /// `publicKeyJwk`.
    #[error("Verification method \"{0}\" does not define public key material")]
    MissingKeyMaterial(String),

    // ---- Credential verification ----  //
    /// The credential proof does not verify.
    #[error("Invalid VC signature: {0}")]
    SignatureInvalid(String),

    /// The document fails schema validation.
    #[error("ORG.JSON schema validation: {0}")]
    SchemaInvalid(String),

    // ---- Trust assertions (never fatal) ----  //
    /// Trust assertion `type` is not one of `dns`, `domain`, `social`,
    /// `vc-proof`.
    #[error("Unknown trust assertion type \"{0}\"")]
    UnknownAssertionType(String),

    /// A trust assertion entry is missing `type`, `claim` or `proof`.
    #[error("Malformed trust assertion: {0}")]
    MalformedAssertion(String),

    /// A trust assertion could not be verified.
    #[error("Trust assertion \"{claim}\" not verified: {reason}")]
    AssertionNotVerified {
        /// The assertion claim.
        claim: String,
        /// Why verification failed.
        reason: String,
    },

    /// Any other error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// DID resolution error code, as used by W3C DID resolution metadata.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidOptions(_) | Self::InvalidPlugin(_) => "invalidOptions",
            Self::InvalidDidFormat(_) => "invalidDid",
            Self::UnsupportedMethod(_) | Self::UnsupportedChain(_) => "methodNotSupported",
            Self::OrganizationNotFound(_) | Self::MethodNotFound(_) => "notFound",
            Self::UnsupportedUri(_) | Self::UnsupportedFetcher(_) => "representationNotSupported",
            Self::HashMismatch { .. }
            | Self::IdMismatch { .. }
            | Self::MalformedDocument(_)
            | Self::InvalidCredentialType
            | Self::SchemaInvalid(_) => "invalidDidDocument",
            Self::MissingVerificationMethod
            | Self::DelegateNotDeclared(_)
            | Self::DelegateNotRegistered(_)
            | Self::DelegateResolution(_)
            | Self::MaxDepthExceeded(_)
            | Self::DelegationCycleDetected(_)
            | Self::MethodRevoked { .. }
            | Self::UnsupportedMethodType(_)
            | Self::MissingBlockchainAccountId
            | Self::InvalidBlockchainAccountId(_)
            | Self::VerificationMethodMismatch { .. }
            | Self::MissingKeyMaterial(_)
            | Self::SignatureInvalid(_) => "invalidProof",
            Self::UnknownAssertionType(_)
            | Self::MalformedAssertion(_)
            | Self::AssertionNotVerified { .. } => "untrusted",
            Self::ChainLookup(_) | Self::DocumentUnreachable(_) | Self::Other(_) => {
                "internalError"
            }
        }
    }

    /// Human-readable description of the error.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// The check category a failure is reported under.
    #[must_use]
    pub const fn check_type(&self) -> CheckType {
        match self {
            Self::InvalidDidFormat(_) | Self::UnsupportedMethod(_) => CheckType::DidSyntax,
            Self::UnsupportedChain(_) | Self::ChainLookup(_) | Self::OrganizationNotFound(_) => {
                CheckType::OrgId
            }
            Self::UnknownAssertionType(_)
            | Self::MalformedAssertion(_)
            | Self::AssertionNotVerified { .. } => CheckType::TrustAssertions,
            _ => CheckType::DidDocument,
        }
    }

    /// Whether the error is a configuration error, raised before resolution.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidOptions(_) | Self::InvalidPlugin(_))
    }
}
