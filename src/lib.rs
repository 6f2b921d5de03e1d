//! # ORGiD Resolver
//!
//! Resolves `did:orgid` identifiers into verified ORG.JSON documents.
//!
//! An ORGiD is anchored in an on-chain registry. The registry record points
//! to an ORG.JSON document (a Verifiable Credential whose subject is the
//! organization's DID document) and, optionally, carries its hash. Resolution
//! looks the record up, fetches and checks the document, verifies its proof
//! (following capability delegation to other ORGiDs) and verifies the
//! organization's trust assertions.
//!
//! Chains, fetch methods and the credential verifier are supplied by the
//! caller:
//!
//! ```rust,ignore
//! let resolver = OrgIdResolver::builder()
//!     .chain(ChainConfig::new("1", "eip155", registry))
//!     .fetcher(HttpFetcher::new().method())
//!     .fetcher(IpfsFetcher::new(DEFAULT_IPFS_GATEWAY).method())
//!     .verifier(verifier)
//!     .build()?;
//!
//! let result = resolver.resolve("did:orgid:1:0x6d98...b0b6").await;
//! ```

pub mod cache;
pub mod chain;
pub mod core;
pub mod credential;
pub mod did;
pub mod document;
mod error;
pub mod fetch;
pub mod options;
pub mod resolve;
mod trust;
pub mod uri;

pub use self::cache::{MemoryCache, NoCache, ResolutionCache};
pub use self::chain::{ChainConfig, ChainLookup, ChainRegistry, OrganizationRecord};
pub use self::credential::{
    BlockchainAccountId, CredentialVerifier, JsonSchemaValidator, PublicKeyMaterial, SchemaValidated,
};
pub use self::did::DidReference;
pub use self::document::{OrgJson, OrgJsonCredential, TrustAssertion, VerificationMethod};
pub use self::error::Error;
pub use self::fetch::http::{
    DEFAULT_DNS_ENDPOINT, DEFAULT_IPFS_GATEWAY, DnsFetcher, HttpFetcher, IpfsFetcher,
};
pub use self::fetch::{Fetch, FetchMethod, FetchRegistry};
pub use self::options::ResolverOptions;
pub use self::resolve::{
    Check, CheckType, DocumentMetadata, OrgIdResolver, ResolutionMetadata, ResolutionResult,
    ResolverBuilder, document_hash,
};
pub use self::trust::TrustReport;
pub use self::uri::FetchKind;

/// Result type for ORGiD resolution.
pub type Result<T, E = Error> = std::result::Result<T, E>;
