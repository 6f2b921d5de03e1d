//! # ORGiD Resolution
//!
//! [`OrgIdResolver::resolve`] turns a `did:orgid` DID into a verified ORG.JSON
//! document. Resolution moves through these steps, stopping at the first
//! fatal error:
//!
//! 1. parse the DID and look it up in the result caches,
//! 2. check the delegation depth and cycle guards,
//! 3. look up the organization record on the DID's chain,
//! 4. fetch the ORG.JSON credential and check its hash and id,
//! 5. resolve the signer named by the credential proof, recursing into
//!    delegate DIDs,
//! 6. validate the document schema and verify the credential proof,
//! 7. verify trust assertions (never fatal).
//!
//! Resolution never fails: errors are reported in the returned
//! [`ResolutionResult`].
//!
//! See [DID resolution](https://www.w3.org/TR/did-core/#did-resolution) for more.

mod checks;
mod context;
mod fetcher;
mod record;
mod result;
mod signer;

use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Instant;

use futures::future::BoxFuture;
use serde_json::Value;
use tracing::instrument;

pub use self::checks::{Check, CheckType, Checks};
pub use self::context::ResolutionContext;
pub use self::fetcher::{DocumentFetcher, FetchedDocument, document_hash};
pub use self::result::{
    ContentType, DID_RESOLUTION_CONTEXT, DocumentMetadata, ResolutionMetadata, ResolutionResult,
};
pub(crate) use self::signer::{find_method, key_material};
use self::signer::SignerResolver;
use crate::cache::{MemoryCache, ResolutionCache};
use crate::chain::{ChainConfig, ChainRegistry, OrganizationRecord};
use crate::credential::CredentialVerifier;
use crate::did::DidReference;
use crate::document::OrgJson;
use crate::error::Error;
use crate::fetch::{FetchMethod, FetchRegistry};
use crate::options::ResolverOptions;
use crate::trust::TrustVerifier;

/// Resolves `did:orgid` DIDs.
///
/// Cloning is cheap and clones share the result cache.
#[derive(Clone)]
pub struct OrgIdResolver {
    inner: Arc<Inner>,
}

struct Inner {
    chains: ChainRegistry,
    fetchers: FetchRegistry,
    verifier: Arc<dyn CredentialVerifier>,
    cache: Arc<dyn ResolutionCache>,
    options: ResolverOptions,
}

// Outcome of the fatal steps of resolution.
struct Verified {
    record: OrganizationRecord,
    credential: Value,
    subject: Value,
    document: OrgJson,
}

impl OrgIdResolver {
    /// Start building a resolver.
    #[must_use]
    pub fn builder() -> ResolverBuilder {
        ResolverBuilder::new()
    }

    /// The resolver options.
    #[must_use]
    pub fn options(&self) -> &ResolverOptions {
        &self.inner.options
    }

    /// The registered chains.
    #[must_use]
    pub fn chains(&self) -> &ChainRegistry {
        &self.inner.chains
    }

    /// The registered fetch methods.
    #[must_use]
    pub fn fetchers(&self) -> &FetchRegistry {
        &self.inner.fetchers
    }

    pub(crate) fn verifier(&self) -> &dyn CredentialVerifier {
        self.inner.verifier.as_ref()
    }

    /// Resolve `did`.
    ///
    /// Never fails: when resolution stops on an error the result has no
    /// document and `didResolutionMetadata.error` holds the error message.
    #[instrument(level = "debug", skip(self))]
    pub async fn resolve(&self, did: &str) -> ResolutionResult {
        let started = Instant::now();

        let reference = match DidReference::parse_with_default(did, &self.inner.options.default_network)
        {
            Ok(reference) => reference,
            Err(e) => {
                tracing::info!(code = e.code(), "resolution of {did} failed: {e}");
                return failure(did.trim(), &e, Checks::default(), started);
            }
        };

        let ctx = ResolutionContext::root(reference.did());
        let result = self.resolve_in(reference, ctx).await;

        match result.error() {
            Some(error) => tracing::info!("resolution of {did} failed: {error}"),
            None => tracing::debug!("resolved {did} in {} ms", result.did_resolution_metadata.duration_ms),
        }
        result
    }

    /// Resolve `reference` within the resolution frame `ctx`. Used for the
    /// top-level DID and, recursively, for delegates and trust issuers.
    pub(crate) fn resolve_in(
        &self, reference: DidReference, ctx: ResolutionContext,
    ) -> BoxFuture<'_, ResolutionResult> {
        Box::pin(async move {
            let started = Instant::now();
            let did = reference.did();

            if let Some(cached) = self.inner.cache.get(&did) {
                tracing::debug!("cache hit for {did}");
                return cached;
            }
            if let Some(cached) = ctx.cached(&did) {
                tracing::debug!("resolution cache hit for {did}");
                return cached;
            }

            let mut checks = Checks::default();
            checks.pass(CheckType::DidSyntax);

            match self.verify(&reference, &ctx, &mut checks).await {
                Ok(verified) => self.complete(&did, verified, &ctx, checks, started).await,
                Err(e) => {
                    tracing::debug!(code = e.code(), "{did} at depth {}: {e}", ctx.depth());
                    failure(&did, &e, checks, started)
                }
            }
        })
    }

    // Fatal steps: each error stops resolution.
    async fn verify(
        &self, reference: &DidReference, ctx: &ResolutionContext, checks: &mut Checks,
    ) -> crate::Result<Verified> {
        let options = &self.inner.options;
        let did = reference.did();

        if ctx.depth() > options.max_depth {
            return Err(Error::MaxDepthExceeded(options.max_depth));
        }
        if ctx.is_cycle(&did) {
            return Err(Error::DelegationCycleDetected(did));
        }

        let chain = self.inner.chains.get(&reference.network)?;
        let found = record::lookup(chain, &reference.organization_id, options.fetch_timeout()).await?;
        checks.warn_all(CheckType::OrgId, found.warnings);
        checks.pass(CheckType::OrgId);
        let record = found.record;

        let fetched = DocumentFetcher::new(&self.inner.fetchers, options.fetch_timeout())
            .fetch(&record, reference)
            .await?;
        let FetchedDocument { raw, credential, .. } = fetched;

        let method_id = credential.proof_method().ok_or(Error::MissingVerificationMethod)?;
        let key = SignerResolver::new(self, ctx, chain, &record, reference, &credential.credential_subject)
            .resolve(method_id)
            .await?;

        let problems = self.verifier().validate_schema(&raw["credentialSubject"]);
        if !problems.is_empty() {
            if options.strict_schema {
                return Err(Error::SchemaInvalid(problems.join("; ")));
            }
            checks.warn_all(
                CheckType::DidDocument,
                problems.into_iter().map(|p| format!("ORG.JSON schema validation: {p}")),
            );
        }

        let subject = self
            .verifier()
            .verify(&raw, &key)
            .await
            .map_err(|e| Error::SignatureInvalid(e.to_string()))?;
        checks.pass(CheckType::DidDocument);

        Ok(Verified {
            record,
            credential: raw,
            subject,
            document: credential.credential_subject,
        })
    }

    // Non-fatal steps, result assembly and caching.
    async fn complete(
        &self, did: &str, verified: Verified, ctx: &ResolutionContext, mut checks: Checks,
        started: Instant,
    ) -> ResolutionResult {
        let Verified {
            record,
            credential,
            subject,
            document,
        } = verified;
        let options = &self.inner.options;
        let mut metadata = DocumentMetadata::from_document(&document, record);

        let skip_trust = options.verify_trust && ctx.skip_trust(did, options.max_depth);
        if skip_trust {
            let warning = format!("Trust assertions of \"{did}\" not verified: trust claim recursion");
            tracing::warn!("{warning}");
            checks.warn(CheckType::TrustAssertions, warning);
        } else if options.verify_trust {
            let report = TrustVerifier::new(self, ctx, did).verify(&document).await;
            checks.set(CheckType::TrustAssertions, report.passed(), report.errors);
            checks.warn_all(CheckType::TrustAssertions, report.warnings);
            if !report.assertions.is_empty() {
                metadata.trust_assertions = Some(report.assertions);
            }
        }

        let mut result = ResolutionResult::new(did);
        result.did_document = Some(subject);
        result.did_document_metadata = Some(metadata);
        result.did_resolution_metadata.credential = Some(credential);
        result.did_resolution_metadata.checks = checks.into_vec();
        let result = result.finish(started);

        if !skip_trust {
            self.inner.cache.insert(did, result.clone());
            ctx.remember(did, &result);
        }
        result
    }
}

impl Debug for OrgIdResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrgIdResolver")
            .field("chains", &self.inner.chains)
            .field("fetchers", &self.inner.fetchers)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

fn failure(did: &str, error: &Error, mut checks: Checks, started: Instant) -> ResolutionResult {
    checks.fail_with(error);

    let mut result = ResolutionResult::new(did);
    result.did_resolution_metadata.error = Some(error.to_string());
    result.did_resolution_metadata.checks = checks.into_vec();
    result.finish(started)
}

/// Builds an [`OrgIdResolver`].
#[derive(Default)]
pub struct ResolverBuilder {
    chains: Vec<ChainConfig>,
    fetchers: Vec<FetchMethod>,
    verifier: Option<Arc<dyn CredentialVerifier>>,
    cache: Option<Arc<dyn ResolutionCache>>,
    options: ResolverOptions,
}

impl ResolverBuilder {
    /// A builder with default options and nothing registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain.
    ///
    /// Chain to register multiple chains.
    #[must_use]
    pub fn chain(mut self, chain: ChainConfig) -> Self {
        self.chains.push(chain);
        self
    }

    /// Register a fetch method.
    ///
    /// Chain to register multiple fetch methods.
    #[must_use]
    pub fn fetcher(mut self, method: FetchMethod) -> Self {
        self.fetchers.push(method);
        self
    }

    /// Set the credential verifier.
    #[must_use]
    pub fn verifier(mut self, verifier: impl CredentialVerifier + 'static) -> Self {
        self.verifier = Some(Arc::new(verifier));
        self
    }

    /// Set the result cache. Defaults to a [`MemoryCache`] without expiry.
    #[must_use]
    pub fn cache(mut self, cache: Arc<dyn ResolutionCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the resolver options.
    #[must_use]
    pub fn options(mut self, options: ResolverOptions) -> Self {
        self.options = options;
        self
    }

    /// Build the resolver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when the options are invalid or no
    /// chain, fetch method or verifier is configured, and
    /// [`Error::InvalidPlugin`] when a chain or fetch method is malformed.
    pub fn build(self) -> crate::Result<OrgIdResolver> {
        self.options.validate()?;

        if self.chains.is_empty() {
            return Err(Error::InvalidOptions("at least one chain must be configured".into()));
        }
        if self.fetchers.is_empty() {
            return Err(Error::InvalidOptions("at least one fetch method must be configured".into()));
        }
        let Some(verifier) = self.verifier else {
            return Err(Error::InvalidOptions("a credential verifier must be configured".into()));
        };

        let inner = Inner {
            chains: ChainRegistry::new(self.chains)?,
            fetchers: FetchRegistry::new(self.fetchers)?,
            verifier,
            cache: self.cache.unwrap_or_else(|| Arc::new(MemoryCache::new())),
            options: self.options,
        };
        Ok(OrgIdResolver { inner: Arc::new(inner) })
    }
}
