//! Mock chain registry, document store and credential verifier for testing.

mod chain;
mod docstore;
mod fixture;
mod verifier;

use orgid_resolver::{ChainConfig, FetchMethod, OrgIdResolver, ResolverBuilder, ResolverOptions};

pub use crate::chain::Registry;
pub use crate::docstore::{DocStore, Stalled};
pub use crate::fixture::OrgFixture;
pub use crate::verifier::{MockVerifier, signature};

/// A resolver builder wired to `registry` (as chain `1`) and `store`, with
/// the [`MockVerifier`].
#[must_use]
pub fn builder(registry: &Registry, store: &DocStore) -> ResolverBuilder {
    builder_with(registry, store, Vec::new())
}

/// Like [`builder`], with `methods` registered ahead of the store's own
/// fetch methods.
#[must_use]
pub fn builder_with(
    registry: &Registry, store: &DocStore, methods: Vec<FetchMethod>,
) -> ResolverBuilder {
    let mut builder = OrgIdResolver::builder()
        .chain(ChainConfig::new("1", "eip155", registry.clone()))
        .verifier(MockVerifier);
    for method in methods.into_iter().chain(store.methods()) {
        builder = builder.fetcher(method);
    }
    builder
}

/// A resolver with default options. See [`builder`].
///
/// # Panics
///
/// Panics if the resolver cannot be built.
#[must_use]
pub fn resolver(registry: &Registry, store: &DocStore) -> OrgIdResolver {
    resolver_with(registry, store, ResolverOptions::default())
}

/// A resolver with `options`. See [`builder`].
///
/// # Panics
///
/// Panics if the resolver cannot be built.
#[must_use]
pub fn resolver_with(registry: &Registry, store: &DocStore, options: ResolverOptions) -> OrgIdResolver {
    builder(registry, store).options(options).build().expect("should build resolver")
}
