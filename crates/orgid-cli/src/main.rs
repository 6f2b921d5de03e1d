//! `orgid`: resolve one `did:orgid` DID and print the resolution result.

mod gateway;
mod verifier;

use anyhow::Result;
use clap::Parser;
use orgid_resolver::{
    ChainConfig, DEFAULT_DNS_ENDPOINT, DEFAULT_IPFS_GATEWAY, DnsFetcher, HttpFetcher, IpfsFetcher,
    OrgIdResolver, ResolverOptions,
};
use tracing_subscriber::EnvFilter;

use crate::gateway::GatewayChain;
use crate::verifier::UncheckedSignatures;

/// Resolve a `did:orgid` DID into a verified ORG.JSON document.
///
/// The resolution result is printed to stdout as JSON. Logs go to stderr and
/// are controlled with `RUST_LOG`.
#[derive(Debug, Parser)]
#[command(name = "orgid", version)]
struct Cli {
    /// The DID to resolve, e.g. `did:orgid:1:0x6d98...b0b6`.
    did: String,

    /// Base URL of the registry gateway serving organization records.
    #[arg(long, env = "ORGID_PROVIDER")]
    provider: url::Url,

    /// Address of the ORGiD registry contract.
    #[arg(long, env = "ORGID_REGISTRY")]
    registry: String,

    /// Network id of the registry, used for DIDs that do not name one.
    #[arg(long, env = "ORGID_NETWORK", default_value = "1")]
    network: String,

    /// Blockchain type used to match `blockchainAccountId`s.
    #[arg(long, default_value = "eip155")]
    chain_type: String,

    /// IPFS HTTP gateway.
    #[arg(long, default_value = DEFAULT_IPFS_GATEWAY)]
    ipfs_gateway: String,

    /// DNS-over-HTTPS JSON endpoint used for DNS trust assertions.
    #[arg(long, default_value = DEFAULT_DNS_ENDPOINT)]
    dns_endpoint: String,

    /// Maximum capability delegation depth.
    #[arg(long, default_value_t = 3)]
    max_depth: usize,

    /// Timeout for every lookup and fetch, in milliseconds.
    #[arg(long, default_value_t = 7000)]
    timeout_ms: u64,

    /// Skip trust assertion verification.
    #[arg(long)]
    no_trust: bool,
}

impl Cli {
    async fn handle(self) -> Result<()> {
        tracing::debug!("{self:?}");

        let options = ResolverOptions {
            max_depth: self.max_depth,
            fetch_timeout_ms: self.timeout_ms,
            default_network: self.network.clone(),
            verify_trust: !self.no_trust,
            ..ResolverOptions::default()
        };
        let chain = GatewayChain::new(self.provider, &self.registry);

        let resolver = OrgIdResolver::builder()
            .chain(ChainConfig::new(self.network, self.chain_type, chain))
            .fetcher(HttpFetcher::new().method())
            .fetcher(IpfsFetcher::new(self.ipfs_gateway).method())
            .fetcher(DnsFetcher::new(self.dns_endpoint).method())
            .verifier(UncheckedSignatures)
            .options(options)
            .build()?;

        let result = resolver.resolve(&self.did).await;
        println!("{}", serde_json::to_string_pretty(&result)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .with_writer(std::io::stderr)
        .init();

    Cli::parse().handle().await
}
