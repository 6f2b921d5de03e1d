//! Organization records served over HTTP by a registry gateway.

use anyhow::{Context, bail};
use async_trait::async_trait;
use orgid_resolver::{ChainLookup, OrganizationRecord};
use reqwest::StatusCode;
use url::Url;

/// Looks organizations up at `GET <provider>/<registry>/<organizationId>`.
/// A `404` means the registry does not know the organization.
#[derive(Clone, Debug)]
pub struct GatewayChain {
    client: reqwest::Client,
    provider: Url,
    registry: String,
}

impl GatewayChain {
    /// A lookup against the `registry` contract served by `provider`.
    pub fn new(provider: Url, registry: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            provider,
            registry: registry.trim_matches('/').to_string(),
        }
    }

    fn record_url(&self, organization_id: &str) -> anyhow::Result<Url> {
        let base = self.provider.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{}/{organization_id}", self.registry))
            .context("building registry gateway URL")
    }
}

#[async_trait]
impl ChainLookup for GatewayChain {
    async fn organization(&self, organization_id: &str) -> anyhow::Result<Option<OrganizationRecord>> {
        let url = self.record_url(organization_id)?;
        tracing::debug!("looking up {organization_id} at {url}");

        let res = self.client.get(url.clone()).send().await.with_context(|| format!("request to {url}"))?;
        match res.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let record = res.json::<OrganizationRecord>().await.context("decoding organization record")?;
                Ok(Some(record))
            }
            status => bail!("registry gateway returned {status}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_url() {
        let provider = Url::parse("https://gateway.example/api/").expect("should parse");
        let chain = GatewayChain::new(provider, "0x4b9d5e1a7c3f2b8d6e0a9c1f3b5d7e9a2c4f6b8d");
        let url = chain.record_url("0x01").expect("should build");
        assert_eq!(
            url.as_str(),
            "https://gateway.example/api/0x4b9d5e1a7c3f2b8d6e0a9c1f3b5d7e9a2c4f6b8d/0x01"
        );
    }
}
