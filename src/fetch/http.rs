//! # HTTP Transports
//!
//! Ready-made fetch methods over HTTP: a plain GET fetcher, an IPFS gateway
//! fetcher and a DNS-over-HTTPS fetcher.

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use url::Url;

use super::{Fetch, FetchMethod};
use crate::uri::FetchKind;

/// Google public DNS JSON API.
pub const DEFAULT_DNS_ENDPOINT: &str = "https://dns.google.com/resolve";

/// Public IPFS gateway.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io";

/// DNS record types accepted in trust assertion proofs.
pub const DNS_RECORD_TYPES: [&str; 3] = ["TXT", "HINFO", "SPF"];

/// Fetches resources with an HTTP GET.
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
    bearer_token: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// The generic `http` fetch method.
    #[must_use]
    pub fn method(self) -> FetchMethod {
        FetchMethod::new("http", FetchKind::Http, "^https?://", self)
    }

    fn headers(&self) -> anyhow::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        if let Some(token) = &self.bearer_token {
            headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        let url = Url::parse(uri).map_err(|e| anyhow!("invalid URL {uri}: {e}"))?;
        get(&self.client, url, self.headers()?).await
    }
}

/// Fetches IPFS content through an HTTP gateway.
#[derive(Clone, Debug)]
pub struct IpfsFetcher {
    client: reqwest::Client,
    gateway: String,
}

impl Default for IpfsFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_IPFS_GATEWAY)
    }
}

impl IpfsFetcher {
    /// Create a fetcher using `gateway` (e.g. `https://ipfs.io`).
    #[must_use]
    pub fn new(gateway: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            gateway: gateway.into().trim_end_matches('/').to_string(),
        }
    }

    /// The `ipfs` fetch method.
    #[must_use]
    pub fn method(self) -> FetchMethod {
        FetchMethod::new("ipfs", FetchKind::Ipfs, "^[A-Za-z0-9]+$", self)
    }

    /// Gateway URL for a content identifier.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway and CID do not form a valid URL.
    pub fn gateway_url(&self, cid: &str) -> anyhow::Result<Url> {
        let cid = cid.trim_start_matches("ipfs://");
        Url::parse(&format!("{}/ipfs/{cid}", self.gateway)).map_err(Into::into)
    }
}

#[async_trait]
impl Fetch for IpfsFetcher {
    async fn fetch(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        let url = self.gateway_url(uri)?;
        get(&self.client, url, HeaderMap::new()).await
    }
}

/// Looks up DNS records with a DNS-over-HTTPS JSON API.
#[derive(Clone, Debug)]
pub struct DnsFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl Default for DnsFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_DNS_ENDPOINT)
    }
}

impl DnsFetcher {
    /// Create a fetcher using `endpoint` (e.g. `https://dns.google.com/resolve`).
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// The `dns` fetch method.
    #[must_use]
    pub fn method(self) -> FetchMethod {
        FetchMethod::new("dns", FetchKind::Dns, "^dns:", self)
    }

    /// Query URL for a `dns:<domain>?type=<TYPE>` URI.
    ///
    /// # Errors
    ///
    /// Returns an error when the URI is not a DNS query URI or the record
    /// type is not supported.
    pub fn query_url(&self, uri: &str) -> anyhow::Result<Url> {
        let Some((domain, record_type)) = parse_dns_uri(uri) else {
            bail!("invalid DNS query URI {uri}");
        };
        if !DNS_RECORD_TYPES.contains(&record_type.as_str()) {
            bail!("unsupported DNS record type {record_type}");
        }
        Url::parse_with_params(&self.endpoint, &[("name", domain), ("type", record_type)])
            .map_err(Into::into)
    }
}

#[async_trait]
impl Fetch for DnsFetcher {
    async fn fetch(&self, uri: &str) -> anyhow::Result<Vec<u8>> {
        let url = self.query_url(uri)?;
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/dns-json"));
        get(&self.client, url, headers).await
    }
}

/// Build the `dns:<domain>?type=<TYPE>` URI used to address DNS lookups.
#[must_use]
pub fn dns_uri(domain: &str, record_type: &str) -> String {
    format!("dns:{domain}?type={}", record_type.to_uppercase())
}

/// Split a `dns:<domain>?type=<TYPE>` URI. The type defaults to `TXT`.
#[must_use]
pub fn parse_dns_uri(uri: &str) -> Option<(String, String)> {
    let rest = uri.strip_prefix("dns:")?.trim_start_matches("//");
    let (domain, query) = rest.split_once('?').unwrap_or((rest, ""));
    if domain.is_empty() {
        return None;
    }
    let record_type = query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .find(|(k, _)| *k == "type")
        .map_or_else(|| "TXT".to_string(), |(_, v)| v.to_uppercase());
    Some((domain.to_string(), record_type))
}

#[derive(Deserialize)]
struct DnsResponse {
    #[serde(rename = "Answer", default)]
    answer: Vec<DnsAnswer>,
}

#[derive(Deserialize)]
struct DnsAnswer {
    #[serde(default)]
    data: String,
}

/// Record data from a DNS-over-HTTPS JSON response body.
///
/// # Errors
///
/// Returns an error when the body is not a DNS JSON response.
pub fn dns_answers(body: &[u8]) -> anyhow::Result<Vec<String>> {
    let response: DnsResponse = serde_json::from_slice(body)?;
    Ok(response.answer.into_iter().map(|a| a.data).collect())
}

async fn get(client: &reqwest::Client, url: Url, headers: HeaderMap) -> anyhow::Result<Vec<u8>> {
    let res = client.get(url.clone()).headers(headers).send().await.map_err(|e| {
        tracing::debug!("error sending request to {url}: {e}");
        anyhow!("request to {url} failed: {e}")
    })?;

    let status = res.status();
    if !status.is_success() {
        bail!("request to {url} returned {status}");
    }
    Ok(res.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dns_query() {
        let fetcher = DnsFetcher::default();
        let url = fetcher.query_url(&dns_uri("example.com", "txt")).expect("should build");
        assert_eq!(url.as_str(), "https://dns.google.com/resolve?name=example.com&type=TXT");

        assert!(fetcher.query_url("dns:example.com?type=MX").is_err());
        assert!(fetcher.query_url("https://example.com").is_err());
    }

    #[test]
    fn dns_default_type() {
        assert_eq!(parse_dns_uri("dns:example.com"), Some(("example.com".into(), "TXT".into())));
        assert_eq!(parse_dns_uri("dns:?type=TXT"), None);
    }

    #[test]
    fn answers() {
        let body = br#"{"Status":0,"Answer":[{"name":"example.com.","type":16,"data":"\"did:orgid:0x01\""}]}"#;
        let answers = dns_answers(body).expect("should parse");
        assert_eq!(answers, vec!["\"did:orgid:0x01\"".to_string()]);

        assert!(dns_answers(br#"{"Status":3}"#).expect("should parse").is_empty());
    }

    #[test]
    fn ipfs_gateway() {
        let fetcher = IpfsFetcher::new("https://gateway.example/");
        let url = fetcher
            .gateway_url("ipfs://QmPChd2hVbrJ6bfo3WBcTW4iZnpHm8TEzWkLHmLpXhF68A")
            .expect("should build");
        assert_eq!(url.as_str(), "https://gateway.example/ipfs/QmPChd2hVbrJ6bfo3WBcTW4iZnpHm8TEzWkLHmLpXhF68A");
    }

    #[test]
    fn bearer() {
        let headers = HttpFetcher::new().with_bearer_token("abc").headers().expect("should build");
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
    }
}
