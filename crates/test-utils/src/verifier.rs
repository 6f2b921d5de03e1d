//! Credential verifier accepting mock signatures.

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use orgid_resolver::{CredentialVerifier, PublicKeyMaterial};
use serde_json::Value;

/// Accepts a credential when its `proof.jws` is `sig:<key>`, where `<key>`
/// is the key material the resolver selected.
#[derive(Clone, Copy, Debug, Default)]
pub struct MockVerifier;

/// The mock signature made with `key`.
#[must_use]
pub fn signature(key: &str) -> String {
    format!("sig:{key}")
}

#[async_trait]
impl CredentialVerifier for MockVerifier {
    async fn verify(&self, credential: &Value, key: &PublicKeyMaterial) -> anyhow::Result<Value> {
        let jws = credential["proof"]["jws"].as_str().ok_or_else(|| anyhow!("proof has no jws"))?;
        if jws != signature(&key.to_string()) {
            bail!("signature does not match key {key}");
        }
        Ok(credential["credentialSubject"].clone())
    }
}
