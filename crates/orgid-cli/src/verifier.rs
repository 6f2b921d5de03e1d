//! Credential checks available to the command line resolver.

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use orgid_resolver::{CredentialVerifier, PublicKeyMaterial};
use serde_json::Value;

/// Checks credential structure only. Signature verification is left to the
/// host deploying the resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct UncheckedSignatures;

#[async_trait]
impl CredentialVerifier for UncheckedSignatures {
    async fn verify(&self, credential: &Value, key: &PublicKeyMaterial) -> anyhow::Result<Value> {
        let proof = credential.get("proof").ok_or_else(|| anyhow!("credential has no proof"))?;
        if proof.get("jws").and_then(Value::as_str).map_or(true, str::is_empty) {
            bail!("credential proof has no jws");
        }
        let Some(subject) = credential.get("credentialSubject") else {
            bail!("credential has no credentialSubject");
        };

        tracing::warn!("signature of {} not checked against {key}", subject["id"]);
        Ok(subject.clone())
    }
}
