//! # Credential Verification
//!
//! Signature verification of ORG.JSON credentials and schema validation of
//! ORG.JSON documents are provided by the host application through
//! [`CredentialVerifier`]. This module also parses blockchain account ids
//! used by `EcdsaSecp256k1RecoveryMethod2020` verification methods.

use std::fmt::{self, Display};
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Key material used to check a credential proof.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PublicKeyMaterial {
    /// A blockchain account id, for signatures recovered to an address.
    BlockchainAccountId(String),

    /// A public key in JWK format.
    Jwk(Value),
}

impl Display for PublicKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlockchainAccountId(id) => f.write_str(id),
            Self::Jwk(jwk) => write!(f, "{jwk}"),
        }
    }
}

/// Verifies credential proofs and validates document shape.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    /// Verify the proof of `credential` with `key`, returning the verified
    /// credential subject.
    ///
    /// An error means the signature is invalid.
    async fn verify(&self, credential: &Value, key: &PublicKeyMaterial) -> anyhow::Result<Value>;

    /// Validate an ORG.JSON document, returning every problem found.
    fn validate_schema(&self, _document: &Value) -> Vec<String> {
        Vec::new()
    }
}

/// Validates documents against a JSON Schema.
pub struct JsonSchemaValidator {
    schema: jsonschema::JSONSchema,
}

impl JsonSchemaValidator {
    /// Compile `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPlugin`] when the schema does not compile.
    pub fn new(schema: &Value) -> crate::Result<Self> {
        let schema = jsonschema::JSONSchema::compile(schema)
            .map_err(|e| Error::InvalidPlugin(format!("ORG.JSON schema failed to compile: {e}")))?;
        Ok(Self { schema })
    }

    /// Validate `document`, returning every problem found.
    #[must_use]
    pub fn validate(&self, document: &Value) -> Vec<String> {
        let Err(errors) = self.schema.validate(document) else {
            return Vec::new();
        };
        errors
            .map(|e| {
                let path = e.instance_path.to_string();
                if path.is_empty() { e.to_string() } else { format!("{path}: {e}") }
            })
            .collect()
    }
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

/// A [`CredentialVerifier`] that adds JSON Schema validation to another
/// verifier.
#[derive(Debug)]
pub struct SchemaValidated<V> {
    inner: V,
    validator: JsonSchemaValidator,
}

impl<V: CredentialVerifier> SchemaValidated<V> {
    /// Validate documents with `validator` and verify proofs with `inner`.
    pub const fn new(inner: V, validator: JsonSchemaValidator) -> Self {
        Self { inner, validator }
    }
}

#[async_trait]
impl<V: CredentialVerifier> CredentialVerifier for SchemaValidated<V> {
    async fn verify(&self, credential: &Value, key: &PublicKeyMaterial) -> anyhow::Result<Value> {
        self.inner.verify(credential, key).await
    }

    fn validate_schema(&self, document: &Value) -> Vec<String> {
        let mut problems = self.inner.validate_schema(document);
        problems.extend(self.validator.validate(document));
        problems
    }
}

/// A parsed blockchain account id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockchainAccountId {
    /// Account address.
    pub address: String,

    /// Blockchain type, e.g. `eip155`.
    pub blockchain_type: String,

    /// Chain id.
    pub chain_id: String,
}

impl BlockchainAccountId {
    /// Create an account id.
    pub fn new(
        address: impl Into<String>, blockchain_type: impl Into<String>, chain_id: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            blockchain_type: blockchain_type.into(),
            chain_id: chain_id.into(),
        }
    }

    /// Whether `other` names the same account. Addresses compare
    /// case-insensitively.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.address.eq_ignore_ascii_case(&other.address)
            && self.blockchain_type == other.blockchain_type
            && self.chain_id == other.chain_id
    }
}

impl FromStr for BlockchainAccountId {
    type Err = Error;

    // accepts `<type>:<chainId>:<address>` (CAIP-10) and `<address>@<type>:<chainId>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidBlockchainAccountId(s.to_string());

        if let Some((address, chain)) = s.split_once('@') {
            let (blockchain_type, chain_id) = chain.split_once(':').ok_or_else(invalid)?;
            if [address, blockchain_type, chain_id].iter().any(|p| p.is_empty() || p.contains(':')) {
                return Err(invalid());
            }
            return Ok(Self::new(address, blockchain_type, chain_id));
        }

        let parts = s.split(':').collect::<Vec<_>>();
        let [blockchain_type, chain_id, address] = parts.as_slice() else {
            return Err(invalid());
        };
        if [blockchain_type, chain_id, address].iter().any(|p| p.is_empty()) {
            return Err(invalid());
        }
        Ok(Self::new(*address, *blockchain_type, *chain_id))
    }
}

impl Display for BlockchainAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.blockchain_type, self.chain_id, self.address)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const OWNER: &str = "0x7b15197de7e8e8f6a8b95ee8bc9a2a8a4f2a1d5c";

    #[test]
    fn caip10() {
        let account = BlockchainAccountId::from_str(&format!("eip155:1337:{OWNER}")).expect("should parse");
        assert_eq!(account, BlockchainAccountId::new(OWNER, "eip155", "1337"));
        assert_eq!(account.to_string(), format!("eip155:1337:{OWNER}"));
    }

    #[test]
    fn legacy() {
        let account = BlockchainAccountId::from_str(&format!("{OWNER}@eip155:1")).expect("should parse");
        assert_eq!(account, BlockchainAccountId::new(OWNER, "eip155", "1"));
    }

    #[test]
    fn invalid() {
        for id in ["", "eip155:1", "@eip155:1", "0xabc@eip155", "a:b:c:d"] {
            assert!(
                matches!(BlockchainAccountId::from_str(id), Err(Error::InvalidBlockchainAccountId(_))),
                "{id}"
            );
        }
    }

    #[test]
    fn address_case() {
        let expected = BlockchainAccountId::new(OWNER, "eip155", "1");
        let actual = BlockchainAccountId::new(OWNER.to_uppercase().replace("0X", "0x"), "eip155", "1");
        assert!(expected.matches(&actual));
        assert!(!expected.matches(&BlockchainAccountId::new(OWNER, "eip155", "4")));
    }

    #[test]
    fn schema_problems() {
        let validator = JsonSchemaValidator::new(&json!({
            "type": "object",
            "required": ["id", "verificationMethod"],
            "properties": {
                "id": {"type": "string"},
                "verificationMethod": {"type": "array"}
            }
        }))
        .expect("should compile");

        assert!(validator.validate(&json!({"id": "did:orgid:0x01", "verificationMethod": []})).is_empty());

        let problems = validator.validate(&json!({"id": 1}));
        assert_eq!(problems.len(), 2);
    }

    #[test]
    fn bad_schema() {
        let result = JsonSchemaValidator::new(&json!({"type": 12}));
        assert!(matches!(result, Err(Error::InvalidPlugin(_))));
    }
}
