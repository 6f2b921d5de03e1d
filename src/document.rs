//! # ORG.JSON
//!
//! An ORG.JSON document is published as a Verifiable Credential. The
//! credential subject is the organization's DID document. Verification
//! methods, capability delegates and trust assertions are read from the
//! subject.
//!
//! Members not modelled here are kept (flattened) so the document returned
//! from resolution is the complete subject.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::{Kind, OneMany};
use crate::error::Error;

/// Credential type an ORG.JSON VC must carry.
pub const ORG_JSON_TYPE: &str = "OrgJson";

/// ORG.JSON Verifiable Credential envelope.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrgJsonCredential {
    /// The JSON-LD context.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<OneMany<Kind<Value>>>,

    /// Credential identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Credential types. Must include `OrgJson`.
    #[serde(rename = "type", default)]
    pub type_: OneMany<String>,

    /// Credential issuer, as a DID or an object with an `id`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Kind<Value>>,

    /// The organization's DID document.
    #[serde(default)]
    pub credential_subject: OrgJson,

    /// Credential proof.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,

    /// Remaining credential members.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrgJsonCredential {
    /// Whether the credential carries the `OrgJson` type.
    #[must_use]
    pub fn is_org_json(&self) -> bool {
        self.type_.contains(&ORG_JSON_TYPE.to_string())
    }

    /// The verification method named by the proof, if any.
    #[must_use]
    pub fn proof_method(&self) -> Option<&str> {
        self.proof
            .as_ref()
            .and_then(|p| p.verification_method.as_deref())
            .filter(|vm| !vm.trim().is_empty())
    }
}

/// Credential proof.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Proof suite type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Proof creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Purpose of the proof.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof_purpose: Option<String>,

    /// Verification method id of the signer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<String>,

    /// Detached JWS.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jws: Option<String>,

    /// Remaining proof members.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The organization's DID document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrgJson {
    /// The JSON-LD context.
    #[serde(rename = "@context", default, skip_serializing_if = "Option::is_none")]
    pub context: Option<OneMany<Kind<Value>>>,

    /// The organization DID.
    pub id: String,

    /// Creation timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    /// Last update timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,

    /// Deactivation flag or timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deactivated: Option<Value>,

    /// Verification methods of the organization.
    #[serde(default)]
    pub verification_method: Vec<VerificationMethod>,

    /// Verification methods allowed to sign on behalf of the organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capability_delegation: Option<Vec<Kind<VerificationMethod>>>,

    /// Trust assertions and credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trust: Option<Trust>,

    /// Remaining document members.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OrgJson {
    /// Find a verification method by id.
    #[must_use]
    pub fn verification_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.verification_method.iter().find(|vm| vm.id == id)
    }

    /// Ids of declared capability delegates.
    pub fn delegates(&self) -> impl Iterator<Item = &str> {
        self.capability_delegation.iter().flatten().map(|d| match d {
            Kind::String(id) => id.as_str(),
            Kind::Object(vm) => vm.id.as_str(),
        })
    }

    /// Declared trust assertion entries, as published.
    #[must_use]
    pub fn assertions(&self) -> &[Value] {
        self.trust.as_ref().map_or(&[], |t| t.assertions.as_slice())
    }

    /// Credentials the organization holds about others.
    #[must_use]
    pub fn credentials(&self) -> &[Value] {
        self.trust.as_ref().map_or(&[], |t| t.credentials.as_slice())
    }

    /// Whether the document is marked as deactivated.
    #[must_use]
    pub fn is_deactivated(&self) -> bool {
        match &self.deactivated {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }
}

/// A verification method entry.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMethod {
    /// Verification method id (a DID URL).
    pub id: String,

    /// DID of the controller.
    #[serde(default)]
    pub controller: String,

    /// Method type. Checked against [`MethodType`] when used as a signer.
    #[serde(rename = "type")]
    pub type_: String,

    /// CAIP-10 (or legacy `address@type:chainId`) account id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blockchain_account_id: Option<String>,

    /// Public key as a JWK.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key_jwk: Option<Value>,

    /// Present when the method has been revoked.
    #[serde(alias = "revocation", skip_serializing_if = "Option::is_none")]
    pub verification_method_revocation: Option<Revocation>,

    /// Remaining method members.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Revocation of a verification method.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Revocation {
    /// Revocation reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Date from which signatures are no longer valid.
    #[serde(default)]
    pub invalidity_date: String,
}

/// Verification method types accepted for signers.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum MethodType {
    /// Secp256k1 recovery method bound to a blockchain account.
    EcdsaSecp256k1RecoveryMethod2020,

    /// JSON Web Key (JWK), version 2020.
    JsonWebKey2020,

    /// Secp256k1 Verification Key, version 2019.
    EcdsaSecp256k1VerificationKey2019,
}

impl FromStr for MethodType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EcdsaSecp256k1RecoveryMethod2020" => Ok(Self::EcdsaSecp256k1RecoveryMethod2020),
            "JsonWebKey2020" => Ok(Self::JsonWebKey2020),
            "EcdsaSecp256k1VerificationKey2019" => Ok(Self::EcdsaSecp256k1VerificationKey2019),
            _ => Err(Error::UnsupportedMethodType(s.to_string())),
        }
    }
}

impl Display for MethodType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::EcdsaSecp256k1RecoveryMethod2020 => write!(f, "EcdsaSecp256k1RecoveryMethod2020"),
            Self::JsonWebKey2020 => write!(f, "JsonWebKey2020"),
            Self::EcdsaSecp256k1VerificationKey2019 => {
                write!(f, "EcdsaSecp256k1VerificationKey2019")
            }
        }
    }
}

/// Trust section of an ORG.JSON document.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Trust {
    /// Claims backed by external proofs. Entries are read one by one with
    /// [`TrustAssertion::from_entry`] so a malformed entry only fails itself.
    #[serde(default)]
    pub assertions: Vec<Value>,

    /// Credentials issued by this organization to others.
    #[serde(default)]
    pub credentials: Vec<Value>,
}

/// A claim backed by an external proof.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrustAssertion {
    /// Assertion type: `dns`, `domain`, `social` or `vc-proof`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The claim, e.g. a domain name or social profile.
    pub claim: String,

    /// Where the proof can be found.
    pub proof: String,

    /// Set after verification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

impl TrustAssertion {
    /// Read one `trust.assertions` entry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedAssertion`] when `type`, `claim` or `proof`
    /// is missing or not a string.
    pub fn from_entry(entry: &Value) -> crate::Result<Self> {
        let field = |name: &str| match &entry[name] {
            Value::String(s) => Ok(s.clone()),
            Value::Null => Err(Error::MalformedAssertion(format!("missing \"{name}\""))),
            other => Err(Error::MalformedAssertion(format!("\"{name}\" must be a string, found {other}"))),
        };
        Ok(Self {
            type_: field("type")?,
            claim: field("claim")?,
            proof: field("proof")?,
            verified: None,
        })
    }

    /// Whatever string members `entry` has, for reporting an entry that
    /// could not be read.
    #[must_use]
    pub fn lossy(entry: &Value) -> Self {
        let field = |name: &str| entry[name].as_str().unwrap_or_default().to_string();
        Self {
            type_: field("type"),
            claim: field("claim"),
            proof: field("proof"),
            verified: None,
        }
    }
}
