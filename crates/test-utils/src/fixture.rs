//! ORG.JSON fixtures.

use orgid_resolver::{OrganizationRecord, document_hash};
use serde_json::{Value, json};

use crate::chain::Registry;
use crate::docstore::DocStore;
use crate::verifier::signature;

/// Builds an organization: its ORG.JSON credential and on-chain record.
///
/// The organization id and owner are derived from a seed so fixtures are
/// stable across runs. By default the credential is signed by `#key1`, an
/// `EcdsaSecp256k1RecoveryMethod2020` method bound to the owner.
#[derive(Clone, Debug)]
pub struct OrgFixture {
    network: String,
    organization_id: String,
    owner: String,
    methods: Vec<Value>,
    delegates: Vec<String>,
    registered: Vec<String>,
    assertions: Vec<Value>,
    credentials: Vec<Value>,
    signer: Option<(String, String)>,
    hashed: bool,
}

impl OrgFixture {
    /// A fixture on network `1` derived from `seed`.
    #[must_use]
    pub fn new(seed: &str) -> Self {
        let owner = document_hash(format!("owner:{seed}").as_bytes());
        Self {
            network: "1".into(),
            organization_id: document_hash(seed.as_bytes()),
            owner: owner[..42].to_string(),
            methods: Vec::new(),
            delegates: Vec::new(),
            registered: Vec::new(),
            assertions: Vec::new(),
            credentials: Vec::new(),
            signer: None,
            hashed: true,
        }
    }

    /// Anchor the organization on `network`.
    #[must_use]
    pub fn network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    /// Add a verification method. A method with the id of `#key1` replaces
    /// the default one.
    #[must_use]
    pub fn method(mut self, method: Value) -> Self {
        self.methods.push(method);
        self
    }

    /// Declare `delegate`'s `#key1` in the document and on chain, and sign
    /// with it.
    #[must_use]
    pub fn delegate(self, delegate: &Self) -> Self {
        let method_id = delegate.method_id("key1");
        self.declare_delegate(&method_id)
            .register_delegate(&method_id)
            .signed_by(&method_id, &delegate.account_id())
    }

    /// List `method_id` in `capabilityDelegation`.
    #[must_use]
    pub fn declare_delegate(mut self, method_id: &str) -> Self {
        self.delegates.push(method_id.to_string());
        self
    }

    /// Register `method_id` as a delegate on chain.
    #[must_use]
    pub fn register_delegate(mut self, method_id: &str) -> Self {
        self.registered.push(method_id.to_string());
        self
    }

    /// Name `method_id` as the credential signer and sign with `key`.
    #[must_use]
    pub fn signed_by(mut self, method_id: &str, key: &str) -> Self {
        self.signer = Some((method_id.to_string(), key.to_string()));
        self
    }

    /// Add a trust assertion.
    #[must_use]
    pub fn assertion(mut self, type_: &str, claim: &str, proof: &str) -> Self {
        self.assertions.push(json!({"type": type_, "claim": claim, "proof": proof}));
        self
    }

    /// Add a `trust.assertions` entry as is.
    #[must_use]
    pub fn assertion_entry(mut self, entry: Value) -> Self {
        self.assertions.push(entry);
        self
    }

    /// Hold a credential in `trust.credentials`.
    #[must_use]
    pub fn hold(mut self, credential: Value) -> Self {
        self.credentials.push(credential);
        self
    }

    /// Leave the document hash off the on-chain record.
    #[must_use]
    pub const fn unhashed(mut self) -> Self {
        self.hashed = false;
        self
    }

    /// The organization's DID.
    #[must_use]
    pub fn did(&self) -> String {
        format!("did:orgid:{}:{}", self.network, self.organization_id)
    }

    /// The organization id.
    #[must_use]
    pub fn organization_id(&self) -> &str {
        &self.organization_id
    }

    /// The owner address.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The owner as a CAIP-10 account id.
    #[must_use]
    pub fn account_id(&self) -> String {
        format!("eip155:{}:{}", self.network, self.owner)
    }

    /// A verification method id of this organization.
    #[must_use]
    pub fn method_id(&self, fragment: &str) -> String {
        format!("{}#{fragment}", self.did())
    }

    /// Where the ORG.JSON is published.
    #[must_use]
    pub fn uri(&self) -> String {
        format!("https://orgs.example/{}.json", self.organization_id)
    }

    /// Issue a credential stating `claim` about `subject`, identified by the
    /// `name` fragment of this organization's DID.
    #[must_use]
    pub fn issue(&self, subject: &str, claim: &str, name: &str) -> Value {
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "id": self.method_id(name),
            "type": ["VerifiableCredential"],
            "issuer": self.did(),
            "holder": {"id": subject},
            "credentialSubject": {"id": subject, "claim": claim},
            "proof": {
                "type": "EcdsaSecp256k1Signature2019",
                "verificationMethod": self.method_id("key1"),
                "jws": signature(&self.account_id())
            }
        })
    }

    /// The ORG.JSON document (credential subject).
    #[must_use]
    pub fn subject(&self) -> Value {
        let key1 = self.method_id("key1");
        let mut methods = Vec::new();
        if !self.methods.iter().any(|m| m["id"] == key1.as_str()) {
            methods.push(json!({
                "id": key1,
                "controller": self.did(),
                "type": "EcdsaSecp256k1RecoveryMethod2020",
                "blockchainAccountId": self.account_id()
            }));
        }
        methods.extend(self.methods.iter().cloned());

        let mut subject = json!({
            "@context": ["https://www.w3.org/ns/did/v1"],
            "id": self.did(),
            "created": "2021-03-10T12:00:00Z",
            "updated": "2021-06-01T08:30:00Z",
            "verificationMethod": methods,
            "legalEntity": {"legalName": "Example Travel Ltd"}
        });
        if !self.delegates.is_empty() {
            subject["capabilityDelegation"] = json!(self.delegates);
        }
        if !self.assertions.is_empty() || !self.credentials.is_empty() {
            subject["trust"] = json!({
                "assertions": self.assertions,
                "credentials": self.credentials
            });
        }
        subject
    }

    /// The signed ORG.JSON credential.
    #[must_use]
    pub fn credential(&self) -> Value {
        let (method_id, key) =
            self.signer.clone().unwrap_or_else(|| (self.method_id("key1"), self.account_id()));
        json!({
            "@context": ["https://www.w3.org/2018/credentials/v1"],
            "id": self.method_id("orgjson"),
            "type": ["VerifiableCredential", "OrgJson"],
            "issuer": self.did(),
            "credentialSubject": self.subject(),
            "proof": {
                "type": "EcdsaSecp256k1Signature2019",
                "created": "2021-06-01T08:30:00Z",
                "proofPurpose": "assertionMethod",
                "verificationMethod": method_id,
                "jws": signature(&key)
            }
        })
    }

    /// The credential as published.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.credential().to_string().into_bytes()
    }

    /// The on-chain record.
    #[must_use]
    pub fn record(&self) -> OrganizationRecord {
        OrganizationRecord {
            organization_id: self.organization_id.clone(),
            owner: self.owner.clone(),
            document_uri: self.uri(),
            document_hash: self.hashed.then(|| document_hash(&self.bytes())),
            delegate_ids: self.registered.clone(),
            is_active: true,
            created_at: Some("2021-03-10T12:00:00Z".into()),
            ..OrganizationRecord::default()
        }
    }

    /// Publish the credential to `store` and register the record.
    pub fn publish(&self, registry: &Registry, store: &DocStore) {
        store.put(&self.uri(), self.bytes());
        registry.register(self.record());
    }
}
