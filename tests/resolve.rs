//! Tests for resolving self-signed ORG.JSON documents.

use insta::assert_json_snapshot as assert_snapshot;
use orgid_resolver::{
    CheckType, FetchKind, FetchMethod, JsonSchemaValidator, ResolverOptions, SchemaValidated,
    document_hash,
};
use serde_json::json;
use test_utils::{DocStore, MockVerifier, OrgFixture, Registry, Stalled};

// A published, self-signed ORG.JSON resolves to its credential subject.
#[tokio::test]
async fn self_signed() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(result.did, org.did());

    let document = result.did_document.as_ref().expect("should have document");
    assert_eq!(document["id"], org.did());
    assert_eq!(document["legalEntity"]["legalName"], "Example Travel Ltd");

    let metadata = result.did_document_metadata.as_ref().expect("should have metadata");
    assert_eq!(metadata.created.as_deref(), Some("2021-03-10T12:00:00Z"));
    assert_eq!(metadata.updated.as_deref(), Some("2021-06-01T08:30:00Z"));
    assert_eq!(result.record().map(|r| r.owner.as_str()), Some(org.owner()));
    assert_eq!(result.did_resolution_metadata.credential, Some(org.credential()));

    assert_snapshot!(result.did_resolution_metadata.checks, @r###"
    [
      {
        "type": "DID_SYNTAX",
        "passed": true,
        "errors": [],
        "warnings": []
      },
      {
        "type": "ORGID",
        "passed": true,
        "errors": [],
        "warnings": []
      },
      {
        "type": "DID_DOCUMENT",
        "passed": true,
        "errors": [],
        "warnings": []
      },
      {
        "type": "TRUST_ASSERTIONS",
        "errors": [],
        "warnings": []
      }
    ]
    "###);
}

// A DID without a network resolves against the default network.
#[tokio::test]
async fn default_network() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    org.publish(&registry, &store);

    let did = format!("did:orgid:{}", org.organization_id());
    let result = test_utils::resolver(&registry, &store).resolve(&did).await;
    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(result.did, org.did());
}

// Unparseable input and unknown networks are reported, never raised.
#[tokio::test]
async fn rejected_dids() {
    let registry = Registry::new();
    let store = DocStore::new();
    let resolver = test_utils::resolver(&registry, &store);
    let org = OrgFixture::new("acme");

    let result = resolver.resolve("not a did").await;
    assert_eq!(result.error(), Some("Invalid DID format: not a did"));
    assert!(result.did_document.is_none());
    assert!(result.did_document_metadata.is_none());

    let did = format!("did:orgid:1111:{}", org.organization_id());
    let result = resolver.resolve(&did).await;
    assert_eq!(result.error(), Some("Unsupported blockchain Id \"1111\""));

    let result = resolver.resolve(&org.did()).await;
    assert_eq!(result.error(), Some(format!("ORGiD \"{}\" not found", org.organization_id()).as_str()));
    assert_eq!(result.check(CheckType::OrgId).and_then(|c| c.passed), Some(false));
}

// Content that does not hash to the registered hash is rejected.
#[tokio::test]
async fn hash_mismatch() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    org.publish(&registry, &store);

    let mut tampered = org.credential();
    tampered["credentialSubject"]["legalEntity"]["legalName"] = json!("Someone Else Ltd");
    store.put(&org.uri(), tampered.to_string());

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    let error = result.error().expect("should fail");
    assert!(error.starts_with("Invalid DID Document hash"), "{error}");
    assert!(error.contains(&document_hash(&org.bytes())));
    assert!(result.did_document.is_none());
    assert_eq!(result.check(CheckType::OrgId).and_then(|c| c.passed), Some(true));
    assert_eq!(result.check(CheckType::DidDocument).and_then(|c| c.passed), Some(false));
}

// Without a registered hash the document still resolves, with a warning.
#[tokio::test]
async fn unhashed() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme").unhashed();
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert!(result.is_success(), "{:?}", result.error());

    let check = result.check(CheckType::OrgId).expect("should have check");
    assert_eq!(check.passed, Some(true));
    assert_eq!(
        check.warnings,
        vec!["ORG.JSON hash is not registered; document integrity relies on the VC proof only"]
    );
}

// The primary location is unavailable: the first backup is used.
#[tokio::test]
async fn backup_location() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");

    let mut record = org.record();
    record.document_uri = "https://down.example/org.json".into();
    record.document_uri_backups = vec![org.uri()];
    registry.register(record);
    store.put(&org.uri(), org.bytes());

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert!(result.is_success(), "{:?}", result.error());
}

// Every location fails: the joined errors are reported.
#[tokio::test]
async fn unreachable() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");

    let mut record = org.record();
    record.document_uri_backups = vec!["https://down.example/org.json".into()];
    registry.register(record);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    let error = result.error().expect("should fail");
    assert!(error.starts_with("Unable to fetch ORG.JSON: "), "{error}");
    assert!(error.contains(&org.uri()));
    assert!(error.contains("https://down.example/org.json"));
}

// A location that does not answer in time is reported as unreachable.
#[tokio::test]
async fn fetch_timeout() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    org.publish(&registry, &store);

    let slow = vec![FetchMethod::new("slow", FetchKind::Http, r"^https://orgs\.example/", Stalled)];
    let options = ResolverOptions {
        fetch_timeout_ms: 50,
        ..ResolverOptions::default()
    };
    let resolver = test_utils::builder_with(&registry, &store, slow)
        .options(options)
        .build()
        .expect("should build");

    let result = resolver.resolve(&org.did()).await;
    assert!(result.did_document.is_none());
    assert_eq!(
        result.error(),
        Some(format!("Unable to fetch ORG.JSON: {}: timed out after 50 ms", org.uri()).as_str())
    );
    assert_eq!(result.check(CheckType::DidDocument).and_then(|c| c.passed), Some(false));
}

// A document describing another organization is rejected.
#[tokio::test]
async fn id_mismatch() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    let other = OrgFixture::new("other");
    other.publish(&registry, &store);

    let mut record = org.record();
    record.document_uri = other.uri();
    record.document_hash = Some(document_hash(&other.bytes()));
    registry.register(record);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert_eq!(
        result.error(),
        Some(
            format!(
                "Invalid DID Document id. Expected to be: {}, but actual is: {}",
                org.did(),
                other.did()
            )
            .as_str()
        )
    );
}

// Content that is not an ORG.JSON credential is reported as such.
#[tokio::test]
async fn malformed_documents() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme").unhashed();
    org.publish(&registry, &store);
    let resolver = test_utils::resolver(&registry, &store);

    store.put(&org.uri(), "{\"credentialSubject\": ");
    let result = resolver.resolve(&org.did()).await;
    assert!(result.error().is_some_and(|e| e.starts_with("Malformed ORG.JSON: ")));

    let mut untyped = org.credential();
    untyped["type"] = json!(["VerifiableCredential"]);
    store.put(&org.uri(), untyped.to_string());
    let result = resolver.resolve(&org.did()).await;
    assert_eq!(result.error(), Some("VC must include \"OrgJson\" type"));

    let mut unsigned = org.credential();
    unsigned["proof"].as_object_mut().expect("should be object").remove("verificationMethod");
    store.put(&org.uri(), unsigned.to_string());
    let result = resolver.resolve(&org.did()).await;
    assert_eq!(result.error(), Some("Verification method definition not found in VC proof"));
}

// A proof that does not verify against the owner's key is rejected.
#[tokio::test]
async fn signature_invalid() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    let org = org.clone().signed_by(&org.method_id("key1"), "eip155:1:0xnot-the-owner");
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    let error = result.error().expect("should fail");
    assert!(error.starts_with("Invalid VC signature: "), "{error}");
}

// The signing method must be bound to the on-chain owner.
#[tokio::test]
async fn owner_mismatch() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    let impostor = "0x1111111111111111111111111111111111111111";
    let org = org.clone().method(json!({
        "id": org.method_id("key1"),
        "controller": org.did(),
        "type": "EcdsaSecp256k1RecoveryMethod2020",
        "blockchainAccountId": format!("eip155:1:{impostor}")
    }));
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert_eq!(
        result.error(),
        Some(
            format!(
                "Verification method blockchain account \"{}\" is expected but found \"eip155:1:{impostor}\" in the VC proof",
                org.account_id()
            )
            .as_str()
        )
    );
}

// A revoked method is never accepted, even when otherwise identical.
#[tokio::test]
async fn revoked_method() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    let org = org.clone().method(json!({
        "id": org.method_id("key1"),
        "controller": org.did(),
        "type": "EcdsaSecp256k1RecoveryMethod2020",
        "blockchainAccountId": org.account_id(),
        "verificationMethodRevocation": {
            "reason": "compromised",
            "invalidityDate": "2021-05-01T00:00:00Z"
        }
    }));
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert_eq!(
        result.error(),
        Some(
            format!(
                "Verification method \"{}\" is revoked at \"2021-05-01T00:00:00Z\"",
                org.method_id("key1")
            )
            .as_str()
        )
    );
}

// A proof naming a method the document does not define.
#[tokio::test]
async fn method_not_found() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    let org = org.clone().signed_by(&org.method_id("key9"), &org.account_id());
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert_eq!(
        result.error(),
        Some(format!("Verification method \"{}\" not found in ORG.JSON", org.method_id("key9")).as_str())
    );
}

// Schema problems fail strict resolution and are warnings otherwise.
#[tokio::test]
async fn schema_validation() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    org.publish(&registry, &store);

    let schema = json!({"type": "object", "required": ["organizationalUnit"]});
    let verifier = || {
        let validator = JsonSchemaValidator::new(&schema).expect("should compile");
        SchemaValidated::new(MockVerifier, validator)
    };

    let strict = test_utils::builder(&registry, &store).verifier(verifier()).build().expect("should build");
    let result = strict.resolve(&org.did()).await;
    let error = result.error().expect("should fail");
    assert!(error.starts_with("ORG.JSON schema validation: "), "{error}");
    assert!(error.contains("organizationalUnit"));

    let lenient = test_utils::builder(&registry, &store)
        .verifier(verifier())
        .options(ResolverOptions {
            strict_schema: false,
            ..ResolverOptions::default()
        })
        .build()
        .expect("should build");
    let result = lenient.resolve(&org.did()).await;
    assert!(result.is_success(), "{:?}", result.error());

    let check = result.check(CheckType::DidDocument).expect("should have check");
    assert_eq!(check.passed, Some(true));
    assert_eq!(check.warnings.len(), 1);
    assert!(check.warnings[0].starts_with("ORG.JSON schema validation: "));
}

// Inactive organizations resolve, with a warning.
#[tokio::test]
async fn inactive_organization() {
    let registry = Registry::new();
    let store = DocStore::new();
    let org = OrgFixture::new("acme");
    org.publish(&registry, &store);

    let mut record = org.record();
    record.is_active = false;
    registry.register(record);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert!(result.is_success(), "{:?}", result.error());
    let check = result.check(CheckType::OrgId).expect("should have check");
    assert_eq!(check.warnings, vec![format!("ORGiD \"{}\" is not active", org.organization_id())]);
}
