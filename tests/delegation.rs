//! Tests for ORG.JSON documents signed by capability delegates.

use orgid_resolver::{CheckType, ResolverOptions};
use test_utils::{DocStore, OrgFixture, Registry};

// A delegate declared in the document and registered on chain may sign.
#[tokio::test]
async fn delegated_signer() {
    let registry = Registry::new();
    let store = DocStore::new();
    let agent = OrgFixture::new("agent");
    let org = OrgFixture::new("hotel").delegate(&agent);
    agent.publish(&registry, &store);
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert!(result.is_success(), "{:?}", result.error());
    assert_eq!(result.check(CheckType::DidDocument).and_then(|c| c.passed), Some(true));
}

// Delegate ids are compared canonically: a network-less DID URL names the
// default network.
#[tokio::test]
async fn short_delegate_id() {
    let registry = Registry::new();
    let store = DocStore::new();
    let agent = OrgFixture::new("agent");
    let short = format!("did:orgid:{}#key1", agent.organization_id());
    let org = OrgFixture::new("hotel")
        .declare_delegate(&short)
        .register_delegate(&agent.method_id("key1"))
        .signed_by(&short, &agent.account_id());
    agent.publish(&registry, &store);
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert!(result.is_success(), "{:?}", result.error());
}

// The document must declare the delegate before the chain is consulted.
#[tokio::test]
async fn not_declared() {
    let registry = Registry::new();
    let store = DocStore::new();
    let agent = OrgFixture::new("agent");
    let method_id = agent.method_id("key1");
    let org = OrgFixture::new("hotel").signed_by(&method_id, &agent.account_id());
    agent.publish(&registry, &store);
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert_eq!(
        result.error(),
        Some(format!("Verification method \"{method_id}\" not defined as capability delegate in ORG.JSON").as_str())
    );
}

// A declared delegate must also be registered on chain.
#[tokio::test]
async fn not_registered() {
    let registry = Registry::new();
    let store = DocStore::new();
    let agent = OrgFixture::new("agent");
    let method_id = agent.method_id("key1");
    let org = OrgFixture::new("hotel")
        .declare_delegate(&method_id)
        .signed_by(&method_id, &agent.account_id());
    agent.publish(&registry, &store);
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert_eq!(
        result.error(),
        Some(format!("Verification method \"{method_id}\" not registered as capability delegate in ORGID").as_str())
    );
}

// The delegate's own document must resolve.
#[tokio::test]
async fn unresolvable_delegate() {
    let registry = Registry::new();
    let store = DocStore::new();
    let agent = OrgFixture::new("agent");
    let org = OrgFixture::new("hotel").delegate(&agent);
    org.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    assert_eq!(
        result.error(),
        Some(
            format!("Delegate resolution error: ORGiD \"{}\" not found", agent.organization_id())
                .as_str()
        )
    );
}

// The delegate's key must be bound to the delegate's own owner.
#[tokio::test]
async fn delegate_owner_mismatch() {
    let registry = Registry::new();
    let store = DocStore::new();
    let agent = OrgFixture::new("agent");
    let org = OrgFixture::new("hotel").delegate(&agent);
    agent.publish(&registry, &store);
    org.publish(&registry, &store);

    // the agent's record now names another owner
    let mut record = agent.record();
    record.owner = "0x2222222222222222222222222222222222222222".into();
    registry.register(record);

    let result = test_utils::resolver(&registry, &store).resolve(&org.did()).await;
    let error = result.error().expect("should fail");
    assert!(error.starts_with("Delegate resolution error: "), "{error}");
    assert!(error.contains("Verification method blockchain account"), "{error}");
}

// Chains deeper than the maximum depth fail, however long they are.
#[tokio::test]
async fn max_depth() {
    let registry = Registry::new();
    let store = DocStore::new();

    // org0 is signed by org1's delegate key, org1 by org2's, and so on
    let mut chain = vec![OrgFixture::new("org4")];
    for i in (0..4).rev() {
        let next = OrgFixture::new(&format!("org{i}")).delegate(&chain[0]);
        chain.insert(0, next);
    }
    for org in &chain {
        org.publish(&registry, &store);
    }

    // org0 (depth 0) .. org4 (depth 4)
    let deep = test_utils::resolver(&registry, &store);
    let result = deep.resolve(&chain[0].did()).await;
    let error = result.error().expect("should fail");
    assert!(error.contains("Maximum depth \"3\" of capability delegation is reached"), "{error}");

    // org1 (depth 0) .. org4 (depth 3)
    let result = test_utils::resolver(&registry, &store).resolve(&chain[1].did()).await;
    assert!(result.is_success(), "{:?}", result.error());

    let shallow = test_utils::resolver_with(
        &registry,
        &store,
        ResolverOptions {
            max_depth: 1,
            ..ResolverOptions::default()
        },
    );
    let result = shallow.resolve(&chain[2].did()).await;
    assert!(result.error().is_some_and(|e| e.contains("Maximum depth \"1\"")));
}

// Two organizations delegating to each other are detected as a cycle.
#[tokio::test]
async fn delegation_cycle() {
    let registry = Registry::new();
    let store = DocStore::new();
    let hotel = OrgFixture::new("hotel");
    let agent = OrgFixture::new("agent");
    let hotel = hotel.delegate(&agent);
    let agent = agent.delegate(&hotel);
    hotel.publish(&registry, &store);
    agent.publish(&registry, &store);

    let result = test_utils::resolver(&registry, &store).resolve(&hotel.did()).await;
    let error = result.error().expect("should fail");
    assert!(
        error.contains(&format!("Capability delegation recursion detected at \"{}\"", hotel.did())),
        "{error}"
    );
    assert!(result.did_document.is_none());
}

// A resolved delegate is cached and reused.
#[tokio::test]
async fn delegate_cached() {
    let registry = Registry::new();
    let store = DocStore::new();
    let agent = OrgFixture::new("agent");
    let org = OrgFixture::new("hotel").delegate(&agent);
    agent.publish(&registry, &store);
    org.publish(&registry, &store);

    let resolver = test_utils::resolver(&registry, &store);
    assert!(resolver.resolve(&org.did()).await.is_success());
    assert_eq!(registry.lookups(), 2);

    let result = resolver.resolve(&agent.did()).await;
    assert!(result.is_success());
    assert_eq!(registry.lookups(), 2);
}
