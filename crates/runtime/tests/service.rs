//! End-to-end tests of the profile service over the embedded content.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use profile_content::ContentBundle;
use profile_core::catalog::offer_id;
use profile_core::{
    FixedClock, McpError, OperationRequest, ProfileSet, ProfileWrite, SequentialIds, ids, wallet,
};
use runtime::repository::Result as StoreResult;
use runtime::{
    Event, GiftEvent, InMemoryFriends, InMemoryProfileStore, OracleManager, ProfileEvent, ProfileStore,
    RepositoryError, Runtime, RuntimeError, Topic,
};
use serde_json::json;

const LOCKJAW: &str = "AthenaPickaxe:Pickaxe_Lockjaw";
const LOCKJAW_PRICE: i64 = 800;

fn lockjaw_offer() -> String {
    offer_id(&[LOCKJAW.to_owned()], LOCKJAW_PRICE)
}

fn oracles() -> OracleManager {
    let content = ContentBundle::embedded().expect("embedded content");
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    OracleManager::new(
        Arc::new(content),
        Arc::new(FixedClock(now)),
        Arc::new(SequentialIds::new("id")),
    )
}

fn build(store: Arc<dyn ProfileStore>, friends: InMemoryFriends) -> Runtime {
    Runtime::builder()
        .oracles(oracles())
        .store(store)
        .friends(Arc::new(friends))
        .build()
        .expect("runtime")
}

fn runtime() -> Runtime {
    build(Arc::new(InMemoryProfileStore::new()), InMemoryFriends::new())
}

fn balance(set: &ProfileSet) -> i64 {
    wallet::balance(set.resolve(ids::COMMON_CORE).unwrap(), "EpicPC")
}

fn purchase(account_id: &str, offer: &str) -> OperationRequest {
    OperationRequest::new(account_id, "PurchaseCatalogEntry", ids::COMMON_CORE)
        .with_body(json!({ "offerId": offer, "purchaseQuantity": 1 }))
}

fn gift(sender: &str, receivers: &[&str]) -> OperationRequest {
    OperationRequest::new(sender, "GiftCatalogEntry", ids::COMMON_CORE).with_body(json!({
        "offerId": lockjaw_offer(),
        "receiverAccountIds": receivers,
        "giftWrapTemplateId": "GiftBox:gb_default",
        "personalMessage": "enjoy",
    }))
}

fn mcp(err: RuntimeError) -> McpError {
    err.to_mcp()
}

#[tokio::test]
async fn registered_accounts_answer_queries() {
    let runtime = runtime();
    let service = runtime.handle();

    let set = service.register_account("alice").await.unwrap();
    assert_eq!(set.profiles.len(), 6);
    assert!(set.profiles.values().all(|profile| profile.account_id == "alice"));

    let response = service
        .execute(OperationRequest::new("alice", "QueryProfile", ids::ATHENA))
        .await
        .unwrap();
    assert_eq!(response.primary.profile_id, ids::ATHENA);
    assert!(response.is_full_update());

    let err = service.register_account("alice").await.unwrap_err();
    assert!(matches!(mcp(err), McpError::AccountExists { .. }));
}

#[tokio::test]
async fn unknown_accounts_are_not_found() {
    let service = runtime().handle();

    let err = service
        .execute(OperationRequest::new("ghost", "QueryProfile", ids::ATHENA))
        .await
        .unwrap_err();
    let envelope = err.to_envelope();
    assert_eq!(envelope.status, 404);
    assert!(matches!(mcp(err), McpError::AccountNotFound { account_id } if account_id == "ghost"));
}

#[tokio::test]
async fn unknown_operations_fail_before_loading() {
    let service = runtime().handle();

    // no account registered: the name check must come first
    let err = service
        .execute(OperationRequest::new("ghost", "DoSomethingElse", ids::ATHENA))
        .await
        .unwrap_err();
    assert!(matches!(mcp(err), McpError::OperationNotFound { .. }));
}

#[tokio::test]
async fn purchase_then_refund_round_trips_the_wallet() {
    let service = runtime().handle();
    service.register_account("alice").await.unwrap();
    service.grant_currency("alice", 1000).await.unwrap();

    let response = service.execute(purchase("alice", &lockjaw_offer())).await.unwrap();
    assert_eq!(response.primary.profile_id, ids::COMMON_CORE);
    assert!(response.notifications.is_some_and(|notes| notes.len() == 1));

    let after_purchase = service.profiles("alice").await.unwrap();
    assert_eq!(balance(&after_purchase), 1000 - LOCKJAW_PRICE);
    assert!(after_purchase.resolve(ids::ATHENA).unwrap().owns_template(LOCKJAW));

    let purchase_id = after_purchase
        .resolve(ids::COMMON_CORE)
        .unwrap()
        .attributes()
        .mtx_purchase_history
        .as_ref()
        .and_then(|history| history.purchases.first())
        .map(|entry| entry.purchase_id.clone())
        .unwrap();

    let refund = OperationRequest::new("alice", "RefundMtxPurchase", ids::COMMON_CORE)
        .with_body(json!({ "purchaseId": purchase_id }));
    service.execute(refund.clone()).await.unwrap();

    let after_refund = service.profiles("alice").await.unwrap();
    assert_eq!(balance(&after_refund), 1000);
    assert!(!after_refund.resolve(ids::ATHENA).unwrap().owns_template(LOCKJAW));

    let err = service.execute(refund).await.unwrap_err();
    assert_eq!(err.to_envelope().status, 400);
}

#[tokio::test]
async fn rejected_purchase_leaves_profiles_untouched() {
    let service = runtime().handle();
    service.register_account("alice").await.unwrap();
    let before = service.profiles("alice").await.unwrap();

    let err = service.execute(purchase("alice", &lockjaw_offer())).await.unwrap_err();
    assert!(matches!(
        mcp(err),
        McpError::InsufficientFunds { required: LOCKJAW_PRICE, available: 0 }
    ));
    assert_eq!(service.profiles("alice").await.unwrap(), before);
}

#[tokio::test]
async fn gifts_reach_friends_and_notify_them() {
    let friends = InMemoryFriends::with_friendships([("alice", "bob")]);
    let runtime = build(Arc::new(InMemoryProfileStore::new()), friends);
    let service = runtime.handle();
    let mut gifts = runtime.subscribe(Topic::Gift);

    service.register_account("alice").await.unwrap();
    service.register_account("bob").await.unwrap();
    service.grant_currency("alice", 1000).await.unwrap();
    let bob_before = service.profiles("bob").await.unwrap();

    service.execute(gift("alice", &["bob"])).await.unwrap();

    let alice = service.profiles("alice").await.unwrap();
    assert_eq!(balance(&alice), 1000 - LOCKJAW_PRICE);
    assert!(!alice.resolve(ids::ATHENA).unwrap().owns_template(LOCKJAW));

    let bob = service.profiles("bob").await.unwrap();
    assert!(bob.resolve(ids::ATHENA).unwrap().owns_template(LOCKJAW));
    assert_eq!(
        bob.resolve(ids::ATHENA).unwrap().rvn,
        bob_before.resolve(ids::ATHENA).unwrap().rvn + 1
    );
    let core = bob.resolve(ids::COMMON_CORE).unwrap();
    assert!(core.find_by_template("GiftBox:gb_default").is_some());

    match gifts.try_recv().unwrap() {
        Event::Gift(GiftEvent { recipient, .. }) => assert_eq!(recipient, "bob"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn gifts_to_strangers_are_refused() {
    let service = runtime().handle();
    service.register_account("alice").await.unwrap();
    service.register_account("bob").await.unwrap();
    service.grant_currency("alice", 1000).await.unwrap();
    let bob_before = service.profiles("bob").await.unwrap();

    let err = service.execute(gift("alice", &["bob"])).await.unwrap_err();
    assert!(matches!(mcp(err), McpError::NotFriends { .. }));
    assert_eq!(balance(&service.profiles("alice").await.unwrap()), 1000);
    assert_eq!(service.profiles("bob").await.unwrap(), bob_before);
}

#[tokio::test]
async fn gifts_to_missing_accounts_are_not_found() {
    let friends = InMemoryFriends::with_friendships([("alice", "ghost")]);
    let service = build(Arc::new(InMemoryProfileStore::new()), friends).handle();
    service.register_account("alice").await.unwrap();
    service.grant_currency("alice", 1000).await.unwrap();

    let err = service.execute(gift("alice", &["ghost"])).await.unwrap_err();
    assert!(matches!(mcp(err), McpError::AccountNotFound { account_id } if account_id == "ghost"));
}

/// Store that refuses every write to one account.
struct FailingWrites {
    inner: InMemoryProfileStore,
    broken: &'static str,
}

#[async_trait]
impl ProfileStore for FailingWrites {
    async fn fetch(&self, account_id: &str) -> StoreResult<Option<ProfileSet>> {
        self.inner.fetch(account_id).await
    }

    async fn insert(&self, set: &ProfileSet) -> StoreResult<()> {
        self.inner.insert(set).await
    }

    async fn replace_profiles(&self, account_id: &str, writes: &[ProfileWrite]) -> StoreResult<()> {
        if account_id == self.broken {
            return Err(RepositoryError::CorruptedData("disk full".into()));
        }
        self.inner.replace_profiles(account_id, writes).await
    }

    async fn delete(&self, account_id: &str) -> StoreResult<bool> {
        self.inner.delete(account_id).await
    }

    async fn list_accounts(&self) -> StoreResult<Vec<String>> {
        self.inner.list_accounts().await
    }
}

#[tokio::test]
async fn failed_recipient_write_reports_partial_commit() {
    let store = Arc::new(FailingWrites {
        inner: InMemoryProfileStore::new(),
        broken: "bob",
    });
    let friends = InMemoryFriends::with_friendships([("alice", "bob")]);
    let service = build(store, friends).handle();
    service.register_account("alice").await.unwrap();
    service.register_account("bob").await.unwrap();
    service.grant_currency("alice", 1000).await.unwrap();

    let err = service.execute(gift("alice", &["bob"])).await.unwrap_err();
    assert_eq!(err.to_envelope().status, 500);
    match mcp(err) {
        McpError::PartialCommit { written, failed } => {
            assert_eq!(written, ["alice"]);
            assert_eq!(failed, "bob");
        }
        other => panic!("unexpected error {other:?}"),
    }

    // the sender's side stays committed
    assert_eq!(balance(&service.profiles("alice").await.unwrap()), 1000 - LOCKJAW_PRICE);
}

#[tokio::test]
async fn concurrent_operations_on_one_account_serialize() {
    let service = runtime().handle();
    service.register_account("alice").await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.grant_currency("alice", 10).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let alice = service.profiles("alice").await.unwrap();
    assert_eq!(balance(&alice), 160);
    assert_eq!(alice.resolve(ids::COMMON_CORE).unwrap().rvn, 16);
}

#[tokio::test]
async fn lifecycle_events_are_published() {
    let runtime = runtime();
    let service = runtime.handle();
    let mut events = runtime.subscribe(Topic::Profile);

    service.register_account("alice").await.unwrap();
    service.grant_xp("alice", 250).await.unwrap();
    assert!(service.delete_account("alice").await.unwrap());
    assert!(!service.delete_account("alice").await.unwrap());

    let received: Vec<ProfileEvent> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event {
            Event::Profile(event) => Some(event),
            Event::Gift(_) => None,
        })
        .collect();

    assert_eq!(received.len(), 3);
    assert!(matches!(&received[0], ProfileEvent::Registered { account_id } if account_id == "alice"));
    assert!(matches!(
        &received[1],
        ProfileEvent::Committed { operation, profile_ids, .. }
            if operation == "GrantXp" && profile_ids.iter().any(|id| id == ids::ATHENA)
    ));
    assert!(matches!(&received[2], ProfileEvent::Deleted { .. }));

    let err = service.profiles("alice").await.unwrap_err();
    assert!(matches!(mcp(err), McpError::AccountNotFound { .. }));
}

#[tokio::test]
async fn builder_requires_content() {
    let err = Runtime::builder().build().err().unwrap();
    assert!(matches!(err, RuntimeError::MissingContent));
}
