use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;
use todo_actors::clock::{ManualClock, SharedClock, SystemClock};
use todo_actors::config::{AppConfig, StoreConfig};
use todo_actors::gateway::{AddItemRequest, GatewayError};
use todo_actors::lifecycle::TodoSystem;
use todo_actors::todo_actor::{TodoAction, TodoError};
use tokio_util::sync::CancellationToken;
use virtual_actors::mock::MockStore;
use virtual_actors::{
    ActorClient, ActorKey, FrameworkError, MemoryStore, RuntimeConfig, StoreError,
};

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";

fn system_over(store: &MockStore) -> TodoSystem {
    TodoSystem::with_store(
        RuntimeConfig::default(),
        Arc::new(store.clone()),
        Arc::new(SystemClock),
    )
}

/// Append then list: the new item is last, open, with no completion time.
#[tokio::test]
async fn test_added_item_is_listed_last_and_open() {
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    let shared: SharedClock = Arc::new(clock.clone());
    let system = TodoSystem::with_store(
        RuntimeConfig::default(),
        Arc::new(MemoryStore::new()),
        shared,
    );
    let token = CancellationToken::new();

    system
        .todo_client
        .add_item(ALICE, "water plants", &token)
        .await
        .expect("Failed to add item");
    clock.advance(ChronoDuration::minutes(1));
    system
        .todo_client
        .add_item(ALICE, "buy milk", &token)
        .await
        .expect("Failed to add item");

    let items = system
        .todo_client
        .list_items(ALICE, &token)
        .await
        .expect("Failed to list items");
    let last = items.last().expect("list is empty");
    assert_eq!(items.len(), 2);
    assert_eq!(last.description, "buy milk");
    assert!(!last.is_done);
    assert!(last.completed_at.is_none());
    assert_eq!(last.created_at, start + ChronoDuration::minutes(1));

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_never_seen_email_lists_empty() {
    let system = TodoSystem::new();
    let items = system
        .todo_client
        .list_items("nobody@example.com", &CancellationToken::new())
        .await
        .expect("a new user must not be an error");
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_repeated_reads_are_identical() {
    let system = TodoSystem::new();
    let token = CancellationToken::new();
    system.todo_client.add_item(ALICE, "a", &token).await.unwrap();
    system.todo_client.add_item(ALICE, "b", &token).await.unwrap();

    let first = system.todo_client.list_items(ALICE, &token).await.unwrap();
    let second = system.todo_client.list_items(ALICE, &token).await.unwrap();
    assert_eq!(first, second);
}

/// Operations for one user run in the order they were submitted.
#[tokio::test]
async fn test_submission_order_is_execution_order() {
    let system = TodoSystem::new();
    let token = CancellationToken::new();
    let proxy = system.todo_client.inner().for_key(ALICE);

    let mut pending = Vec::new();
    for n in 0..25 {
        let action = TodoAction::AddItem {
            description: format!("task {n}"),
        };
        pending.push(proxy.enqueue(action, &token).await.unwrap());
    }
    for turn in pending {
        turn.wait().await.expect("turn failed");
    }

    let items = system.todo_client.list_items(ALICE, &token).await.unwrap();
    let descriptions: Vec<String> = items.into_iter().map(|i| i.description).collect();
    let expected: Vec<String> = (0..25).map(|n| format!("task {n}")).collect();
    assert_eq!(descriptions, expected);
}

#[tokio::test]
async fn test_item_survives_deactivation() {
    let system = TodoSystem::new();
    let token = CancellationToken::new();
    let key = ActorKey::from(ALICE);

    system.todo_client.add_item(ALICE, "buy milk", &token).await.unwrap();
    assert!(system.todo_client.deactivate(ALICE).await.unwrap());
    assert!(!system.activations().is_active(&key));

    let items = system.todo_client.list_items(ALICE, &token).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].description, "buy milk");
    assert!(system.activations().is_active(&key));
}

#[tokio::test]
async fn test_slow_user_does_not_block_other_users() {
    let store = MockStore::new();
    store.with_latency(ALICE, Duration::from_secs(30));
    let system = system_over(&store);
    let token = CancellationToken::new();

    let slow_client = system.todo_client.clone();
    let slow_token = token.clone();
    let _slow = tokio::spawn(async move { slow_client.list_items(ALICE, &slow_token).await });

    let fast = tokio::time::timeout(
        Duration::from_secs(2),
        system.todo_client.add_item(BOB, "unblocked", &token),
    )
    .await
    .expect("bob waited on alice");
    assert!(fast.is_ok());
}

/// A request cancelled while it waits behind the activation never runs.
#[tokio::test]
async fn test_cancelled_request_is_never_applied() {
    let store = MockStore::new();
    store.with_latency(ALICE, Duration::from_millis(200));
    let system = system_over(&store);
    let proxy = system.todo_client.inner().for_key(ALICE);
    let keep = CancellationToken::new();
    let doomed = CancellationToken::new();

    let first = proxy
        .enqueue(TodoAction::AddItem { description: "kept".into() }, &keep)
        .await
        .unwrap();
    let second = proxy
        .enqueue(TodoAction::AddItem { description: "dropped".into() }, &doomed)
        .await
        .unwrap();

    doomed.cancel();
    assert!(matches!(second.wait().await, Err(FrameworkError::Cancelled)));
    first.wait().await.unwrap();

    let items = system.todo_client.list_items(ALICE, &keep).await.unwrap();
    let descriptions: Vec<&str> = items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, vec!["kept"]);
}

#[tokio::test]
async fn test_cancelled_before_submission_reports_cancelled() {
    let system = TodoSystem::new();
    let token = CancellationToken::new();
    token.cancel();

    let err = system.todo_client.list_items(ALICE, &token).await.unwrap_err();
    assert_eq!(err, TodoError::Cancelled);
}

#[tokio::test]
async fn test_empty_description_leaves_list_untouched() {
    let system = TodoSystem::new();
    let token = CancellationToken::new();

    let err = system.todo_client.add_item(ALICE, "", &token).await.unwrap_err();
    assert!(matches!(err, TodoError::ValidationError(_)));
    assert!(system.todo_client.list_items(ALICE, &token).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_complete_item_lifecycle() {
    let system = TodoSystem::new();
    let token = CancellationToken::new();
    system.todo_client.add_item(ALICE, "file taxes", &token).await.unwrap();

    let done = system.todo_client.complete_item(ALICE, 0, &token).await.unwrap();
    assert!(done.is_done);
    assert!(done.completed_at.is_some());

    assert_eq!(
        system.todo_client.complete_item(ALICE, 0, &token).await.unwrap_err(),
        TodoError::AlreadyCompleted(0)
    );
    assert_eq!(
        system.todo_client.complete_item(ALICE, 5, &token).await.unwrap_err(),
        TodoError::NotFound(5)
    );
}

/// Lists written by one process are read back by the next over the same directory.
#[tokio::test]
async fn test_file_store_persists_across_systems() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        store: StoreConfig::File {
            dir: dir.path().to_path_buf(),
        },
        runtime: RuntimeConfig::default().with_write_through(false),
    };
    let token = CancellationToken::new();

    let first = TodoSystem::open(&config).await.unwrap();
    first.todo_client.add_item(ALICE, "buy milk", &token).await.unwrap();
    first.todo_client.add_item(BOB, "call mom", &token).await.unwrap();
    assert_eq!(first.shutdown().await.unwrap(), 2);

    let second = TodoSystem::open(&config).await.unwrap();
    let items = second.todo_client.list_items(ALICE, &token).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].description, "buy milk");
    second.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_requests_after_shutdown_are_refused() {
    let store = MockStore::new();
    let system = system_over(&store);
    let client = system.todo_client.clone();
    system.shutdown().await.unwrap();

    let err = client
        .list_items(ALICE, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, TodoError::ActorCommunicationError(_)));
}

#[tokio::test]
async fn test_gateway_reports_unreadable_list_as_no_data_available() {
    let store = MockStore::new();
    store
        .expect_load(ALICE)
        .return_err(StoreError::Unavailable("disk offline".into()));
    let system = system_over(&store);

    let err = system
        .gateway
        .get_list(ALICE, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::NoDataAvailable(TodoError::StateLoadFailure(_))
    ));
    assert_eq!(err.status(), 404);
    assert_eq!(err.to_string(), "no data available");
    store.verify();
}

#[tokio::test]
async fn test_gateway_passes_validation_error_through() {
    let system = TodoSystem::new();
    let request = AddItemRequest {
        description: String::new(),
        id: None,
    };

    let err = system
        .gateway
        .add_item(ALICE, request, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Rejected(TodoError::ValidationError(_))
    ));
    assert_eq!(err.status(), 400);
}
