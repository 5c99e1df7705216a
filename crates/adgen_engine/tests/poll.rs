use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use adgen_core::{Characteristic, Style};
use adgen_engine::{
    ApiSettings, ImageUpload, Lifecycle, LifecycleError, MemoryTaskStore, PollObserver,
    PollOutcome, PollSettings, ReqwestApi, StoreError, TaskRecord, TaskStore,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const INTERVAL: Duration = Duration::from_millis(20);

/// Memory store that counts clears.
#[derive(Default)]
struct CountingStore {
    inner: MemoryTaskStore,
    clears: AtomicUsize,
}

impl CountingStore {
    fn holding(task_id: &str) -> Self {
        let store = Self::default();
        store
            .save(&TaskRecord {
                task_id: task_id.to_string(),
                preview_url: "blob://x".to_string(),
            })
            .unwrap();
        store
    }

    fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl TaskStore for CountingStore {
    fn save(&self, record: &TaskRecord) -> Result<(), StoreError> {
        self.inner.save(record)
    }

    fn load(&self) -> Option<TaskRecord> {
        self.inner.load()
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.inner.clear()
    }
}

#[derive(Default)]
struct PendingCounter(AtomicUsize);

impl PollObserver for PendingCounter {
    fn on_pending(&self, _task_id: &str) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn lifecycle(server: &MockServer, store: Arc<dyn TaskStore>) -> Lifecycle {
    lifecycle_at(server.uri(), store)
}

fn lifecycle_at(base_url: String, store: Arc<dyn TaskStore>) -> Lifecycle {
    let api = ReqwestApi::new(ApiSettings {
        base_url,
        ..ApiSettings::default()
    })
    .expect("client");
    Lifecycle::new(Arc::new(api), store, PollSettings { interval: INTERVAL })
}

async fn mount_pending(server: &MockServer, task_id: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/results/{task_id}")))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"status": "processing"})))
        .up_to_n_times(times)
        .with_priority(1)
        .expect(times)
        .mount(server)
        .await;
}

async fn poll_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("recording enabled")
        .iter()
        .filter(|request| request.method.as_str() == "GET")
        .count()
}

#[tokio::test]
async fn pending_then_ready_succeeds_once_and_clears_once() {
    adgen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount_pending(&server, "abc123", 3).await;
    Mock::given(method("GET"))
        .and(path("/results/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "characteristics": {"Color": "Red", "Material": "Wood"},
            "ad_text": "Great item!"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(CountingStore::holding("abc123"));
    let observer = PendingCounter::default();

    let outcome = lifecycle(&server, store.clone())
        .poller()
        .run("abc123", &CancellationToken::new(), &observer)
        .await;

    let PollOutcome::Succeeded(result) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(result.ad_text, "Great item!");
    assert_eq!(observer.0.load(Ordering::SeqCst), 3);
    assert_eq!(store.clears(), 1);
    assert_eq!(store.load(), None);

    // No poll is issued once the task resolved.
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(poll_requests(&server).await, 4);
}

#[tokio::test]
async fn pending_then_server_error_fails_once_and_clears_once() {
    adgen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    mount_pending(&server, "abc123", 2).await;
    Mock::given(method("GET"))
        .and(path("/results/abc123"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "model crashed"})))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(CountingStore::holding("abc123"));

    let outcome = lifecycle(&server, store.clone())
        .poller()
        .run("abc123", &CancellationToken::new(), &())
        .await;

    assert_eq!(
        outcome,
        PollOutcome::Failed(LifecycleError::JobFailed {
            status: 500,
            message: "model crashed".to_string()
        })
    );
    assert_eq!(store.clears(), 1);

    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(poll_requests(&server).await, 3);
}

#[tokio::test]
async fn unreachable_server_is_a_terminal_failure() {
    adgen_logging::initialize_for_tests();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    let store = Arc::new(CountingStore::holding("abc123"));
    let lifecycle = lifecycle_at(format!("http://{addr}"), store.clone());

    let outcome = lifecycle
        .poller()
        .run("abc123", &CancellationToken::new(), &())
        .await;

    assert!(
        matches!(outcome, PollOutcome::Failed(LifecycleError::PollTransport(_))),
        "{outcome:?}"
    );
    assert_eq!(store.clears(), 1);
}

#[tokio::test]
async fn cancellation_keeps_the_record_for_resumption() {
    adgen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/abc123"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    let store = Arc::new(CountingStore::holding("abc123"));
    let poller = lifecycle(&server, store.clone()).poller();
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(INTERVAL * 3).await;
            cancel.cancel();
        })
    };
    let outcome = poller.run("abc123", &cancel, &()).await;
    canceller.await.unwrap();

    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(store.clears(), 0);
    assert_eq!(
        store.load().map(|record| record.task_id).as_deref(),
        Some("abc123")
    );
}

#[tokio::test]
async fn response_arriving_after_cancellation_is_dropped() {
    adgen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/abc123"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(INTERVAL * 4)
                .set_body_json(json!({"characteristics": {}, "ad_text": "late"})),
        )
        .mount(&server)
        .await;
    let store = Arc::new(CountingStore::holding("abc123"));
    let poller = lifecycle(&server, store.clone()).poller();
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            // First tick fires after one interval; cancel while its request is in flight.
            tokio::time::sleep(INTERVAL * 2).await;
            cancel.cancel();
        })
    };
    let outcome = poller.run("abc123", &cancel, &()).await;
    canceller.await.unwrap();

    assert_eq!(outcome, PollOutcome::Cancelled);
    assert_eq!(store.clears(), 0);
    assert_eq!(poll_requests(&server).await, 1);
}

#[tokio::test]
async fn terminal_outcome_does_not_clear_a_newer_record() {
    adgen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/results/old"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let store = Arc::new(CountingStore::holding("new"));

    let outcome = lifecycle(&server, store.clone())
        .poller()
        .run("old", &CancellationToken::new(), &())
        .await;

    assert!(matches!(outcome, PollOutcome::Failed(_)));
    assert_eq!(store.clears(), 0);
    assert_eq!(
        store.load().map(|record| record.task_id).as_deref(),
        Some("new")
    );
}

#[tokio::test]
async fn startup_resumes_persisted_task_without_resubmitting() {
    adgen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/results/T1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "characteristics": {"Roof": "red"},
            "ad_text": "Welcome home."
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(MemoryTaskStore::from_entries([
        ("activeTaskId", "T1"),
        ("tempImageURL", "blob://x"),
    ]));
    let lifecycle = lifecycle(&server, store.clone());

    let record = lifecycle.resume_pending().expect("active task");
    assert_eq!(
        record,
        TaskRecord {
            task_id: "T1".to_string(),
            preview_url: "blob://x".to_string(),
        }
    );

    let outcome = lifecycle
        .poller()
        .run(&record.task_id, &CancellationToken::new(), &())
        .await;
    assert!(matches!(outcome, PollOutcome::Succeeded(_)));
    assert!(store.is_empty());
    server.verify().await;
}

#[tokio::test]
async fn submit_then_poll_end_to_end() {
    adgen_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/generate-ad"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"task_id": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_pending(&server, "abc123", 1).await;
    Mock::given(method("GET"))
        .and(path("/results/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "characteristics": {"Color": "Red", "Material": "Wood"},
            "ad_text": "Great item!"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let store = Arc::new(CountingStore::default());
    let lifecycle = lifecycle(&server, store.clone());

    let record = lifecycle
        .submitter()
        .submit(ImageUpload {
            file_name: "chair.jpg".to_string(),
            media_type: "image/jpeg".to_string(),
            bytes: b"jpeg".to_vec(),
            style: Style::Professional,
            preview_url: "file:///tmp/chair.jpg".to_string(),
        })
        .await
        .expect("submitted");
    assert_eq!(record.task_id, "abc123");
    assert_eq!(store.load(), Some(record.clone()));

    let outcome = lifecycle
        .poller()
        .run(&record.task_id, &CancellationToken::new(), &())
        .await;

    let PollOutcome::Succeeded(result) = outcome else {
        panic!("expected success, got {outcome:?}");
    };
    assert_eq!(
        result.characteristics,
        vec![
            Characteristic {
                name: "Color".to_string(),
                value: "Red".to_string()
            },
            Characteristic {
                name: "Material".to_string(),
                value: "Wood".to_string()
            },
        ]
    );
    assert_eq!(result.ad_text, "Great item!");
    assert_eq!(store.clears(), 1);
    assert_eq!(store.load(), None);
}
