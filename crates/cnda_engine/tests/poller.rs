use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use cnda_engine::{
    ApiClient, ApiError, ChannelEventSink, DownloadRequest, EngineEvent, EngineHandle, EventSink,
    FailureKind, StatusPoller, StatusResponse, MIN_POLL_INTERVAL,
};
use tokio::runtime::Handle;
use uuid::Uuid;

struct FakeClient {
    polls: AtomicUsize,
    poll_delay: Duration,
    fail_submit: bool,
}

impl FakeClient {
    fn new(poll_delay: Duration) -> Self {
        Self {
            polls: AtomicUsize::new(0),
            poll_delay,
            fail_submit: false,
        }
    }

    fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ApiClient for FakeClient {
    async fn login(&self, _username: &str, password: &str) -> Result<i64, ApiError> {
        Ok(if password == "ok" { 0 } else { 1 })
    }

    async fn projects(&self) -> Result<Vec<String>, ApiError> {
        Ok(vec!["P1".into()])
    }

    async fn subjects(&self, project_id: &str) -> Result<Vec<String>, ApiError> {
        Ok(vec![format!("{project_id}-S1")])
    }

    async fn submit_download(
        &self,
        _request: &DownloadRequest,
    ) -> Result<serde_json::Value, ApiError> {
        if self.fail_submit {
            Err(ApiError {
                kind: FailureKind::Network,
                message: "connection refused".into(),
            })
        } else {
            Ok(serde_json::json!({ "message": "initiated" }))
        }
    }

    async fn download_status(&self, _job_id: Uuid) -> Result<StatusResponse, ApiError> {
        let n = self.polls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.poll_delay.is_zero() {
            tokio::time::sleep(self.poll_delay).await;
        }
        let mut statuses = BTreeMap::new();
        statuses.insert("A".to_string(), format!("poll-{n}"));
        Ok(statuses)
    }
}

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

const PERIOD: Duration = Duration::from_secs(10);

#[tokio::test(start_paused = true)]
async fn polls_once_per_period_starting_after_first_period() {
    let client = Arc::new(FakeClient::new(Duration::ZERO));
    let sink = Arc::new(RecordingSink::default());
    let poller = StatusPoller::new(client.clone(), PERIOD);
    let job_id = Uuid::new_v4();

    let _handle = poller.spawn(&Handle::current(), job_id, sink.clone());

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(client.polls(), 0);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(client.polls(), 3);
    assert_eq!(sink.len(), 3);

    let events = sink.events.lock().unwrap();
    assert!(events.iter().all(|event| matches!(
        event,
        EngineEvent::StatusPolled { job_id: id, result: Ok(_) } if *id == job_id
    )));
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_further_polls() {
    let client = Arc::new(FakeClient::new(Duration::ZERO));
    let sink = Arc::new(RecordingSink::default());
    let poller = StatusPoller::new(client.clone(), PERIOD);

    let handle = poller.spawn(&Handle::current(), Uuid::new_v4(), sink.clone());
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert_eq!(client.polls(), 1);

    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(client.polls(), 1);
    assert_eq!(sink.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_cancels() {
    let client = Arc::new(FakeClient::new(Duration::ZERO));
    let sink = Arc::new(RecordingSink::default());
    let poller = StatusPoller::new(client.clone(), PERIOD);

    drop(poller.spawn(&Handle::current(), Uuid::new_v4(), sink.clone()));

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(client.polls(), 0);
    assert_eq!(sink.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn in_flight_poll_is_discarded_after_cancel() {
    let client = Arc::new(FakeClient::new(Duration::from_secs(4)));
    let sink = Arc::new(RecordingSink::default());
    let poller = StatusPoller::new(client.clone(), PERIOD);

    let handle = poller.spawn(&Handle::current(), Uuid::new_v4(), sink.clone());
    // First poll starts at t=10s and would resolve at t=14s.
    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(client.polls(), 1);
    handle.cancel();

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(sink.len(), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_period_is_raised_and_still_polls() {
    let client = Arc::new(FakeClient::new(Duration::ZERO));
    let sink = Arc::new(RecordingSink::default());
    let poller = StatusPoller::new(client.clone(), Duration::ZERO);
    assert_eq!(poller.period(), MIN_POLL_INTERVAL);

    let _handle = poller.spawn(&Handle::current(), Uuid::new_v4(), sink.clone());
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert!(client.polls() >= 1);
    assert_eq!(sink.len(), client.polls());
}

fn start_engine(
    client: Arc<FakeClient>,
    period: Duration,
) -> (EngineHandle, mpsc::Receiver<EngineEvent>) {
    let (tx, rx) = mpsc::channel();
    let engine = EngineHandle::with_client(client, period, Arc::new(ChannelEventSink::new(tx)))
        .expect("engine starts");
    (engine, rx)
}

fn wait_for(
    events: &mpsc::Receiver<EngineEvent>,
    mut pred: impl FnMut(&EngineEvent) -> bool,
) -> EngineEvent {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while std::time::Instant::now() < deadline {
        if let Ok(event) = events.recv_timeout(Duration::from_millis(50)) {
            if pred(&event) {
                return event;
            }
        }
    }
    panic!("expected engine event did not arrive");
}

#[test]
fn engine_reports_submission_outcome_even_on_failure() {
    let client = Arc::new(FakeClient {
        fail_submit: true,
        ..FakeClient::new(Duration::ZERO)
    });
    let (engine, events) = start_engine(client, PERIOD);
    let job_id = Uuid::new_v4();

    engine.submit(DownloadRequest {
        download_job_id: job_id,
        subject_ids: vec!["A".into()],
        project_id: "P1".into(),
    });

    let event = wait_for(&events, |e| matches!(e, EngineEvent::DownloadSubmitted { .. }));
    match event {
        EngineEvent::DownloadSubmitted { job_id: id, result } => {
            assert_eq!(id, job_id);
            assert_eq!(result.unwrap_err().kind, FailureKind::Network);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn engine_runs_screen_requests() {
    let client = Arc::new(FakeClient::new(Duration::ZERO));
    let (engine, events) = start_engine(client, PERIOD);

    engine.login("user", "ok");
    let event = wait_for(&events, |e| matches!(e, EngineEvent::LoginCompleted(_)));
    assert_eq!(event, EngineEvent::LoginCompleted(Ok(0)));

    engine.load_subjects("P1");
    let event = wait_for(&events, |e| matches!(e, EngineEvent::SubjectsLoaded { .. }));
    assert_eq!(
        event,
        EngineEvent::SubjectsLoaded {
            project_id: "P1".into(),
            result: Ok(vec!["P1-S1".into()]),
        }
    );
}

#[test]
fn engine_stop_polling_and_shutdown_cancel_loops() {
    let client = Arc::new(FakeClient::new(Duration::ZERO));
    let (engine, events) = start_engine(client.clone(), Duration::from_millis(40));
    let job_id = Uuid::new_v4();

    engine.start_polling(job_id);
    wait_for(&events, |e| matches!(e, EngineEvent::StatusPolled { .. }));

    engine.stop_polling(job_id);
    std::thread::sleep(Duration::from_millis(100));
    let after_stop = client.polls();
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(client.polls(), after_stop);

    let other = Uuid::new_v4();
    engine.start_polling(other);
    wait_for(&events, |e| {
        matches!(e, EngineEvent::StatusPolled { job_id, .. } if *job_id == other)
    });
    drop(engine);
    std::thread::sleep(Duration::from_millis(100));
    let after_drop = client.polls();
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(client.polls(), after_drop);
}
