use std::sync::Arc;
use std::time::Duration;

use cnda_logging::{cnda_debug, cnda_trace, cnda_warn};
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{ApiClient, EngineEvent, EventSink};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Shortest accepted period; tokio intervals cannot tick at zero.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Owns a running poll loop. Cancelling, or dropping the handle, stops it.
///
/// Cancellation takes effect immediately: a poll that is still in flight is
/// abandoned and its result is never emitted.
#[derive(Debug)]
pub struct PollerHandle {
    job_id: Uuid,
    token: CancellationToken,
}

impl PollerHandle {
    pub fn job_id(&self) -> Uuid {
        self.job_id
    }

    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            cnda_debug!("Stopping status poller for job {}", self.job_id);
            self.token.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Fixed-period status poller; one loop per job.
#[derive(Clone)]
pub struct StatusPoller {
    client: Arc<dyn ApiClient>,
    period: Duration,
}

impl StatusPoller {
    /// Periods shorter than [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn new(client: Arc<dyn ApiClient>, period: Duration) -> Self {
        if period < MIN_POLL_INTERVAL {
            cnda_warn!(
                "Poll period {:?} is too short; using {:?}",
                period,
                MIN_POLL_INTERVAL
            );
        }
        Self {
            client,
            period: period.max(MIN_POLL_INTERVAL),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Starts polling `job_id` on `runtime`. The first poll fires one period
    /// after this call.
    pub fn spawn(&self, runtime: &Handle, job_id: Uuid, sink: Arc<dyn EventSink>) -> PollerHandle {
        let token = CancellationToken::new();
        cnda_debug!(
            "Starting status poller for job {} every {:?}",
            job_id,
            self.period
        );
        runtime.spawn(poll_loop(
            self.client.clone(),
            job_id,
            self.period,
            token.clone(),
            sink,
        ));
        PollerHandle { job_id, token }
    }
}

async fn poll_loop(
    client: Arc<dyn ApiClient>,
    job_id: Uuid,
    period: Duration,
    token: CancellationToken,
    sink: Arc<dyn EventSink>,
) {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = interval.tick() => {}
        }

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            result = client.download_status(job_id) => result,
        };

        if token.is_cancelled() {
            break;
        }
        cnda_trace!("Status poll for job {} resolved (ok={})", job_id, result.is_ok());
        sink.emit(EngineEvent::StatusPolled { job_id, result });
    }

    cnda_debug!("Status poller for job {} exited", job_id);
}
