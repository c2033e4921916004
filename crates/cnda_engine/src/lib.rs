//! CNDA engine: HTTP client, download submission and status polling.
mod client;
mod engine;
mod job_id;
mod poller;
mod submit;
mod types;

pub use client::{ApiClient, ClientSettings, ReqwestApiClient};
pub use engine::{ChannelEventSink, EngineHandle, EngineSettings, EventSink};
pub use job_id::generate_job_id;
pub use poller::{PollerHandle, StatusPoller, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};
pub use submit::{submit_download, DownloadRequest};
pub use types::{ApiError, EngineError, EngineEvent, FailureKind, StatusResponse};
