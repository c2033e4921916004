use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Subject id -> raw status string, as served by the status endpoint.
pub type StatusResponse = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    LoginCompleted(Result<i64, ApiError>),
    ProjectsLoaded(Result<Vec<String>, ApiError>),
    SubjectsLoaded {
        project_id: String,
        result: Result<Vec<String>, ApiError>,
    },
    DownloadSubmitted {
        job_id: Uuid,
        result: Result<(), ApiError>,
    },
    StatusPolled {
        job_id: Uuid,
        result: Result<StatusResponse, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start engine runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build api client: {0}")]
    Client(#[from] ApiError),
}
