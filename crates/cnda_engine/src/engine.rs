use std::collections::HashMap;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cnda_logging::{cnda_debug, cnda_info};
use uuid::Uuid;

use crate::poller::{PollerHandle, StatusPoller, DEFAULT_POLL_INTERVAL};
use crate::submit::{submit_download, DownloadRequest};
use crate::{ApiClient, ClientSettings, EngineError, EngineEvent, ReqwestApiClient};

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub client: ClientSettings,
    pub poll_interval: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            client: ClientSettings::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

enum EngineCommand {
    Login { username: String, password: String },
    LoadProjects,
    LoadSubjects { project_id: String },
    Submit(DownloadRequest),
    StartPolling { job_id: Uuid },
    StopPolling { job_id: Uuid },
}

/// Front of the background engine thread.
///
/// Every result is delivered to the sink given at construction. Dropping the
/// handle shuts the engine down and cancels every poller.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

impl EngineHandle {
    pub fn new(settings: EngineSettings, sink: Arc<dyn EventSink>) -> Result<Self, EngineError> {
        let client = Arc::new(ReqwestApiClient::new(&settings.client)?);
        cnda_info!("Engine talking to {}", client.base_url());
        Self::with_client(client, settings.poll_interval, sink)
    }

    pub fn with_client(
        client: Arc<dyn ApiClient>,
        poll_interval: Duration,
        sink: Arc<dyn EventSink>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;
        let poller = StatusPoller::new(client.clone(), poll_interval);

        thread::Builder::new()
            .name("cnda-engine".to_string())
            .spawn(move || run_engine(runtime, client, poller, cmd_rx, sink))?;

        Ok(Self { cmd_tx })
    }

    pub fn login(&self, username: impl Into<String>, password: impl Into<String>) {
        self.send(EngineCommand::Login {
            username: username.into(),
            password: password.into(),
        });
    }

    pub fn load_projects(&self) {
        self.send(EngineCommand::LoadProjects);
    }

    pub fn load_subjects(&self, project_id: impl Into<String>) {
        self.send(EngineCommand::LoadSubjects {
            project_id: project_id.into(),
        });
    }

    pub fn submit(&self, request: DownloadRequest) {
        self.send(EngineCommand::Submit(request));
    }

    pub fn start_polling(&self, job_id: Uuid) {
        self.send(EngineCommand::StartPolling { job_id });
    }

    pub fn stop_polling(&self, job_id: Uuid) {
        self.send(EngineCommand::StopPolling { job_id });
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

fn run_engine(
    runtime: tokio::runtime::Runtime,
    client: Arc<dyn ApiClient>,
    poller: StatusPoller,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    sink: Arc<dyn EventSink>,
) {
    let mut pollers: HashMap<Uuid, PollerHandle> = HashMap::new();

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::StartPolling { job_id } => {
                let handle = poller.spawn(runtime.handle(), job_id, sink.clone());
                // A replaced handle is dropped, which cancels its loop.
                pollers.insert(job_id, handle);
            }
            EngineCommand::StopPolling { job_id } => {
                if let Some(handle) = pollers.remove(&job_id) {
                    handle.cancel();
                }
            }
            request => {
                let client = client.clone();
                let sink = sink.clone();
                runtime.spawn(async move {
                    handle_request(client.as_ref(), request, sink.as_ref()).await;
                });
            }
        }
    }

    cnda_debug!("Engine shutting down; cancelling {} poller(s)", pollers.len());
    drop(pollers);
    runtime.shutdown_background();
}

async fn handle_request(client: &dyn ApiClient, command: EngineCommand, sink: &dyn EventSink) {
    match command {
        EngineCommand::Login { username, password } => {
            let result = client.login(&username, &password).await;
            sink.emit(EngineEvent::LoginCompleted(result));
        }
        EngineCommand::LoadProjects => {
            let result = client.projects().await;
            sink.emit(EngineEvent::ProjectsLoaded(result));
        }
        EngineCommand::LoadSubjects { project_id } => {
            let result = client.subjects(&project_id).await;
            sink.emit(EngineEvent::SubjectsLoaded { project_id, result });
        }
        EngineCommand::Submit(request) => {
            let result = submit_download(client, &request).await;
            sink.emit(EngineEvent::DownloadSubmitted {
                job_id: request.download_job_id,
                result,
            });
        }
        EngineCommand::StartPolling { .. } | EngineCommand::StopPolling { .. } => {}
    }
}
