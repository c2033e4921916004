use std::sync::mpsc;

use chrono::Utc;
use cnda_core::{Effect, JobId, LoginOutcome, Msg, SubmitOutcome};
use cnda_engine::{generate_job_id, DownloadRequest, EngineEvent, EngineHandle, EventSink};
use cnda_logging::{cnda_debug, cnda_info};

use super::app::AppEvent;

/// Carries effects from the core into the engine.
pub struct EffectRunner {
    engine: EngineHandle,
    stop_on_completion: bool,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, stop_on_completion: bool) -> Self {
        Self {
            engine,
            stop_on_completion,
        }
    }

    /// Executes `effects`, returning messages that must be dispatched
    /// right away.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_up = Vec::new();
        for effect in effects {
            cnda_debug!("Running effect {:?}", effect);
            match effect {
                Effect::Login { username, password } => self.engine.login(username, password),
                Effect::LoadProjects => self.engine.load_projects(),
                Effect::LoadSubjects { project_id } => self.engine.load_subjects(project_id),
                Effect::OpenDownloads { selection } => {
                    let job_id = JobId::from_uuid(generate_job_id());
                    follow_up.push(Msg::DownloadViewOpened {
                        job_id,
                        selection: Some(selection),
                    });
                }
                Effect::SubmitDownload {
                    job_id,
                    project_id,
                    subject_ids,
                } => self.engine.submit(DownloadRequest {
                    download_job_id: job_id.as_uuid(),
                    subject_ids,
                    project_id,
                }),
                Effect::StartPolling { job_id } => self.engine.start_polling(job_id.as_uuid()),
                Effect::StopPolling { job_id } => self.engine.stop_polling(job_id.as_uuid()),
                Effect::JobFinished { job_id } => {
                    if self.stop_on_completion {
                        cnda_info!("Job {} finished; stopping its poller", job_id);
                        self.engine.stop_polling(job_id.as_uuid());
                    } else {
                        cnda_info!("Job {} finished; polling continues until closed", job_id);
                    }
                }
            }
        }
        follow_up
    }
}

/// Translates engine events into core messages on the shell's queue.
pub struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl MsgSink {
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for MsgSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(AppEvent::Msg(map_event(event)));
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::LoginCompleted(result) => Msg::LoginCompleted(match result {
            Ok(0) => LoginOutcome::Accepted,
            Ok(status) => LoginOutcome::Rejected { status },
            Err(err) => LoginOutcome::Failed(err.to_string()),
        }),
        EngineEvent::ProjectsLoaded(result) => {
            Msg::ProjectsLoaded(result.map_err(|err| err.to_string()))
        }
        EngineEvent::SubjectsLoaded { project_id, result } => Msg::SubjectsLoaded {
            project_id,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::DownloadSubmitted { job_id, result } => Msg::SubmissionSettled {
            job_id: JobId::from_uuid(job_id),
            outcome: match result {
                Ok(()) => SubmitOutcome::Acknowledged,
                Err(err) => SubmitOutcome::TransportFailed(err.to_string()),
            },
        },
        EngineEvent::StatusPolled { job_id, result } => match result {
            Ok(statuses) => Msg::StatusPolled {
                job_id: JobId::from_uuid(job_id),
                statuses,
                polled_at: Utc::now().to_rfc3339(),
            },
            Err(err) => Msg::PollFailed {
                job_id: JobId::from_uuid(job_id),
                reason: err.to_string(),
            },
        },
    }
}
