use crate::{JobId, SelectionContext};

#[derive(Clone, PartialEq, Eq)]
pub enum Effect {
    Login { username: String, password: String },
    LoadProjects,
    LoadSubjects { project_id: String },
    /// Generate a job id and mount the download view with this handoff.
    OpenDownloads { selection: SelectionContext },
    SubmitDownload {
        job_id: JobId,
        project_id: String,
        subject_ids: Vec<String>,
    },
    StartPolling { job_id: JobId },
    StopPolling { job_id: JobId },
    /// Every subject reached a terminal status.
    JobFinished { job_id: JobId },
}

// Hand-written so credentials never end up in logs.
impl std::fmt::Debug for Effect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Effect::Login { username, .. } => f
                .debug_struct("Login")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Effect::LoadProjects => f.write_str("LoadProjects"),
            Effect::LoadSubjects { project_id } => f
                .debug_struct("LoadSubjects")
                .field("project_id", project_id)
                .finish(),
            Effect::OpenDownloads { selection } => f
                .debug_struct("OpenDownloads")
                .field("selection", selection)
                .finish(),
            Effect::SubmitDownload {
                job_id,
                project_id,
                subject_ids,
            } => f
                .debug_struct("SubmitDownload")
                .field("job_id", job_id)
                .field("project_id", project_id)
                .field("subject_ids", subject_ids)
                .finish(),
            Effect::StartPolling { job_id } => f
                .debug_struct("StartPolling")
                .field("job_id", job_id)
                .finish(),
            Effect::StopPolling { job_id } => f
                .debug_struct("StopPolling")
                .field("job_id", job_id)
                .finish(),
            Effect::JobFinished { job_id } => f
                .debug_struct("JobFinished")
                .field("job_id", job_id)
                .finish(),
        }
    }
}
