use crate::{JobId, PolledStatuses, SelectionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Backend answered `login_status == 0`.
    Accepted,
    /// Backend answered with a nonzero `login_status`.
    Rejected { status: i64 },
    /// The request never produced a usable answer.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Acknowledged,
    TransportFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User submitted the login form.
    LoginSubmitted { username: String, password: String },
    /// Engine answered the login request.
    LoginCompleted(LoginOutcome),
    /// Engine delivered the project catalog.
    ProjectsLoaded(Result<Vec<String>, String>),
    /// User picked a project from the catalog.
    ProjectChosen(String),
    /// User clicked Continue on the project screen.
    ContinueClicked,
    /// Engine delivered the subjects of a project.
    SubjectsLoaded {
        project_id: String,
        result: Result<Vec<String>, String>,
    },
    /// User ticked or unticked a subject.
    SubjectToggled(String),
    /// User clicked Proceed to Download.
    ProceedClicked,
    /// Shell mounted the download view with a fresh job id and the handoff.
    DownloadViewOpened {
        job_id: JobId,
        selection: Option<SelectionContext>,
    },
    /// The submit request settled, successfully or not.
    SubmissionSettled { job_id: JobId, outcome: SubmitOutcome },
    /// A well-formed status poll arrived.
    StatusPolled {
        job_id: JobId,
        statuses: PolledStatuses,
        polled_at: String,
    },
    /// A status poll failed at transport level or was malformed.
    PollFailed { job_id: JobId, reason: String },
    /// User left the current screen.
    BackClicked,
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Input that carries no intent, such as a blank line.
    NoOp,
}
