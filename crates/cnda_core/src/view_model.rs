use crate::{JobId, ProgressTier, Screen, SubjectStatus};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub screen: Screen,
    pub notice: Option<String>,
    pub login_pending: bool,
    /// `None` renders as a loading placeholder.
    pub projects: Option<Vec<ProjectRowView>>,
    pub can_continue: bool,
    pub project_id: Option<String>,
    /// `None` renders as a loading placeholder.
    pub subjects: Option<Vec<SubjectRowView>>,
    pub selected_count: usize,
    pub job: Option<JobView>,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRowView {
    pub project_id: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRowView {
    pub subject_id: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobView {
    pub job_id: JobId,
    pub project_id: String,
    pub rows: Vec<SubjectProgressView>,
    pub terminal: bool,
    pub complete: usize,
    pub failed: usize,
    pub last_polled_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectProgressView {
    pub subject_id: String,
    pub status: SubjectStatus,
    pub tier: ProgressTier,
}
