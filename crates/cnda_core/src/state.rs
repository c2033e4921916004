use crate::view_model::{
    AppViewModel, JobView, ProjectRowView, SubjectProgressView, SubjectRowView,
};
use crate::{DownloadJob, SubjectSelection, SubjectStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Login,
    Projects,
    Subjects,
    Downloads,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    screen: Screen,
    login_pending: bool,
    notice: Option<String>,
    /// `None` while the catalog is loading.
    projects: Option<Vec<String>>,
    selected_project: Option<String>,
    /// `None` while the subject list is loading.
    subjects: Option<Vec<String>>,
    selection: SubjectSelection,
    job: Option<DownloadJob>,
    last_polled_at: Option<String>,
    submission_settled: bool,
    completion_reported: bool,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn job(&self) -> Option<&DownloadJob> {
        self.job.as_ref()
    }

    /// Returns whether anything changed since the last call and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            screen: self.screen,
            notice: self.notice.clone(),
            login_pending: self.login_pending,
            projects: self.projects.as_ref().map(|projects| {
                projects
                    .iter()
                    .map(|id| ProjectRowView {
                        project_id: id.clone(),
                        selected: self.selected_project.as_deref() == Some(id.as_str()),
                    })
                    .collect()
            }),
            can_continue: self.selected_project.is_some(),
            project_id: self.selected_project.clone(),
            subjects: self.subjects.as_ref().map(|subjects| {
                subjects
                    .iter()
                    .map(|id| SubjectRowView {
                        subject_id: id.clone(),
                        selected: self.selection.contains(id),
                    })
                    .collect()
            }),
            selected_count: self.selection.len(),
            job: self.job.as_ref().map(|job| self.job_view(job)),
            dirty: self.dirty,
        }
    }

    fn job_view(&self, job: &DownloadJob) -> JobView {
        JobView {
            job_id: job.job_id(),
            project_id: job.project_id().to_owned(),
            rows: job
                .subject_ids()
                .iter()
                .map(|subject_id| {
                    let status = job.status_of(subject_id).unwrap_or_default();
                    SubjectProgressView {
                        subject_id: subject_id.clone(),
                        status,
                        tier: status.tier(),
                    }
                })
                .collect(),
            terminal: job.is_terminal(),
            complete: job.count(SubjectStatus::Complete),
            failed: job.count(SubjectStatus::Failed),
            last_polled_at: self.last_polled_at.clone(),
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn clear_notice(&mut self) {
        if self.notice.take().is_some() {
            self.mark_dirty();
        }
    }

    pub(crate) fn is_login_pending(&self) -> bool {
        self.login_pending
    }

    pub(crate) fn set_login_pending(&mut self, pending: bool) {
        self.login_pending = pending;
        self.mark_dirty();
    }

    pub(crate) fn show_projects_loading(&mut self) {
        self.screen = Screen::Projects;
        self.projects = None;
        self.selected_project = None;
        self.mark_dirty();
    }

    pub(crate) fn return_to_projects(&mut self) {
        self.screen = Screen::Projects;
        self.subjects = None;
        self.selection = SubjectSelection::new();
        self.mark_dirty();
    }

    pub(crate) fn set_projects(&mut self, projects: Vec<String>) {
        self.projects = Some(projects);
        self.mark_dirty();
    }

    pub(crate) fn has_project(&self, project_id: &str) -> bool {
        self.projects
            .as_ref()
            .is_some_and(|projects| projects.iter().any(|p| p == project_id))
    }

    pub(crate) fn selected_project(&self) -> Option<&str> {
        self.selected_project.as_deref()
    }

    pub(crate) fn select_project(&mut self, project_id: String) {
        self.selected_project = Some(project_id);
        self.mark_dirty();
    }

    pub(crate) fn show_subjects_loading(&mut self) {
        self.screen = Screen::Subjects;
        self.subjects = None;
        self.selection = SubjectSelection::new();
        self.mark_dirty();
    }

    pub(crate) fn listed_subjects(&self) -> &[String] {
        self.subjects.as_deref().unwrap_or_default()
    }

    pub(crate) fn set_subjects(&mut self, subjects: Vec<String>) {
        self.subjects = Some(subjects);
        self.mark_dirty();
    }

    pub(crate) fn has_subject(&self, subject_id: &str) -> bool {
        self.subjects
            .as_ref()
            .is_some_and(|subjects| subjects.iter().any(|s| s == subject_id))
    }

    pub(crate) fn selection(&self) -> &SubjectSelection {
        &self.selection
    }

    pub(crate) fn set_selection(&mut self, selection: SubjectSelection) {
        self.selection = selection;
        self.mark_dirty();
    }

    pub(crate) fn show_downloads(&mut self) {
        self.screen = Screen::Downloads;
        self.mark_dirty();
    }

    pub(crate) fn install_job(&mut self, job: DownloadJob) {
        self.job = Some(job);
        self.last_polled_at = None;
        self.submission_settled = false;
        self.completion_reported = false;
        self.mark_dirty();
    }

    pub(crate) fn replace_job(&mut self, job: DownloadJob) {
        self.job = Some(job);
        self.mark_dirty();
    }

    pub(crate) fn take_job(&mut self) -> Option<DownloadJob> {
        self.last_polled_at = None;
        self.submission_settled = false;
        self.completion_reported = false;
        self.mark_dirty();
        self.job.take()
    }

    pub(crate) fn set_last_polled_at(&mut self, polled_at: String) {
        self.last_polled_at = Some(polled_at);
        self.mark_dirty();
    }

    pub(crate) fn is_submission_settled(&self) -> bool {
        self.submission_settled
    }

    pub(crate) fn mark_submission_settled(&mut self) {
        self.submission_settled = true;
    }

    /// Returns true the first time it is called for the current job.
    pub(crate) fn report_completion(&mut self) -> bool {
        !std::mem::replace(&mut self.completion_reported, true)
    }
}
