use cnda_logging::{cnda_debug, cnda_error, cnda_info, cnda_warn};

use crate::{
    AppState, DownloadJob, Effect, LoginOutcome, Msg, Screen, SelectionContext, SelectionError,
    SubmitOutcome,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::LoginSubmitted { username, password } => {
            if state.screen() != Screen::Login || state.is_login_pending() {
                return (state, Vec::new());
            }
            state.clear_notice();
            state.set_login_pending(true);
            vec![Effect::Login { username, password }]
        }
        Msg::LoginCompleted(outcome) => {
            if state.screen() != Screen::Login || !state.is_login_pending() {
                return (state, Vec::new());
            }
            state.set_login_pending(false);
            match outcome {
                LoginOutcome::Accepted => {
                    state.clear_notice();
                    state.show_projects_loading();
                    vec![Effect::LoadProjects]
                }
                LoginOutcome::Rejected { status } => {
                    cnda_info!("Login rejected with status {}", status);
                    state.set_notice("Invalid username or password");
                    Vec::new()
                }
                LoginOutcome::Failed(reason) => {
                    cnda_warn!("Login request failed: {}", reason);
                    state.set_notice(format!("Login failed: {reason}"));
                    Vec::new()
                }
            }
        }
        Msg::ProjectsLoaded(result) => {
            if state.screen() != Screen::Projects {
                return (state, Vec::new());
            }
            match result {
                Ok(projects) => state.set_projects(projects),
                Err(reason) => {
                    cnda_warn!("Loading projects failed: {}", reason);
                    state.set_projects(Vec::new());
                    state.set_notice(format!("Could not load projects: {reason}"));
                }
            }
            Vec::new()
        }
        Msg::ProjectChosen(project_id) => {
            if state.screen() == Screen::Projects && state.has_project(&project_id) {
                state.select_project(project_id);
            }
            Vec::new()
        }
        Msg::ContinueClicked => {
            if state.screen() != Screen::Projects {
                return (state, Vec::new());
            }
            let Some(project_id) = state.selected_project().map(str::to_owned) else {
                return (state, Vec::new());
            };
            state.clear_notice();
            state.show_subjects_loading();
            vec![Effect::LoadSubjects { project_id }]
        }
        Msg::SubjectsLoaded { project_id, result } => {
            if state.screen() != Screen::Subjects
                || state.selected_project() != Some(project_id.as_str())
            {
                return (state, Vec::new());
            }
            match result {
                Ok(subjects) => state.set_subjects(subjects),
                Err(reason) => {
                    cnda_warn!("Loading subjects of {} failed: {}", project_id, reason);
                    state.set_subjects(Vec::new());
                    state.set_notice(format!("Could not load subjects: {reason}"));
                }
            }
            Vec::new()
        }
        Msg::SubjectToggled(subject_id) => {
            if state.screen() == Screen::Subjects && state.has_subject(&subject_id) {
                let next = state.selection().toggled(&subject_id);
                state.set_selection(next);
            }
            Vec::new()
        }
        Msg::ProceedClicked => {
            if state.screen() != Screen::Subjects {
                return (state, Vec::new());
            }
            let project_id = state.selected_project().unwrap_or_default().to_owned();
            match SelectionContext::from_selection(
                project_id,
                state.listed_subjects(),
                state.selection(),
            ) {
                Ok(selection) => {
                    state.clear_notice();
                    vec![Effect::OpenDownloads { selection }]
                }
                Err(err) => {
                    state.set_notice(err.to_string());
                    Vec::new()
                }
            }
        }
        Msg::DownloadViewOpened { job_id, selection } => {
            if state.job().is_some() {
                cnda_warn!("Download view already hosts a job; ignoring {}", job_id);
                return (state, Vec::new());
            }
            state.show_downloads();
            match selection {
                None => {
                    cnda_error!("{}", SelectionError::MissingHandoff);
                    state.set_notice(SelectionError::MissingHandoff.to_string());
                    Vec::new()
                }
                Some(selection) => {
                    let job = DownloadJob::new(job_id, selection);
                    cnda_info!(
                        "Created job {} for {} subject(s) of {}",
                        job_id,
                        job.subject_ids().len(),
                        job.project_id()
                    );
                    let effects = vec![
                        Effect::SubmitDownload {
                            job_id,
                            project_id: job.project_id().to_owned(),
                            subject_ids: job.subject_ids().to_vec(),
                        },
                        Effect::StartPolling { job_id },
                    ];
                    state.install_job(job);
                    effects
                }
            }
        }
        Msg::SubmissionSettled { job_id, outcome } => {
            let Some(job) = current_job(&state, job_id) else {
                return (state, Vec::new());
            };
            if let SubmitOutcome::TransportFailed(reason) = &outcome {
                cnda_warn!("Submitting job {} failed: {}", job_id, reason);
            }
            let next = job.with_all_submitting();
            state.replace_job(next);
            state.mark_submission_settled();
            Vec::new()
        }
        Msg::StatusPolled {
            job_id,
            statuses,
            polled_at,
        } => {
            let Some(job) = current_job(&state, job_id) else {
                return (state, Vec::new());
            };
            let next = job.reconciled(&statuses);
            let terminal = next.is_terminal();
            state.replace_job(next);
            state.set_last_polled_at(polled_at);
            // A settling submission resets every subject, so completion
            // only counts once the submit request has come back.
            if terminal && state.is_submission_settled() && state.report_completion() {
                cnda_info!("Job {} reached a terminal status", job_id);
                vec![Effect::JobFinished { job_id }]
            } else {
                Vec::new()
            }
        }
        Msg::PollFailed { job_id, reason } => {
            if current_job(&state, job_id).is_some() {
                cnda_warn!("Status poll for {} failed: {}", job_id, reason);
            }
            Vec::new()
        }
        Msg::BackClicked => match state.screen() {
            Screen::Subjects => {
                state.clear_notice();
                state.return_to_projects();
                Vec::new()
            }
            Screen::Downloads => {
                state.clear_notice();
                let effects = match state.take_job() {
                    Some(job) => vec![Effect::StopPolling {
                        job_id: job.job_id(),
                    }],
                    None => Vec::new(),
                };
                state.return_to_projects();
                effects
            }
            Screen::Login | Screen::Projects => Vec::new(),
        },
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// The hosted job, if `job_id` still refers to it. Results for torn-down or
/// foreign jobs are dropped here.
fn current_job(state: &AppState, job_id: crate::JobId) -> Option<&DownloadJob> {
    match state.job() {
        Some(job) if job.job_id() == job_id => Some(job),
        _ => {
            cnda_debug!("Dropping result for inactive job {}", job_id);
            None
        }
    }
}
