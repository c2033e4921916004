use cnda_core::{AppViewModel, JobView, ProgressTier, Screen, SubjectProgressView};

use super::constants::BAR_WIDTH;

pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = match view.screen {
        Screen::Login => render_login(view),
        Screen::Projects => render_projects(view),
        Screen::Subjects => render_subjects(view),
        Screen::Downloads => render_downloads(view),
    };
    if let Some(notice) = &view.notice {
        lines.push(String::new());
        lines.push(format!("! {notice}"));
    }
    lines
}

fn render_login(view: &AppViewModel) -> Vec<String> {
    let prompt = if view.login_pending {
        "Signing in..."
    } else {
        "Enter: <username> <password>"
    };
    vec!["== CNDA Login ==".to_string(), prompt.to_string()]
}

fn render_projects(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec!["== Projects ==".to_string()];
    match &view.projects {
        None => lines.push("Loading Projects...".to_string()),
        Some(rows) if rows.is_empty() => lines.push("No projects available.".to_string()),
        Some(rows) => {
            for (index, row) in rows.iter().enumerate() {
                let mark = if row.selected { '*' } else { ' ' };
                lines.push(format!("{:>3}) ({mark}) {}", index + 1, row.project_id));
            }
            let hint = if view.can_continue {
                "Type 'continue' to list subjects."
            } else {
                "Pick a project by number or id."
            };
            lines.push(hint.to_string());
        }
    }
    lines
}

fn render_subjects(view: &AppViewModel) -> Vec<String> {
    let project = view.project_id.as_deref().unwrap_or("?");
    let mut lines = vec![format!("== Subjects of {project} ==")];
    match &view.subjects {
        None => lines.push("Loading Subjects...".to_string()),
        Some(rows) => {
            if rows.is_empty() {
                lines.push("No subjects in this project.".to_string());
            }
            for (index, row) in rows.iter().enumerate() {
                let mark = if row.selected { 'x' } else { ' ' };
                lines.push(format!("{:>3}) [{mark}] {}", index + 1, row.subject_id));
            }
            lines.push(format!(
                "{} selected. Toggle by number; 'proceed' to download.",
                view.selected_count
            ));
        }
    }
    lines
}

fn render_downloads(view: &AppViewModel) -> Vec<String> {
    let Some(job) = &view.job else {
        return vec!["== Downloads ==".to_string()];
    };
    let mut lines = vec![
        "== Downloads ==".to_string(),
        format!("Job {} for project {}", job.job_id, job.project_id),
    ];
    let width = job
        .rows
        .iter()
        .map(|row| row.subject_id.len())
        .max()
        .unwrap_or(0);
    lines.extend(job.rows.iter().map(|row| progress_line(row, width)));
    lines.push(summary_line(job));
    lines
}

fn progress_line(row: &SubjectProgressView, width: usize) -> String {
    format!(
        "Subject: {:<width$}  {}  {}",
        row.subject_id,
        progress_bar(row.tier),
        row.status.label(),
    )
}

/// Full-width bar; stripes mark the animated tiers.
pub fn progress_bar(tier: ProgressTier) -> String {
    let fill: String = match tier {
        ProgressTier::Neutral => "-".repeat(BAR_WIDTH),
        ProgressTier::Active => "=>".repeat(BAR_WIDTH / 2),
        ProgressTier::Success => "#".repeat(BAR_WIDTH),
        ProgressTier::Danger => "!".repeat(BAR_WIDTH),
    };
    let fill = if tier.is_animated() {
        fill.chars()
            .enumerate()
            .map(|(i, c)| if i % 4 == 3 { '/' } else { c })
            .collect()
    } else {
        fill
    };
    format!("[{fill}]")
}

fn summary_line(job: &JobView) -> String {
    let total = job.rows.len();
    let state = if job.terminal { "finished" } else { "running" };
    let polled = job
        .last_polled_at
        .as_deref()
        .map(|at| format!(", last update {at}"))
        .unwrap_or_default();
    format!(
        "{}/{} complete, {} failed ({state}{polled}). Type 'back' to close.",
        job.complete, total, job.failed
    )
}
