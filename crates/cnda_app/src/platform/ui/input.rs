//! Turns a line typed at the prompt into core messages.
//!
//! Row numbers are 1-based and refer to the rows of the current view.

use cnda_core::{AppViewModel, Msg, Screen};

use super::constants::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Dispatch(Vec<Msg>),
    Help,
    Quit,
    Invalid(String),
}

pub fn parse_input(view: &AppViewModel, line: &str) -> InputAction {
    let line = line.trim();
    if line.is_empty() {
        return InputAction::Dispatch(vec![Msg::NoOp]);
    }
    let lower = line.to_ascii_lowercase();
    if CMD_QUIT.contains(&lower.as_str()) {
        return InputAction::Quit;
    }
    if CMD_HELP.contains(&lower.as_str()) {
        return InputAction::Help;
    }

    match view.screen {
        Screen::Login => parse_login(line),
        Screen::Projects => parse_projects(view, line, &lower),
        Screen::Subjects => parse_subjects(view, line, &lower),
        Screen::Downloads => {
            if CMD_BACK.contains(&lower.as_str()) {
                InputAction::Dispatch(vec![Msg::BackClicked])
            } else {
                InputAction::Invalid("type 'back' to close the download view".into())
            }
        }
    }
}

/// The first word is the username; everything after the following run of
/// whitespace is the password, inner spaces included.
fn parse_login(line: &str) -> InputAction {
    let parsed = line
        .split_once(char::is_whitespace)
        .map(|(username, rest)| (username, rest.trim_start()))
        .filter(|(_, password)| !password.is_empty());
    match parsed {
        Some((username, password)) => InputAction::Dispatch(vec![Msg::LoginSubmitted {
            username: username.to_string(),
            password: password.to_string(),
        }]),
        None => InputAction::Invalid("expected: <username> <password>".into()),
    }
}

fn parse_projects(view: &AppViewModel, line: &str, lower: &str) -> InputAction {
    if CMD_CONTINUE.contains(&lower) {
        return InputAction::Dispatch(vec![Msg::ContinueClicked]);
    }
    let Some(rows) = &view.projects else {
        return InputAction::Invalid("projects are still loading".into());
    };
    let ids: Vec<&str> = rows.iter().map(|row| row.project_id.as_str()).collect();
    match resolve_row(&ids, line) {
        Some(project_id) => InputAction::Dispatch(vec![Msg::ProjectChosen(project_id)]),
        None => InputAction::Invalid(format!("no project {line:?}")),
    }
}

fn parse_subjects(view: &AppViewModel, line: &str, lower: &str) -> InputAction {
    if CMD_PROCEED.contains(&lower) {
        return InputAction::Dispatch(vec![Msg::ProceedClicked]);
    }
    if CMD_BACK.contains(&lower) {
        return InputAction::Dispatch(vec![Msg::BackClicked]);
    }
    let Some(rows) = &view.subjects else {
        return InputAction::Invalid("subjects are still loading".into());
    };
    let ids: Vec<&str> = rows.iter().map(|row| row.subject_id.as_str()).collect();

    let mut msgs = Vec::new();
    for token in line.split_whitespace() {
        match resolve_row(&ids, token) {
            Some(subject_id) => msgs.push(Msg::SubjectToggled(subject_id)),
            None => return InputAction::Invalid(format!("no subject {token:?}")),
        }
    }
    InputAction::Dispatch(msgs)
}

/// Accepts either a 1-based row number or an exact id.
fn resolve_row(ids: &[&str], token: &str) -> Option<String> {
    if let Some(id) = ids.iter().find(|id| **id == token) {
        return Some((*id).to_string());
    }
    let index: usize = token.parse().ok()?;
    ids.get(index.checked_sub(1)?).map(|id| (*id).to_string())
}

pub fn help_lines(screen: Screen) -> Vec<String> {
    let specific = match screen {
        Screen::Login => "<username> <password>   sign in",
        Screen::Projects => "<n|id> choose a project, 'continue' to list its subjects",
        Screen::Subjects => "<n|id>... toggle subjects, 'proceed' to download, 'back'",
        Screen::Downloads => "'back' closes the download view and stops polling",
    };
    vec![
        specific.to_string(),
        "'help' shows this text, 'quit' exits".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use cnda_core::{ProjectRowView, SubjectRowView};
    use pretty_assertions::assert_eq;

    use super::*;

    fn projects_view() -> AppViewModel {
        AppViewModel {
            screen: Screen::Projects,
            projects: Some(
                ["NP1173", "MSC"]
                    .iter()
                    .map(|id| ProjectRowView {
                        project_id: id.to_string(),
                        selected: false,
                    })
                    .collect(),
            ),
            ..AppViewModel::default()
        }
    }

    fn subjects_view() -> AppViewModel {
        AppViewModel {
            screen: Screen::Subjects,
            project_id: Some("MSC".into()),
            subjects: Some(
                ["MSC01", "MSC02", "MSC03"]
                    .iter()
                    .map(|id| SubjectRowView {
                        subject_id: id.to_string(),
                        selected: false,
                    })
                    .collect(),
            ),
            ..AppViewModel::default()
        }
    }

    #[test]
    fn login_needs_username_and_password() {
        let view = AppViewModel::default();
        assert_eq!(
            parse_input(&view, "alice s3cret"),
            InputAction::Dispatch(vec![Msg::LoginSubmitted {
                username: "alice".into(),
                password: "s3cret".into(),
            }])
        );
        assert!(matches!(parse_input(&view, "alice"), InputAction::Invalid(_)));
        assert!(matches!(parse_input(&view, "alice   "), InputAction::Invalid(_)));
    }

    #[test]
    fn password_keeps_inner_spaces() {
        let view = AppViewModel::default();
        assert_eq!(
            parse_input(&view, "alice  correct horse  battery"),
            InputAction::Dispatch(vec![Msg::LoginSubmitted {
                username: "alice".into(),
                password: "correct horse  battery".into(),
            }])
        );
    }

    #[test]
    fn projects_resolve_by_number_or_id() {
        let view = projects_view();
        assert_eq!(
            parse_input(&view, "2"),
            InputAction::Dispatch(vec![Msg::ProjectChosen("MSC".into())])
        );
        assert_eq!(
            parse_input(&view, "NP1173"),
            InputAction::Dispatch(vec![Msg::ProjectChosen("NP1173".into())])
        );
        assert_eq!(
            parse_input(&view, "Continue"),
            InputAction::Dispatch(vec![Msg::ContinueClicked])
        );
        assert!(matches!(parse_input(&view, "0"), InputAction::Invalid(_)));
        assert!(matches!(parse_input(&view, "9"), InputAction::Invalid(_)));
    }

    #[test]
    fn several_subjects_toggle_in_one_line() {
        let view = subjects_view();
        assert_eq!(
            parse_input(&view, "1 MSC03"),
            InputAction::Dispatch(vec![
                Msg::SubjectToggled("MSC01".into()),
                Msg::SubjectToggled("MSC03".into()),
            ])
        );
        assert!(matches!(parse_input(&view, "1 7"), InputAction::Invalid(_)));
        assert_eq!(
            parse_input(&view, "go"),
            InputAction::Dispatch(vec![Msg::ProceedClicked])
        );
    }

    #[test]
    fn global_commands_work_everywhere() {
        let view = subjects_view();
        assert_eq!(parse_input(&view, "quit"), InputAction::Quit);
        assert_eq!(parse_input(&view, "?"), InputAction::Help);
        assert_eq!(
            parse_input(&view, "   "),
            InputAction::Dispatch(vec![Msg::NoOp])
        );
    }

    #[test]
    fn download_view_only_understands_back() {
        let view = AppViewModel {
            screen: Screen::Downloads,
            ..AppViewModel::default()
        };
        assert_eq!(
            parse_input(&view, "back"),
            InputAction::Dispatch(vec![Msg::BackClicked])
        );
        assert!(matches!(parse_input(&view, "1"), InputAction::Invalid(_)));
    }
}
