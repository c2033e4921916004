use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no project selected")]
    MissingProject,
    #[error("select at least one subject")]
    NoSubjects,
    #[error("download view opened without a subject selection")]
    MissingHandoff,
}

/// Subjects ticked on the selection screen.
///
/// Every change yields a new value; the set held by the state is never
/// edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubjectSelection {
    subjects: BTreeSet<String>,
}

impl SubjectSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(&self, subject_id: &str, selected: bool) -> Self {
        let mut subjects = self.subjects.clone();
        if selected {
            subjects.insert(subject_id.to_owned());
        } else {
            subjects.remove(subject_id);
        }
        Self { subjects }
    }

    pub fn toggled(&self, subject_id: &str) -> Self {
        self.with(subject_id, !self.contains(subject_id))
    }

    pub fn contains(&self, subject_id: &str) -> bool {
        self.subjects.contains(subject_id)
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.subjects.iter().map(String::as_str)
    }
}

/// Typed handoff from the subject screen to the download view.
///
/// Subjects keep the order they were given in; repeats are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionContext {
    project_id: String,
    subject_ids: Vec<String>,
}

impl SelectionContext {
    pub fn new<I, S>(project_id: impl Into<String>, subject_ids: I) -> Result<Self, SelectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(SelectionError::MissingProject);
        }
        let mut seen = BTreeSet::new();
        let subject_ids: Vec<String> = subject_ids
            .into_iter()
            .map(Into::into)
            .filter(|id| seen.insert(id.clone()))
            .collect();
        if subject_ids.is_empty() {
            return Err(SelectionError::NoSubjects);
        }
        Ok(Self {
            project_id,
            subject_ids,
        })
    }

    /// Builds the handoff from the ticked subjects, in the order `listed`
    /// showed them.
    pub fn from_selection(
        project_id: impl Into<String>,
        listed: &[String],
        selection: &SubjectSelection,
    ) -> Result<Self, SelectionError> {
        Self::new(
            project_id,
            listed.iter().filter(|id| selection.contains(id)),
        )
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn subject_ids(&self) -> &[String] {
        &self.subject_ids
    }

    pub fn into_parts(self) -> (String, Vec<String>) {
        (self.project_id, self.subject_ids)
    }
}
