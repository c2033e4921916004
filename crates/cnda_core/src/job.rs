use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use cnda_logging::cnda_warn;
use uuid::Uuid;

use crate::{SelectionContext, SubjectStatus};

/// Correlation key shared by the submit request and every status poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(Uuid);

impl JobId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for JobId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

pub type StatusMap = BTreeMap<String, SubjectStatus>;

/// Raw subject -> status strings as returned by the status endpoint.
pub type PolledStatuses = BTreeMap<String, String>;

/// Merges a poll response into the current statuses and returns the new map.
///
/// The key set of `current` is preserved: subjects missing from `polled`, or
/// reported with an unknown status, keep their previous value, and keys that
/// are not part of the job are ignored.
pub fn reconcile(current: &StatusMap, polled: &PolledStatuses) -> StatusMap {
    for subject in polled.keys().filter(|k| !current.contains_key(*k)) {
        cnda_warn!("Ignoring status for subject {} outside the job", subject);
    }

    current
        .iter()
        .map(|(subject, previous)| {
            let next = match polled.get(subject) {
                None => *previous,
                Some(raw) => SubjectStatus::from_wire(raw).unwrap_or_else(|| {
                    cnda_warn!("Unknown status {:?} for subject {}", raw, subject);
                    *previous
                }),
            };
            (subject.clone(), next)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    job_id: JobId,
    project_id: String,
    subject_ids: Vec<String>,
    status_by_subject: StatusMap,
}

impl DownloadJob {
    /// Consumes the handoff; every subject starts out `Submitting`.
    pub fn new(job_id: JobId, selection: SelectionContext) -> Self {
        let (project_id, subject_ids) = selection.into_parts();
        let status_by_subject = all_submitting(&subject_ids);
        Self {
            job_id,
            project_id,
            subject_ids,
            status_by_subject,
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Subjects in the order the selection screen listed them.
    pub fn subject_ids(&self) -> &[String] {
        &self.subject_ids
    }

    pub fn status_by_subject(&self) -> &StatusMap {
        &self.status_by_subject
    }

    pub fn status_of(&self, subject_id: &str) -> Option<SubjectStatus> {
        self.status_by_subject.get(subject_id).copied()
    }

    /// Copy of the job with every subject reset to the optimistic default.
    pub fn with_all_submitting(&self) -> Self {
        Self {
            status_by_subject: all_submitting(&self.subject_ids),
            ..self.clone()
        }
    }

    /// Copy of the job with a poll response applied.
    pub fn reconciled(&self, polled: &PolledStatuses) -> Self {
        Self {
            status_by_subject: reconcile(&self.status_by_subject, polled),
            ..self.clone()
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status_by_subject.values().all(|s| s.is_terminal())
    }

    pub fn count(&self, status: SubjectStatus) -> usize {
        self.status_by_subject
            .values()
            .filter(|s| **s == status)
            .count()
    }
}

fn all_submitting(subject_ids: &[String]) -> StatusMap {
    subject_ids
        .iter()
        .map(|id| (id.clone(), SubjectStatus::Submitting))
        .collect()
}
