use std::fmt;

/// Per-subject download status as shown in the job view.
///
/// `Submitting` is the only locally-originated value; everything else comes
/// from the status endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum SubjectStatus {
    #[default]
    Submitting,
    Queued,
    InProgress,
    Complete,
    Failed,
}

impl SubjectStatus {
    pub const ALL: [SubjectStatus; 5] = [
        SubjectStatus::Submitting,
        SubjectStatus::Queued,
        SubjectStatus::InProgress,
        SubjectStatus::Complete,
        SubjectStatus::Failed,
    ];

    /// Parses a status string as sent by the backend. Returns `None` for
    /// anything outside the wire vocabulary.
    pub fn from_wire(raw: &str) -> Option<Self> {
        match raw {
            "queued" => Some(SubjectStatus::Queued),
            "in_progress" => Some(SubjectStatus::InProgress),
            "complete" => Some(SubjectStatus::Complete),
            "failed" => Some(SubjectStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SubjectStatus::Complete | SubjectStatus::Failed)
    }

    pub fn tier(self) -> ProgressTier {
        match self {
            SubjectStatus::Submitting | SubjectStatus::Queued => ProgressTier::Neutral,
            SubjectStatus::InProgress => ProgressTier::Active,
            SubjectStatus::Complete => ProgressTier::Success,
            SubjectStatus::Failed => ProgressTier::Danger,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SubjectStatus::Submitting => "sending request...",
            SubjectStatus::Queued => "queued",
            SubjectStatus::InProgress => "in_progress",
            SubjectStatus::Complete => "complete",
            SubjectStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for SubjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Presentation tier of a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProgressTier {
    Neutral,
    Active,
    Success,
    Danger,
}

impl ProgressTier {
    /// Animated tiers are drawn with moving stripes; terminal tiers are static.
    pub fn is_animated(self) -> bool {
        matches!(self, ProgressTier::Neutral | ProgressTier::Active)
    }
}
