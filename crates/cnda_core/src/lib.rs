//! CNDA core: pure download-job state machine and view-model helpers.
mod effect;
mod job;
mod msg;
mod selection;
mod state;
mod status;
mod update;
mod view_model;

pub use effect::Effect;
pub use job::{reconcile, DownloadJob, JobId, PolledStatuses, StatusMap};
pub use msg::{LoginOutcome, Msg, SubmitOutcome};
pub use selection::{SelectionContext, SelectionError, SubjectSelection};
pub use state::{AppState, Screen};
pub use status::{ProgressTier, SubjectStatus};
pub use update::update;
pub use view_model::{AppViewModel, JobView, ProjectRowView, SubjectProgressView, SubjectRowView};
