use cnda_logging::{cnda_info, cnda_warn};
use serde::Serialize;
use uuid::Uuid;

use crate::{ApiClient, ApiError};

/// Body of `POST /api/download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadRequest {
    pub download_job_id: Uuid,
    pub subject_ids: Vec<String>,
    pub project_id: String,
}

/// Issues the one-shot request that starts a job.
///
/// Only the transport outcome is reported; the acknowledgment body is logged.
/// Callers must not send an empty `subject_ids`; it is not re-checked here.
pub async fn submit_download(
    client: &dyn ApiClient,
    request: &DownloadRequest,
) -> Result<(), ApiError> {
    cnda_info!(
        "Submitting job {} for {} subject(s) of {}",
        request.download_job_id,
        request.subject_ids.len(),
        request.project_id
    );
    match client.submit_download(request).await {
        Ok(ack) => {
            cnda_info!("Job {} acknowledged: {}", request.download_job_id, ack);
            Ok(())
        }
        Err(err) => {
            cnda_warn!("Job {} submission failed: {}", request.download_job_id, err);
            Err(err)
        }
    }
}
