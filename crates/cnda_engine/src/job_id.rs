use uuid::Uuid;

/// Fresh random (v4) job token. Call once per job, before submission.
pub fn generate_job_id() -> Uuid {
    Uuid::new_v4()
}
