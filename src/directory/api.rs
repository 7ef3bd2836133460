// src/directory/api.rs
use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::types::{Applicant, ApplicantList, Application, ApplicationReceipt, ApplicationStatus, NewJob};

/// Transport seam for the job directory service. Job bodies come back raw and
/// are normalized by the adapter.
#[async_trait]
pub trait JobDirectoryApi: Send + Sync {
    /// `GET /jobs` with the given filter parameters
    async fn list_jobs(&self, params: &[(&'static str, String)]) -> Result<Vec<Value>>;

    /// `GET /jobs/{id}`
    async fn get_job(&self, id: &str) -> Result<Value>;

    /// `POST /jobs`
    async fn create_job(&self, job: &NewJob) -> Result<Value>;

    /// `PUT /jobs/{id}`
    async fn update_job(&self, id: &str, job: &NewJob) -> Result<Value>;

    /// `DELETE /jobs/{id}`
    async fn delete_job(&self, id: &str) -> Result<()>;

    /// `POST /jobs/{id}/apply`
    async fn apply(&self, id: &str, application: &Application) -> Result<ApplicationReceipt>;

    /// `GET /view_job_applicants/{id}`
    async fn applicants(&self, id: &str) -> Result<ApplicantList>;

    /// `PUT /jobs/{id}/applications/{application_id}` with `{status}`
    async fn update_application_status(
        &self,
        job_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Applicant>;
}
