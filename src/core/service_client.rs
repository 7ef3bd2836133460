// src/core/service_client.rs
//! HTTP transport for the job directory and identity services

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, trace};

use crate::directory::JobDirectoryApi;
use crate::error::{Error, Result};
use crate::session::Session;
use crate::types::response::{unwrap_list, unwrap_object, StatusUpdate};
use crate::types::{Applicant, ApplicantList, Application, ApplicationReceipt, ApplicationStatus, NewJob};

const JOBS_ENDPOINT: &str = "/jobs";
const APPLICANTS_ENDPOINT: &str = "/view_job_applicants";

const LIST_KEYS: &[&str] = &["jobs", "applicable_jobs"];
const JOB_KEY: &str = "job";
const APPLICATION_KEY: &str = "application";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ServiceClient {
    pub fn new(base_url: impl Into<String>, timeout_seconds: u64, session: Arc<Session>) -> Result<Self> {
        let timeout = if timeout_seconds == 0 {
            DEFAULT_TIMEOUT_SECS
        } else {
            timeout_seconds
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| Error::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Generic GET returning the decoded JSON body
    pub async fn get<R>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<R>
    where
        R: DeserializeOwned,
    {
        let request = self.request(Method::GET, endpoint).query(query);
        let body = self.send(request).await?;
        decode(body)
    }

    /// Generic POST request with JSON
    pub async fn post_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.request(Method::POST, endpoint).json(payload);
        let body = self.send(request).await?;
        decode(body)
    }

    pub async fn put_json<T, R>(&self, endpoint: &str, payload: &T) -> Result<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.request(Method::PUT, endpoint).json(payload);
        let body = self.send(request).await?;
        decode(body)
    }

    pub async fn delete(&self, endpoint: &str) -> Result<()> {
        let request = self.request(Method::DELETE, endpoint);
        self.send(request).await.map(|_| ())
    }

    fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        trace!("{} {}", method, url);

        let request = self.client.request(method, &url);
        match self.session.bearer() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::network(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        trace!("Response status: {}", status);

        let text = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response text: {}", e)))?;

        if !status.is_success() {
            error!("Service error response {}: {}", status, text);
            return Err(classify_failure(status, &text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            debug!("Raw service response: {}", text);
            Error::decode(format!("Failed to parse JSON response: {}", e))
        })
    }
}

fn decode<R: DeserializeOwned>(body: Value) -> Result<R> {
    serde_json::from_value(body).map_err(|e| Error::decode(e.to_string()))
}

/// Map a non-success response to the error taxonomy, keeping the service's own message
pub fn classify_failure(status: StatusCode, body: &str) -> Error {
    let message = service_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    });

    if status == StatusCode::UNAUTHORIZED {
        Error::Auth { message }
    } else {
        Error::Server {
            status: status.as_u16(),
            message,
        }
    }
}

fn service_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| Some(body.to_string())),
        _ => Some(body.to_string()),
    }
}

#[async_trait]
impl JobDirectoryApi for ServiceClient {
    async fn list_jobs(&self, params: &[(&'static str, String)]) -> Result<Vec<Value>> {
        let body: Value = self.get(JOBS_ENDPOINT, params).await?;
        unwrap_list(body, LIST_KEYS)
    }

    async fn get_job(&self, id: &str) -> Result<Value> {
        let body: Value = self.get(&format!("{}/{}", JOBS_ENDPOINT, id), &[]).await?;
        unwrap_object(body, JOB_KEY)
    }

    async fn create_job(&self, job: &NewJob) -> Result<Value> {
        let body: Value = self.post_json(JOBS_ENDPOINT, job).await?;
        unwrap_object(body, JOB_KEY)
    }

    async fn update_job(&self, id: &str, job: &NewJob) -> Result<Value> {
        let body: Value = self.put_json(&format!("{}/{}", JOBS_ENDPOINT, id), job).await?;
        unwrap_object(body, JOB_KEY)
    }

    async fn delete_job(&self, id: &str) -> Result<()> {
        self.delete(&format!("{}/{}", JOBS_ENDPOINT, id)).await
    }

    async fn apply(&self, id: &str, application: &Application) -> Result<ApplicationReceipt> {
        let body: Value = self
            .post_json(&format!("{}/{}/apply", JOBS_ENDPOINT, id), application)
            .await?;
        // An empty 201 still counts as a submitted application
        let body = match body {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };
        let mut receipt: ApplicationReceipt = decode(body)?;
        if receipt.job_id.is_empty() {
            receipt.job_id = id.to_string();
        }
        Ok(receipt)
    }

    async fn applicants(&self, id: &str) -> Result<ApplicantList> {
        self.get(&format!("{}/{}", APPLICANTS_ENDPOINT, id), &[]).await
    }

    async fn update_application_status(
        &self,
        job_id: &str,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<Applicant> {
        let endpoint = format!("{}/{}/applications/{}", JOBS_ENDPOINT, job_id, application_id);
        let body: Value = self.put_json(&endpoint, &StatusUpdate { status }).await?;
        let body = match body {
            Value::Null => Value::Object(Default::default()),
            other => unwrap_object(other, APPLICATION_KEY)?,
        };

        let mut applicant: Applicant = decode(body)?;
        applicant.id.get_or_insert_with(|| Value::String(application_id.to_string()));
        applicant.status.get_or_insert_with(|| status.code().to_string());
        Ok(applicant)
    }
}
