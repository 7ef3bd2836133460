// src/types/response.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, ValidationError};
use crate::normalizer::parse_posted_at;

// ===== Applications =====

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_letter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationReceipt {
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

fn default_status() -> String {
    "submitted".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub applied_at: Option<DateTime<Utc>>,
}

/// Same formats as job posting dates; an unreadable date is dropped, not fatal
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(value) => match parse_posted_at(&value) {
            Ok(at) => Some(at),
            Err(e) => {
                debug!("Ignoring applicant timestamp: {}", e);
                None
            }
        },
    })
}

/// Stages a candidate moves through during review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 4] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn code(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Strict lookup by code or label, case-insensitive
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|s| s.code().eq_ignore_ascii_case(trimmed) || s.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                ValidationError::new(
                    "status",
                    value,
                    "expected one of pending, shortlisted, accepted, rejected",
                )
            })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantList {
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    #[serde(default)]
    pub amount: usize,
}

impl ApplicantList {
    /// Services sometimes omit `amount`; fall back to the list length
    pub fn count(&self) -> usize {
        self.amount.max(self.applicants.len())
    }
}

// ===== Identity =====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    #[serde(alias = "jobseeker", alias = "job-seeker")]
    JobSeeker,
    #[serde(alias = "employer")]
    Organisation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Value,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<AccountRole>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "firstname", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.first_name.as_deref())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "userType", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<AccountRole>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl LoginResponse {
    pub fn bearer(&mut self) -> Result<String, Error> {
        self.token
            .take()
            .or_else(|| self.access_token.take())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::decode("login response carried no token"))
    }
}

// ===== Envelopes =====

/// Accept a bare array or one wrapped under any of `keys`
pub fn unwrap_list(body: Value, keys: &[&str]) -> Result<Vec<Value>, Error> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| Error::decode(format!("expected a list under one of {:?}", keys))),
        other => Err(Error::decode(format!("expected a list, got {}", other))),
    }
}

/// Accept a bare object or one wrapped under `key`
pub fn unwrap_object(body: Value, key: &str) -> Result<Value, Error> {
    match body {
        Value::Object(mut map) => match map.remove(key) {
            Some(inner @ Value::Object(_)) => Ok(inner),
            Some(other) => {
                map.insert(key.to_string(), other);
                Ok(Value::Object(map))
            }
            None => Ok(Value::Object(map)),
        },
        other => Err(Error::decode(format!("expected an object, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_unwrap_list_variants() {
        assert_eq!(unwrap_list(json!([1, 2]), &["jobs"]).unwrap().len(), 2);
        assert_eq!(
            unwrap_list(json!({"applicable_jobs": [1]}), &["jobs", "applicable_jobs"])
                .unwrap()
                .len(),
            1
        );
        assert!(unwrap_list(json!({"data": []}), &["jobs"]).is_err());
        assert!(unwrap_list(json!("nope"), &["jobs"]).is_err());
    }

    #[test]
    fn test_unwrap_object_envelope() {
        let wrapped = json!({"job": {"id": 7}, "message": "ok"});
        assert_eq!(unwrap_object(wrapped, "job").unwrap(), json!({"id": 7}));

        let bare = json!({"id": 7, "title": "Nurse"});
        assert_eq!(unwrap_object(bare.clone(), "job").unwrap(), bare);
    }

    #[test]
    fn test_applicant_count_fallback() {
        let list: ApplicantList =
            serde_json::from_value(json!({"applicants": [{"name": "A"}, {"name": "B"}]})).unwrap();
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn test_role_aliases() {
        let user: UserProfile =
            serde_json::from_value(json!({"id": 3, "role": "employer", "firstname": "Wanjiru"}))
                .unwrap();
        assert_eq!(user.role, Some(AccountRole::Organisation));
        assert_eq!(user.display_name(), Some("Wanjiru"));

        let user: UserProfile =
            serde_json::from_value(json!({"id": 3, "name": "Wanjiru Kamau", "firstname": "Wanjiru"}))
                .unwrap();
        assert_eq!(user.display_name(), Some("Wanjiru Kamau"));
    }

    #[test]
    fn test_login_token_spellings() {
        let mut both: LoginResponse =
            serde_json::from_value(json!({"token": "a", "access_token": "b"})).unwrap();
        assert_eq!(both.bearer().unwrap(), "a");

        let mut access: LoginResponse = serde_json::from_value(json!({"access_token": "b"})).unwrap();
        assert_eq!(access.bearer().unwrap(), "b");

        let mut none: LoginResponse = serde_json::from_value(json!({"message": "ok"})).unwrap();
        assert!(none.bearer().is_err());
    }

    #[test]
    fn test_applicant_dates_are_lenient() {
        let list: ApplicantList = serde_json::from_value(json!({
            "applicants": [
                {"name": "A", "applied_at": "Tue, 05 Mar 2024 09:30:00 GMT"},
                {"name": "B", "applied_at": "2024-03-06T10:00:00Z"},
                {"name": "C", "applied_at": "yesterday"},
                {"name": "D", "applied_at": null}
            ],
            "amount": 4
        }))
        .unwrap();

        assert_eq!(list.count(), 4);
        assert_eq!(
            list.applicants[0].applied_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap())
        );
        assert!(list.applicants[1].applied_at.is_some());
        assert_eq!(list.applicants[2].applied_at, None);
        assert_eq!(list.applicants[3].applied_at, None);
    }

    #[test]
    fn test_application_status_table() {
        assert_eq!(ApplicationStatus::parse("Shortlisted").unwrap(), ApplicationStatus::Shortlisted);
        assert_eq!(ApplicationStatus::parse(" accepted ").unwrap(), ApplicationStatus::Accepted);
        let err = ApplicationStatus::parse("hired").unwrap_err();
        assert_eq!(err.field, "status");
        assert_eq!(
            serde_json::to_value(StatusUpdate {
                status: ApplicationStatus::Rejected
            })
            .unwrap(),
            json!({"status": "rejected"})
        );
    }
}
