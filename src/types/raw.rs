// src/types/raw.rs
//! Job shapes as the directory service returns them, before normalization

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::NormalizationError;

/// The two record layouts the service has emitted over time.
///
/// Alternate spellings of a field are kept as separate members so a record
/// carrying both still parses; the normalizer picks one.
#[derive(Debug, Clone, PartialEq)]
pub enum RawJob {
    /// Employer identity under an `organisation` object, snake_case taxonomy keys
    Nested(NestedJob),
    /// Employer as top-level `company`/`location`, camelCase taxonomy keys
    Flat(FlatJob),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawOrganisation {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NestedJob {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub organisation: RawOrganisation,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub salary: Option<Value>,
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub created_at: Option<Value>,
    #[serde(default)]
    pub posted_at: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub job_responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub job_requirements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub job_benefits: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatJob {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default, rename = "type")]
    pub job_type: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub salary: Option<Value>,
    #[serde(default)]
    pub posted_date: Option<Value>,
    #[serde(default)]
    pub posted_at: Option<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub responsibilities: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub qualifications: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub requirements: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub benefits: Vec<String>,
}

impl RawJob {
    /// Pick the variant parser from the presence of an `organisation` object
    pub fn from_value(raw: &Value) -> Result<Self, NormalizationError> {
        let object = raw.as_object().ok_or(NormalizationError::NotAnObject)?;

        if object.get("organisation").is_some_and(Value::is_object) {
            serde_json::from_value(raw.clone())
                .map(RawJob::Nested)
                .map_err(malformed)
        } else {
            serde_json::from_value(raw.clone())
                .map(RawJob::Flat)
                .map_err(malformed)
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn malformed(err: serde_json::Error) -> NormalizationError {
    NormalizationError::Malformed {
        field: "record",
        reason: err.to_string(),
    }
}
