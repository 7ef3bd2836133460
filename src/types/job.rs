// src/types/job.rs
//! Canonical job record and the outgoing job payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::taxonomy::Taxonomy;

// ===== Canonical Job =====

/// A job as seen by the filter engine: taxonomy fields hold canonical codes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub employer_name: String,
    pub employer_location: String,
    pub category: String,
    pub employment_type: String,
    pub experience_level: String,
    pub salary_display: String,
    pub posted_at: DateTime<Utc>,
    pub responsibilities: Vec<String>,
    pub qualifications: Vec<String>,
    pub benefits: Vec<String>,
}

// ===== Outgoing Payload =====

/// Body for `POST /jobs` and `PUT /jobs/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub industry: String,
    pub level: String,
    pub job_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default)]
    pub job_responsibilities: Vec<String>,
    #[serde(default)]
    pub job_requirements: Vec<String>,
    #[serde(default)]
    pub job_benefits: Vec<String>,
}

impl NewJob {
    /// Resolve every taxonomy field to its code, rejecting anything outside the tables
    pub fn canonicalize(mut self) -> Result<Self, ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::new("title", "", "job title is required"));
        }

        self.industry = strict(Taxonomy::Industry, "industry", &self.industry)?;
        self.level = strict(Taxonomy::ExperienceLevel, "level", &self.level)?;
        self.job_type = strict(Taxonomy::EmploymentType, "job_type", &self.job_type)?;
        if let Some(location) = self.location.take() {
            self.location = Some(strict(Taxonomy::Location, "location", &location)?);
        }

        // Empty rows come from unfilled form inputs
        for list in [
            &mut self.job_responsibilities,
            &mut self.job_requirements,
            &mut self.job_benefits,
        ] {
            list.retain(|item| !item.trim().is_empty());
        }

        Ok(self)
    }
}

fn strict(taxonomy: Taxonomy, field: &'static str, value: &str) -> Result<String, ValidationError> {
    taxonomy.resolve(value).map(str::to_string).ok_or_else(|| {
        ValidationError::new(field, value, format!("not a known {}", taxonomy.name()))
    })
}
