// src/view_model.rs
//! Presentation state derived from a filtered result; no matching happens here

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

use crate::taxonomy::Taxonomy;
use crate::types::JobRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultViewModel {
    pub count: usize,
    pub is_empty: bool,
    pub items: Vec<JobRecord>,
}

pub fn build_view_model(filtered: &[JobRecord]) -> ResultViewModel {
    ResultViewModel {
        count: filtered.len(),
        is_empty: filtered.is_empty(),
        items: filtered.to_vec(),
    }
}

impl ResultViewModel {
    /// The job opened for detail display, if it is still in the result
    pub fn select(&self, id: &str) -> Option<&JobRecord> {
        self.items.iter().find(|job| job.id == id)
    }

    pub fn cards(&self) -> Vec<JobCard> {
        self.items.iter().map(JobCard::from).collect()
    }

    pub fn headline(&self) -> String {
        match self.count {
            0 => "No jobs found matching your criteria".to_string(),
            1 => "1 Job Found".to_string(),
            n => format!("{} Jobs Found", n),
        }
    }
}

/// Human-readable rendering of one job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub employer: String,
    pub location: String,
    pub category: String,
    pub employment_type: String,
    pub experience_level: String,
    pub salary: String,
    pub posted: String,
}

impl From<&JobRecord> for JobCard {
    fn from(job: &JobRecord) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            employer: job.employer_name.clone(),
            location: Taxonomy::Location.to_human(&job.employer_location),
            category: Taxonomy::Industry.to_human(&job.category),
            employment_type: Taxonomy::EmploymentType.to_human(&job.employment_type),
            experience_level: Taxonomy::ExperienceLevel.to_human(&job.experience_level),
            salary: job.salary_display.clone(),
            posted: format_posted_date(&job.posted_at),
        }
    }
}

/// `5th March 2024`
pub fn format_posted_date(date: &DateTime<Utc>) -> String {
    format!("{}{} {}", date.day(), ordinal_suffix(date.day()), date.format("%B %Y"))
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
