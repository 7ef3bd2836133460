// src/normalizer.rs
//! Turns raw directory records of either layout into canonical `JobRecord`s

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::NormalizationError;
use crate::taxonomy::Taxonomy;
use crate::types::raw::{FlatJob, NestedJob, RawJob};
use crate::types::JobRecord;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Records that survived normalization, in fetch order, plus how many were dropped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedBatch {
    pub records: Vec<JobRecord>,
    pub dropped: usize,
}

/// Fields common to both layouts once they have been located
struct Fields {
    id: Option<Value>,
    title: Option<String>,
    description: Option<String>,
    employer_name: Option<String>,
    employer_location: Option<String>,
    category: Option<String>,
    employment_type: Option<String>,
    experience_level: Option<String>,
    salary: Option<Value>,
    posted_at: Option<Value>,
    responsibilities: Vec<String>,
    qualifications: Vec<String>,
    benefits: Vec<String>,
}

impl From<NestedJob> for Fields {
    fn from(job: NestedJob) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            employer_name: job.organisation.name,
            employer_location: job.organisation.location,
            category: job.industry,
            employment_type: job.job_type,
            experience_level: job.level,
            salary: job.salary,
            posted_at: job.timestamp.or(job.created_at).or(job.posted_at),
            responsibilities: job.job_responsibilities,
            qualifications: job.job_requirements,
            benefits: job.job_benefits,
        }
    }
}

impl From<FlatJob> for Fields {
    fn from(job: FlatJob) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            employer_name: job.company,
            employer_location: job.location,
            category: job.category,
            employment_type: job.employment_type.or(job.job_type),
            experience_level: job.experience_level,
            salary: job.salary,
            posted_at: job.posted_date.or(job.posted_at),
            responsibilities: job.responsibilities,
            qualifications: if job.qualifications.is_empty() {
                job.requirements
            } else {
                job.qualifications
            },
            benefits: job.benefits,
        }
    }
}

pub fn normalize(raw: &Value) -> Result<JobRecord, NormalizationError> {
    let fields = match RawJob::from_value(raw)? {
        RawJob::Nested(job) => Fields::from(job),
        RawJob::Flat(job) => Fields::from(job),
    };
    build_record(fields)
}

/// Normalize a fetched page, dropping unusable records instead of failing the page
pub fn normalize_batch(raws: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for raw in raws {
        match normalize(raw) {
            Ok(record) => batch.records.push(record),
            Err(e) => {
                debug!("Dropping job record: {}", e);
                batch.dropped += 1;
            }
        }
    }

    if batch.dropped > 0 {
        warn!(
            "Dropped {} of {} job records during normalization",
            batch.dropped,
            raws.len()
        );
    }

    batch
}

fn build_record(fields: Fields) -> Result<JobRecord, NormalizationError> {
    let id = parse_id(fields.id.as_ref())?;
    let title = required_text(fields.title, "title")?;
    let posted_at = match fields.posted_at {
        Some(value) if !value.is_null() => parse_posted_at(&value)?,
        _ => return Err(NormalizationError::MissingField("postedAt")),
    };

    let category = required_text(fields.category, "category")?;
    let employment_type = required_text(fields.employment_type, "employmentType")?;
    let experience_level = required_text(fields.experience_level, "experienceLevel")?;

    Ok(JobRecord {
        id,
        title,
        description: fields.description.unwrap_or_default(),
        employer_name: fields.employer_name.unwrap_or_default().trim().to_string(),
        employer_location: fields
            .employer_location
            .filter(|l| !l.trim().is_empty())
            .map(|l| Taxonomy::Location.to_code_lenient(&l))
            .unwrap_or_default(),
        category: Taxonomy::Industry.to_code_lenient(&category),
        employment_type: Taxonomy::EmploymentType.to_code_lenient(&employment_type),
        experience_level: Taxonomy::ExperienceLevel.to_code_lenient(&experience_level),
        salary_display: display_salary(fields.salary.as_ref()),
        posted_at,
        responsibilities: fields.responsibilities,
        qualifications: fields.qualifications,
        benefits: fields.benefits,
    })
}

fn parse_id(value: Option<&Value>) -> Result<String, NormalizationError> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        None | Some(Value::Null) => Err(NormalizationError::MissingField("id")),
        Some(Value::String(_)) => Err(NormalizationError::MissingField("id")),
        Some(other) => Err(NormalizationError::Malformed {
            field: "id",
            reason: format!("expected a string or number, got {}", other),
        }),
    }
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, NormalizationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(NormalizationError::MissingField(field))
}

fn display_salary(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Accepts RFC 3339, RFC 2822, naive ISO datetimes, plain dates and epoch milliseconds
pub fn parse_posted_at(value: &Value) -> Result<DateTime<Utc>, NormalizationError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
            .ok_or_else(|| NormalizationError::InvalidDate(n.to_string())),
        Value::String(s) => parse_date_text(s.trim())
            .ok_or_else(|| NormalizationError::InvalidDate(s.clone())),
        other => Err(NormalizationError::InvalidDate(other.to_string())),
    }
}

fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat_backend_engineer() -> Value {
        json!({
            "id": 42,
            "title": "Backend Engineer",
            "company": "Savannah Labs",
            "location": "Nairobi",
            "category": "IT and Software Development",
            "employmentType": "Full-time",
            "experienceLevel": "Mid-level",
            "salary": "KES 250,000",
            "postedDate": "2024-03-05T09:30:00Z",
            "description": "Build and run APIs",
            "responsibilities": ["Design services"],
            "qualifications": ["Rust"],
            "benefits": ["Medical cover"]
        })
    }

    fn nested_backend_engineer() -> Value {
        json!({
            "id": "42",
            "title": "Backend Engineer",
            "organisation": {"id": 9, "name": "Savannah Labs", "location": "nairobi"},
            "industry": "it_software",
            "job_type": "full_time",
            "level": "mid_level",
            "salary": "KES 250,000",
            "timestamp": "Tue, 05 Mar 2024 09:30:00 GMT",
            "description": "Build and run APIs",
            "job_responsibilities": ["Design services"],
            "job_requirements": ["Rust"],
            "job_benefits": ["Medical cover"]
        })
    }

    #[test]
    fn test_both_layouts_normalize_identically() {
        let flat = normalize(&flat_backend_engineer()).unwrap();
        let nested = normalize(&nested_backend_engineer()).unwrap();
        assert_eq!(flat, nested);
        assert_eq!(flat.id, "42");
        assert_eq!(flat.category, "it_software");
        assert_eq!(flat.employment_type, "full_time");
        assert_eq!(flat.experience_level, "mid_level");
        assert_eq!(flat.employer_location, "nairobi");
        assert_eq!(flat.qualifications, vec!["Rust".to_string()]);
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let mut raw = flat_backend_engineer();
        raw.as_object_mut().unwrap().remove("id");
        assert_eq!(normalize(&raw), Err(NormalizationError::MissingField("id")));
    }

    #[test]
    fn test_missing_or_bad_date_is_rejected() {
        let mut raw = flat_backend_engineer();
        raw["postedDate"] = json!("last tuesday");
        assert!(matches!(normalize(&raw), Err(NormalizationError::InvalidDate(_))));

        raw.as_object_mut().unwrap().remove("postedDate");
        assert_eq!(normalize(&raw), Err(NormalizationError::MissingField("postedAt")));
    }

    #[test]
    fn test_missing_taxonomy_field_is_rejected() {
        let mut raw = nested_backend_engineer();
        raw["level"] = json!("  ");
        assert_eq!(
            normalize(&raw),
            Err(NormalizationError::MissingField("experienceLevel"))
        );
    }

    #[test]
    fn test_unmapped_label_passes_through() {
        let mut raw = flat_backend_engineer();
        raw["category"] = json!("Astrology");
        assert_eq!(normalize(&raw).unwrap().category, "Astrology");
    }

    #[test]
    fn test_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap();
        assert_eq!(parse_posted_at(&json!("2024-03-05")).unwrap(), expected);
        assert_eq!(parse_posted_at(&json!("2024-03-05T00:00:00")).unwrap(), expected);
        assert_eq!(parse_posted_at(&json!("2024-03-05 00:00:00")).unwrap(), expected);
        assert_eq!(
            parse_posted_at(&json!(expected.timestamp_millis())).unwrap(),
            expected
        );
        assert!(parse_posted_at(&json!(true)).is_err());
    }

    #[test]
    fn test_batch_drops_and_counts() {
        let mut missing_id = flat_backend_engineer();
        missing_id.as_object_mut().unwrap().remove("id");
        let raws = vec![flat_backend_engineer(), missing_id, json!("garbage")];

        let batch = normalize_batch(&raws);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.dropped, 2);
    }

    #[test]
    fn test_numeric_salary_and_missing_employer() {
        let raw = json!({
            "id": "a1",
            "title": "Nurse",
            "category": "Healthcare",
            "employmentType": "Part-time",
            "experienceLevel": "Entry-level",
            "salary": 60000,
            "postedDate": "2024-01-02"
        });
        let job = normalize(&raw).unwrap();
        assert_eq!(job.salary_display, "60000");
        assert_eq!(job.employer_name, "");
        assert_eq!(job.employer_location, "");
        assert!(job.benefits.is_empty());
    }

    #[test]
    fn test_records_with_both_spellings_are_kept() {
        let mut flat = flat_backend_engineer();
        flat["requirements"] = json!(["Rust", "SQL"]);
        flat["type"] = json!("Part-time");
        flat["postedAt"] = json!("2020-01-01T00:00:00Z");
        let job = normalize(&flat).unwrap();
        assert_eq!(job.qualifications, vec!["Rust"]);
        assert_eq!(job.employment_type, "full_time");
        assert_eq!(job.posted_at, Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap());

        let mut nested = nested_backend_engineer();
        nested["created_at"] = json!("2020-01-01T00:00:00Z");
        let job = normalize(&nested).unwrap();
        assert_eq!(job.posted_at, Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_alternate_spellings_fill_gaps() {
        let mut flat = flat_backend_engineer();
        let object = flat.as_object_mut().unwrap();
        object.remove("qualifications");
        object.remove("employmentType");
        object.remove("postedDate");
        object.insert("requirements".into(), json!(["Rust"]));
        object.insert("type".into(), json!("Full-time"));
        object.insert("postedAt".into(), json!("2024-03-05T09:30:00Z"));
        assert_eq!(normalize(&flat).unwrap(), normalize(&flat_backend_engineer()).unwrap());

        let mut nested = nested_backend_engineer();
        let ts = nested.as_object_mut().unwrap().remove("timestamp").unwrap();
        nested["created_at"] = ts;
        assert_eq!(normalize(&nested).unwrap(), normalize(&nested_backend_engineer()).unwrap());
    }
}
