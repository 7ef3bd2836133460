// src/filter/state.rs
//! Active search filters and their URL form

use reqwest::Url;
use tracing::warn;

use crate::error::ValidationError;
use crate::taxonomy::Taxonomy;

/// Query parameter carrying the free-text search in page URLs
pub const SEARCH_PARAM: &str = "search";

const QUERY_BASE: &str = "http://localhost/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Query,
    Location,
    Category,
    EmploymentType,
    ExperienceLevel,
}

impl FilterField {
    pub fn name(self) -> &'static str {
        match self {
            FilterField::Query => "query",
            FilterField::Location => "location",
            FilterField::Category => "category",
            FilterField::EmploymentType => "employmentType",
            FilterField::ExperienceLevel => "experienceLevel",
        }
    }

    /// The table a structured field is validated against; `None` for free text
    pub fn taxonomy(self) -> Option<Taxonomy> {
        match self {
            FilterField::Query => None,
            FilterField::Location => Some(Taxonomy::Location),
            FilterField::Category => Some(Taxonomy::Industry),
            FilterField::EmploymentType => Some(Taxonomy::EmploymentType),
            FilterField::ExperienceLevel => Some(Taxonomy::ExperienceLevel),
        }
    }
}

/// Structured fields hold canonical codes; `None` matches every job.
///
/// Only `query` travels through the URL. The structured refinements are
/// in-memory state and are lost when a page is reloaded or shared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    pub query: String,
    pub location: Option<String>,
    pub category: Option<String>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the search text from a query string such as `?search=java+developer`
    pub fn parse_from_query_string(qs: &str) -> Self {
        let qs = qs.trim_start_matches('?');
        let url = match Url::parse(&format!("{}?{}", QUERY_BASE, qs)) {
            Ok(url) => url,
            Err(e) => {
                warn!("Ignoring unparseable query string '{}': {}", qs, e);
                return Self::default();
            }
        };

        let query = url
            .query_pairs()
            .find(|(key, _)| key == SEARCH_PARAM)
            .map(|(_, value)| value.into_owned())
            .unwrap_or_default();

        Self {
            query,
            ..Self::default()
        }
    }

    /// Encode the search text; an empty query yields an empty string
    pub fn to_query_string(&self) -> String {
        if self.query.is_empty() {
            return String::new();
        }

        Url::parse_with_params(QUERY_BASE, [(SEARCH_PARAM, self.query.as_str())])
            .ok()
            .and_then(|url| url.query().map(str::to_string))
            .unwrap_or_default()
    }

    /// Copy of this state with one field changed; rejected values leave `self` untouched
    pub fn with_field(&self, field: FilterField, value: Option<&str>) -> Result<Self, ValidationError> {
        let mut next = self.clone();

        let Some(taxonomy) = field.taxonomy() else {
            next.query = value.unwrap_or_default().to_string();
            return Ok(next);
        };

        let code = match value.map(str::trim).filter(|v| !v.is_empty()) {
            None => None,
            Some(v) => Some(taxonomy.resolve(v).map(str::to_string).ok_or_else(|| {
                ValidationError::new(field.name(), v, format!("not a known {}", taxonomy.name()))
            })?),
        };

        if let Some(slot) = next.slot_mut(field) {
            *slot = code;
        }
        Ok(next)
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Query => Some(self.query.as_str()).filter(|q| !q.is_empty()),
            FilterField::Location => self.location.as_deref(),
            FilterField::Category => self.category.as_deref(),
            FilterField::EmploymentType => self.employment_type.as_deref(),
            FilterField::ExperienceLevel => self.experience_level.as_deref(),
        }
    }

    /// True when nothing narrows the result set
    pub fn is_unfiltered(&self) -> bool {
        self.query.is_empty()
            && self.location.is_none()
            && self.category.is_none()
            && self.employment_type.is_none()
            && self.experience_level.is_none()
    }

    /// Active filters as `GET /jobs` parameters, using the service's field names
    pub fn server_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.query.is_empty() {
            params.push((SEARCH_PARAM, self.query.clone()));
        }
        let structured = [
            ("location", &self.location),
            ("industry", &self.category),
            ("job_type", &self.employment_type),
            ("level", &self.experience_level),
        ];
        for (key, value) in structured {
            if let Some(value) = value {
                params.push((key, value.clone()));
            }
        }
        params
    }

    /// Storage for a structured field; `Query` is free text and has none
    fn slot_mut(&mut self, field: FilterField) -> Option<&mut Option<String>> {
        match field {
            FilterField::Location => Some(&mut self.location),
            FilterField::Category => Some(&mut self.category),
            FilterField::EmploymentType => Some(&mut self.employment_type),
            FilterField::ExperienceLevel => Some(&mut self.experience_level),
            FilterField::Query => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_round_trip() {
        for query in ["java developer", "", "c++ & rust", "100% remote?", "Ñairobi/ñ", "a=b"] {
            let state = FilterState {
                query: query.to_string(),
                ..FilterState::default()
            };
            let qs = state.to_query_string();
            assert_eq!(FilterState::parse_from_query_string(&qs).query, query);
        }
    }

    #[test]
    fn test_java_developer_encoding() {
        let state = FilterState::new()
            .with_field(FilterField::Query, Some("java developer"))
            .unwrap();
        let qs = state.to_query_string();
        assert_eq!(qs, "search=java+developer");
        assert_eq!(FilterState::parse_from_query_string(&qs), state);
    }

    #[test]
    fn test_parse_tolerates_prefix_and_unknown_params() {
        let state = FilterState::parse_from_query_string("?page=2&search=nurse%20aide&category=healthcare");
        assert_eq!(state.query, "nurse aide");
        // Structured filters are never read back from the URL
        assert_eq!(state.category, None);

        assert_eq!(FilterState::parse_from_query_string(""), FilterState::default());
        assert_eq!(FilterState::parse_from_query_string("?other=1").query, "");
    }

    #[test]
    fn test_every_field_round_trips_through_with_field() {
        let state = FilterState::new()
            .with_field(FilterField::Query, Some("nurse"))
            .and_then(|s| s.with_field(FilterField::Location, Some("Mombasa")))
            .and_then(|s| s.with_field(FilterField::Category, Some("healthcare")))
            .and_then(|s| s.with_field(FilterField::EmploymentType, Some("Part-time")))
            .and_then(|s| s.with_field(FilterField::ExperienceLevel, Some("Internship")))
            .unwrap();

        assert_eq!(state.get(FilterField::Query), Some("nurse"));
        assert_eq!(state.get(FilterField::Location), Some("mombasa"));
        assert_eq!(state.get(FilterField::EmploymentType), Some("part_time"));
        assert_eq!(state.get(FilterField::ExperienceLevel), Some("internship"));

        let cleared = state.with_field(FilterField::Location, None).unwrap();
        assert_eq!(cleared.location, None);
        assert_eq!(cleared.query, "nurse");

        let mut scratch = state.clone();
        assert!(scratch.slot_mut(FilterField::Query).is_none());
    }

    #[test]
    fn test_structured_filters_stay_out_of_url() {
        let state = FilterState::new()
            .with_field(FilterField::Category, Some("healthcare"))
            .unwrap();
        assert_eq!(state.to_query_string(), "");
    }

    #[test]
    fn test_with_field_validates_and_canonicalizes() {
        let base = FilterState::new();
        let next = base
            .with_field(FilterField::Category, Some("IT and Software Development"))
            .unwrap();
        assert_eq!(next.category.as_deref(), Some("it_software"));
        assert_eq!(base.category, None);

        let err = next
            .with_field(FilterField::ExperienceLevel, Some("wizard"))
            .unwrap_err();
        assert_eq!(err.field, "experienceLevel");
        assert_eq!(next.experience_level, None);

        let cleared = next.with_field(FilterField::Category, Some("  ")).unwrap();
        assert_eq!(cleared.category, None);
        assert!(cleared.is_unfiltered());
    }

    #[test]
    fn test_field_equality_drives_memo_key() {
        let a = FilterState::new().with_field(FilterField::Location, Some("Nairobi")).unwrap();
        let b = FilterState::new().with_field(FilterField::Location, Some("nairobi")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, FilterState::new());
    }

    #[test]
    fn test_server_params() {
        let state = FilterState::new()
            .with_field(FilterField::Query, Some("backend"))
            .and_then(|s| s.with_field(FilterField::EmploymentType, Some("Remote")))
            .unwrap();
        assert_eq!(
            state.server_params(),
            vec![("search", "backend".to_string()), ("job_type", "remote".to_string())]
        );
        assert!(FilterState::new().server_params().is_empty());
    }
}
