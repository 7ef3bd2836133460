// src/taxonomy.rs
//! Static choice tables and label/code conversion

use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxonomyEntry {
    pub code: &'static str,
    pub label: &'static str,
}

const fn entry(code: &'static str, label: &'static str) -> TaxonomyEntry {
    TaxonomyEntry { code, label }
}

const LOCATIONS: &[TaxonomyEntry] = &[
    entry("nairobi", "Nairobi"),
    entry("mombasa", "Mombasa"),
    entry("kisumu", "Kisumu"),
    entry("nakuru", "Nakuru"),
    entry("eldoret", "Eldoret"),
    entry("thika", "Thika"),
    entry("remote", "Remote"),
];

const INDUSTRIES: &[TaxonomyEntry] = &[
    entry("agriculture", "Agriculture"),
    entry("banking_finance", "Banking and Finance"),
    entry("building_construction", "Building & Construction"),
    entry("business", "Business Development"),
    entry("customer_service", "Customer Service"),
    entry("government", "Government"),
    entry("healthcare", "Healthcare"),
    entry("hospitality", "Hospitality and Leisure"),
    entry("human_resource", "Human Resource"),
    entry("it_software", "IT and Software Development"),
    entry("legal", "Legal"),
    entry("marketing_communication", "Marketing & Communication"),
    entry("project_management", "Project and Product Management"),
    entry("teaching", "Teaching"),
];

const EMPLOYMENT_TYPES: &[TaxonomyEntry] = &[
    entry("remote", "Remote"),
    entry("full_time", "Full-time"),
    entry("part_time", "Part-time"),
];

const EXPERIENCE_LEVELS: &[TaxonomyEntry] = &[
    entry("internship", "Internship"),
    entry("entry_level", "Entry-level"),
    entry("mid_level", "Mid-level"),
    entry("senior_level", "Senior-level"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Taxonomy {
    Location,
    Industry,
    EmploymentType,
    ExperienceLevel,
}

impl Taxonomy {
    pub const ALL: [Taxonomy; 4] = [
        Taxonomy::Location,
        Taxonomy::Industry,
        Taxonomy::EmploymentType,
        Taxonomy::ExperienceLevel,
    ];

    pub fn entries(self) -> &'static [TaxonomyEntry] {
        match self {
            Taxonomy::Location => LOCATIONS,
            Taxonomy::Industry => INDUSTRIES,
            Taxonomy::EmploymentType => EMPLOYMENT_TYPES,
            Taxonomy::ExperienceLevel => EXPERIENCE_LEVELS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Taxonomy::Location => "location",
            Taxonomy::Industry => "industry",
            Taxonomy::EmploymentType => "employment type",
            Taxonomy::ExperienceLevel => "experience level",
        }
    }

    /// Strict lookup: a canonical code, or a label compared case-insensitively
    pub fn resolve(self, value: &str) -> Option<&'static str> {
        let value = value.trim();
        let entries = self.entries();

        entries
            .iter()
            .find(|e| e.code == value)
            .or_else(|| entries.iter().find(|e| e.label.eq_ignore_ascii_case(value)))
            .map(|e| e.code)
    }

    /// Resolve to a code, passing unknown values through unchanged
    pub fn to_code_lenient(self, value: &str) -> String {
        match self.resolve(value) {
            Some(code) => code.to_string(),
            None => {
                warn!("Unmapped {} value '{}' passed through verbatim", self.name(), value);
                value.trim().to_string()
            }
        }
    }

    pub fn to_human(self, code: &str) -> String {
        self.entries()
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.label.to_string())
            .unwrap_or_else(|| code.to_string())
    }

    pub fn contains_code(self, code: &str) -> bool {
        self.entries().iter().any(|e| e.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_label_and_code() {
        assert_eq!(
            Taxonomy::Industry.resolve("IT and Software Development"),
            Some("it_software")
        );
        assert_eq!(Taxonomy::Industry.resolve("it_software"), Some("it_software"));
        assert_eq!(Taxonomy::ExperienceLevel.resolve("entry-LEVEL"), Some("entry_level"));
        assert_eq!(Taxonomy::EmploymentType.resolve(" Full-time "), Some("full_time"));
        assert_eq!(Taxonomy::Industry.resolve("Astrology"), None);
    }

    #[test]
    fn test_lenient_passthrough() {
        assert_eq!(Taxonomy::Industry.to_code_lenient("Healthcare"), "healthcare");
        assert_eq!(Taxonomy::Industry.to_code_lenient("Astrology"), "Astrology");
    }

    #[test]
    fn test_to_human() {
        assert_eq!(Taxonomy::ExperienceLevel.to_human("senior_level"), "Senior-level");
        assert_eq!(Taxonomy::Location.to_human("nairobi"), "Nairobi");
        assert_eq!(Taxonomy::Industry.to_human("unknown_code"), "unknown_code");
    }

    #[test]
    fn test_codes_are_unique_per_table() {
        for taxonomy in Taxonomy::ALL {
            let entries = taxonomy.entries();
            for (i, a) in entries.iter().enumerate() {
                assert!(
                    entries[i + 1..].iter().all(|b| b.code != a.code),
                    "duplicate code {} in {}",
                    a.code,
                    taxonomy.name()
                );
            }
        }
    }
}
