//! Course catalog records.
//!
//! The catalog is a tab-delimited export of the semester schedule. Each row
//! is one course section; the only field this crate interprets is the
//! primary instructor's name, which is canonicalized during indexing.

mod reader;

pub use reader::{read_courses, read_courses_from_path};

use crate::error::Result;
use crate::identity::NameResolver;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

/// One course section from the schedule export.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseRecord {
    #[serde(rename(deserialize = "SUBJ"))]
    pub subject: String,
    #[serde(rename(deserialize = "CRSE NUM"))]
    pub course_number: String,
    #[serde(rename(deserialize = "SEC"))]
    pub section: String,
    #[serde(rename(deserialize = "CRN"))]
    pub crn: String,
    #[serde(rename(deserialize = "Schedule Type Code"))]
    pub schedule_type_code: String,
    #[serde(rename(deserialize = "Campus Code"))]
    pub campus_code: String,
    #[serde(rename(deserialize = "Title Short Desc"))]
    pub title: String,
    #[serde(rename(deserialize = "Instruction Mode Desc"))]
    pub instruction_mode: String,
    #[serde(rename(deserialize = "Meeting Type Codes"))]
    pub meeting_type_codes: String,
    #[serde(rename(deserialize = "Meet Days"))]
    pub meet_days: String,
    #[serde(rename(deserialize = "Begin Time"))]
    pub begin_time: String,
    #[serde(rename(deserialize = "End Time"))]
    pub end_time: String,
    #[serde(rename(deserialize = "Meet Start"))]
    pub meet_start: String,
    #[serde(rename(deserialize = "Meet End"))]
    pub meet_end: String,
    #[serde(rename(deserialize = "BLDG"))]
    pub building: String,
    #[serde(rename(deserialize = "RM"))]
    pub room: String,
    #[serde(rename(deserialize = "Actual Enrollment"))]
    pub actual_enrollment: String,
    #[serde(rename(deserialize = "Primary Instructor First Name"))]
    pub instructor_first_name: String,
    #[serde(rename(deserialize = "Primary Instructor Last Name"))]
    pub instructor_last_name: String,
    #[serde(rename(deserialize = "Primary Instructor Email"))]
    pub instructor_email: String,
    #[serde(rename(deserialize = "College"))]
    pub college: String,
}

impl CourseRecord {
    /// "First Last", trimmed. Empty when the section has no instructor.
    pub fn instructor_full_name(&self) -> String {
        format!(
            "{} {}",
            self.instructor_first_name.trim(),
            self.instructor_last_name.trim()
        )
        .trim()
        .to_string()
    }

    /// Canonical instructor name for indexing.
    ///
    /// Falls back to the full name as written when no identity matches, and
    /// returns `None` for sections without an instructor.
    pub fn canonical_instructor(&self, resolver: &NameResolver) -> Option<String> {
        let full_name = self.instructor_full_name();
        if full_name.is_empty() {
            return None;
        }
        Some(resolver.resolve(&full_name).or_input(&full_name))
    }
}

/// Loaded course records plus derived metadata.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub courses: Vec<CourseRecord>,
    /// Unique canonical instructor names, first-seen order.
    pub instructors: Vec<String>,
    /// Unique subject codes, first-seen order.
    pub subjects: Vec<String>,
}

impl Catalog {
    /// Build a catalog from records.
    pub fn new(courses: Vec<CourseRecord>, resolver: &NameResolver) -> Self {
        let instructors = unique_instructors(&courses, resolver);
        let subjects = unique_subjects(&courses);
        Self {
            courses,
            instructors,
            subjects,
        }
    }

    /// Load and index a schedule export.
    pub fn load(path: &Path, resolver: &NameResolver) -> Result<Self> {
        let courses = read_courses_from_path(path)?;
        let catalog = Self::new(courses, resolver);
        info!(
            "Loaded {} courses, {} instructors, {} subjects",
            catalog.courses.len(),
            catalog.instructors.len(),
            catalog.subjects.len()
        );
        Ok(catalog)
    }
}

/// Unique canonical instructor names, in first-seen order.
pub fn unique_instructors(courses: &[CourseRecord], resolver: &NameResolver) -> Vec<String> {
    let mut seen = HashSet::new();
    courses
        .iter()
        .filter_map(|course| course.canonical_instructor(resolver))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Unique subject codes, in first-seen order.
pub fn unique_subjects(courses: &[CourseRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    courses
        .iter()
        .map(|course| course.subject.trim().to_string())
        .filter(|subject| !subject.is_empty() && seen.insert(subject.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{AliasRegistry, ResolutionMode};

    fn course(subject: &str, first: &str, last: &str) -> CourseRecord {
        CourseRecord {
            subject: subject.to_string(),
            instructor_first_name: first.to_string(),
            instructor_last_name: last.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_instructor_full_name() {
        assert_eq!(course("CS", " Phil ", "Peterson").instructor_full_name(), "Phil Peterson");
        assert_eq!(course("CS", "", "").instructor_full_name(), "");
    }

    #[test]
    fn test_unique_instructors_are_canonical() {
        let resolver = NameResolver::new(&AliasRegistry::builtin(), ResolutionMode::Fuzzy);
        let courses = vec![
            course("CS", "Phil", "Peterson"),
            course("CS", "Philip", "Peterson"),
            course("AAS", "Sheryl", "Davis"),
            course("AAS", "", ""),
            course("RHET", "Phil", "Choong"),
        ];

        assert_eq!(
            unique_instructors(&courses, &resolver),
            vec!["Philip Peterson", "Sheryl Davis", "Philip Choong"]
        );
        assert_eq!(unique_subjects(&courses), vec!["CS", "AAS", "RHET"]);
    }

    #[test]
    fn test_exact_indexing_keeps_unknown_names() {
        let resolver = NameResolver::new(&AliasRegistry::builtin(), ResolutionMode::Exact);
        let courses = vec![
            course("CS", "Li", "Ho"),
            course("CS", "phil", "peterson"),
            course("RHET", "Phil", "Choong"),
        ];

        assert_eq!(
            unique_instructors(&courses, &resolver),
            vec!["Li Ho", "Philip Peterson", "Philip Choong"]
        );
    }

    #[test]
    fn test_json_uses_field_names() {
        let json = serde_json::to_value(course("CS", "Phil", "Peterson")).unwrap();
        assert_eq!(json["subject"], "CS");
        assert_eq!(json["instructor_first_name"], "Phil");
    }
}
