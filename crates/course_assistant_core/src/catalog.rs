//! crates/course_assistant_core/src/catalog.rs
//!
//! Parsing, seeding and rendering of the course catalog document.

use crate::domain::{Course, CourseCatalog};
use crate::ports::{DatabaseService, PortResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid data structure: expected a JSON object, found {0}")]
    NotAMapping(&'static str),
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl CourseCatalog {
    pub fn new(courses: Map<String, Value>) -> Self {
        Self { courses }
    }

    /// Parses an admin-submitted JSON blob. Anything that is not a JSON
    /// object is rejected; the contents of the object are not checked.
    pub fn from_json_text(text: &str) -> Result<Self, CatalogError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Object(courses) => Ok(Self { courses }),
            other => Err(CatalogError::NotAMapping(json_kind(&other))),
        }
    }

    pub fn len(&self) -> usize {
        self.courses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.is_empty()
    }

    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.courses).unwrap_or_else(|_| "{}".to_string())
    }
}

fn course(duration: &str, fees: &str, semester_count: u32, first_semester: &[&str]) -> Course {
    let mut subjects = BTreeMap::new();
    subjects.insert(
        "Sem 1".to_string(),
        first_semester.iter().map(|s| s.to_string()).collect(),
    );
    Course {
        duration: duration.to_string(),
        fees: fees.to_string(),
        semester_count,
        subjects,
    }
}

/// The catalog provisioned when the course store is empty.
pub fn default_catalog() -> CourseCatalog {
    let courses = [
        (
            "B.Tech",
            course(
                "4 years",
                "60,000 INR per semester",
                8,
                &[
                    "Mathematics 1",
                    "Physics",
                    "Chemistry",
                    "Engineering Mechanics",
                    "Computer Programming",
                ],
            ),
        ),
        (
            "B.Sc",
            course(
                "3 years",
                "40,000 INR per semester",
                6,
                &["Biology", "Chemistry", "Physics", "Mathematics", "Computer Applications"],
            ),
        ),
        (
            "BCA",
            course(
                "3 years",
                "50,000 INR per semester",
                6,
                &["C Programming", "Digital Electronics", "Mathematics", "Statistics", "English"],
            ),
        ),
    ];

    let mut map = Map::new();
    for (name, course) in courses {
        // Course only holds strings, integers and string lists.
        if let Ok(value) = serde_json::to_value(course) {
            map.insert(name.to_string(), value);
        }
    }
    CourseCatalog::new(map)
}

/// Seeds the default catalog when none is stored. Returns `true` if seeded.
pub async fn ensure_default_catalog(db: &dyn DatabaseService) -> PortResult<bool> {
    if db.get_course_catalog().await?.is_some() {
        return Ok(false);
    }
    db.replace_course_catalog(&default_catalog()).await?;
    info!("Provisioned default course catalog");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Course;

    #[test]
    fn object_text_becomes_the_catalog() {
        let catalog = CourseCatalog::from_json_text(
            r#"{"B.Tech": {"duration": "4 years", "fees": "60,000 INR per semester"}}"#,
        )
        .expect("object parses");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.courses["B.Tech"]["duration"], "4 years");
    }

    #[test]
    fn string_json_is_not_a_mapping() {
        let err = CourseCatalog::from_json_text(r#""not a json object""#).unwrap_err();
        assert!(matches!(err, CatalogError::NotAMapping("a string")));
    }

    #[test]
    fn arrays_are_rejected_too() {
        let err = CourseCatalog::from_json_text("[1, 2]").unwrap_err();
        assert!(matches!(err, CatalogError::NotAMapping("an array")));
    }

    #[test]
    fn broken_json_reports_a_parse_error() {
        let err = CourseCatalog::from_json_text("{\"B.Tech\": ").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidJson(_)));
        assert!(err.to_string().starts_with("Invalid JSON format"));
    }

    #[test]
    fn pretty_json_is_indented_for_the_editor() {
        let catalog =
            CourseCatalog::from_json_text(r#"{"BCA": {"fees": "y"}, "MBA": {"fees": "x"}}"#)
                .expect("object parses");
        assert_eq!(
            catalog.to_pretty_json(),
            "{\n  \"BCA\": {\n    \"fees\": \"y\"\n  },\n  \"MBA\": {\n    \"fees\": \"x\"\n  }\n}"
        );
        assert_eq!(CourseCatalog::default().to_pretty_json(), "{}");
    }

    #[test]
    fn default_catalog_has_three_typed_courses() {
        let catalog = default_catalog();
        assert_eq!(catalog.len(), 3);
        let bca: Course =
            serde_json::from_value(catalog.courses["BCA"].clone()).expect("typed course");
        assert_eq!(bca.semester_count, 6);
        assert_eq!(bca.subjects["Sem 1"][0], "C Programming");
        assert_eq!(catalog.courses["B.Tech"]["semesters"], 8);
    }
}
