//! The course lookup function offered to the model.

use super::FunctionSchema;
use crate::error::{CoursebotError, Result};
use crate::query::Intent;

/// Name of the course lookup function.
pub const QUERY_COURSES: &str = "query_courses";

/// Schema for `query_courses`. Every field is optional.
pub fn query_courses_schema() -> FunctionSchema {
    FunctionSchema {
        name: QUERY_COURSES.to_string(),
        description: "Fetch courses based on instructor, subject, course title, or keywords."
            .to_string(),
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "instructor": {
                    "type": "string",
                    "description": "The canonical name or alias of the instructor (e.g., Philip Peterson)."
                },
                "subject": {
                    "type": "string",
                    "description": "The subject or department code (e.g., CS, PHIL, BIO)."
                },
                "course": {
                    "type": "string",
                    "description": "The title of the course (e.g., Intro to Philosophy)."
                },
                "title": {
                    "type": "string",
                    "description": "Keywords from the course title or short description (e.g., Guitar and Bass Lessons)."
                }
            },
            "required": []
        }),
    }
}

/// Parse `query_courses` arguments into an intent.
pub fn parse_intent(arguments: &str) -> Result<Intent> {
    serde_json::from_str(arguments)
        .map_err(|e| CoursebotError::ArgumentParse(format!("{} (arguments: {})", e, arguments)))
}
