//! Rendering search results as plain text for the model and the terminal.

use super::{QueryCategory, INVALID_CATEGORY};
use serde::{Deserialize, Serialize};

/// A search hit, as an ordered list of text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultDocument {
    pub fields: Vec<String>,
}

impl ResultDocument {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Fields joined by single spaces, flattened to one line.
    pub fn render(&self) -> String {
        self.fields
            .iter()
            .map(|field| single_line(field))
            .filter(|field| !field.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<String> for ResultDocument {
    fn from(content: String) -> Self {
        Self::new(vec![content])
    }
}

impl From<&str> for ResultDocument {
    fn from(content: &str) -> Self {
        Self::new(vec![content.to_string()])
    }
}

/// Collapse every run of whitespace, newlines included, to one space.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn header(category: QueryCategory, display_term: &str) -> Option<String> {
    match category {
        QueryCategory::Instructor => Some(format!("Here are the courses taught by {}:", display_term)),
        QueryCategory::Subject => Some(format!("Here are the courses in subject '{}':", display_term)),
        QueryCategory::Title | QueryCategory::Course => {
            Some(format!("Here are the courses matching the title '{}':", display_term))
        }
        QueryCategory::Combined => Some(format!("Here are the courses matching '{}':", display_term)),
        QueryCategory::Invalid => None,
    }
}

/// Render search results under a category-specific header.
///
/// Empty results always produce a "No courses found" line naming the term.
/// Instructor results drop the quotes around the name in that line. The term
/// is flattened to one line so the output always has one header line.
pub fn format_results(
    category: QueryCategory,
    display_term: &str,
    documents: &[ResultDocument],
) -> String {
    let display_term = single_line(display_term);
    let display_term = display_term.as_str();

    if documents.is_empty() {
        return match category {
            QueryCategory::Instructor => format!("No courses found for {}.", display_term),
            _ => format!("No courses found for '{}'.", display_term),
        };
    }

    let Some(header) = header(category, display_term) else {
        return INVALID_CATEGORY.to_string();
    };

    std::iter::once(header)
        .chain(documents.iter().map(|doc| format!("- {}", doc.render())))
        .collect::<Vec<_>>()
        .join("\n")
}
