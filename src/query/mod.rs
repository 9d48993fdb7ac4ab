//! Turning extracted intent into search requests.
//!
//! An [`Intent`] is what the language model pulled out of a question. The
//! planner picks one field to search on, canonicalizes instructor names, and
//! produces a [`QueryPlan`]; the [`format`](format::format_results) module
//! renders whatever the search returns.

mod format;

pub use format::{format_results, ResultDocument};

use crate::identity::{NameResolver, Resolution};
use serde::{Deserialize, Serialize};

/// Returned instead of searching when the intent carries no usable field.
pub const NO_QUERY_PARAMETERS: &str = "No valid query parameters provided.";

/// Returned for an unknown category string.
pub const INVALID_CATEGORY: &str =
    "Invalid query type. Please specify 'instructor', 'subject', 'title', or 'combined'.";

/// Fields extracted from a question. Blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intent {
    pub instructor: Option<String>,
    pub subject: Option<String>,
    pub title: Option<String>,
    /// Free text naming a course.
    pub course: Option<String>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl Intent {
    pub fn is_empty(&self) -> bool {
        self.select().is_none()
    }

    /// Pick the single term and category to search with.
    ///
    /// Instructor plus subject are combined into one term; otherwise the
    /// first present field wins in the order instructor, subject, title, course.
    pub fn select(&self) -> Option<(String, QueryCategory)> {
        let instructor = present(&self.instructor);
        let subject = present(&self.subject);

        if let (Some(instructor), Some(subject)) = (instructor, subject) {
            return Some((format!("{} {}", instructor, subject), QueryCategory::Combined));
        }

        [
            (instructor, QueryCategory::Instructor),
            (subject, QueryCategory::Subject),
            (present(&self.title), QueryCategory::Title),
            (present(&self.course), QueryCategory::Course),
        ]
        .into_iter()
        .find_map(|(term, category)| term.map(|t| (t.to_string(), category)))
    }
}

/// What a query searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryCategory {
    Instructor,
    Subject,
    Title,
    Course,
    Combined,
    Invalid,
}

impl QueryCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCategory::Instructor => "instructor",
            QueryCategory::Subject => "subject",
            QueryCategory::Title => "title",
            QueryCategory::Course => "course",
            QueryCategory::Combined => "combined",
            QueryCategory::Invalid => "invalid",
        }
    }
}

impl std::str::FromStr for QueryCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instructor" => Ok(QueryCategory::Instructor),
            "subject" => Ok(QueryCategory::Subject),
            "title" => Ok(QueryCategory::Title),
            "course" => Ok(QueryCategory::Course),
            "combined" => Ok(QueryCategory::Combined),
            _ => Err(INVALID_CATEGORY.to_string()),
        }
    }
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved, ready-to-run search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryPlan {
    Search {
        category: QueryCategory,
        search_terms: Vec<String>,
        /// Term shown in result headers.
        display_term: String,
    },
    /// The request cannot be run; `message` is shown to the user as-is.
    Invalid { message: String },
}

impl QueryPlan {
    pub fn category(&self) -> QueryCategory {
        match self {
            QueryPlan::Search { category, .. } => *category,
            QueryPlan::Invalid { .. } => QueryCategory::Invalid,
        }
    }

    pub fn search_terms(&self) -> &[String] {
        match self {
            QueryPlan::Search { search_terms, .. } => search_terms,
            QueryPlan::Invalid { .. } => &[],
        }
    }

    /// The user-facing message of an invalid plan.
    pub fn message(&self) -> Option<&str> {
        match self {
            QueryPlan::Invalid { message } => Some(message),
            QueryPlan::Search { .. } => None,
        }
    }
}

/// Builds query plans, canonicalizing instructor names on the way.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    resolver: NameResolver,
}

impl QueryPlanner {
    pub fn new(resolver: NameResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &NameResolver {
        &self.resolver
    }

    /// Plan a search for `term` under a category name.
    pub fn plan(&self, term: &str, category: &str) -> QueryPlan {
        match category.parse::<QueryCategory>() {
            Ok(category) => self.plan_category(term, category),
            Err(message) => QueryPlan::Invalid { message },
        }
    }

    /// Plan a search for `term` under a parsed category.
    ///
    /// Instructor terms always go through fuzzy resolution, whatever mode
    /// the resolver was built with.
    pub fn plan_category(&self, term: &str, category: QueryCategory) -> QueryPlan {
        match category {
            QueryCategory::Instructor => match self.resolver.resolve_fuzzy(term) {
                Resolution::Found(canonical) => QueryPlan::Search {
                    category,
                    search_terms: vec![canonical.clone()],
                    display_term: canonical,
                },
                Resolution::NotFound => QueryPlan::Invalid {
                    message: format!("No valid instructor found for '{}'.", term),
                },
            },
            QueryCategory::Subject | QueryCategory::Title | QueryCategory::Combined => {
                passthrough(term, category)
            }
            // Course free text searches exactly like a title.
            QueryCategory::Course => passthrough(term, QueryCategory::Title),
            QueryCategory::Invalid => QueryPlan::Invalid {
                message: INVALID_CATEGORY.to_string(),
            },
        }
    }

    /// Apply the field priority rule and plan the result.
    pub fn plan_intent(&self, intent: &Intent) -> QueryPlan {
        match intent.select() {
            Some((term, category)) => self.plan_category(&term, category),
            None => QueryPlan::Invalid {
                message: NO_QUERY_PARAMETERS.to_string(),
            },
        }
    }
}

fn passthrough(term: &str, category: QueryCategory) -> QueryPlan {
    QueryPlan::Search {
        category,
        search_terms: vec![term.to_string()],
        display_term: term.to_string(),
    }
}
