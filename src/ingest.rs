//! Populating the course and instructor collections from catalog records.
//!
//! Ingestion runs in three phases:
//!
//! 1. A probe query against the course collection. If it returns anything the
//!    collections are considered loaded and nothing is written. A forced run
//!    skips the probe and empties both collections instead.
//! 2. A sequential pass that builds one document per course row and reduces
//!    the rows to a set of distinct canonical instructor names.
//! 3. Concurrent insertion, one document per write, each retried with backoff.
//!    A document that exhausts its retries is logged and skipped.

use crate::catalog::{unique_instructors, CourseRecord};
use crate::error::Result;
use crate::identity::NameResolver;
use crate::retry::{retry, RetryPolicy};
use crate::search::{Collection, NewDocument, SearchCollaborator};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Metadata key carrying a course's canonical instructor.
pub const INSTRUCTOR_METADATA_KEY: &str = "instructor_canonical_name";

/// Search term used to detect already-loaded collections.
const PROBE_TERM: &str = "test";

/// Outcome of an ingestion run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// True when the probe found existing documents and nothing was written.
    pub skipped: bool,
    pub courses_written: usize,
    pub instructors_written: usize,
    /// Ids of documents that exhausted their retries.
    pub failed: Vec<String>,
}

impl IngestReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes catalog records into the search collaborator.
pub struct Ingestor {
    search: Arc<dyn SearchCollaborator>,
    resolver: NameResolver,
    policy: RetryPolicy,
    concurrency: usize,
}

impl Ingestor {
    pub fn new(search: Arc<dyn SearchCollaborator>, resolver: NameResolver) -> Self {
        Self {
            search,
            resolver,
            policy: RetryPolicy::default(),
            concurrency: 4,
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Maximum number of writes in flight at once.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Whether the course collection already answers queries.
    ///
    /// A failing probe counts as "not loaded".
    pub async fn is_loaded(&self) -> bool {
        match self
            .search
            .query(Collection::Courses, &[PROBE_TERM.to_string()], 1)
            .await
        {
            Ok(docs) => !docs.is_empty(),
            Err(e) => {
                warn!("Probe query failed, assuming empty collections: {}", e);
                false
            }
        }
    }

    /// Index `courses`, skipping the run if the collections are already loaded.
    ///
    /// `force` bypasses the probe and clears both collections first, so rows
    /// dropped from the export do not linger.
    #[instrument(skip(self, courses), fields(courses = courses.len()))]
    pub async fn ingest(&self, courses: &[CourseRecord], force: bool) -> Result<IngestReport> {
        if force {
            for collection in [Collection::Courses, Collection::Instructors] {
                let removed = self.search.clear(collection).await?;
                info!("Cleared {} documents from {}", removed, collection);
            }
        } else if self.is_loaded().await {
            info!("Courses already loaded, skipping ingestion");
            return Ok(IngestReport {
                skipped: true,
                ..Default::default()
            });
        }

        let course_docs = course_documents(courses, &self.resolver)?;
        let instructor_docs = instructor_documents(&unique_instructors(courses, &self.resolver));

        info!("Adding {} courses", course_docs.len());
        let (courses_written, mut failed) = self.insert_all(Collection::Courses, course_docs).await;

        info!("Adding {} unique instructors", instructor_docs.len());
        let (instructors_written, instructor_failures) =
            self.insert_all(Collection::Instructors, instructor_docs).await;
        failed.extend(instructor_failures);

        info!(
            "Finished ingestion: {} courses, {} instructors, {} failures",
            courses_written,
            instructors_written,
            failed.len()
        );

        Ok(IngestReport {
            skipped: false,
            courses_written,
            instructors_written,
            failed,
        })
    }

    async fn insert_all(
        &self,
        collection: Collection,
        docs: Vec<NewDocument>,
    ) -> (usize, Vec<String>) {
        let search = self.search.as_ref();
        let policy = &self.policy;

        let outcomes = stream::iter(docs)
            .map(|doc| async move {
                let pending = &doc;
                let result = retry(policy, &doc.id, move || {
                    search.upsert(collection, std::slice::from_ref(pending))
                })
                .await;
                (doc.id.clone(), result)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await;

        let mut written = 0;
        let mut failed = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(_) => written += 1,
                Err(e) => {
                    error!("Skipping {} document {}: {}", collection, id, e);
                    failed.push(id);
                }
            }
        }
        failed.sort();
        (written, failed)
    }
}

/// One document per course row, keyed by row index.
///
/// The content is the record serialized as JSON. Rows with an instructor
/// carry the canonical instructor name as metadata.
pub fn course_documents(
    courses: &[CourseRecord],
    resolver: &NameResolver,
) -> Result<Vec<NewDocument>> {
    courses
        .iter()
        .enumerate()
        .map(|(index, course)| {
            let content = serde_json::to_string(course)?;
            let doc = NewDocument::new(index.to_string(), content);
            Ok(match course.canonical_instructor(resolver) {
                Some(name) => doc.with_metadata(INSTRUCTOR_METADATA_KEY, name),
                None => doc,
            })
        })
        .collect()
}

/// One document per instructor, keyed by the name itself.
pub fn instructor_documents(names: &[String]) -> Vec<NewDocument> {
    names
        .iter()
        .map(|name| NewDocument::new(name.clone(), name.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoursebotError;
    use crate::identity::{AliasRegistry, ResolutionMode};
    use crate::query::ResultDocument;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records writes; fails a chosen id a fixed number of times.
    #[derive(Default)]
    struct RecordingSearch {
        preloaded: bool,
        failures: Mutex<HashMap<String, u32>>,
        written: Mutex<Vec<(Collection, NewDocument)>>,
    }

    impl RecordingSearch {
        fn failing(id: &str, times: u32) -> Self {
            let search = Self::default();
            search.failures.lock().unwrap().insert(id.to_string(), times);
            search
        }

        fn ids(&self, collection: Collection) -> Vec<String> {
            let mut ids: Vec<String> = self
                .written
                .lock()
                .unwrap()
                .iter()
                .filter(|(c, _)| *c == collection)
                .map(|(_, d)| d.id.clone())
                .collect();
            ids.sort();
            ids
        }
    }

    #[async_trait]
    impl SearchCollaborator for RecordingSearch {
        async fn query(
            &self,
            _collection: Collection,
            _terms: &[String],
            _limit: usize,
        ) -> Result<Vec<ResultDocument>> {
            if self.preloaded {
                Ok(vec![ResultDocument::from("existing")])
            } else {
                Ok(Vec::new())
            }
        }

        async fn upsert(&self, collection: Collection, documents: &[NewDocument]) -> Result<usize> {
            for doc in documents {
                let mut failures = self.failures.lock().unwrap();
                if let Some(remaining) = failures.get_mut(&doc.id) {
                    if *remaining > 0 {
                        *remaining -= 1;
                        return Err(CoursebotError::VectorStore("transient".to_string()));
                    }
                }
            }
            let mut written = self.written.lock().unwrap();
            written.extend(documents.iter().cloned().map(|d| (collection, d)));
            Ok(documents.len())
        }

        async fn count(&self, collection: Collection) -> Result<usize> {
            Ok(self.ids(collection).len())
        }

        async fn clear(&self, collection: Collection) -> Result<usize> {
            let mut written = self.written.lock().unwrap();
            let before = written.len();
            written.retain(|(c, _)| *c != collection);
            Ok(before - written.len())
        }
    }

    fn resolver() -> NameResolver {
        NameResolver::new(&AliasRegistry::builtin(), ResolutionMode::Exact)
    }

    fn course(title: &str, first: &str, last: &str) -> CourseRecord {
        CourseRecord {
            subject: "CS".to_string(),
            title: title.to_string(),
            instructor_first_name: first.to_string(),
            instructor_last_name: last.to_string(),
            ..Default::default()
        }
    }

    fn courses() -> Vec<CourseRecord> {
        vec![
            course("Compilers", "Phil", "Peterson"),
            course("Operating Systems", "Greg", "Benson"),
            course("Software Development", "Philip", "Peterson"),
            course("Independent Study", "", ""),
        ]
    }

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1), crate::retry::Backoff::Linear)
    }

    #[test]
    fn test_course_documents() {
        let docs = course_documents(&courses(), &resolver()).unwrap();
        assert_eq!(docs.len(), 4);
        assert_eq!(docs[0].id, "0");
        assert_eq!(docs[0].metadata[INSTRUCTOR_METADATA_KEY], "Philip Peterson");
        assert_eq!(docs[1].metadata[INSTRUCTOR_METADATA_KEY], "Gregory Benson");
        assert!(docs[3].metadata.is_empty());

        let json: serde_json::Value = serde_json::from_str(&docs[0].content).unwrap();
        assert_eq!(json["title"], "Compilers");
    }

    #[tokio::test]
    async fn test_ingest_writes_courses_and_distinct_instructors() {
        let search = Arc::new(RecordingSearch::default());
        let ingestor = Ingestor::new(search.clone(), resolver()).with_retry_policy(fast_policy());

        let report = ingestor.ingest(&courses(), false).await.unwrap();

        assert!(!report.skipped);
        assert!(report.is_complete());
        assert_eq!(report.courses_written, 4);
        assert_eq!(report.instructors_written, 2);
        assert_eq!(search.ids(Collection::Courses), vec!["0", "1", "2", "3"]);
        assert_eq!(
            search.ids(Collection::Instructors),
            vec!["Gregory Benson", "Philip Peterson"]
        );
    }

    #[tokio::test]
    async fn test_ingest_skips_loaded_collections() {
        let search = Arc::new(RecordingSearch {
            preloaded: true,
            ..Default::default()
        });
        let ingestor = Ingestor::new(search.clone(), resolver());

        let report = ingestor.ingest(&courses(), false).await.unwrap();
        assert!(report.skipped);
        assert!(search.ids(Collection::Courses).is_empty());

        let report = ingestor
            .with_retry_policy(fast_policy())
            .ingest(&courses(), true)
            .await
            .unwrap();
        assert!(!report.skipped);
        assert_eq!(search.ids(Collection::Courses).len(), 4);
    }

    #[tokio::test]
    async fn test_forced_run_replaces_previous_documents() {
        let search = Arc::new(RecordingSearch::default());
        let ingestor = Ingestor::new(search.clone(), resolver()).with_retry_policy(fast_policy());

        ingestor.ingest(&courses(), false).await.unwrap();
        let report = ingestor.ingest(&courses()[..2], true).await.unwrap();

        assert_eq!(report.courses_written, 2);
        assert_eq!(search.ids(Collection::Courses), vec!["0", "1"]);
        assert_eq!(
            search.ids(Collection::Instructors),
            vec!["Gregory Benson", "Philip Peterson"]
        );
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let search = Arc::new(RecordingSearch::failing("1", 2));
        let ingestor = Ingestor::new(search.clone(), resolver()).with_retry_policy(fast_policy());

        let report = ingestor.ingest(&courses(), false).await.unwrap();
        assert!(report.is_complete());
        assert_eq!(report.courses_written, 4);
    }

    #[tokio::test]
    async fn test_exhausted_document_is_skipped() {
        let search = Arc::new(RecordingSearch::failing("2", 10));
        let ingestor = Ingestor::new(search.clone(), resolver())
            .with_retry_policy(fast_policy())
            .with_concurrency(2);

        let report = ingestor.ingest(&courses(), false).await.unwrap();
        assert_eq!(report.failed, vec!["2"]);
        assert_eq!(report.courses_written, 3);
        assert_eq!(report.instructors_written, 2);
        assert_eq!(search.ids(Collection::Courses), vec!["0", "1", "3"]);
    }
}
