mod common;

use common::{memory_search, text, CountingSearch, ScriptedModel};
use coursebot::config::Settings;
use coursebot::orchestrator::Orchestrator;
use coursebot::search::{Collection, NewDocument, SearchCollaborator};
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const HEADER: &str = "SUBJ\tCRSE NUM\tSEC\tCRN\tSchedule Type Code\tCampus Code\tTitle Short Desc\tInstruction Mode Desc\tMeeting Type Codes\tMeet Days\tBegin Time\tEnd Time\tMeet Start\tMeet End\tBLDG\tRM\tActual Enrollment\tPrimary Instructor First Name\tPrimary Instructor Last Name\tPrimary Instructor Email\tCollege";

fn schedule() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    writeln!(
        file,
        "CS\t110\t01\t40001\tLEC\tM\tIntro to Computer Science\tIn-Person\tIP\tMWF\t0900\t1005\t8/20/24\t12/4/24\tHR\t235\t40\tPhil\tPeterson\tpp@usfca.edu\tAS"
    )
    .unwrap();
    writeln!(
        file,
        "CS\t245\t01\t40002\tLEC\tM\tData Structures\tIn-Person\tIP\tTR\t1245\t1430\t8/20/24\t12/4/24\tLS\t103\t35\tPhilip\tPeterson\tpp@usfca.edu\tAS"
    )
    .unwrap();
    writeln!(
        file,
        "AAS\t100\t01\t42180\tSEM\tM\tBlack Activists & Visionaries\tIn-Person\tIP\tMW\t1645\t1825\t8/20/24\t12/4/24\tLM\t140\t30\tSheryl\tDavis\tsedavis2@usfca.edu\tLA"
    )
    .unwrap();
    writeln!(file, "CS\t490\t01\t40003\tIND\tM\tDirected Study\tIn-Person").unwrap();
    file
}

fn orchestrator(csv: &NamedTempFile, search: Arc<CountingSearch>) -> Orchestrator {
    let mut settings = Settings::default();
    settings.catalog.csv_path = csv.path().to_string_lossy().into_owned();
    settings.ingest.backoff_ms = 1;
    Orchestrator::with_components(settings, ScriptedModel::new(vec![]), search).unwrap()
}

#[tokio::test]
async fn test_ingest_schedule_then_skip_when_loaded() {
    let csv = schedule();
    let search = Arc::new(CountingSearch::new(memory_search()));
    let orchestrator = orchestrator(&csv, search.clone());

    let catalog = orchestrator.load_catalog().unwrap();
    assert_eq!(catalog.courses.len(), 4);
    assert_eq!(catalog.instructors, vec!["Philip Peterson", "Sheryl Davis"]);
    assert_eq!(catalog.subjects, vec!["CS", "AAS"]);

    let ingestor = orchestrator.ingestor();
    let report = ingestor.ingest(&catalog.courses, false).await.unwrap();
    assert!(!report.skipped);
    assert!(report.is_complete());
    assert_eq!(report.courses_written, 4);
    assert_eq!(report.instructors_written, 2);
    assert_eq!(search.count(Collection::Courses).await.unwrap(), 4);
    assert_eq!(search.count(Collection::Instructors).await.unwrap(), 2);

    let again = ingestor.ingest(&catalog.courses, false).await.unwrap();
    assert!(again.skipped);
    assert_eq!(again.courses_written, 0);

    search
        .upsert(Collection::Courses, &[NewDocument::new("stale", "Retired Course")])
        .await
        .unwrap();
    let forced = ingestor.ingest(&catalog.courses, true).await.unwrap();
    assert!(!forced.skipped);
    assert_eq!(forced.courses_written, 4);
    assert_eq!(search.count(Collection::Courses).await.unwrap(), 4);
}

#[tokio::test]
async fn test_document_that_keeps_failing_is_skipped() {
    let csv = schedule();
    let search = Arc::new(CountingSearch::new(memory_search()).failing_writes_for("1"));
    let orchestrator = orchestrator(&csv, search.clone());

    let catalog = orchestrator.load_catalog().unwrap();
    let report = orchestrator
        .ingestor()
        .ingest(&catalog.courses, false)
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failed, vec!["1".to_string()]);
    assert_eq!(report.courses_written, 3);
    assert_eq!(report.instructors_written, 2);
    assert_eq!(search.count(Collection::Courses).await.unwrap(), 3);
}

#[tokio::test]
async fn test_ingested_courses_answer_questions() {
    let csv = schedule();
    let search = Arc::new(CountingSearch::new(memory_search()));
    let mut settings = Settings::default();
    settings.catalog.csv_path = csv.path().to_string_lossy().into_owned();
    let model = ScriptedModel::new(vec![
        common::call(r#"{"instructor":"Phil Peterson"}"#),
        text("He teaches two courses."),
    ]);
    let orchestrator = Orchestrator::with_components(settings, model, search).unwrap();

    let catalog = orchestrator.load_catalog().unwrap();
    orchestrator
        .ingestor()
        .ingest(&catalog.courses, false)
        .await
        .unwrap();

    let assistant = orchestrator.assistant();
    let mut session = assistant.new_session();
    let turn = assistant
        .answer(&mut session, "What does Phil Peterson teach?")
        .await
        .unwrap();

    let output = turn.search_output.unwrap();
    assert!(output.starts_with("Here are the courses taught by Philip Peterson:"));
    assert_eq!(output.lines().count(), 5);
    assert_eq!(turn.reply, "He teaches two courses.");
}
