//! Ingest command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ingest command.
pub async fn run_ingest(force: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ingest, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let catalog = orchestrator.load_catalog()?;

    Output::info(&format!(
        "Loaded {} courses ({} instructors, {} subjects)",
        catalog.courses.len(),
        catalog.instructors.len(),
        catalog.subjects.len()
    ));

    let spinner = Output::spinner("Indexing courses and instructors...");
    let report = orchestrator.ingestor().ingest(&catalog.courses, force).await;
    spinner.finish_and_clear();
    let report = report?;

    if report.skipped {
        Output::info("Courses already loaded, skipping. Use --force to re-index.");
        return Ok(());
    }

    Output::header("Ingestion report");
    Output::kv("Courses", &report.courses_written.to_string());
    Output::kv("Instructors", &report.instructors_written.to_string());

    if report.is_complete() {
        Output::success("Finished adding courses and instructors.");
    } else {
        Output::warning(&format!(
            "{} documents could not be added after retrying:",
            report.failed.len()
        ));
        for id in &report.failed {
            Output::list_item(id);
        }
    }

    Ok(())
}
