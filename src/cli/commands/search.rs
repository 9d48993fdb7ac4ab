//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::query::QueryPlan;
use anyhow::Result;

/// Run the search command: plan, search, and format without the model.
pub async fn run_search(term: &str, category: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let assistant = orchestrator.assistant();

    let plan = assistant.planner().plan(term, category);
    if let QueryPlan::Invalid { message } = &plan {
        Output::warning(message);
        return Ok(());
    }

    let spinner = Output::spinner("Searching...");
    let output = assistant.execute(&plan).await;
    spinner.finish_and_clear();

    println!("{}", output);
    Ok(())
}
