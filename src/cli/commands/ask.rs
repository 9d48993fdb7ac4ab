//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let question = question.trim();
    if question.is_empty() {
        Output::warning("Please enter a valid query.");
        return Ok(());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let assistant = orchestrator.assistant();
    let mut session = assistant.new_session();

    let spinner = Output::spinner("Searching the catalog...");

    match assistant.answer(&mut session, question).await {
        Ok(turn) => {
            spinner.finish_and_clear();

            println!("\n{}\n", turn.reply);

            if let Some(plan) = &turn.plan {
                Output::kv("Search", &format!("{} {:?}", plan.category(), plan.search_terms()));
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
