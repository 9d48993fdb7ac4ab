//! Interactive chat command.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};
use tracing::info;

const PROMPT: &str = "Catalog search> ";

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;
    let assistant = orchestrator.assistant();
    let mut session = assistant.new_session();
    info!("Started session {}", session.id());

    println!("\n{}", style("Coursebot").bold().cyan());
    println!(
        "{}\n",
        style("Ask about courses and instructors, or 'exit' to quit. Use 'clear' to reset the conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{}", style(PROMPT).green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            println!("Please enter a valid query.");
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let outcome = assistant.answer(&mut session, input).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(turn) => Output::reply(&turn.reply),
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}
