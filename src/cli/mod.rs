//! CLI module for Coursebot.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Coursebot - ask questions about the course catalog
///
/// Indexes a semester schedule export and answers questions about courses
/// and instructors with an LLM.
#[derive(Parser, Debug)]
#[command(name = "coursebot")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "COURSEBOT_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive question-answering session
    Chat,

    /// Ask a single question
    Ask {
        /// The question to ask
        question: String,
    },

    /// Index the schedule export into the course and instructor collections
    Ingest {
        /// Re-index even if the collections already hold documents
        #[arg(short, long)]
        force: bool,
    },

    /// Resolve an instructor name or alias to its canonical name
    Resolve {
        /// Name as typed
        name: String,

        /// Require an exact (case-insensitive) alias match instead of fuzzy matching
        #[arg(long)]
        exact: bool,
    },

    /// Search the course collection without involving the model
    Search {
        /// Search term
        term: String,

        /// Category (instructor, subject, title, combined)
        #[arg(short = 't', long = "category", default_value = "title")]
        category: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
