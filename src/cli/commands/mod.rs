//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod ingest;
mod resolve;
mod search;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use ingest::run_ingest;
pub use resolve::run_resolve;
pub use search::run_search;
