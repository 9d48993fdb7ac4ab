//! Resolve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::identity::{NameResolver, Resolution, ResolutionMode};
use anyhow::Result;

/// Run the resolve command. Needs no credentials.
pub fn run_resolve(name: &str, exact: bool, settings: &Settings) -> Result<()> {
    let registry = settings.alias_registry()?;
    let mode = if exact {
        ResolutionMode::Exact
    } else {
        ResolutionMode::Fuzzy
    };
    let resolver = NameResolver::new(&registry, mode);

    match resolver.resolve(name) {
        Resolution::Found(canonical) => println!("{}", canonical),
        Resolution::NotFound => {
            Output::warning(&format!("No instructor matches '{}' ({} mode)", name, mode));
        }
    }

    Ok(())
}
