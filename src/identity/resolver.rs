//! Canonical name resolution over the alias registry.

use super::{fuzzy, AliasIndex, AliasRegistry, Identity};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How free-text names are matched against known aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// Subsequence fuzzy match, best-scoring alias wins.
    #[default]
    Fuzzy,
    /// Case-insensitive equality with an alias.
    Exact,
}

impl std::str::FromStr for ResolutionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fuzzy" => Ok(ResolutionMode::Fuzzy),
            "exact" => Ok(ResolutionMode::Exact),
            _ => Err(format!("Unknown resolution mode: {}", s)),
        }
    }
}

impl std::fmt::Display for ResolutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolutionMode::Fuzzy => write!(f, "fuzzy"),
            ResolutionMode::Exact => write!(f, "exact"),
        }
    }
}

/// Outcome of resolving a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The input identifies a known person.
    Found(String),
    /// No known identity matched.
    NotFound,
}

impl Resolution {
    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }

    /// The canonical name, if one was found.
    pub fn canonical_name(&self) -> Option<&str> {
        match self {
            Resolution::Found(name) => Some(name),
            Resolution::NotFound => None,
        }
    }

    /// The canonical name, or `input` unchanged when nothing matched.
    pub fn or_input(self, input: &str) -> String {
        match self {
            Resolution::Found(name) => name,
            Resolution::NotFound => input.to_string(),
        }
    }
}

/// Resolves free-text names to canonical identities.
#[derive(Debug, Clone)]
pub struct NameResolver {
    mode: ResolutionMode,
    /// Flattened alias pool, in registry order.
    aliases: Vec<String>,
    /// Canonical name for each entry of `aliases`.
    canonical: Vec<String>,
    index: AliasIndex,
}

impl NameResolver {
    /// Create a resolver over a registry.
    pub fn new(registry: &AliasRegistry, mode: ResolutionMode) -> Self {
        Self::from_identities(registry.list_identities(), mode)
    }

    /// Create a resolver over an arbitrary identity list.
    pub fn from_identities(identities: &[Identity], mode: ResolutionMode) -> Self {
        let (aliases, canonical) = identities
            .iter()
            .flat_map(|identity| {
                identity
                    .aliases
                    .iter()
                    .map(move |alias| (alias.clone(), identity.canonical_name.clone()))
            })
            .unzip();

        Self {
            mode,
            aliases,
            canonical,
            index: AliasIndex::new(identities),
        }
    }

    pub fn mode(&self) -> ResolutionMode {
        self.mode
    }

    /// Resolve using the configured mode.
    pub fn resolve(&self, input: &str) -> Resolution {
        match self.mode {
            ResolutionMode::Fuzzy => self.resolve_fuzzy(input),
            ResolutionMode::Exact => self.resolve_exact(input),
        }
    }

    /// Best fuzzy match across all aliases.
    ///
    /// Ties go to the alias listed first in the registry.
    pub fn resolve_fuzzy(&self, input: &str) -> Resolution {
        let input = input.trim();
        if input.is_empty() {
            return Resolution::NotFound;
        }

        let Some(best) = fuzzy::find(input, &self.aliases).into_iter().next() else {
            debug!("No match found for '{}'", input);
            return Resolution::NotFound;
        };

        let canonical = &self.canonical[best.index];
        debug!(
            "Best match for '{}' is '{}' (score {}), mapped to '{}'",
            input, self.aliases[best.index], best.score, canonical
        );
        Resolution::Found(canonical.clone())
    }

    /// Case-insensitive exact match against any alias.
    pub fn resolve_exact(&self, input: &str) -> Resolution {
        let input = input.trim();
        if input.is_empty() {
            return Resolution::NotFound;
        }

        match self.index.canonical_for(input) {
            Some(canonical) => {
                debug!("Substituting alias '{}' with canonical name '{}'", input, canonical);
                Resolution::Found(canonical.to_string())
            }
            None => {
                debug!("No canonical substitution found for '{}'", input);
                Resolution::NotFound
            }
        }
    }
}
