//! Instructor identities and alias resolution.
//!
//! The alias registry is a small table of people, each with one canonical
//! name and the informal forms users tend to type. It is loaded once at
//! startup (from settings or a TOML file) and never mutated afterwards.

mod fuzzy;
mod resolver;

pub use fuzzy::{find as fuzzy_find, score as fuzzy_score, FuzzyMatch};
pub use resolver::{NameResolver, Resolution, ResolutionMode};

use crate::error::{CoursebotError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// A person with one canonical name and a set of surface-form aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// The stable, normalized name for this person.
    pub canonical_name: String,
    /// Known aliases. Always includes the canonical name.
    pub aliases: Vec<String>,
}

impl Identity {
    /// Create an identity. The canonical name is added to the aliases if missing.
    pub fn new(canonical_name: &str, aliases: &[&str]) -> Self {
        let mut identity = Self {
            canonical_name: canonical_name.to_string(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        };
        identity.normalize();
        identity
    }

    /// Ensure the canonical name is listed as written and drop case-insensitive duplicates.
    fn normalize(&mut self) {
        self.canonical_name = self.canonical_name.trim().to_string();
        let canonical_key = self.canonical_name.to_lowercase();
        match self
            .aliases
            .iter()
            .position(|a| a.trim().to_lowercase() == canonical_key)
        {
            Some(index) => self.aliases[index] = self.canonical_name.clone(),
            None => self.aliases.push(self.canonical_name.clone()),
        }

        let mut seen = HashSet::new();
        self.aliases.retain(|alias| {
            let key = alias.trim().to_lowercase();
            !key.is_empty() && seen.insert(key)
        });
        for alias in &mut self.aliases {
            *alias = alias.trim().to_string();
        }
    }
}

/// The identity table shipped with the assistant.
pub fn builtin_identities() -> Vec<Identity> {
    vec![
        Identity::new("Philip Peterson", &["Phil Peterson", "Philip Peterson"]),
        Identity::new("Philip Choong", &["Phil Choong", "Philip Choong"]),
        Identity::new("Gregory Benson", &["Greg Benson", "Gregory Benson"]),
    ]
}

/// On-disk layout of an alias registry file.
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(rename = "identity", default)]
    identities: Vec<Identity>,
}

/// Fixed, validated table of known identities.
#[derive(Debug, Clone)]
pub struct AliasRegistry {
    identities: Vec<Identity>,
}

impl AliasRegistry {
    /// Build a registry, rejecting blank or duplicate canonical names and
    /// identities without at least one informal alias.
    pub fn new(identities: Vec<Identity>) -> Result<Self> {
        let mut canonical = HashSet::new();
        let mut normalized = Vec::with_capacity(identities.len());

        for mut identity in identities {
            identity.normalize();

            if identity.canonical_name.is_empty() {
                return Err(CoursebotError::Config(
                    "Alias registry contains an identity with an empty canonical name".to_string(),
                ));
            }
            if !canonical.insert(identity.canonical_name.to_lowercase()) {
                return Err(CoursebotError::Config(format!(
                    "Duplicate canonical name in alias registry: {}",
                    identity.canonical_name
                )));
            }
            if identity.aliases.len() < 2 {
                return Err(CoursebotError::Config(format!(
                    "Identity '{}' must list at least one informal alias",
                    identity.canonical_name
                )));
            }

            normalized.push(identity);
        }

        Ok(Self {
            identities: normalized,
        })
    }

    /// The built-in registry.
    pub fn builtin() -> Self {
        Self {
            identities: builtin_identities(),
        }
    }

    /// Load a registry from a TOML file of `[[identity]]` tables.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let file: RegistryFile = toml::from_str(&content)?;
        Self::new(file.identities)
    }

    /// All identities, in table order.
    pub fn list_identities(&self) -> &[Identity] {
        &self.identities
    }

    /// Build the lowercase alias lookup for this registry.
    pub fn index(&self) -> AliasIndex {
        AliasIndex::new(&self.identities)
    }
}

impl Default for AliasRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercase alias to canonical name lookup.
///
/// Aliases shared by two identities resolve to the first one listed.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    entries: HashMap<String, String>,
}

impl AliasIndex {
    /// Build an index over the given identities.
    pub fn new(identities: &[Identity]) -> Self {
        let mut entries = HashMap::new();
        for identity in identities {
            for alias in &identity.aliases {
                let key = alias.to_lowercase();
                if let Some(existing) = entries.get(&key) {
                    if existing != &identity.canonical_name {
                        debug!(
                            "Alias '{}' is shared by '{}' and '{}', keeping the first",
                            alias, existing, identity.canonical_name
                        );
                    }
                    continue;
                }
                entries.insert(key, identity.canonical_name.clone());
            }
        }
        Self { entries }
    }

    /// Canonical name for an alias, compared case-insensitively.
    pub fn canonical_for(&self, alias: &str) -> Option<&str> {
        self.entries
            .get(&alias.trim().to_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replace every alias that appears in `question` with its canonical name.
///
/// Detection is case-insensitive but replacement is a literal, case-sensitive
/// substring replace, so an alias typed in a different case is detected and
/// left as typed.
pub fn substitute_aliases(question: &str, identities: &[Identity]) -> String {
    let mut result = question.to_string();
    for identity in identities {
        for alias in &identity.aliases {
            if result.to_lowercase().contains(&alias.to_lowercase()) {
                result = result.replace(alias.as_str(), &identity.canonical_name);
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_includes_canonical_name() {
        let identity = Identity::new("Gregory Benson", &["Greg Benson"]);
        assert_eq!(identity.aliases, vec!["Greg Benson", "Gregory Benson"]);

        let identity = Identity::new("Gregory Benson", &["Greg Benson", "greg benson", "Gregory Benson"]);
        assert_eq!(identity.aliases.len(), 2);
    }

    #[test]
    fn test_non_ascii_canonical_name_is_kept() {
        let identity = Identity::new("Élodie Durand", &["élodie durand", "Elo Durand", "ÉLODIE DURAND"]);
        assert_eq!(identity.aliases, vec!["Élodie Durand", "Elo Durand"]);

        let identity = Identity::new("Élodie Durand", &["Elo Durand"]);
        assert_eq!(identity.aliases, vec!["Elo Durand", "Élodie Durand"]);
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let result = AliasRegistry::new(vec![
            Identity::new("Philip Peterson", &["Phil Peterson"]),
            Identity::new("philip peterson", &["P. Peterson"]),
        ]);
        assert!(matches!(result, Err(CoursebotError::Config(_))));
    }

    #[test]
    fn test_registry_requires_informal_alias() {
        let result = AliasRegistry::new(vec![Identity::new("Philip Peterson", &[])]);
        assert!(result.is_err());
    }

    #[test]
    fn test_registry_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aliases.toml");
        std::fs::write(
            &path,
            r#"
[[identity]]
canonical_name = "Sheryl Davis"
aliases = ["Sher Davis"]
"#,
        )
        .unwrap();

        let registry = AliasRegistry::from_file(&path).unwrap();
        assert_eq!(registry.list_identities().len(), 1);
        assert_eq!(
            registry.index().canonical_for("SHER DAVIS"),
            Some("Sheryl Davis")
        );
    }

    #[test]
    fn test_index_is_case_insensitive() {
        let index = AliasRegistry::builtin().index();
        assert_eq!(index.canonical_for("phil choong"), Some("Philip Choong"));
        assert_eq!(index.canonical_for("  Greg Benson "), Some("Gregory Benson"));
        assert_eq!(index.canonical_for("Bruce Wayne"), None);
        assert_eq!(index.len(), 6);
    }

    #[test]
    fn test_index_keeps_first_on_overlap() {
        let index = AliasIndex::new(&[
            Identity::new("Alex Kim", &["A. Kim"]),
            Identity::new("Alexandra Kim", &["A. Kim"]),
        ]);
        assert_eq!(index.canonical_for("a. kim"), Some("Alex Kim"));
    }

    #[test]
    fn test_substitute_aliases() {
        let identities = builtin_identities();
        assert_eq!(
            substitute_aliases("What CS classes is Phil Peterson teaching?", &identities),
            "What CS classes is Philip Peterson teaching?"
        );
        // Detected case-insensitively, but replaced only on an exact-case hit.
        assert_eq!(
            substitute_aliases("courses by phil choong", &identities),
            "courses by phil choong"
        );
        assert_eq!(
            substitute_aliases("Where does Bioinformatics meet?", &identities),
            "Where does Bioinformatics meet?"
        );
    }
}
