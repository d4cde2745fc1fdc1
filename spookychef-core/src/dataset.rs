//! Startup data: catalog, aliases, rules and personas.
//!
//! Each file is read from a data directory when present there, otherwise the
//! copy embedded at compile time is used.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::normalize::AliasTable;
use crate::persona::PersonaPool;
use crate::rules::{KeywordRuleSet, RuleEngine};

pub const RECIPES_FILE: &str = "recipes_seed.json";
pub const ALIASES_FILE: &str = "ingredient_aliases.json";
pub const RULES_FILE: &str = "dietary_rules.json";
pub const PERSONAS_FILE: &str = "personas_pool.json";

/// Everything the matcher and generator read, loaded once.
#[derive(Debug, Clone)]
pub struct DataSet {
    pub catalog: Arc<Catalog>,
    pub aliases: Arc<AliasTable>,
    pub rules: Arc<KeywordRuleSet>,
    pub personas: Arc<PersonaPool>,
}

impl DataSet {
    pub fn embedded() -> Self {
        Self {
            catalog: Catalog::embedded(),
            aliases: AliasTable::embedded(),
            rules: KeywordRuleSet::embedded(),
            personas: PersonaPool::embedded(),
        }
    }

    /// Load from `dir`, falling back to the embedded copy for each missing file.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        let catalog = match read_optional(dir, RECIPES_FILE)? {
            Some(json) => Arc::new(Catalog::from_json_str(&json)?),
            None => Catalog::embedded(),
        };
        let aliases = match read_optional(dir, ALIASES_FILE)? {
            Some(json) => Arc::new(AliasTable::from_json_str(&json)?),
            None => AliasTable::embedded(),
        };
        let rules = match read_optional(dir, RULES_FILE)? {
            Some(json) => Arc::new(KeywordRuleSet::from_json_str(&json)?),
            None => KeywordRuleSet::embedded(),
        };
        let personas = match read_optional(dir, PERSONAS_FILE)? {
            Some(json) => Arc::new(PersonaPool::from_json_str(&json)?),
            None => PersonaPool::embedded(),
        };

        tracing::info!(
            dir = %dir.display(),
            recipes = catalog.len(),
            aliases = aliases.len(),
            personas = personas.len(),
            "Loaded data set"
        );

        Ok(Self {
            catalog,
            aliases,
            rules,
            personas,
        })
    }

    /// Rule engine over this data set's aliases and rules.
    pub fn rule_engine(&self) -> RuleEngine {
        RuleEngine::new(self.aliases.clone(), self.rules.clone())
    }
}

fn read_optional(dir: &Path, name: &str) -> Result<Option<String>, CatalogError> {
    let path = dir.join(name);
    if !path.exists() {
        tracing::debug!(path = %path.display(), "Data file not found, using embedded copy");
        return Ok(None);
    }
    fs::read_to_string(&path)
        .map(Some)
        .map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_files_fall_back_to_embedded() {
        let dir = TempDir::new().unwrap();
        let data = DataSet::load_dir(dir.path()).unwrap();
        assert_eq!(data.catalog.len(), Catalog::embedded().len());
        assert_eq!(data.personas.len(), PersonaPool::embedded().len());
    }

    #[test]
    fn test_overrides_from_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(RECIPES_FILE),
            r#"[{"id": "only", "title": "Only", "ingredients": ["ris"], "timeMinutes": 5, "difficulty": "lätt", "baseNutrition": {"kcal": 1, "protein_g": 1}}]"#,
        )
        .unwrap();
        fs::write(dir.path().join(ALIASES_FILE), r#"{"rice": "ris"}"#).unwrap();

        let data = DataSet::load_dir(dir.path()).unwrap();
        assert_eq!(data.catalog.len(), 1);
        assert_eq!(data.aliases.normalize("Rice"), "ris");
        assert!(data
            .rule_engine()
            .violates_diet(&["kyckling"], &["vegetarian"]));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PERSONAS_FILE), "not json").unwrap();
        assert!(matches!(
            DataSet::load_dir(dir.path()),
            Err(CatalogError::InvalidJson { .. })
        ));
    }
}
