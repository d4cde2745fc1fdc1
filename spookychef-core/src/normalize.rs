//! Ingredient name normalization.
//!
//! Free-text ingredient names are lowercased, trimmed and resolved through an
//! alias table (`data/ingredient_aliases.json`) to a canonical token. Names
//! without an alias pass through in their lowercased, trimmed form.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use crate::error::CatalogError;

static EMBEDDED_ALIASES: LazyLock<Arc<AliasTable>> = LazyLock::new(|| {
    let json = include_str!("../../data/ingredient_aliases.json");
    Arc::new(AliasTable::from_json_str(json).expect("Failed to parse ingredient_aliases.json"))
});

/// Lowercase and trim an ingredient name.
fn clean(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Mapping from cleaned raw ingredient name to canonical token.
///
/// Every value is a fixed point of the table (chains are resolved when the
/// table is built), so `normalize` is idempotent.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    /// Build a table from raw pairs. Keys and values are cleaned and alias
    /// chains are followed to their final target.
    pub fn new<I, K, V>(pairs: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let raw: HashMap<String, String> = pairs
            .into_iter()
            .map(|(k, v)| (clean(k.as_ref()), clean(v.as_ref())))
            .collect();

        let mut aliases = HashMap::with_capacity(raw.len());
        for key in raw.keys() {
            let mut visited = HashSet::new();
            visited.insert(key.as_str());
            let mut target = &raw[key];
            while let Some(next) = raw.get(target) {
                if next == target {
                    break;
                }
                if !visited.insert(target.as_str()) {
                    return Err(CatalogError::AliasCycle(key.clone()));
                }
                target = next;
            }
            aliases.insert(key.clone(), target.clone());
        }

        Ok(Self { aliases })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let pairs: HashMap<String, String> = serde_json::from_str(json)
            .map_err(|e| CatalogError::invalid_json("ingredient aliases", e))?;
        Self::new(pairs)
    }

    /// The alias table compiled into the binary.
    pub fn embedded() -> Arc<AliasTable> {
        EMBEDDED_ALIASES.clone()
    }

    /// Map a raw ingredient name to its canonical token.
    pub fn normalize(&self, raw: &str) -> String {
        let cleaned = clean(raw);
        match self.aliases.get(&cleaned) {
            Some(alias) => alias.clone(),
            None => cleaned,
        }
    }

    /// Normalize element-wise, keeping order and duplicates.
    pub fn normalize_all<S: AsRef<str>>(&self, raws: &[S]) -> Vec<String> {
        raws.iter().map(|r| self.normalize(r.as_ref())).collect()
    }

    /// Normalize into a set of canonical tokens.
    pub fn canonical_set<S: AsRef<str>>(&self, raws: &[S]) -> HashSet<String> {
        raws.iter().map(|r| self.normalize(r.as_ref())).collect()
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
