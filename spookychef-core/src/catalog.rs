//! Seed recipe catalog.
//!
//! The catalog is loaded once at startup, either from `data/recipes_seed.json`
//! (embedded at compile time) or from a data directory, and never mutated.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use crate::error::CatalogError;

/// Difficulty label, serialized with the Swedish names used by the catalog and the LLM schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum Difficulty {
    #[serde(rename = "lätt")]
    Easy,
    #[serde(rename = "medel")]
    Medium,
    #[serde(rename = "svår")]
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "lätt",
            Difficulty::Medium => "medel",
            Difficulty::Hard => "svår",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Nutrition {
    pub kcal: f64,
    pub protein_g: f64,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    /// Raw ingredient names; order is kept for display only.
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub time_minutes: u32,
    pub difficulty: Difficulty,
    pub base_nutrition: Nutrition,
}

static EMBEDDED_CATALOG: LazyLock<Arc<Catalog>> = LazyLock::new(|| {
    let json = include_str!("../../data/recipes_seed.json");
    Arc::new(Catalog::from_json_str(json).expect("Failed to parse recipes_seed.json"))
});

/// Read-only, ordered recipe collection. Iteration order is the tie-break order for ranking.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    recipes: Vec<Recipe>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(recipes: Vec<Recipe>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for recipe in &recipes {
            if !seen.insert(recipe.id.as_str()) {
                return Err(CatalogError::DuplicateRecipe(recipe.id.clone()));
            }
        }
        Ok(Self { recipes })
    }

    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let recipes: Vec<Recipe> = serde_json::from_str(json)
            .map_err(|e| CatalogError::invalid_json("recipes", e))?;
        Self::new(recipes)
    }

    /// The catalog compiled into the binary.
    pub fn embedded() -> Arc<Catalog> {
        EMBEDDED_CATALOG.clone()
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}
