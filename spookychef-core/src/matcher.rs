//! Ranking of catalog recipes against a user's ingredients.

use serde::{Deserialize, Serialize};

use crate::catalog::Recipe;
use crate::error::MatchError;
use crate::rules::{RuleEngine, RuleKind};
use crate::similarity::jaccard;

/// Size of the alternate pool offered for re-rolls.
pub const ALTERNATE_POOL_SIZE: usize = 10;

/// Number of leading candidate ids reported as tried.
pub const CANDIDATES_TRIED: usize = 3;

/// Active diet and allergen categories for a request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default)]
    pub diet: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
}

impl Constraints {
    pub fn new(diet: Vec<String>, allergies: Vec<String>) -> Self {
        Self { diet, allergies }
    }

    pub fn is_empty(&self) -> bool {
        self.diet.is_empty() && self.allergies.is_empty()
    }
}

/// A catalog recipe annotated with its similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate<'a> {
    pub recipe: &'a Recipe,
    pub score: f64,
}

/// Matches user ingredients against a catalog, excluding recipes that break the constraints.
#[derive(Debug, Clone)]
pub struct Matcher {
    rules: RuleEngine,
}

impl Matcher {
    pub fn new(rules: RuleEngine) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleEngine {
        &self.rules
    }

    /// Rank `catalog` by similarity to `user_ingredients`.
    ///
    /// Recipes that violate an active diet or contain an active allergen are dropped.
    /// Ties keep catalog order. Returns [`MatchError::NotFound`] when nothing survives;
    /// a zero-score survivor is still a match.
    pub fn rank<'a, S: AsRef<str>>(
        &self,
        user_ingredients: &[S],
        constraints: &Constraints,
        catalog: &'a [Recipe],
    ) -> Result<Vec<Candidate<'a>>, MatchError> {
        let aliases = self.rules.aliases();
        let user = aliases.canonical_set(user_ingredients);

        let mut ranked: Vec<Candidate<'a>> = catalog
            .iter()
            .filter(|recipe| self.is_allowed(recipe, constraints))
            .map(|recipe| Candidate {
                recipe,
                score: jaccard(&user, &aliases.canonical_set(&recipe.ingredients)),
            })
            .collect();

        if ranked.is_empty() {
            tracing::debug!(
                catalog_size = catalog.len(),
                diet = ?constraints.diet,
                allergies = ?constraints.allergies,
                "No recipe survived constraints"
            );
            return Err(MatchError::NotFound);
        }

        // sort_by is stable, so equal scores keep catalog order
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        tracing::debug!(
            catalog_size = catalog.len(),
            retained = ranked.len(),
            top_id = %ranked[0].recipe.id,
            top_score = ranked[0].score,
            "Ranked catalog"
        );

        Ok(ranked)
    }

    /// Rank and package the result as primary, tried ids and alternate pool.
    pub fn search<'a, S: AsRef<str>>(
        &self,
        user_ingredients: &[S],
        constraints: &Constraints,
        catalog: &'a [Recipe],
    ) -> Result<MatchOutcome<'a>, MatchError> {
        let ranked = self.rank(user_ingredients, constraints, catalog)?;
        MatchOutcome::from_ranked(ranked).ok_or(MatchError::NotFound)
    }

    fn is_allowed(&self, recipe: &Recipe, constraints: &Constraints) -> bool {
        if !constraints.diet.is_empty() {
            if let Some(violation) = self.rules.first_violation(
                RuleKind::Diet,
                &recipe.ingredients,
                &constraints.diet,
            ) {
                tracing::trace!(recipe_id = %recipe.id, %violation, "Excluded by diet");
                return false;
            }
        }
        if !constraints.allergies.is_empty() {
            if let Some(violation) = self.rules.first_violation(
                RuleKind::Allergen,
                &recipe.ingredients,
                &constraints.allergies,
            ) {
                tracing::trace!(recipe_id = %recipe.id, %violation, "Excluded by allergen");
                return false;
            }
        }
        true
    }
}

/// Search result in the shape the API serves.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOutcome<'a> {
    /// Top-ranked candidate.
    pub candidate: Candidate<'a>,
    /// Ids of the leading candidates.
    pub candidates_tried: Vec<&'a str>,
    /// Alternate pool for regeneration, best first, including the primary.
    pub all_candidates: Vec<Candidate<'a>>,
}

impl<'a> MatchOutcome<'a> {
    /// Returns `None` for an empty ranking.
    pub fn from_ranked(mut ranked: Vec<Candidate<'a>>) -> Option<Self> {
        let candidate = *ranked.first()?;
        let candidates_tried = ranked
            .iter()
            .take(CANDIDATES_TRIED)
            .map(|c| c.recipe.id.as_str())
            .collect();
        ranked.truncate(ALTERNATE_POOL_SIZE);
        Some(Self {
            candidate,
            candidates_tried,
            all_candidates: ranked,
        })
    }
}
