//! Persona-styled recipe generation.
//!
//! Takes the top candidate from the matcher, asks the LLM to rewrite it in the
//! session persona's voice, and runs the output through the same diet and
//! allergen rules the matcher uses. A response that fails parsing, validation
//! or the safety check is retried once; after that the baseline candidate is
//! served as a fallback. Successes and fallbacks are both cached.
//!
//! The candidate itself is checked before any model call, so the fallback can
//! never reintroduce an ingredient the constraints exclude.

pub mod prompts;
mod types;

pub use types::{GeneratedIngredient, GeneratedRecipe, GeneratedResponse, PersonaSummary, Quantity};

use chrono::Utc;
use moka::sync::Cache;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

use crate::catalog::Recipe;
use crate::llm::{CompletionRequest, LlmError, LlmProvider};
use crate::matcher::Constraints;
use crate::persona::{Persona, PersonaError, PersonaPool, PersonaStore};
use crate::rules::{RuleEngine, RuleKind};
use prompts::{render_system_prompt, render_user_prompt, JSON_REMINDER};

/// Default number of cached generated responses.
pub const DEFAULT_RECIPE_CACHE_CAPACITY: u64 = 1_000;

/// Model calls per request before falling back.
pub const MAX_ATTEMPTS: usize = 2;

const TEMPERATURE: f32 = 0.9;

const FALLBACK_STEPS: [&str; 3] = [
    "Förbered alla ingredienser.",
    "Följ grundreceptet för bästa resultat.",
    "Smaka av och servera.",
];

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Persona(#[from] PersonaError),

    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Recipe violates diet {category:?}: {ingredient:?}")]
    DietViolation { category: String, ingredient: String },

    #[error("Recipe contains allergen {category:?}: {ingredient:?}")]
    AllergenViolation { category: String, ingredient: String },

    #[error("Candidate {recipe_id:?} breaks the requested constraints: {reason}")]
    UnsafeCandidate {
        recipe_id: String,
        reason: Box<GenerateError>,
    },
}

/// Generates persona-voiced recipes with retry, safety filtering and caching.
pub struct RecipeGenerator {
    provider: Arc<dyn LlmProvider>,
    personas: Arc<PersonaPool>,
    sessions: Arc<dyn PersonaStore>,
    rules: RuleEngine,
    cache: Cache<String, Arc<GeneratedResponse>>,
    max_attempts: usize,
}

impl fmt::Debug for RecipeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeGenerator")
            .field("provider", &self.provider.provider_name())
            .field("model", &self.provider.model_name())
            .field("cached", &self.cache.entry_count())
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

impl RecipeGenerator {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        personas: Arc<PersonaPool>,
        sessions: Arc<dyn PersonaStore>,
        rules: RuleEngine,
        cache_capacity: u64,
    ) -> Self {
        Self {
            provider,
            personas,
            sessions,
            rules,
            cache: Cache::new(cache_capacity),
            max_attempts: MAX_ATTEMPTS,
        }
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Approximate number of cached responses.
    pub fn cached_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Generate (or fetch from cache) a recipe for `candidate` in the voice of
    /// the persona bound to `chat_id`.
    ///
    /// Model and safety failures never surface; they end in the fallback.
    /// Fails only when the candidate itself breaks `constraints` or when no
    /// persona can be resolved.
    pub async fn generate(
        &self,
        candidate: &Recipe,
        chat_id: &str,
        constraints: &Constraints,
    ) -> Result<Arc<GeneratedResponse>, GenerateError> {
        self.check_candidate(candidate, constraints)?;

        let persona = self.sessions.get_or_assign(chat_id, &self.personas)?;
        let key = cache_key(&candidate.id, &persona.id, constraints);

        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!(cache_key = %key, "Generated recipe cache hit");
            return Ok(cached);
        }
        tracing::debug!(cache_key = %key, "Generated recipe cache miss");

        let system = render_system_prompt(&persona);
        let user = render_user_prompt(candidate, constraints, &persona);

        for attempt in 1..=self.max_attempts {
            let mut request = CompletionRequest {
                system: system.clone(),
                user: user.clone(),
                json_response: true,
                temperature: Some(TEMPERATURE),
            };
            if attempt > 1 {
                request.user.push_str(JSON_REMINDER);
            }

            match self.attempt(&request, &persona, constraints).await {
                Ok(recipe) => {
                    tracing::info!(
                        candidate_id = %candidate.id,
                        persona_id = %persona.id,
                        attempt,
                        steps = recipe.steps.len(),
                        "Generated recipe"
                    );
                    let response = self.respond(recipe, &persona, false);
                    self.cache.insert(key, response.clone());
                    return Ok(response);
                }
                Err(e) => {
                    tracing::warn!(
                        candidate_id = %candidate.id,
                        persona_id = %persona.id,
                        attempt,
                        error = %e,
                        "Generation attempt failed"
                    );
                }
            }
        }

        tracing::info!(
            candidate_id = %candidate.id,
            persona_id = %persona.id,
            "Serving fallback recipe"
        );
        let response = self.respond(fallback(candidate, &persona), &persona, true);
        self.cache.insert(key, response.clone());
        Ok(response)
    }

    async fn attempt(
        &self,
        request: &CompletionRequest,
        persona: &Persona,
        constraints: &Constraints,
    ) -> Result<GeneratedRecipe, GenerateError> {
        let text = self
            .provider
            .complete(request)
            .instrument(tracing::info_span!(
                "llm.request",
                provider = self.provider.provider_name(),
                model = %self.provider.model_name(),
            ))
            .await?;

        let mut recipe: GeneratedRecipe = serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| GenerateError::InvalidResponse(e.to_string()))?;
        recipe.validate().map_err(GenerateError::InvalidResponse)?;
        self.check_generated(&recipe, constraints)?;

        // The session binding wins over whatever id the model echoed
        recipe.persona_id = persona.id.clone();
        if persona.is_silent() {
            recipe.persona_lines.clear();
        }
        Ok(recipe)
    }

    /// Run the diet and allergen rules over a generated recipe's ingredients.
    pub fn check_generated(
        &self,
        recipe: &GeneratedRecipe,
        constraints: &Constraints,
    ) -> Result<(), GenerateError> {
        self.check_ingredients(&recipe.ingredient_names(), constraints)
    }

    /// Run the same rules over the candidate the fallback would be built from.
    pub fn check_candidate(
        &self,
        candidate: &Recipe,
        constraints: &Constraints,
    ) -> Result<(), GenerateError> {
        self.check_ingredients(&candidate.ingredients, constraints)
            .map_err(|reason| {
                tracing::warn!(candidate_id = %candidate.id, %reason, "Rejected unsafe candidate");
                GenerateError::UnsafeCandidate {
                    recipe_id: candidate.id.clone(),
                    reason: Box::new(reason),
                }
            })
    }

    fn check_ingredients<S: AsRef<str>>(
        &self,
        names: &[S],
        constraints: &Constraints,
    ) -> Result<(), GenerateError> {
        if let Some(v) = self
            .rules
            .first_violation(RuleKind::Diet, names, &constraints.diet)
        {
            return Err(GenerateError::DietViolation {
                category: v.category,
                ingredient: v.ingredient,
            });
        }
        if let Some(v) = self
            .rules
            .first_violation(RuleKind::Allergen, names, &constraints.allergies)
        {
            return Err(GenerateError::AllergenViolation {
                category: v.category,
                ingredient: v.ingredient,
            });
        }
        Ok(())
    }

    fn respond(
        &self,
        recipe: GeneratedRecipe,
        persona: &Persona,
        fallback: bool,
    ) -> Arc<GeneratedResponse> {
        Arc::new(GeneratedResponse {
            recipe,
            persona: PersonaSummary::from(persona),
            fallback,
            generated_at: Utc::now(),
        })
    }
}

/// `candidateId::personaId::diet::allergies`, with both lists sorted and comma-joined.
pub fn cache_key(candidate_id: &str, persona_id: &str, constraints: &Constraints) -> String {
    let sorted = |items: &[String]| {
        let mut items = items.to_vec();
        items.sort();
        items.join(",")
    };
    format!(
        "{}::{}::{}::{}",
        candidate_id,
        persona_id,
        sorted(&constraints.diet),
        sorted(&constraints.allergies)
    )
}

/// Remove a surrounding markdown code fence (```json ... ```), if any.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// The baseline candidate with generic steps and no persona line.
pub fn fallback(candidate: &Recipe, persona: &Persona) -> GeneratedRecipe {
    GeneratedRecipe {
        persona_id: persona.id.clone(),
        title: candidate.title.clone(),
        time_minutes: f64::from(candidate.time_minutes),
        difficulty: candidate.difficulty,
        diet_tags: candidate.tags.clone(),
        nutrition: candidate.base_nutrition,
        ingredients: candidate
            .ingredients
            .iter()
            .enumerate()
            .map(|(i, name)| GeneratedIngredient {
                name: name.clone(),
                qty: Quantity::Number(if i == 0 { 250.0 } else { 1.0 }),
                unit: if i == 0 { "g" } else { "st" }.to_string(),
            })
            .collect(),
        steps: FALLBACK_STEPS.iter().map(|s| s.to_string()).collect(),
        persona_lines: Vec::new(),
    }
}
