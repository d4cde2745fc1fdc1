//! Generated recipe types, as returned by the model and served to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Difficulty, Nutrition};
use crate::persona::Persona;

/// Ingredient quantity: models answer with either a number or free text ("en nypa").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum Quantity {
    Number(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct GeneratedIngredient {
    pub name: String,
    pub qty: Quantity,
    pub unit: String,
}

/// A persona-styled recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GeneratedRecipe {
    pub persona_id: String,
    pub title: String,
    pub time_minutes: f64,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub diet_tags: Vec<String>,
    pub nutrition: Nutrition,
    pub ingredients: Vec<GeneratedIngredient>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub persona_lines: Vec<String>,
}

impl GeneratedRecipe {
    /// Check the constraints serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if !self.time_minutes.is_finite() || self.time_minutes <= 0.0 {
            return Err(format!(
                "timeMinutes must be positive, got {}",
                self.time_minutes
            ));
        }
        if self.persona_lines.len() > 1 {
            return Err(format!(
                "at most one persona line allowed, got {}",
                self.persona_lines.len()
            ));
        }
        Ok(())
    }

    pub fn ingredient_names(&self) -> Vec<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }
}

/// The public subset of a persona attached to each response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PersonaSummary {
    pub id: String,
    pub display_name: String,
    pub movie_imdb_url: String,
    pub origin: String,
}

impl From<&Persona> for PersonaSummary {
    fn from(persona: &Persona) -> Self {
        Self {
            id: persona.id.clone(),
            display_name: persona.display_name.clone(),
            movie_imdb_url: persona.movie_imdb_url.clone(),
            origin: persona.origin.clone(),
        }
    }
}

/// Generated recipe plus the persona that voiced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResponse {
    #[serde(flatten)]
    pub recipe: GeneratedRecipe,
    pub persona: PersonaSummary,
    /// True when the model failed and the baseline candidate was served.
    pub fallback: bool,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODEL_OUTPUT: &str = r#"{
        "personaId": "ghostface",
        "title": "Vad är din favoritpasta?",
        "timeMinutes": 25,
        "difficulty": "lätt",
        "dietTags": ["vegetarisk"],
        "nutrition": {"kcal": 520, "protein_g": 18},
        "ingredients": [
            {"name": "pasta", "qty": 400, "unit": "g"},
            {"name": "salt", "qty": "en nypa", "unit": ""}
        ],
        "steps": ["Koka vattnet.", "Servera."],
        "personaLines": ["What's your favorite scary pasta?"]
    }"#;

    #[test]
    fn test_parse_model_output() {
        let recipe: GeneratedRecipe = serde_json::from_str(MODEL_OUTPUT).unwrap();
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert_eq!(recipe.ingredients[0].qty, Quantity::Number(400.0));
        assert_eq!(
            recipe.ingredients[1].qty,
            Quantity::Text("en nypa".to_string())
        );
        assert_eq!(recipe.ingredient_names(), vec!["pasta", "salt"]);
        assert!(recipe.validate().is_ok());
    }

    #[test]
    fn test_unknown_difficulty_is_rejected() {
        let json = MODEL_OUTPUT.replace("\"lätt\"", "\"extrem\"");
        assert!(serde_json::from_str::<GeneratedRecipe>(&json).is_err());
    }

    #[test]
    fn test_validate() {
        let mut recipe: GeneratedRecipe = serde_json::from_str(MODEL_OUTPUT).unwrap();
        recipe.time_minutes = 0.0;
        assert!(recipe.validate().is_err());

        recipe.time_minutes = 10.0;
        recipe.persona_lines = vec!["one".to_string(), "two".to_string()];
        assert!(recipe.validate().unwrap_err().contains("persona line"));
    }
}
