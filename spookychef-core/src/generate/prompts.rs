//! Prompts for persona-styled recipe generation.

use crate::catalog::Recipe;
use crate::matcher::Constraints;
use crate::persona::Persona;

/// Appended to the user prompt on retries.
pub const JSON_REMINDER: &str =
    "\n\nIMPORTANT: Return ONLY valid JSON, no markdown fences or extra text!";

/// Render the system prompt: who the model is, the language rules and the output schema.
pub fn render_system_prompt(persona: &Persona) -> String {
    let persona_line_rule = if persona.is_silent() {
        "You are SILENT: personaLines must be an empty array. Keep the steps short and blunt."
            .to_string()
    } else {
        format!(
            "Add EXACTLY ONE short, characteristic line from {} to personaLines, in ENGLISH.",
            persona.display_name
        )
    };
    let persona_lines_schema = if persona.is_silent() {
        ""
    } else {
        r#""string (one line in English)""#
    };

    format!(
        r#"You are {name}, a horror-movie character who loves to cook (PG-16 parody).

CHARACTER:
- Voice: {voice}
- Guardrails: {guardrails}
- Quote policy: {quote_policy}

LANGUAGE:
- Title and steps MUST be written in SWEDISH, in Swedish sentence case ("Spöklikt god pasta", not "Spöklikt God Pasta").
- Every step is spoken in {name}'s voice.
- {persona_line_rule}

SAFETY:
- PG-16: no graphic gore, violence or body parts.
- No cannibalism references; keep it about the food.
- Follow the quote policy: paraphrase, never quote film dialogue verbatim.
- Respect ALL dietary restrictions and allergies. Never add an ingredient the user must avoid.

OUTPUT:
Return ONLY valid JSON matching this schema:
{{
  "personaId": "{id}",
  "title": "string (Swedish)",
  "timeMinutes": number,
  "difficulty": "lätt" | "medel" | "svår",
  "dietTags": ["string"],
  "nutrition": {{"kcal": number, "protein_g": number}},
  "ingredients": [{{"name": "string", "qty": number | "string", "unit": "string"}}],
  "steps": ["string (Swedish, in character)"],
  "personaLines": [{persona_lines_schema}]
}}"#,
        name = persona.display_name,
        voice = persona.voice,
        guardrails = persona.guardrails,
        quote_policy = persona.quote_policy,
        persona_line_rule = persona_line_rule,
        id = persona.id,
        persona_lines_schema = persona_lines_schema,
    )
}

/// Render the user prompt: the base recipe and the active constraints.
pub fn render_user_prompt(candidate: &Recipe, constraints: &Constraints, persona: &Persona) -> String {
    let base = serde_json::to_string_pretty(candidate).unwrap_or_else(|_| candidate.title.clone());
    let list = |items: &[String]| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };

    format!(
        r#"Adapt this base recipe to {name}'s style. All recipe text in SWEDISH.

BASE RECIPE:
{base}

CONSTRAINTS:
- Diet: {diet}
- Allergies to avoid: {allergies}
- Persona id: {id}

Keep the core ingredients. Adjust quantities and add small touches that fit the character.
Return ONLY the JSON object."#,
        name = persona.display_name,
        base = base,
        diet = list(&constraints.diet),
        allergies = list(&constraints.allergies),
        id = persona.id,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::persona::PersonaPool;

    #[test]
    fn test_render_prompts() {
        let pool = PersonaPool::embedded();
        let ghostface = pool.get("ghostface").unwrap();
        let catalog = Catalog::embedded();
        let recipe = catalog.get("pasta-pomodoro").unwrap();

        let system = render_system_prompt(&ghostface);
        assert!(system.contains(&ghostface.display_name));
        assert!(system.contains(r#""personaId": "ghostface""#));
        assert!(system.contains("EXACTLY ONE"));

        let constraints = Constraints::new(vec!["vegetarian".to_string()], vec![]);
        let user = render_user_prompt(recipe, &constraints, &ghostface);
        assert!(user.contains("pasta-pomodoro"));
        assert!(user.contains("Diet: vegetarian"));
        assert!(user.contains("Allergies to avoid: none"));
    }

    #[test]
    fn test_silent_persona_gets_no_line() {
        let pool = PersonaPool::embedded();
        let art = pool.get("art-the-clown").unwrap();
        let system = render_system_prompt(&art);
        assert!(system.contains("SILENT"));
        assert!(system.contains(r#""personaLines": []"#));
    }
}
