//! Offline catalog search.

use anyhow::Result;
use serde_json::json;
use spookychef_core::{Constraints, DataSet, MatchOutcome, Matcher};

pub fn run(
    data: &DataSet,
    ingredients: &[String],
    diet: Vec<String>,
    allergies: Vec<String>,
    json: bool,
) -> Result<String> {
    let matcher = Matcher::new(data.rule_engine());
    let constraints = Constraints::new(diet, allergies);
    let outcome = matcher.search(ingredients, &constraints, data.catalog.recipes())?;

    if json {
        let value = json!({
            "candidate": outcome.candidate,
            "candidatesTried": outcome.candidates_tried,
            "allCandidates": outcome.all_candidates,
        });
        return Ok(serde_json::to_string_pretty(&value)?);
    }

    Ok(render_table(&outcome))
}

fn render_table(outcome: &MatchOutcome<'_>) -> String {
    let mut lines = vec![format!(
        "{:>4}  {:>5}  {:<20}  {:<32}  {:>5}",
        "rank", "score", "id", "title", "min"
    )];
    for (i, candidate) in outcome.all_candidates.iter().enumerate() {
        lines.push(format!(
            "{:>4}  {:>5.3}  {:<20}  {:<32}  {:>5}",
            i + 1,
            candidate.score,
            candidate.recipe.id,
            candidate.recipe.title,
            candidate.recipe.time_minutes
        ));
    }
    lines.push(String::new());
    lines.push(format!("Tried: {}", outcome.candidates_tried.join(", ")));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_lists_best_match_first() {
        let data = DataSet::embedded();
        let out = run(
            &data,
            &strings(&["pasta", "tomat", "vitlök"]),
            vec![],
            vec![],
            false,
        )
        .unwrap();

        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].contains("score"));
        assert!(lines[1].contains("pasta-pomodoro"));
        assert!(out.ends_with("Tried: pasta-pomodoro, lammstek, linssoppa"));
    }

    #[test]
    fn test_json_output_respects_diet() {
        let data = DataSet::embedded();
        let out = run(
            &data,
            &strings(&["kyckling", "ris"]),
            strings(&["vegetarian"]),
            vec![],
            true,
        )
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_ne!(value["candidate"]["recipe"]["id"], "kycklinggryta");
        assert_eq!(value["candidatesTried"].as_array().unwrap().len(), 3);
        for candidate in value["allCandidates"].as_array().unwrap() {
            assert_ne!(candidate["recipe"]["id"], "kycklinggryta");
        }
    }

    #[test]
    fn test_nothing_left_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("recipes_seed.json"),
            r#"[{"id": "r1", "title": "Kyckling", "ingredients": ["kyckling", "ris"], "timeMinutes": 30, "difficulty": "lätt", "baseNutrition": {"kcal": 600, "protein_g": 40}}]"#,
        )
        .unwrap();
        let data = DataSet::load_dir(dir.path()).unwrap();

        let err = run(&data, &strings(&["ris"]), strings(&["veg"]), vec![], false).unwrap_err();
        assert_eq!(err.to_string(), "No recipes found matching your criteria");
    }
}
