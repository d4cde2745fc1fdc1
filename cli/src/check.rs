//! Run the diet and allergen filter over an ingredient list.

use anyhow::Result;
use serde::Serialize;
use spookychef_core::{DataSet, RuleKind, Violation};

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub normalized: Vec<String>,
    pub violations: Vec<ViolationRow>,
}

#[derive(Debug, Serialize)]
pub struct ViolationRow {
    pub kind: String,
    pub category: String,
    pub ingredient: String,
    pub keyword: String,
}

impl From<Violation> for ViolationRow {
    fn from(v: Violation) -> Self {
        Self {
            kind: v.kind.to_string(),
            category: v.category,
            ingredient: v.ingredient,
            keyword: v.keyword,
        }
    }
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

pub fn run(
    data: &DataSet,
    ingredients: &[String],
    diet: &[String],
    allergies: &[String],
) -> CheckReport {
    let engine = data.rule_engine();
    let violations = engine
        .violations(RuleKind::Diet, ingredients, diet)
        .into_iter()
        .chain(engine.violations(RuleKind::Allergen, ingredients, allergies))
        .map(ViolationRow::from)
        .collect();

    CheckReport {
        normalized: engine.aliases().normalize_all(ingredients),
        violations,
    }
}

pub fn render(report: &CheckReport, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    if report.is_clean() {
        return Ok(format!("OK: {}", report.normalized.join(", ")));
    }

    let mut lines = vec![format!("{} violation(s):", report.violations.len())];
    for v in &report.violations {
        lines.push(format!(
            "  {} {}: {} (matched \"{}\")",
            v.kind, v.category, v.ingredient, v.keyword
        ));
    }
    Ok(lines.join("\n"))
}
