//! Diet and allergen rules.
//!
//! A [`RuleSet`] maps a category name (e.g. "vegan", "nötter") to a predicate
//! over a single normalized ingredient. The shipped [`KeywordRuleSet`] uses
//! substring matching of keyword stems loaded from `data/dietary_rules.json`,
//! where stems are grouped by language and all languages apply at once.
//!
//! Substring matching is conservative: it may produce false
//! positives ("äggfri majonnäs" trips the egg rule) but does not miss an
//! ingredient that contains a listed stem.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::error::CatalogError;
use crate::normalize::AliasTable;

static EMBEDDED_RULES: LazyLock<Arc<KeywordRuleSet>> = LazyLock::new(|| {
    let json = include_str!("../../data/dietary_rules.json");
    Arc::new(KeywordRuleSet::from_json_str(json).expect("Failed to parse dietary_rules.json"))
});

/// Which family of rules a category belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Diet,
    Allergen,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Diet => write!(f, "diet"),
            RuleKind::Allergen => write!(f, "allergen"),
        }
    }
}

/// A predicate over one normalized ingredient.
pub trait IngredientRule: Send + Sync + fmt::Debug {
    /// Canonical category name, e.g. "vegetarian".
    fn name(&self) -> &str;

    /// The keyword that makes this ingredient trip the rule, if any.
    fn matched_keyword(&self, ingredient: &str) -> Option<&str>;
}

/// Lookup from category name to rule.
///
/// Unknown categories return `None` and therefore never trip.
pub trait RuleSet: Send + Sync + fmt::Debug {
    fn diet_rule(&self, category: &str) -> Option<&dyn IngredientRule>;

    fn allergen_rule(&self, category: &str) -> Option<&dyn IngredientRule>;
}

/// A keyword stem tagged with the language it was authored in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stem {
    pub lang: String,
    pub text: String,
}

/// Substring rule over a list of stems.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    name: String,
    stems: Vec<Stem>,
}

impl KeywordRule {
    pub fn stems(&self) -> &[Stem] {
        &self.stems
    }
}

impl IngredientRule for KeywordRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn matched_keyword(&self, ingredient: &str) -> Option<&str> {
        self.stems
            .iter()
            .find(|stem| ingredient.contains(stem.text.as_str()))
            .map(|stem| stem.text.as_str())
    }
}

#[derive(Deserialize)]
struct RulesFile {
    diets: Vec<CategoryDef>,
    allergens: Vec<CategoryDef>,
}

#[derive(Deserialize)]
struct CategoryDef {
    name: String,
    #[serde(default)]
    synonyms: Vec<String>,
    /// Other categories (diet or allergen) whose stems are merged into this one.
    #[serde(default)]
    includes: Vec<String>,
    /// Language code -> stems.
    #[serde(default)]
    stems: BTreeMap<String, Vec<String>>,
}

/// Keyword rules for diets and allergens, looked up case-insensitively by name or synonym.
#[derive(Debug, Clone, Default)]
pub struct KeywordRuleSet {
    diets: Vec<KeywordRule>,
    allergens: Vec<KeywordRule>,
    diet_index: HashMap<String, usize>,
    allergen_index: HashMap<String, usize>,
}

impl KeywordRuleSet {
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let file: RulesFile = serde_json::from_str(json)
            .map_err(|e| CatalogError::invalid_json("dietary rules", e))?;

        let defs: HashMap<String, &CategoryDef> = file
            .diets
            .iter()
            .chain(file.allergens.iter())
            .map(|d| (d.name.trim().to_lowercase(), d))
            .collect();

        let build = |section: &[CategoryDef]| -> Result<(Vec<KeywordRule>, HashMap<String, usize>), CatalogError> {
            let mut rules = Vec::with_capacity(section.len());
            let mut index = HashMap::new();
            for def in section {
                let mut stems = Vec::new();
                let mut visiting = HashSet::new();
                collect_stems(def, &defs, &mut visiting, &mut stems)?;
                let position = rules.len();
                index.insert(def.name.trim().to_lowercase(), position);
                for synonym in &def.synonyms {
                    index.insert(synonym.trim().to_lowercase(), position);
                }
                rules.push(KeywordRule {
                    name: def.name.trim().to_lowercase(),
                    stems,
                });
            }
            Ok((rules, index))
        };

        let (diets, diet_index) = build(&file.diets)?;
        let (allergens, allergen_index) = build(&file.allergens)?;

        Ok(Self {
            diets,
            allergens,
            diet_index,
            allergen_index,
        })
    }

    /// The rule set compiled into the binary.
    pub fn embedded() -> Arc<KeywordRuleSet> {
        EMBEDDED_RULES.clone()
    }

    pub fn diets(&self) -> &[KeywordRule] {
        &self.diets
    }

    pub fn allergens(&self) -> &[KeywordRule] {
        &self.allergens
    }
}

/// Gather a category's own stems followed by those of its includes, without duplicates.
fn collect_stems<'a>(
    def: &'a CategoryDef,
    defs: &HashMap<String, &'a CategoryDef>,
    visiting: &mut HashSet<String>,
    out: &mut Vec<Stem>,
) -> Result<(), CatalogError> {
    let name = def.name.trim().to_lowercase();
    if !visiting.insert(name.clone()) {
        return Err(CatalogError::RuleCycle(name));
    }

    for included in &def.includes {
        let key = included.trim().to_lowercase();
        let inner = defs.get(&key).ok_or_else(|| CatalogError::UnknownInclude {
            rule: name.clone(),
            included: included.clone(),
        })?;
        collect_stems(inner, defs, visiting, out)?;
    }

    for (lang, stems) in &def.stems {
        for text in stems {
            let stem = Stem {
                lang: lang.clone(),
                text: text.trim().to_lowercase(),
            };
            if !stem.text.is_empty() && !out.iter().any(|s| s.text == stem.text) {
                out.push(stem);
            }
        }
    }

    visiting.remove(&name);
    Ok(())
}

impl RuleSet for KeywordRuleSet {
    fn diet_rule(&self, category: &str) -> Option<&dyn IngredientRule> {
        let position = self.diet_index.get(&category.trim().to_lowercase())?;
        self.diets.get(*position).map(|r| r as &dyn IngredientRule)
    }

    fn allergen_rule(&self, category: &str) -> Option<&dyn IngredientRule> {
        let position = self.allergen_index.get(&category.trim().to_lowercase())?;
        self.allergens.get(*position).map(|r| r as &dyn IngredientRule)
    }
}

/// One ingredient tripping one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: RuleKind,
    /// Canonical rule name.
    pub category: String,
    /// Normalized ingredient that tripped the rule.
    pub ingredient: String,
    pub keyword: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:?}: {:?} contains {:?}",
            self.kind, self.category, self.ingredient, self.keyword
        )
    }
}

/// Classifies ingredient lists against diet and allergen categories.
///
/// Used both before matching (catalog recipes) and after generation (LLM output);
/// it makes no distinction between the two.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    aliases: Arc<AliasTable>,
    rules: Arc<dyn RuleSet>,
}

impl RuleEngine {
    pub fn new(aliases: Arc<AliasTable>, rules: Arc<dyn RuleSet>) -> Self {
        Self { aliases, rules }
    }

    /// Engine over the embedded alias table and keyword rules.
    pub fn embedded() -> Self {
        Self::new(AliasTable::embedded(), KeywordRuleSet::embedded())
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn violates_diet<I: AsRef<str>, D: AsRef<str>>(&self, ingredients: &[I], diet: &[D]) -> bool {
        self.first_violation(RuleKind::Diet, ingredients, diet).is_some()
    }

    pub fn contains_allergens<I: AsRef<str>, A: AsRef<str>>(
        &self,
        ingredients: &[I],
        allergens: &[A],
    ) -> bool {
        self.first_violation(RuleKind::Allergen, ingredients, allergens)
            .is_some()
    }

    /// Every (category, ingredient) pair that trips, in category then ingredient order.
    pub fn violations<I: AsRef<str>, C: AsRef<str>>(
        &self,
        kind: RuleKind,
        ingredients: &[I],
        categories: &[C],
    ) -> Vec<Violation> {
        let normalized = self.aliases.normalize_all(ingredients);
        let mut found = Vec::new();
        for rule in categories.iter().filter_map(|c| self.rule(kind, c.as_ref())) {
            for ingredient in &normalized {
                if let Some(keyword) = rule.matched_keyword(ingredient) {
                    found.push(Violation {
                        kind,
                        category: rule.name().to_string(),
                        ingredient: ingredient.clone(),
                        keyword: keyword.to_string(),
                    });
                }
            }
        }
        found
    }

    /// The first (category, ingredient) pair that trips, if any.
    pub fn first_violation<I: AsRef<str>, C: AsRef<str>>(
        &self,
        kind: RuleKind,
        ingredients: &[I],
        categories: &[C],
    ) -> Option<Violation> {
        if categories.is_empty() || ingredients.is_empty() {
            return None;
        }
        let normalized = self.aliases.normalize_all(ingredients);
        categories
            .iter()
            .filter_map(|c| self.rule(kind, c.as_ref()))
            .find_map(|rule| {
                normalized.iter().find_map(|ingredient| {
                    rule.matched_keyword(ingredient).map(|keyword| Violation {
                        kind,
                        category: rule.name().to_string(),
                        ingredient: ingredient.clone(),
                        keyword: keyword.to_string(),
                    })
                })
            })
    }

    fn rule(&self, kind: RuleKind, category: &str) -> Option<&dyn IngredientRule> {
        match kind {
            RuleKind::Diet => self.rules.diet_rule(category),
            RuleKind::Allergen => self.rules.allergen_rule(category),
        }
    }
}
