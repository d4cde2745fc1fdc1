pub mod catalog;
pub mod dataset;
pub mod error;
pub mod generate;
pub mod llm;
pub mod matcher;
pub mod normalize;
pub mod persona;
pub mod rules;
pub mod similarity;

pub use catalog::{Catalog, Difficulty, Nutrition, Recipe};
pub use dataset::DataSet;
pub use error::{CatalogError, MatchError};
pub use generate::{GenerateError, GeneratedRecipe, GeneratedResponse, RecipeGenerator};
pub use llm::{LlmError, LlmProvider};
pub use matcher::{Candidate, Constraints, MatchOutcome, Matcher};
pub use normalize::AliasTable;
pub use persona::{InMemoryPersonaStore, Persona, PersonaError, PersonaPool, PersonaStore};
pub use rules::{KeywordRuleSet, RuleEngine, RuleKind, RuleSet, Violation};
pub use similarity::{jaccard, score};
