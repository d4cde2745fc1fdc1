use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Invalid JSON in {source_name}: {message}")]
    InvalidJson {
        source_name: String,
        message: String,
    },

    #[error("Duplicate recipe id: {0}")]
    DuplicateRecipe(String),

    #[error("Duplicate persona id: {0}")]
    DuplicatePersona(String),

    #[error("Alias cycle detected starting at {0:?}")]
    AliasCycle(String),

    #[error("Rule {rule:?} includes unknown rule {included:?}")]
    UnknownInclude { rule: String, included: String },

    #[error("Rule include cycle detected at {0:?}")]
    RuleCycle(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CatalogError {
    pub(crate) fn invalid_json(source_name: &str, err: serde_json::Error) -> Self {
        Self::InvalidJson {
            source_name: source_name.to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("No recipes found matching your criteria")]
    NotFound,
}
