use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContextError>;

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("Configuration error: {0}")]
    Config(#[from] graphql_config::ConfigError),

    #[error("Extraction error: {0}")]
    Extract(#[from] graphql_extract::ExtractError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema loading error: {0}")]
    SchemaLoad(String),

    #[error("Schema parse error: {0}")]
    SchemaParse(String),

    #[error("Document parse error: {0}")]
    DocumentParse(String),

    #[error("Invalid GraphQL name: {0}")]
    InvalidName(String),

    #[error("Type `{type_name}` has no field `{field_name}`")]
    UnknownField {
        type_name: String,
        field_name: String,
    },

    #[error("No node at {0}")]
    NodeNotFound(String),

    #[error("Analysis command failed: {0}")]
    Analysis(String),

    #[error("Analysis command timed out after {0:?}")]
    AnalysisTimeout(Duration),

    #[error("Invalid analysis output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Project not found: {0}")]
    ProjectNotFound(String),
}
