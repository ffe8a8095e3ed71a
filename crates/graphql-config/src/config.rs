use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a project embedding GraphQL in host-language sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Schema source(s)
    pub schema: SchemaConfig,

    /// Host documents to scan for embedded GraphQL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<DocumentsConfig>,

    /// How GraphQL is embedded in host documents
    #[serde(default)]
    pub extract: ExtractSettings,

    /// External hover/type-definition analysis tool
    #[serde(default)]
    pub analysis: AnalysisSettings,
}

/// Schema source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaConfig {
    /// Single file path or glob pattern
    Path(String),
    /// Multiple file paths or glob patterns
    Paths(Vec<String>),
}

impl SchemaConfig {
    /// Get all schema paths/patterns
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        match self {
            Self::Path(path) => vec![path.as_str()],
            Self::Paths(paths) => paths.iter().map(String::as_str).collect(),
        }
    }
}

/// Documents source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentsConfig {
    /// Single pattern
    Pattern(String),
    /// Multiple patterns
    Patterns(Vec<String>),
}

impl DocumentsConfig {
    /// Get all document patterns
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Pattern(pattern) => vec![pattern.as_str()],
            Self::Patterns(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractSettings {
    /// Tag identifiers, e.g. `relay` for `%relay(...)` regions
    pub tags: Vec<String>,
    /// Number of documents kept in the extraction cache
    pub cache_capacity: usize,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self {
            tags: vec!["relay".to_string()],
            cache_capacity: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    /// Executable invoked as `<command> hover <file> <line> <character>`
    pub command: String,
    /// Milliseconds to wait for the analysis tool before giving up
    pub timeout_ms: u64,
    /// File marking the directory the analysis tool runs in
    pub project_marker: String,
}

impl AnalysisSettings {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            command: "rescript-editor-analysis.exe".to_string(),
            timeout_ms: 5000,
            project_marker: "bsconfig.json".to_string(),
        }
    }
}
