mod config;
mod error;
mod loader;

pub use config::{AnalysisSettings, DocumentsConfig, ExtractSettings, ProjectConfig, SchemaConfig};
pub use error::{ConfigError, Result};
pub use loader::{find_config, find_project_root, load_config, load_config_from_str};
