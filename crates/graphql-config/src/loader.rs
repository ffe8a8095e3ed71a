use crate::{ConfigError, ProjectConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
const CONFIG_FILES: &[&str] = &[
    ".graphqlrc.yml",
    ".graphqlrc.yaml",
    ".graphqlrc.json",
    ".graphqlrc",
    "graphql.config.yml",
    "graphql.config.yaml",
    "graphql.config.json",
];

/// Find a config file by walking up the directory tree from `start_dir`.
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    for dir in start_dir.ancestors() {
        for file_name in CONFIG_FILES {
            let config_path = dir.join(file_name);
            if config_path.is_file() {
                return Ok(Some(config_path));
            }
        }
    }

    Ok(None)
}

/// Find the closest directory at or above `start` that contains `marker`.
///
/// `start` may be a file, in which case the search begins at its directory.
/// Relative paths are resolved against the working directory first, and the
/// returned root is absolute. Returns `None` when the filesystem root is
/// reached without a match.
#[must_use]
pub fn find_project_root(start: &Path, marker: &str) -> Option<PathBuf> {
    let start = std::path::absolute(start).ok()?;
    let start_dir = if start.is_file() {
        start.parent()?
    } else {
        start.as_path()
    };

    let root = start_dir
        .ancestors()
        .find(|dir| dir.join(marker).exists())
        .map(Path::to_path_buf);

    if root.is_none() {
        tracing::debug!(?start, marker, "No project root found");
    }

    root
}

/// Load a config from the specified path.
/// Automatically detects the format based on file extension.
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents, path)
}

/// Load a config from a string.
/// The path is used for error messages and format detection.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<ProjectConfig> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    let file_name = path.file_name().and_then(|name| name.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        // .graphqlrc without extension - try YAML first, then JSON
        "" if file_name == ".graphqlrc" => {
            parse_yaml(contents, path).or_else(|_| parse_json(contents, path))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;

    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<ProjectConfig> {
    serde_yaml::from_str(contents).map_err(|e| invalid(path, format!("YAML parse error: {e}")))
}

fn parse_json(contents: &str, path: &Path) -> Result<ProjectConfig> {
    serde_json::from_str(contents).map_err(|e| invalid(path, format!("JSON parse error: {e}")))
}

fn invalid(path: &Path, message: String) -> ConfigError {
    ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    }
}

fn validate_config(config: &ProjectConfig, path: &Path) -> Result<()> {
    let schema_paths = config.schema.paths();
    if schema_paths.is_empty() {
        return Err(invalid(path, "Empty schema configuration".to_string()));
    }
    if schema_paths.iter().any(|p| p.trim().is_empty()) {
        return Err(invalid(path, "Empty schema path".to_string()));
    }

    if let Some(ref documents) = config.documents {
        let patterns = documents.patterns();
        if patterns.is_empty() || patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid(path, "Empty document pattern".to_string()));
        }
    }

    let extract = &config.extract;
    if extract.tags.is_empty() {
        return Err(invalid(path, "At least one extract tag is required".to_string()));
    }
    if let Some(tag) = extract
        .tags
        .iter()
        .find(|tag| tag.is_empty() || !tag.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.'))
    {
        return Err(invalid(path, format!("Invalid extract tag '{tag}'")));
    }
    if extract.cache_capacity == 0 {
        return Err(invalid(path, "Cache capacity must be at least 1".to_string()));
    }

    let analysis = &config.analysis;
    if analysis.command.trim().is_empty() {
        return Err(invalid(path, "Empty analysis command".to_string()));
    }
    if analysis.timeout_ms == 0 {
        return Err(invalid(path, "Analysis timeout must be positive".to_string()));
    }

    Ok(())
}
