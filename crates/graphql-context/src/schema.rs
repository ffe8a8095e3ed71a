use crate::{ContextError, Result};
use apollo_compiler::Schema;
use dashmap::DashMap;
use graphql_config::{find_config, load_config, ProjectConfig, SchemaConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Schema loader for the files named by a project configuration
pub struct SchemaLoader {
    config: SchemaConfig,
    base_path: Option<PathBuf>,
}

impl SchemaLoader {
    #[must_use]
    pub const fn new(config: SchemaConfig) -> Self {
        Self {
            config,
            base_path: None,
        }
    }

    /// Resolve relative patterns against `path`
    #[must_use]
    pub fn with_base_path(mut self, path: impl AsRef<Path>) -> Self {
        self.base_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Parse every configured schema file into one schema
    pub fn load(&self) -> Result<Schema> {
        let sources = self.load_sources()?;

        let mut builder = Schema::builder();
        for (path, source) in sources {
            builder = builder.parse(source, path);
        }

        builder
            .build()
            .map_err(|invalid| ContextError::SchemaParse(invalid.errors.to_string()))
    }

    /// Contents of every configured schema file, in pattern order
    pub fn load_sources(&self) -> Result<Vec<(PathBuf, String)>> {
        let mut sources = Vec::new();
        for pattern in self.config.paths() {
            sources.extend(self.load_local(pattern)?);
        }

        if sources.is_empty() {
            return Err(ContextError::SchemaLoad(
                "No schema files found".to_string(),
            ));
        }

        Ok(sources)
    }

    /// Load schema from local file(s), supporting glob patterns
    fn load_local(&self, pattern: &str) -> Result<Vec<(PathBuf, String)>> {
        let pattern = self.base_path.as_ref().map_or_else(
            || pattern.to_string(),
            |base| base.join(pattern).display().to_string(),
        );

        let paths = glob::glob(&pattern).map_err(|e| {
            ContextError::SchemaLoad(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        let mut schemas = Vec::new();
        for entry in paths {
            let path = entry.map_err(|e| ContextError::SchemaLoad(format!("Glob error: {e}")))?;
            let content = std::fs::read_to_string(&path)?;
            tracing::debug!(path = %path.display(), "Loaded schema file");
            schemas.push((path, content));
        }

        if schemas.is_empty() {
            return Err(ContextError::SchemaLoad(format!(
                "No files matched pattern: {pattern}"
            )));
        }

        Ok(schemas)
    }
}

/// A loaded project: its configuration and parsed schema
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: ProjectConfig,
    pub schema: Arc<Schema>,
}

/// Loaded workspaces keyed by workspace root.
///
/// Entries are created on first use and live until [`SchemaCache::invalidate`]
/// or [`SchemaCache::remove`] drops them.
#[derive(Debug, Default)]
pub struct SchemaCache {
    workspaces: DashMap<PathBuf, Arc<Workspace>>,
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The workspace rooted at `root`, loading its config and schema on
    /// first use
    pub fn get_or_load(&self, root: &Path) -> Result<Arc<Workspace>> {
        if let Some(workspace) = self.workspaces.get(root) {
            return Ok(Arc::clone(&*workspace));
        }

        let config_path = find_config(root)?
            .ok_or_else(|| ContextError::ProjectNotFound(root.display().to_string()))?;
        let config = load_config(&config_path)?;
        let base_path = config_path.parent().unwrap_or(root);
        let schema = SchemaLoader::new(config.schema.clone())
            .with_base_path(base_path)
            .load()?;

        tracing::info!(root = %root.display(), config = %config_path.display(), "Loaded workspace");

        let workspace = Arc::new(Workspace {
            root: root.to_path_buf(),
            config_path,
            config,
            schema: Arc::new(schema),
        });
        self.workspaces
            .insert(root.to_path_buf(), Arc::clone(&workspace));

        Ok(workspace)
    }

    /// Drop every workspace loaded from `config_path`, returning how many
    /// were dropped
    pub fn invalidate(&self, config_path: &Path) -> usize {
        let before = self.workspaces.len();
        self.workspaces
            .retain(|_, workspace| workspace.config_path != config_path);
        let dropped = before - self.workspaces.len();
        if dropped > 0 {
            tracing::debug!(config = %config_path.display(), dropped, "Invalidated workspaces");
        }
        dropped
    }

    /// Forget the workspace rooted at `root`
    pub fn remove(&self, root: &Path) -> bool {
        self.workspaces.remove(root).is_some()
    }

    #[must_use]
    pub fn contains(&self, root: &Path) -> bool {
        self.workspaces.contains_key(root)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.workspaces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.workspaces.is_empty()
    }
}
