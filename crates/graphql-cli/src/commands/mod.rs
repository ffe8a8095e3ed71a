pub mod context;
pub mod edit;
pub mod extract;
pub mod format;

use crate::Cursor;
use anyhow::{Context, Result};
use graphql_config::{find_config, load_config, ExtractSettings, ProjectConfig};
use graphql_context::{SchemaCache, SchemaLoader, Workspace};
use graphql_extract::{ExtractConfig, Language, Position, SourceCache, SourceFragment};
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A host file read from disk
pub struct HostFile {
    pub path: PathBuf,
    pub text: String,
    pub language: Language,
}

impl HostFile {
    pub fn read(path: &Path) -> Result<Self> {
        let language = Language::from_path(path)
            .with_context(|| format!("Unsupported file type: {}", path.display()))?;
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            text,
            language,
        })
    }

    /// The embedded GraphQL under `cursor`
    pub fn fragment_at(&self, cache: &mut SourceCache, cursor: Cursor) -> Result<SourceFragment> {
        cache
            .select_at(&self.text, cursor.position())
            .with_context(|| {
                format!(
                    "No embedded GraphQL at {}:{}",
                    self.path.display(),
                    cursor.line
                )
            })
    }
}

impl Cursor {
    pub const fn position(self) -> Position {
        Position::new(self.line, self.character)
    }
}

/// Directory the config search starts from for `path`
fn search_dir(path: &Path) -> Result<PathBuf> {
    let path = path
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", path.display()))?;
    if path.is_dir() {
        return Ok(path);
    }
    path.parent()
        .map(Path::to_path_buf)
        .context("Failed to get file directory")
}

/// The config given on the command line, or the closest one above `path`,
/// with the path it was loaded from
pub fn project_config(
    config_path: Option<&Path>,
    path: &Path,
) -> Result<Option<(PathBuf, ProjectConfig)>> {
    let config_path = match config_path {
        Some(config_path) => config_path.to_path_buf(),
        None => match find_config(&search_dir(path)?).context("Failed to search for config")? {
            Some(found) => found,
            None => return Ok(None),
        },
    };

    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    Ok(Some((config_path, config)))
}

/// Load the config and schema of the project `path` belongs to
pub fn load_workspace(config_path: Option<&Path>, path: &Path) -> Result<Arc<Workspace>> {
    let Some(config_path) = config_path else {
        let root = search_dir(path)?;
        return SchemaCache::new()
            .get_or_load(&root)
            .context("Failed to load project");
    };

    let config = load_config(config_path)
        .with_context(|| format!("Failed to load config {}", config_path.display()))?;
    let base_dir = config_path
        .parent()
        .context("Failed to get config directory")?
        .to_path_buf();
    let schema = SchemaLoader::new(config.schema.clone())
        .with_base_path(&base_dir)
        .load()
        .context("Failed to load schema")?;

    Ok(Arc::new(Workspace {
        root: base_dir,
        config_path: config_path.to_path_buf(),
        config,
        schema: Arc::new(schema),
    }))
}

/// Source cache configured from the project's extract settings
pub fn source_cache(language: Language, settings: &ExtractSettings) -> Result<SourceCache> {
    let config = ExtractConfig {
        tags: settings.tags.clone(),
    };
    let capacity = NonZeroUsize::new(settings.cache_capacity).unwrap_or(NonZeroUsize::MIN);
    SourceCache::with_capacity(language, &config, capacity).context("Invalid extract settings")
}

/// Host-coordinate span of a fragment-local range, as `line:char-line:char`
pub fn host_span(fragment: &SourceFragment, start: Position, end: Position) -> String {
    let start = fragment.to_host_position(start);
    let end = fragment.to_host_position(end);
    format!(
        "{}:{}-{}:{}",
        start.line, start.character, end.line, end.character
    )
}
