use crate::{ExtractError, Language, LineIndex, Position, Range, Result, SourceLocation};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Label given to fragments with no module declaration nearby
pub const UNKNOWN_MODULE: &str = "unknown";

static MODULE_DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"module\s+(\w+)\s*=").expect("module declaration pattern is valid"));

/// Configuration for GraphQL extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractConfig {
    /// Tag identifiers to extract (default: ["relay"])
    /// Matches: %relay(`fragment X on User { ... }`)
    pub tags: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            tags: vec!["relay".to_string()],
        }
    }
}

/// A GraphQL region found inside a host document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFragment {
    /// The embedded GraphQL text, exactly as written between the markers
    pub content: String,

    /// Module the fragment is bound to, when a declaration was found
    pub module_name: Option<String>,

    /// Location of `content` in the host document
    pub location: SourceLocation,
}

impl SourceFragment {
    #[must_use]
    pub const fn start(&self) -> Position {
        self.location.range.start
    }

    #[must_use]
    pub const fn end(&self) -> Position {
        self.location.range.end
    }

    /// The module label, or [`UNKNOWN_MODULE`]
    #[must_use]
    pub fn module_label(&self) -> &str {
        self.module_name.as_deref().unwrap_or(UNKNOWN_MODULE)
    }

    /// Translate a position inside `content` to host document coordinates
    #[must_use]
    pub const fn to_host_position(&self, local: Position) -> Position {
        let start = self.start();
        if local.line == 0 {
            Position::new(start.line, start.character + local.character)
        } else {
            Position::new(start.line + local.line, local.character)
        }
    }

    /// Translate a host position to coordinates inside `content`
    ///
    /// Returns `None` for positions before the fragment starts.
    #[must_use]
    pub const fn to_local_position(&self, host: Position) -> Option<Position> {
        let start = self.start();
        if host.line < start.line {
            return None;
        }
        if host.line == start.line {
            if host.character < start.character {
                return None;
            }
            return Some(Position::new(0, host.character - start.character));
        }
        Some(Position::new(host.line - start.line, host.character))
    }
}

/// Scans host documents of one language for GraphQL regions
#[derive(Debug, Clone)]
pub struct Extractor {
    language: Language,
    opening: Regex,
}

impl Extractor {
    pub fn new(language: Language, config: &ExtractConfig) -> Result<Self> {
        if config.tags.is_empty() {
            return Err(ExtractError::NoTags);
        }

        let alternatives = config
            .tags
            .iter()
            .map(|tag| regex::escape(tag))
            .collect::<Vec<_>>()
            .join("|");
        let opening = Regex::new(&format!(r"%(?:{alternatives})\(\s*`"))?;

        Ok(Self { language, opening })
    }

    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Extract every GraphQL region, in order of appearance
    #[must_use]
    pub fn extract(&self, source: &str) -> Vec<SourceFragment> {
        let index = LineIndex::new(source);

        if !self.language.is_embedded() {
            return vec![SourceFragment {
                content: source.to_string(),
                module_name: None,
                location: SourceLocation::new(
                    0,
                    source.len(),
                    Range::new(Position::new(0, 0), index.offset_to_position(source.len())),
                ),
            }];
        }

        let mut fragments = Vec::new();
        let mut cursor = 0;

        while let Some(opening) = self.opening.find_at(source, cursor) {
            let content_start = opening.end();
            let Some(content_end) = find_closing_backtick(source, content_start) else {
                tracing::debug!(offset = opening.start(), "Unterminated GraphQL tag");
                break;
            };

            let marker_line = index.offset_to_position(opening.start()).line;
            fragments.push(SourceFragment {
                content: source[content_start..content_end].to_string(),
                module_name: find_module_name(source, &index, marker_line),
                location: SourceLocation::new(
                    content_start,
                    content_end - content_start,
                    Range::new(
                        index.offset_to_position(content_start),
                        index.offset_to_position(content_end),
                    ),
                ),
            });

            cursor = content_end + 1;
        }

        fragments
    }
}

/// Extract GraphQL from a file
pub fn extract_from_file(path: &Path, config: &ExtractConfig) -> Result<Vec<SourceFragment>> {
    let language = Language::from_path(path)
        .ok_or_else(|| ExtractError::UnsupportedFileType(path.to_path_buf()))?;

    let source = fs::read_to_string(path)?;
    extract_from_source(&source, language, config)
}

/// Extract GraphQL from source code string
pub fn extract_from_source(
    source: &str,
    language: Language,
    config: &ExtractConfig,
) -> Result<Vec<SourceFragment>> {
    Ok(Extractor::new(language, config)?.extract(source))
}

/// Byte offset of the first backtick at or after `from` that is not escaped
fn find_closing_backtick(source: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut idx = from;

    while idx < bytes.len() {
        match bytes[idx] {
            b'\\' => idx += 2,
            b'`' => return Some(idx),
            _ => idx += 1,
        }
    }

    None
}

/// Module name declared on `line`, falling back to the line above it
fn find_module_name(source: &str, index: &LineIndex, line: usize) -> Option<String> {
    let candidates = std::iter::once(line).chain(line.checked_sub(1));

    candidates
        .filter_map(|line| index.line_range(line))
        .find_map(|range| {
            MODULE_DECLARATION
                .captures(&source[range])
                .and_then(|captures| captures.get(1))
                .map(|name| name.as_str().to_string())
        })
}
