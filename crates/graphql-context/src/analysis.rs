use crate::{
    parse_document, resolve_from_hover_text, resolve_record, ContextError, GraphQLRecordContext,
    HoverRecord, Result,
};
use apollo_compiler::ast;
use apollo_compiler::Schema;
use graphql_config::{find_project_root, AnalysisSettings};
use graphql_extract::{Position, Range, SourceCache, SourceFragment};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Requests understood by the analysis tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisCommand {
    Hover,
    TypeDefinition,
}

impl AnalysisCommand {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hover => "hover",
            Self::TypeDefinition => "typeDefinition",
        }
    }
}

/// Location returned for a `typeDefinition` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDefinition {
    pub uri: String,
    pub range: Range,
}

#[derive(Debug, Deserialize)]
struct HoverResponse {
    contents: HoverContents,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HoverContents {
    Markup { value: String },
    Plain(String),
}

#[derive(Debug, Deserialize)]
struct LocationResponse {
    uri: String,
    range: RangeResponse,
}

#[derive(Debug, Deserialize)]
struct RangeResponse {
    start: PositionResponse,
    end: PositionResponse,
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    line: usize,
    character: usize,
}

impl From<PositionResponse> for Position {
    fn from(position: PositionResponse) -> Self {
        Self::new(position.line, position.character)
    }
}

/// Runs the external analysis tool that answers hover and type definition
/// requests for host documents.
///
/// The tool is started as `<command> <request> <file> <line> <character>`
/// in the closest directory above `file` holding the project marker, and
/// must print one JSON document.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    command: String,
    timeout: Duration,
    project_marker: String,
}

impl AnalysisClient {
    #[must_use]
    pub fn new(settings: &AnalysisSettings) -> Self {
        Self {
            command: settings.command.clone(),
            timeout: settings.timeout(),
            project_marker: settings.project_marker.clone(),
        }
    }

    /// Run `request` for `position` in `file`.
    ///
    /// `file` may be relative to the working directory. `None` when it is
    /// not inside a project.
    pub async fn run(
        &self,
        request: AnalysisCommand,
        file: &Path,
        position: Position,
    ) -> Result<Option<serde_json::Value>> {
        // The tool runs in the project root, so relative paths would not
        // resolve there
        let file = std::path::absolute(file)?;
        let Some(root) = find_project_root(&file, &self.project_marker) else {
            return Ok(None);
        };

        let mut command = Command::new(&self.command);
        command
            .arg(request.as_str())
            .arg(&file)
            .arg(position.line.to_string())
            .arg(position.character.to_string())
            .current_dir(&root)
            .kill_on_drop(true);

        tracing::debug!(
            command = %self.command,
            request = request.as_str(),
            file = %file.display(),
            root = %root.display(),
            "Running analysis command"
        );

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| {
                tracing::warn!(command = %self.command, timeout = ?self.timeout, "Analysis command timed out");
                ContextError::AnalysisTimeout(self.timeout)
            })??;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(command = %self.command, status = %output.status, "Analysis command failed");
            return Err(ContextError::Analysis(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        Ok(Some(serde_json::from_slice(&output.stdout)?))
    }

    /// Hover text for `position` in `file`
    pub async fn hover(&self, file: &Path, position: Position) -> Result<Option<String>> {
        let Some(value) = self.run(AnalysisCommand::Hover, file, position).await? else {
            return Ok(None);
        };

        let response: Option<HoverResponse> = serde_json::from_value(value)?;
        Ok(response.map(|response| match response.contents {
            HoverContents::Markup { value } | HoverContents::Plain(value) => value,
        }))
    }

    /// Definition location of the type at `position` in `file`
    pub async fn type_definition(
        &self,
        file: &Path,
        position: Position,
    ) -> Result<Option<TypeDefinition>> {
        let Some(value) = self
            .run(AnalysisCommand::TypeDefinition, file, position)
            .await?
        else {
            return Ok(None);
        };

        let response: Option<LocationResponse> = serde_json::from_value(value)?;
        Ok(response.map(|location| TypeDefinition {
            uri: location.uri,
            range: Range::new(location.range.start.into(), location.range.end.into()),
        }))
    }
}

/// A record named by hover text, resolved inside the host document
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRecord {
    pub record: HoverRecord,
    /// Embedded GraphQL the record belongs to
    pub fragment: SourceFragment,
    /// Resolution inside `fragment`, in fragment-local coordinates
    pub context: GraphQLRecordContext,
}

impl ResolvedRecord {
    /// Span of the record's node in host document coordinates
    #[must_use]
    pub fn host_range(&self) -> Option<Range> {
        Some(Range::new(
            self.fragment.to_host_position(self.context.start?),
            self.fragment.to_host_position(self.context.end?),
        ))
    }
}

/// Resolve the generated record type under `position` in `file`.
///
/// Hover text from the analysis tool names a fragment and a record path;
/// the fragment is looked up among the GraphQL embedded in `text` and the
/// record path resolved in it.
pub async fn record_context_at(
    client: &AnalysisClient,
    cache: &mut SourceCache,
    file: &Path,
    text: &str,
    position: Position,
    schema: &Schema,
) -> Result<Option<ResolvedRecord>> {
    let Some(hover_text) = client.hover(file, position).await? else {
        return Ok(None);
    };
    let Some(record) = resolve_from_hover_text(&hover_text) else {
        tracing::debug!("Hover text names no generated record type");
        return Ok(None);
    };

    let fragments = cache.get(text);
    let Some(fragment) = find_definition_source(&fragments, &record.fragment_name) else {
        tracing::debug!(name = %record.fragment_name, "No embedded definition with that name");
        return Ok(None);
    };

    let Some(context) = resolve_record(&fragment.content, &record.record_name, schema)? else {
        return Ok(None);
    };

    Ok(Some(ResolvedRecord {
        record,
        fragment: fragment.clone(),
        context,
    }))
}

/// The embedded GraphQL defining an operation or fragment called `name`.
///
/// Fragments that fail to parse are skipped.
#[must_use]
pub fn find_definition_source<'a>(
    fragments: &'a [SourceFragment],
    name: &str,
) -> Option<&'a SourceFragment> {
    fragments.iter().find(|fragment| {
        let Ok(document) = parse_document(&fragment.content) else {
            return false;
        };
        document.definitions.iter().any(|definition| match definition {
            ast::Definition::FragmentDefinition(definition) => definition.name.as_str() == name,
            ast::Definition::OperationDefinition(definition) => definition
                .name
                .as_ref()
                .is_some_and(|operation| operation.as_str() == name),
            _ => false,
        })
    })
}
