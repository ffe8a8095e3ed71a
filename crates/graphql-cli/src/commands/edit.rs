use super::{load_workspace, source_cache, HostFile};
use crate::Cursor;
use anyhow::{bail, Context, Result};
use colored::Colorize;
use graphql_context::{
    add_field_at_position, add_pagination, ast, build_fragment_definition, extract_selection,
    find_record, parse_document, replace_with_spread, LineRange, Workspace,
};
use graphql_extract::{restore_indentation, SourceFragment};
use std::path::Path;
use std::sync::Arc;

/// The fragment under `cursor`, parsed
struct EditTarget {
    workspace: Arc<Workspace>,
    fragment: SourceFragment,
    document: ast::Document,
}

impl EditTarget {
    fn load(config_path: Option<&Path>, file: &Path, cursor: Cursor) -> Result<Self> {
        let workspace = load_workspace(config_path, file)?;
        let host = HostFile::read(file)?;
        let mut cache = source_cache(host.language, &workspace.config.extract)?;
        let fragment = host.fragment_at(&mut cache, cursor)?;
        let document =
            parse_document(&fragment.content).context("Failed to parse embedded GraphQL")?;

        Ok(Self {
            workspace,
            fragment,
            document,
        })
    }

    /// `document` printed in place of the original fragment text
    fn print(&self, document: &ast::Document) {
        let printed = document.serialize().to_string();
        println!("{}", restore_indentation(&self.fragment.content, &printed).trim_end());
    }
}

pub fn add_field(
    config_path: Option<&Path>,
    file: &Path,
    cursor: Cursor,
    record: &str,
    field: &str,
) -> Result<()> {
    let target = EditTarget::load(config_path, file, cursor)?;
    let schema = &target.workspace.schema;

    let Some(found) = find_record(&target.document, record, schema) else {
        bail!("No node with record path '{record}'");
    };
    let updated = add_field_at_position(&target.document, record, &found.ty, field, schema)
        .context("Failed to add field")?
        .with_context(|| format!("No node with record path '{record}'"))?;

    target.print(&updated);
    Ok(())
}

/// Print the new fragment followed by the rewritten source fragment
pub fn extract_fragment(
    config_path: Option<&Path>,
    file: &Path,
    cursor: Cursor,
    start_line: usize,
    end_line: usize,
    name: &str,
) -> Result<()> {
    let target = EditTarget::load(config_path, file, cursor)?;

    let range = LineRange::new(
        local_line(&target.fragment, start_line)?,
        local_line(&target.fragment, end_line)?,
    );
    let spec = extract_selection(
        &target.document,
        range,
        &target.workspace.schema,
        &target.fragment.content,
    )
    .with_context(|| format!("No selections to extract on lines {start_line}-{end_line}"))?;

    if !spec.unresolved_variables.is_empty() {
        eprintln!(
            "{}",
            format!(
                "⚠ Could not determine types for: {}",
                spec.unresolved_variables.join(", ")
            )
            .yellow()
        );
    }

    let definition = build_fragment_definition(&spec, name).context("Invalid fragment name")?;
    let rewritten =
        replace_with_spread(&target.document, &spec, name).context("Failed to rewrite fragment")?;

    println!("{}", definition.serialize());
    println!();
    target.print(&rewritten);
    Ok(())
}

pub fn paginate(
    config_path: Option<&Path>,
    file: &Path,
    cursor: Cursor,
    record: &str,
) -> Result<()> {
    let target = EditTarget::load(config_path, file, cursor)?;

    let updated = add_pagination(&target.document, record, &target.workspace.schema)
        .context("Failed to add pagination")?
        .with_context(|| format!("'{record}' is not a connection field of a fragment"))?;

    target.print(&updated);
    Ok(())
}

/// Host `line` as a line of the fragment's content
fn local_line(fragment: &SourceFragment, line: usize) -> Result<usize> {
    let start = fragment.start().line;
    if line < start {
        bail!("Line {line} is before the embedded GraphQL");
    }
    Ok(line - start)
}
