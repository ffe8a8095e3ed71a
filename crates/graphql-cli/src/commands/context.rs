use super::{host_span, load_workspace, source_cache, HostFile};
use crate::{Cursor, OutputFormat};
use anyhow::{Context, Result};
use colored::Colorize;
use graphql_context::{record_context_at, resolve_record, AnalysisClient, GraphQLRecordContext};
use graphql_extract::SourceFragment;
use serde::Serialize;
use std::path::Path;
use std::process;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextOutput<'a> {
    record: &'a str,
    fragment: &'a str,
    #[serde(rename = "type")]
    type_name: &'a str,
    field_type: Option<&'a str>,
    description: Option<&'a str>,
    span: Option<String>,
}

/// Resolve `record` in the fragment under `cursor`
pub fn run(
    config_path: Option<&Path>,
    file: &Path,
    cursor: Cursor,
    record: &str,
    format: OutputFormat,
) -> Result<()> {
    let workspace = load_workspace(config_path, file)?;
    let host = HostFile::read(file)?;
    let mut cache = source_cache(host.language, &workspace.config.extract)?;
    let fragment = host.fragment_at(&mut cache, cursor)?;

    let context = resolve_record(&fragment.content, record, &workspace.schema)
        .context("Failed to parse embedded GraphQL")?;
    let Some(context) = context else {
        not_found(&format!("No node with record path '{record}'"), format);
    };

    print_context(record, &fragment, &context, format)
}

/// Resolve the record type the analysis tool reports under `cursor`
pub async fn hover(
    config_path: Option<&Path>,
    file: &Path,
    cursor: Cursor,
    format: OutputFormat,
) -> Result<()> {
    let workspace = load_workspace(config_path, file)?;
    let host = HostFile::read(file)?;
    let mut cache = source_cache(host.language, &workspace.config.extract)?;
    let client = AnalysisClient::new(&workspace.config.analysis);

    let resolved = record_context_at(
        &client,
        &mut cache,
        &host.path,
        &host.text,
        cursor.position(),
        &workspace.schema,
    )
    .await
    .context("Failed to resolve hover")?;
    let Some(resolved) = resolved else {
        not_found("No generated record type under the cursor", format);
    };

    print_context(
        &resolved.record.record_name,
        &resolved.fragment,
        &resolved.context,
        format,
    )
}

fn print_context(
    record: &str,
    fragment: &SourceFragment,
    context: &GraphQLRecordContext,
    format: OutputFormat,
) -> Result<()> {
    let span = context
        .start
        .zip(context.end)
        .map(|(start, end)| host_span(fragment, start, end));

    match format {
        OutputFormat::Human => {
            println!("{} {}", record.bold(), format!("({})", fragment.module_label()).dimmed());
            println!("  {} {}", "type:".cyan(), context.type_name());
            if let Some(field_type) = &context.field_type {
                println!("  {} {field_type}", "field type:".cyan());
            }
            if let Some(description) = &context.description {
                println!("  {} {description}", "description:".cyan());
            }
            if let Some(span) = &span {
                println!("  {} {span}", "span:".cyan());
            }
        }
        OutputFormat::Json => {
            let output = ContextOutput {
                record,
                fragment: fragment.module_label(),
                type_name: context.type_name(),
                field_type: context.field_type.as_deref(),
                description: context.description.as_deref(),
                span,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn not_found(message: &str, format: OutputFormat) -> ! {
    match format {
        OutputFormat::Human => eprintln!("{}", message.yellow()),
        OutputFormat::Json => println!("null"),
    }
    process::exit(1);
}
