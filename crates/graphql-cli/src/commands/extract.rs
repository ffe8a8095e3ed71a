use super::{project_config, HostFile};
use crate::OutputFormat;
use anyhow::{Context, Result};
use colored::Colorize;
use graphql_config::DocumentsConfig;
use graphql_extract::{ExtractConfig, Extractor, Language, SourceFragment};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FragmentOutput<'a> {
    file: String,
    module: &'a str,
    start: [usize; 2],
    end: [usize; 2],
    content: &'a str,
}

pub fn run(config_path: Option<&Path>, path: &Path, format: OutputFormat) -> Result<()> {
    let project = project_config(config_path, path)?;
    let settings = project
        .as_ref()
        .map(|(_, config)| config.extract.clone())
        .unwrap_or_default();
    let config = ExtractConfig {
        tags: settings.tags,
    };
    // Document patterns are relative to the config file
    let documents = project.as_ref().and_then(|(config_path, config)| {
        Some((config_path.parent()?, config.documents.as_ref()?))
    });

    let mut outputs = Vec::new();
    for file in host_files(path, documents)? {
        let host = HostFile::read(&file)?;
        let fragments = extractor(host.language, &config)?.extract(&host.text);
        tracing::debug!(file = %file.display(), count = fragments.len(), "Extracted fragments");
        outputs.push((file, fragments));
    }

    match format {
        OutputFormat::Human => print_human(&outputs),
        OutputFormat::Json => print_json(&outputs)?,
    }

    Ok(())
}

fn extractor(language: Language, config: &ExtractConfig) -> Result<Extractor> {
    Extractor::new(language, config).context("Invalid extract settings")
}

/// `path` itself, or the supported files below it. A project's document
/// patterns, when present, choose which of them are scanned.
fn host_files(path: &Path, documents: Option<(&Path, &DocumentsConfig)>) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    match documents {
        Some((base_dir, documents)) => document_files(path, base_dir, documents),
        None => walk_files(path),
    }
}

fn walk_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.context("Failed to walk directory")?;
        if entry.file_type().is_file() && Language::from_path(entry.path()).is_some() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Files matched by `documents` (relative to `base_dir`) that lie under `dir`
fn document_files(dir: &Path, base_dir: &Path, documents: &DocumentsConfig) -> Result<Vec<PathBuf>> {
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", dir.display()))?;

    let mut files = BTreeSet::new();
    for pattern in documents.patterns() {
        let pattern = base_dir.join(pattern).display().to_string();
        let paths = glob::glob(&pattern)
            .with_context(|| format!("Invalid documents pattern '{pattern}'"))?;

        for entry in paths {
            let file = entry.context("Failed to read documents match")?;
            if !file.is_file() || Language::from_path(&file).is_none() {
                continue;
            }
            let file = file
                .canonicalize()
                .with_context(|| format!("Failed to resolve {}", file.display()))?;
            if file.starts_with(&dir) {
                files.insert(file);
            }
        }
    }

    tracing::debug!(count = files.len(), "Matched document files");
    Ok(files.into_iter().collect())
}

fn print_human(outputs: &[(PathBuf, Vec<SourceFragment>)]) {
    let mut total = 0;
    for (file, fragments) in outputs {
        if fragments.is_empty() {
            continue;
        }
        println!("{}", file.display().to_string().bold());
        for fragment in fragments {
            let start = fragment.start();
            let end = fragment.end();
            println!(
                "  {} {}",
                fragment.module_label().cyan(),
                format!(
                    "{}:{}-{}:{}",
                    start.line, start.character, end.line, end.character
                )
                .dimmed()
            );
            for line in fragment.content.trim().lines() {
                println!("    {line}");
            }
        }
        total += fragments.len();
    }

    println!(
        "\n{}",
        format!("✓ {total} GraphQL region(s) in {} file(s)", outputs.len()).green()
    );
}

fn print_json(outputs: &[(PathBuf, Vec<SourceFragment>)]) -> Result<()> {
    let fragments: Vec<_> = outputs
        .iter()
        .flat_map(|(file, fragments)| {
            fragments.iter().map(move |fragment| FragmentOutput {
                file: file.display().to_string(),
                module: fragment.module_label(),
                start: [fragment.start().line, fragment.start().character],
                end: [fragment.end().line, fragment.end().character],
                content: &fragment.content,
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&fragments)?);
    Ok(())
}
