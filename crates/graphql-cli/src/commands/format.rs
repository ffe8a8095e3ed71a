use super::{project_config, HostFile};
use anyhow::{Context, Result};
use colored::Colorize;
use graphql_context::parse_document;
use graphql_extract::{restore_indentation, ExtractConfig, SourceCache};
use std::fs;
use std::path::Path;

/// Reprint every embedded GraphQL region of `file`
pub fn run(config_path: Option<&Path>, file: &Path, write: bool) -> Result<()> {
    let host = HostFile::read(file)?;
    let settings = project_config(config_path, file)?
        .map(|(_, config)| config.extract)
        .unwrap_or_default();
    let config = ExtractConfig {
        tags: settings.tags,
    };
    let mut cache =
        SourceCache::new(host.language, &config).context("Invalid extract settings")?;

    // A one-shot pass over text that is about to change; skip the cache
    let fragments = cache.extract(&host.text, false);

    let mut formatted = host.text.clone();
    let mut skipped = 0;
    for fragment in fragments.iter().rev() {
        let document = match parse_document(&fragment.content) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(module = fragment.module_label(), error = %e, "Skipping unparsable GraphQL");
                skipped += 1;
                continue;
            }
        };

        let printed = document.serialize().to_string();
        let replacement = restore_indentation(&fragment.content, &printed);
        formatted.replace_range(
            fragment.location.offset..fragment.location.end_offset(),
            &replacement,
        );
    }

    if write {
        if formatted != host.text {
            fs::write(&host.path, &formatted)
                .with_context(|| format!("Failed to write {}", host.path.display()))?;
        }
        println!(
            "{}",
            format!("✓ Formatted {} region(s)", fragments.len() - skipped).green()
        );
    } else {
        print!("{formatted}");
    }

    if skipped > 0 {
        eprintln!(
            "{}",
            format!("⚠ {skipped} region(s) could not be parsed and were left as they were").yellow()
        );
    }

    Ok(())
}
