//! Subcommand handlers. Each returns the text to print on stdout.

use crate::config::OutputFormat;
use crate::datafile::{read_data_file, write_data_file};
use crate::error::Result;
use crate::model::ImplementorList;
use crate::page::{InstallPoint, load_page};
use crate::registry::Registry;
use crate::render::{HtmlRenderer, render_html, render_text};
use crate::site::{Site, TraitPath};
use crate::types::Payload;
use anyhow::{Context, bail};
use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

/// List traits with implementor data across the site.
pub fn handle_traits(site: &Site) -> Result<String> {
    let traits = site.traits()?;
    if traits.is_empty() {
        return Ok(format!(
            "No implementor data found under: {}\n",
            display_roots(site)
        ));
    }

    let mut output = format!("Traits with implementors ({}):\n", traits.len());
    for trait_path in traits {
        let _ = writeln!(output, "  • {}", trait_path);
    }
    Ok(output)
}

/// Load a trait's page through `registry` and render the resulting list.
pub async fn handle_list(
    site: &Site,
    registry: &Registry,
    trait_path: &TraitPath,
    install: InstallPoint,
    format: OutputFormat,
) -> Result<String> {
    let files = site.scan_data_files(trait_path).await?;
    if files.is_empty() {
        bail!(
            "No implementor data for {} under: {}",
            trait_path,
            display_roots(site)
        );
    }

    let registrar = Arc::new(ImplementorList::new(HtmlRenderer::new()));
    let report = load_page(registry, registrar.clone(), files, install).await;

    let model = registrar.snapshot();
    let mut output = match format {
        OutputFormat::Text => render_text(&trait_path.to_string(), &model),
        OutputFormat::Html => render_html(&model),
    };

    if !report.failed.is_empty() && format == OutputFormat::Text {
        let _ = writeln!(output, "\n{} data file(s) could not be loaded:", report.failed.len());
        for (path, reason) in &report.failed {
            let _ = writeln!(output, "  • {}: {}", path.display(), reason);
        }
    }

    Ok(output)
}

/// Parse every data file. Returns the report and whether all files parsed.
pub async fn handle_check(site: &Site) -> Result<(String, bool)> {
    let files = site.scan_all_data_files().await?;
    let mut failures = Vec::new();
    let mut implementors = 0;

    for (trait_path, path) in &files {
        match read_data_file(path).await {
            Ok(payload) => {
                implementors += payload.iter().map(|(_, list)| list.len()).sum::<usize>();
            }
            Err(e) => {
                tracing::warn!(trait_path = %trait_path, path = %path.display(), "Invalid data file");
                failures.push(format!("  • {} ({}): {:#}", trait_path, path.display(), e));
            }
        }
    }

    let mut output = format!(
        "Checked {} data file(s), {} implementor(s)\n",
        files.len(),
        implementors
    );
    if failures.is_empty() {
        output.push_str("All data files parsed.\n");
    } else {
        let _ = writeln!(output, "{} failure(s):", failures.len());
        for failure in &failures {
            output.push_str(failure);
            output.push('\n');
        }
    }
    Ok((output, failures.is_empty()))
}

/// Write a data file from a JSON payload file.
pub async fn handle_emit(payload_path: &Path, output: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(payload_path)
        .await
        .with_context(|| format!("Failed to read payload {}", payload_path.display()))?;
    let payload: Payload = serde_json::from_str(&content)
        .with_context(|| format!("Invalid payload in {}", payload_path.display()))?;

    write_data_file(output, &payload).await?;

    Ok(format!(
        "Wrote {} crate(s) to {}\n",
        payload.len(),
        output.display()
    ))
}

fn display_roots(site: &Site) -> String {
    site.roots()
        .iter()
        .map(|r| r.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
