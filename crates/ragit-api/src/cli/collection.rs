//! Collection commands: create, add-csv, drop, info, list.

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

use ragit_types::collection::{CollectionInfo, CollectionMetadata, DESCRIPTION_KEY, METRIC_KEY};
use ragit_types::metric::DistanceMetric;

use crate::state::AppState;

/// Spinner shown while the embedder and store work.
pub(crate) fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Build caller metadata from `--description` and `--meta` flags.
///
/// Returns `None` when neither was given so the defaults apply untouched.
pub fn build_metadata(
    description: Option<String>,
    extras: Vec<(String, String)>,
) -> Option<CollectionMetadata> {
    if description.is_none() && extras.is_empty() {
        return None;
    }

    let mut metadata = CollectionMetadata::new();
    for (key, raw) in extras {
        let value = serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw));
        metadata.insert(key, value);
    }
    if let Some(description) = description {
        metadata.insert(
            DESCRIPTION_KEY.to_string(),
            serde_json::Value::String(description),
        );
    }
    Some(metadata)
}

/// Create a collection from a CSV file.
pub async fn create_collection(
    state: &AppState,
    csv: &Path,
    collection: &str,
    metric: Option<DistanceMetric>,
    metadata: Option<CollectionMetadata>,
    json: bool,
) -> Result<()> {
    let metric = metric.unwrap_or(state.config.default_metric);

    let spinner = spinner(format!("Creating collection '{collection}'..."));
    let result = state
        .manager
        .create_database(csv, collection, metric, metadata)
        .await;
    spinner.finish_and_clear();
    let info = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Created collection '{}' with {} records",
        style("✓").green().bold(),
        style(&info.name).cyan().bold(),
        style(info.count).bold()
    );
    println!();
    Ok(())
}

/// Add new rows from a CSV file to an existing collection.
pub async fn add_csv(state: &AppState, csv: &Path, collection: &str, json: bool) -> Result<()> {
    let spinner = spinner(format!("Adding rows from {}...", csv.display()));
    let result = state.manager.add_values_from_csv(csv, collection).await;
    spinner.finish_and_clear();
    let stats = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Added {} new entries to '{}'",
        style("✓").green().bold(),
        style(stats.new_entries_added).bold(),
        style(collection).cyan()
    );
    println!(
        "    {} total in file, {} skipped as existing",
        stats.total_entries,
        style(stats.skipped_entries).dim()
    );
    println!();
    Ok(())
}

/// Delete a whole collection after confirmation.
///
/// `confirm` is passed through verbatim; without it the user is prompted.
pub async fn drop_collection(
    state: &AppState,
    collection: &str,
    confirm: Option<String>,
    json: bool,
) -> Result<()> {
    let confirmation = match confirm {
        Some(word) => word,
        None => {
            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Permanently delete collection '{}' and all its records?",
                    style(collection).red().bold()
                ))
                .default(false)
                .interact()?;
            let word = if confirmed { "yes" } else { "no" };
            word.to_string()
        }
    };

    state
        .manager
        .delete_collection(collection, &confirmation)
        .await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "deleted": true,
                "collection": collection,
            }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} Deleted collection '{}'",
        style("✓").green().bold(),
        style(collection).cyan()
    );
    println!();
    Ok(())
}

/// Show record count and metadata of a collection.
pub async fn show_info(state: &AppState, collection: &str, json: bool) -> Result<()> {
    let info = state.manager.get_collection_info(collection).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    print_info(&info);
    Ok(())
}

fn print_info(info: &CollectionInfo) {
    println!();
    println!("  {}", style(&info.name).cyan().bold());
    println!("  {} records", style(info.count).bold());
    println!();

    if info.metadata.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Value").fg(Color::White),
    ]);

    for (key, value) in &info.metadata {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        table.add_row(vec![Cell::new(key).fg(Color::Cyan), Cell::new(value)]);
    }

    println!("{table}");
    println!();
}

/// List every collection with its record count.
pub async fn list_collections(state: &AppState, json: bool) -> Result<()> {
    let names = state.manager.list_collections().await?;

    let mut infos = Vec::with_capacity(names.len());
    for name in &names {
        infos.push(state.manager.get_collection_info(name).await?);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&infos)?);
        return Ok(());
    }

    if infos.is_empty() {
        println!();
        println!(
            "  {} No collections in {}. Create one with: {}",
            style("i").blue().bold(),
            style(state.data_dir.display()).dim(),
            style("ragit create <csv> <name>").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Records").fg(Color::White),
        Cell::new("Metric").fg(Color::White),
        Cell::new("Description").fg(Color::White),
    ]);

    for info in &infos {
        let metric = info
            .metadata
            .get(METRIC_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or("-");
        let description = info
            .metadata
            .get(DESCRIPTION_KEY)
            .and_then(|v| v.as_str())
            .unwrap_or("");

        table.add_row(vec![
            Cell::new(&info.name).fg(Color::Cyan),
            Cell::new(info.count),
            Cell::new(metric).fg(Color::Yellow),
            Cell::new(description),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} collection{}",
        style(infos.len()).bold(),
        if infos.len() == 1 { "" } else { "s" }
    );
    println!();
    Ok(())
}
