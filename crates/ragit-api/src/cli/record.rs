//! Record commands: add, delete, get-ids, get-texts.

use std::collections::BTreeMap;

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::cli::collection::spinner;
use crate::state::AppState;

/// Add a single record.
pub async fn add_record(
    state: &AppState,
    collection: &str,
    id: &str,
    text: &str,
    json: bool,
) -> Result<()> {
    let spinner = spinner(format!("Adding '{id}'..."));
    let result = state.manager.add_single_row(id, text, collection).await;
    spinner.finish_and_clear();
    result?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "added": true,
                "collection": collection,
                "id": id,
            }))?
        );
        return Ok(());
    }

    println!(
        "  {} Added '{}' to '{}'",
        style("✓").green().bold(),
        style(id).bold(),
        style(collection).cyan()
    );
    Ok(())
}

/// Delete a record by ID.
pub async fn delete_record(state: &AppState, collection: &str, id: &str, json: bool) -> Result<()> {
    state.manager.delete_entry_by_id(id, collection).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "deleted": true,
                "collection": collection,
                "id": id,
            }))?
        );
        return Ok(());
    }

    println!(
        "  {} Deleted '{}' from '{}'",
        style("✓").green().bold(),
        style(id).bold(),
        style(collection).cyan()
    );
    Ok(())
}

/// Fetch records by ID.
pub async fn get_by_ids(
    state: &AppState,
    collection: &str,
    ids: &[String],
    json: bool,
) -> Result<()> {
    let found = state.manager.get_by_ids(ids, collection).await?;
    print_records(&found, ids.len(), json)
}

/// Fetch records by exact text.
pub async fn get_by_texts(
    state: &AppState,
    collection: &str,
    texts: &[String],
    json: bool,
) -> Result<()> {
    let found = state.manager.get_by_texts(texts, collection).await?;
    print_records(&found, texts.len(), json)
}

fn print_records(found: &BTreeMap<String, String>, requested: usize, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(found)?);
        return Ok(());
    }

    if found.is_empty() {
        println!();
        println!("  {} No matching records.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Text").fg(Color::White),
    ]);
    for (id, text) in found {
        table.add_row(vec![Cell::new(id).fg(Color::Cyan), Cell::new(text)]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} of {} found",
        style(found.len()).bold(),
        requested
    );
    println!();
    Ok(())
}
