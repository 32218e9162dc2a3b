//! Similarity search command.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use ragit_types::record::NearbyText;

use crate::cli::collection::spinner;
use crate::state::AppState;

/// Longest text shown in the results table before truncation.
const MAX_TEXT_DISPLAY: usize = 60;

/// Search a collection for the records nearest to `query`.
pub async fn search(
    state: &AppState,
    collection: &str,
    query: &str,
    k: Option<usize>,
    contains: Option<&str>,
    json: bool,
) -> Result<()> {
    let k = k.unwrap_or(state.config.default_k);

    let spinner = spinner("Searching...");
    let result = state
        .manager
        .find_nearby_texts(query, collection, contains, k)
        .await;
    spinner.finish_and_clear();
    let results = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!();
        println!(
            "  {} No records matched '{}' in '{}'.",
            style("i").blue().bold(),
            style(query).dim(),
            style(collection).cyan(),
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Similarity").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Text").fg(Color::White),
        Cell::new("Distance").fg(Color::White),
    ]);

    for hit in &results {
        table.add_row(vec![
            Cell::new(format!("{:.2}%", hit.similarity)).fg(similarity_color(hit)),
            Cell::new(&hit.id).fg(Color::Cyan),
            Cell::new(truncate(&hit.text, MAX_TEXT_DISPLAY)),
            Cell::new(format!("{:.4}", hit.raw_distance)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!(
        "  Nearest to '{}' in '{}' ({})",
        style(query).white().bold(),
        style(collection).cyan().bold(),
        results[0].metric,
    );
    println!();
    println!("{table}");
    println!();
    println!(
        "  {} result{}",
        style(results.len()).bold(),
        if results.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

fn similarity_color(hit: &NearbyText) -> Color {
    if hit.similarity >= 70.0 {
        Color::Green
    } else if hit.similarity >= 40.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Shorten `text` to at most `max` characters, marking the cut with "...".
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragit_types::metric::DistanceMetric;

    fn hit(similarity: f64) -> NearbyText {
        NearbyText {
            id: "1".to_string(),
            text: "text".to_string(),
            similarity,
            raw_distance: 0.5,
            metric: DistanceMetric::Cosine,
        }
    }

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_is_char_safe() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_similarity_color_bands() {
        assert_eq!(similarity_color(&hit(95.0)), Color::Green);
        assert_eq!(similarity_color(&hit(50.0)), Color::Yellow);
        assert_eq!(similarity_color(&hit(0.0)), Color::Red);
    }
}
