use proptrans::{FilePair, Side};
use serde_json::json;

use crate::view::warning_summary;

pub fn print_stats(pair: &FilePair, json_output: bool) -> Result<(), String> {
    let stats = pair.stats();
    let percent = (stats.completion_percent() * 100.0).round() / 100.0;

    if json_output {
        let body = json!({
            "source": pair.source_path().display().to_string(),
            "destination": pair.destination_path().display().to_string(),
            "counts": stats,
            "completion_percent": percent,
            "duplicate_keys": {
                "source": pair.duplicate_keys(Side::Source),
                "destination": pair.duplicate_keys(Side::Destination),
            },
            "parse_warnings": {
                "source": pair.parse_warnings(Side::Source).len(),
                "destination": pair.parse_warnings(Side::Destination).len(),
            },
        });
        let text = serde_json::to_string_pretty(&body)
            .map_err(|e| format!("Error serializing stats: {}", e))?;
        println!("{}", text);
        return Ok(());
    }

    println!("=== Stats ===");
    println!("Source: {}", pair.source_path().display());
    println!("Destination: {}", pair.destination_path().display());
    println!("Rows: {}", stats.rows);
    println!("  Comments: {}", stats.comment_rows);
    println!("  Keys: {}", stats.key_rows);
    for (label, count) in [
        ("translated", stats.translated),
        ("untranslated", stats.untranslated),
        ("source_missing", stats.source_missing),
        ("destination_only", stats.destination_only),
        ("not_localized", stats.not_localized),
    ] {
        println!("    {}: {}", label, count);
    }
    println!("Completion: {:.2}%", percent);
    for side in [Side::Source, Side::Destination] {
        let duplicates = pair.duplicate_keys(side);
        if !duplicates.is_empty() {
            println!("Duplicate keys in {}: {}", side, duplicates.join(", "));
        }
    }
    if let Some(summary) = warning_summary(pair) {
        println!("{}", summary);
    }
    Ok(())
}
