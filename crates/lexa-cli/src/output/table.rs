//! Table formatting utilities for CLI output.

use comfy_table::{presets, ContentArrangement, Table};
use serde::Serialize;

/// One translatable key of a catalog.
#[derive(Debug, Serialize)]
pub struct KeyRow {
    /// Dotted key.
    pub key: String,
    /// `leaf` or `conditional`.
    pub kind: &'static str,
    /// Number of conditional arms; 0 for leaves.
    pub arms: usize,
    /// Placeholder names referenced by the key's templates.
    pub placeholders: Vec<String>,
}

/// Format key rows as an ASCII table.
pub fn format_keys_table(rows: &[KeyRow]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_BORDERS_ONLY);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Key", "Kind", "Arms", "Placeholders"]);

    for row in rows {
        table.add_row(vec![
            row.key.clone(),
            row.kind.to_string(),
            row.arms.to_string(),
            row.placeholders.join(", "),
        ]);
    }

    table
}
