//! Archive listing presentation.

use crate::archive::key::day_of;
use crate::archive::Item;
use crate::cli::presentation::to_pretty_json;
use crate::error::ApiError;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

const HEADLINE_COLUMN_CHARS: usize = 60;

pub fn format_archive_list_text(items: &[Item], total: usize) -> String {
    if items.is_empty() {
        return "Archive is empty.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Date", "Subject", "Headline", "Tags", "Image"]);
    for item in items {
        let headline: String = item.headline.chars().take(HEADLINE_COLUMN_CHARS).collect();
        let image = item.image.as_deref().unwrap_or("-");
        table.add_row(vec![
            day_of(&item.created_at).to_string(),
            item.subject.clone(),
            headline,
            item.tags.join(", "),
            image.to_string(),
        ]);
    }
    format!("{}\n\nShowing {} of {} item(s)", table, items.len(), total)
}

pub fn format_archive_list_json(items: &[Item], total: usize) -> Result<String, ApiError> {
    to_pretty_json(&serde_json::json!({ "items": items, "total": total }))
}
