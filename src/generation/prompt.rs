//! Prompt rendering.

use crate::config::SUBJECT_PLACEHOLDER;

/// Number of item tags used as image theme hints.
pub const IMAGE_HINT_TAGS: usize = 3;

/// Substitute the subject into the text template.
pub fn render_text_prompt(template: &str, subject: &str) -> String {
    template.replace(SUBJECT_PLACEHOLDER, subject)
}

/// Image prompt: the style followed by up to three tags as theme hints, or
/// the fallback hint when the item has none.
pub fn render_image_prompt(style: &str, tags: &[String], fallback_hint: &str) -> String {
    let hints = if tags.is_empty() {
        fallback_hint.to_string()
    } else {
        tags.iter()
            .take(IMAGE_HINT_TAGS)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    };
    format!("{}. subtle theme hints: {}.", style, hints)
}
