//! Archive item and per-subject generation outcome.

use crate::archive::key::derive_key;
use crate::error::GenerationError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One generated entry of the archive.
///
/// Serialized with camelCase keys. Archives written before the rename used
/// `name` and `date`; those are accepted on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(alias = "name")]
    pub subject: String,
    pub headline: String,
    pub content: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,
    /// ISO-8601 timestamp of the run that produced the item.
    #[serde(alias = "date")]
    pub created_at: String,
    /// Image path relative to the archive directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Item {
    /// Identity key used for deduplication.
    pub fn key(&self) -> String {
        derive_key(&self.subject, &self.created_at, &self.headline)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One position of the stored archive.
///
/// Entries that do not read as an [`Item`] are kept verbatim so that saving
/// the archive writes them back where they were.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ArchiveEntry {
    Item(Item),
    Unreadable(Value),
}

impl ArchiveEntry {
    /// Read a stored entry, falling back to the raw value.
    pub fn from_value(value: Value) -> Self {
        match Item::deserialize(&value) {
            Ok(item) => ArchiveEntry::Item(item),
            Err(_) => ArchiveEntry::Unreadable(value),
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            ArchiveEntry::Item(item) => Some(item),
            ArchiveEntry::Unreadable(_) => None,
        }
    }

    pub fn into_item(self) -> Option<Item> {
        match self {
            ArchiveEntry::Item(item) => Some(item),
            ArchiveEntry::Unreadable(_) => None,
        }
    }

    /// Identity key; unreadable entries have none and never collide.
    pub fn key(&self) -> Option<String> {
        self.item().map(Item::key)
    }
}

impl From<Item> for ArchiveEntry {
    fn from(item: Item) -> Self {
        ArchiveEntry::Item(item)
    }
}

/// A subject whose generation failed, with the rendered error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedSubject {
    pub subject: String,
    pub error: String,
}

/// Result of one generation task: a finished item or a failure, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Generated(Item),
    Failed(FailedSubject),
}

impl GenerationOutcome {
    pub fn failed(subject: &str, error: &GenerationError) -> Self {
        GenerationOutcome::Failed(FailedSubject {
            subject: subject.to_string(),
            error: error.to_string(),
        })
    }

    pub fn subject(&self) -> &str {
        match self {
            GenerationOutcome::Generated(item) => &item.subject,
            GenerationOutcome::Failed(failed) => &failed.subject,
        }
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            GenerationOutcome::Generated(item) => Some(item),
            GenerationOutcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailedSubject> {
        match self {
            GenerationOutcome::Generated(_) => None,
            GenerationOutcome::Failed(failed) => Some(failed),
        }
    }
}
