//! Merge freshly generated items into the archive.
//!
//! New items go first, existing order is preserved and the result is cut to
//! the archive cap. Items pushed past the cap are dropped for good.

use crate::archive::item::{ArchiveEntry, GenerationOutcome, Item};
use crate::archive::store::ArchiveStore;
use crate::error::ApiError;
use std::collections::HashSet;
use tracing::{debug, info};

/// Result of merging one run into the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeResult {
    /// The new archive, newest first.
    pub items: Vec<ArchiveEntry>,
    /// Fresh items that made it into the merge.
    pub added: usize,
    /// Fresh items that carry an image.
    pub images_added: usize,
    /// Generated items discarded because their key was already present.
    pub skipped_duplicates: usize,
    /// Items that fell past the cap.
    pub evicted: usize,
}

/// Merge outcomes into `existing` without touching storage.
///
/// Outcomes are walked in order, so when two items of the same run share a
/// key the earlier one wins. Failed outcomes are ignored. Unreadable existing
/// entries keep their position and never match a fresh item.
pub fn merge_outcomes<I>(outcomes: I, existing: Vec<ArchiveEntry>, max_items: usize) -> MergeResult
where
    I: IntoIterator<Item = GenerationOutcome>,
{
    let mut keys: HashSet<String> = existing.iter().filter_map(ArchiveEntry::key).collect();
    let mut fresh = Vec::new();
    let mut skipped_duplicates = 0usize;

    for outcome in outcomes {
        let GenerationOutcome::Generated(item) = outcome else {
            continue;
        };
        if keys.insert(item.key()) {
            info!(subject = %item.subject, headline = %preview(&item.headline), "Added item");
            fresh.push(item);
        } else {
            skipped_duplicates += 1;
            info!(subject = %item.subject, headline = %preview(&item.headline), "Skipped duplicate item");
        }
    }

    let added = fresh.len();
    let images_added = fresh.iter().filter(|item| item.image.is_some()).count();
    let total = added + existing.len();
    let mut items: Vec<ArchiveEntry> = fresh.into_iter().map(ArchiveEntry::from).collect();
    items.extend(existing);
    items.truncate(max_items);

    MergeResult {
        evicted: total - items.len(),
        items,
        added,
        images_added,
        skipped_duplicates,
    }
}

/// Merge outcomes into `existing` and persist the result, replacing the
/// stored archive.
pub async fn merge_and_persist<I>(
    store: &dyn ArchiveStore,
    outcomes: I,
    existing: Vec<ArchiveEntry>,
    max_items: usize,
) -> Result<MergeResult, ApiError>
where
    I: IntoIterator<Item = GenerationOutcome>,
{
    if max_items == 0 {
        return Err(ApiError::InvalidArgument(
            "Archive cap must be at least 1".to_string(),
        ));
    }

    let result = merge_outcomes(outcomes, existing, max_items);
    store.save(&result.items).await?;
    debug!(
        size = result.items.len(),
        added = result.added,
        evicted = result.evicted,
        "Archive persisted"
    );
    Ok(result)
}

fn preview(text: &str) -> String {
    text.chars().take(40).collect()
}
