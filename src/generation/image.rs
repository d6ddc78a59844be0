//! Image stage of a generation task: run-wide gating and file output.

use crate::archive::key::day_of;
use crate::archive::Item;
use crate::concurrency::{QuotaCounter, QuotaPermit};
use crate::config::ImagePolicy;
use crate::error::StorageError;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const MAX_SLUG_CHARS: usize = 60;
const HEADLINE_SLUG_CHARS: usize = 20;

/// Decides, across all concurrent tasks of one run, which items get an image.
#[derive(Debug)]
pub struct ImageGate {
    policy: ImagePolicy,
    quota: Option<QuotaCounter>,
    rng: Mutex<StdRng>,
    attached: AtomicUsize,
}

impl ImageGate {
    pub fn new(policy: ImagePolicy) -> Self {
        Self::with_rng(policy, StdRng::from_entropy())
    }

    /// Gate with a fixed random seed, for reproducible probability draws.
    pub fn with_seed(policy: ImagePolicy, seed: u64) -> Self {
        Self::with_rng(policy, StdRng::seed_from_u64(seed))
    }

    fn with_rng(policy: ImagePolicy, rng: StdRng) -> Self {
        let quota = match policy {
            ImagePolicy::FixedQuota { per_run } => Some(QuotaCounter::new(per_run)),
            _ => None,
        };
        Self {
            policy,
            quota,
            rng: Mutex::new(rng),
            attached: AtomicUsize::new(0),
        }
    }

    pub fn policy(&self) -> ImagePolicy {
        self.policy
    }

    /// Ask for an image slot. `None` means this item gets no image.
    pub fn admit(&self) -> Option<ImageTicket<'_>> {
        match self.policy {
            ImagePolicy::None => None,
            ImagePolicy::Probability { probability } => {
                // Also rejects NaN.
                if !(probability > 0.0) {
                    return None;
                }
                let admitted = probability >= 1.0 || self.rng.lock().gen_bool(probability);
                admitted.then_some(ImageTicket {
                    gate: self,
                    permit: None,
                })
            }
            ImagePolicy::FixedQuota { .. } => {
                let permit = self.quota.as_ref()?.try_acquire()?;
                Some(ImageTicket {
                    gate: self,
                    permit: Some(permit),
                })
            }
        }
    }

    /// Images attached so far in this run.
    pub fn images_used(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }
}

/// Permission to generate one image. Dropping it without `commit` gives a
/// quota slot back.
#[derive(Debug)]
pub struct ImageTicket<'a> {
    gate: &'a ImageGate,
    permit: Option<QuotaPermit<'a>>,
}

impl ImageTicket<'_> {
    /// Record the image as attached.
    pub fn commit(self) {
        if let Some(permit) = self.permit {
            permit.commit();
        }
        self.gate.attached.fetch_add(1, Ordering::SeqCst);
    }
}

/// Writes image bytes under the images directory and reports the path the
/// viewer should use.
#[derive(Debug, Clone)]
pub struct ImageSink {
    dir: PathBuf,
    public_prefix: String,
}

impl ImageSink {
    pub fn new<P: AsRef<Path>>(dir: P, public_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            public_prefix: public_prefix.into(),
        }
    }

    /// Sink whose recorded paths are relative to the archive's directory.
    /// Falls back to the images directory's own name when it does not live
    /// under the archive directory.
    pub fn for_archive(images_dir: &Path, archive_path: &Path) -> Self {
        let relative = archive_path
            .parent()
            .and_then(|archive_dir| images_dir.strip_prefix(archive_dir).ok())
            .map(|rel| {
                rel.components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy().to_string()),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .unwrap_or_else(|| {
                images_dir
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default()
            });
        Self::new(images_dir, relative)
    }

    /// Write `{dir}/{file_base}.png` and return its public relative path.
    pub async fn write(&self, file_base: &str, bytes: &[u8]) -> Result<String, StorageError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let file_name = format!("{}.png", file_base);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;
        if self.public_prefix.is_empty() {
            Ok(file_name)
        } else {
            Ok(format!("{}/{}", self.public_prefix, file_name))
        }
    }
}

/// File name stem for an item's image: subject, day and headline slugs.
pub fn image_file_base(item: &Item) -> String {
    let headline: String = slugify(&item.headline)
        .chars()
        .take(HEADLINE_SLUG_CHARS)
        .collect();
    format!(
        "{}_{}_{}",
        slugify(&item.subject),
        day_of(&item.created_at),
        headline
    )
}

/// Lowercase ASCII slug: diacritics stripped, other runs of non-alphanumerics
/// collapsed to `_`, capped at 60 characters.
pub fn slugify(text: &str) -> String {
    let folded: String = text
        .trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let mut slug = String::new();
    let mut pending_separator = false;
    for c in folded.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.push(c);
        } else {
            pending_separator = true;
        }
    }

    let capped: String = slug.chars().take(MAX_SLUG_CHARS).collect();
    capped.trim_end_matches('_').to_string()
}
