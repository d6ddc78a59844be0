//! Shared test utilities for integration tests
//!
//! Scripted provider doubles, archive fixtures, and environment isolation for
//! tests that touch `TATTLE_*` or XDG variables.

use async_trait::async_trait;
use parking_lot::Mutex as PlMutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use tattle::archive::{ArchiveEntry, ArchiveStore, Item};
use tattle::error::ProviderError;
use tattle::provider::{ImageProvider, TextProvider};
use tempfile::TempDir;

pub const STAMP: &str = "2026-10-17T08:30:00.000Z";

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with HOME and XDG_CONFIG_HOME pointed into `test_dir` and the
/// given variables set. Every touched variable is restored afterwards.
pub fn with_isolated_env<F, R>(test_dir: &TempDir, vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let config_home = test_dir.path().join("xdg-config");
    let home = test_dir.path().join("home");
    std::fs::create_dir_all(&config_home).unwrap();
    std::fs::create_dir_all(&home).unwrap();

    let mut touched: Vec<(String, String)> = vec![
        ("HOME".to_string(), home.to_string_lossy().to_string()),
        (
            "XDG_CONFIG_HOME".to_string(),
            config_home.to_string_lossy().to_string(),
        ),
    ];
    touched.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    let saved: Vec<(String, Option<String>)> = touched
        .iter()
        .map(|(key, _)| (key.clone(), std::env::var(key).ok()))
        .collect();
    for (key, value) in &touched {
        std::env::set_var(key, value);
    }

    let result = f();

    for (key, original) in saved {
        match original {
            Some(value) => std::env::set_var(&key, value),
            None => std::env::remove_var(&key),
        }
    }
    result
}

/// Global config file location inside an isolated environment.
pub fn isolated_global_config(test_dir: &TempDir) -> PathBuf {
    test_dir
        .path()
        .join("xdg-config")
        .join("tattle")
        .join("config.toml")
}

pub fn item(subject: &str, headline: &str, created_at: &str) -> Item {
    Item {
        subject: subject.to_string(),
        headline: headline.to_string(),
        content: format!("{} and the {}", subject, headline),
        tags: Vec::new(),
        created_at: created_at.to_string(),
        image: None,
    }
}

pub fn entries(items: Vec<Item>) -> Vec<ArchiveEntry> {
    items.into_iter().map(ArchiveEntry::from).collect()
}

/// Readable items of a stored archive, newest first.
pub async fn stored_items(store: &dyn ArchiveStore) -> Vec<Item> {
    store
        .load()
        .await
        .unwrap()
        .into_iter()
        .filter_map(ArchiveEntry::into_item)
        .collect()
}

pub fn write_names(path: &Path, names: &[&str]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_string(names).unwrap()).unwrap();
}

pub fn subjects(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Text provider whose prompt is just the subject (use the `{subject}`
/// template). Each subject can be given a delay or a canned raw response.
#[derive(Default)]
pub struct ScriptedText {
    delays: HashMap<String, Duration>,
    responses: HashMap<String, Result<String, String>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: PlMutex<Vec<String>>,
}

impl ScriptedText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(mut self, subject: &str, delay: Duration) -> Self {
        self.delays.insert(subject.to_string(), delay);
        self
    }

    pub fn respond(mut self, subject: &str, raw: &str) -> Self {
        self.responses
            .insert(subject.to_string(), Ok(raw.to_string()));
        self
    }

    pub fn fail(mut self, subject: &str, message: &str) -> Self {
        self.responses
            .insert(subject.to_string(), Err(message.to_string()));
        self
    }

    /// Highest number of requests observed in flight at once.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TextProvider for ScriptedText {
    async fn request_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let subject = prompt.trim().to_string();
        self.calls.lock().push(subject.clone());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&subject).copied().unwrap_or(Duration::from_millis(1));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.responses.get(&subject) {
            Some(Ok(raw)) => Ok(raw.clone()),
            Some(Err(message)) => Err(ProviderError::RequestFailed(message.clone())),
            None => Ok(serde_json::json!({
                "headline": format!("{} spotted downtown", subject),
                "content": format!("{} was seen doing something unexpected.", subject),
                "tags": ["city", "mystery"]
            })
            .to_string()),
        }
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }
}

/// Image provider returning fixed bytes, optionally failing.
#[derive(Default)]
pub struct StaticImages {
    pub fail: bool,
    calls: AtomicUsize,
}

impl StaticImages {
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageProvider for StaticImages {
    async fn request_image(&self, _prompt: &str, _size: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        if self.fail {
            Err(ProviderError::RateLimit("slow down".to_string()))
        } else {
            Ok(b"\x89PNG fake".to_vec())
        }
    }
}
