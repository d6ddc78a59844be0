//! Property-based tests for the run-wide image quota

use async_trait::async_trait;
use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tattle::archive::MemoryArchiveStore;
use tattle::concurrency::QuotaCounter;
use tattle::config::{ImagePolicy, PipelineConfig, PromptConfig};
use tattle::error::ProviderError;
use tattle::pipeline::Pipeline;
use tattle::provider::{ImageProvider, TextProvider};

/// Text provider with a per-subject delay; the prompt is the subject.
struct DelayedText {
    delays: HashMap<String, u64>,
}

#[async_trait]
impl TextProvider for DelayedText {
    async fn request_text(&self, prompt: &str) -> Result<String, ProviderError> {
        let delay = self.delays.get(prompt).copied().unwrap_or(0);
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(format!(
            r#"{{"headline": "{} story", "content": "Something happened.", "tags": []}}"#,
            prompt
        ))
    }

    fn provider_name(&self) -> &str {
        "delayed"
    }
}

/// Image provider with a fixed delay that fails on chosen call numbers.
struct FlakyImages {
    delay: u64,
    fail_first: usize,
    calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl ImageProvider for FlakyImages {
    async fn request_image(&self, _prompt: &str, _size: &str) -> Result<Vec<u8>, ProviderError> {
        let call = self
            .calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(self.delay)).await;
        if call < self.fail_first {
            Err(ProviderError::RequestFailed("flaky".to_string()))
        } else {
            Ok(b"png".to_vec())
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A fixed quota is never exceeded, whatever the completion timing.
    #[test]
    fn fixed_quota_is_never_exceeded(
        delays in prop::collection::vec(0u64..40, 1..10),
        quota in 0usize..4,
        concurrency in 1usize..6,
        image_delay in 0u64..20,
        fail_first in 0usize..3,
    ) {
        let subjects: Vec<String> = (0..delays.len()).map(|n| format!("s{n}")).collect();
        let text = DelayedText {
            delays: subjects.iter().cloned().zip(delays.iter().copied()).collect(),
        };
        let images = Arc::new(FlakyImages {
            delay: image_delay,
            fail_first,
            calls: Default::default(),
        });
        let store = Arc::new(MemoryArchiveStore::default());
        let temp = tempfile::TempDir::new().unwrap();
        let config = PipelineConfig {
            archive_path: temp.path().join("news.json"),
            images_dir: temp.path().join("images"),
            text_concurrency: concurrency,
            image_policy: ImagePolicy::FixedQuota { per_run: quota },
            ..PipelineConfig::default()
        };
        let prompts = PromptConfig {
            text_template: "{subject}".to_string(),
            ..PromptConfig::default()
        };

        let report = runtime().block_on(
            Pipeline::new(config, prompts, Arc::new(text), store.clone())
                .with_image_provider(images)
                .run_with(subjects.clone(), "2026-10-17T08:30:00.000Z".to_string()),
        ).unwrap();

        let attached = store.snapshot().iter().filter(|i| i.image.is_some()).count();
        prop_assert_eq!(attached, report.images_used);
        prop_assert!(attached <= quota);
        // Without failures every reserved slot is spent. Run sequentially,
        // a failed attempt hands its slot to the next subject.
        if fail_first == 0 || concurrency == 1 {
            let expected = quota.min(subjects.len().saturating_sub(fail_first));
            prop_assert_eq!(attached, expected);
        }
    }

    #[test]
    fn quota_counter_commits_never_exceed_limit(
        limit in 0usize..6,
        attempts in prop::collection::vec(any::<bool>(), 0..20),
    ) {
        let counter = QuotaCounter::new(limit);
        let mut committed = 0;
        for commit in attempts {
            if let Some(permit) = counter.try_acquire() {
                if commit {
                    permit.commit();
                    committed += 1;
                }
            }
        }
        prop_assert!(committed <= limit);
        prop_assert_eq!(counter.used(), committed);
    }
}
