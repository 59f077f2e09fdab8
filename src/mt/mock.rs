//! Mock machine translator
//!
//! Deterministic, API-free provider for tests and the `--mock` CLI flag.
//! It also counts its calls so caching and fallback paths can be asserted.
//!
//! # Example
//!
//! ```ignore
//! use civic_i18n::mt::{MachineTranslator, MockMode, MockTranslator};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     assert_eq!(mock.translate("Search", "en", "es").await.unwrap(), "Search_es");
//! }
//! ```

use crate::mt::error::{MtError, MtResult};
use crate::mt::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append the target locale: "Search" → "Search_es"
    Suffix,

    /// (text, target_locale) → translation, falling back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Fail every call with a translation error
    Error(String),

    /// Fail every call with a network error
    Offline,

    /// Return input unchanged
    NoOp,
}

#[derive(Debug)]
pub struct MockTranslator {
    mode: MockMode,
    delay: Duration,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn new(mode: MockMode) -> Self {
        Self::with_delay(mode, Duration::ZERO)
    }

    /// A mock that sleeps `delay` before every call, like a slow network
    pub fn with_delay(mode: MockMode, delay: Duration) -> Self {
        Self {
            mode,
            delay,
            calls: AtomicUsize::new(0),
        }
    }

    /// Build a `Mappings` mock from `(text, target, translation)` triples
    pub fn with_mappings<'a>(
        entries: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    ) -> Self {
        let map = entries
            .into_iter()
            .map(|(text, target, translation)| {
                ((text.to_string(), target.to_string()), translation.to_string())
            })
            .collect();
        Self::new(MockMode::Mappings(map))
    }

    /// Number of `translate` calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn apply_translation(&self, text: &str, target: &str) -> MtResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Error(msg) => Err(MtError::TranslationError(msg.clone())),
            MockMode::Offline => Err(MtError::NetworkError(
                "mock translator is offline".to_string(),
            )),
            MockMode::NoOp => Ok(text.to_string()),
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.apply_translation(text, target_locale)
    }

    fn provider_name(&self) -> &str {
        "Mock Translator"
    }
}
