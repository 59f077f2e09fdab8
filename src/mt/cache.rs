//! Memoizing wrapper around a translation provider
//!
//! Caches successful translations by `(text, target locale)`. Failures are
//! not cached, so a transient network error does not pin a phrase to its
//! untranslated form. Concurrent misses for the same key may both reach the
//! provider; requests are not coalesced.
//!
//! The cache holds at most `capacity` entries; once full, the oldest entry
//! is evicted first.

use crate::mt::error::MtResult;
use crate::mt::translator::{MachineTranslator, normalize_locale};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

type CacheKey = (String, String);

/// Entries in insertion order
#[derive(Default)]
struct Entries {
    map: HashMap<CacheKey, String>,
    order: VecDeque<CacheKey>,
}

impl Entries {
    fn insert(&mut self, key: CacheKey, value: String, capacity: usize) {
        if let Some(existing) = self.map.get_mut(&key) {
            *existing = value;
            return;
        }
        while self.map.len() >= capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.map.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.map.insert(key, value);
    }
}

pub struct CachingTranslator {
    inner: Arc<dyn MachineTranslator>,
    capacity: usize,
    entries: RwLock<Entries>,
}

impl CachingTranslator {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new(inner: Arc<dyn MachineTranslator>) -> Self {
        Self::with_capacity(inner, Self::DEFAULT_CAPACITY)
    }

    /// A cache keeping at most `capacity` translations (at least one)
    pub fn with_capacity(inner: Arc<dyn MachineTranslator>, capacity: usize) -> Self {
        Self {
            inner,
            capacity: capacity.max(1),
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.map.is_empty()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.map.clear();
        entries.order.clear();
    }
}

#[async_trait]
impl MachineTranslator for CachingTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let key = (text.to_string(), normalize_locale(target_locale));
        if let Some(hit) = self.entries.read().await.map.get(&key) {
            debug!("Translation cache hit for '{}' ({})", text, key.1);
            return Ok(hit.clone());
        }

        let translated = self
            .inner
            .translate(text, source_locale, target_locale)
            .await?;
        self.entries
            .write()
            .await
            .insert(key, translated.clone(), self.capacity);
        Ok(translated)
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }
}
