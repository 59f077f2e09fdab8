//! Language preference store
//!
//! Holds the active language for the whole client. The choice survives
//! restarts through a `PreferenceStorage`, and every accepted change is
//! mirrored onto the page's `lang`/`dir` attributes and broadcast to
//! subscribers over a `watch` channel.

use crate::error::{I18nError, I18nResult};
use crate::language::{self, Direction, LanguageCode};
use crate::page::Page;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Storage key holding the active language code
pub const STORAGE_KEY: &str = "preferred-language";

/// Durable string key/value storage
pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> I18nResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> I18nResult<()>;
}

/// Storage that lives as long as the process
#[derive(Debug, Default)]
pub struct MemoryStorage(Mutex<HashMap<String, String>>);

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> I18nResult<Option<String>> {
        let map = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(map.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> I18nResult<()> {
        let mut map = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Storage backed by a flat JSON object on disk
///
/// Other keys in the file are preserved on write.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/civic-i18n/preferences.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("civic-i18n").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> I18nResult<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| I18nError::io(&self.path, e))?;
        let json: Value =
            serde_json::from_str(&content).map_err(|e| I18nError::json(&self.path, e))?;
        match json {
            Value::Object(map) => Ok(map),
            _ => Err(I18nError::Storage(format!(
                "'{}' does not hold a JSON object",
                self.path.display()
            ))),
        }
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> I18nResult<Option<String>> {
        let map = self.read_map()?;
        Ok(map.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> I18nResult<()> {
        let mut map = self.read_map().unwrap_or_else(|e| {
            warn!("Discarding unreadable preferences: {}", e);
            Map::new()
        });
        map.insert(key.to_string(), Value::String(value.to_string()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| I18nError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(&Value::Object(map))
            .map_err(|e| I18nError::json(&self.path, e))?;
        fs::write(&self.path, content).map_err(|e| I18nError::io(&self.path, e))
    }
}

/// The active language and its derived direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LanguagePreference {
    pub active: LanguageCode,
    pub is_rtl: bool,
}

impl LanguagePreference {
    pub fn new(active: LanguageCode) -> Self {
        Self {
            active,
            is_rtl: active.is_rtl(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.active.direction()
    }
}

impl Default for LanguagePreference {
    fn default() -> Self {
        Self::new(LanguageCode::DEFAULT)
    }
}

/// Pick the starting language: a valid persisted choice, then the system
/// locale's primary subtag, then the default.
pub fn resolve_initial_language(
    storage: &dyn PreferenceStorage,
    system_locale: Option<&str>,
) -> LanguageCode {
    match storage.get(STORAGE_KEY) {
        Ok(Some(saved)) => match LanguageCode::from_code(&saved) {
            Some(language) => return language,
            None => debug!("Ignoring unsupported saved language '{}'", saved),
        },
        Ok(None) => {}
        Err(e) => warn!("Could not read saved language: {}", e),
    }

    if let Some(language) = system_locale.and_then(language::language_for_locale) {
        return language;
    }

    LanguageCode::DEFAULT
}

/// Process-wide holder of the active language
pub struct LanguageStore {
    storage: Arc<dyn PreferenceStorage>,
    page: Arc<dyn Page>,
    sender: watch::Sender<LanguagePreference>,
}

impl LanguageStore {
    /// Resolve the starting language and apply it to the page and storage
    pub fn initialize(
        storage: Arc<dyn PreferenceStorage>,
        page: Arc<dyn Page>,
        system_locale: Option<&str>,
    ) -> Self {
        let active = resolve_initial_language(storage.as_ref(), system_locale);
        let preference = LanguagePreference::new(active);
        let (sender, _) = watch::channel(preference);
        let store = Self {
            storage,
            page,
            sender,
        };
        store.apply(preference);
        store
    }

    pub fn current(&self) -> LanguagePreference {
        *self.sender.borrow()
    }

    pub fn language(&self) -> LanguageCode {
        self.current().active
    }

    pub fn is_rtl(&self) -> bool {
        self.current().is_rtl
    }

    /// Receiver notified on every accepted change
    pub fn subscribe(&self) -> watch::Receiver<LanguagePreference> {
        self.sender.subscribe()
    }

    /// Switch to the language with `code`.
    ///
    /// Unsupported codes are ignored. Returns whether `code` is supported.
    pub fn change_language(&self, code: &str) -> bool {
        match LanguageCode::from_code(code) {
            Some(language) => {
                self.set_language(language);
                true
            }
            None => {
                debug!("Ignoring unsupported language code '{}'", code);
                false
            }
        }
    }

    pub fn set_language(&self, language: LanguageCode) {
        let preference = LanguagePreference::new(language);
        // Page attributes and storage are written under the channel lock so
        // concurrent switches land in the same order everywhere
        self.sender.send_if_modified(|current| {
            if *current == preference {
                return false;
            }
            *current = preference;
            info!("Language changed to {} ({})", language, preference.direction());
            self.apply(preference);
            true
        });
    }

    fn apply(&self, preference: LanguagePreference) {
        self.page
            .set_document_language(preference.active, preference.direction());
        if let Err(e) = self.storage.set(STORAGE_KEY, preference.active.code()) {
            warn!("Could not persist language {}: {}", preference.active, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HeadlessPage;

    fn memory() -> Arc<MemoryStorage> {
        Arc::new(MemoryStorage::new())
    }

    #[test]
    fn test_initial_precedence() {
        let storage = MemoryStorage::new();
        assert_eq!(resolve_initial_language(&storage, None), LanguageCode::En);
        assert_eq!(
            resolve_initial_language(&storage, Some("ta-IN")),
            LanguageCode::Ta
        );
        assert_eq!(
            resolve_initial_language(&storage, Some("de-DE")),
            LanguageCode::En
        );

        storage.set(STORAGE_KEY, "fr").unwrap();
        assert_eq!(
            resolve_initial_language(&storage, Some("ta-IN")),
            LanguageCode::Fr
        );

        storage.set(STORAGE_KEY, "klingon").unwrap();
        assert_eq!(
            resolve_initial_language(&storage, Some("hi_IN.UTF-8")),
            LanguageCode::Hi
        );
    }

    #[test]
    fn test_initialize_applies_to_page_and_storage() {
        let page = HeadlessPage::new();
        let storage = memory();
        let store = LanguageStore::initialize(storage.clone(), page.clone(), Some("ar-EG"));
        assert_eq!(store.language(), LanguageCode::Ar);
        assert!(store.is_rtl());
        assert_eq!(page.document_direction(), Some(Direction::Rtl));
        assert_eq!(page.document_language(), Some(LanguageCode::Ar));
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("ar"));
    }

    #[test]
    fn test_change_language_updates_direction() {
        let page = HeadlessPage::new();
        let store = LanguageStore::initialize(memory(), page.clone(), None);

        assert!(store.change_language("ar"));
        assert!(store.is_rtl());
        assert_eq!(page.document_direction(), Some(Direction::Rtl));

        assert!(store.change_language("en"));
        assert!(!store.is_rtl());
        assert_eq!(page.document_direction(), Some(Direction::Ltr));
        assert_eq!(page.document_language(), Some(LanguageCode::En));
    }

    #[test]
    fn test_invalid_code_is_ignored() {
        let page = HeadlessPage::new();
        let storage = memory();
        let store = LanguageStore::initialize(storage.clone(), page.clone(), None);
        store.change_language("es");
        let before = store.current();

        for code in ["de", "", "ES", "es-MX", "he"] {
            assert!(!store.change_language(code));
            assert_eq!(store.current(), before);
        }
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("es"));
        assert_eq!(page.document_language(), Some(LanguageCode::Es));
    }

    #[tokio::test]
    async fn test_subscribers_are_notified() {
        let store = LanguageStore::initialize(memory(), HeadlessPage::new(), None);
        let mut rx = store.subscribe();

        store.change_language("hi");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().active, LanguageCode::Hi);

        // Re-selecting the active language is not a change
        store.change_language("hi");
        assert!(!rx.has_changed().unwrap());

        store.change_language("nope");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_reload_restores_choice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        let store = LanguageStore::initialize(
            Arc::new(FileStorage::new(&path)),
            HeadlessPage::new(),
            None,
        );
        store.change_language("kn");
        drop(store);

        let reloaded = LanguageStore::initialize(
            Arc::new(FileStorage::new(&path)),
            HeadlessPage::new(),
            Some("fr-FR"),
        );
        assert_eq!(reloaded.language(), LanguageCode::Kn);
    }

    #[test]
    fn test_file_storage_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let storage = FileStorage::new(&path);
        storage.set(STORAGE_KEY, "te").unwrap();
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("te"));
        assert_eq!(storage.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_file_storage_recovers_from_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{broken").unwrap();

        let storage = FileStorage::new(&path);
        assert!(storage.get(STORAGE_KEY).is_err());
        // Corrupt storage falls back to the system locale
        assert_eq!(
            resolve_initial_language(&storage, Some("mr-IN")),
            LanguageCode::Mr
        );

        storage.set(STORAGE_KEY, "es").unwrap();
        assert_eq!(storage.get(STORAGE_KEY).unwrap().as_deref(), Some("es"));
    }

    #[test]
    fn test_file_storage_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("none.json"));
        assert_eq!(storage.get(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_concurrent_switches_agree() {
        for _ in 0..50 {
            let storage = memory();
            let page = HeadlessPage::new();
            let store = LanguageStore::initialize(storage.clone(), page.clone(), None);

            std::thread::scope(|scope| {
                scope.spawn(|| store.change_language("ar"));
                scope.spawn(|| store.change_language("es"));
            });

            let active = store.language();
            assert_eq!(page.document_language(), Some(active));
            assert_eq!(page.document_direction(), Some(active.direction()));
            assert_eq!(
                storage.get(STORAGE_KEY).unwrap().as_deref(),
                Some(active.code())
            );
        }
    }
}
