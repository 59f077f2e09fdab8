//! Consumer-facing language context
//!
//! `LanguageContext` is what the rest of the client talks to. It ties the
//! dictionary, the preference store, the asynchronous translator and the
//! widget bridge together behind a small surface:
//!
//! - `t` for synchronous labels (menus, buttons)
//! - `translate_async` for dynamic content
//! - `change_language` / `select_language` to switch languages
//! - `language`, `is_rtl`, `supported_languages`, `subscribe` for rendering
//!
//! Dropping the context tears the bridge down.

use crate::bridge::{BridgeConfig, WidgetBridge};
use crate::dictionary::TranslationDictionary;
use crate::language::{self, LanguageCode, SupportedLanguage};
use crate::mt::MachineTranslator;
use crate::page::Page;
use crate::preference::{LanguagePreference, LanguageStore, PreferenceStorage};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

pub struct LanguageContext {
    dictionary: Arc<TranslationDictionary>,
    store: LanguageStore,
    translator: Option<Arc<dyn MachineTranslator>>,
    bridge: WidgetBridge,
}

impl LanguageContext {
    /// Create a context with the built-in dictionary, no asynchronous
    /// translator and the default bridge configuration.
    ///
    /// `system_locale` is the locale reported by the platform, consulted
    /// when storage holds no valid choice.
    pub fn new(
        page: Arc<dyn Page>,
        storage: Arc<dyn PreferenceStorage>,
        system_locale: Option<&str>,
    ) -> Self {
        let store = LanguageStore::initialize(storage, Arc::clone(&page), system_locale);
        Self {
            dictionary: Arc::new(TranslationDictionary::builtin()),
            store,
            translator: None,
            bridge: WidgetBridge::new(page, BridgeConfig::default()),
        }
    }

    pub fn with_dictionary(mut self, dictionary: TranslationDictionary) -> Self {
        self.dictionary = Arc::new(dictionary);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn MachineTranslator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Replace the bridge. Only meaningful before the first language switch.
    pub fn with_bridge(mut self, bridge: WidgetBridge) -> Self {
        self.bridge.teardown();
        self.bridge = bridge;
        self
    }

    /// Translate a label through the static dictionary
    pub fn t(&self, phrase: &str) -> String {
        self.dictionary.translate(self.language(), phrase)
    }

    /// Translate dynamic content, falling back to `phrase` on any failure
    pub async fn translate_async(&self, phrase: &str) -> String {
        let language = self.language();
        if language.is_default() {
            return phrase.to_string();
        }
        let Some(translator) = &self.translator else {
            debug!("No machine translator configured, keeping '{}'", phrase);
            return phrase.to_string();
        };

        match translator
            .translate(phrase, LanguageCode::DEFAULT.code(), language.code())
            .await
        {
            Ok(translated) => translated,
            Err(e) => {
                error!(
                    "Translation error ({}, {}): {}",
                    translator.provider_name(),
                    language,
                    e
                );
                phrase.to_string()
            }
        }
    }

    /// Switch the active language. Unsupported codes are ignored.
    pub fn change_language(&self, code: &str) -> bool {
        self.store.change_language(code)
    }

    /// What the language selector does: switch the active language, then
    /// retranslate the page through the widget. Must be called within a
    /// Tokio runtime.
    pub fn select_language(&self, code: &str) -> bool {
        if !self.change_language(code) {
            return false;
        }
        self.bridge.switch_language(self.language());
        true
    }

    pub fn language(&self) -> LanguageCode {
        self.store.language()
    }

    pub fn is_rtl(&self) -> bool {
        self.store.is_rtl()
    }

    pub fn preference(&self) -> LanguagePreference {
        self.store.current()
    }

    pub fn supported_languages(&self) -> &'static [SupportedLanguage] {
        language::supported_languages()
    }

    /// Display name of the active language
    pub fn current_language_name(&self) -> &'static str {
        let active = self.language();
        self.supported_languages()
            .iter()
            .find(|lang| lang.code == active)
            .map(|lang| lang.name)
            .unwrap_or("English")
    }

    pub fn subscribe(&self) -> watch::Receiver<LanguagePreference> {
        self.store.subscribe()
    }

    pub fn dictionary(&self) -> &TranslationDictionary {
        &self.dictionary
    }

    pub fn bridge(&self) -> &WidgetBridge {
        &self.bridge
    }

    /// Release page resources held by the bridge
    pub fn teardown(&self) {
        self.bridge.teardown();
    }
}

impl Drop for LanguageContext {
    fn drop(&mut self) {
        self.bridge.teardown();
    }
}
