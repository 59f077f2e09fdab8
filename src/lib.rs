//! Language and translation support for community-engagement clients.
//!
//! Labels are translated synchronously from a static phrase dictionary,
//! dynamic content asynchronously through a machine translation provider,
//! and whole pages through a third-party translation widget driven by
//! [`WidgetBridge`]. The active language is persisted across sessions and
//! determines text direction.
//!
//! Every failure in this crate degrades to showing the untranslated phrase;
//! translation never blocks the client.
//!
//! # Example
//!
//! ```ignore
//! use civic_i18n::{HeadlessPage, LanguageContext, MemoryStorage};
//! use std::sync::Arc;
//!
//! let ctx = LanguageContext::new(HeadlessPage::new(), Arc::new(MemoryStorage::new()), None);
//! ctx.change_language("es");
//! assert_eq!(ctx.t("Search"), "Buscar");
//! assert_eq!(ctx.t("Settings"), "Settings");
//! ```

pub mod bridge;
pub mod config;
pub mod context;
pub mod dictionary;
pub mod error;
pub mod language;
pub mod loader;
pub mod mt;
pub mod page;
pub mod preference;

pub use bridge::{BridgeConfig, BridgeState, ExternalBridgeState, PollOutcome, WidgetBridge};
pub use config::Config;
pub use context::LanguageContext;
pub use dictionary::{LocalizedPhrases, TranslationDictionary};
pub use error::{I18nError, I18nResult};
pub use language::{Direction, LanguageCode, SupportedLanguage, supported_languages};
pub use page::{HeadlessPage, Page, SelectControl, TranslateWidget, WidgetConfig, WidgetLayout};
pub use preference::{
    FileStorage, LanguagePreference, LanguageStore, MemoryStorage, PreferenceStorage,
};
