use crate::dictionary::TranslationDictionary;
use crate::error::I18nResult;
use crate::loader::merge_dictionary_dir;
use crate::mt::google_translate::API_KEY_VAR;
use crate::mt::{CachingTranslator, GoogleTranslateProvider, MachineTranslator, MtResult};
use crate::preference::FileStorage;
use std::path::PathBuf;
use std::sync::Arc;

/// Overrides the preference file location
pub const PREFS_PATH_VAR: &str = "CIVIC_I18N_PREFS";
/// Directory of `<code>.json` phrase files merged over the built-in dictionary
pub const DICTIONARY_DIR_VAR: &str = "CIVIC_I18N_DICTIONARY_DIR";

/// Runtime settings read from the environment
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub google_api_key: Option<String>,
    pub preferences_path: Option<PathBuf>,
    pub dictionary_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        Self {
            google_api_key: non_empty(API_KEY_VAR),
            preferences_path: non_empty(PREFS_PATH_VAR).map(PathBuf::from),
            dictionary_dir: non_empty(DICTIONARY_DIR_VAR).map(PathBuf::from),
        }
    }

    /// Explicit path, or the per-user default when the platform has one
    pub fn preferences_path(&self) -> Option<PathBuf> {
        self.preferences_path
            .clone()
            .or_else(FileStorage::default_path)
    }

    /// The built-in dictionary, extended from `dictionary_dir` if set
    pub fn dictionary(&self) -> I18nResult<TranslationDictionary> {
        let mut dictionary = TranslationDictionary::builtin();
        if let Some(dir) = &self.dictionary_dir {
            merge_dictionary_dir(&mut dictionary, dir)?;
        }
        Ok(dictionary)
    }

    /// A cached Google provider when an API key is configured
    pub fn translator(&self) -> MtResult<Option<Arc<dyn MachineTranslator>>> {
        let Some(key) = &self.google_api_key else {
            return Ok(None);
        };
        let provider = GoogleTranslateProvider::new(key.clone())?;
        let translator: Arc<dyn MachineTranslator> =
            Arc::new(CachingTranslator::new(Arc::new(provider)));
        Ok(Some(translator))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("google_api_key", &self.google_api_key.as_ref().map(|_| "***"))
            .field("preferences_path", &self.preferences_path)
            .field("dictionary_dir", &self.dictionary_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_empty_environment() {
        let config = config_from(&[]);
        assert_eq!(config, Config::default());
        assert!(config.translator().unwrap().is_none());
    }

    #[test]
    fn test_reads_variables() {
        let config = config_from(&[
            (API_KEY_VAR, "secret"),
            (PREFS_PATH_VAR, "/tmp/prefs.json"),
            (DICTIONARY_DIR_VAR, "  "),
        ]);
        assert_eq!(config.google_api_key.as_deref(), Some("secret"));
        assert_eq!(config.preferences_path(), Some(PathBuf::from("/tmp/prefs.json")));
        assert_eq!(config.dictionary_dir, None);

        let translator = config.translator().unwrap().unwrap();
        assert_eq!(translator.provider_name(), "Google Translate");
    }

    #[test]
    fn test_dictionary_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("es.json"), r#"{"Settings": "Ajustes"}"#).unwrap();
        let config = Config {
            dictionary_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        let dictionary = config.dictionary().unwrap();
        assert_eq!(dictionary.lookup(crate::LanguageCode::Es, "Settings"), Some("Ajustes"));
        assert_eq!(dictionary.lookup(crate::LanguageCode::Es, "Search"), Some("Buscar"));
    }

    #[test]
    fn test_missing_dictionary_dir_is_an_error() {
        let config = Config {
            dictionary_dir: Some(PathBuf::from("/definitely/not/here")),
            ..Config::default()
        };
        assert!(config.dictionary().is_err());
    }

    #[test]
    fn test_debug_masks_key() {
        let config = config_from(&[(API_KEY_VAR, "secret-key"), (PREFS_PATH_VAR, "/tmp/p.json")]);
        let debug_str = format!("{:?}", config);
        assert!(debug_str.contains("***"));
        assert!(debug_str.contains("/tmp/p.json"));
        assert!(!debug_str.contains("secret-key"));

        assert!(format!("{:?}", Config::default()).contains("google_api_key: None"));
    }
}
