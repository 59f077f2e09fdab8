use crate::dictionary::{LocalizedPhrases, TranslationDictionary};
use crate::error::{I18nError, I18nResult};
use crate::language::LanguageCode;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Load phrases from a single JSON file
///
/// The JSON file should have the following structure:
/// ```json
/// {
///     "@metadata": { ... },  // Ignored
///     "Search": "Buscar",
///     "Create Issue": "Crear Problema"
/// }
/// ```
///
/// Keys are canonical English phrases. Non-string values are skipped with a
/// warning.
pub fn load_phrases_from_file(path: &Path) -> I18nResult<LocalizedPhrases> {
    let content = fs::read_to_string(path).map_err(|e| I18nError::io(path, e))?;
    let json: Value = serde_json::from_str(&content).map_err(|e| I18nError::json(path, e))?;

    let obj = json.as_object().ok_or_else(|| {
        I18nError::Loader(format!(
            "Invalid JSON in '{}': root must be an object",
            path.display()
        ))
    })?;

    let mut phrases = LocalizedPhrases::new();
    for (key, value) in obj {
        if key.starts_with('@') {
            continue;
        }

        if let Some(localized) = value.as_str() {
            phrases.with_phrase(key, localized);
        } else {
            warn!("Phrase '{}' in {} is not a string, skipping", key, path.display());
        }
    }

    Ok(phrases)
}

/// Merge every `<code>.json` file of `dir` into `dictionary`
///
/// The file stem is the language code: `es.json` feeds Spanish. Files for
/// unsupported languages are skipped, since the client could never select
/// them. Returns the number of files merged.
pub fn merge_dictionary_dir(
    dictionary: &mut TranslationDictionary,
    dir: &Path,
) -> I18nResult<usize> {
    if !dir.is_dir() {
        return Err(I18nError::Loader(format!("Not a directory: {}", dir.display())));
    }

    let entries = fs::read_dir(dir).map_err(|e| I18nError::io(dir, e))?;

    let mut merged = 0;
    for entry in entries {
        let path = entry.map_err(|e| I18nError::io(dir, e))?.path();

        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }

        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let Some(language) = LanguageCode::from_code(stem) else {
            debug!("Skipping {}: '{}' is not a supported language", path.display(), stem);
            continue;
        };

        let phrases = load_phrases_from_file(&path)?;
        debug!("Loaded {} phrases for {} from {}", phrases.len(), language, path.display());
        dictionary.merge_phrases(language, phrases);
        merged += 1;
    }

    if merged == 0 {
        warn!("No dictionary files found in {}", dir.display());
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_skips_metadata_and_non_strings() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "es.json",
            r#"{"@metadata": {"authors": ["x"]}, "Search": "Buscar", "Count": 3}"#,
        );
        let phrases = load_phrases_from_file(&dir.path().join("es.json")).unwrap();
        assert_eq!(phrases.len(), 1);
        assert_eq!(phrases.get_phrase("Search"), Some("Buscar"));
    }

    #[test]
    fn test_load_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "es.json", r#"["Search"]"#);
        let result = load_phrases_from_file(&dir.path().join("es.json"));
        assert!(matches!(result, Err(I18nError::Loader(_))));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "es.json", "{not json");
        let result = load_phrases_from_file(&dir.path().join("es.json"));
        assert!(matches!(result, Err(I18nError::Json { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_phrases_from_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(I18nError::Io { .. })));
    }

    #[test]
    fn test_merge_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "es.json", r#"{"Settings": "Ajustes"}"#);
        write_file(dir.path(), "ta.json", r#"{"Search": "தேடல்"}"#);
        write_file(dir.path(), "de.json", r#"{"Search": "Suchen"}"#);
        write_file(dir.path(), "README.txt", "not a dictionary");

        let mut dictionary = TranslationDictionary::builtin();
        let merged = merge_dictionary_dir(&mut dictionary, dir.path()).unwrap();
        assert_eq!(merged, 2);
        assert_eq!(dictionary.translate(LanguageCode::Es, "Settings"), "Ajustes");
        assert_eq!(dictionary.translate(LanguageCode::Es, "Search"), "Buscar");
        assert_eq!(dictionary.translate(LanguageCode::Ta, "Search"), "தேடல்");
    }

    #[test]
    fn test_merge_dir_not_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut dictionary = TranslationDictionary::new();
        let result = merge_dictionary_dir(&mut dictionary, &dir.path().join("nope"));
        assert!(matches!(result, Err(I18nError::Loader(_))));
    }
}
