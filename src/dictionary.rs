//! Static phrase dictionary
//!
//! Phrases are keyed by their canonical English text. A dictionary holds one
//! `LocalizedPhrases` table per language; a missing table or a missing phrase
//! is a normal state and makes lookups fall back to the source phrase.

use crate::language::LanguageCode;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Localized phrases for a single language
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizedPhrases(HashMap<String, String>);

impl LocalizedPhrases {
    pub fn new() -> Self {
        LocalizedPhrases(HashMap::new())
    }

    pub fn with_phrase(&mut self, source: &str, localized: &str) -> &mut Self {
        self.0.insert(source.to_owned(), localized.to_owned());
        self
    }

    pub fn get_phrase(&self, source: &str) -> Option<&str> {
        self.0.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy every phrase of `other` over this table
    pub fn merge(&mut self, other: LocalizedPhrases) {
        self.0.extend(other.0);
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for LocalizedPhrases {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut phrases = LocalizedPhrases::new();
        for (source, localized) in iter {
            phrases.with_phrase(source, localized);
        }
        phrases
    }
}

/// Phrase tables keyed by language.
///
/// e.g. phrases[Es]["Search"] = "Buscar"
///      phrases[Fr]["Search"] = "Rechercher"
#[derive(Debug, Clone, Default)]
pub struct TranslationDictionary {
    phrases: HashMap<LanguageCode, LocalizedPhrases>,
}

static BUILTIN: LazyLock<TranslationDictionary> = LazyLock::new(|| {
    let mut dictionary = TranslationDictionary::new();
    dictionary
        .with_phrases_for_language(
            LanguageCode::Es,
            LocalizedPhrases::from_iter([
                ("Search", "Buscar"),
                ("Communities", "Comunidades"),
                ("Issues", "Problemas"),
                ("Create Issue", "Crear Problema"),
                ("Dashboard", "Panel"),
                ("My Communities", "Mis Comunidades"),
            ]),
        )
        .with_phrases_for_language(
            LanguageCode::Hi,
            LocalizedPhrases::from_iter([
                ("Search", "खोज"),
                ("Communities", "समुदाय"),
                ("Issues", "समस्याएं"),
                ("Create Issue", "समस्या बनाएं"),
                ("Dashboard", "डैशबोर्ड"),
                ("My Communities", "मेरे समुदाय"),
            ]),
        )
        .with_phrases_for_language(
            LanguageCode::Fr,
            LocalizedPhrases::from_iter([
                ("Search", "Rechercher"),
                ("Communities", "Communautés"),
                ("Issues", "Problèmes"),
                ("Create Issue", "Créer un Problème"),
                ("Dashboard", "Tableau de Bord"),
                ("My Communities", "Mes Communautés"),
            ]),
        )
        .with_phrases_for_language(
            LanguageCode::Ar,
            LocalizedPhrases::from_iter([
                ("Search", "بحث"),
                ("Communities", "مجتمعات"),
                ("Issues", "قضايا"),
                ("Create Issue", "إنشاء قضية"),
                ("Dashboard", "لوحة التحكم"),
                ("My Communities", "مجتمعاتي"),
            ]),
        );
    dictionary
});

impl TranslationDictionary {
    pub fn new() -> Self {
        TranslationDictionary {
            phrases: HashMap::new(),
        }
    }

    /// The phrases bundled with the client
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn with_phrases_for_language(
        &mut self,
        language: LanguageCode,
        phrases: LocalizedPhrases,
    ) -> &mut Self {
        self.phrases.insert(language, phrases);
        self
    }

    /// Merge phrases into the table of `language`, overriding existing entries
    pub fn merge_phrases(&mut self, language: LanguageCode, phrases: LocalizedPhrases) {
        self.phrases.entry(language).or_default().merge(phrases);
    }

    pub fn phrases_for(&self, language: LanguageCode) -> Option<&LocalizedPhrases> {
        self.phrases.get(&language)
    }

    /// The localized phrase, if the dictionary has one
    pub fn lookup(&self, language: LanguageCode, phrase: &str) -> Option<&str> {
        self.phrases.get(&language)?.get_phrase(phrase)
    }

    /// Translate `phrase` into `language`.
    ///
    /// The default language always gets the phrase back unchanged, whatever
    /// the dictionary holds for it. Missing entries fall back to the phrase.
    pub fn translate(&self, language: LanguageCode, phrase: &str) -> String {
        if language.is_default() {
            return phrase.to_string();
        }
        self.lookup(language, phrase).unwrap_or(phrase).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASES: &[&str] = &[
        "Search",
        "Communities",
        "Issues",
        "Create Issue",
        "Dashboard",
        "My Communities",
        "Settings",
        "",
        "Anything",
    ];

    #[test]
    fn test_default_language_is_identity() {
        let mut dictionary = TranslationDictionary::builtin();
        // Even an explicit English table is ignored
        dictionary.with_phrases_for_language(
            LanguageCode::En,
            LocalizedPhrases::from_iter([("Anything", "Something else")]),
        );
        for phrase in PHRASES {
            assert_eq!(dictionary.translate(LanguageCode::En, phrase), *phrase);
        }
    }

    #[test]
    fn test_known_entries_are_returned() {
        let dictionary = TranslationDictionary::builtin();
        for language in LanguageCode::ALL {
            let Some(table) = dictionary.phrases_for(language) else {
                continue;
            };
            for phrase in PHRASES {
                if let Some(expected) = table.get_phrase(phrase) {
                    assert_eq!(dictionary.translate(language, phrase), expected);
                }
            }
        }
    }

    #[test]
    fn test_missing_entries_fall_back() {
        let dictionary = TranslationDictionary::builtin();
        for language in LanguageCode::ALL {
            for phrase in PHRASES {
                if dictionary.lookup(language, phrase).is_none() {
                    assert_eq!(dictionary.translate(language, phrase), *phrase);
                }
            }
        }
    }

    #[test]
    fn test_spanish_scenario() {
        let mut dictionary = TranslationDictionary::new();
        dictionary.with_phrases_for_language(
            LanguageCode::Es,
            LocalizedPhrases::from_iter([("Search", "Buscar")]),
        );
        assert_eq!(dictionary.translate(LanguageCode::Es, "Search"), "Buscar");
        assert_eq!(dictionary.translate(LanguageCode::Es, "Settings"), "Settings");
    }

    #[test]
    fn test_language_without_table() {
        let dictionary = TranslationDictionary::builtin();
        assert!(dictionary.phrases_for(LanguageCode::Ta).is_none());
        assert_eq!(dictionary.translate(LanguageCode::Ta, "Search"), "Search");
    }

    #[test]
    fn test_builtin_contents() {
        let dictionary = TranslationDictionary::builtin();
        assert_eq!(dictionary.lookup(LanguageCode::Hi, "Dashboard"), Some("डैशबोर्ड"));
        assert_eq!(dictionary.lookup(LanguageCode::Ar, "Search"), Some("بحث"));
        assert_eq!(
            dictionary.lookup(LanguageCode::Fr, "Create Issue"),
            Some("Créer un Problème")
        );
        assert_eq!(dictionary.phrases_for(LanguageCode::Es).map(|p| p.len()), Some(6));
    }

    #[test]
    fn test_merge_overrides() {
        let mut dictionary = TranslationDictionary::builtin();
        dictionary.merge_phrases(
            LanguageCode::Es,
            LocalizedPhrases::from_iter([("Search", "Búsqueda"), ("Settings", "Ajustes")]),
        );
        assert_eq!(dictionary.translate(LanguageCode::Es, "Search"), "Búsqueda");
        assert_eq!(dictionary.translate(LanguageCode::Es, "Settings"), "Ajustes");
        assert_eq!(dictionary.translate(LanguageCode::Es, "Issues"), "Problemas");

        dictionary.merge_phrases(
            LanguageCode::Ta,
            LocalizedPhrases::from_iter([("Search", "தேடல்")]),
        );
        assert_eq!(dictionary.translate(LanguageCode::Ta, "Search"), "தேடல்");
    }
}
