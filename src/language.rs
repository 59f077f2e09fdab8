//! Supported languages and text direction
//!
//! The set of languages the client can display is fixed at build time.
//! Each `LanguageCode` knows its display name and whether its script is
//! written right-to-left.

use icu_locale::LanguageIdentifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages whose script is written right-to-left.
///
/// This list is wider than the supported set on purpose: it describes
/// scripts, not what the client ships.
pub const RTL_LANGUAGES: &[&str] = &["ar", "he", "ur"];

/// A language the client can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    En,
    Hi,
    Ta,
    Te,
    Kn,
    Mr,
    Es,
    Fr,
    Ar,
}

impl LanguageCode {
    /// The default language. Phrases are authored in it.
    pub const DEFAULT: LanguageCode = LanguageCode::En;

    pub const ALL: [LanguageCode; 9] = [
        LanguageCode::En,
        LanguageCode::Hi,
        LanguageCode::Ta,
        LanguageCode::Te,
        LanguageCode::Kn,
        LanguageCode::Mr,
        LanguageCode::Es,
        LanguageCode::Fr,
        LanguageCode::Ar,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            LanguageCode::En => "en",
            LanguageCode::Hi => "hi",
            LanguageCode::Ta => "ta",
            LanguageCode::Te => "te",
            LanguageCode::Kn => "kn",
            LanguageCode::Mr => "mr",
            LanguageCode::Es => "es",
            LanguageCode::Fr => "fr",
            LanguageCode::Ar => "ar",
        }
    }

    /// English display name, as shown in the language selector
    pub const fn name(self) -> &'static str {
        match self {
            LanguageCode::En => "English",
            LanguageCode::Hi => "Hindi",
            LanguageCode::Ta => "Tamil",
            LanguageCode::Te => "Telugu",
            LanguageCode::Kn => "Kannada",
            LanguageCode::Mr => "Marathi",
            LanguageCode::Es => "Spanish",
            LanguageCode::Fr => "French",
            LanguageCode::Ar => "Arabic",
        }
    }

    /// Look up a supported language by its exact code.
    ///
    /// Matching is exact: `"ES"` and `"es-MX"` are not supported codes.
    /// Use [`primary_subtag`] first when the input is a full locale.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|lang| lang.code() == code)
    }

    pub fn is_default(self) -> bool {
        self == Self::DEFAULT
    }

    pub fn is_rtl(self) -> bool {
        is_rtl_code(self.code())
    }

    pub fn direction(self) -> Direction {
        if self.is_rtl() {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reference entry for a supported language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SupportedLanguage {
    pub code: LanguageCode,
    pub name: &'static str,
}

const fn entry(code: LanguageCode) -> SupportedLanguage {
    SupportedLanguage {
        code,
        name: code.name(),
    }
}

static SUPPORTED_LANGUAGES: [SupportedLanguage; 9] = [
    entry(LanguageCode::En),
    entry(LanguageCode::Hi),
    entry(LanguageCode::Ta),
    entry(LanguageCode::Te),
    entry(LanguageCode::Kn),
    entry(LanguageCode::Mr),
    entry(LanguageCode::Es),
    entry(LanguageCode::Fr),
    entry(LanguageCode::Ar),
];

/// All supported languages, in selector order.
pub fn supported_languages() -> &'static [SupportedLanguage] {
    &SUPPORTED_LANGUAGES
}

/// Text direction of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

impl Direction {
    /// Value of the document `dir` attribute
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Ltr => "ltr",
            Direction::Rtl => "rtl",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_rtl_code(code: &str) -> bool {
    RTL_LANGUAGES.contains(&code)
}

/// Extract the primary language subtag of a locale string.
///
/// Accepts BCP 47 tags (`en-US`, `zh-Hans`) as well as POSIX locale names
/// (`es_MX.UTF-8`, `de_DE@euro`) as reported by operating systems.
/// Returns `None` when the input does not parse as a locale.
///
/// # Example
///
/// ```ignore
/// assert_eq!(primary_subtag("en-US").as_deref(), Some("en"));
/// assert_eq!(primary_subtag("ta_IN.UTF-8").as_deref(), Some("ta"));
/// ```
pub fn primary_subtag(locale: &str) -> Option<String> {
    // Strip POSIX codeset and modifier before handing it to the parser
    let tag = locale
        .split(['.', '@'])
        .next()
        .unwrap_or(locale)
        .trim()
        .replace('_', "-");
    if tag.is_empty() {
        return None;
    }
    let id: LanguageIdentifier = tag.parse().ok()?;
    Some(id.language.as_str().to_string())
}

/// Resolve a system locale to a supported language, by primary subtag.
pub fn language_for_locale(locale: &str) -> Option<LanguageCode> {
    primary_subtag(locale).and_then(|subtag| LanguageCode::from_code(&subtag))
}

/// The locale reported by the operating system, if any.
pub fn system_locale() -> Option<String> {
    sys_locale::get_locale()
}
