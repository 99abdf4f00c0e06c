//! Search locale: result language plus the country used for geolocation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Country used when a language has no entry in the table.
pub const FALLBACK_COUNTRY: &str = "US";

/// Languages with a known default country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Cs,
    Sk,
    Pl,
    De,
    Fr,
    En,
    Es,
    It,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::Cs,
        Language::En,
        Language::Sk,
        Language::Pl,
        Language::De,
        Language::Fr,
        Language::Es,
        Language::It,
    ];

    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_ascii_lowercase().as_str() {
            "cs" => Some(Language::Cs),
            "sk" => Some(Language::Sk),
            "pl" => Some(Language::Pl),
            "de" => Some(Language::De),
            "fr" => Some(Language::Fr),
            "en" => Some(Language::En),
            "es" => Some(Language::Es),
            "it" => Some(Language::It),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::Cs => "cs",
            Language::Sk => "sk",
            Language::Pl => "pl",
            Language::De => "de",
            Language::Fr => "fr",
            Language::En => "en",
            Language::Es => "es",
            Language::It => "it",
        }
    }

    /// Default country for geolocated results.
    pub fn country(self) -> &'static str {
        match self {
            Language::Cs => "CZ",
            Language::Sk => "SK",
            Language::Pl => "PL",
            Language::De => "DE",
            Language::Fr => "FR",
            Language::En => "US",
            Language::Es => "ES",
            Language::It => "IT",
        }
    }

    /// Name of the language in itself, for pickers and help output.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::Cs => "Čeština",
            Language::Sk => "Slovenčina",
            Language::Pl => "Polski",
            Language::De => "Deutsch",
            Language::Fr => "Français",
            Language::En => "English",
            Language::Es => "Español",
            Language::It => "Italiano",
        }
    }
}

/// Language and country sent with a search request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    language: String,
    country: String,
}

impl Locale {
    /// Derive the country from the language. Unknown languages are kept
    /// as given and geolocate to [`FALLBACK_COUNTRY`].
    pub fn from_language(code: &str) -> Self {
        let language = code.trim().to_ascii_lowercase();
        let country = Language::from_code(&language)
            .map(Language::country)
            .unwrap_or(FALLBACK_COUNTRY);
        Self {
            language,
            country: country.to_string(),
        }
    }

    /// Use a caller-supplied country instead of the derived one.
    pub fn with_country(language: &str, country: &str) -> Self {
        Self {
            language: language.trim().to_ascii_lowercase(),
            country: country.trim().to_ascii_uppercase(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    /// Value of the CSE `lr` parameter.
    pub fn language_restrict(&self) -> String {
        format!("lang_{}", self.language)
    }

    pub fn is_known_language(&self) -> bool {
        Language::from_code(&self.language).is_some()
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::from_language(Language::Cs.code())
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.language, self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_language_maps_to_its_country() {
        let expected = [
            ("cs", "CZ"),
            ("sk", "SK"),
            ("pl", "PL"),
            ("de", "DE"),
            ("fr", "FR"),
            ("en", "US"),
            ("es", "ES"),
            ("it", "IT"),
        ];
        for (lang, country) in expected {
            let locale = Locale::from_language(lang);
            assert_eq!(locale.country(), country, "language {}", lang);
            assert_eq!(locale.language_restrict(), format!("lang_{}", lang));
        }
    }

    #[test]
    fn unknown_language_falls_back_to_us() {
        let locale = Locale::from_language("ja");
        assert_eq!(locale.language(), "ja");
        assert_eq!(locale.country(), "US");
        assert!(!locale.is_known_language());
    }

    #[test]
    fn codes_are_normalized() {
        let locale = Locale::from_language(" DE ");
        assert_eq!(locale.language(), "de");
        assert_eq!(locale.country(), "DE");
    }

    #[test]
    fn explicit_country_overrides_table() {
        let locale = Locale::with_country("en", "gb");
        assert_eq!(locale.country(), "GB");
        assert_eq!(locale.to_string(), "en-GB");
    }

    #[test]
    fn default_is_czech() {
        assert_eq!(Locale::default().to_string(), "cs-CZ");
    }
}
