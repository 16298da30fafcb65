use lingua::{Language, LanguageDetectorBuilder};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// ISO 639-1 language codes supported by the narration pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageCode {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
}

impl LanguageCode {
    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Italian => "it",
            LanguageCode::Portuguese => "pt",
        }
    }

    /// Convert lingua Language to LanguageCode
    pub fn from_lingua(language: Language) -> Option<Self> {
        match language {
            Language::English => Some(LanguageCode::English),
            Language::Spanish => Some(LanguageCode::Spanish),
            Language::French => Some(LanguageCode::French),
            Language::German => Some(LanguageCode::German),
            Language::Italian => Some(LanguageCode::Italian),
            Language::Portuguese => Some(LanguageCode::Portuguese),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LanguageCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        let primary = code.split(['-', '_']).next().unwrap_or_default();
        match primary {
            "en" => Ok(LanguageCode::English),
            "es" => Ok(LanguageCode::Spanish),
            "fr" => Ok(LanguageCode::French),
            "de" => Ok(LanguageCode::German),
            "it" => Ok(LanguageCode::Italian),
            "pt" => Ok(LanguageCode::Portuguese),
            _ => Err(format!("Unsupported language: {}", s)),
        }
    }
}

/// Detect the language of the given text
/// Returns LanguageCode or defaults to English
pub fn detect_language(text: &str) -> LanguageCode {
    // Build detector with our supported languages
    let languages = vec![
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
    ];

    let detector = LanguageDetectorBuilder::from_languages(&languages).build();

    detector
        .detect_language_of(text)
        .and_then(LanguageCode::from_lingua)
        .unwrap_or(LanguageCode::English)
}
