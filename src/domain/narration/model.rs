use super::language::LanguageCode;
use serde::{Deserialize, Serialize};

/// Raw narration as produced upstream, before framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrationText {
    pub raw: String,
    pub language: LanguageCode,
    /// Canonical opening line to enforce
    pub intro: Option<String>,
    /// Canonical closing line to enforce
    pub outro: Option<String>,
}

impl NarrationText {
    pub fn new(raw: impl Into<String>, language: LanguageCode) -> Self {
        Self {
            raw: raw.into(),
            language,
            intro: None,
            outro: None,
        }
    }

    pub fn with_intro(mut self, intro: impl Into<String>) -> Self {
        self.intro = Some(intro.into());
        self
    }

    pub fn with_outro(mut self, outro: impl Into<String>) -> Self {
        self.outro = Some(outro.into());
        self
    }
}

/// A bounded slice of narration text with a fixed position in the sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub index: usize,
    pub text: String,
    /// Length in chars, not bytes
    pub char_count: usize,
}

impl Segment {
    pub fn new(index: usize, text: String) -> Self {
        let char_count = text.chars().count();
        Self {
            index,
            text,
            char_count,
        }
    }
}
