use super::language::LanguageCode;
use super::model::NarrationText;
use regex::Regex;

/// How far into the head/tail to look for an existing framing line, in chars.
pub const DEFAULT_DETECTION_WINDOW: usize = 200;

/// Separator between a framing line and the body.
const LINE_BREAK: &str = "\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingPosition {
    Intro,
    Outro,
}

/// One recognizer for a phrasing that already acts as an opening or closing line.
#[derive(Debug, Clone)]
pub struct FramingRule {
    pub position: FramingPosition,
    /// `None` applies to every language
    pub language: Option<LanguageCode>,
    pub pattern: Regex,
}

/// Table of known alternate phrasings. New provider phrasings are added here, not in code paths.
#[derive(Debug, Clone)]
pub struct FramingPatterns {
    rules: Vec<FramingRule>,
}

impl FramingPatterns {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(
        mut self,
        position: FramingPosition,
        language: Option<LanguageCode>,
        pattern: &str,
    ) -> Result<Self, regex::Error> {
        self.rules.push(FramingRule {
            position,
            language,
            pattern: Regex::new(pattern)?,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn matching(
        &self,
        position: FramingPosition,
        language: LanguageCode,
    ) -> impl Iterator<Item = &Regex> {
        self.rules
            .iter()
            .filter(move |r| r.position == position && r.language.map_or(true, |l| l == language))
            .map(|r| &r.pattern)
    }
}

const DEFAULT_RULES: &[(FramingPosition, Option<LanguageCode>, &str)] = &[
    // English
    (
        FramingPosition::Intro,
        Some(LanguageCode::English),
        r"(?i)\b(?:I will now|I'll now|let me now|now I will|I am going to|I'm going to|let me) summari[sz]e\b[^.!?\n]*[.!?:]?",
    ),
    (
        FramingPosition::Intro,
        Some(LanguageCode::English),
        r"(?i)\bhere(?:'s| is) (?:a |the |your )?(?:quick |brief |short )?(?:summary|recap|rundown)\b[^.!?\n]*[.!?:]?",
    ),
    (
        FramingPosition::Intro,
        Some(LanguageCode::English),
        r"(?i)\bwelcome (?:back )?to (?:today's|this|our) (?:summary|recap|episode|briefing)\b[^.!?\n]*[.!?]?",
    ),
    (
        FramingPosition::Outro,
        Some(LanguageCode::English),
        r"(?i)\b(?:this|that|which) (?:concludes|wraps up|ends) (?:our|the|this|today's) (?:summary|recap|episode|overview|briefing)\b[^.!?\n]*[.!?]?",
    ),
    (
        FramingPosition::Outro,
        Some(LanguageCode::English),
        r"(?i)\bthanks? (?:you )?for (?:listening|watching)\b[^.!?\n]*[.!?]?",
    ),
    (
        FramingPosition::Outro,
        Some(LanguageCode::English),
        r"(?i)\bthat'?s (?:all|it) for (?:today|now)\b[^.!?\n]*[.!?]?",
    ),
    // Spanish
    (
        FramingPosition::Intro,
        Some(LanguageCode::Spanish),
        r"(?i)\b(?:a continuación|ahora) (?:les |te )?(?:resumo|resumiré|voy a resumir)\b[^.!?\n]*[.!?:]?",
    ),
    (
        FramingPosition::Outro,
        Some(LanguageCode::Spanish),
        r"(?i)\b(?:con esto|así) (?:concluye|termina|finaliza)\b[^.!?\n]*[.!?]?",
    ),
    (
        FramingPosition::Outro,
        Some(LanguageCode::Spanish),
        r"(?i)\bgracias por (?:escuchar|ver)\b[^.!?\n]*[.!?]?",
    ),
    // French
    (
        FramingPosition::Intro,
        Some(LanguageCode::French),
        r"(?i)\bje vais (?:maintenant )?résumer\b[^.!?\n]*[.!?:]?",
    ),
    (
        FramingPosition::Outro,
        Some(LanguageCode::French),
        r"(?i)\b(?:ceci|cela) conclut (?:notre|ce|le) résumé\b[^.!?\n]*[.!?]?",
    ),
    // German
    (
        FramingPosition::Intro,
        Some(LanguageCode::German),
        r"(?i)\bich fasse (?:jetzt|nun) zusammen\b[^.!?\n]*[.!?:]?",
    ),
    (
        FramingPosition::Outro,
        Some(LanguageCode::German),
        r"(?i)\bdamit (?:endet|schließt) (?:unsere|die) zusammenfassung\b[^.!?\n]*[.!?]?",
    ),
];

impl Default for FramingPatterns {
    fn default() -> Self {
        DEFAULT_RULES
            .iter()
            .fold(Self::empty(), |patterns, (position, language, pattern)| {
                patterns
                    .with_rule(*position, *language, pattern)
                    .expect("built-in framing pattern is valid")
            })
    }
}

/// Enforces canonical opening/closing lines on narration, idempotently.
#[derive(Debug, Clone)]
pub struct NarrationFramer {
    patterns: FramingPatterns,
    window: usize,
}

impl Default for NarrationFramer {
    fn default() -> Self {
        Self::new(FramingPatterns::default(), DEFAULT_DETECTION_WINDOW)
    }
}

impl NarrationFramer {
    pub fn new(patterns: FramingPatterns, window: usize) -> Self {
        Self { patterns, window }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Frame `text` with its canonical intro/outro.
    ///
    /// With `open_hook` the head is left untouched and only the outro is enforced.
    /// Never fails; at worst a missed variant means the canonical line is added anyway.
    pub fn frame(&self, text: &NarrationText, open_hook: bool) -> String {
        let intro = if open_hook {
            None
        } else {
            non_blank(text.intro.as_deref())
        };
        let outro = non_blank(text.outro.as_deref());

        if intro.is_none() && outro.is_none() {
            return text.raw.clone();
        }

        let mut body = text.raw.trim().to_string();
        let mut head_guard = 0;

        if let Some(intro) = intro {
            body = self.frame_head(&body, intro, text.language);
            head_guard = intro.len();
        }

        if let Some(outro) = outro {
            body = self.frame_tail(&body, outro, text.language, head_guard);
        }

        body
    }

    fn frame_head(&self, body: &str, intro: &str, language: LanguageCode) -> String {
        if body.starts_with(intro) {
            return body.to_string();
        }

        let window_end = byte_offset_of_char(body, self.window);
        let in_window = |m: &regex::Match| m.start() < window_end;

        // A canonical line already in the window is moved to the head, never duplicated
        let canonical = literal(intro)
            .find(body)
            .filter(in_window)
            .map(|m| (m.start(), m.end()));

        // First alternate phrasing in the window, across every recognizer
        let variant = self
            .patterns
            .matching(FramingPosition::Intro, language)
            .filter_map(|pattern| pattern.find(body))
            .filter(in_window)
            .filter(|m| !overlaps(canonical, m))
            .min_by_key(|m| m.start())
            .map(|m| (m.start(), m.end()));

        let spans: Vec<(usize, usize)> = canonical.into_iter().chain(variant).collect();
        for &(start, end) in &spans {
            tracing::debug!(removed = &body[start..end], "Replacing existing intro phrasing");
        }

        join_lines(intro, &remove_spans(body, spans))
    }

    fn frame_tail(
        &self,
        body: &str,
        outro: &str,
        language: LanguageCode,
        head_guard: usize,
    ) -> String {
        if body.ends_with(outro) && body.len() >= head_guard + outro.len() {
            return body.to_string();
        }

        let total_chars = body.chars().count();
        let window_start =
            byte_offset_of_char(body, total_chars.saturating_sub(self.window)).max(head_guard);
        let region = &body[window_start..];
        let shift = |m: regex::Match| (window_start + m.start(), window_start + m.end());

        let canonical = literal(outro).find_iter(region).last().map(shift);

        // Last alternate phrasing in the window, across every recognizer
        let variant = self
            .patterns
            .matching(FramingPosition::Outro, language)
            .filter_map(|pattern| pattern.find_iter(region).last())
            .map(shift)
            .filter(|&(start, end)| {
                canonical.map_or(true, |(c_start, c_end)| end <= c_start || start >= c_end)
            })
            .max_by_key(|&(start, _)| start);

        let spans: Vec<(usize, usize)> = canonical.into_iter().chain(variant).collect();
        for &(start, end) in &spans {
            tracing::debug!(removed = &body[start..end], "Replacing existing outro phrasing");
        }

        join_lines(&remove_spans(body, spans), outro)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn literal(line: &str) -> Regex {
    Regex::new(&regex::escape(line)).expect("escaped literal is a valid pattern")
}

fn byte_offset_of_char(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn overlaps(span: Option<(usize, usize)>, m: &regex::Match) -> bool {
    span.map_or(false, |(start, end)| m.start() < end && m.end() > start)
}

/// Cut every non-overlapping span, last first so earlier offsets stay valid.
fn remove_spans(body: &str, mut spans: Vec<(usize, usize)>) -> String {
    spans.sort_by(|a, b| b.0.cmp(&a.0));
    spans
        .into_iter()
        .fold(body.to_string(), |text, (start, end)| {
            let end = end.min(text.len());
            remove_span(&text, start.min(end), end)
        })
}

/// Cut `body[start..end]` and stitch the remainder with the whitespace that preceded the cut.
fn remove_span(body: &str, start: usize, end: usize) -> String {
    let prefix = &body[..start];
    let suffix = body[end..].trim_start();
    let kept_prefix = prefix.trim_end();

    if kept_prefix.is_empty() {
        return suffix.to_string();
    }
    if suffix.is_empty() {
        return kept_prefix.to_string();
    }

    let gap = &prefix[kept_prefix.len()..];
    let separator = if gap.is_empty() { " " } else { gap };
    format!("{}{}{}", kept_prefix, separator, suffix)
}

fn join_lines(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_string(),
        (_, true) => first.to_string(),
        _ => format!("{}{}{}", first, LINE_BREAK, second),
    }
}
