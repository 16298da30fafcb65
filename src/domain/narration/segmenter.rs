use super::model::Segment;
use regex::Regex;
use std::sync::OnceLock;

/// Terminal punctuation, optional closing quotes/brackets, then whitespace or end of text.
/// The match (delimiter plus trailing whitespace) stays with its sentence.
fn sentence_boundary() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"[.!?…]+["'”’»)\]]*(?:\s+|$)"#).expect("sentence boundary pattern is valid")
    })
}

/// A word and the whitespace around it. Leading whitespace only occurs on the first word.
fn word_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s*\S+\s*").expect("word token pattern is valid"))
}

/// Splits narration into ordered, bounded segments without losing a single character.
#[derive(Debug, Clone)]
pub struct TextSegmenter {
    bound: usize,
}

impl TextSegmenter {
    pub fn new(bound: usize) -> Self {
        Self {
            bound: bound.max(1),
        }
    }

    pub fn bound(&self) -> usize {
        self.bound
    }

    /// Greedily pack sentences into segments of at most `bound` chars.
    /// Concatenating the returned texts in order yields `text` exactly.
    pub fn segment(&self, text: &str) -> Vec<Segment> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut packer = Packer::new(self.bound);

        for sentence in split_keeping(text, sentence_boundary()) {
            if char_len(sentence) > self.bound {
                // Too long on its own: pack its words into segments of their own
                packer.flush();
                for word in split_keeping(sentence, word_token()) {
                    packer.push(word);
                }
                packer.flush();
            } else {
                packer.push(sentence);
            }
        }

        let segments = packer.finish();

        tracing::debug!(
            segment_count = segments.len(),
            text_length = char_len(text),
            bound = self.bound,
            "Text split into segments"
        );

        segments
    }
}

/// Convenience wrapper for one-off calls.
pub fn segment(text: &str, bound: usize) -> Vec<Segment> {
    TextSegmenter::new(bound).segment(text)
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` after every match of `pattern`, keeping all characters.
fn split_keeping<'a>(text: &'a str, pattern: &Regex) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut last_end = 0;

    for mat in pattern.find_iter(text) {
        if mat.end() > last_end {
            pieces.push(&text[last_end..mat.end()]);
            last_end = mat.end();
        }
    }

    if last_end < text.len() {
        pieces.push(&text[last_end..]);
    }

    pieces
}

struct Packer {
    bound: usize,
    segments: Vec<Segment>,
    buffer: String,
    buffer_chars: usize,
}

impl Packer {
    fn new(bound: usize) -> Self {
        Self {
            bound,
            segments: Vec::new(),
            buffer: String::new(),
            buffer_chars: 0,
        }
    }

    fn push(&mut self, piece: &str) {
        let piece_chars = char_len(piece);

        if self.buffer_chars + piece_chars > self.bound {
            self.flush();
        }

        // An oversized single token lands alone in a fresh buffer and is flushed next time
        self.buffer.push_str(piece);
        self.buffer_chars += piece_chars;
    }

    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.buffer);
        self.segments.push(Segment::new(self.segments.len(), text));
        self.buffer_chars = 0;
    }

    fn finish(mut self) -> Vec<Segment> {
        self.flush();
        self.segments
    }
}
