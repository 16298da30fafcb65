use html2text::from_read;
use regex::Regex;
use std::sync::OnceLock;

fn url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"https?://[^\s)\]]+").expect("url pattern is valid"))
}

fn whitespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Markdown emphasis html2text leaves behind; a speech engine would read it aloud
fn emphasis_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*{1,2}|_{2}|`").expect("emphasis pattern is valid"))
}

/// Clean text by removing HTML tags and URLs and normalizing whitespace
pub fn clean_text(text: &str) -> String {
    // Convert HTML to plain text
    let plain_text = from_read(text.as_bytes(), usize::MAX);

    let without_urls = url_pattern().replace_all(&plain_text, "");
    let without_emphasis = emphasis_pattern().replace_all(&without_urls, "");
    let normalized = whitespace_pattern().replace_all(&without_emphasis, " ");

    normalized.trim().to_string()
}
