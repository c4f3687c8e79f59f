//! Letter-case classification of heading text.

use std::sync::OnceLock;

use regex::Regex;

use crate::models::TextCase;

/// Words of up to this many letters may stay lowercase in title case ("of", "the", "with").
const TITLE_CASE_EXEMPT_LEN: usize = 4;

struct Decorations {
    link: Regex,
    code: Regex,
    bold_asterisk: Regex,
    bold_underscore: Regex,
    italic_asterisk: Regex,
    italic_underscore: Regex,
    leading_hashes: Regex,
    word: Regex,
}

fn decorations() -> &'static Decorations {
    static DECORATIONS: OnceLock<Decorations> = OnceLock::new();
    DECORATIONS.get_or_init(|| {
        let re = |pattern: &str| Regex::new(pattern).expect("Invalid case classifier regex");
        Decorations {
            link: re(r"\[([^\]]+)\]\([^)]+\)"),
            code: re(r"`[^`]+`"),
            bold_asterisk: re(r"\*\*(.*?)\*\*"),
            bold_underscore: re(r"__(.*?)__"),
            italic_asterisk: re(r"\*(.*?)\*"),
            italic_underscore: re(r"_(.*?)_"),
            leading_hashes: re(r"^#+\s*"),
            word: re(r"\b[A-Za-z]+\b"),
        }
    })
}

/// Removes links, code spans, emphasis wrappers and a leading `#` run,
/// keeping the visible text.
fn strip_markdown(text: &str) -> String {
    let d = decorations();
    let cleaned = d.link.replace_all(text, "$1");
    let cleaned = d.code.replace_all(&cleaned, "");
    let cleaned = d.bold_asterisk.replace_all(&cleaned, "$1");
    let cleaned = d.bold_underscore.replace_all(&cleaned, "$1");
    let cleaned = d.italic_asterisk.replace_all(&cleaned, "$1");
    let cleaned = d.italic_underscore.replace_all(&cleaned, "$1");
    let cleaned = d.leading_hashes.replace(&cleaned, "");
    cleaned.trim().to_string()
}

fn is_upper(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_uppercase())
}

fn is_lower(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_lowercase())
}

/// First letter uppercase, remainder lowercase.
fn is_capitalized(word: &str) -> bool {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.is_ascii_uppercase() && chars.all(|c| c.is_ascii_lowercase()),
        None => false,
    }
}

/// Classifies the letter case of `text` after stripping inline markdown.
///
/// Only maximal runs of ASCII letters bounded by word boundaries count as
/// words, so `PHQ-9` is all caps and `v2` contributes nothing.
pub fn detect_text_case(text: &str) -> TextCase {
    let cleaned = strip_markdown(text);
    if cleaned.is_empty() {
        return TextCase::Unknown;
    }

    let words: Vec<&str> = decorations()
        .word
        .find_iter(&cleaned)
        .map(|m| m.as_str())
        .collect();
    let Some((first, rest)) = words.split_first() else {
        return TextCase::Unknown;
    };

    // Checked before title case: a lone uppercase word passes both.
    if words.iter().all(|w| is_upper(w)) {
        return TextCase::AllCaps;
    }
    if words.iter().all(|w| is_lower(w)) {
        return TextCase::AllLowercase;
    }
    if words
        .iter()
        .all(|w| w.len() <= TITLE_CASE_EXEMPT_LEN || is_capitalized(w))
    {
        return TextCase::TitleCase;
    }
    if is_capitalized(first) && rest.iter().all(|w| is_lower(w)) {
        return TextCase::SentenceCase;
    }
    TextCase::Unknown
}
