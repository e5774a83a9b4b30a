use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Word characters: ASCII letters, the accented vowels seen in Setswana
/// spellings, apostrophes (straight and modifier) and hyphens.
pub(crate) static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-zÁÉÍÓÚÜÑáéíóúüñʼ'\-]+").expect("word regex is valid")
});

/// Trim, lowercase and strip accents.
pub fn normalise(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Split `text` into normalised word tokens.
pub fn tokenise(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| normalise(m.as_str()))
        .collect()
}
