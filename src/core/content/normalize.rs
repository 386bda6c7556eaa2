// Text normalization - canonicalizes raw text before word matching.

/// Canonicalize text for matching: lowercase, strip everything that is not
/// an ASCII letter, digit, or whitespace, then collapse whitespace runs to
/// single spaces.
///
/// Non-ASCII letters are stripped along with punctuation, so non-Latin
/// scripts do not survive normalization (see the note on the built-in
/// Arabic word list in `profanity.rs`).
pub fn normalize(text: &str) -> String {
    let kept: String = text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}
