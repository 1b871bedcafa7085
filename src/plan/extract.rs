//! Sentence extraction for caption candidates

/// Split free-form text into trimmed, non-empty sentences.
///
/// `?` and `!` terminate sentences the same way `.` does; the terminator
/// itself is dropped. No limit is applied here.
#[must_use]
pub fn split_sentences(text: &str) -> Vec<String> {
    text.split(['.', '?', '!'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}
