//! Word-boundary aware matching on lowercase text.

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// True if `term` occurs in `text` as a whole word or phrase.
///
/// Both arguments are expected to be lowercase already.
pub fn contains_term(text: &str, term: &str) -> bool {
    find_term(text, term).is_some()
}

/// Byte offset of the first whole-word occurrence of `term` in `text`.
pub fn find_term(text: &str, term: &str) -> Option<usize> {
    if term.is_empty() {
        return None;
    }

    text.match_indices(term).map(|(idx, _)| idx).find(|&idx| {
        let before_ok = text[..idx].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = text[idx + term.len()..].chars().next().map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

/// True if some word in `text` starts with `prefix` (e.g. `temp` in "temperature").
pub fn contains_word_prefix(text: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }

    text.match_indices(prefix)
        .any(|(idx, _)| text[..idx].chars().next_back().map_or(true, |c| !is_word_char(c)))
}

/// Capitalize the first letter of each whitespace separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
