/// Removes every hyphen and lowercases the rest.
///
/// Used wherever two strings must compare equal regardless of case or
/// hyphenation (title lookup, name matching). Idempotent.
pub fn normalize(s: &str) -> String {
    s.chars().filter(|c| *c != '-').collect::<String>().to_lowercase()
}

/// Lookup key shared by every title and name index: surrounding
/// whitespace dropped, then [`normalize`]d
pub fn title_key(s: &str) -> String {
    normalize(s.trim())
}

/// True when `needle` occurs in `haystack` bounded by non-alphanumeric
/// characters (or the ends of the string) on both sides.
pub fn contains_phrase(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}
