//! Small string helpers shared by scoring, selection and address synthesis.

/// True if `term` occurs in `haystack` on word boundaries.
///
/// Both inputs are expected lowercase. A boundary is only required on a side
/// where the term itself starts/ends with an alphanumeric character, so
/// `"ex-"` matches `"ex-google"` and `"cto"` does not match `"director"`.
pub fn contains_term(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }

    let check_start = term.chars().next().is_some_and(char::is_alphanumeric);
    let check_end = term.chars().next_back().is_some_and(char::is_alphanumeric);

    haystack.match_indices(term).any(|(start, _)| {
        let end = start + term.len();
        let before_ok = !check_start
            || haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = !check_end
            || haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());
        before_ok && after_ok
    })
}

/// True if a word in `haystack` starts with `term`.
///
/// Only the left side needs a boundary, so `"former"` matches `"formerly"`
/// and `"hr"` matches `"hrbp"`, but `"hr"` still misses `"three"`.
pub fn contains_prefix(haystack: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }

    let check_start = term.chars().next().is_some_and(char::is_alphanumeric);
    haystack.match_indices(term).any(|(start, _)| {
        !check_start
            || haystack[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
    })
}

/// Lowercases and keeps only ASCII letters and digits.
pub fn ascii_slug(input: &str) -> String {
    input
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
