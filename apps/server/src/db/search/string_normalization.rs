use unicode_normalization::UnicodeNormalization;

/// Canonical form for free-text filter values.
///
/// NFKC-normalizes, trims, collapses runs of whitespace to a single space and
/// lowercases. Returns `None` when nothing is left, so blank filters count as
/// absent.
pub fn normalize_filter_text(input: &str) -> Option<String> {
    let composed: String = input.nfkc().collect();
    let collapsed = composed.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.to_lowercase())
}

/// Escape `LIKE`/`ILIKE` wildcards so the value matches literally.
///
/// The result is meant to be used with the default `\` escape character.
pub fn escape_like_pattern(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
