use once_cell::sync::Lazy;
use regex::Regex;

/// First `References` heading (optionally numbered) and everything after it.
static REFERENCES: Lazy<Regex> = Lazy::new(|| Regex::new(r"References\s*\d*\s*[\s\S]*").unwrap());

/// Bracketed numeric markers such as `[12]`.
static FOOTNOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\d+\]").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Drop the first `References` heading and everything after it.
///
/// The match is literal and case-sensitive, so a body sentence mentioning
/// "References" also truncates the text there.
pub fn strip_references(text: &str) -> &str {
    match REFERENCES.find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}

/// Remove every `[n]` marker.
pub fn strip_footnotes(text: &str) -> String {
    FOOTNOTE.replace_all(text, "").into_owned()
}

/// Collapse whitespace runs (newlines included) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Clean text extracted from a paper before chunking.
///
/// Truncates at the references section, removes `[n]` markers, then
/// collapses whitespace and trims. The first two steps repeat until stable:
/// removing `[1]` from `[[1]2]` exposes `[2]`, and removing a marker from
/// `Refer[3]ences` exposes a heading. Repeating makes the result a fixed
/// point, so cleaning cleaned text changes nothing.
pub fn clean_text(text: &str) -> String {
    let mut current = strip_references(text).to_string();
    loop {
        let stripped = strip_footnotes(&current);
        let truncated = strip_references(&stripped);
        if truncated.len() == current.len() {
            break;
        }
        current = truncated.to_string();
    }
    normalize_whitespace(&current)
}
