//! Emphasis for roll notation inside action text.
//!
//! Statblock text is untrusted, so it is HTML-escaped first and only then
//! wrapped in `<strong>`; the patterns never match escaped entities.

use std::sync::LazyLock;

use regex::Regex;

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // "+9 auf Treffer"
        r"[+-]\d+ auf Treffer",
        // "14 (3W6+4) Hiebschaden"
        r"\d+ \(\d+W\d+(?:[+-]\d+)?\) \w+schaden",
        // "SG-16-Weisheitsrettungswurf"
        r"SG-\d+-\w+rettungswurf",
        r"[+-]\d+ zu treffen",
        r"(?i)DC \d+",
        r"\d+d\d+[+-]\d+",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("highlight pattern compiles"))
    .collect()
});

/// Escape `text` and wrap every roll-notation match in `<strong>`.
/// Patterns run in order and may nest.
pub fn highlight(text: &str) -> String {
    PATTERNS
        .iter()
        .fold(escape_html(text), |acc, re| {
            re.replace_all(&acc, "<strong>$0</strong>").into_owned()
        })
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
