//! BIOS description cleanup.
//!
//! Vendor descriptions are small HTML fragments such as
//! `<p>Improve system stability.</p><p>Support M.2 RAID.</p>`.

use std::sync::OnceLock;

use regex::Regex;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("static regex"))
}

fn m2_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)m\.2").expect("static regex"))
}

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Remove every `<...>` tag, leaving the text between them.
pub fn strip_tags(raw: &str) -> String {
    tag_re().replace_all(raw, "").into_owned()
}

/// Split a description into release notes, one per sentence, in order.
///
/// `m.2` (any case) becomes `M2` first so the slot name survives the split
/// on `.`.  Fragments are trimmed and empty ones dropped.
pub fn notes(raw: &str) -> Vec<String> {
    let stripped = strip_tags(raw);
    let text = m2_re().replace_all(&stripped, "M2");
    text.split('.')
        .map(str::trim)
        .filter(|note| !note.is_empty())
        .map(str::to_string)
        .collect()
}

/// Single-line description: tags removed, whitespace runs collapsed.
pub fn plain_description(raw: &str) -> String {
    let text = strip_tags(raw);
    let collapsed = space_re().replace_all(text.trim(), " ");
    collapsed.into_owned()
}
