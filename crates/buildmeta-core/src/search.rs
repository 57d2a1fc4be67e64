//! Search links: a link to all builds recorded with the same custom value.

use url::form_urlencoded;

use crate::fact::Fact;

/// Placeholder resolved by the server when the link is opened.
pub const SCAN_ID_PLACEHOLDER: &str = "{SCAN_ID}";

/// Form-encode a query component (space becomes `+`).
pub fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// Append `suffix` unless `s` already ends with it.
pub(crate) fn append_if_missing(s: &str, suffix: &str) -> String {
    if s.ends_with(suffix) {
        s.to_string()
    } else {
        format!("{s}{suffix}")
    }
}

/// Link labelled `"<label> build scans"` querying builds with `label = value`.
pub fn search_link(server: &str, label: &str, value: &str) -> Fact {
    let url = format!(
        "{}scans?search.names={}&search.values={}#selection.buildScanB={}",
        append_if_missing(server, "/"),
        encode(label),
        encode(value),
        encode(SCAN_ID_PLACEHOLDER),
    );
    Fact::link(format!("{label} build scans"), url)
}

/// The value itself plus, when a server is known, its search link.
pub fn value_with_search_link(server: Option<&str>, label: &str, value: &str) -> Vec<Fact> {
    let mut facts = vec![Fact::value(label, value)];
    if let Some(server) = server {
        facts.push(search_link(server, label, value));
    }
    facts
}
