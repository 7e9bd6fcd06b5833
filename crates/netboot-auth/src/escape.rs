//! Escaping of untrusted values for LDAP search filters (RFC 4515)
//!
//! Every value that reaches a filter or DN template must pass through
//! [`escape_filter_value`] first.

use std::borrow::Cow;

/// Replacement table, applied in order. The backslash must come first so
/// that escapes produced by later entries are not escaped again.
const FILTER_ESCAPES: [(char, &str); 5] = [
    ('\\', "\\5c"),
    ('*', "\\2a"),
    ('(', "\\28"),
    (')', "\\29"),
    ('\0', "\\00"),
];

/// Escape `value` so that it cannot change the structure of a filter.
///
/// Values without special characters (including the empty string) are
/// returned borrowed.
pub fn escape_filter_value(value: &str) -> Cow<'_, str> {
    if !value.contains(|c: char| FILTER_ESCAPES.iter().any(|(special, _)| *special == c)) {
        return Cow::Borrowed(value);
    }

    let mut escaped = value.to_string();
    for (special, replacement) in FILTER_ESCAPES {
        if escaped.contains(special) {
            escaped = escaped.replace(special, replacement);
        }
    }
    Cow::Owned(escaped)
}

/// Substitute an escaped `username` into a `{username}` template
pub fn fill_username_template(template: &str, username: &str) -> String {
    template.replace("{username}", &escape_filter_value(username))
}
