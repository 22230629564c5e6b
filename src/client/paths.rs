//! Path template expansion and segment encoding.

use std::collections::HashMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters that are NOT percent-encoded in a substituted path segment.
///
/// Everything outside the RFC 3986 unreserved set is encoded, including `%`
/// itself, so a value carrying pre-encoded octets reaches the server intact:
/// `%2F` is sent as `%252F` and can never be reinterpreted as a path
/// boundary. Space encodes to `%20` (never `+`), and `+` to `%2B`.
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encode a raw parameter value as one opaque path segment.
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT_SET).to_string()
}

/// Replace each `{name}` placeholder in `template` with the encoded value of
/// the matching parameter. Parameters without a placeholder are ignored.
pub fn expand_path_template(template: &str, params: &HashMap<String, String>) -> String {
    let mut path = template.to_string();
    for (name, value) in params {
        let placeholder = format!("{{{name}}}");
        if path.contains(&placeholder) {
            path = path.replace(&placeholder, &encode_path_segment(value));
        }
    }
    path
}
