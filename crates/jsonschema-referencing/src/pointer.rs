//! JSON pointer fragments, as found after the `#` of a reference.
use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::Error;

/// Decode one pointer segment: `~1` becomes `/`, `~0` becomes `~`, then
/// percent-escapes are decoded.
///
/// # Errors
///
/// Returns an error if the percent-decoded bytes are not valid UTF-8.
pub fn decode_component(segment: &str) -> Result<Cow<'_, str>, Error> {
    let unescaped = unescape_segment(segment);
    if !unescaped.contains('%') {
        return Ok(unescaped);
    }
    let decoded = percent_decode_str(&unescaped)
        .decode_utf8()
        .map_err(|error| Error::invalid_pointer(segment, error))?;
    Ok(Cow::Owned(decoded.into_owned()))
}

/// Unescape `~1` and `~0` in a single pointer segment.
#[must_use]
pub fn unescape_segment(segment: &str) -> Cow<'_, str> {
    if !segment.contains('~') {
        return Cow::Borrowed(segment);
    }
    Cow::Owned(segment.replace("~1", "/").replace("~0", "~"))
}

/// Walk `fragment` (e.g. `/definitions/a` or `/items/0`) from `document`.
///
/// # Errors
///
/// Returns an error if a segment cannot be decoded or the target does not exist.
pub fn resolve<'a>(document: &'a Value, fragment: &str) -> Result<&'a Value, Error> {
    if fragment.is_empty() {
        return Ok(document);
    }
    if !fragment.starts_with('/') {
        return Err(Error::unresolvable(fragment));
    }
    let mut target = document;
    for segment in fragment.split('/').skip(1) {
        let token = decode_component(segment)?;
        target = match target {
            Value::Object(map) => map.get(&*token),
            Value::Array(list) => parse_index(&token).and_then(|idx| list.get(idx)),
            _ => None,
        }
        .ok_or_else(|| Error::unresolvable(fragment))?;
    }
    Ok(target)
}

// Taken from `serde_json`.
#[must_use]
pub fn parse_index(s: &str) -> Option<usize> {
    if s.starts_with('+') || (s.starts_with('0') && s.len() != 1) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::{decode_component, parse_index, resolve};
    use serde_json::json;
    use test_case::test_case;

    #[test_case("a~1b", "a/b")]
    #[test_case("m~0n", "m~n")]
    #[test_case("~01", "~1"; "tilde first")]
    #[test_case("c%25d", "c%d")]
    #[test_case("%22", "\"")]
    #[test_case("plain", "plain")]
    fn decode_components(segment: &str, expected: &str) {
        assert_eq!(decode_component(segment).expect("Valid segment"), expected);
    }

    #[test]
    fn invalid_percent_encoding() {
        assert!(decode_component("%FF").is_err());
    }

    #[test_case("", &json!({"a": [1, {"b": 2}]}))]
    #[test_case("/a/1/b", &json!(2))]
    #[test_case("/a/0", &json!(1))]
    fn resolves_fragments(fragment: &str, expected: &serde_json::Value) {
        let document = json!({"a": [1, {"b": 2}]});
        assert_eq!(resolve(&document, fragment).expect("Existing target"), expected);
    }

    #[test_case("/missing")]
    #[test_case("/a/01")]
    #[test_case("/a/5")]
    #[test_case("a")]
    fn unresolvable_fragments(fragment: &str) {
        let document = json!({"a": [1, {"b": 2}]});
        assert!(resolve(&document, fragment).is_err());
    }

    #[test_case("0", Some(0))]
    #[test_case("12", Some(12))]
    #[test_case("012", None)]
    #[test_case("+1", None)]
    #[test_case("-1", None)]
    fn indices(s: &str, expected: Option<usize>) {
        assert_eq!(parse_index(s), expected);
    }
}
