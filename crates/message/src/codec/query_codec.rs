//! Query string parsing and serialization.
//!
//! The wire format is an `&`-joined list of `urlencode(key)=urlencode(value)` segments.
//! Nested parameter sets are flattened into `parent[child]=value` segments, recursively.
//!
//! Parsing is deliberately simple and mirrors long-standing behavior that callers depend
//! on: the whole string is percent-decoded *before* it is split, every segment must hold
//! exactly one `=`, and the last occurrence of a duplicated key wins. Bracketed keys are
//! not expanded back into nested sets, so only flat parameter sets round-trip.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use serde_json::Value;

use crate::protocol::{ParseError, QueryParameters, QueryValue, ValidationError};
use crate::utils::ensure;

/// Characters escaped by [`url_encode`]: everything except ASCII alphanumerics and `-_.`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Parses a raw query string into parameters.
///
/// At most one leading `?` is stripped. Empty or whitespace-only input yields empty
/// parameters.
///
/// # Errors
///
/// - [`ParseError::NonLeadingQuestionMark`] if a `?` occurs after the first character
/// - [`ParseError::MissingSeparator`] if a segment does not contain exactly one `=`
pub fn parse(raw: &str) -> Result<QueryParameters, ParseError> {
    if raw.trim().is_empty() {
        return Ok(QueryParameters::new());
    }

    let raw = raw.strip_prefix('?').unwrap_or(raw);
    ensure!(!raw.contains('?'), ParseError::NonLeadingQuestionMark);

    let decoded = url_decode(raw);
    let mut parameters = QueryParameters::new();

    for segment in decoded.split('&') {
        let mut parts = segment.split('=');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(value), None) => parameters.insert(key, value),
            _ => return Err(ParseError::missing_separator(segment)),
        }
    }

    Ok(parameters)
}

/// Parses the query component of a full url, yielding empty parameters if it has none.
pub fn parse_from_url(url: &str) -> Result<QueryParameters, ParseError> {
    let without_fragment = url.split_once('#').map_or(url, |(before, _)| before);
    match without_fragment.split_once('?') {
        Some((_, query)) => parse(query),
        None => Ok(QueryParameters::new()),
    }
}

/// Serializes parameters into a query string, in insertion order and without a leading `?`.
pub fn serialize(parameters: &QueryParameters) -> String {
    let mut segments = Vec::with_capacity(parameters.len());

    for (key, value) in parameters.iter() {
        let name = url_encode(key);
        match value {
            QueryValue::Scalar(value) => segments.push(format!("{name}={}", url_encode(value))),
            QueryValue::Nested(nested) => serialize_nested(&name, nested, &mut segments),
        }
    }

    segments.join("&")
}

fn serialize_nested(prefix: &str, parameters: &QueryParameters, segments: &mut Vec<String>) {
    for (key, value) in parameters.iter() {
        let name = format!("{prefix}[{}]", url_encode(key));
        match value {
            QueryValue::Scalar(value) => segments.push(format!("{name}={}", url_encode(value))),
            QueryValue::Nested(nested) => serialize_nested(&name, nested, segments),
        }
    }
}

/// Checks that every leaf of dynamically typed query data can be used as a string.
///
/// Strings, numbers and booleans are accepted; objects and arrays are checked
/// recursively. The error names the path of the rejected value with `->` between
/// levels, e.g. `param1->1`.
pub fn validate(value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Object(map) => map.iter().try_for_each(|(key, value)| validate_at(key, value)),
        Value::Array(values) => values.iter().enumerate().try_for_each(|(index, value)| validate_at(&index.to_string(), value)),
        other => validate_at("", other),
    }
}

fn validate_at(path: &str, value: &Value) -> Result<(), ValidationError> {
    match value {
        Value::Object(map) => map.iter().try_for_each(|(key, value)| validate_at(&format!("{path}->{key}"), value)),
        Value::Array(values) => {
            values.iter().enumerate().try_for_each(|(index, value)| validate_at(&format!("{path}->{index}"), value))
        }
        Value::Null => Err(ValidationError::unstringifiable_parameter(path)),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
    }
}

/// Percent-encodes a query component, writing spaces as `+`.
pub fn url_encode(input: &str) -> String {
    input.split(' ').map(|part| utf8_percent_encode(part, QUERY_COMPONENT).to_string()).collect::<Vec<_>>().join("+")
}

/// Reverses [`url_encode`]: `+` becomes a space and `%XX` sequences are decoded.
///
/// Invalid UTF-8 produced by decoding is replaced with U+FFFD.
pub fn url_decode(input: &str) -> String {
    percent_decode_str(&input.replace('+', " ")).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn flat() -> QueryParameters {
        QueryParameters::from([("param1", "foo"), ("param2", "bar"), ("param3", "baz")])
    }

    #[test]
    fn test_parse() {
        let query = parse("param1=foo&param2=bar&param3=baz").unwrap();
        assert_eq!(query, flat());
    }

    #[test]
    fn test_parse_strips_leading_question_mark() {
        let query = parse("?param1=foo&param2=bar&param3=baz").unwrap();
        assert_eq!(query, flat());
    }

    #[test]
    fn test_parse_rejects_non_leading_question_mark() {
        let result = parse("?param1=foo&param2=bar&param3?=baz");
        assert_matches!(result, Err(ParseError::NonLeadingQuestionMark));

        let result = parse("??param1=foo");
        assert_matches!(result, Err(ParseError::NonLeadingQuestionMark));
    }

    #[test]
    fn test_parse_rejects_missing_separator() {
        let error = parse("param1foo&param2=bar&param3=baz").unwrap_err();
        assert_matches!(&error, ParseError::MissingSeparator { segment } if segment == "param1foo");
        assert!(error.to_string().contains("missing expected separator"));
    }

    #[test]
    fn test_parse_rejects_extra_separator() {
        assert_matches!(parse("param1=a=b"), Err(ParseError::MissingSeparator { .. }));
    }

    #[test]
    fn test_parse_decodes_before_splitting() {
        let encoded = url_encode("param1=https://foo.com");
        assert_eq!(encoded, "param1%3Dhttps%3A%2F%2Ffoo.com");

        let query = parse(&encoded).unwrap();
        assert_eq!(query, QueryParameters::from([("param1", "https://foo.com")]));
    }

    #[test]
    fn test_parse_last_duplicate_wins() {
        let query = parse("a=1&b=2&a=3").unwrap();
        assert_eq!(query.get_str("a"), Some("3"));
        assert_eq!(query.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_from_url() {
        let query = parse_from_url("https://google.com?param1=foo&param2=bar#top").unwrap();
        assert_eq!(query, QueryParameters::from([("param1", "foo"), ("param2", "bar")]));

        assert!(parse_from_url("https://google.com/search").unwrap().is_empty());
    }

    #[test]
    fn test_serialize_flat() {
        assert_eq!(serialize(&flat()), "param1=foo&param2=bar&param3=baz");
        assert_eq!(serialize(&QueryParameters::new()), "");
    }

    #[test]
    fn test_serialize_nested_list() {
        let query = QueryParameters::from([
            ("param1", QueryValue::list(["foo", "bar"])),
            ("param2", QueryValue::from("baz")),
        ]);
        assert_eq!(serialize(&query), "param1[0]=foo&param1[1]=bar&param2=baz");
    }

    #[test]
    fn test_serialize_deeply_nested() {
        let inner = QueryParameters::from([("c", "1"), ("d", "2")]);
        let middle = QueryParameters::from([("b", inner)]);
        let query = QueryParameters::from([("a", middle)]);

        assert_eq!(serialize(&query), "a[b][c]=1&a[b][d]=2");
    }

    #[test]
    fn test_serialize_encodes_components() {
        let query = QueryParameters::from([("search term", "rust & go"), ("url", "https://foo.com/?a=b")]);
        assert_eq!(serialize(&query), "search+term=rust+%26+go&url=https%3A%2F%2Ffoo.com%2F%3Fa%3Db");
    }

    #[test]
    fn test_flat_round_trip() {
        let query = QueryParameters::from([("name", "Zava Kid"), ("lang", "rust"), ("v", "1.90")]);
        assert_eq!(parse(&serialize(&query)).unwrap(), query);
    }

    #[test]
    fn test_validate() {
        assert!(validate(&json!({"param1": ["foo", "bar"], "param2": 1})).is_ok());

        let error = validate(&json!({"param1": ["foo", null]})).unwrap_err();
        assert_matches!(error, ValidationError::UnstringifiableParameter { path } if path == "param1->1");

        let error = validate(&json!({"a": {"b": {"c": null}}})).unwrap_err();
        assert_matches!(error, ValidationError::UnstringifiableParameter { path } if path == "a->b->c");
    }

    #[test]
    fn test_url_decode() {
        assert_eq!(url_decode("a+b%2Bc"), "a b+c");
        assert_eq!(url_decode("%E4%BD%A0%E5%A5%BD"), "你好");
    }
}
