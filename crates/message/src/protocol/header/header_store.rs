use std::collections::HashMap;

use serde_json::Value;

use super::{Header, HeaderValues};
use crate::json_type;
use crate::protocol::ValidationError;

/// One entry given to [`HeaderStore::from_entries`]: either bare values, named by the
/// entry key, or a complete header that brings its own name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderEntry {
    Values(HeaderValues),
    Header(Header),
}

impl From<HeaderValues> for HeaderEntry {
    fn from(values: HeaderValues) -> Self {
        HeaderEntry::Values(values)
    }
}

macro_rules! entry_from_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for HeaderEntry {
                fn from(values: $ty) -> Self {
                    HeaderEntry::Values(values.into())
                }
            }
        )*
    };
}

entry_from_values!(&str, String, Vec<String>, Vec<&str>);

impl<const N: usize> From<[&str; N]> for HeaderEntry {
    fn from(values: [&str; N]) -> Self {
        HeaderEntry::Values(values.into())
    }
}

impl From<Header> for HeaderEntry {
    fn from(header: Header) -> Self {
        HeaderEntry::Header(header)
    }
}

/// An immutable, case-insensitive collection of headers.
///
/// Holds at most one [`Header`] per lower-cased name and keeps headers in insertion
/// order. Replacing a header keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderStore {
    headers: Vec<(String, Header)>,
    // lower-cased name to position in `headers`
    index: HashMap<String, usize>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from name-value pairs; a later entry replaces an earlier one with
    /// the same name in any case.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<HeaderEntry>,
    {
        let mut store = HeaderStore::new();
        for (name, entry) in entries {
            let header = match entry.into() {
                HeaderEntry::Values(values) => Header::new(name, values),
                HeaderEntry::Header(header) => header,
            };
            store.insert(header);
        }
        store
    }

    /// Builds a store from a json object whose values are strings or arrays of strings.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        let Value::Object(map) = value else {
            return Err(ValidationError::invalid_header_value("", json_type(value)));
        };

        let mut store = HeaderStore::new();
        for (name, value) in map {
            let values = match value {
                Value::String(value) => HeaderValues::Single(value.clone()),
                Value::Array(values) => HeaderValues::Multiple(
                    values
                        .iter()
                        .map(|value| value.as_str().map(str::to_owned).ok_or_else(|| ValidationError::invalid_header_value(name, json_type(value))))
                        .collect::<Result<_, _>>()?,
                ),
                other => return Err(ValidationError::invalid_header_value(name, json_type(other))),
            };
            store.insert(Header::new(name.as_str(), values));
        }
        Ok(store)
    }

    fn insert(&mut self, header: Header) {
        let key = header.key();
        match self.index.get(&key).and_then(|&position| self.headers.get_mut(position)) {
            Some(entry) => entry.1 = header,
            None => {
                self.index.insert(key.clone(), self.headers.len());
                self.headers.push((key, header));
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if self.index.remove(key).is_none() {
            return;
        }
        self.headers.retain(|(existing, _)| existing != key);
        self.index = self.headers.iter().enumerate().map(|(position, (key, _))| (key.clone(), position)).collect();
    }

    pub fn get(&self, name: &str) -> Option<&Header> {
        let key = name.to_ascii_lowercase();
        self.index.get(&key).and_then(|&position| self.headers.get(position)).map(|(_, header)| header)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the comma-joined values of a header, or an empty string if it is absent.
    pub fn line(&self, name: &str) -> String {
        self.get(name).map(Header::value).unwrap_or_default()
    }

    /// Returns the values of a header, empty if it is absent.
    pub fn values(&self, name: &str) -> Vec<String> {
        self.get(name).map(Header::values).unwrap_or_default()
    }

    /// Derives a store holding `header`, replacing any header of the same name.
    pub fn with_header(&self, header: Header) -> Self {
        let mut store = self.clone();
        store.insert(header);
        store
    }

    /// Derives a store where the values of `header` are appended to those of an existing
    /// header of the same name. The merged header takes the name of `header`.
    pub fn with_added_header(&self, header: Header) -> Self {
        let Some(existing) = self.get(header.name()) else {
            return self.with_header(header);
        };

        let mut values = existing.values();
        values.extend(header.values());
        self.with_header(Header::new(header.name(), values))
    }

    /// Derives a store without the header of the given name, in any case.
    pub fn without_header(&self, name: &str) -> Self {
        let mut store = self.clone();
        store.remove(&name.to_ascii_lowercase());
        store
    }

    /// Returns every header as name and values, in insertion order.
    pub fn to_map(&self) -> Vec<(String, Vec<String>)> {
        self.headers.iter().map(|(_, header)| (header.name().to_owned(), header.values())).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter().map(|(_, header)| header)
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl<K: Into<String>, V: Into<HeaderEntry>> FromIterator<(K, V)> for HeaderStore {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        HeaderStore::from_entries(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn store() -> HeaderStore {
        HeaderStore::from_entries([("header1", HeaderValues::from(["foo", "bar"])), ("header2", HeaderValues::from("baz"))])
    }

    #[test]
    fn test_to_map() {
        let expected = vec![
            ("header1".to_owned(), vec!["foo".to_owned(), "bar".to_owned()]),
            ("header2".to_owned(), vec!["baz".to_owned()]),
        ];
        assert_eq!(store().to_map(), expected);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let store = store();

        assert!(store.has("header1"));
        assert!(store.has("Header1"));
        assert!(store.has("HEADER1"));
        assert!(!store.has("header3"));
        assert_eq!(store.get("HEADER2").map(Header::name), Some("header2"));
        assert_eq!(store.line("Header1"), "foo, bar");
        assert_eq!(store.line("header3"), "");
        assert!(store.values("header3").is_empty());
    }

    #[test]
    fn test_with_header_replaces_in_place() {
        let original = store();
        let replaced = original.with_header(Header::new("HEADER1", "test"));

        assert_eq!(replaced.line("header1"), "test");
        assert_eq!(replaced.iter().map(Header::name).collect::<Vec<_>>(), vec!["HEADER1", "header2"]);
        assert_eq!(original.line("header1"), "foo, bar");
    }

    #[test]
    fn test_with_added_header_appends_values() {
        let original = store();
        let added = original.with_added_header(Header::new("header1", "baz"));

        assert_eq!(added.values("header1"), vec!["foo", "bar", "baz"]);
        assert_eq!(original.values("header1"), vec!["foo", "bar"]);

        let added = original.with_added_header(Header::new("header3", "qux"));
        assert_eq!(added.line("header3"), "qux");
    }

    #[test]
    fn test_without_header_normalizes_case() {
        let original = store();
        let removed = original.without_header("Header2");

        assert!(!removed.has("header2"));
        assert_eq!(removed.len(), 1);
        assert_eq!(original.len(), 2);
    }

    #[test]
    fn test_from_entries_with_header_uses_header_name() {
        let store = HeaderStore::from_entries([("ignored", HeaderEntry::from(Header::new("X-Trace", "abc")))]);

        assert!(store.has("x-trace"));
        assert!(!store.has("ignored"));
    }

    #[test]
    fn test_from_json() {
        let store = HeaderStore::from_json(&json!({"Accept": ["text/html", "application/json"], "Host": "example.com"})).unwrap();

        assert_eq!(store.line("accept"), "text/html, application/json");
        assert_eq!(store.line("host"), "example.com");
    }

    #[test]
    fn test_from_json_rejects_invalid_value_type() {
        let error = HeaderStore::from_json(&json!({"Content-Length": 42})).unwrap_err();
        assert_matches!(error, ValidationError::InvalidHeaderValue { name, value_type } if name == "Content-Length" && value_type == "number");

        let error = HeaderStore::from_json(&json!({"Accept": ["text/html", null]})).unwrap_err();
        assert_matches!(error, ValidationError::InvalidHeaderValue { value_type, .. } if value_type == "null");
    }

    #[test]
    fn test_from_json_keeps_document_order() {
        let store = HeaderStore::from_json(&json!({"Zeta": "1", "Alpha": "2", "Mid": ["3", "4"]})).unwrap();

        let names: Vec<_> = store.iter().map(Header::name).collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_lookup_after_removal() {
        let store = HeaderStore::from_entries([("a", "1"), ("B", "2"), ("c", "3"), ("D", "4")]);
        let removed = store.without_header("b").with_header(Header::new("C", "33")).with_header(Header::new("e", "5"));

        assert_eq!(removed.iter().map(Header::name).collect::<Vec<_>>(), vec!["a", "C", "D", "e"]);
        assert_eq!(removed.line("c"), "33");
        assert_eq!(removed.line("d"), "4");
        assert!(!removed.has("b"));
        assert_eq!(store.line("b"), "2");
    }
}
