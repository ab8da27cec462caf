//! Query parameter values.
//!
//! [`QueryParameters`] is an ordered mapping from keys to [`QueryValue`]s, where a value is
//! either a plain string or a nested parameter set. Nested sets are rendered with the
//! bracket syntax (`param[key]=value`) by [`crate::codec::query_codec`].
//!
//! Unlike the other value objects of this crate, `QueryParameters` is mutated in place
//! through [`QueryParameters::add_parameters`] and [`QueryParameters::remove_parameters`].
//! It is a short-lived builder: [`crate::protocol::Uri`] parses its raw query into one,
//! edits it and serializes it back into a freshly derived uri.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::codec::query_codec;
use crate::json_type;
use crate::protocol::{ParseError, ValidationError};

/// A single query value, either a string leaf or a nested parameter set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Scalar(String),
    Nested(QueryParameters),
}

impl QueryValue {
    /// Creates a nested value keyed by position, the way a plain list is rendered as
    /// `name[0]=a&name[1]=b`.
    pub fn list<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<QueryValue>,
    {
        let nested = values.into_iter().enumerate().map(|(index, value)| (index.to_string(), value)).collect();
        QueryValue::Nested(nested)
    }

    /// Returns the string leaf, or `None` for a nested value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Scalar(value) => Some(value),
            QueryValue::Nested(_) => None,
        }
    }

    /// Returns the nested parameter set, or `None` for a string leaf.
    pub fn as_nested(&self) -> Option<&QueryParameters> {
        match self {
            QueryValue::Scalar(_) => None,
            QueryValue::Nested(nested) => Some(nested),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Scalar(value.to_owned())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Scalar(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Scalar(value.clone())
    }
}

/// `true` becomes `"1"` and `false` the empty string, as most form handlers expect.
impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Scalar(if value { "1".to_owned() } else { String::new() })
    }
}

macro_rules! scalar_from_number {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    QueryValue::Scalar(value.to_string())
                }
            }
        )*
    };
}

scalar_from_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<QueryParameters> for QueryValue {
    fn from(value: QueryParameters) -> Self {
        QueryValue::Nested(value)
    }
}

impl<V: Into<QueryValue>> From<Vec<V>> for QueryValue {
    fn from(values: Vec<V>) -> Self {
        QueryValue::list(values)
    }
}

impl<V: Into<QueryValue>, const N: usize> From<[V; N]> for QueryValue {
    fn from(values: [V; N]) -> Self {
        QueryValue::list(values)
    }
}

/// An ordered set of query parameters.
///
/// Keys are unique; assigning an existing key replaces its value in place, so the key
/// keeps the position of its first occurrence. Lookups go through a key index, so
/// building a set of n parameters stays linear.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    entries: Vec<(String, QueryValue)>,
    // key to position in `entries`
    index: HashMap<String, usize>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds parameters from dynamically typed data.
    ///
    /// Objects become keyed sets, arrays positional sets, and numbers or booleans are
    /// stringified. A `null` anywhere in the tree is rejected with the `a->b` path of the
    /// offending key. The top level must be an object or an array.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ValidationError> {
        if !value.is_object() && !value.is_array() {
            return Err(ValidationError::not_a_parameter_set(json_type(value)));
        }
        query_codec::validate(value)?;
        match json_to_value(value) {
            QueryValue::Nested(parameters) => Ok(parameters),
            QueryValue::Scalar(_) => Err(ValidationError::not_a_parameter_set(json_type(value))),
        }
    }

    /// Sets `key` to `value`, replacing an existing value in place.
    pub fn insert<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<QueryValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.index.get(&key).and_then(|&position| self.entries.get_mut(position)) {
            Some(entry) => entry.1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    /// Adds the given parameters, overriding the values of keys that already exist.
    pub fn add_parameters<I, K, V>(&mut self, parameters: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<QueryValue>,
    {
        for (key, value) in parameters {
            self.insert(key, value);
        }
    }

    /// Removes the parameters with the given keys. Unknown keys are ignored.
    pub fn remove_parameters<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut removed = false;
        for key in keys {
            removed |= self.index.remove(key.as_ref()).is_some();
        }
        if removed {
            self.entries.retain(|(existing, _)| self.index.contains_key(existing));
            self.index = self.entries.iter().enumerate().map(|(position, (key, _))| (key.clone(), position)).collect();
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.index.get(key).and_then(|&position| self.entries.get(position)).map(|(_, value)| value)
    }

    /// Returns the value of `key` if it is a string leaf.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(QueryValue::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

fn json_to_value(value: &serde_json::Value) -> QueryValue {
    use serde_json::Value;

    match value {
        Value::Object(map) => QueryValue::Nested(map.iter().map(|(key, value)| (key.clone(), json_to_value(value))).collect()),
        Value::Array(values) => QueryValue::list(values.iter().map(json_to_value)),
        Value::String(value) => QueryValue::Scalar(value.clone()),
        Value::Number(number) => QueryValue::Scalar(number.to_string()),
        Value::Bool(flag) => QueryValue::from(*flag),
        // rejected by query_codec::validate before conversion
        Value::Null => QueryValue::Scalar(String::new()),
    }
}

impl<K: Into<String>, V: Into<QueryValue>> FromIterator<(K, V)> for QueryParameters {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut parameters = QueryParameters::new();
        parameters.add_parameters(iter);
        parameters
    }
}

impl<K: Into<String>, V: Into<QueryValue>> From<Vec<(K, V)>> for QueryParameters {
    fn from(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, V: Into<QueryValue>, const N: usize> From<[(K, V); N]> for QueryParameters {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for QueryParameters {
    type Item = (String, QueryValue);
    type IntoIter = std::vec::IntoIter<(String, QueryValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for QueryParameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Renders the parameters as a query string without the leading `?`.
impl fmt::Display for QueryParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&query_codec::serialize(self))
    }
}

impl FromStr for QueryParameters {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        query_codec::parse(s)
    }
}
