use std::fmt;

/// The value side of a header: either one string, possibly holding comma-separated
/// values, or an explicit sequence of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValues {
    Single(String),
    Multiple(Vec<String>),
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        HeaderValues::Single(value.to_owned())
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        HeaderValues::Single(value)
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        HeaderValues::Multiple(values)
    }
}

impl From<Vec<&str>> for HeaderValues {
    fn from(values: Vec<&str>) -> Self {
        HeaderValues::Multiple(values.into_iter().map(str::to_owned).collect())
    }
}

impl<const N: usize> From<[&str; N]> for HeaderValues {
    fn from(values: [&str; N]) -> Self {
        HeaderValues::Multiple(values.into_iter().map(str::to_owned).collect())
    }
}

/// A single http header field.
///
/// The name keeps the case it was created with; lookups in a
/// [`HeaderStore`](super::HeaderStore) go through [`Header::key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    name: String,
    values: HeaderValues,
}

impl Header {
    pub fn new(name: impl Into<String>, values: impl Into<HeaderValues>) -> Self {
        Self { name: name.into(), values: values.into() }
    }

    /// Parses a `Name: value` line, splitting on the first colon and trimming both sides.
    ///
    /// A line without a colon becomes a header with an empty value.
    pub fn parse(line: &str) -> Self {
        let (name, value) = line.split_once(':').unwrap_or((line, ""));
        Self::new(name.trim(), value.trim())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The lower-cased name used as lookup key.
    pub fn key(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    /// Returns the value as one string, joining a value sequence with `", "`.
    pub fn value(&self) -> String {
        match &self.values {
            HeaderValues::Single(value) => value.clone(),
            HeaderValues::Multiple(values) => values.join(", "),
        }
    }

    /// Returns the individual values. A single string is split on commas and each part
    /// trimmed.
    pub fn values(&self) -> Vec<String> {
        match &self.values {
            HeaderValues::Single(value) => value.split(',').map(|part| part.trim().to_owned()).collect(),
            HeaderValues::Multiple(values) => values.clone(),
        }
    }

    pub fn raw_values(&self) -> &HeaderValues {
        &self.values
    }
}

/// Formats the header as `name:value`, without a space after the colon.
impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value())
    }
}
