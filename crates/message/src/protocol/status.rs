use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use tracing::trace;

/// A response status: code, reason phrase and what is known about the code.
///
/// [`Status::for_code`] looks a code up in the built-in registry; codes it does not
/// know yield an `Unknown` status that keeps the given code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    code: u16,
    #[serde(rename = "name")]
    reason_phrase: Cow<'static, str>,
    description: Cow<'static, str>,
    standard: Option<Cow<'static, str>>,
    should_retry: bool,
}

struct Entry {
    code: u16,
    reason_phrase: &'static str,
    description: &'static str,
    standard: Option<&'static str>,
    should_retry: bool,
}

const fn entry(code: u16, reason_phrase: &'static str, description: &'static str) -> Entry {
    Entry { code, reason_phrase, description, standard: None, should_retry: false }
}

impl Entry {
    const fn standard(self, standard: &'static str) -> Self {
        Entry { standard: Some(standard), ..self }
    }

    const fn retry(self) -> Self {
        Entry { should_retry: true, ..self }
    }
}

#[rustfmt::skip]
static REGISTRY: [Entry; 19] = [
    entry(200, "OK", "The request has succeeded"),
    entry(201, "Created", "The request has been fulfilled and has resulted in one or more new resources being created").standard("rfc 7231, section 6.3.2"),
    entry(300, "Multiple Choices", "The requested resource corresponds to any one of a set of representations, each with its own specific location"),
    entry(301, "Moved Permanently", "The requested resource has been assigned a new permanent URI"),
    entry(302, "Found", "The requested resource resides temporarily under a different URI"),
    entry(304, "Not Modified", "The document has not been modified"),
    entry(307, "Temporary Redirect", "The requested resource resides temporarily under a different URI"),
    entry(400, "Bad Request", "The request could not be understood by the server due to malformed syntax"),
    entry(401, "Unauthorized", "The request requires user authentication"),
    entry(403, "Forbidden", "The server understood the request, but is refusing to fulfill it"),
    entry(404, "Not Found", "The server has not found anything matching the Request-URI"),
    entry(405, "Method Not Allowed", "The method specified in the Request-Line is not allowed for the resource identified by the Request-URI"),
    entry(408, "Request Timeout", "The client did not produce a request within the time that the server was prepared to wait"),
    entry(419, "Authentication Timeout", "Previously valid authentication has expired"),
    entry(422, "Unprocessable Content", "The request was well-formed but was unable to be followed due to semantic errors"),
    entry(429, "Too Many Requests", "The user has sent too many requests in a given amount of time (rate limiting)").standard("RFC6585").retry(),
    entry(500, "Internal Server Error", "The server encountered an unexpected condition which prevented it from fulfilling the request"),
    entry(502, "Bad Gateway", "This server got an error response while working as a gateway to handle the current request").retry(),
    entry(503, "Service Unavailable", "The server is currently unable to handle the request due to a temporary overloading or maintenance of the server").retry(),
];

const UNKNOWN_REASON: &str = "Unknown";
const UNKNOWN_DESCRIPTION: &str = "No description could be found for this status code";

impl Status {
    /// Creates a status outside the registry. Use the `with_*` setters to fill in the rest.
    pub fn new(code: u16, reason_phrase: impl Into<Cow<'static, str>>) -> Self {
        Self { code, reason_phrase: reason_phrase.into(), description: Cow::Borrowed(""), standard: None, should_retry: false }
    }

    /// Looks `code` up in the registry.
    pub fn for_code(code: u16) -> Self {
        match REGISTRY.iter().find(|entry| entry.code == code) {
            Some(entry) => Self {
                code,
                reason_phrase: Cow::Borrowed(entry.reason_phrase),
                description: Cow::Borrowed(entry.description),
                standard: entry.standard.map(Cow::Borrowed),
                should_retry: entry.should_retry,
            },
            None => {
                trace!(code, "status code not found in registry");
                Self::new(code, UNKNOWN_REASON).with_description(UNKNOWN_DESCRIPTION)
            }
        }
    }

    /// Whether `code` is in the registry.
    pub fn is_registered(code: u16) -> bool {
        REGISTRY.iter().any(|entry| entry.code == code)
    }

    pub fn with_reason_phrase(mut self, reason_phrase: impl Into<Cow<'static, str>>) -> Self {
        self.reason_phrase = reason_phrase.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<Cow<'static, str>>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_standard(mut self, standard: impl Into<Cow<'static, str>>) -> Self {
        self.standard = Some(standard.into());
        self
    }

    pub fn with_should_retry(mut self, should_retry: bool) -> Self {
        self.should_retry = should_retry;
        self
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn standard(&self) -> Option<&str> {
        self.standard.as_deref()
    }

    pub fn should_retry(&self) -> bool {
        self.should_retry
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::for_code(200)
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        Self::for_code(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason_phrase)
    }
}
