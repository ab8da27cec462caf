use std::fmt;
use std::str::FromStr;

use crate::protocol::ValidationError;

/// The request methods a [`Request`](crate::protocol::Request) accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    CONNECT,
    OPTIONS,
    TRACE,
    PATCH,
}

impl Method {
    pub const ALL: [Method; 9] =
        [Method::GET, Method::HEAD, Method::POST, Method::PUT, Method::DELETE, Method::CONNECT, Method::OPTIONS, Method::TRACE, Method::PATCH];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::CONNECT => "CONNECT",
            Method::OPTIONS => "OPTIONS",
            Method::TRACE => "TRACE",
            Method::PATCH => "PATCH",
        }
    }

    /// Whether parameters for this method travel in the query string.
    pub fn sends_parameters_in_query(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }

    /// Whether parameters for this method travel in a form encoded body.
    pub fn sends_parameters_in_body(&self) -> bool {
        matches!(self, Method::POST | Method::PUT | Method::PATCH | Method::DELETE)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a method token in any case.
impl FromStr for Method {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::invalid_method(s))
    }
}

impl TryFrom<&str> for Method {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Method {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => http::Method::GET,
            Method::HEAD => http::Method::HEAD,
            Method::POST => http::Method::POST,
            Method::PUT => http::Method::PUT,
            Method::DELETE => http::Method::DELETE,
            Method::CONNECT => http::Method::CONNECT,
            Method::OPTIONS => http::Method::OPTIONS,
            Method::TRACE => http::Method::TRACE,
            Method::PATCH => http::Method::PATCH,
        }
    }
}

impl TryFrom<&http::Method> for Method {
    type Error = ValidationError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}
