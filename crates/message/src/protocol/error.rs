use std::convert::Infallible;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("validation error: {source}")]
    Validation {
        #[from]
        source: ValidationError,
    },

    #[error("resource error: {source}")]
    Resource {
        #[from]
        source: ResourceError,
    },

    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: SerializationError,
    },
}

/// Failure to interpret a string as one of the message components.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("could not parse malformed uri string '{uri}'")]
    MalformedUri { uri: String },

    #[error("could not parse hostname from string '{uri}'")]
    MissingHost { uri: String },

    #[error("failed to parse given port string '{port}' to an integer value")]
    InvalidPort { port: String },

    #[error("non-leading ? character in query string")]
    NonLeadingQuestionMark,

    #[error("key-value pair missing expected separator '=': '{segment}'")]
    MissingSeparator { segment: String },

    #[error("invalid authorization header: {reason}")]
    InvalidAuthorization { reason: String },

    #[error("invalid request target: {reason}")]
    InvalidRequestTarget { reason: String },
}

impl ParseError {
    pub fn malformed_uri<S: ToString>(uri: S) -> Self {
        Self::MalformedUri { uri: uri.to_string() }
    }

    pub fn missing_host<S: ToString>(uri: S) -> Self {
        Self::MissingHost { uri: uri.to_string() }
    }

    pub fn invalid_port<S: ToString>(port: S) -> Self {
        Self::InvalidPort { port: port.to_string() }
    }

    pub fn missing_separator<S: ToString>(segment: S) -> Self {
        Self::MissingSeparator { segment: segment.to_string() }
    }

    pub fn invalid_authorization<S: ToString>(reason: S) -> Self {
        Self::InvalidAuthorization { reason: reason.to_string() }
    }

    pub fn invalid_request_target<S: ToString>(reason: S) -> Self {
        Self::InvalidRequestTarget { reason: reason.to_string() }
    }
}

/// A well-formed value that violates a domain rule.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("'{method}' is not a valid http method")]
    InvalidMethod { method: String },

    #[error("invalid port number {port} - outside of range")]
    PortOutOfRange { port: u64 },

    #[error("username must not contain the ':' character")]
    UserContainsColon,

    #[error("parameter '{path}' could not be converted to string")]
    UnstringifiableParameter { path: String },

    #[error("query parameters must be an object or an array, found '{value_type}'")]
    NotAParameterSet { value_type: String },

    #[error("invalid header value type '{value_type}' for '{name}', header value should be either a string or an array")]
    InvalidHeaderValue { name: String, value_type: String },

    #[error("invalid credentials: {reason}")]
    InvalidCredentials { reason: String },

    #[error("invalid status code: {code}")]
    InvalidStatusCode { code: u16 },

    #[error("could not convert http part: {reason}")]
    InvalidHttpPart { reason: String },
}

impl ValidationError {
    pub fn invalid_method<S: ToString>(method: S) -> Self {
        Self::InvalidMethod { method: method.to_string() }
    }

    pub fn port_out_of_range(port: u64) -> Self {
        Self::PortOutOfRange { port }
    }

    pub fn unstringifiable_parameter<S: ToString>(path: S) -> Self {
        Self::UnstringifiableParameter { path: path.to_string() }
    }

    pub fn not_a_parameter_set<S: ToString>(value_type: S) -> Self {
        Self::NotAParameterSet { value_type: value_type.to_string() }
    }

    pub fn invalid_header_value<N: ToString, T: ToString>(name: N, value_type: T) -> Self {
        Self::InvalidHeaderValue { name: name.to_string(), value_type: value_type.to_string() }
    }

    pub fn invalid_credentials<S: ToString>(reason: S) -> Self {
        Self::InvalidCredentials { reason: reason.to_string() }
    }

    pub fn invalid_http_part<S: ToString>(reason: S) -> Self {
        Self::InvalidHttpPart { reason: reason.to_string() }
    }
}

impl From<Infallible> for ValidationError {
    fn from(infallible: Infallible) -> Self {
        match infallible {}
    }
}

impl From<Infallible> for MessageError {
    fn from(infallible: Infallible) -> Self {
        match infallible {}
    }
}

/// Failure of the stream behind a body.
#[derive(Error, Debug)]
pub enum ResourceError {
    #[error("stream is detached")]
    Detached,

    #[error("body stream is not seekable")]
    NotSeekable,

    #[error("body stream is not {operation}")]
    Unsupported { operation: &'static str },

    #[error("invalid stream mode '{mode}'")]
    InvalidMode { mode: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ResourceError {
    pub fn not_readable() -> Self {
        Self::Unsupported { operation: "readable" }
    }

    pub fn not_writable() -> Self {
        Self::Unsupported { operation: "writable" }
    }

    pub fn invalid_mode<S: ToString>(mode: S) -> Self {
        Self::InvalidMode { mode: mode.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("the given data could not be encoded into valid json: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}
