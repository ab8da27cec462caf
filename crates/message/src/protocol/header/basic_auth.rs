use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use super::Header;
use crate::protocol::{MessageError, ParseError, ValidationError};
use crate::utils::ensure;

const PREFIX: &str = "Basic ";

/// An `Authorization` header carrying basic credentials.
///
/// The wire value is `Basic ` followed by the base64 encoding of `user:password`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuthHeader {
    user: String,
    password: String,
}

/// Credentials as accepted by [`BasicAuthHeader::from_credentials`].
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Credentials {
    Pair(String, String),
    Named {
        #[serde(alias = "username")]
        user: String,
        #[serde(alias = "pass")]
        password: String,
    },
}

impl BasicAuthHeader {
    pub const NAME: &'static str = "Authorization";

    /// # Errors
    ///
    /// Fails with [`ValidationError::UserContainsColon`] if `user` contains a `:`, which
    /// would make the encoded credentials ambiguous.
    pub fn new(user: &str, password: &str) -> Result<Self, ValidationError> {
        ensure!(!user.contains(':'), ValidationError::UserContainsColon);
        Ok(Self { user: user.to_owned(), password: password.to_owned() })
    }

    /// Decodes a header value of the form `Basic <base64>`.
    pub fn from_header_value(value: &str) -> Result<Self, MessageError> {
        let encoded = value
            .trim()
            .strip_prefix(PREFIX)
            .ok_or_else(|| ParseError::invalid_authorization(format!("value should start with '{PREFIX}'")))?;

        let decoded = STANDARD.decode(encoded.trim()).map_err(ParseError::invalid_authorization)?;
        let credentials = String::from_utf8(decoded).map_err(ParseError::invalid_authorization)?;
        let (user, password) = credentials.split_once(':').unwrap_or((&credentials, ""));

        Ok(Self::new(user, password)?)
    }

    /// Decodes a complete `Authorization: Basic <base64>` line.
    pub fn from_header_line(line: &str) -> Result<Self, MessageError> {
        Self::from_header_value(&Header::parse(line).value())
    }

    /// Creates the header from structured credentials: either a `[user, password]` pair
    /// or an object with `user`/`username` and `password`/`pass` fields.
    pub fn from_credentials(credentials: serde_json::Value) -> Result<Self, ValidationError> {
        let credentials = serde_json::from_value::<Credentials>(credentials).map_err(ValidationError::invalid_credentials)?;
        match credentials {
            Credentials::Pair(user, password) | Credentials::Named { user, password } => Self::new(&user, &password),
        }
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns the encoded header value.
    pub fn value(&self) -> String {
        format!("{PREFIX}{}", STANDARD.encode(format!("{}:{}", self.user, self.password)))
    }

    pub fn to_header(&self) -> Header {
        Header::new(Self::NAME, self.value())
    }
}

impl From<BasicAuthHeader> for Header {
    fn from(header: BasicAuthHeader) -> Self {
        header.to_header()
    }
}

impl fmt::Display for BasicAuthHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_header(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_value() {
        let header = BasicAuthHeader::new("foo", "bar").unwrap();

        assert_eq!(header.value(), format!("Basic {}", STANDARD.encode("foo:bar")));
        assert_eq!(header.value(), "Basic Zm9vOmJhcg==");
        assert_eq!(header.to_string(), "Authorization:Basic Zm9vOmJhcg==");
    }

    #[test]
    fn test_user_with_colon_is_rejected() {
        assert_matches!(BasicAuthHeader::new("foo:bar", "baz"), Err(ValidationError::UserContainsColon));
    }

    #[test]
    fn test_password_may_contain_colon() {
        let header = BasicAuthHeader::new("foo", "b:a:r").unwrap();
        let decoded = BasicAuthHeader::from_header_value(&header.value()).unwrap();

        assert_eq!(decoded.user(), "foo");
        assert_eq!(decoded.password(), "b:a:r");
    }

    #[test]
    fn test_from_header_value() {
        let header = BasicAuthHeader::from_header_value(" Basic Zm9vOmJhcg== ").unwrap();

        assert_eq!(header.user(), "foo");
        assert_eq!(header.password(), "bar");
    }

    #[test]
    fn test_from_header_value_requires_prefix() {
        assert_matches!(
            BasicAuthHeader::from_header_value("basic Zm9vOmJhcg=="),
            Err(MessageError::Parse { source: ParseError::InvalidAuthorization { .. } })
        );
        assert_matches!(
            BasicAuthHeader::from_header_value("Bearer abc"),
            Err(MessageError::Parse { source: ParseError::InvalidAuthorization { .. } })
        );
    }

    #[test]
    fn test_from_header_value_rejects_invalid_base64() {
        assert_matches!(
            BasicAuthHeader::from_header_value("Basic !!!"),
            Err(MessageError::Parse { source: ParseError::InvalidAuthorization { .. } })
        );
    }

    #[test]
    fn test_from_header_line() {
        let header = BasicAuthHeader::from_header_line("Authorization: Basic Zm9vOmJhcg==").unwrap();
        assert_eq!(header, BasicAuthHeader::new("foo", "bar").unwrap());
    }

    #[test]
    fn test_from_credentials() {
        let expected = BasicAuthHeader::new("foo", "bar").unwrap();

        assert_eq!(BasicAuthHeader::from_credentials(json!(["foo", "bar"])).unwrap(), expected);
        assert_eq!(BasicAuthHeader::from_credentials(json!({"user": "foo", "password": "bar"})).unwrap(), expected);
        assert_eq!(BasicAuthHeader::from_credentials(json!({"username": "foo", "pass": "bar"})).unwrap(), expected);

        assert_matches!(BasicAuthHeader::from_credentials(json!({"user": "foo"})), Err(ValidationError::InvalidCredentials { .. }));
        assert_matches!(BasicAuthHeader::from_credentials(json!(["foo:x", "bar"])), Err(ValidationError::UserContainsColon));
    }

    #[test]
    fn test_into_header() {
        let header: Header = BasicAuthHeader::new("foo", "bar").unwrap().into();

        assert_eq!(header.name(), "Authorization");
        assert_eq!(header.value(), "Basic Zm9vOmJhcg==");
    }
}
