//! Immutable uri value object.
//!
//! [`Uri`] wraps the parsed [`UriComponents`] and exposes read accessors, the four
//! request-target forms of RFC 7230 section 5.3 and `with_*` derivations. Every
//! derivation works on a fresh copy of the components, so a derived uri never shares
//! state with the one it was derived from.

use std::fmt;
use std::str::FromStr;

use crate::codec::{query_codec, uri_codec};
use crate::protocol::{MessageError, ParseError, QueryParameters, QueryValue, ValidationError};
use crate::utils::ensure;

/// Well-known default ports by scheme.
const DEFAULT_PORTS: [(&str, u16); 11] = [
    ("http", 80),
    ("https", 443),
    ("ftp", 21),
    ("gopher", 70),
    ("nntp", 119),
    ("news", 119),
    ("telnet", 23),
    ("tn3270", 23),
    ("imap", 143),
    ("pop", 110),
    ("ldap", 389),
];

/// Returns the well-known default port of `scheme`, compared case-insensitively.
pub fn default_port(scheme: &str) -> Option<u16> {
    DEFAULT_PORTS.iter().find(|(name, _)| name.eq_ignore_ascii_case(scheme)).map(|(_, port)| *port)
}

/// The parts of a uri as written, without percent-decoding.
///
/// Empty strings stand for absent components. A port, when present, is in `1..=65535`;
/// [`Uri::from_components`] rejects a zero port.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriComponents {
    pub scheme: String,
    pub host: String,
    pub port: Option<u16>,
    pub user: String,
    pub pass: String,
    pub path: String,
    pub query: String,
    pub fragment: String,
}

impl UriComponents {
    /// Returns the default port implied by the scheme.
    pub fn default_port(&self) -> Option<u16> {
        default_port(&self.scheme)
    }
}

/// Anything that can become the query component of a uri.
///
/// Raw strings are used as they are; parameter sets and literal key-value lists are
/// serialized with [`query_codec::serialize`].
pub trait IntoQueryString {
    fn into_query_string(self) -> String;
}

impl IntoQueryString for &str {
    fn into_query_string(self) -> String {
        self.to_owned()
    }
}

impl IntoQueryString for String {
    fn into_query_string(self) -> String {
        self
    }
}

impl IntoQueryString for &QueryParameters {
    fn into_query_string(self) -> String {
        query_codec::serialize(self)
    }
}

impl IntoQueryString for QueryParameters {
    fn into_query_string(self) -> String {
        query_codec::serialize(&self)
    }
}

impl<K: Into<String>, V: Into<QueryValue>, const N: usize> IntoQueryString for [(K, V); N] {
    fn into_query_string(self) -> String {
        query_codec::serialize(&QueryParameters::from(self))
    }
}

impl<K: Into<String>, V: Into<QueryValue>> IntoQueryString for Vec<(K, V)> {
    fn into_query_string(self) -> String {
        query_codec::serialize(&QueryParameters::from(self))
    }
}

/// An immutable uri.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Uri {
    components: UriComponents,
}

impl Uri {
    /// Parses a uri string, see [`uri_codec::parse`] for the accepted syntax.
    pub fn parse(uri: &str) -> Result<Self, MessageError> {
        Ok(Self { components: uri_codec::parse(uri)? })
    }

    /// Creates a uri from named parts.
    pub fn from_components(components: UriComponents) -> Result<Self, ValidationError> {
        ensure!(components.port != Some(0), ValidationError::port_out_of_range(0));
        Ok(Self { components })
    }

    pub fn components(&self) -> &UriComponents {
        &self.components
    }

    pub fn into_components(self) -> UriComponents {
        self.components
    }

    pub fn scheme(&self) -> &str {
        &self.components.scheme
    }

    pub fn user(&self) -> &str {
        &self.components.user
    }

    pub fn password(&self) -> &str {
        &self.components.pass
    }

    /// Returns `user[:password]`, or an empty string without a user.
    pub fn user_info(&self) -> String {
        let UriComponents { user, pass, .. } = &self.components;
        if pass.is_empty() { user.clone() } else { format!("{user}:{pass}") }
    }

    pub fn host(&self) -> &str {
        &self.components.host
    }

    pub fn port(&self) -> Option<u16> {
        self.components.port
    }

    pub fn path(&self) -> &str {
        &self.components.path
    }

    pub fn query(&self) -> &str {
        &self.components.query
    }

    pub fn fragment(&self) -> &str {
        &self.components.fragment
    }

    /// Returns `[user-info@]host[:port]`, leaving out a default port.
    pub fn authority(&self) -> String {
        let mut authority = String::new();
        let user_info = self.user_info();
        if !user_info.is_empty() {
            authority.push_str(&user_info);
            authority.push('@');
        }
        authority.push_str(self.host());
        if let Some(port) = self.port().filter(|_| !self.uses_default_port()) {
            authority.push(':');
            authority.push_str(&port.to_string());
        }
        authority
    }

    pub fn default_port(&self) -> Option<u16> {
        self.components.default_port()
    }

    /// Returns true if the port equals the scheme's default port.
    ///
    /// A uri without a port whose scheme has no default port counts as using it.
    pub fn uses_default_port(&self) -> bool {
        self.default_port() == self.port()
    }

    /// Origin form (RFC 7230 section 5.3.1): the path followed by `?query` when the
    /// query is not empty.
    pub fn origin_form(&self) -> String {
        let mut form = self.path().to_owned();
        if !self.query().is_empty() {
            form.push('?');
            form.push_str(self.query());
        }
        form
    }

    /// Absolute form (RFC 7230 section 5.3.2): the complete uri.
    pub fn absolute_form(&self) -> String {
        self.to_string()
    }

    /// Authority form (RFC 7230 section 5.3.3): `host[:port]`.
    pub fn authority_form(&self) -> String {
        match self.port() {
            Some(port) => format!("{}:{port}", self.host()),
            None => self.host().to_owned(),
        }
    }

    /// Asterisk form (RFC 7230 section 5.3.4).
    pub fn asterisk_form(&self) -> &'static str {
        "*"
    }

    fn derive(&self, change: impl FnOnce(&mut UriComponents)) -> Self {
        let mut components = self.components.clone();
        change(&mut components);
        Self { components }
    }

    pub fn with_scheme(&self, scheme: &str) -> Self {
        self.derive(|components| components.scheme = scheme.to_owned())
    }

    pub fn with_user_info(&self, user: &str, password: Option<&str>) -> Self {
        self.derive(|components| {
            components.user = user.to_owned();
            components.pass = password.unwrap_or_default().to_owned();
        })
    }

    pub fn with_host(&self, host: &str) -> Self {
        self.derive(|components| components.host = host.to_owned())
    }

    /// Derives a uri with the given port, or without a port for `None`.
    pub fn with_port(&self, port: Option<u16>) -> Result<Self, ValidationError> {
        ensure!(port != Some(0), ValidationError::port_out_of_range(0));
        Ok(self.derive(|components| components.port = port))
    }

    pub fn with_path(&self, path: &str) -> Self {
        self.derive(|components| components.path = path.to_owned())
    }

    /// Derives a uri with the given query: a raw string, a [`QueryParameters`] or a
    /// literal list of key-value pairs.
    pub fn with_query(&self, query: impl IntoQueryString) -> Self {
        let query = query.into_query_string();
        self.derive(|components| components.query = query)
    }

    pub fn with_fragment(&self, fragment: &str) -> Self {
        self.derive(|components| components.fragment = fragment.to_owned())
    }

    /// Derives a uri whose query additionally holds `parameters`, overriding existing
    /// keys.
    ///
    /// # Errors
    ///
    /// Fails if the current query cannot be parsed by [`query_codec::parse`].
    pub fn with_added_query_parameters(&self, parameters: impl Into<QueryParameters>) -> Result<Self, ParseError> {
        let mut query = query_codec::parse(self.query())?;
        query.add_parameters(parameters.into());
        Ok(self.with_query(&query))
    }

    /// Derives a uri whose query no longer holds the given keys.
    ///
    /// # Errors
    ///
    /// Fails if the current query cannot be parsed by [`query_codec::parse`].
    pub fn with_removed_query_parameters<I, K>(&self, keys: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let mut query = query_codec::parse(self.query())?;
        query.remove_parameters(keys);
        Ok(self.with_query(&query))
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&uri_codec::format(&self.components))
    }
}

impl FromStr for Uri {
    type Err = MessageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = MessageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Uri::parse(value)
    }
}

impl TryFrom<String> for Uri {
    type Error = MessageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Uri::parse(&value)
    }
}
