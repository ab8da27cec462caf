//! The parts shared by requests and responses.
//!
//! A [`Message`] couples a [`Body`], a [`HeaderStore`] and a protocol version. The
//! [`HttpMessage`] trait gives every message type the same read accessors and `with_*`
//! derivations; implementors only say how to reach their [`Message`] and how to rebuild
//! themselves around a new one.
//!
//! Derivations never touch the receiver. A derived message gets its own deep copy of the
//! body, see [`Body`]'s `Clone` implementation, unless the derivation replaces the body
//! anyway.

use serde::Serialize;

use crate::protocol::{BasicAuthHeader, Body, Header, HeaderStore, HeaderValues, SerializationError, ValidationError};

pub const DEFAULT_PROTOCOL_VERSION: &str = "1.1";

#[derive(Debug, Clone)]
pub struct Message {
    body: Body,
    headers: HeaderStore,
    version: String,
}

impl Message {
    pub fn new(body: impl Into<Body>, headers: HeaderStore, version: impl Into<String>) -> Self {
        Self { body: body.into(), headers, version: version.into() }
    }

    pub(crate) fn map_headers(&self, change: impl FnOnce(&HeaderStore) -> HeaderStore) -> Self {
        let mut message = self.clone();
        message.headers = change(&self.headers);
        message
    }

    pub(crate) fn with_body_parts(&self, body: Body, headers: HeaderStore) -> Self {
        Self { body, headers, version: self.version.clone() }
    }

    pub(crate) fn headers_mut(&mut self) -> &mut HeaderStore {
        &mut self.headers
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new(Body::new(), HeaderStore::new(), DEFAULT_PROTOCOL_VERSION)
    }
}

/// Accessors and copy-on-write derivations of an http message.
pub trait HttpMessage: Sized {
    fn message(&self) -> &Message;

    /// Returns a copy of `self` around `message`, leaving every other part as it is.
    fn with_message(&self, message: Message) -> Self;

    fn protocol_version(&self) -> &str {
        &self.message().version
    }

    /// Returns every header as name and values, in insertion order.
    fn headers(&self) -> Vec<(String, Vec<String>)> {
        self.message().headers.to_map()
    }

    fn header_store(&self) -> &HeaderStore {
        &self.message().headers
    }

    fn has_header(&self, name: &str) -> bool {
        self.message().headers.has(name)
    }

    /// Returns the values of a header, empty if it is absent.
    fn header(&self, name: &str) -> Vec<String> {
        self.message().headers.values(name)
    }

    /// Returns the comma-joined values of a header, empty if it is absent.
    fn header_line(&self, name: &str) -> String {
        self.message().headers.line(name)
    }

    fn body(&self) -> &Body {
        &self.message().body
    }

    fn with_protocol_version(&self, version: &str) -> Self {
        let mut message = self.message().clone();
        message.version = version.to_owned();
        self.with_message(message)
    }

    /// Derives a message where `name` holds exactly `values`.
    fn with_header(&self, name: &str, values: impl Into<HeaderValues>) -> Self {
        let header = Header::new(name, values);
        self.with_message(self.message().map_headers(|headers| headers.with_header(header)))
    }

    /// Derives a message where `values` are appended to those already held by `name`.
    fn with_added_header(&self, name: &str, values: impl Into<HeaderValues>) -> Self {
        let header = Header::new(name, values);
        self.with_message(self.message().map_headers(|headers| headers.with_added_header(header)))
    }

    fn without_header(&self, name: &str) -> Self {
        self.with_message(self.message().map_headers(|headers| headers.without_header(name)))
    }

    fn with_body(&self, body: impl Into<Body>) -> Self {
        let message = self.message();
        self.with_message(message.with_body_parts(body.into(), message.headers.clone()))
    }

    /// Derives a message with `data` encoded as json body and a matching content type.
    ///
    /// # Errors
    ///
    /// Fails if `data` can not be encoded as json.
    fn with_json<T: Serialize + ?Sized>(&self, data: &T) -> Result<Self, SerializationError> {
        let encoded = serde_json::to_vec(data)?;
        let message = self.message();
        let headers = message.headers.with_header(Header::new("content-type", mime::APPLICATION_JSON.as_ref()));
        Ok(self.with_message(message.with_body_parts(Body::from(encoded), headers)))
    }

    /// Derives a message with an `Authorization: Basic` header for the given credentials.
    ///
    /// # Errors
    ///
    /// Fails if `user` contains a `:`.
    fn with_basic_auth(&self, user: &str, password: &str) -> Result<Self, ValidationError> {
        let header = BasicAuthHeader::new(user, password)?;
        Ok(self.with_message(self.message().map_headers(|headers| headers.with_header(header.into()))))
    }
}

impl HttpMessage for Message {
    fn message(&self) -> &Message {
        self
    }

    fn with_message(&self, message: Message) -> Self {
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::body::StreamMetadata;
    use crate::protocol::RawStream;
    use assert_matches::assert_matches;
    use serde_json::json;
    use std::io::{self, Read, Seek, SeekFrom, Write};

    #[derive(Debug)]
    struct Pipe(io::Cursor<Vec<u8>>);

    impl Read for Pipe {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for Pipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "read only"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for Pipe {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "unseekable"))
        }
    }

    impl RawStream for Pipe {
        fn metadata(&self) -> StreamMetadata {
            StreamMetadata { mode: "r".to_owned(), seekable: false, uri: None, stream_type: "PIPE" }
        }
    }

    fn message() -> Message {
        Message::new("content", HeaderStore::from_entries([("header1", ["foo", "bar"])]), "1.1")
    }

    #[test]
    fn test_defaults() {
        let message = Message::default();

        assert_eq!(message.protocol_version(), "1.1");
        assert!(message.headers().is_empty());
        assert_eq!(message.body().to_string(), "");
    }

    #[test]
    fn test_header_accessors() {
        let message = message();

        assert!(message.has_header("Header1"));
        assert_eq!(message.header("HEADER1"), vec!["foo", "bar"]);
        assert_eq!(message.header_line("header1"), "foo, bar");
        assert!(message.header("header2").is_empty());
        assert_eq!(message.header_line("header2"), "");
    }

    #[test]
    fn test_with_header_leaves_original_untouched() {
        let original = message();
        let derived = original.with_header("header1", "baz").with_added_header("header2", "qux");

        assert_eq!(derived.header("header1"), vec!["baz"]);
        assert_eq!(derived.header_line("header2"), "qux");
        assert_eq!(original.header("header1"), vec!["foo", "bar"]);
        assert!(!original.has_header("header2"));

        let added = original.with_added_header("Header1", "baz");
        assert_eq!(added.header("header1"), vec!["foo", "bar", "baz"]);

        let removed = original.without_header("HEADER1");
        assert!(!removed.has_header("header1"));
        assert!(original.has_header("header1"));
    }

    #[test]
    fn test_with_protocol_version() {
        let original = message();
        let derived = original.with_protocol_version("2");

        assert_eq!(derived.protocol_version(), "2");
        assert_eq!(original.protocol_version(), "1.1");
    }

    #[test]
    fn test_derived_body_is_independent() {
        let original = message();
        let derived = original.with_header("header3", "x");

        derived.body().write(b"overwritten").unwrap();

        assert_eq!(derived.body().to_string(), "overwritten");
        assert_eq!(original.body().to_string(), "content");
    }

    #[test]
    fn test_with_body() {
        let original = message();
        let derived = original.with_body("replaced");

        assert_eq!(derived.body().to_string(), "replaced");
        assert_eq!(derived.header_line("header1"), "foo, bar");
        assert_eq!(original.body().to_string(), "content");
    }

    #[test]
    fn test_with_json() {
        let original = message();
        let derived = original.with_json(&json!({"name": "micro", "tags": ["a", "b"]})).unwrap();

        assert_eq!(derived.header_line("Content-Type"), "application/json");
        assert_eq!(derived.body().to_string(), r#"{"name":"micro","tags":["a","b"]}"#);
        assert!(!original.has_header("content-type"));
        assert_eq!(original.body().to_string(), "content");
    }

    #[test]
    fn test_with_json_reports_unserializable_data() {
        use std::collections::BTreeMap;

        let mut data = BTreeMap::new();
        data.insert(vec![1u8], "non-string keys can not be encoded");

        assert_matches!(message().with_json(&data), Err(SerializationError::Json { .. }));
    }

    #[test]
    fn test_with_basic_auth() {
        let original = message();
        let derived = original.with_basic_auth("foo", "bar").unwrap();

        assert_eq!(derived.header_line("authorization"), "Basic Zm9vOmJhcg==");
        assert!(!original.has_header("authorization"));
        assert_matches!(original.with_basic_auth("foo:bar", "baz"), Err(ValidationError::UserContainsColon));
    }

    #[test]
    fn test_derive_from_streamed_body_keeps_content() {
        let original = Message::new(Body::from_stream(Pipe(io::Cursor::new(b"payload".to_vec()))), HeaderStore::new(), "1.1");

        let derived = original.with_header("x-a", "1").with_protocol_version("2");

        assert_eq!(derived.body().contents().unwrap(), "payload");
        assert_eq!(original.body().contents().unwrap(), "payload");
    }

    #[test]
    fn test_concurrent_derivations_see_same_body() {
        let original = message();
        original.body().seek(SeekFrom::Start(3)).unwrap();

        let derived = std::thread::scope(|scope| {
            let original = &original;
            let handles = (0..8).map(|i| scope.spawn(move || original.with_header("x-worker", i.to_string()))).collect::<Vec<_>>();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>()
        });

        assert_eq!(original.body().tell().unwrap(), 3);
        for message in derived {
            assert_eq!(message.body().tell().unwrap(), 3);
            assert_eq!(message.body().snapshot().unwrap(), "content");
            assert_eq!(message.header_line("header1"), "foo, bar");
        }
    }
}
