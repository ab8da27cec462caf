//! Conversions between the value objects of this crate and the types of the `http` crate.
//!
//! Bodies cross the boundary as [`Bytes`]; converting into `http` types reads a snapshot
//! of the body and leaves its position untouched.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};

use crate::protocol::{
    HeaderStore, HeaderValues, HttpMessage, Message, MessageError, Method, Request, Response, Status, Uri, UriComponents,
    ValidationError,
};

impl Request {
    /// Converts into an `http::Request`.
    ///
    /// The uri is written in absolute form when it has a host, and as request target
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Fails if the body can not be read, or if a part is rejected by the `http` crate.
    pub fn to_http(&self) -> Result<http::Request<Bytes>, MessageError> {
        let uri = if self.uri().host().is_empty() { self.request_target() } else { self.uri().to_string() };

        let mut builder = http::Request::builder()
            .method(http::Method::from(self.method()))
            .uri(uri)
            .version(to_http_version(self.protocol_version())?);

        if let Some(headers) = builder.headers_mut() {
            write_headers(self.header_store(), headers)?;
        }

        let body = self.body().snapshot()?;
        Ok(builder.body(body).map_err(ValidationError::invalid_http_part)?)
    }
}

impl Response {
    /// Converts into an `http::Response`. A custom reason phrase is not carried over.
    ///
    /// # Errors
    ///
    /// Fails if the body can not be read, the status code is outside `100..=999`, or a
    /// header is rejected by the `http` crate.
    pub fn to_http(&self) -> Result<http::Response<Bytes>, MessageError> {
        let code = self.status_code();
        let status = StatusCode::from_u16(code).ok().ok_or(ValidationError::InvalidStatusCode { code })?;

        let mut builder = http::Response::builder().status(status).version(to_http_version(self.protocol_version())?);

        if let Some(headers) = builder.headers_mut() {
            write_headers(self.header_store(), headers)?;
        }

        let body = self.body().snapshot()?;
        Ok(builder.body(body).map_err(ValidationError::invalid_http_part)?)
    }
}

impl TryFrom<http::Request<Bytes>> for Request {
    type Error = MessageError;

    fn try_from(request: http::Request<Bytes>) -> Result<Self, Self::Error> {
        let (parts, body) = request.into_parts();

        let method = Method::try_from(&parts.method)?;
        let uri = from_http_uri(&parts.uri)?;
        let message = Message::new(body, read_headers(&parts.headers)?, from_http_version(parts.version));

        Ok(Request::from_parts(method, uri, message))
    }
}

impl TryFrom<http::Response<Bytes>> for Response {
    type Error = MessageError;

    fn try_from(response: http::Response<Bytes>) -> Result<Self, Self::Error> {
        let (parts, body) = response.into_parts();

        let status = Status::for_code(parts.status.as_u16());
        let message = Message::new(body, read_headers(&parts.headers)?, from_http_version(parts.version));

        Ok(Response::from_parts(status, message))
    }
}

fn to_http_version(version: &str) -> Result<Version, ValidationError> {
    match version {
        "0.9" => Ok(Version::HTTP_09),
        "1.0" => Ok(Version::HTTP_10),
        "1.1" => Ok(Version::HTTP_11),
        "2" | "2.0" => Ok(Version::HTTP_2),
        "3" | "3.0" => Ok(Version::HTTP_3),
        other => Err(ValidationError::invalid_http_part(format!("unsupported protocol version '{other}'"))),
    }
}

fn from_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

/// An `http::Uri` without authority is a request target, which keeps its path instead of
/// having it read as a host.
fn from_http_uri(uri: &http::Uri) -> Result<Uri, MessageError> {
    if uri.authority().is_some() {
        return Uri::parse(&uri.to_string());
    }

    let components = UriComponents { path: uri.path().to_owned(), query: uri.query().unwrap_or_default().to_owned(), ..UriComponents::default() };
    Ok(Uri::from_components(components)?)
}

fn write_headers(store: &HeaderStore, headers: &mut HeaderMap) -> Result<(), ValidationError> {
    for header in store.iter() {
        let name = http::HeaderName::try_from(header.name()).map_err(ValidationError::invalid_http_part)?;
        let values = match header.raw_values() {
            HeaderValues::Single(value) => std::slice::from_ref(value),
            HeaderValues::Multiple(values) => values.as_slice(),
        };
        for value in values {
            let value = http::HeaderValue::try_from(value.as_str()).map_err(ValidationError::invalid_http_part)?;
            headers.append(name.clone(), value);
        }
    }
    Ok(())
}

fn read_headers(headers: &HeaderMap) -> Result<HeaderStore, ValidationError> {
    let mut entries = Vec::with_capacity(headers.keys_len());
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|value| value.to_str().map(str::to_owned).map_err(ValidationError::invalid_http_part))
            .collect::<Result<Vec<_>, _>>()?;
        entries.push((name.as_str().to_owned(), values));
    }
    Ok(HeaderStore::from_entries(entries))
}
