use tracing::trace;

use crate::protocol::message::DEFAULT_PROTOCOL_VERSION;
use crate::protocol::{
    Body, Header, HeaderStore, HeaderValues, HttpMessage, Message, MessageError, Method, ParseError, QueryParameters, Uri,
    ValidationError,
};
use crate::utils::ensure;

const HOST: &str = "Host";

/// An immutable http request.
///
/// A request created with a uri that has a host gets a `Host` header for it, unless a
/// non-empty one was given.
#[derive(Debug, Clone)]
pub struct Request {
    message: Message,
    method: Method,
    uri: Uri,
    target: Option<String>,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self::from_parts(method, uri, Message::default())
    }

    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    pub(crate) fn from_parts(method: Method, uri: Uri, mut message: Message) -> Self {
        sync_host(&mut message, &uri, false);
        Self { message, method, uri, target: None }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the explicit request target if one was set, `/` for an empty uri, and the
    /// origin form of the uri otherwise.
    pub fn request_target(&self) -> String {
        if let Some(target) = &self.target {
            return target.clone();
        }

        let uri = self.uri.to_string();
        if uri.is_empty() { "/".to_owned() } else { self.uri.origin_form() }
    }

    /// # Errors
    ///
    /// Fails if `target` contains whitespace.
    pub fn with_request_target(&self, target: &str) -> Result<Self, ParseError> {
        let target = validate_target(target)?;
        let mut request = self.clone();
        request.target = Some(target);
        Ok(request)
    }

    /// # Errors
    ///
    /// Fails if `method` is not a known method token.
    pub fn with_method<M>(&self, method: M) -> Result<Self, ValidationError>
    where
        M: TryInto<Method>,
        M::Error: Into<ValidationError>,
    {
        let method = method.try_into().map_err(Into::into)?;
        let mut request = self.clone();
        request.method = method;
        Ok(request)
    }

    /// Derives a request for `uri`.
    ///
    /// The `Host` header is taken from the new uri when it has a host. With
    /// `preserve_host`, an existing non-empty `Host` header is kept instead.
    pub fn with_uri(&self, uri: Uri, preserve_host: bool) -> Self {
        let mut message = self.message.clone();
        sync_host(&mut message, &uri, !preserve_host);
        Self { message, method: self.method, uri, target: self.target.clone() }
    }

    /// Derives a request carrying `parameters`.
    ///
    /// `GET` and `HEAD` requests merge them into the uri query, replacing existing keys.
    /// `POST`, `PUT`, `PATCH` and `DELETE` requests get them as form encoded body. Any
    /// other method leaves the request as it is.
    ///
    /// # Errors
    ///
    /// Fails if the current uri query can not be parsed.
    pub fn with_parameters(&self, parameters: impl Into<QueryParameters>) -> Result<Self, ParseError> {
        let parameters = parameters.into();

        if self.method.sends_parameters_in_query() {
            let uri = self.uri.with_added_query_parameters(parameters)?;
            return Ok(self.with_uri(uri, false));
        }

        if self.method.sends_parameters_in_body() {
            let headers = self.message.header_store().with_header(Header::new("content-type", mime::APPLICATION_WWW_FORM_URLENCODED.as_ref()));
            let message = self.message.with_body_parts(Body::from(parameters.to_string()), headers);
            return Ok(self.with_message(message));
        }

        Ok(self.clone())
    }
}

fn validate_target(target: &str) -> Result<String, ParseError> {
    ensure!(!target.chars().any(char::is_whitespace), ParseError::invalid_request_target("request target may not contain whitespace"));
    Ok(target.to_owned())
}

/// Sets the `Host` header from the host of `uri`. Without `overwrite`, a non-empty
/// `Host` header is kept.
fn sync_host(message: &mut Message, uri: &Uri, overwrite: bool) {
    let host = uri.host();
    if host.is_empty() {
        return;
    }

    let headers = message.headers_mut();
    if !overwrite && !headers.line(HOST).is_empty() {
        return;
    }

    trace!(host, "deriving host header from uri");
    *headers = headers.with_header(Header::new(HOST, host));
}

impl HttpMessage for Request {
    fn message(&self) -> &Message {
        &self.message
    }

    fn with_message(&self, message: Message) -> Self {
        Self { message, method: self.method, uri: self.uri.clone(), target: self.target.clone() }
    }
}

/// Collects the parts of a [`Request`]. Conversion errors of the setters are kept and
/// reported by [`RequestBuilder::build`].
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: Uri,
    body: Option<Body>,
    headers: HeaderStore,
    version: String,
    target: Option<String>,
    error: Option<MessageError>,
}

impl RequestBuilder {
    fn new() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::default(),
            body: None,
            headers: HeaderStore::new(),
            version: DEFAULT_PROTOCOL_VERSION.to_owned(),
            target: None,
            error: None,
        }
    }

    fn fail(&mut self, error: impl Into<MessageError>) {
        self.error.get_or_insert(error.into());
    }

    pub fn method<M>(mut self, method: M) -> Self
    where
        M: TryInto<Method>,
        M::Error: Into<MessageError>,
    {
        match method.try_into() {
            Ok(method) => self.method = method,
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn uri<U>(mut self, uri: U) -> Self
    where
        U: TryInto<Uri>,
        U::Error: Into<MessageError>,
    {
        match uri.try_into() {
            Ok(uri) => self.uri = uri,
            Err(e) => self.fail(e),
        }
        self
    }

    pub fn header(mut self, name: &str, values: impl Into<HeaderValues>) -> Self {
        self.headers = self.headers.with_header(Header::new(name, values));
        self
    }

    pub fn headers(mut self, headers: HeaderStore) -> Self {
        self.headers = headers;
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn version(mut self, version: &str) -> Self {
        self.version = version.to_owned();
        self
    }

    pub fn request_target(mut self, target: &str) -> Self {
        match validate_target(target) {
            Ok(target) => self.target = Some(target),
            Err(e) => self.fail(e),
        }
        self
    }

    /// # Errors
    ///
    /// Returns the first error raised by a setter.
    pub fn build(self) -> Result<Request, MessageError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let message = Message::new(self.body.unwrap_or_default(), self.headers, self.version);
        let mut request = Request::from_parts(self.method, self.uri, message);
        request.target = self.target;
        Ok(request)
    }
}
