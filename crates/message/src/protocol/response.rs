use crate::protocol::message::DEFAULT_PROTOCOL_VERSION;
use crate::protocol::{Body, Header, HeaderStore, HeaderValues, HttpMessage, Message, Status};

/// An immutable http response.
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: Status,
}

impl Response {
    /// Creates an empty response with the registered status of `code`.
    pub fn new(code: u16) -> Self {
        Self::from_parts(Status::for_code(code), Message::default())
    }

    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    pub(crate) fn from_parts(status: Status, message: Message) -> Self {
        Self { message, status }
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_code(&self) -> u16 {
        self.status.code()
    }

    pub fn reason_phrase(&self) -> &str {
        self.status.reason_phrase()
    }

    /// Whether the body holds at least one byte.
    pub fn has_body(&self) -> bool {
        self.body().size().is_some_and(|size| size > 0)
    }

    /// Derives a response with the registered status of `code`. A non-empty
    /// `reason_phrase` replaces the registered one.
    pub fn with_status(&self, code: u16, reason_phrase: &str) -> Self {
        let mut response = self.clone();
        response.status = registered_status(code, reason_phrase);
        response
    }
}

fn registered_status(code: u16, reason_phrase: &str) -> Status {
    let status = Status::for_code(code);
    if reason_phrase.is_empty() { status } else { status.with_reason_phrase(reason_phrase.to_owned()) }
}

impl Default for Response {
    fn default() -> Self {
        Self::new(200)
    }
}

impl HttpMessage for Response {
    fn message(&self) -> &Message {
        &self.message
    }

    fn with_message(&self, message: Message) -> Self {
        Self { message, status: self.status.clone() }
    }
}

#[derive(Debug)]
pub struct ResponseBuilder {
    status: Status,
    body: Option<Body>,
    headers: HeaderStore,
    version: String,
}

impl ResponseBuilder {
    fn new() -> Self {
        Self { status: Status::default(), body: None, headers: HeaderStore::new(), version: DEFAULT_PROTOCOL_VERSION.to_owned() }
    }

    /// Sets the registered status of `code`.
    pub fn status(mut self, code: u16) -> Self {
        self.status = Status::for_code(code);
        self
    }

    /// Sets the registered status of `code` with a custom reason phrase.
    pub fn status_with_reason(mut self, code: u16, reason_phrase: &str) -> Self {
        self.status = registered_status(code, reason_phrase);
        self
    }

    /// Sets a status that does not have to be registered.
    pub fn custom_status(mut self, status: Status) -> Self {
        self.status = status;
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

    pub fn build(self) -> Response {
        let message = Message::new(self.body.unwrap_or_default(), self.headers, self.version);
        Response::from_parts(self.status, message)
    }
}
