//! Immutable http message value objects.
//!
//! Every type in this module, except the [`QueryParameters`] builder, follows the same
//! contract: accessors read, and `with_*` operations return a new, independently owned
//! value while the receiver stays as it was.
//!
//! # Architecture
//!
//! - **Uri** ([`uri`]): [`Uri`] over its parsed [`UriComponents`], with the four
//!   request-target forms and component derivations
//!
//! - **Query** ([`query`]): [`QueryParameters`] and [`QueryValue`], nested query values
//!   rendered with bracket syntax
//!
//! - **Headers** ([`header`]): [`Header`], the case-insensitive [`HeaderStore`] and
//!   [`BasicAuthHeader`]
//!
//! - **Body** ([`body`]): [`Body`] owning one [`RawStream`], deep copied on clone
//!
//! - **Messages**: [`Message`] and the [`HttpMessage`] derivations shared by
//!   [`Request`] and [`Response`]
//!   - [`Method`]: the accepted request methods
//!   - [`Status`]: response status backed by a registry of known codes
//!
//! - **Error Handling**: [`MessageError`] over [`ParseError`], [`ValidationError`],
//!   [`ResourceError`] and [`SerializationError`]
//!
//! Requests and responses convert to and from the types of the `http` crate, see
//! [`Request::to_http`] and [`Response::to_http`].
//!
//! # Example
//!
//! ```
//! use micro_message::protocol::{HttpMessage, Method, Request, Uri};
//!
//! let request = Request::new(Method::GET, Uri::parse("https://example.com/search?q=rust").unwrap());
//! let paged = request.with_parameters([("page", "2")]).unwrap();
//!
//! assert_eq!(paged.request_target(), "/search?q=rust&page=2");
//! assert_eq!(paged.header_line("host"), "example.com");
//! assert_eq!(request.request_target(), "/search?q=rust");
//! ```

pub mod uri;
pub use uri::IntoQueryString;
pub use uri::Uri;
pub use uri::UriComponents;
pub use uri::default_port;

pub mod query;
pub use query::QueryParameters;
pub use query::QueryValue;

pub mod header;
pub use header::BasicAuthHeader;
pub use header::Header;
pub use header::HeaderEntry;
pub use header::HeaderStore;
pub use header::HeaderValues;

pub mod body;
pub use body::Body;
pub use body::RawStream;

mod message;
pub use message::DEFAULT_PROTOCOL_VERSION;
pub use message::HttpMessage;
pub use message::Message;

mod method;
pub use method::Method;

mod status;
pub use status::Status;

mod request;
pub use request::Request;
pub use request::RequestBuilder;

mod response;
pub use response::Response;
pub use response::ResponseBuilder;

mod convert;

mod error;
pub use error::MessageError;
pub use error::ParseError;
pub use error::ResourceError;
pub use error::SerializationError;
pub use error::ValidationError;
