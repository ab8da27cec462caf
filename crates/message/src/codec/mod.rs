//! String codecs behind the value objects.
//!
//! - [`query_codec`]: query strings to [`QueryParameters`](crate::protocol::QueryParameters)
//!   and back, with form-style (`+` for space) url encoding
//! - [`uri_codec`]: uri strings to [`UriComponents`](crate::protocol::UriComponents) and back
//!
//! The codecs are free functions without state. The value objects in
//! [`protocol`](crate::protocol) call them, and so can anyone who needs the raw
//! conversions.

pub mod query_codec;
pub mod uri_codec;
