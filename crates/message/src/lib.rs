//! Immutable http message value objects
//!
//! This crate models requests, responses, uris, headers, query strings and bodies as
//! values. Nothing in it performs network i/o: it is the data layer that http clients
//! and servers build, inspect and derive messages with.
//!
//! # Features
//!
//! - Copy-on-write `with_*` derivations that never touch the receiver
//! - Uri parsing and formatting with well-known default ports
//! - Query strings with nested bracket syntax (`param[key]=value`)
//! - Case-insensitive header collections
//! - Seekable body streams over memory or files, deep copied on clone
//! - Json bodies and basic authorization headers
//! - Conversion to and from the types of the `http` crate
//!
//! # Example
//!
//! ```
//! use micro_message::protocol::{HttpMessage, Request, Response};
//!
//! let request = Request::builder()
//!     .method("post")
//!     .uri("https://api.example.com/items")
//!     .build()
//!     .unwrap()
//!     .with_json(&serde_json::json!({"name": "widget"}))
//!     .unwrap();
//!
//! assert_eq!(request.header_line("Host"), "api.example.com");
//! assert_eq!(request.header_line("content-type"), "application/json");
//! assert_eq!(request.body().to_string(), r#"{"name":"widget"}"#);
//!
//! let response = Response::new(200).with_status(429, "");
//! assert_eq!(response.status().to_string(), "429 Too Many Requests");
//! assert!(response.status().should_retry());
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: the value objects and their errors
//! - [`codec`]: the query string and uri string codecs they are built on
//!
//! # Logging
//!
//! The crate emits `trace` events through `tracing` when it derives a `Host` header,
//! misses the status registry or deep copies a body, and a `warn` event when a body
//! can not be copied. Install a subscriber to see them, see
//! `examples/compose_request.rs`.

pub mod codec;
pub mod protocol;

mod utils;
pub(crate) use utils::{ensure, json_type};
