//! Header fields and the case-insensitive header collection.
//!
//! - [`Header`]: one field, name in its original case plus a single or multi-valued value
//! - [`HeaderStore`]: immutable collection keyed by lower-cased name, every change
//!   returns a new store
//! - [`BasicAuthHeader`]: encoder and decoder for `Authorization: Basic` credentials

#[allow(clippy::module_inception, reason = "the type is named after the module")]
mod header;
pub use header::Header;
pub use header::HeaderValues;

mod header_store;
pub use header_store::HeaderEntry;
pub use header_store::HeaderStore;

mod basic_auth;
pub use basic_auth::BasicAuthHeader;
