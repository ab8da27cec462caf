//! Message bodies and the byte streams behind them.

#[allow(clippy::module_inception, reason = "the type is named after the module")]
mod body;
pub use body::Body;

mod stream;
pub use stream::FileStream;
pub use stream::MemoryStream;
pub use stream::RawStream;
pub use stream::READ_MODES;
pub use stream::StreamMetadata;
pub use stream::WRITE_MODES;
pub use stream::is_readable_mode;
pub use stream::is_writable_mode;
