use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tracing::{trace, warn};

use super::stream::{FileStream, MemoryStream, RawStream, StreamMetadata, is_readable_mode, is_writable_mode};
use crate::protocol::ResourceError;
use crate::utils::ensure;

#[derive(Debug)]
struct BodyState {
    stream: Option<Box<dyn RawStream>>,
    eof: bool,
}

/// The body of a message, owning exactly one byte stream.
///
/// Every operation takes `&self`: the stream sits behind a lock so that cloning a body
/// snapshots its content atomically. A clone never shares the stream, it copies all
/// bytes into a fresh in-memory stream.
///
/// Once [`detach`](Body::detach)ed or [`close`](Body::close)d, stream operations fail
/// with [`ResourceError::Detached`].
#[derive(Debug)]
pub struct Body {
    state: Mutex<BodyState>,
}

impl Body {
    /// Creates an empty body backed by memory.
    pub fn new() -> Self {
        Self::from_stream(MemoryStream::new())
    }

    pub fn from_stream(stream: impl RawStream + 'static) -> Self {
        Self::from_boxed(Some(Box::new(stream)))
    }

    /// Creates a body over a file, opened with an fopen-style `mode`.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, ResourceError> {
        Ok(Self::from_stream(FileStream::open(path, mode)?))
    }

    fn from_boxed(stream: Option<Box<dyn RawStream>>) -> Self {
        Self { state: Mutex::new(BodyState { stream, eof: false }) }
    }

    fn lock(&self) -> MutexGuard<'_, BodyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_stream<T>(&self, f: impl FnOnce(&mut dyn RawStream, &mut bool) -> Result<T, ResourceError>) -> Result<T, ResourceError> {
        let mut state = self.lock();
        let BodyState { stream, eof } = &mut *state;
        let stream = stream.as_deref_mut().ok_or(ResourceError::Detached)?;
        f(stream, eof)
    }

    /// Takes the stream out of the body, leaving it detached.
    pub fn detach(&self) -> Option<Box<dyn RawStream>> {
        self.lock().stream.take()
    }

    /// Releases the stream, leaving the body detached.
    pub fn close(&self) {
        drop(self.detach());
    }

    pub fn is_detached(&self) -> bool {
        self.lock().stream.is_none()
    }

    /// Returns the size of the stream in bytes, or `None` if it can not be determined.
    pub fn size(&self) -> Option<u64> {
        self.with_stream(|stream, _| {
            ensure!(stream.metadata().seekable, ResourceError::NotSeekable);
            let position = stream.stream_position()?;
            let end = stream.seek(SeekFrom::End(0))?;
            stream.seek(SeekFrom::Start(position))?;
            Ok(end)
        })
        .ok()
    }

    /// Returns the current position of the stream.
    pub fn tell(&self) -> Result<u64, ResourceError> {
        self.with_stream(|stream, _| Ok(stream.stream_position()?))
    }

    /// Returns true once a read has hit the end of the stream. A detached body is
    /// always at its end.
    pub fn eof(&self) -> bool {
        let state = self.lock();
        state.stream.is_none() || state.eof
    }

    pub fn is_seekable(&self) -> bool {
        self.metadata().is_some_and(|metadata| metadata.seekable)
    }

    pub fn is_readable(&self) -> bool {
        self.metadata().is_some_and(|metadata| is_readable_mode(&metadata.mode))
    }

    pub fn is_writable(&self) -> bool {
        self.metadata().is_some_and(|metadata| is_writable_mode(&metadata.mode))
    }

    pub fn seek(&self, pos: SeekFrom) -> Result<u64, ResourceError> {
        self.with_stream(|stream, eof| {
            ensure!(stream.metadata().seekable, ResourceError::NotSeekable);
            let position = stream.seek(pos)?;
            *eof = false;
            Ok(position)
        })
    }

    pub fn rewind(&self) -> Result<(), ResourceError> {
        self.seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Writes all of `data` at the current position and returns the number of bytes written.
    pub fn write(&self, data: &[u8]) -> Result<usize, ResourceError> {
        self.with_stream(|stream, eof| {
            ensure!(is_writable_mode(&stream.metadata().mode), ResourceError::not_writable());
            stream.write_all(data)?;
            *eof = false;
            Ok(data.len())
        })
    }

    /// Reads up to `len` bytes from the current position.
    pub fn read(&self, len: usize) -> Result<Bytes, ResourceError> {
        self.with_stream(|stream, eof| {
            ensure!(is_readable_mode(&stream.metadata().mode), ResourceError::not_readable());
            let mut buf = Vec::new();
            stream.take(len as u64).read_to_end(&mut buf)?;
            if buf.len() < len {
                *eof = true;
            }
            Ok(Bytes::from(buf))
        })
    }

    /// Reads the remainder of the stream.
    pub fn contents(&self) -> Result<Bytes, ResourceError> {
        self.with_stream(|stream, eof| {
            ensure!(is_readable_mode(&stream.metadata().mode), ResourceError::not_readable());
            let buf = read_remaining(stream)?;
            *eof = true;
            Ok(Bytes::from(buf))
        })
    }

    /// Reads the whole stream, rewinding first when it is seekable.
    pub fn read_all(&self) -> Result<Bytes, ResourceError> {
        if self.is_seekable() {
            self.rewind()?;
        }
        self.contents()
    }

    /// Reads the whole stream and restores its position afterwards.
    pub fn snapshot(&self) -> Result<Bytes, ResourceError> {
        self.with_stream(|stream, _| {
            let metadata = stream.metadata();
            ensure!(is_readable_mode(&metadata.mode), ResourceError::not_readable());
            ensure!(metadata.seekable, ResourceError::NotSeekable);

            let position = stream.stream_position()?;
            stream.seek(SeekFrom::Start(0))?;
            let content = read_remaining(stream);
            stream.seek(SeekFrom::Start(position))?;
            Ok(Bytes::from(content?))
        })
    }

    /// Reads the whole stream as text, replacing invalid utf-8 sequences.
    pub fn read_to_string(&self) -> Result<String, ResourceError> {
        self.read_all().map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn metadata(&self) -> Option<StreamMetadata> {
        self.lock().stream.as_ref().map(|stream| stream.metadata())
    }

    pub fn metadata_value(&self, key: &str) -> Option<String> {
        self.metadata().and_then(|metadata| metadata.get(key))
    }
}

fn read_remaining(stream: &mut dyn RawStream) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf)?;
    Ok(buf)
}

/// Copies the full content of a seekable `stream` into a new memory stream at the same
/// position, leaving the position of `stream` untouched.
fn copy_stream(stream: &mut dyn RawStream) -> io::Result<MemoryStream> {
    let position = stream.stream_position()?;
    stream.seek(SeekFrom::Start(0))?;
    let content = read_remaining(stream);
    stream.seek(SeekFrom::Start(position))?;
    let content = content?;

    let mut copy = MemoryStream::from_bytes(&content);
    copy.seek(SeekFrom::Start(position))?;
    trace!(bytes = content.len(), position, stream_type = stream.metadata().stream_type, "copied body stream");
    Ok(copy)
}

impl Clone for Body {
    fn clone(&self) -> Self {
        let mut state = self.lock();
        let Some(stream) = state.stream.as_deref_mut() else {
            return Self::from_boxed(None);
        };

        let metadata = stream.metadata();
        if metadata.seekable {
            let copy = copy_stream(stream).unwrap_or_else(|e| {
                warn!(error = %e, "failed to copy body stream, falling back to an empty body");
                MemoryStream::new()
            });
            return Self::from_stream(copy);
        }

        // an unseekable stream can only be read once: buffer the remainder and hand the
        // same bytes to both bodies
        let content = match read_remaining(stream) {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, stream_type = metadata.stream_type, "failed to buffer body stream, falling back to an empty body");
                return Self::new();
            }
        };
        trace!(bytes = content.len(), stream_type = metadata.stream_type, "buffered unseekable body stream");

        state.stream = Some(Box::new(MemoryStream::from_bytes(&content)));
        state.eof = false;
        Self::from_stream(MemoryStream::from_bytes(&content))
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes the whole content of the body, or nothing if it can not be read.
impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.read_to_string().unwrap_or_default())
    }
}

impl From<&[u8]> for Body {
    fn from(content: &[u8]) -> Self {
        Self::from_stream(MemoryStream::from_bytes(content))
    }
}

impl From<&str> for Body {
    fn from(content: &str) -> Self {
        Self::from(content.as_bytes())
    }
}

impl From<String> for Body {
    fn from(content: String) -> Self {
        Self::from(content.as_bytes())
    }
}

impl From<Vec<u8>> for Body {
    fn from(content: Vec<u8>) -> Self {
        Self::from(content.as_slice())
    }
}

impl From<Bytes> for Body {
    fn from(content: Bytes) -> Self {
        Self::from(content.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use indoc::indoc;

    #[derive(Debug)]
    struct Unseekable(io::Cursor<Vec<u8>>);

    impl Read for Unseekable {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.0.read(buf)
        }
    }

    impl Write for Unseekable {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for Unseekable {
        fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
            Err(io::Error::new(io::ErrorKind::Unsupported, "unseekable"))
        }
    }

    impl RawStream for Unseekable {
        fn metadata(&self) -> StreamMetadata {
            StreamMetadata { mode: "r".to_owned(), seekable: false, uri: None, stream_type: "PIPE" }
        }
    }

    #[test]
    fn test_from_str_starts_at_beginning() {
        let body = Body::from("hello world");

        assert_eq!(body.tell().unwrap(), 0);
        assert_eq!(body.size(), Some(11));
        assert_eq!(body.to_string(), "hello world");
        assert!(body.is_readable());
        assert!(body.is_writable());
        assert!(body.is_seekable());
    }

    #[test]
    fn test_read_and_eof() {
        let body = Body::from("hello world");

        assert_eq!(body.read(5).unwrap(), "hello");
        assert!(!body.eof());
        assert_eq!(body.tell().unwrap(), 5);
        assert_eq!(body.read(100).unwrap(), " world");
        assert!(body.eof());

        body.rewind().unwrap();
        assert!(!body.eof());
        assert_eq!(body.contents().unwrap(), "hello world");
        assert!(body.eof());
    }

    #[test]
    fn test_write_then_read_all() {
        let body = Body::new();
        assert_eq!(body.size(), Some(0));

        body.write(b"foo").unwrap();
        body.write(b"bar").unwrap();

        assert_eq!(body.tell().unwrap(), 6);
        assert_eq!(body.contents().unwrap(), "");
        assert_eq!(body.read_all().unwrap(), "foobar");
    }

    #[test]
    fn test_snapshot_does_not_move_position() {
        let body = Body::from("0123456789");
        body.read(4).unwrap();

        assert_eq!(body.snapshot().unwrap(), "0123456789");
        assert_eq!(body.tell().unwrap(), 4);
    }

    #[test]
    fn test_size_does_not_move_position() {
        let body = Body::from("0123456789");
        body.seek(SeekFrom::Start(4)).unwrap();

        assert_eq!(body.size(), Some(10));
        assert_eq!(body.tell().unwrap(), 4);
    }

    #[test]
    fn test_clone_copies_content_and_position() {
        let body = Body::from("original");
        body.seek(SeekFrom::Start(3)).unwrap();

        let copy = body.clone();
        assert_eq!(body.tell().unwrap(), 3);
        assert_eq!(copy.tell().unwrap(), 3);

        copy.seek(SeekFrom::End(0)).unwrap();
        copy.write(b" copy").unwrap();

        assert_eq!(copy.to_string(), "original copy");
        assert_eq!(body.to_string(), "original");
    }

    #[test]
    fn test_detach() {
        let body = Body::from("content");
        let stream = body.detach();

        assert!(stream.is_some());
        assert!(body.is_detached());
        assert!(body.eof());
        assert_eq!(body.size(), None);
        assert!(body.metadata().is_none());
        assert!(!body.is_readable());
        assert_matches!(body.tell(), Err(ResourceError::Detached));
        assert_matches!(body.read(1), Err(ResourceError::Detached));
        assert_matches!(body.write(b"x"), Err(ResourceError::Detached));
        assert_matches!(body.contents(), Err(ResourceError::Detached));
        assert_eq!(body.to_string(), "");

        assert!(body.clone().is_detached());
    }

    #[test]
    fn test_close() {
        let body = Body::from("content");
        body.close();

        assert!(body.is_detached());
        assert_matches!(body.seek(SeekFrom::Start(0)), Err(ResourceError::Detached));
    }

    #[test]
    fn test_unseekable_stream() {
        let body = Body::from_stream(Unseekable(io::Cursor::new(b"streamed".to_vec())));

        assert!(!body.is_seekable());
        assert!(body.is_readable());
        assert!(!body.is_writable());
        assert_eq!(body.size(), None);
        assert_matches!(body.rewind(), Err(ResourceError::NotSeekable));
        assert_matches!(body.write(b"x"), Err(ResourceError::Unsupported { operation: "writable" }));
        assert_eq!(body.read(6).unwrap(), "stream");

        // the remainder is buffered into memory for both bodies
        let copy = body.clone();
        assert_eq!(copy.contents().unwrap(), "ed");
        assert_eq!(body.contents().unwrap(), "ed");
        assert!(body.is_seekable());
    }

    #[test]
    fn test_read_unbounded_len() {
        let body = Body::from("abc");

        assert_eq!(body.read(usize::MAX).unwrap(), "abc");
        assert!(body.eof());
    }

    #[test]
    fn test_concurrent_clones_see_same_snapshot() {
        let body = Body::from("0123456789");
        body.seek(SeekFrom::Start(4)).unwrap();

        let copies = std::thread::scope(|scope| {
            let handles = (0..8).map(|_| scope.spawn(|| body.clone())).collect::<Vec<_>>();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect::<Vec<_>>()
        });

        assert_eq!(body.tell().unwrap(), 4);
        for copy in copies {
            assert_eq!(copy.tell().unwrap(), 4);
            assert_eq!(copy.snapshot().unwrap(), "0123456789");
        }
    }

    #[test]
    fn test_file_body() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(indoc! {"
            first line
            second line
        "}.as_bytes())
        .unwrap();

        let body = Body::open(file.path(), "r").unwrap();
        assert!(body.is_readable());
        assert!(!body.is_writable());
        assert_eq!(body.metadata_value("mode").as_deref(), Some("r"));
        assert_eq!(body.metadata_value("stream_type").as_deref(), Some("STDIO"));
        assert_eq!(body.metadata_value("uri"), Some(file.path().display().to_string()));
        assert_eq!(body.size(), Some(23));
        assert_matches!(body.write(b"x"), Err(ResourceError::Unsupported { .. }));

        let copy = body.clone();
        assert_eq!(copy.metadata_value("stream_type").as_deref(), Some("MEMORY"));
        assert_eq!(copy.to_string(), "first line\nsecond line\n");
    }
}
