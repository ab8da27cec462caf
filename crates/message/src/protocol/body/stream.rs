use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use bytes::BytesMut;

use crate::protocol::ResourceError;

/// Modes a stream can be read in. A mode matches if it starts with one of these, which
/// accounts for a trailing `b` or `t`.
pub const READ_MODES: [&str; 6] = ["r", "r+", "w+", "a+", "x+", "c+"];

/// Modes a stream can be written in, matched like [`READ_MODES`].
pub const WRITE_MODES: [&str; 9] = ["r+", "w", "w+", "a", "a+", "x", "x+", "c", "c+"];

pub fn is_readable_mode(mode: &str) -> bool {
    READ_MODES.iter().any(|prefix| mode.starts_with(prefix))
}

pub fn is_writable_mode(mode: &str) -> bool {
    WRITE_MODES.iter().any(|prefix| mode.starts_with(prefix))
}

/// Describes the stream behind a body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    pub mode: String,
    pub seekable: bool,
    pub uri: Option<String>,
    pub stream_type: &'static str,
}

impl StreamMetadata {
    /// Looks up a single entry by key: `mode`, `seekable`, `uri` or `stream_type`.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "mode" => Some(self.mode.clone()),
            "seekable" => Some(self.seekable.to_string()),
            "uri" => self.uri.clone(),
            "stream_type" => Some(self.stream_type.to_owned()),
            _ => None,
        }
    }
}

/// A byte stream that can back a [`Body`](super::Body).
///
/// Implementations report whether they are seekable and which operations their mode
/// permits through [`RawStream::metadata`]; the body checks those before delegating.
pub trait RawStream: Read + Write + Seek + Send + fmt::Debug {
    fn metadata(&self) -> StreamMetadata;
}

/// A growable in-memory stream.
#[derive(Debug, Default)]
pub struct MemoryStream {
    buf: BytesMut,
    position: usize,
}

impl MemoryStream {
    pub const MODE: &'static str = "w+b";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a stream holding `bytes`, positioned at the start.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self { buf: BytesMut::from(bytes), position: 0 }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Read for MemoryStream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let remaining = self.buf.get(self.position..).unwrap_or_default();
        let n = remaining.len().min(out.len());
        out[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}

impl Write for MemoryStream {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let end = self.position + data.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[self.position..end].copy_from_slice(data);
        self.position = end;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, offset) = match pos {
            SeekFrom::Start(offset) => (0, i64::try_from(offset).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?),
            SeekFrom::Current(offset) => (self.position, offset),
            SeekFrom::End(offset) => (self.buf.len(), offset),
        };

        let position = i64::try_from(base)
            .ok()
            .and_then(|base| base.checked_add(offset))
            .and_then(|position| usize::try_from(position).ok())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid seek to a negative or overflowing position"))?;

        self.position = position;
        Ok(position as u64)
    }
}

impl RawStream for MemoryStream {
    fn metadata(&self) -> StreamMetadata {
        StreamMetadata { mode: Self::MODE.to_owned(), seekable: true, uri: Some("memory".to_owned()), stream_type: "MEMORY" }
    }
}

/// A stream over a file opened with an fopen-style mode string.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
    mode: String,
}

impl FileStream {
    /// Opens `path` with one of the modes `r`, `r+`, `w`, `w+`, `a`, `a+`, `x`, `x+`,
    /// `c` or `c+`, optionally followed by `b` or `t`.
    pub fn open(path: impl AsRef<Path>, mode: &str) -> Result<Self, ResourceError> {
        let path = path.as_ref();
        let file = open_options(mode)?.open(path)?;
        Ok(Self { file, path: path.to_path_buf(), mode: mode.to_owned() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_options(mode: &str) -> Result<OpenOptions, ResourceError> {
    let mut options = OpenOptions::new();
    match mode.trim_end_matches(['b', 't']) {
        "r" => options.read(true),
        "r+" => options.read(true).write(true),
        "w" => options.write(true).create(true).truncate(true),
        "w+" => options.read(true).write(true).create(true).truncate(true),
        "a" => options.append(true).create(true),
        "a+" => options.read(true).append(true).create(true),
        "x" => options.write(true).create_new(true),
        "x+" => options.read(true).write(true).create_new(true),
        "c" => options.write(true).create(true),
        "c+" => options.read(true).write(true).create(true),
        _ => return Err(ResourceError::invalid_mode(mode)),
    };
    Ok(options)
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl RawStream for FileStream {
    fn metadata(&self) -> StreamMetadata {
        StreamMetadata {
            mode: self.mode.clone(),
            seekable: true,
            uri: Some(self.path.display().to_string()),
            stream_type: "STDIO",
        }
    }
}
