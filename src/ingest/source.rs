//! Chunk sources feeding the parser

use bzip2::read::BzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Terminal failures of an ingest run
///
/// Malformed markup and values are never errors; only losing the input
/// itself (or being asked to stop) ends a run early.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Source read failed: {0}")]
    Source(String),

    #[error("Ingest cancelled")]
    Cancelled,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// An ordered supply of byte chunks making up one document
pub trait ChunkSource: Send {
    /// Next chunk, or `None` once the document is exhausted.
    fn next_chunk(&mut self) -> Result<Option<&[u8]>, IngestError>;

    /// Expected size in bytes, used only for progress reporting
    fn total_bytes(&self) -> Option<u64>;

    /// Bytes consumed so far, in the same unit as [`ChunkSource::total_bytes`]
    fn byte_position(&self) -> u64;

    /// Human-readable name for logs
    fn source_name(&self) -> &str;
}

/// Reader wrapper that counts bytes pulled through it
struct CountingReader<R> {
    inner: R,
    count: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.count += n as u64;
        Ok(n)
    }
}

enum FileReader {
    Plain(File),
    /// Position is tracked on the compressed side
    Bzip2(BzDecoder<CountingReader<BufReader<File>>>),
}

/// Legends export on disk, plain or bzip2-compressed
pub struct FileSource {
    path: PathBuf,
    name: String,
    reader: FileReader,
    buffer: Vec<u8>,
    total: u64,
    plain_position: u64,
}

impl FileSource {
    /// Open a file. Files ending in `.bz2` are decompressed on the fly.
    pub fn open(path: impl AsRef<Path>, chunk_size: usize) -> Result<Self, IngestError> {
        if chunk_size == 0 {
            return Err(IngestError::Config("chunk_size must be greater than 0".into()));
        }

        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let total = file.metadata()?.len();

        let is_bz2 = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("bz2"))
            .unwrap_or(false);

        let reader = if is_bz2 {
            let counting = CountingReader {
                inner: BufReader::with_capacity(chunk_size, file),
                count: 0,
            };
            FileReader::Bzip2(BzDecoder::new(counting))
        } else {
            FileReader::Plain(file)
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            path,
            name,
            reader,
            buffer: vec![0; chunk_size],
            total,
            plain_position: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self.reader, FileReader::Bzip2(_))
    }
}

impl ChunkSource for FileSource {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>, IngestError> {
        let n = loop {
            let result = match &mut self.reader {
                FileReader::Plain(file) => file.read(&mut self.buffer),
                FileReader::Bzip2(decoder) => decoder.read(&mut self.buffer),
            };
            match result {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(IngestError::Io(e)),
            }
        };

        if n == 0 {
            return Ok(None);
        }
        self.plain_position += n as u64;
        Ok(Some(&self.buffer[..n]))
    }

    fn total_bytes(&self) -> Option<u64> {
        Some(self.total)
    }

    fn byte_position(&self) -> u64 {
        match &self.reader {
            FileReader::Plain(_) => self.plain_position,
            FileReader::Bzip2(decoder) => decoder.get_ref().count,
        }
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

/// In-memory document split into fixed-size chunks
pub struct MemorySource {
    data: Vec<u8>,
    chunk_size: usize,
    position: usize,
}

impl MemorySource {
    /// A `chunk_size` of zero is treated as one.
    pub fn new(data: impl Into<Vec<u8>>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            chunk_size: chunk_size.max(1),
            position: 0,
        }
    }
}

impl ChunkSource for MemorySource {
    fn next_chunk(&mut self) -> Result<Option<&[u8]>, IngestError> {
        if self.position >= self.data.len() {
            return Ok(None);
        }
        let start = self.position;
        let end = (start + self.chunk_size).min(self.data.len());
        self.position = end;
        Ok(Some(&self.data[start..end]))
    }

    fn total_bytes(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }

    fn byte_position(&self) -> u64 {
        self.position as u64
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}

/// Chunks pulled from an arbitrary iterator, e.g. a channel or network body
pub struct IterSource<I> {
    chunks: I,
    current: Vec<u8>,
    position: u64,
    total: Option<u64>,
    name: String,
}

impl<I> IterSource<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>> + Send,
{
    pub fn new(chunks: I, total: Option<u64>) -> Self {
        Self {
            chunks,
            current: Vec::new(),
            position: 0,
            total,
            name: "stream".to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<I> ChunkSource for IterSource<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>> + Send,
{
    fn next_chunk(&mut self) -> Result<Option<&[u8]>, IngestError> {
        match self.chunks.next() {
            None => Ok(None),
            Some(Err(e)) => Err(IngestError::Source(e.to_string())),
            Some(Ok(chunk)) => {
                self.position += chunk.len() as u64;
                self.current = chunk;
                Ok(Some(&self.current))
            }
        }
    }

    fn total_bytes(&self) -> Option<u64> {
        self.total
    }

    fn byte_position(&self) -> u64 {
        self.position
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn drain(source: &mut dyn ChunkSource) -> Result<Vec<u8>, IngestError> {
        let mut out = Vec::new();
        while let Some(chunk) = source.next_chunk()? {
            out.extend_from_slice(chunk);
        }
        Ok(out)
    }

    #[test]
    fn test_memory_source_chunks() {
        let mut source = MemorySource::new(b"abcdefg".to_vec(), 3);
        assert_eq!(source.next_chunk().unwrap(), Some(&b"abc"[..]));
        assert_eq!(source.byte_position(), 3);
        assert_eq!(drain(&mut source).unwrap(), b"defg");
        assert_eq!(source.byte_position(), 7);
        assert_eq!(source.next_chunk().unwrap(), None);
    }

    #[test]
    fn test_iter_source_surfaces_failure() {
        let chunks = vec![
            Ok(b"<df_world>".to_vec()),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away")),
        ];
        let mut source = IterSource::new(chunks.into_iter(), None);
        assert!(source.next_chunk().unwrap().is_some());
        let err = source.next_chunk().unwrap_err();
        assert!(matches!(err, IngestError::Source(ref msg) if msg.contains("peer went away")));
    }

    #[test]
    fn test_file_source_plain() {
        let mut file = tempfile::Builder::new().suffix(".xml").tempfile().unwrap();
        file.write_all(b"<df_world></df_world>").unwrap();

        let mut source = FileSource::open(file.path(), 4).unwrap();
        assert!(!source.is_compressed());
        assert_eq!(source.total_bytes(), Some(21));
        assert_eq!(drain(&mut source).unwrap(), b"<df_world></df_world>");
        assert_eq!(source.byte_position(), 21);
    }

    #[test]
    fn test_file_source_bzip2() {
        let payload = b"<df_world><name>Compressed</name></df_world>".repeat(20);
        let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
        encoder.write_all(&payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut file = tempfile::Builder::new().suffix(".xml.bz2").tempfile().unwrap();
        file.write_all(&compressed).unwrap();
        file.flush().unwrap();

        let mut source = FileSource::open(file.path(), 64).unwrap();
        assert!(source.is_compressed());
        assert_eq!(drain(&mut source).unwrap(), payload);
        assert_eq!(source.byte_position(), compressed.len() as u64);
        assert_eq!(source.total_bytes(), Some(compressed.len() as u64));
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            FileSource::open(file.path(), 0),
            Err(IngestError::Config(_))
        ));
    }
}
