//! Append-only binary store for serialized pipeline models.
//!
//! The store file is a headerless concatenation of self-delimiting
//! records, one fitted pipeline per record, in write order. Each
//! record carries a fixed 16-byte header followed by a
//! postcard-encoded payload:
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     Magic ("LBNK")
//! 4       1     Format version
//! 5       1     Record kind
//! 6       2     Reserved
//! 8       4     Payload size (bytes, little-endian)
//! 12      4     CRC32 of payload (little-endian)
//! ```
//!
//! End of store is detected by hitting end-of-file where the next
//! record header would begin; that terminates reading normally.
//! Records are decoded one at a time, so a store of any length is
//! never buffered whole.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use thiserror::Error;

use crate::ml::pipeline::PipelineModel;

/// Magic bytes opening every record.
pub const MAGIC: &[u8; 4] = b"LBNK";

/// Current record format version.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the fixed record header in bytes.
pub const RECORD_HEADER_SIZE: usize = 16;

/// Record kind identifier stored in each record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordKind {
    /// A fitted labeled pipeline.
    Pipeline = 0,
}

impl RecordKind {
    /// Convert from u8, returning None for unknown values.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Pipeline),
            _ => None,
        }
    }
}

/// Errors raised while writing or reading the model store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O failure on the underlying stream.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Record payload failed to encode.
    #[error("encoding error: {0}")]
    Encoding(#[source] postcard::Error),
    /// A record opened with the wrong magic bytes.
    #[error("not a model-store record")]
    NotAStoreRecord,
    /// A record written by a newer format version.
    #[error("record requires store format {0} or later")]
    UnsupportedVersion(u8),
    /// A record whose kind tag is not the expected model shape.
    ///
    /// Store content is untrusted input; a foreign record aborts
    /// reading instead of being skipped.
    #[error("record kind {0} is not the expected fitted-pipeline shape")]
    UntrustedRecord(u8),
    /// The stream ended in the middle of a record.
    #[error("store truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    /// Payload bytes did not match their recorded checksum.
    #[error("checksum mismatch: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },
    /// Payload bytes failed to decode into a pipeline model.
    #[error("corrupt record payload: {0}")]
    Decoding(#[source] postcard::Error),
}

/// Sequential writer appending fitted pipelines to one store.
#[derive(Debug)]
pub struct StoreWriter<W: Write> {
    inner: W,
}

impl StoreWriter<BufWriter<File>> {
    /// Create (or truncate) the store at `path` for a fresh run.
    pub fn create(path: &Path) -> Result<Self, StoreError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> StoreWriter<W> {
    /// Wrap an open stream; the caller owns the stream's lifetime.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Append one fitted pipeline as the next record.
    pub fn append(&mut self, model: &PipelineModel) -> Result<(), StoreError> {
        let payload = postcard::to_allocvec(model).map_err(StoreError::Encoding)?;
        write_record(&mut self.inner, RecordKind::Pipeline as u8, &payload)
    }

    /// Flush buffered records to the underlying stream.
    pub fn finish(mut self) -> Result<(), StoreError> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Write one framed record with an arbitrary kind tag.
pub fn write_record<W: Write>(
    writer: &mut W,
    kind: u8,
    payload: &[u8],
) -> Result<(), StoreError> {
    let mut header = [0u8; RECORD_HEADER_SIZE];
    header[0..4].copy_from_slice(MAGIC);
    header[4] = FORMAT_VERSION;
    header[5] = kind;
    header[8..12].copy_from_slice(&(payload.len() as u32).to_le_bytes());
    header[12..16].copy_from_slice(&crc32fast::hash(payload).to_le_bytes());
    writer.write_all(&header)?;
    writer.write_all(payload)?;
    Ok(())
}

/// Lazy reader yielding stored pipelines in write order.
///
/// Forward-only and non-restartable; open a fresh reader to rescan.
/// The first error (or the end of the store) fuses the iterator.
#[derive(Debug)]
pub struct StoreReader<R: Read> {
    inner: R,
    done: bool,
}

impl StoreReader<BufReader<File>> {
    /// Open the store at `path` for reading.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> StoreReader<R> {
    /// Wrap an open stream positioned at the first record.
    pub fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    fn read_record(&mut self) -> Result<Option<PipelineModel>, StoreError> {
        let mut header = [0u8; RECORD_HEADER_SIZE];
        match read_exact_or_eof(&mut self.inner, &mut header)? {
            ReadOutcome::Eof => return Ok(None),
            ReadOutcome::Partial(actual) => {
                return Err(StoreError::Truncated {
                    expected: RECORD_HEADER_SIZE,
                    actual,
                });
            }
            ReadOutcome::Full => {}
        }
        if &header[0..4] != MAGIC {
            return Err(StoreError::NotAStoreRecord);
        }
        let version = header[4];
        if version > FORMAT_VERSION {
            return Err(StoreError::UnsupportedVersion(version));
        }
        // The shape check happens before the payload is even decoded.
        let kind = header[5];
        if RecordKind::from_u8(kind) != Some(RecordKind::Pipeline) {
            return Err(StoreError::UntrustedRecord(kind));
        }
        let payload_size =
            u32::from_le_bytes([header[8], header[9], header[10], header[11]]) as usize;
        let expected_checksum =
            u32::from_le_bytes([header[12], header[13], header[14], header[15]]);

        let mut payload = vec![0u8; payload_size];
        match read_exact_or_eof(&mut self.inner, &mut payload)? {
            ReadOutcome::Full => {}
            ReadOutcome::Eof => {
                return Err(StoreError::Truncated {
                    expected: payload_size,
                    actual: 0,
                });
            }
            ReadOutcome::Partial(actual) => {
                return Err(StoreError::Truncated {
                    expected: payload_size,
                    actual,
                });
            }
        }
        let actual_checksum = crc32fast::hash(&payload);
        if actual_checksum != expected_checksum {
            return Err(StoreError::ChecksumMismatch {
                expected: expected_checksum,
                actual: actual_checksum,
            });
        }
        let model = postcard::from_bytes(&payload).map_err(StoreError::Decoding)?;
        Ok(Some(model))
    }
}

impl<R: Read> Iterator for StoreReader<R> {
    type Item = Result<PipelineModel, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(model)) => Some(Ok(model)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

enum ReadOutcome {
    /// Buffer completely filled.
    Full,
    /// No bytes remained at the start of the read.
    Eof,
    /// The stream ended partway through the buffer.
    Partial(usize),
}

/// Fill `buf` from `reader`, distinguishing a clean end-of-stream at
/// the first byte from a mid-record truncation.
fn read_exact_or_eof<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<ReadOutcome, std::io::Error> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Ok(if filled == 0 {
                    ReadOutcome::Eof
                } else {
                    ReadOutcome::Partial(filled)
                });
            }
            Ok(read) => filled += read,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(ReadOutcome::Full)
}
