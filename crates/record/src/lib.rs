//! # Record — shared mutation record and wire codec
//!
//! A [`Record`] is the unit of write everywhere in SiltDB: the WAL appends
//! records, the memtable stores them, and the SSTable data region is a sorted
//! sequence of them. Both on-disk consumers use the exact same encoding, so
//! the codec lives here once.
//!
//! ## Binary layout
//!
//! ```text
//! [kind: u8][key_len: i32 LE][value_len: i32 LE][key bytes][value bytes]
//! ```
//!
//! A tombstone is a record with `kind = Delete` and an empty value. There is
//! no framing and no checksum — a truncated tail is detected purely by
//! running out of bytes mid-record, and the decoder reports it as
//! [`DecodeError::Truncated`] so the caller can treat it as end-of-stream.

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Read, Write};
use thiserror::Error;

/// Maximum key size accepted on encode and trusted on decode (64 KiB).
pub const MAX_KEY_BYTES: usize = 64 * 1024;
/// Maximum value size accepted on encode and trusted on decode (10 MiB).
pub const MAX_VALUE_BYTES: usize = 10 * 1024 * 1024;

/// The operation a record represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Kind {
    /// A key-value insertion or overwrite.
    Put = 0,
    /// A tombstone: the key is logically deleted.
    Delete = 1,
}

impl Kind {
    /// Decodes a kind from its wire byte. Any byte other than 0 or 1 is
    /// not a valid record boundary.
    #[must_use]
    pub fn from_u8(b: u8) -> Option<Kind> {
        match b {
            0 => Some(Kind::Put),
            1 => Some(Kind::Delete),
            _ => None,
        }
    }

    /// The wire byte for this kind.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A single mutation: `(kind, key, value)`.
///
/// Tombstones carry an empty value by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub kind: Kind,
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

impl Record {
    /// A `Put` record.
    #[must_use]
    pub fn put(key: Vec<u8>, value: Vec<u8>) -> Record {
        Record {
            kind: Kind::Put,
            key,
            value,
        }
    }

    /// A `Delete` record (tombstone, empty value).
    #[must_use]
    pub fn tombstone(key: Vec<u8>) -> Record {
        Record {
            kind: Kind::Delete,
            key,
            value: Vec::new(),
        }
    }

    /// Number of bytes this record occupies on the wire.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        1 + 4 + 4 + self.key.len() + self.value.len()
    }
}

/// Why a decode stopped short of a complete record.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// An underlying I/O error other than end-of-stream.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The stream ended in the middle of a record.
    #[error("truncated record")]
    Truncated,

    /// The bytes at the cursor are not a record (bad kind byte, negative or
    /// oversized length).
    #[error("malformed record")]
    Malformed,
}

/// Encodes `rec` to `w` in the shared wire layout.
///
/// Fails with `InvalidInput` if the key or value exceeds the size caps, so
/// an unencodable record never reaches the file half-written.
pub fn write_record<W: Write>(w: &mut W, rec: &Record) -> io::Result<()> {
    write_parts(w, rec.kind, &rec.key, &rec.value)
}

/// Encodes one record from borrowed parts. Same layout and size checks as
/// [`write_record`]; lets streaming writers avoid materializing a `Record`.
pub fn write_parts<W: Write>(w: &mut W, kind: Kind, key: &[u8], value: &[u8]) -> io::Result<()> {
    let key_len = to_wire_len(key.len(), MAX_KEY_BYTES, "key")?;
    let value_len = to_wire_len(value.len(), MAX_VALUE_BYTES, "value")?;

    w.write_u8(kind.as_u8())?;
    w.write_i32::<LittleEndian>(key_len)?;
    w.write_i32::<LittleEndian>(value_len)?;
    w.write_all(key)?;
    w.write_all(value)?;
    Ok(())
}

/// Decodes the next record from `r`.
///
/// Returns `Ok(None)` on a clean end-of-stream (no bytes left at a record
/// boundary). A stream that ends mid-record yields
/// [`DecodeError::Truncated`]; lengths that cannot be valid yield
/// [`DecodeError::Malformed`]. Callers replaying a log or scanning a data
/// region treat all three as "stop here".
pub fn read_record<R: Read>(r: &mut R) -> Result<Option<Record>, DecodeError> {
    let kind = match r.read_u8() {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(DecodeError::Io(e)),
    };
    let kind = Kind::from_u8(kind).ok_or(DecodeError::Malformed)?;

    let key_len = read_len(r, MAX_KEY_BYTES)?;
    let value_len = read_len(r, MAX_VALUE_BYTES)?;

    let mut key = vec![0u8; key_len];
    read_body(r, &mut key)?;
    let mut value = vec![0u8; value_len];
    read_body(r, &mut value)?;

    Ok(Some(Record { kind, key, value }))
}

fn to_wire_len(len: usize, cap: usize, what: &str) -> io::Result<i32> {
    if len > cap {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} too large: {} bytes (max {})", what, len, cap),
        ));
    }
    Ok(len as i32)
}

fn read_len<R: Read>(r: &mut R, cap: usize) -> Result<usize, DecodeError> {
    let raw = match r.read_i32::<LittleEndian>() {
        Ok(v) => v,
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(DecodeError::Truncated)
        }
        Err(e) => return Err(DecodeError::Io(e)),
    };
    if raw < 0 || raw as usize > cap {
        return Err(DecodeError::Malformed);
    }
    Ok(raw as usize)
}

fn read_body<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<(), DecodeError> {
    match r.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(DecodeError::Truncated),
        Err(e) => Err(DecodeError::Io(e)),
    }
}

#[cfg(test)]
mod tests;
