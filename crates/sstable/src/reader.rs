use anyhow::Result;
use bloom::BloomFilter;
use memtable::Entry;
use record::{read_record, DecodeError};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::warn;

use crate::format::{read_footer, FOOTER_BYTES};

/// Point lookup in a single SSTable file.
///
/// 1. Files too small to hold a footer are a miss.
/// 2. The footer gives the filter offset `F`; a file whose size is not
///    exactly `F + bloom_bytes + 8` cannot be a table of this deployment's
///    layout and is reported as a miss rather than an error.
/// 3. The filter is consulted first — a negative answer skips the scan.
/// 4. Otherwise the data region `[0, F)` is scanned sequentially; the first
///    record whose key matches wins. A found tombstone is returned like any
///    entry (`kind == Delete`) for the engine to interpret.
///
/// An undecodable data region ends the scan as a miss; the file is left in
/// place. The file handle lives only for the duration of the call.
///
/// `bloom_bytes` must match the value the table was written with.
pub fn search_file<P: AsRef<Path>>(
    path: P,
    key: &[u8],
    bloom_bytes: usize,
) -> Result<Option<Entry>> {
    let path = path.as_ref();
    let mut f = File::open(path)?;

    let filesize = f.metadata()?.len();
    if filesize < FOOTER_BYTES {
        return Ok(None);
    }

    let (filter_offset, _) = read_footer(&mut f)?;
    if filter_offset + bloom_bytes as u64 + FOOTER_BYTES != filesize {
        warn!(
            path = %path.display(),
            "table layout mismatch (footer {} vs size {}), treating as miss",
            filter_offset,
            filesize
        );
        return Ok(None);
    }

    f.seek(SeekFrom::Start(filter_offset))?;
    let mut bits = vec![0u8; bloom_bytes];
    f.read_exact(&mut bits)?;
    if !BloomFilter::from_bits(bits).may_contain(key) {
        return Ok(None);
    }

    f.seek(SeekFrom::Start(0))?;
    let mut data = BufReader::new(f).take(filter_offset);
    loop {
        match read_record(&mut data) {
            Ok(Some(rec)) if rec.key == key => {
                return Ok(Some(Entry {
                    value: rec.value,
                    kind: rec.kind,
                }))
            }
            Ok(Some(_)) => continue,
            Ok(None) => return Ok(None),
            Err(DecodeError::Truncated) | Err(DecodeError::Malformed) => {
                warn!(path = %path.display(), "undecodable record in data region, treating as miss");
                return Ok(None);
            }
            Err(DecodeError::Io(e)) => return Err(e.into()),
        }
    }
}
