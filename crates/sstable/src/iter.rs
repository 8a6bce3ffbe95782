use anyhow::Result;
use record::{read_record, DecodeError, Record};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Take};
use std::path::Path;
use tracing::warn;

use crate::format::{read_footer, FOOTER_BYTES};

/// Ordered forward iterator over one table's data region.
///
/// Used by compaction to walk every record of a table in key order. On open
/// the footer is read to find the end of the data region, then records are
/// decoded sequentially until the cursor reaches it, at which point the
/// iterator is *exhausted* (`current()` returns `None`).
///
/// The iterator owns its file handle and releases it on drop.
pub struct TableIterator {
    data: Take<BufReader<File>>,
    current: Option<Record>,
}

impl TableIterator {
    /// Opens `path` and primes the iterator on its first record.
    ///
    /// A file too small to carry a footer yields an immediately-exhausted
    /// iterator rather than an error, mirroring the point-lookup treatment
    /// of unreadable tables.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<TableIterator> {
        let mut f = File::open(path)?;

        let filesize = f.metadata()?.len();
        let data_len = if filesize < FOOTER_BYTES {
            0
        } else {
            let (filter_offset, _) = read_footer(&mut f)?;
            filter_offset.min(filesize - FOOTER_BYTES)
        };

        f.seek(SeekFrom::Start(0))?;
        let mut iter = TableIterator {
            data: BufReader::new(f).take(data_len),
            current: None,
        };
        iter.advance()?;
        Ok(iter)
    }

    /// The record under the cursor, or `None` once exhausted.
    #[must_use]
    pub fn current(&self) -> Option<&Record> {
        self.current.as_ref()
    }

    /// The key under the cursor, or `None` once exhausted.
    #[must_use]
    pub fn current_key(&self) -> Option<&[u8]> {
        self.current.as_ref().map(|r| r.key.as_slice())
    }

    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Moves to the next record, or into the exhausted state at the end of
    /// the data region. An undecodable record also exhausts the iterator —
    /// iteration never yields partial data.
    pub fn advance(&mut self) -> Result<()> {
        self.current = match read_record(&mut self.data) {
            Ok(rec) => rec,
            Err(DecodeError::Truncated) | Err(DecodeError::Malformed) => {
                warn!("undecodable record mid-table, ending iteration");
                None
            }
            Err(DecodeError::Io(e)) => return Err(e.into()),
        };
        Ok(())
    }
}
