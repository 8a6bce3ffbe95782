use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result as IoResult, Seek, SeekFrom, Write};

/// Size of the footer: a single little-endian u64 holding the filter offset.
pub const FOOTER_BYTES: u64 = 8;

/// Returns the position where the footer starts (filesize - FOOTER_BYTES).
pub fn footer_pos(filesize: u64) -> u64 {
    filesize.saturating_sub(FOOTER_BYTES)
}

/// Convenience: write the footer (filter offset).
pub fn write_footer<W: Write>(w: &mut W, filter_offset: u64) -> IoResult<()> {
    w.write_u64::<LittleEndian>(filter_offset)
}

/// Convenience: read the footer, returning `(filter_offset, filesize)`.
///
/// The caller is responsible for checking `filesize >= FOOTER_BYTES` first.
pub fn read_footer<R: Read + Seek>(r: &mut R) -> IoResult<(u64, u64)> {
    let filesize = r.seek(SeekFrom::End(0))?;
    r.seek(SeekFrom::Start(footer_pos(filesize)))?;
    let filter_offset = r.read_u64::<LittleEndian>()?;
    Ok((filter_offset, filesize))
}
