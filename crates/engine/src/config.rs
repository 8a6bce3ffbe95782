use std::path::PathBuf;

/// Engine configuration.
///
/// Paths are injected here at construction rather than discovered at point
/// of use, so tests can run engines against isolated directories in
/// parallel.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the write-ahead log file.
    pub wal_path: PathBuf,
    /// Directory holding every SSTable.
    pub data_dir: PathBuf,
    /// Number of distinct keys in the memtable that triggers a flush.
    pub memtable_limit: usize,
    /// Size of each table's filter bitset in bytes. Must match between the
    /// writer and every reader of a file set.
    pub bloom_bytes: usize,
    /// If `true`, every WAL append is followed by `fsync`.
    pub wal_sync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wal_path: PathBuf::from("wal.log"),
            data_dir: PathBuf::from("data"),
            memtable_limit: 100,
            bloom_bytes: 1024,
            wal_sync: false,
        }
    }
}
