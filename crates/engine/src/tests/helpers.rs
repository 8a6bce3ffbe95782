use crate::Config;
use std::fs;
use std::path::Path;

/// A config rooted in an isolated temp directory.
pub fn test_config(dir: &Path, memtable_limit: usize) -> Config {
    Config {
        wal_path: dir.join("wal.log"),
        data_dir: dir.join("data"),
        memtable_limit,
        bloom_bytes: 1024,
        wal_sync: false,
    }
}

/// Number of durable table files in `dir` (ignores `temp_` artifacts).
pub fn count_table_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .map(|n| n.starts_with("sstable_") && n.ends_with(".db"))
                .unwrap_or(false)
        })
        .count()
}

/// Number of records currently in the WAL file.
pub fn count_wal_records(path: &Path) -> usize {
    let mut n = 0;
    let mut r = wal::WalReader::open(path).unwrap();
    r.replay(|_| n += 1).unwrap();
    n
}
