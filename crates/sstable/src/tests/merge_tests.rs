use crate::*;
use anyhow::Result;
use record::{Kind, Record};
use std::path::Path;
use tempfile::tempdir;

const BLOOM: usize = 64;

fn write_table(path: &Path, records: &[(Kind, &[u8], &[u8])]) -> Result<()> {
    let mut w = TableWriter::create(path, BLOOM)?;
    for (kind, key, value) in records {
        w.append(*kind, key, value)?;
    }
    w.finish()
}

fn drain(mut m: MergeIterator) -> Result<Vec<Record>> {
    let mut out = Vec::new();
    while let Some(rec) = m.next_entry()? {
        out.push(rec);
    }
    Ok(out)
}

fn open_all(paths: &[std::path::PathBuf]) -> Result<Vec<TableIterator>> {
    paths.iter().map(TableIterator::open).collect()
}

#[test]
fn merges_disjoint_tables_in_key_order() -> Result<()> {
    let dir = tempdir()?;
    let p1 = dir.path().join("sstable_1.db");
    let p2 = dir.path().join("sstable_2.db");
    write_table(&p1, &[(Kind::Put, b"a", b"1"), (Kind::Put, b"m", b"2")])?;
    write_table(&p2, &[(Kind::Put, b"c", b"3"), (Kind::Put, b"z", b"4")])?;

    let merged = drain(MergeIterator::new(open_all(&[p1, p2])?))?;
    let keys: Vec<&[u8]> = merged.iter().map(|r| r.key.as_slice()).collect();
    assert_eq!(keys, vec![&b"a"[..], b"c", b"m", b"z"]);
    Ok(())
}

#[test]
fn newest_source_wins_duplicate_keys() -> Result<()> {
    let dir = tempdir()?;
    let old = dir.path().join("sstable_1.db");
    let new = dir.path().join("sstable_2.db");
    write_table(&old, &[(Kind::Put, b"k", b"old")])?;
    write_table(&new, &[(Kind::Put, b"k", b"new")])?;

    // Oldest first: the later source must shadow the earlier one.
    let merged = drain(MergeIterator::new(open_all(&[old, new])?))?;
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].value, b"new");
    Ok(())
}

#[test]
fn duplicate_in_three_tables_emits_once() -> Result<()> {
    let dir = tempdir()?;
    let paths: Vec<_> = (1..=3)
        .map(|i| dir.path().join(format!("sstable_{}.db", i)))
        .collect();
    write_table(&paths[0], &[(Kind::Put, b"k", b"v1"), (Kind::Put, b"x", b"1")])?;
    write_table(&paths[1], &[(Kind::Put, b"k", b"v2")])?;
    write_table(&paths[2], &[(Kind::Put, b"k", b"v3"), (Kind::Put, b"y", b"2")])?;

    let merged = drain(MergeIterator::new(open_all(&paths)?))?;
    let kv: Vec<(&[u8], &[u8])> = merged
        .iter()
        .map(|r| (r.key.as_slice(), r.value.as_slice()))
        .collect();
    assert_eq!(
        kv,
        vec![(&b"k"[..], &b"v3"[..]), (b"x", b"1"), (b"y", b"2")]
    );
    Ok(())
}

#[test]
fn newer_tombstone_shadows_older_put() -> Result<()> {
    let dir = tempdir()?;
    let old = dir.path().join("sstable_1.db");
    let new = dir.path().join("sstable_2.db");
    write_table(&old, &[(Kind::Put, b"k", b"v")])?;
    write_table(&new, &[(Kind::Delete, b"k", b"")])?;

    let merged = drain(MergeIterator::new(open_all(&[old, new])?))?;
    assert_eq!(merged.len(), 1);
    assert_eq!(
        merged[0].kind,
        Kind::Delete,
        "the merge yields the tombstone; dropping it is the caller's policy"
    );
    Ok(())
}

#[test]
fn older_tombstone_loses_to_newer_put() -> Result<()> {
    let dir = tempdir()?;
    let old = dir.path().join("sstable_1.db");
    let new = dir.path().join("sstable_2.db");
    write_table(&old, &[(Kind::Delete, b"k", b"")])?;
    write_table(&new, &[(Kind::Put, b"k", b"back")])?;

    let merged = drain(MergeIterator::new(open_all(&[old, new])?))?;
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].kind, Kind::Put);
    assert_eq!(merged[0].value, b"back");
    Ok(())
}

#[test]
fn empty_input_set_merges_to_nothing() -> Result<()> {
    let merged = drain(MergeIterator::new(Vec::new()))?;
    assert!(merged.is_empty());
    Ok(())
}

#[test]
fn empty_tables_are_skipped() -> Result<()> {
    let dir = tempdir()?;
    let empty = dir.path().join("sstable_1.db");
    let full = dir.path().join("sstable_2.db");
    TableWriter::create(&empty, BLOOM)?.finish()?;
    write_table(&full, &[(Kind::Put, b"k", b"v")])?;

    let merged = drain(MergeIterator::new(open_all(&[empty, full])?))?;
    assert_eq!(merged.len(), 1);
    Ok(())
}
