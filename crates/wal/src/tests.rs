use super::*;
use record::Kind;
use std::io::Cursor;
use tempfile::tempdir;

fn collect_records<P: AsRef<Path>>(path: P) -> Vec<Record> {
    let mut out = Vec::new();
    let mut r = WalReader::open(path).unwrap();
    r.replay(|rec| out.push(rec)).unwrap();
    out
}

// -------------------- Append + replay --------------------

#[test]
fn append_then_replay_preserves_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.log");

    {
        let mut w = Wal::open(&path, true).unwrap();
        w.append(&Record::put(b"a".to_vec(), b"1".to_vec())).unwrap();
        w.append(&Record::tombstone(b"a".to_vec())).unwrap();
        w.append(&Record::put(b"b".to_vec(), b"2".to_vec())).unwrap();
    }

    let recs = collect_records(&path);
    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0], Record::put(b"a".to_vec(), b"1".to_vec()));
    assert_eq!(recs[1], Record::tombstone(b"a".to_vec()));
    assert_eq!(recs[2], Record::put(b"b".to_vec(), b"2".to_vec()));
}

#[test]
fn empty_wal_replays_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.log");
    let _ = Wal::open(&path, false).unwrap();

    assert!(collect_records(&path).is_empty());
}

#[test]
fn reopened_wal_appends_after_existing_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.log");

    {
        let mut w = Wal::open(&path, false).unwrap();
        w.append(&Record::put(b"x".to_vec(), b"1".to_vec())).unwrap();
    }
    {
        let mut w = Wal::open(&path, false).unwrap();
        w.append(&Record::put(b"y".to_vec(), b"2".to_vec())).unwrap();
    }

    let recs = collect_records(&path);
    assert_eq!(recs.len(), 2);
    assert_eq!(recs[1].key, b"y");
}

// -------------------- Truncation --------------------

#[test]
fn truncate_empties_the_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.log");

    let mut w = Wal::open(&path, false).unwrap();
    w.append(&Record::put(b"k".to_vec(), b"v".to_vec())).unwrap();
    w.truncate().unwrap();

    assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    assert!(collect_records(&path).is_empty());
}

#[test]
fn appends_after_truncate_are_replayed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.log");

    let mut w = Wal::open(&path, false).unwrap();
    w.append(&Record::put(b"old".to_vec(), b"1".to_vec())).unwrap();
    w.truncate().unwrap();
    w.append(&Record::put(b"new".to_vec(), b"2".to_vec())).unwrap();
    drop(w);

    let recs = collect_records(&path);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].key, b"new");
}

// -------------------- Crash tails --------------------

#[test]
fn partial_trailing_record_is_discarded() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.log");

    {
        let mut w = Wal::open(&path, false).unwrap();
        w.append(&Record::put(b"good".to_vec(), b"1".to_vec())).unwrap();
        w.append(&Record::put(b"lost".to_vec(), b"2".to_vec())).unwrap();
    }

    // Simulate a crash mid-append: chop bytes off the last record.
    let len = std::fs::metadata(&path).unwrap().len();
    let f = OpenOptions::new().write(true).open(&path).unwrap();
    f.set_len(len - 3).unwrap();

    let recs = collect_records(&path);
    assert_eq!(recs.len(), 1, "only the complete record survives");
    assert_eq!(recs[0].key, b"good");
}

#[test]
fn garbage_tail_stops_replay_without_error() {
    let mut bytes = Vec::new();
    write_record(&mut bytes, &Record::put(b"k".to_vec(), b"v".to_vec())).unwrap();
    bytes.push(0xff); // not a valid kind byte

    let mut seen = Vec::new();
    let mut r = WalReader::from_reader(Cursor::new(bytes));
    r.replay(|rec| seen.push(rec)).unwrap();

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, Kind::Put);
}

#[test]
fn tail_with_absurd_length_stops_replay_without_error() {
    let mut bytes = Vec::new();
    write_record(&mut bytes, &Record::tombstone(b"k".to_vec())).unwrap();
    // A record header whose declared key length overruns everything.
    bytes.push(0u8);
    bytes.extend_from_slice(&i32::MAX.to_le_bytes());
    bytes.extend_from_slice(&0i32.to_le_bytes());

    let mut seen = Vec::new();
    let mut r = WalReader::from_reader(Cursor::new(bytes));
    r.replay(|rec| seen.push(rec)).unwrap();

    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, Kind::Delete);
}

// -------------------- Binary layout --------------------

#[test]
fn on_disk_bytes_match_shared_encoding() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("wal.log");

    let rec = Record::put(b"ab".to_vec(), b"c".to_vec());
    {
        let mut w = Wal::open(&path, true).unwrap();
        w.append(&rec).unwrap();
    }

    let mut expected = Vec::new();
    write_record(&mut expected, &rec).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), expected);
}
