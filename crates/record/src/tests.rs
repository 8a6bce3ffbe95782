use super::*;
use std::io::Cursor;

fn encode(rec: &Record) -> Vec<u8> {
    let mut buf = Vec::new();
    write_record(&mut buf, rec).unwrap();
    buf
}

// -------------------- Encoding --------------------

#[test]
fn put_layout_is_kind_lengths_key_value() {
    let buf = encode(&Record::put(b"ab".to_vec(), b"xyz".to_vec()));

    assert_eq!(buf[0], 0); // kind = Put
    assert_eq!(&buf[1..5], &2i32.to_le_bytes());
    assert_eq!(&buf[5..9], &3i32.to_le_bytes());
    assert_eq!(&buf[9..11], b"ab");
    assert_eq!(&buf[11..14], b"xyz");
    assert_eq!(buf.len(), 14);
}

#[test]
fn tombstone_has_empty_value() {
    let rec = Record::tombstone(b"k".to_vec());
    assert_eq!(rec.kind, Kind::Delete);
    assert!(rec.value.is_empty());

    let buf = encode(&rec);
    assert_eq!(buf[0], 1); // kind = Delete
    assert_eq!(&buf[5..9], &0i32.to_le_bytes());
    assert_eq!(buf.len(), rec.encoded_len());
}

#[test]
fn oversized_key_is_rejected_before_writing() {
    let rec = Record::put(vec![b'k'; MAX_KEY_BYTES + 1], b"v".to_vec());
    let mut buf = Vec::new();
    assert!(write_record(&mut buf, &rec).is_err());
    assert!(buf.is_empty(), "nothing may be written for a rejected record");
}

// -------------------- Decoding --------------------

#[test]
fn decode_returns_what_was_encoded() {
    let rec = Record::put(b"hello".to_vec(), b"world".to_vec());
    let mut cur = Cursor::new(encode(&rec));

    let got = read_record(&mut cur).unwrap().unwrap();
    assert_eq!(got, rec);
    assert!(read_record(&mut cur).unwrap().is_none(), "clean EOF after last record");
}

#[test]
fn empty_stream_is_clean_eof() {
    let mut cur = Cursor::new(Vec::new());
    assert!(read_record(&mut cur).unwrap().is_none());
}

#[test]
fn truncated_tail_is_reported() {
    let mut buf = encode(&Record::put(b"key".to_vec(), b"value".to_vec()));
    buf.truncate(buf.len() - 2); // lose part of the value

    let mut cur = Cursor::new(buf);
    assert!(matches!(
        read_record(&mut cur),
        Err(DecodeError::Truncated)
    ));
}

#[test]
fn truncation_inside_lengths_is_reported() {
    // kind byte plus half of key_len
    let mut cur = Cursor::new(vec![0u8, 3, 0]);
    assert!(matches!(
        read_record(&mut cur),
        Err(DecodeError::Truncated)
    ));
}

#[test]
fn bad_kind_byte_is_malformed() {
    let mut buf = encode(&Record::put(b"k".to_vec(), b"v".to_vec()));
    buf[0] = 7;

    let mut cur = Cursor::new(buf);
    assert!(matches!(
        read_record(&mut cur),
        Err(DecodeError::Malformed)
    ));
}

#[test]
fn negative_length_is_malformed() {
    let mut buf = Vec::new();
    buf.push(0u8); // Put
    buf.extend_from_slice(&(-1i32).to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());

    let mut cur = Cursor::new(buf);
    assert!(matches!(
        read_record(&mut cur),
        Err(DecodeError::Malformed)
    ));
}

#[test]
fn oversized_declared_length_is_malformed() {
    let mut buf = Vec::new();
    buf.push(0u8);
    buf.extend_from_slice(&((MAX_KEY_BYTES as i32) + 1).to_le_bytes());
    buf.extend_from_slice(&0i32.to_le_bytes());

    let mut cur = Cursor::new(buf);
    assert!(matches!(
        read_record(&mut cur),
        Err(DecodeError::Malformed)
    ));
}
