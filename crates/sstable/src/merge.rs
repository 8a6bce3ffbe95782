//! K-way merge over multiple [`TableIterator`]s.
//!
//! Produces records in ascending key order. When the same key appears in
//! several tables, only the record from the **chronologically newest** source
//! is emitted and every older duplicate is discarded. Tombstones are yielded
//! like any other record — dropping them is compaction policy, not merge
//! mechanics.
//!
//! This is the core primitive for compaction: walk N input tables in sorted
//! order, collapse duplicates newest-wins, and stream the result to a new
//! table writer.

use anyhow::Result;
use record::Record;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::TableIterator;

/// A pending key from one source, used for heap-based merge ordering.
///
/// Only the key and the source index are stored — the full record stays in
/// the source iterator until the key reaches the top of the heap.
struct HeapEntry {
    key: Vec<u8>,
    /// Index into the sources vec; higher index = chronologically newer file.
    source: usize,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.source == other.source
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse the key comparison so the
        // smallest key surfaces first. The source tiebreak only makes the
        // order deterministic — equal keys are drained together anyway.
        other
            .key
            .cmp(&self.key)
            .then_with(|| other.source.cmp(&self.source))
    }
}

/// Merges several table iterators into one ascending, deduplicated stream.
///
/// Sources must be supplied oldest-first; the later position in the vec is
/// what makes a source "newer" when resolving duplicate keys.
pub struct MergeIterator {
    sources: Vec<TableIterator>,
    heap: BinaryHeap<HeapEntry>,
}

impl MergeIterator {
    /// Creates a merge over `sources` (chronological order, oldest first).
    ///
    /// Each iterator is expected to arrive primed on its first record, as
    /// [`TableIterator::open`] leaves it.
    pub fn new(sources: Vec<TableIterator>) -> Self {
        let mut heap = BinaryHeap::new();
        for (i, src) in sources.iter().enumerate() {
            if let Some(key) = src.current_key() {
                heap.push(HeapEntry {
                    key: key.to_vec(),
                    source: i,
                });
            }
        }
        Self { sources, heap }
    }

    /// Returns the next record in key order, or `None` when every source is
    /// exhausted.
    ///
    /// All sources holding the minimal key are advanced together; the record
    /// returned is the one from the newest of them.
    pub fn next_entry(&mut self) -> Result<Option<Record>> {
        loop {
            let top = match self.heap.pop() {
                Some(e) => e,
                None => return Ok(None),
            };

            // Drain every source positioned on the same key. The winner is
            // the chronologically newest, i.e. the highest source index.
            let mut holders = vec![top.source];
            while let Some(peek) = self.heap.peek() {
                if peek.key != top.key {
                    break;
                }
                let dup = self.heap.pop().unwrap();
                holders.push(dup.source);
            }
            let winner = holders.iter().copied().max().unwrap_or(top.source);

            let rec = self.sources[winner].current().cloned();

            // Advance all holders past this key and refill the heap.
            for src in holders {
                self.sources[src].advance()?;
                if let Some(next_key) = self.sources[src].current_key() {
                    self.heap.push(HeapEntry {
                        key: next_key.to_vec(),
                        source: src,
                    });
                }
            }

            match rec {
                Some(r) => return Ok(Some(r)),
                None => continue, // shouldn't happen, but skip
            }
        }
    }
}
