//! # Bloom Filter
//!
//! A space-efficient probabilistic data structure for set membership testing.
//!
//! A bloom filter can tell you with certainty that a key is **not** in the set
//! (no false negatives), but may occasionally report that a key **is** in the
//! set when it isn't (false positives). The false positive rate depends on the
//! bitset size relative to the number of keys added.
//!
//! ## Usage in SiltDB
//!
//! Each SSTable embeds the raw bitset of a filter built from its keys. A point
//! lookup checks the filter before scanning the data region — if it says "not
//! present", the whole scan is skipped.
//!
//! The filter is a fixed-size bitset (`BLOOM_BYTES` of configuration) probed
//! at three positions per key: the FNV-1a hash of the key and two further
//! hashes derived from it by wrapping multiplication with the FNV prime.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bloom::BloomFilter;
//!
//! let mut bf = BloomFilter::new(1024);
//! bf.add(b"hello");
//! assert!(bf.may_contain(b"hello"));
//! ```

/// 32-bit FNV prime, also used to derive the second and third hash.
const FNV_PRIME_32: u32 = 16_777_619;
/// 32-bit FNV-1a offset basis.
const FNV_BASIS_32: u32 = 0x811c_9dc5;

/// A bloom filter backed by a fixed-size bitset with three hash probes.
///
/// The three probes for a key are `h1 = fnv1a(key)`, `h2 = h1 * prime`,
/// `h3 = h2 * prime` (wrapping). Each hash `h` addresses bit `h % 8` of byte
/// `(h / 8) % len`, so any 32-bit hash maps into the bitset regardless of its
/// size.
pub struct BloomFilter {
    /// The raw bitset. Its length is the configured `BLOOM_BYTES`.
    bits: Vec<u8>,
}

impl BloomFilter {
    /// Creates an empty filter of `nbytes` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `nbytes` is 0.
    #[must_use]
    pub fn new(nbytes: usize) -> Self {
        assert!(nbytes > 0, "filter size must be > 0");
        Self {
            bits: vec![0u8; nbytes],
        }
    }

    /// Reconstructs a filter from a bitset read back from an SSTable.
    ///
    /// # Panics
    ///
    /// Panics if `bits` is empty.
    #[must_use]
    pub fn from_bits(bits: Vec<u8>) -> Self {
        assert!(!bits.is_empty(), "filter size must be > 0");
        Self { bits }
    }

    /// Adds a key: sets all three probe bits.
    pub fn add(&mut self, key: &[u8]) {
        for h in hash_trio(key) {
            self.set_bit(h);
        }
    }

    /// Returns `true` if the key **might** have been added, `false` if it is
    /// **definitely not** present.
    #[must_use]
    pub fn may_contain(&self, key: &[u8]) -> bool {
        hash_trio(key).into_iter().all(|h| self.check_bit(h))
    }

    /// The raw bitset, exactly as it is laid out on disk.
    #[must_use]
    pub fn as_bits(&self) -> &[u8] {
        &self.bits
    }

    /// The bitset size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bits.len()
    }

    // ---- Internal helpers ----

    fn set_bit(&mut self, h: u32) {
        let byte_idx = ((h / 8) as usize) % self.bits.len();
        self.bits[byte_idx] |= 1 << (h % 8);
    }

    fn check_bit(&self, h: u32) -> bool {
        let byte_idx = ((h / 8) as usize) % self.bits.len();
        (self.bits[byte_idx] >> (h % 8)) & 1 == 1
    }
}

impl std::fmt::Debug for BloomFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BloomFilter")
            .field("bytes", &self.bits.len())
            .field(
                "bits_set",
                &self.bits.iter().map(|b| b.count_ones()).sum::<u32>(),
            )
            .finish()
    }
}

/// The three probe hashes for a key: FNV-1a and two derived by wrapping
/// multiplication with the FNV prime.
#[must_use]
pub fn hash_trio(key: &[u8]) -> [u32; 3] {
    let h1 = fnv1a_32(key);
    let h2 = h1.wrapping_mul(FNV_PRIME_32);
    let h3 = h2.wrapping_mul(FNV_PRIME_32);
    [h1, h2, h3]
}

/// FNV-1a 32-bit hash.
fn fnv1a_32(data: &[u8]) -> u32 {
    let mut hash = FNV_BASIS_32;
    for &byte in data {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(FNV_PRIME_32);
    }
    hash
}
