//! Dense per-strand representations of read anchors.
//!
//! Both encodings cover a genomic interval `[start, end)`, one element per
//! base pair, index `i` standing for position `start + i`. Anchors outside the
//! interval and duplicate anchors are skipped.

use rand::Rng;
use strandshift_core::models::ReadAnchor;

const WORD_BITS: usize = 64;

#[inline]
fn index_in(anchor: &ReadAnchor, start: i64, end: i64) -> Option<usize> {
    if anchor.is_counted() && anchor.position >= start && anchor.position < end {
        Some((anchor.position - start) as usize)
    } else {
        None
    }
}

///
/// Per-base read counts, saturating at `u8::MAX`.
///
#[derive(Debug, Clone, PartialEq)]
pub struct CountArray {
    pub start: i64,
    counts: Vec<u8>,
}

impl CountArray {
    pub fn from_anchors(anchors: &[ReadAnchor], start: i64, end: i64) -> Self {
        let width = (end - start).max(0) as usize;
        let mut counts = vec![0u8; width];

        for anchor in anchors {
            if let Some(i) = index_in(anchor, start, end) {
                counts[i] = counts[i].saturating_add(1);
            }
        }

        CountArray { start, counts }
    }

    ///
    /// Like [`CountArray::from_anchors`] but keeps each anchor with
    /// probability `keep`.
    ///
    pub fn from_anchors_subsampled<R: Rng>(
        anchors: &[ReadAnchor],
        start: i64,
        end: i64,
        keep: f64,
        rng: &mut R,
    ) -> Self {
        if keep >= 1.0 {
            return CountArray::from_anchors(anchors, start, end);
        }

        let width = (end - start).max(0) as usize;
        let mut counts = vec![0u8; width];

        for anchor in anchors {
            if let Some(i) = index_in(anchor, start, end) {
                if rng.random::<f64>() >= keep {
                    continue;
                }
                counts[i] = counts[i].saturating_add(1);
            }
        }

        CountArray { start, counts }
    }

    pub fn width(&self) -> usize {
        self.counts.len()
    }

    #[inline]
    pub fn get(&self, i: usize) -> u8 {
        self.counts[i]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.counts
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }
}

///
/// One presence bit per base, packed into 64-bit words (bit `i` lives in
/// word `i / 64` at position `i % 64`).
///
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceBits {
    pub start: i64,
    len: usize,
    words: Vec<u64>,
}

impl PresenceBits {
    pub fn new(start: i64, len: usize) -> Self {
        PresenceBits {
            start,
            len,
            words: vec![0u64; len.div_ceil(WORD_BITS)],
        }
    }

    pub fn from_anchors(anchors: &[ReadAnchor], start: i64, end: i64) -> Self {
        let mut bits = PresenceBits::new(start, (end - start).max(0) as usize);
        for anchor in anchors {
            if let Some(i) = index_in(anchor, start, end) {
                bits.set(i);
            }
        }
        bits
    }

    pub fn width(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn set(&mut self, i: usize) {
        self.words[i / WORD_BITS] |= 1u64 << (i % WORD_BITS);
    }

    #[inline]
    pub fn get(&self, i: usize) -> bool {
        i < self.len && (self.words[i / WORD_BITS] >> (i % WORD_BITS)) & 1 == 1
    }

    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| w.count_ones() as u64).sum()
    }

    /// The 64 bits starting at `bit`; bits past the end read as 0.
    #[inline]
    fn window(&self, bit: usize) -> u64 {
        let w = bit / WORD_BITS;
        let s = bit % WORD_BITS;
        let low = self.words.get(w).copied().unwrap_or(0);
        if s == 0 {
            low
        } else {
            let high = self.words.get(w + 1).copied().unwrap_or(0);
            (low >> s) | (high << (WORD_BITS - s))
        }
    }

    ///
    /// Population count of `op(self[j], other[j + offset])` for `j` in `[lo, hi)`.
    ///
    /// The caller guarantees `lo + offset >= 0`.
    fn shifted_popcount<F>(&self, other: &PresenceBits, lo: usize, hi: usize, offset: i32, op: F) -> u64
    where
        F: Fn(u64, u64) -> u64,
    {
        let mut total = 0u64;
        let mut j = lo;

        while j < hi {
            let n = (hi - j).min(WORD_BITS);
            let a = self.window(j);
            let b = other.window((j as i64 + offset as i64) as usize);
            let mut v = op(a, b);
            if n < WORD_BITS {
                v &= (1u64 << n) - 1;
            }
            total += v.count_ones() as u64;
            j += n;
        }

        total
    }

    /// Number of `j` in `[lo, hi)` with both `self[j]` and `other[j + offset]` set.
    pub fn and_count_shifted(&self, other: &PresenceBits, lo: usize, hi: usize, offset: i32) -> u64 {
        self.shifted_popcount(other, lo, hi, offset, |a, b| a & b)
    }

    /// Number of `j` in `[lo, hi)` where `self[j]` and `other[j + offset]` differ.
    pub fn xor_count_shifted(&self, other: &PresenceBits, lo: usize, hi: usize, offset: i32) -> u64 {
        self.shifted_popcount(other, lo, hi, offset, |a, b| a ^ b)
    }
}
