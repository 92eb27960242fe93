//! Fragment variability: how regularly strand-concordant positions recur.
//!
//! For a candidate fragment length `d`, every position `i` with a forward read
//! and a reverse read at `i + d` is a hit. The distances between successive
//! hits are collected in a [`FragmentHistogram`]. A real fragment length
//! produces many short, regular distances; a background offset produces the
//! distance distribution of unrelated reads.

use std::collections::BTreeMap;

use crate::consts::FRAGMENT_VARIABILITY_TAIL;
use crate::density::CountArray;

///
/// Histogram of distances between successive hits at one offset.
///
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentHistogram {
    counts: Vec<u64>,
}

impl FragmentHistogram {
    pub fn new(width: usize) -> Self {
        FragmentHistogram {
            counts: vec![0; width],
        }
    }

    ///
    /// Build the histogram of offset `offset` from two count arrays of equal width.
    ///
    /// Positions are scanned from `max(0, -offset)` up to
    /// `width - max(offset, 500)`; distances outside the histogram are not
    /// counted but still move the last hit.
    ///
    pub fn from_strands(fwd: &CountArray, rev: &CountArray, offset: i32, histogram_width: usize) -> Self {
        let mut histogram = FragmentHistogram::new(histogram_width);

        let width = fwd.width().min(rev.width()) as i64;
        let offset = offset as i64;
        let s = (-offset).max(0);
        let e = (width - offset.max(FRAGMENT_VARIABILITY_TAIL as i64)).min(width - offset);

        let mut last = s;
        for i in s..e {
            if fwd.get(i as usize) > 0 && rev.get((i + offset) as usize) > 0 {
                let distance = (i - last) as usize;
                if distance < histogram_width {
                    histogram.counts[distance] += 1;
                }
                last = i;
            }
        }

        histogram
    }

    pub fn width(&self) -> usize {
        self.counts.len()
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Share of hits at distance `k`; 0 for an empty histogram.
    pub fn distribution(&self, k: usize) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.counts.get(k).copied().unwrap_or(0) as f64 / total as f64
    }

    /// The cumulative distribution `P(k) = sum of p(m) for m <= k`.
    pub fn accumulated(&self) -> Vec<f64> {
        let total = self.total();
        let mut acc = 0.0;

        self.counts
            .iter()
            .map(|&c| {
                if total > 0 {
                    acc += c as f64 / total as f64;
                }
                acc
            })
            .collect()
    }

    ///
    /// Largest excess of this cumulative distribution over `reference`,
    /// never below 0.
    ///
    pub fn divergence(&self, reference: &[f64]) -> f64 {
        self.accumulated()
            .iter()
            .zip(reference.iter())
            .fold(0.0f64, |max, (p, q)| max.max(p - q))
    }

    pub fn add(&mut self, other: &FragmentHistogram) {
        if self.counts.len() < other.counts.len() {
            self.counts.resize(other.counts.len(), 0);
        }
        for (mine, theirs) in self.counts.iter_mut().zip(other.counts.iter()) {
            *mine += theirs;
        }
    }
}

///
/// Genome-wide sum of fragment histograms, keyed by offset.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FragmentVariabilityAtlas {
    histograms: BTreeMap<i32, FragmentHistogram>,
}

impl FragmentVariabilityAtlas {
    pub fn new() -> Self {
        FragmentVariabilityAtlas::default()
    }

    pub fn add(&mut self, offset: i32, histogram: &FragmentHistogram) {
        self.histograms
            .entry(offset)
            .and_modify(|h| h.add(histogram))
            .or_insert_with(|| histogram.clone());
    }

    pub fn get(&self, offset: i32) -> Option<&FragmentHistogram> {
        self.histograms.get(&offset)
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }
}
