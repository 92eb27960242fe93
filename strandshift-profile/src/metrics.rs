//! The shift metrics.
//!
//! A [`ShiftMetric`] owns the dense strand arrays of one chromosome and turns
//! a shift offset into one number. The variants differ in the representation
//! they work on and in their sign: Hamming distance is a dissimilarity, every
//! other metric a similarity.

use std::ops::Range;

use rand::Rng;
use strandshift_core::models::{ChromosomeReads, Strand};

use crate::config::{MetricKind, ShiftConfig};
use crate::density::{CountArray, PresenceBits};
use crate::fragvar::FragmentHistogram;

///
/// Indices of a chromosome that may be read while shifting.
///
/// The forward index `j` stays inside `[lower, upper)` =
/// `[mp_from, width - ng_to)`, and the shifted reverse index `j + offset`
/// stays inside `[0, width)`.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindow {
    pub lower: usize,
    pub upper: usize,
    pub width: usize,
}

impl ScanWindow {
    /// `None` when the chromosome is too narrow to hold the window.
    pub fn new(width: usize, config: &ShiftConfig) -> Option<Self> {
        let lower = config.mp_from.max(0) as usize;
        let upper = width.checked_sub(config.ng_to.max(0) as usize)?;

        if upper <= lower {
            return None;
        }

        Some(ScanWindow {
            lower,
            upper,
            width,
        })
    }

    pub fn len(&self) -> usize {
        self.upper - self.lower
    }

    pub fn is_empty(&self) -> bool {
        self.upper <= self.lower
    }

    /// Forward indices valid at `offset`.
    pub fn range(&self, offset: i32) -> Range<usize> {
        let offset = offset as i64;
        let lo = (self.lower as i64).max(-offset);
        let hi = (self.upper as i64).min(self.width as i64 - offset);

        if hi <= lo {
            let lo = lo.max(0) as usize;
            return lo..lo;
        }
        lo as usize..hi as usize
    }
}

#[inline]
fn shifted(j: usize, offset: i32) -> usize {
    (j as i64 + offset as i64) as usize
}

#[inline]
fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Mean and sample standard deviation of `values`.
fn moments(values: &[u8]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }

    let sum: u64 = values.iter().map(|&v| v as u64).sum();
    let mean = sum as f64 / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }

    let mut squares = 0.0;
    for &v in values {
        let d = v as f64 - mean;
        squares += d * d;
    }

    (mean, (squares / (n - 1) as f64).sqrt())
}

///
/// Pearson-style cross-correlation of the two count arrays.
///
/// `compute` returns the raw centered sum; the whole profile is multiplied
/// by [`CrossCorrelation::scale`] once every offset is known.
///
#[derive(Debug, Clone)]
pub struct CrossCorrelation {
    fwd: CountArray,
    rev: CountArray,
    window: ScanWindow,
    mean_fwd: f64,
    mean_rev: f64,
    scale: f64,
}

impl CrossCorrelation {
    pub fn new(fwd: CountArray, rev: CountArray, window: ScanWindow) -> Self {
        let (mean_fwd, sd_fwd) = moments(&fwd.as_slice()[window.lower..window.upper]);
        let (mean_rev, sd_rev) = moments(&rev.as_slice()[window.lower..window.upper]);

        let n = window.len();
        let scale = if sd_fwd > 0.0 && sd_rev > 0.0 && n > 1 {
            1.0 / (sd_fwd * sd_rev * (n - 1) as f64)
        } else {
            0.0
        };

        CrossCorrelation {
            fwd,
            rev,
            window,
            mean_fwd,
            mean_rev,
            scale,
        }
    }

    pub fn compute(&self, offset: i32) -> f64 {
        let fwd = self.fwd.as_slice();
        let rev = self.rev.as_slice();

        let mut xy = 0.0;
        for j in self.window.range(offset) {
            xy += (fwd[j] as f64 - self.mean_fwd) * (rev[shifted(j, offset)] as f64 - self.mean_rev);
        }
        xy
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

///
/// Jaccard index on read counts: overlapping positions weigh with the larger
/// of both counts.
///
#[derive(Debug, Clone)]
pub struct VectorJaccard {
    fwd: CountArray,
    rev: CountArray,
    window: ScanWindow,
    total: u64,
}

impl VectorJaccard {
    pub fn new(fwd: CountArray, rev: CountArray, window: ScanWindow) -> Self {
        let total = fwd.total() + rev.total();
        VectorJaccard {
            fwd,
            rev,
            window,
            total,
        }
    }

    pub fn compute(&self, offset: i32) -> f64 {
        let fwd = self.fwd.as_slice();
        let rev = self.rev.as_slice();

        let mut xy = 0u64;
        for j in self.window.range(offset) {
            let (x, y) = (fwd[j], rev[shifted(j, offset)]);
            if x > 0 && y > 0 {
                xy += x.max(y) as u64;
            }
        }

        ratio_or_zero(xy as f64, self.total as f64 - xy as f64)
    }
}

///
/// Jaccard index on presence bits, counted 64 positions at a time.
///
#[derive(Debug, Clone)]
pub struct BitsetJaccard {
    fwd: PresenceBits,
    rev: PresenceBits,
    window: ScanWindow,
    total: u64,
}

impl BitsetJaccard {
    pub fn new(fwd: PresenceBits, rev: PresenceBits, window: ScanWindow) -> Self {
        let total = fwd.count_ones() + rev.count_ones();
        BitsetJaccard {
            fwd,
            rev,
            window,
            total,
        }
    }

    pub fn compute(&self, offset: i32) -> f64 {
        let range = self.window.range(offset);
        let xy = self
            .fwd
            .and_count_shifted(&self.rev, range.start, range.end, offset);

        ratio_or_zero(xy as f64, self.total as f64 - xy as f64)
    }
}

/// Number of positions where exactly one strand has a read.
#[derive(Debug, Clone)]
pub struct HammingDistance {
    fwd: PresenceBits,
    rev: PresenceBits,
    window: ScanWindow,
}

impl HammingDistance {
    pub fn new(fwd: PresenceBits, rev: PresenceBits, window: ScanWindow) -> Self {
        HammingDistance { fwd, rev, window }
    }

    pub fn compute(&self, offset: i32) -> f64 {
        let range = self.window.range(offset);
        self.fwd
            .xor_count_shifted(&self.rev, range.start, range.end, offset) as f64
    }
}

///
/// Divergence of the hit-distance distribution at an offset from the one at
/// the background offset `ng_from`.
///
#[derive(Debug, Clone)]
pub struct FragmentVariabilityScan {
    fwd: CountArray,
    rev: CountArray,
    histogram_width: usize,
    reference: Vec<f64>,
}

impl FragmentVariabilityScan {
    pub fn new(fwd: CountArray, rev: CountArray, reference_offset: i32, histogram_width: usize) -> Self {
        let reference =
            FragmentHistogram::from_strands(&fwd, &rev, reference_offset, histogram_width).accumulated();

        FragmentVariabilityScan {
            fwd,
            rev,
            histogram_width,
            reference,
        }
    }

    pub fn histogram(&self, offset: i32) -> FragmentHistogram {
        FragmentHistogram::from_strands(&self.fwd, &self.rev, offset, self.histogram_width)
    }

    pub fn evaluate(&self, offset: i32) -> (f64, FragmentHistogram) {
        let histogram = self.histogram(offset);
        (histogram.divergence(&self.reference), histogram)
    }
}

///
/// One metric, ready to be evaluated on one chromosome.
///
#[derive(Debug, Clone)]
pub enum ShiftMetric {
    CrossCorrelation(CrossCorrelation),
    JaccardVector(VectorJaccard),
    JaccardBitset(BitsetJaccard),
    Hamming(HammingDistance),
    FragmentVariability(FragmentVariabilityScan),
}

impl ShiftMetric {
    ///
    /// Build the strand arrays `config.metric` needs for `reads`.
    ///
    /// # Arguments
    ///
    /// - reads: anchors of the chromosome
    /// - window: valid scan window of the chromosome
    /// - config: run parameters
    /// - keep: probability of keeping a read for fragment variability
    /// - rng: random source used when `keep < 1`
    ///
    pub fn from_reads<R: Rng>(
        reads: &ChromosomeReads,
        window: ScanWindow,
        config: &ShiftConfig,
        keep: f64,
        rng: &mut R,
    ) -> Self {
        let end = window.width as i64;
        let counts = |strand: Strand| CountArray::from_anchors(reads.anchors(strand), 0, end);
        let bits = |strand: Strand| PresenceBits::from_anchors(reads.anchors(strand), 0, end);

        match config.metric {
            MetricKind::CrossCorrelation => ShiftMetric::CrossCorrelation(CrossCorrelation::new(
                counts(Strand::Forward),
                counts(Strand::Reverse),
                window,
            )),
            MetricKind::JaccardVector => ShiftMetric::JaccardVector(VectorJaccard::new(
                counts(Strand::Forward),
                counts(Strand::Reverse),
                window,
            )),
            MetricKind::JaccardBitset => ShiftMetric::JaccardBitset(BitsetJaccard::new(
                bits(Strand::Forward),
                bits(Strand::Reverse),
                window,
            )),
            MetricKind::Hamming => ShiftMetric::Hamming(HammingDistance::new(
                bits(Strand::Forward),
                bits(Strand::Reverse),
                window,
            )),
            MetricKind::FragmentVariability => {
                let fwd = CountArray::from_anchors_subsampled(
                    reads.anchors(Strand::Forward),
                    0,
                    end,
                    keep,
                    rng,
                );
                let rev = CountArray::from_anchors_subsampled(
                    reads.anchors(Strand::Reverse),
                    0,
                    end,
                    keep,
                    rng,
                );
                ShiftMetric::FragmentVariability(FragmentVariabilityScan::new(
                    fwd,
                    rev,
                    config.ng_from,
                    config.histogram_width,
                ))
            }
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            ShiftMetric::CrossCorrelation(_) => MetricKind::CrossCorrelation,
            ShiftMetric::JaccardVector(_) => MetricKind::JaccardVector,
            ShiftMetric::JaccardBitset(_) => MetricKind::JaccardBitset,
            ShiftMetric::Hamming(_) => MetricKind::Hamming,
            ShiftMetric::FragmentVariability(_) => MetricKind::FragmentVariability,
        }
    }

    /// `+1` when larger values mean better strand agreement, `-1` otherwise.
    pub fn sign(&self) -> f64 {
        self.kind().sign()
    }

    /// Value of the metric at `offset`, before [`ShiftMetric::scale`].
    pub fn compute(&self, offset: i32) -> f64 {
        match self {
            ShiftMetric::CrossCorrelation(m) => m.compute(offset),
            ShiftMetric::JaccardVector(m) => m.compute(offset),
            ShiftMetric::JaccardBitset(m) => m.compute(offset),
            ShiftMetric::Hamming(m) => m.compute(offset),
            ShiftMetric::FragmentVariability(m) => m.evaluate(offset).0,
        }
    }

    ///
    /// Value at `offset` plus the hit-distance histogram for fragment
    /// variability.
    ///
    pub fn evaluate(&self, offset: i32) -> (f64, Option<FragmentHistogram>) {
        match self {
            ShiftMetric::FragmentVariability(m) => {
                let (value, histogram) = m.evaluate(offset);
                (value, Some(histogram))
            }
            _ => (self.compute(offset), None),
        }
    }

    /// Factor applied to every value once the scan is finished.
    pub fn scale(&self) -> f64 {
        match self {
            ShiftMetric::CrossCorrelation(m) => m.scale(),
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::*;

    fn small_config(metric: MetricKind) -> ShiftConfig {
        ShiftConfig {
            metric,
            mp_from: 50,
            mp_to: 300,
            ng_from: 300,
            ng_to: 400,
            ng_step: 20,
            progress: false,
            ..ShiftConfig::default()
        }
    }

    /// Irregularly spaced forward reads, each with a reverse partner 60 bp downstream.
    #[fixture]
    fn mirrored() -> ChromosomeReads {
        let gaps = [37, 53, 71, 89, 113];
        let mut fwd = Vec::new();
        let mut p = 10i64;
        let mut k = 0;
        while p < 1900 {
            fwd.push(p);
            p += gaps[k % gaps.len()];
            k += 1;
        }
        let rev: Vec<i64> = fwd.iter().map(|p| p + 60).collect();
        ChromosomeReads::from_positions("chr1", 2000, &fwd, &rev)
    }

    fn metric(reads: &ChromosomeReads, kind: MetricKind) -> ShiftMetric {
        let config = small_config(kind);
        let window = ScanWindow::new(reads.length as usize, &config).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        ShiftMetric::from_reads(reads, window, &config, 1.0, &mut rng)
    }

    #[rstest]
    #[case(-50, 50..1600)]
    #[case(0, 50..1600)]
    #[case(450, 50..1550)]
    #[case(-80, 80..1600)]
    fn test_window_range_is_clipped(#[case] offset: i32, #[case] expected: Range<usize>) {
        let config = small_config(MetricKind::CrossCorrelation);
        let window = ScanWindow::new(2000, &config).unwrap();
        assert_eq!(window.range(offset), expected);
    }

    #[rstest]
    fn test_window_rejects_narrow_chromosome() {
        let config = small_config(MetricKind::CrossCorrelation);
        assert_eq!(ScanWindow::new(450, &config), None);
        assert_eq!(ScanWindow::new(300, &config), None);
        assert!(ScanWindow::new(451, &config).is_some());
    }

    #[rstest]
    fn test_moments() {
        let (mean, sd) = moments(&[1, 2, 3, 4]);
        assert!((mean - 2.5).abs() < 1e-12);
        assert!((sd - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(moments(&[]), (0.0, 0.0));
    }

    #[rstest]
    #[case(MetricKind::CrossCorrelation)]
    #[case(MetricKind::JaccardVector)]
    #[case(MetricKind::JaccardBitset)]
    fn test_similarities_peak_at_mirror_offset(mirrored: ChromosomeReads, #[case] kind: MetricKind) {
        let metric = metric(&mirrored, kind);
        let best = (-50..300)
            .max_by(|a, b| metric.compute(*a).total_cmp(&metric.compute(*b)))
            .unwrap();
        assert_eq!(metric.sign(), 1.0);
        assert_eq!(best, 60);
    }

    #[rstest]
    fn test_hamming_is_minimal_at_mirror_offset(mirrored: ChromosomeReads) {
        let metric = metric(&mirrored, MetricKind::Hamming);
        let best = (-50..300)
            .min_by(|a, b| metric.compute(*a).total_cmp(&metric.compute(*b)))
            .unwrap();
        assert_eq!(metric.sign(), -1.0);
        assert_eq!(best, 60);
        assert_eq!(metric.compute(60), 0.0);
    }

    #[rstest]
    fn test_bitset_jaccard_matches_vector_jaccard(mirrored: ChromosomeReads) {
        let vector = metric(&mirrored, MetricKind::JaccardVector);
        let bitset = metric(&mirrored, MetricKind::JaccardBitset);
        for offset in -50..300 {
            assert!(
                (vector.compute(offset) - bitset.compute(offset)).abs() < 1e-12,
                "offset {}",
                offset
            );
        }
    }

    #[rstest]
    fn test_jaccard_counts_larger_read_count() {
        let reads = ChromosomeReads::from_positions("chr1", 1000, &[100, 100, 200], &[110, 210, 210, 210]);
        let config = small_config(MetricKind::JaccardVector);
        let window = ScanWindow::new(1000, &ShiftConfig { ng_to: 100, ..config.clone() }).unwrap();
        let fwd = CountArray::from_anchors(reads.anchors(Strand::Forward), 0, 1000);
        let rev = CountArray::from_anchors(reads.anchors(Strand::Reverse), 0, 1000);
        let jaccard = VectorJaccard::new(fwd, rev, window);

        // overlap at 100 (max 2 vs 1) and 200 (max 1 vs 3): xy = 5, total = 7
        assert!((jaccard.compute(10) - 5.0 / 2.0).abs() < 1e-12);
    }

    #[rstest]
    fn test_cross_correlation_of_flat_strand_scales_to_zero() {
        let reads = ChromosomeReads::from_positions("chr1", 2000, &[], &[100, 200]);
        let m = metric(&reads, MetricKind::CrossCorrelation);
        assert_eq!(m.scale(), 0.0);
    }

    #[rstest]
    fn test_fragment_variability_returns_histograms(mirrored: ChromosomeReads) {
        let m = metric(&mirrored, MetricKind::FragmentVariability);
        let (value, histogram) = m.evaluate(60);
        let histogram = histogram.unwrap();

        assert!(histogram.total() > 0);
        assert!(value >= 0.0);
        assert_eq!(m.scale(), 1.0);
        assert_eq!(metric(&mirrored, MetricKind::Hamming).evaluate(60).1, None);
    }
}
