//! Fragment length and strand-shift quality scores from a finished profile.

use crate::config::ShiftConfig;
use crate::consts::{NUM_100M, NUM_10M, READ_LENGTH_MARGIN, UNIFORM_BACKGROUND};
use crate::profile::ShiftProfile;

///
/// Scores derived from one profile. Recomputed on demand, never stored.
///
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QualityMetrics {
    /// Mean of the background values.
    pub background_level: f64,
    /// `1 / background_level`, 0 when the background is 0.
    pub ratio: f64,
    pub estimated_fragment_length: i32,
    /// Score of the estimated fragment length, relative to the background.
    pub nsc: f64,
    /// Score at the read length, relative to the background.
    pub rsc: f64,
    pub background_enrichment: f64,
    pub background_uniformity: f64,
}

#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

pub fn background_level(profile: &ShiftProfile) -> f64 {
    if profile.background.is_empty() {
        return 0.0;
    }
    let sum: f64 = profile.background.values().sum();
    finite_or_zero(sum / profile.background.len() as f64)
}

///
/// Reads per 10M mapped reads, relative to a 100M bp genome.
///
pub fn reads_per_10m(profile: &ShiftProfile) -> f64 {
    if profile.nread == 0 || profile.mappable_length == 0 {
        return 0.0;
    }
    finite_or_zero((NUM_10M / profile.nread as f64) / (NUM_100M / profile.mappable_length as f64))
}

///
/// True when no offset within `threwidth` of `offset` scores better.
///
/// Values are compared after multiplying by `sign`, so distance metrics look
/// for a local minimum rather than comparing raw values.
/// Offsets outside the profile read as 0.
///
fn is_local_peak(profile: &ShiftProfile, offset: i32, threwidth: i32, sign: f64) -> bool {
    let value = profile.value(offset) * sign;
    (1..=threwidth).all(|j| {
        value >= profile.value(offset + j) * sign && value >= profile.value(offset - j) * sign
    })
}

///
/// Estimate the fragment length and the quality scores of `profile`.
///
/// Offsets are scanned from `mp_to - 1 - threwidth` downwards while they stay
/// above `max(read_length * 1.3, -mp_from)`. Among the local peaks the one with
/// the best background-relative score wins; a later (smaller) offset must be
/// strictly better to replace an earlier one, so ties keep the larger offset.
/// If no peak beats the score at `mp_to - 1`, the estimate is 0.
///
/// A zero background leaves every score at 0.
///
pub fn estimate(profile: &ShiftProfile, config: &ShiftConfig) -> QualityMetrics {
    let sign = config.metric.sign();

    let background_level = background_level(profile);
    let ratio = if background_level == 0.0 {
        0.0
    } else {
        finite_or_zero(1.0 / background_level)
    };

    // nothing to compare against
    if ratio == 0.0 {
        return QualityMetrics {
            background_level,
            ..QualityMetrics::default()
        };
    }

    let mut nsc = finite_or_zero(profile.value(config.mp_to - 1) * sign);
    let mut estimated_fragment_length = 0;

    let lower = (config.read_length as f64 * READ_LENGTH_MARGIN).max(-config.mp_from as f64);
    let mut i = config.mp_to - 1 - config.threwidth;
    while i as f64 > lower {
        if is_local_peak(profile, i, config.threwidth, sign) {
            let score = finite_or_zero(profile.value(i) * ratio * sign);
            if score > nsc {
                nsc = score;
                estimated_fragment_length = i;
            }
        }
        i -= 1;
    }

    let rsc = if config.fine_offsets().contains(&config.read_length) {
        finite_or_zero(profile.value(config.read_length) * ratio * sign)
    } else {
        0.0
    };

    let background_enrichment = finite_or_zero(background_level * reads_per_10m(profile));
    let background_uniformity = if background_enrichment == 0.0 {
        0.0
    } else {
        finite_or_zero(UNIFORM_BACKGROUND / background_enrichment)
    };

    QualityMetrics {
        background_level,
        ratio,
        estimated_fragment_length,
        nsc,
        rsc,
        background_enrichment,
        background_uniformity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::config::MetricKind;

    fn config(metric: MetricKind) -> ShiftConfig {
        ShiftConfig {
            metric,
            mp_from: 20,
            mp_to: 100,
            ng_from: 100,
            ng_to: 140,
            ng_step: 10,
            read_length: 10,
            ..ShiftConfig::default()
        }
    }

    fn profile_from<F: Fn(i32) -> f64>(config: &ShiftConfig, f: F, background: f64) -> ShiftProfile {
        let mut profile = ShiftProfile::new("chr1", 10_000, 1_000, 10_000);
        profile.fine = config.fine_offsets().map(|i| (i, f(i))).collect();
        profile.background = config.background_offsets().map(|i| (i, background)).collect();
        profile
    }

    /// A triangle peaking at `top`, raised above a flat floor.
    fn peak(top: i32) -> impl Fn(i32) -> f64 {
        move |i| 1.0 + (10.0 - ((i - top).abs() as f64)).max(0.0)
    }

    #[rstest]
    fn test_estimate_finds_peak() {
        let config = config(MetricKind::CrossCorrelation);
        let profile = profile_from(&config, peak(50), 0.5);
        let metrics = estimate(&profile, &config);

        assert_eq!(metrics.estimated_fragment_length, 50);
        assert_eq!(metrics.background_level, 0.5);
        assert_eq!(metrics.ratio, 2.0);
        assert_eq!(metrics.nsc, 22.0);
        assert_eq!(metrics.rsc, 2.0);
    }

    #[rstest]
    fn test_peak_below_read_length_margin_is_ignored() {
        let config = config(MetricKind::CrossCorrelation);
        // keeps rising below 13 = 10 * 1.3, the first excluded offset
        let profile = profile_from(&config, |i| 200.0 - i as f64, 0.5);
        let metrics = estimate(&profile, &config);

        assert_eq!(metrics.estimated_fragment_length, 0);
        assert_eq!(metrics.nsc, 101.0);
    }

    #[rstest]
    fn test_ties_keep_the_larger_offset() {
        let config = config(MetricKind::CrossCorrelation);
        let profile = profile_from(&config, |i| if i == 30 || i == 70 { 5.0 } else { 1.0 }, 1.0);
        let metrics = estimate(&profile, &config);

        assert_eq!(metrics.estimated_fragment_length, 70);
        assert_eq!(metrics.nsc, 5.0);
    }

    #[rstest]
    fn test_plateau_takes_its_largest_offset() {
        let config = config(MetricKind::CrossCorrelation);
        let profile = profile_from(&config, |i| if (40..=44).contains(&i) { 3.0 } else { 1.0 }, 1.0);
        let metrics = estimate(&profile, &config);

        assert_eq!(metrics.estimated_fragment_length, 44);
    }

    #[rstest]
    fn test_hamming_looks_for_a_minimum() {
        let config = config(MetricKind::Hamming);
        let profile = profile_from(&config, |i| if i == 60 { 10.0 } else { 100.0 - (i % 7) as f64 }, 120.0);
        let metrics = estimate(&profile, &config);

        assert_eq!(metrics.estimated_fragment_length, 60);
        assert!(metrics.nsc < 0.0);
        assert!((metrics.nsc - (-10.0 / 120.0)).abs() < 1e-12);
    }

    #[rstest]
    fn test_zero_background_gives_finite_zero_scores() {
        let config = config(MetricKind::CrossCorrelation);
        let profile = profile_from(&config, peak(50), 0.0);
        let metrics = estimate(&profile, &config);

        assert_eq!(metrics.ratio, 0.0);
        assert_eq!(metrics.nsc, 0.0);
        assert_eq!(metrics.rsc, 0.0);
        assert_eq!(metrics.estimated_fragment_length, 0);
        assert_eq!(metrics.background_enrichment, 0.0);
        assert_eq!(metrics.background_uniformity, 0.0);
        assert!(metrics.nsc.is_finite());
    }

    #[rstest]
    fn test_all_zero_profile() {
        let config = config(MetricKind::CrossCorrelation);
        let profile = profile_from(&config, |_| 0.0, 0.0);
        assert_eq!(estimate(&profile, &config), QualityMetrics::default());
    }

    #[rstest]
    fn test_background_enrichment() {
        let config = config(MetricKind::CrossCorrelation);
        let profile = profile_from(&config, peak(50), 0.5);
        let metrics = estimate(&profile, &config);

        // (10M / 1000) / (100M / 10000) = 1
        assert!((reads_per_10m(&profile) - 1.0).abs() < 1e-12);
        assert!((metrics.background_enrichment - 0.5).abs() < 1e-12);
        assert!((metrics.background_uniformity - (1.0 / 39.0) / 0.5).abs() < 1e-12);
    }

    #[rstest]
    fn test_estimate_is_idempotent() {
        let config = config(MetricKind::JaccardVector);
        let profile = profile_from(&config, peak(66), 0.25);
        assert_eq!(estimate(&profile, &config), estimate(&profile, &config));
    }
}
