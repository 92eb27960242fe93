use std::collections::BTreeMap;
use std::ops::Range;

use rayon::prelude::*;
use rayon::ThreadPool;

use crate::config::ShiftConfig;
use crate::errors::ShiftProfileResult;
use crate::fragvar::FragmentHistogram;
use crate::metrics::ShiftMetric;

///
/// Values of one metric on one chromosome.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanResult {
    pub fine: BTreeMap<i32, f64>,
    pub background: BTreeMap<i32, f64>,
    /// Hit-distance histograms of the fine offsets; fragment variability only.
    pub histograms: BTreeMap<i32, FragmentHistogram>,
}

/// What one worker hands back for its sub-range.
#[derive(Debug, Default)]
struct PartialScan {
    values: BTreeMap<i32, f64>,
    histograms: BTreeMap<i32, FragmentHistogram>,
}

fn scan_range(metric: &ShiftMetric, offsets: Range<i32>) -> PartialScan {
    let mut partial = PartialScan::default();

    for offset in offsets {
        let (value, histogram) = metric.evaluate(offset);
        partial.values.insert(offset, value);
        if let Some(histogram) = histogram {
            partial.histograms.insert(offset, histogram);
        }
    }

    partial
}

///
/// Split `[-mp_from, mp_to)` into at most `threads` contiguous sub-ranges.
///
/// Every range holds `len / threads + 1` offsets except the last one, which
/// ends at the end of the domain. Empty ranges are dropped.
///
pub fn partition_offsets(config: &ShiftConfig) -> Vec<Range<i32>> {
    let len = config.fine_len();
    let threads = config.threads.max(1);
    let sepsize = len / threads + 1;

    (0..threads)
        .filter_map(|i| {
            let start = (i * sepsize).min(len);
            let end = if i + 1 == threads {
                len
            } else {
                ((i + 1) * sepsize).min(len)
            };

            (start < end)
                .then(|| start as i32 - config.mp_from..end as i32 - config.mp_from)
        })
        .collect()
}

///
/// Evaluates a metric over the fine domain on a worker pool and over the
/// background domain on the calling thread.
///
pub struct ShiftScanner {
    pool: ThreadPool,
    ranges: Vec<Range<i32>>,
    background: Vec<i32>,
}

impl ShiftScanner {
    pub fn new(config: &ShiftConfig) -> ShiftProfileResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()?;

        Ok(ShiftScanner {
            pool,
            ranges: partition_offsets(config),
            background: config.background_offsets().collect(),
        })
    }

    pub fn ranges(&self) -> &[Range<i32>] {
        &self.ranges
    }

    pub fn scan(&self, metric: &ShiftMetric) -> ScanResult {
        let partials: Vec<PartialScan> = self.pool.install(|| {
            self.ranges
                .par_iter()
                .map(|range| scan_range(metric, range.clone()))
                .collect()
        });

        let mut result = ScanResult::default();
        for partial in partials {
            result.fine.extend(partial.values);
            result.histograms.extend(partial.histograms);
        }

        for &offset in self.background.iter() {
            result.background.insert(offset, metric.compute(offset));
        }

        let scale = metric.scale();
        for value in result.fine.values_mut().chain(result.background.values_mut()) {
            *value *= scale;
        }

        result
    }
}
