//! Default domain constants and report names.

/// Fine domain starts at `-DEFAULT_MP_FROM`.
pub const DEFAULT_MP_FROM: i32 = 500;
/// Fine domain ends (exclusive) at `DEFAULT_MP_TO`.
pub const DEFAULT_MP_TO: i32 = 4000;

/// Background domain `[DEFAULT_NG_FROM, DEFAULT_NG_TO)` sampled every `DEFAULT_NG_STEP`.
pub const DEFAULT_NG_FROM: i32 = 4000;
pub const DEFAULT_NG_TO: i32 = 5000;
pub const DEFAULT_NG_STEP: i32 = 100;

/// Half width of the plateau test used when searching local maxima.
pub const DEFAULT_THREWIDTH: i32 = 5;

/// Number of bins of a fragment-variability histogram.
pub const DEFAULT_HISTOGRAM_WIDTH: usize = 500;

/// Fragment variability never scans closer than this to the chromosome end.
pub const FRAGMENT_VARIABILITY_TAIL: i32 = 500;

pub const DEFAULT_THREADS: usize = 1;
pub const DEFAULT_READ_LENGTH: i32 = 36;

/// Offsets closer than `read_length * READ_LENGTH_MARGIN` are never chosen.
pub const READ_LENGTH_MARGIN: f64 = 1.3;

pub const NUM_10M: f64 = 10_000_000.0;
pub const NUM_100M: f64 = 100_000_000.0;

/// Expected background enrichment of a uniform library: N/(4L-N), N=10M, L=100M.
pub const UNIFORM_BACKGROUND: f64 = 1.0 / 39.0;

/// Offsets whose fragment-variability distributions are written to the `mpfv` report.
pub const FRAGMENT_VARIABILITY_REPORT_LENGTHS: [i32; 6] = [50, 150, 500, 1000, 2000, 3000];

pub const DEFAULT_OUTPUT_PREFIX: &str = "strandshift";
pub const FRAGMENT_VARIABILITY_REPORT_SUFFIX: &str = "mpfv.csv";
pub const DEFAULT_SUBSAMPLE_SEED: u64 = 42;
