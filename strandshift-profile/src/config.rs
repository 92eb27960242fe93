use std::fmt::{self, Display};
use std::fs::read_to_string;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::errors::{ShiftProfileError, ShiftProfileResult};

///
/// Which shift metric a run computes.
///
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    CrossCorrelation,
    JaccardVector,
    JaccardBitset,
    Hamming,
    FragmentVariability,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::CrossCorrelation,
        MetricKind::JaccardVector,
        MetricKind::JaccardBitset,
        MetricKind::Hamming,
        MetricKind::FragmentVariability,
    ];

    /// Short tag used in report file names.
    pub fn tag(&self) -> &'static str {
        match self {
            MetricKind::CrossCorrelation => "ccp",
            MetricKind::JaccardVector => "exjaccard",
            MetricKind::JaccardBitset => "jaccard",
            MetricKind::Hamming => "hdp",
            MetricKind::FragmentVariability => "fvp",
        }
    }

    /// Name written in the report header.
    pub fn display_name(&self) -> &'static str {
        match self {
            MetricKind::CrossCorrelation => "Cross correlation",
            MetricKind::JaccardVector | MetricKind::JaccardBitset => "Jaccard index",
            MetricKind::Hamming => "Hamming distance",
            MetricKind::FragmentVariability => "Fragment Variability",
        }
    }

    /// `+1` for similarities, `-1` for distances.
    pub fn sign(&self) -> f64 {
        match self {
            MetricKind::Hamming => -1.0,
            _ => 1.0,
        }
    }
}

impl FromStr for MetricKind {
    type Err = ShiftProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cross-correlation" | "ccp" => Ok(MetricKind::CrossCorrelation),
            "jaccard-vector" | "exjaccard" => Ok(MetricKind::JaccardVector),
            "jaccard-bitset" | "jaccard" => Ok(MetricKind::JaccardBitset),
            "hamming" | "hdp" => Ok(MetricKind::Hamming),
            "fragment-variability" | "fvp" => Ok(MetricKind::FragmentVariability),
            _ => Err(ShiftProfileError::UnknownMetric(s.to_string())),
        }
    }
}

impl Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MetricKind::CrossCorrelation => "cross-correlation",
            MetricKind::JaccardVector => "jaccard-vector",
            MetricKind::JaccardBitset => "jaccard-bitset",
            MetricKind::Hamming => "hamming",
            MetricKind::FragmentVariability => "fragment-variability",
        };
        write!(f, "{}", name)
    }
}

///
/// Parameters of one profile run.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes:
///
/// ```toml
/// metric = "jaccard-bitset"
/// threads = 8
/// read_length = 50
/// ```
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ShiftConfig {
    pub metric: MetricKind,
    pub threads: usize,
    pub read_length: i32,
    pub mp_from: i32,
    pub mp_to: i32,
    pub ng_from: i32,
    pub ng_to: i32,
    pub ng_step: i32,
    pub threwidth: i32,
    pub histogram_width: usize,
    /// Read budget for fragment variability; `None` keeps every read.
    pub fvp_reads: Option<u64>,
    pub subsample_seed: u64,
    pub progress: bool,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        ShiftConfig {
            metric: MetricKind::CrossCorrelation,
            threads: DEFAULT_THREADS,
            read_length: DEFAULT_READ_LENGTH,
            mp_from: DEFAULT_MP_FROM,
            mp_to: DEFAULT_MP_TO,
            ng_from: DEFAULT_NG_FROM,
            ng_to: DEFAULT_NG_TO,
            ng_step: DEFAULT_NG_STEP,
            threwidth: DEFAULT_THREWIDTH,
            histogram_width: DEFAULT_HISTOGRAM_WIDTH,
            fvp_reads: None,
            subsample_seed: DEFAULT_SUBSAMPLE_SEED,
            progress: true,
        }
    }
}

impl ShiftConfig {
    pub fn with_metric(mut self, metric: MetricKind) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    ///
    /// Check the parameters before any work starts.
    ///
    pub fn validate(&self) -> ShiftProfileResult<()> {
        let fail = |msg: String| Err(ShiftProfileError::InvalidConfig(msg));

        if self.threads == 0 {
            return fail("number of threads must be positive".to_string());
        }
        if self.mp_from < 0 {
            return fail(format!("mp_from must not be negative (got {})", self.mp_from));
        }
        if self.mp_to <= self.mp_from {
            return fail(format!(
                "mp_to ({}) must be larger than mp_from ({})",
                self.mp_to, self.mp_from
            ));
        }
        if self.mp_to.checked_add(self.mp_from).is_none() {
            return fail(format!(
                "fine domain [-{}, {}) is too large",
                self.mp_from, self.mp_to
            ));
        }
        if self.ng_step <= 0 {
            return fail(format!("ng_step must be positive (got {})", self.ng_step));
        }
        if self.ng_to <= self.ng_from {
            return fail(format!(
                "ng_to ({}) must be larger than ng_from ({})",
                self.ng_to, self.ng_from
            ));
        }
        if self.threwidth <= 0 {
            return fail(format!("threwidth must be positive (got {})", self.threwidth));
        }
        if self.histogram_width == 0 {
            return fail("histogram_width must be positive".to_string());
        }
        if self.read_length < 0 {
            return fail(format!(
                "read_length must not be negative (got {})",
                self.read_length
            ));
        }

        Ok(())
    }

    /// The fine offset domain `[-mp_from, mp_to)`.
    pub fn fine_offsets(&self) -> Range<i32> {
        -self.mp_from..self.mp_to
    }

    /// The sampled background offsets `ng_from, ng_from + ng_step, ..` below `ng_to`.
    pub fn background_offsets(&self) -> impl Iterator<Item = i32> + use<> {
        (self.ng_from..self.ng_to).step_by(self.ng_step.max(1) as usize)
    }

    /// Number of offsets in the fine domain.
    pub fn fine_len(&self) -> usize {
        (self.mp_to as i64 + self.mp_from as i64).max(0) as usize
    }
}

impl TryFrom<&Path> for ShiftConfig {
    type Error = ShiftProfileError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: ShiftConfig = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
