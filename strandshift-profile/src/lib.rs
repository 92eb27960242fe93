//! # Strand-shift profiles
//!
//! Reads of a ChIP-seq library sit on both ends of the sequenced fragments:
//! forward-strand reads at the left end, reverse-strand reads at the right
//! end. Sliding the reverse strand against the forward strand and measuring
//! how well the two agree gives a *strand-shift profile*. Its peak sits at the
//! typical fragment length, and its height over the far-offset background
//! tells how enriched the library is.
//!
//! This crate computes such profiles with one of five metrics
//! ([`MetricKind`]), per chromosome and for the genome, and derives the
//! fragment length estimate and the quality scores from them.
//!
//! ```
//! use strandshift_core::models::ChromosomeReads;
//! use strandshift_profile::{MetricKind, ShiftConfig, estimate, make_profile};
//!
//! let fwd: Vec<i64> = vec![100, 180, 370, 420, 650, 700, 910];
//! let rev: Vec<i64> = fwd.iter().map(|p| p + 50).collect();
//! let chroms = vec![ChromosomeReads::from_positions("chr1", 2000, &fwd, &rev)];
//!
//! let config = ShiftConfig {
//!     metric: MetricKind::JaccardBitset,
//!     mp_from: 20,
//!     mp_to: 200,
//!     ng_from: 200,
//!     ng_to: 300,
//!     ng_step: 10,
//!     progress: false,
//!     ..ShiftConfig::default()
//! };
//!
//! let genome = make_profile(&chroms, &config, |_| true).unwrap();
//! let metrics = estimate(&genome.profile, &config);
//! assert_eq!(genome.profile.fine.len(), 220);
//! assert!(metrics.background_level >= 0.0);
//! ```

pub mod config;
pub mod consts;
pub mod density;
pub mod engine;
pub mod errors;
pub mod estimator;
pub mod fragvar;
pub mod metrics;
pub mod profile;
pub mod report;
pub mod scanner;

pub use config::{MetricKind, ShiftConfig};
pub use engine::{ShiftProfileOutcome, make_profile, run_shift_profile};
pub use errors::{ShiftProfileError, ShiftProfileResult};
pub use estimator::{QualityMetrics, estimate};
pub use profile::{GenomeProfile, ShiftProfile};
pub use report::{ReportPaths, write_profile_reports};
