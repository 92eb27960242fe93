use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use strandshift_core::models::{ChromosomeReads, Strand};

use crate::config::{MetricKind, ShiftConfig};
use crate::errors::ShiftProfileResult;
use crate::estimator::{QualityMetrics, estimate};
use crate::fragvar::FragmentVariabilityAtlas;
use crate::metrics::{ScanWindow, ShiftMetric};
use crate::profile::{GenomeProfile, ShiftProfile};
use crate::report::{ReportPaths, write_profile_reports};
use crate::scanner::ShiftScanner;

///
/// Everything a full run produces.
///
#[derive(Debug)]
pub struct ShiftProfileOutcome {
    pub genome: GenomeProfile,
    pub metrics: QualityMetrics,
    /// Report files, or the first report that could not be written.
    pub reports: ShiftProfileResult<ReportPaths>,
}

impl ShiftProfileOutcome {
    pub fn estimated_fragment_length(&self) -> i32 {
        self.metrics.estimated_fragment_length
    }
}

fn progress_bar(len: usize, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
    {
        bar.set_style(style.progress_chars("##-"));
    }
    bar
}

///
/// Probability of keeping a read when fragment variability runs on a fixed
/// read budget.
///
fn subsample_keep(chromosomes: &[ChromosomeReads], config: &ShiftConfig) -> f64 {
    let target = match (config.metric, config.fvp_reads) {
        (MetricKind::FragmentVariability, Some(target)) => target,
        _ => return 1.0,
    };

    let nread: u64 = chromosomes.iter().map(|c| c.nonredundant_reads()).sum();
    if target >= nread {
        if target > nread {
            warn!(
                "Only {} reads available for fragment variability, fewer than the requested {}",
                nread, target
            );
        }
        return 1.0;
    }

    target as f64 / nread as f64
}

///
/// Scan one chromosome, or mark its profile degenerate when it can't be scanned.
///
fn profile_chromosome<R: rand::Rng>(
    reads: &ChromosomeReads,
    config: &ShiftConfig,
    scanner: &ShiftScanner,
    keep: f64,
    rng: &mut R,
    atlas: Option<&mut FragmentVariabilityAtlas>,
) -> ShiftProfile {
    let mut profile = ShiftProfile::from_reads(reads);

    let window = match ScanWindow::new(reads.length as usize, config) {
        Some(window) => window,
        None => {
            warn!(
                "{}: shorter than {} bp, skipping",
                reads.name,
                config.mp_from + config.ng_to
            );
            profile.mark_degenerate(config);
            return profile;
        }
    };

    for strand in [Strand::Forward, Strand::Reverse] {
        if reads.nonredundant_reads_on(strand) == 0 {
            warn!("{}: no reads on the {} strand, skipping", reads.name, strand);
            profile.mark_degenerate(config);
            return profile;
        }
    }

    let metric = ShiftMetric::from_reads(reads, window, config, keep, rng);
    let scan = scanner.scan(&metric);

    if let Some(atlas) = atlas {
        for (offset, histogram) in scan.histograms.iter() {
            atlas.add(*offset, histogram);
        }
    }

    profile.set_scan(scan);
    profile
}

///
/// Build the shift profile of every chromosome and the genome profile.
///
/// # Arguments
///
/// - chromosomes: read anchors per chromosome, in report order
/// - config: run parameters, validated before any work starts
/// - is_autosome: decides which chromosomes make up the genome profile
///
pub fn make_profile<F>(
    chromosomes: &[ChromosomeReads],
    config: &ShiftConfig,
    is_autosome: F,
) -> ShiftProfileResult<GenomeProfile>
where
    F: Fn(&str) -> bool,
{
    config.validate()?;

    info!(
        "Computing {} profiles of {} chromosomes on {} threads",
        config.metric,
        chromosomes.len(),
        config.threads
    );

    let scanner = ShiftScanner::new(config)?;
    let keep = subsample_keep(chromosomes, config);
    let mut rng = StdRng::seed_from_u64(config.subsample_seed);
    let mut atlas = (config.metric == MetricKind::FragmentVariability).then(FragmentVariabilityAtlas::new);

    let bar = progress_bar(chromosomes.len(), config.progress);
    let mut profiles = Vec::with_capacity(chromosomes.len());

    for reads in chromosomes {
        bar.set_message(reads.name.clone());
        let started = Instant::now();

        let profile = profile_chromosome(reads, config, &scanner, keep, &mut rng, atlas.as_mut());

        debug!(
            "{}: {} reads, {} offsets in {:.2?}",
            reads.name,
            profile.nread,
            profile.fine.len() + profile.background.len(),
            started.elapsed()
        );
        profiles.push(profile);
        bar.inc(1);
    }
    bar.finish_and_clear();

    let genome = GenomeProfile::from_chromosomes(profiles, config, is_autosome);
    let included = genome.included.iter().filter(|inc| **inc).count();
    info!(
        "Genome profile built from {} of {} chromosomes ({} reads)",
        included,
        genome.chromosomes.len(),
        genome.profile.nread
    );

    Ok(match atlas {
        Some(atlas) => genome.with_fragment_variability(atlas),
        None => genome,
    })
}

///
/// Build the profiles, estimate the fragment length and write all reports
/// under `prefix`.
///
pub fn run_shift_profile<F>(
    chromosomes: &[ChromosomeReads],
    config: &ShiftConfig,
    prefix: &str,
    is_autosome: F,
) -> ShiftProfileResult<ShiftProfileOutcome>
where
    F: Fn(&str) -> bool,
{
    let genome = make_profile(chromosomes, config, is_autosome)?;
    let metrics = estimate(&genome.profile, config);

    info!(
        "Estimated fragment length: {} (NSC {:.4}, background {:.6})",
        metrics.estimated_fragment_length,
        metrics.nsc * config.metric.sign(),
        metrics.background_level
    );

    let reports = write_profile_reports(&genome, config, prefix);

    Ok(ShiftProfileOutcome {
        genome,
        metrics,
        reports,
    })
}
