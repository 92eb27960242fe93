//! Tab-delimited profile reports.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::ShiftConfig;
use crate::consts::{FRAGMENT_VARIABILITY_REPORT_LENGTHS, FRAGMENT_VARIABILITY_REPORT_SUFFIX};
use crate::errors::{ShiftProfileError, ShiftProfileResult};
use crate::estimator::{QualityMetrics, estimate, reads_per_10m};
use crate::fragvar::FragmentVariabilityAtlas;
use crate::profile::{GenomeProfile, ShiftProfile};

/// Files written by [`write_profile_reports`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPaths {
    pub chromosomes: Vec<PathBuf>,
    pub genome: PathBuf,
    pub fragment_variability: Option<PathBuf>,
}

/// `<prefix>.<tag>.csv`, or `<prefix>.<tag>.<chrom>.csv` for a chromosome.
pub fn report_path(prefix: &str, tag: &str, chrom: Option<&str>) -> PathBuf {
    match chrom {
        Some(chrom) => PathBuf::from(format!("{}.{}.{}.csv", prefix, tag, chrom)),
        None => PathBuf::from(format!("{}.{}.csv", prefix, tag)),
    }
}

pub fn fragment_variability_report_path(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", prefix, FRAGMENT_VARIABILITY_REPORT_SUFFIX))
}

///
/// Write the header lines and the offset table of one profile.
///
/// # Arguments
///
/// - writer: destination
/// - profile: chromosome or genome profile
/// - metrics: scores of `profile`
/// - config: run parameters; decides the metric name and sign
///
pub fn write_profile_report<W: Write>(
    writer: &mut W,
    profile: &ShiftProfile,
    metrics: &QualityMetrics,
    config: &ShiftConfig,
) -> io::Result<()> {
    let sign = config.metric.sign();
    let sum = profile.sum();
    let per_10m = reads_per_10m(profile);

    writeln!(writer, "NSC\t{}", metrics.nsc * sign)?;
    writeln!(writer, "RLSC\t{}", metrics.rsc)?;
    writeln!(writer, "Estimated fragment length\t{}", metrics.estimated_fragment_length)?;
    writeln!(writer, "Background enrichment\t{}", metrics.background_enrichment)?;
    writeln!(writer, "Background uniformity\t{}", metrics.background_uniformity)?;

    writeln!(
        writer,
        "Strand shift\t{}\tprop\tper 10M reads\tper control",
        config.metric.display_name()
    )?;
    for (offset, value) in profile.fine.iter() {
        let prop = if sum == 0.0 { 0.0 } else { value / sum };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            offset,
            value,
            prop,
            value * per_10m,
            value * metrics.ratio
        )?;
    }

    Ok(())
}

/// Offsets listed in the fragment variability report.
pub fn fragment_variability_report_lengths(config: &ShiftConfig) -> Vec<i32> {
    let mut lengths: Vec<i32> = FRAGMENT_VARIABILITY_REPORT_LENGTHS
        .iter()
        .copied()
        .filter(|l| *l < config.mp_to - 1)
        .collect();
    lengths.push(config.mp_to - 1);
    lengths
}

///
/// Write the cumulative and the plain hit-distance distributions of the
/// genome at a few fixed lengths, one row per distance.
///
pub fn write_fragment_variability_report<W: Write>(
    writer: &mut W,
    atlas: &FragmentVariabilityAtlas,
    config: &ShiftConfig,
) -> io::Result<()> {
    let lengths = fragment_variability_report_lengths(config);

    let columns: String = lengths.iter().map(|l| format!("\tlen{}", l)).collect();
    writeln!(writer, "{}{}", columns, columns)?;

    let accumulated: Vec<Vec<f64>> = lengths
        .iter()
        .map(|l| atlas.get(*l).map(|h| h.accumulated()).unwrap_or_default())
        .collect();

    for k in 0..config.histogram_width {
        write!(writer, "{}", k)?;
        for acc in accumulated.iter() {
            write!(writer, "\t{}", acc.get(k).copied().unwrap_or(0.0))?;
        }
        for l in lengths.iter() {
            let p = atlas.get(*l).map(|h| h.distribution(k)).unwrap_or(0.0);
            write!(writer, "\t{}", p)?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn create_report(path: &Path) -> ShiftProfileResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ShiftProfileError::Report {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }

    let file = File::create(path).map_err(|source| ShiftProfileError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

fn write_report_file<F>(path: &Path, write: F) -> ShiftProfileResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
{
    let mut writer = create_report(path)?;
    write(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|source| ShiftProfileError::Report {
            path: path.to_path_buf(),
            source,
        })
}

///
/// Write every report of a run: one per chromosome, one for the genome and,
/// for fragment variability, the distribution report.
///
/// A report that fails does not stop the others. The first error is
/// returned once all reports have been attempted.
///
pub fn write_profile_reports(
    genome: &GenomeProfile,
    config: &ShiftConfig,
    prefix: &str,
) -> ShiftProfileResult<ReportPaths> {
    let tag = config.metric.tag();
    let mut first_error: Option<ShiftProfileError> = None;
    let mut record = |result: ShiftProfileResult<()>| {
        if let Err(e) = result {
            warn!("{}", e);
            if first_error.is_none() {
                first_error = Some(e);
            }
        }
    };

    let mut paths = ReportPaths::default();

    for chrom in genome.chromosomes.iter() {
        if chrom.nread == 0 {
            warn!("{}: no reads", chrom.name);
        }
        let path = report_path(prefix, tag, Some(&chrom.name));
        let metrics = estimate(chrom, config);
        record(write_report_file(&path, |w| {
            write_profile_report(w, chrom, &metrics, config)
        }));
        paths.chromosomes.push(path);
    }

    let path = report_path(prefix, tag, None);
    let metrics = estimate(&genome.profile, config);
    record(write_report_file(&path, |w| {
        write_profile_report(w, &genome.profile, &metrics, config)
    }));
    paths.genome = path;

    if let Some(atlas) = genome.fragment_variability.as_ref() {
        let path = fragment_variability_report_path(prefix);
        record(write_report_file(&path, |w| {
            write_fragment_variability_report(w, atlas, config)
        }));
        paths.fragment_variability = Some(path);
    }

    match first_error {
        Some(e) => Err(e),
        None => {
            info!("Reports written to {}.{}.*", prefix, tag);
            Ok(paths)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs::read_to_string;
    use tempfile::tempdir;

    use crate::config::MetricKind;
    use crate::fragvar::FragmentHistogram;

    fn config(metric: MetricKind) -> ShiftConfig {
        ShiftConfig {
            metric,
            mp_from: 2,
            mp_to: 3,
            ng_from: 10,
            ng_to: 12,
            ng_step: 1,
            read_length: 0,
            threwidth: 1,
            histogram_width: 4,
            ..ShiftConfig::default()
        }
    }

    #[fixture]
    fn genome() -> GenomeProfile {
        let config = config(MetricKind::CrossCorrelation);
        let mut chr1 = ShiftProfile::new("chr1", 100_000_000, 10_000_000, 100_000_000);
        chr1.fine = [(-2, 0.0), (-1, 1.0), (0, 1.0), (1, 2.0), (2, 0.0)].into_iter().collect();
        chr1.background = [(10, 0.5), (11, 0.5)].into_iter().collect();
        let mut chr2 = ShiftProfile::new("chr2", 1000, 0, 1000);
        chr2.mark_degenerate(&config);

        GenomeProfile::from_chromosomes(vec![chr1, chr2], &config, |_| true)
    }

    #[rstest]
    fn test_report_path() {
        assert_eq!(
            report_path("out/sample", "ccp", Some("chr1")),
            PathBuf::from("out/sample.ccp.chr1.csv")
        );
        assert_eq!(report_path("sample", "hdp", None), PathBuf::from("sample.hdp.csv"));
        assert_eq!(
            fragment_variability_report_path("sample"),
            PathBuf::from("sample.mpfv.csv")
        );
    }

    #[rstest]
    fn test_write_profile_report(genome: GenomeProfile) {
        let config = config(MetricKind::CrossCorrelation);
        let chr1 = &genome.chromosomes[0];
        let metrics = estimate(chr1, &config);

        let mut out = Vec::new();
        write_profile_report(&mut out, chr1, &metrics, &config).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "NSC\t4");
        assert_eq!(lines[1], "RLSC\t2");
        assert_eq!(lines[2], "Estimated fragment length\t1");
        assert_eq!(lines[3], "Background enrichment\t0.5");
        assert_eq!(
            lines[5],
            "Strand shift\tCross correlation\tprop\tper 10M reads\tper control"
        );
        assert_eq!(lines[6], "-2\t0\t0\t0\t0");
        assert_eq!(lines[9], "1\t2\t0.5\t2\t4");
        assert_eq!(lines.len(), 11);
    }

    #[rstest]
    fn test_write_profile_reports(genome: GenomeProfile) {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("run");
        let prefix = prefix.to_str().unwrap();
        let config = config(MetricKind::CrossCorrelation);

        let paths = write_profile_reports(&genome, &config, prefix).unwrap();

        assert_eq!(paths.chromosomes.len(), 2);
        assert!(paths.chromosomes.iter().all(|p| p.exists()));
        assert_eq!(paths.genome, dir.path().join("run.ccp.csv"));
        assert_eq!(paths.fragment_variability, None);

        let degenerate = read_to_string(&paths.chromosomes[1]).unwrap();
        assert!(degenerate.starts_with("NSC\t0\n"));
    }

    #[rstest]
    fn test_failing_report_does_not_stop_others(genome: GenomeProfile) {
        let dir = tempdir().unwrap();
        let config = config(MetricKind::CrossCorrelation);
        // a directory where the chr1 report should go
        std::fs::create_dir(dir.path().join("run.ccp.chr1.csv")).unwrap();
        let prefix = dir.path().join("run");

        let result = write_profile_reports(&genome, &config, prefix.to_str().unwrap());

        assert!(matches!(result, Err(ShiftProfileError::Report { .. })));
        assert!(dir.path().join("run.ccp.chr2.csv").exists());
        assert!(dir.path().join("run.ccp.csv").exists());
    }

    #[rstest]
    fn test_write_fragment_variability_report() {
        let config = ShiftConfig {
            mp_to: 200,
            ..config(MetricKind::FragmentVariability)
        };
        let mut atlas = FragmentVariabilityAtlas::new();
        let histogram = FragmentHistogram::new(4);
        atlas.add(150, &histogram);
        atlas.add(199, &histogram);

        let mut out = Vec::new();
        write_fragment_variability_report(&mut out, &atlas, &config).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "\tlen50\tlen150\tlen199\tlen50\tlen150\tlen199"
        );
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "0\t0\t0\t0\t0\t0\t0");
    }
}
