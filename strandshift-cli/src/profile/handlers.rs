use std::path::Path;

use anyhow::{Context, Result};
use clap::ArgMatches;
use log::info;

use strandshift_core::utils::{is_autosome, read_anchor_file, read_chrom_sizes, read_mappability};
use strandshift_profile::consts::DEFAULT_OUTPUT_PREFIX;
use strandshift_profile::{MetricKind, ShiftConfig, run_shift_profile};

///
/// Start from the config file, if any, and let every flag that was given
/// override it.
///
fn build_config(matches: &ArgMatches) -> Result<ShiftConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => ShiftConfig::try_from(Path::new(path))
            .with_context(|| format!("Failed to load config file: {}", path))?,
        None => ShiftConfig::default(),
    };

    if let Some(metric) = matches.get_one::<String>("metric") {
        config.metric = metric.parse::<MetricKind>()?;
    }
    if let Some(threads) = matches.get_one::<usize>("threads") {
        config.threads = *threads;
    }
    if let Some(read_length) = matches.get_one::<i32>("read-length") {
        config.read_length = *read_length;
    }
    if let Some(mp_from) = matches.get_one::<i32>("mp-from") {
        config.mp_from = *mp_from;
    }
    if let Some(mp_to) = matches.get_one::<i32>("mp-to") {
        config.mp_to = *mp_to;
    }
    if let Some(ng_from) = matches.get_one::<i32>("ng-from") {
        config.ng_from = *ng_from;
    }
    if let Some(ng_to) = matches.get_one::<i32>("ng-to") {
        config.ng_to = *ng_to;
    }
    if let Some(ng_step) = matches.get_one::<i32>("ng-step") {
        config.ng_step = *ng_step;
    }
    if let Some(fvp_reads) = matches.get_one::<u64>("fvp-reads") {
        config.fvp_reads = Some(*fvp_reads);
    }
    if matches.get_flag("no-progress") {
        config.progress = false;
    }

    config.validate()?;
    Ok(config)
}

pub fn run_profile(matches: &ArgMatches) -> Result<()> {
    let anchors = matches
        .get_one::<String>("anchors")
        .context("A path to the read anchors is required.")?;

    let chromsizes = matches
        .get_one::<String>("chromsizes")
        .context("A path to the chrom sizes file is required.")?;

    let default_out = DEFAULT_OUTPUT_PREFIX.to_string();
    let output = matches.get_one::<String>("output").unwrap_or(&default_out);

    let yeast = matches.get_flag("yeast");
    let all_chromosomes = matches.get_flag("all-chromosomes");

    let config = build_config(matches)?;

    let sizes = read_chrom_sizes(chromsizes)?;
    let mappability = match matches.get_one::<String>("mappability") {
        Some(path) => Some(read_mappability(path)?),
        None => None,
    };
    let chromosomes = read_anchor_file(anchors, &sizes, mappability.as_ref())?;

    let nread: u64 = chromosomes.iter().map(|c| c.nonredundant_reads()).sum();
    info!("Read {} anchors on {} chromosomes", nread, chromosomes.len());

    let outcome = run_shift_profile(&chromosomes, &config, output, |name| {
        all_chromosomes || is_autosome(name, yeast)
    })?;

    println!("{}", outcome.estimated_fragment_length());

    outcome.reports?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use crate::build_parser;

    fn profile_matches(args: &[&str]) -> ArgMatches {
        let mut argv = vec!["strandshift", "profile", "reads.tsv", "--chromsizes", "sizes"];
        argv.extend_from_slice(args);
        let matches = build_parser().try_get_matches_from(argv).unwrap();
        matches.subcommand_matches("profile").unwrap().clone()
    }

    #[test]
    fn test_defaults_without_flags() {
        let config = build_config(&profile_matches(&[])).unwrap();
        assert_eq!(config, ShiftConfig::default());
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = build_config(&profile_matches(&[
            "--metric",
            "jaccard-bitset",
            "--threads",
            "3",
            "--ng-step",
            "50",
            "--no-progress",
        ]))
        .unwrap();

        assert_eq!(config.metric, MetricKind::JaccardBitset);
        assert_eq!(config.threads, 3);
        assert_eq!(config.ng_step, 50);
        assert!(!config.progress);
    }

    #[test]
    fn test_flags_take_precedence_over_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "metric = \"hamming\"\nthreads = 6\nmp_to = 3000").unwrap();
        let path = file.path().to_str().unwrap();

        let config = build_config(&profile_matches(&["--config", path, "--threads", "2"])).unwrap();

        assert_eq!(config.metric, MetricKind::Hamming);
        assert_eq!(config.mp_to, 3000);
        assert_eq!(config.threads, 2);
    }

    #[test]
    fn test_invalid_flags_are_rejected() {
        assert!(build_config(&profile_matches(&["--metric", "pearson"])).is_err());
        assert!(build_config(&profile_matches(&["--threads", "0"])).is_err());
    }
}
