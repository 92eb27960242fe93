use clap::{Arg, ArgAction, Command};

pub const PROFILE_CMD: &str = "profile";

/// Creates the profile CLI Command object
pub fn create_profile_cli() -> Command {
    Command::new(PROFILE_CMD)
        .author("Databio")
        .about("Compute strand-shift profiles and estimate the fragment length of a read set.")
        .arg(
            Arg::new("anchors")
                .help("Read anchors: chrom, position, strand and an optional duplicate flag per line. Use - for stdin")
                .required(true),
        )
        .arg(
            Arg::new("chromsizes")
                .long("chromsizes")
                .short('g')
                .help("Path to the chrom sizes file")
                .required(true),
        )
        .arg(
            Arg::new("mappability")
                .long("mappability")
                .short('m')
                .help("Path to a table of mappable bases per chromosome"),
        )
        .arg(
            Arg::new("metric")
                .long("metric")
                .short('k')
                .help("cross-correlation, jaccard-vector, jaccard-bitset, hamming or fragment-variability"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Prefix of the report files"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML file with run parameters; command line flags take precedence"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('p')
                .value_parser(clap::value_parser!(usize))
                .help("Number of worker threads"),
        )
        .arg(
            Arg::new("read-length")
                .long("read-length")
                .short('r')
                .value_parser(clap::value_parser!(i32))
                .help("Read length; offsets below 1.3 times this are never chosen"),
        )
        .arg(
            Arg::new("mp-from")
                .long("mp-from")
                .value_parser(clap::value_parser!(i32))
                .help("Fine domain starts at -mp-from"),
        )
        .arg(
            Arg::new("mp-to")
                .long("mp-to")
                .value_parser(clap::value_parser!(i32))
                .help("Fine domain ends (exclusive) at mp-to"),
        )
        .arg(
            Arg::new("ng-from")
                .long("ng-from")
                .value_parser(clap::value_parser!(i32))
                .help("First background offset"),
        )
        .arg(
            Arg::new("ng-to")
                .long("ng-to")
                .value_parser(clap::value_parser!(i32))
                .help("Background offsets stay below ng-to"),
        )
        .arg(
            Arg::new("ng-step")
                .long("ng-step")
                .value_parser(clap::value_parser!(i32))
                .help("Step between background offsets"),
        )
        .arg(
            Arg::new("fvp-reads")
                .long("fvp-reads")
                .value_parser(clap::value_parser!(u64))
                .help("Subsample to about this many reads for fragment variability"),
        )
        .arg(
            Arg::new("yeast")
                .long("yeast")
                .help("Treat roman numeral chromosome names as autosomes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("all-chromosomes")
                .long("all-chromosomes")
                .help("Build the genome profile from every chromosome, not only autosomes")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-progress")
                .long("no-progress")
                .help("Hide the progress bar")
                .action(ArgAction::SetTrue),
        )
}
