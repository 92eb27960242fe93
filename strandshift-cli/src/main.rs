mod profile;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "strandshift";
    pub const BIN_NAME: &str = "strandshift";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Strand-shift profiles of mapped ChIP-seq reads: fragment length, NSC and RSC.")
        .subcommand_required(true)
        .subcommand(profile::cli::create_profile_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // STRAND-SHIFT PROFILE
        //
        Some((profile::cli::PROFILE_CMD, matches)) => {
            profile::handlers::run_profile(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
