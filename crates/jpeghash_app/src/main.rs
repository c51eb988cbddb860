//! jpeghash - segment-aware JPEG fingerprints
//!
//! Reads filenames from stdin and prints one digest per file, leaving out the
//! segment types named on the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jpeghash_core::{DigestAlgorithm, ExclusionRange, TypeFilter};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;

use jpeghash_app::logging::setup_logging;
use jpeghash_app::{BatchOptions, OutputFormat, find_duplicates, run_batch, write_groups};

#[derive(Parser, Debug)]
#[command(name = "jpeghash")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    /// Segment types to leave out: hex bytes, ranges or marker names (e1, e0-ef, APP1, COM)
    #[arg(value_name = "EXCLUDE")]
    exclude: Vec<ExclusionRange>,

    #[arg(short, long, env = "JPEGHASH_ALGORITHM", default_value_t = DigestAlgorithm::Sha1)]
    algorithm: DigestAlgorithm,

    /// Files scanned concurrently; output order is unchanged
    #[arg(short, long, env = "JPEGHASH_JOBS", default_value_t = 1,
          value_parser = clap::value_parser!(u16).range(1..))]
    jobs: u16,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List digests shared by more than one file in a saved listing
    Compare {
        #[arg(value_name = "LISTING")]
        listing: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet);

    match args.command {
        Some(Command::Compare { listing }) => run_compare(&listing),
        None => {
            let filter = TypeFilter::from_ranges(args.exclude.iter().copied());
            let options = BatchOptions::default()
                .with_algorithm(args.algorithm)
                .with_jobs(usize::from(args.jobs))
                .with_format(args.format);
            run_hash(&filter, &options)
        }
    }
}

fn run_hash(filter: &TypeFilter, options: &BatchOptions) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let summary = run_batch(stdin.lock(), &mut out, filter, options)?;
    if summary.failures > 0 {
        info!("{} of {} files failed", summary.failures, summary.records);
    }
    Ok(())
}

fn run_compare(listing: &Path) -> Result<()> {
    let file = File::open(listing)
        .with_context(|| format!("Failed to open listing: {}", listing.display()))?;
    let groups = find_duplicates(BufReader::new(file))?;

    info!("{} duplicate groups", groups.len());

    let stdout = io::stdout();
    write_groups(&groups, &mut stdout.lock()).context("Failed to write duplicate groups")
}
