//! bamcmp - compare two alignment files record by record
//!
//! ```bash
//! bamcmp before.bam after.bam
//! bamcmp --sort-tags a.sam b.sam
//! bamcmp --reference ref.fa --ignore-tags a.cram b.bam
//! ```
//!
//! Exit status: 0 when no record pair differs, 1 when at least one does, 2 on
//! any fatal error (unreadable input, CRAM without a reference, decode error,
//! or a length mismatch under `--length-mismatch error`).

use bamcmp::compare::report::{OutputFormat, Reporter};
use bamcmp::compare::{CompareOptions, Comparisons, LengthMismatchPolicy};
use bamcmp::io::AlignmentSource;
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

const EXIT_IDENTICAL: i32 = 0;
const EXIT_DIFFERENT: i32 = 1;
const EXIT_FATAL: i32 = 2;

#[derive(Parser)]
#[command(name = "bamcmp")]
#[command(about = "Compare two SAM/BAM/CRAM files record by record", long_about = None)]
#[command(version)]
struct Cli {
    /// First alignment file (.bam, .cram, anything else is read as SAM)
    #[arg(value_name = "BAM_A")]
    bam_a: PathBuf,

    /// Second alignment file
    #[arg(value_name = "BAM_B")]
    bam_b: PathBuf,

    /// Reference FASTA (indexed with .fai), required for CRAM input
    #[arg(short = 'r', long, value_name = "PATH")]
    reference: Option<PathBuf>,

    /// Drop all optional tags before comparing
    #[arg(long)]
    ignore_tags: bool,

    /// Sort tags by key, type and value before comparing
    #[arg(long)]
    sort_tags: bool,

    /// Behaviour when the inputs hold different numbers of records
    #[arg(long, value_enum, default_value_t = LengthMismatchPolicy::Warn)]
    length_mismatch: LengthMismatchPolicy,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: &Cli) -> bamcmp::Result<bool> {
    let reference = cli.reference.as_deref();
    let left = AlignmentSource::open(&cli.bam_a, reference)?;
    let right = AlignmentSource::open(&cli.bam_b, reference)?;

    let options = CompareOptions {
        ignore_tags: cli.ignore_tags,
        sort_tags: cli.sort_tags,
        length_mismatch: cli.length_mismatch,
    };

    let stdout = io::stdout();
    let mut reporter = Reporter::new(BufWriter::new(stdout.lock()), cli.format);

    let mut comparisons = Comparisons::new(left, right, &options);
    for result in comparisons.by_ref() {
        reporter.result(&result?)?;
    }

    let summary = comparisons.summary();
    reporter.finish(&summary)?;
    Ok(summary.is_identical())
}

fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let code = match run(&cli) {
        Ok(true) => EXIT_IDENTICAL,
        Ok(false) => EXIT_DIFFERENT,
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FATAL
        }
    };
    process::exit(code);
}
