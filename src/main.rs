use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    process,
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, LevelFilter};

use polytract::{batch::TRANSLATED_DIR, Batch, BatchConfig, TractPattern};

const LOG_FILE: &str = "logfile.log";

fn parse_bool_flag(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("expected true or false, got {}", s)),
    }
}

#[derive(Parser)]
#[command(name = "polytract")]
#[command(version)]
#[command(about = "Find homopolymeric amino-acid tracts and report them per gene")]
#[command(long_about = r#"
polytract - protein poly tract finder

Scans translated proteins for runs of one amino acid (polyQ, polyA, ...),
optionally allowing a single interrupting residue, and writes:

  matches_protein/<name>_<i>.fasta      proteins carrying a tract
  matches_nucleotide/<name>_<i>.fasta   their coding sequences
  genome/<name>_<i>.fasta               every coding sequence, matched ones tagged
  reports/<name>_<i>.csv                one row per tract
  reports_no_isoforms/<name>_<i>.csv    one row per tract, longest isoform per gene

Protein files are paired by name with the nucleotide files they were
translated from. File names must carry a taxonomic family token, e.g.
Homo_sapiens_Hominidae_9606.fna.

The log goes to <output>/logfile.log unless --log-file says otherwise;
--log-file - logs to stderr.
"#)]
struct Args {
    /// Directory with the nucleotide FASTA files
    #[arg(short = 'i', long = "input-directory", value_name = "DIR")]
    input_directory: PathBuf,

    /// Output directory
    #[arg(short = 'o', long = "output-directory", value_name = "DIR")]
    output_directory: PathBuf,

    /// Directory with the translated proteins [default: <output>/translate_out]
    #[arg(short = 'p', long = "protein-directory", value_name = "DIR")]
    protein_directory: Option<PathBuf>,

    /// Amino acid of the poly tract
    #[arg(short = 'a', long = "amino-acid", value_name = "RESIDUE")]
    amino_acid: char,

    /// Minimum tract length
    #[arg(short = 's', long, value_name = "INT")]
    size: usize,

    /// Allow a single interrupting residue in the tract
    #[arg(short = 'b', long = "break-poly", value_name = "BOOL",
          default_value = "true", value_parser = parse_bool_flag,
          action = clap::ArgAction::Set)]
    break_poly: bool,

    /// Skip files with bad data instead of stopping the run
    #[arg(long = "keep-going")]
    keep_going: bool,

    /// Log file, `-` for stderr [default: <output>/logfile.log]
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[arg(short = 'v', long)]
    verbose: bool,
}

fn init_logging(args: &Args) -> Result<()> {
    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        });
    let log_file = args
        .log_file
        .clone()
        .unwrap_or_else(|| args.output_directory.join(LOG_FILE));
    if log_file.as_path() != Path::new("-") {
        if let Some(dir) = log_file.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        let file = File::create(&log_file)
            .with_context(|| format!("Failed to create log file: {}", log_file.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run(args: Args) -> Result<()> {
    init_logging(&args)?;

    let amino_acid = args.amino_acid.to_ascii_uppercase();
    let pattern = TractPattern::new(amino_acid, args.size, args.break_poly)
        .context("Invalid poly definition")?;
    let protein_dir = args
        .protein_directory
        .unwrap_or_else(|| args.output_directory.join(TRANSLATED_DIR));

    let batch = Batch::new(BatchConfig {
        protein_dir,
        nucleotide_dir: args.input_directory,
        output_dir: args.output_directory,
        pattern,
        keep_going: args.keep_going,
    });
    let summary = batch.run().context("Poly scan aborted")?;

    info!(
        "Done: {} files, {} records, {} tracts, {} genes",
        summary.files, summary.records, summary.matches, summary.genes
    );
    if summary.failed > 0 {
        error!("{} files failed", summary.failed);
        process::exit(2);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
