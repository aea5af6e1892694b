//! CLI for bib-prune - Remove unused entries from BibTeX files.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use bib_prune::{
    prune, read_bibliographies, read_manuscripts, write_output, PruneError, PruneOutcome,
    SourceError,
};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Remove unused BibTeX entries
#[derive(Parser)]
#[command(name = "bib-prune")]
#[command(version)]
#[command(after_help = "\
Examples:
  bib-prune
  bib-prune -b refs.bib,acl.bib -p main.tex,appendix.tex -o min.bib
  bib-prune -b paper.bib -p paper.md -o - > min.bib
  bib-prune -p paper.tex --report usage.json

Citation syntax: \\cite...{key} in .tex files, @key in .md files")]
struct Cli {
    /// Comma-separated list of bib files
    #[arg(short, long, alias = "bib_files", value_delimiter = ',', default_value = "paper.bib")]
    bib_files: Vec<PathBuf>,

    /// Comma-separated list of paper files (.tex or .md)
    #[arg(short, long, alias = "paper_files", value_delimiter = ',', default_value = "paper.tex")]
    paper_files: Vec<PathBuf>,

    /// Output path for the minimal bib file (use '-' for stdout)
    #[arg(short, long, alias = "out_file", default_value = "min.bib")]
    out_file: PathBuf,

    /// Write a JSON report of kept and dropped keys to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — bibliography file not found / unreadable
    BibFile(String),
    /// Exit 11 — paper file not found / unreadable
    PaperFile(String),
    /// Exit 12 — a used entry could not be extracted
    Extraction(String),
    /// Exit 13 — cannot write output or report file
    OutputFile(String),
    /// Exit 14 — usage report could not be serialized
    Report(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::BibFile(_) => 10,
            AppError::PaperFile(_) => 11,
            AppError::Extraction(_) => 12,
            AppError::OutputFile(_) => 13,
            AppError::Report(_) => 14,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::BibFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: pass bibliographies as a comma-separated list, e.g. -b refs.bib,more.bib",
                    msg
                )
            }
            AppError::PaperFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: pass paper files as a comma-separated list, e.g. -p main.tex,notes.md",
                    msg
                )
            }
            AppError::Extraction(msg) => {
                write!(
                    f,
                    "{}\n  hint: no output was written; the bibliography may contain a malformed entry header",
                    msg
                )
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
            AppError::Report(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    // 1. Read every source before doing any work
    let bibliographies =
        read_bibliographies(&cli.bib_files).map_err(|e| AppError::BibFile(e.to_string()))?;
    let manuscripts =
        read_manuscripts(&cli.paper_files).map_err(|e| AppError::PaperFile(e.to_string()))?;

    // 2. Collect keys, detect usage, extract entries
    let outcome = prune(bibliographies.as_slice(), &manuscripts).map_err(map_prune_error)?;

    // 3. Write the pruned bibliography, then the optional report
    write_bibliography(&cli.out_file, &outcome)?;
    if let Some(report_path) = &cli.report {
        write_report(report_path, &outcome)?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Writes the pruned bibliography to a file or, for '-', to stdout.
fn write_bibliography(out_file: &Path, outcome: &PruneOutcome) -> Result<(), AppError> {
    if out_file == Path::new("-") {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        return write!(handle, "{}", outcome.output)
            .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)));
    }

    write_output(out_file, &outcome.output).map_err(map_source_error)?;
    log::info!("wrote {}", out_file.display());
    eprintln!(
        "kept {} of {} entries, wrote {}",
        outcome.kept().count(),
        outcome.keys.len(),
        out_file.display()
    );
    Ok(())
}

fn write_report(path: &Path, outcome: &PruneOutcome) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(&outcome.report())
        .map_err(|e| AppError::Report(format!("failed to serialize usage report: {}", e)))?;
    write_output(path, &json).map_err(map_source_error)
}

fn map_source_error(e: SourceError) -> AppError {
    AppError::OutputFile(e.to_string())
}

/// Maps a PruneError to an AppError. Both variants mean the run cannot
/// produce a complete bibliography.
fn map_prune_error(e: PruneError) -> AppError {
    AppError::Extraction(e.to_string())
}
