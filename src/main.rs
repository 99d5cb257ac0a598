//! seqrealign - circular genome realignment
//!
//! Rotates circular genomes so that each one begins with the same start
//! sequence, taking the reverse complement when the start is only found
//! on the other strand.
//!
//! ## Usage
//!
//! ```bash
//! seqrealign -s ACGT... genome1.fasta genome2.fasta        # terminal UI
//! seqrealign -S dnaA.fasta -o out/ genomes/*.fasta         # one file per genome
//! seqrealign -S dnaA.fasta -z results.zip genomes/*.fasta  # ZIP archive
//! seqrealign -s ACGT... -o - genome.fasta                  # stdout
//! seqrealign -s ACGT... -o out/ -a NC_002163.1,NZ_CP022077.1  # NCBI accessions
//! ```
//!
//! ## Navigation (Vim-style)
//!
//! - `j/k`: Next/previous genome
//! - `r`: Realign, `w`: write results
//! - `:q`: Quit
//! - `:h`: Help

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::fs::File;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::{Builder, Env, Target};
use log::{info, warn};

use seqrealign::batch::realign_all;
use seqrealign::controller::run_app;
use seqrealign::export::{collect_exports, export, ExportTarget};
use seqrealign::loader::{load_entries, split_accessions, FileSource, NcbiSource};
use seqrealign::model::{AppState, Entry, RealignmentStatus, Settings};
use seqrealign::start::{StartSequence, DEFAULT_MIN_START_LENGTH};
use seqrealign::ui::glyphs;

/// seqrealign - rotate circular genomes to a common start sequence
///
/// When run without -o/--output or -z/--zip, opens an interactive terminal UI.
/// With -o/--output, runs in CLI mode and writes one FASTA file per realigned
/// genome into the directory (or all of them to stdout with "-").
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Genome files to realign (single-record FASTA)
    files: Vec<PathBuf>,

    /// NCBI nucleotide accessions to download, separated by spaces or commas
    #[arg(short = 'a', long = "accession")]
    accessions: Vec<String>,

    /// Start sequence (whitespace is ignored, case-insensitive)
    #[arg(short = 's', long = "start", conflicts_with = "start_file")]
    start: Option<String>,

    /// File holding the start sequence (FASTA or bare sequence)
    #[arg(short = 'S', long = "start-file")]
    start_file: Option<PathBuf>,

    /// Refuse start sequences shorter than this (0 disables the check)
    #[arg(long = "min-start-length", default_value_t = DEFAULT_MIN_START_LENGTH)]
    min_start_length: usize,

    /// Output directory (enables CLI mode). Use "-" for stdout.
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Write all results into this ZIP archive (enables CLI mode)
    #[arg(short = 'z', long = "zip", conflicts_with = "output")]
    zip: Option<PathBuf>,

    /// Write a single result as a plain file and several as files.zip
    #[arg(long = "auto-package", requires = "output")]
    auto_package: bool,

    /// Number of worker threads (default: one per core)
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Use Unicode symbols in the terminal UI
    #[arg(long = "fancy")]
    fancy: bool,
}

impl Args {
    /// Where CLI mode writes, or `None` for the terminal UI.
    fn export_target(&self) -> Result<Option<ExportTarget>> {
        if let Some(zip) = &self.zip {
            return Ok(Some(ExportTarget::Zip(zip.clone())));
        }
        let Some(output) = self.output.as_deref() else {
            return Ok(None);
        };
        Ok(Some(match output {
            "-" if self.auto_package => bail!("--auto-package needs an output directory, not stdout"),
            "-" => ExportTarget::Stdout,
            dir if self.auto_package => ExportTarget::Auto(PathBuf::from(dir)),
            dir => ExportTarget::Directory(PathBuf::from(dir)),
        }))
    }

    /// Accession ids from every `-a` value.
    fn accession_ids(&self) -> Vec<String> {
        self.accessions
            .iter()
            .flat_map(|list| split_accessions(list))
            .collect()
    }

    /// Loads files, then downloads accessions, keeping command-line order within each.
    fn load_inputs(&self) -> Vec<Entry> {
        let paths: Vec<String> = self
            .files
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        let mut entries = load_entries(&FileSource, &paths);

        let accessions = self.accession_ids();
        if !accessions.is_empty() {
            info!("fetching {} accession(s) from NCBI", accessions.len());
            entries.extend(load_entries(&NcbiSource::new(), &accessions));
        }
        entries
    }

    /// Reads the start sequence given on the command line, if any.
    fn start_sequence(&self) -> Result<Option<StartSequence>> {
        let start = if let Some(text) = &self.start {
            StartSequence::from_text(text, self.min_start_length)
                .context("Invalid start sequence")?
        } else if let Some(path) = &self.start_file {
            StartSequence::from_file(path, self.min_start_length)
                .with_context(|| format!("Invalid start sequence in {}", path.display()))?
        } else {
            return Ok(None);
        };
        info!("start sequence from {}: {} bp", start.id(), start.len());
        Ok(Some(start))
    }
}

/// Logs to stderr in CLI mode, and to a temporary file under the terminal UI.
fn init_logging(tui: bool) -> Result<Option<PathBuf>> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    builder.format_timestamp_secs();

    let log_path = if tui {
        let path =
            std::env::temp_dir().join(format!("seqrealign-{:08x}.log", rand::random::<u32>()));
        let file = File::create(&path)
            .with_context(|| format!("Cannot create log file {}", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
        Some(path)
    } else {
        builder.target(Target::Stderr);
        None
    };

    builder.init();
    Ok(log_path)
}

/// Runs CLI mode: realign and write every genome.
fn run_cli_mode(
    mut entries: Vec<Entry>,
    start: &StartSequence,
    target: &ExportTarget,
) -> Result<()> {
    let summary = realign_all(&mut entries, start);

    if !summary.all_matched() {
        for entry in &entries {
            if entry.realignment == RealignmentStatus::NotFound {
                warn!("{}: start sequence not found on either strand", entry.id);
            }
        }
    }

    let exports = collect_exports(&entries);
    if exports.is_empty() {
        eprintln!("Nothing to write: {}", summary);
        return Ok(());
    }

    let written = export(&exports, target).context("Failed to write results")?;
    if *target != ExportTarget::Stdout {
        eprintln!("Wrote {} file(s) to {}", exports.len(), written.display());
    }
    eprintln!("{}", summary);

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let target = args.export_target()?;

    let log_path = init_logging(target.is_none())?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    let start = args.start_sequence()?;

    match target {
        // CLI mode: output to directory/stdout/archive
        Some(target) => {
            if args.files.is_empty() && args.accession_ids().is_empty() {
                bail!("No genome files or accessions given");
            }
            let Some(start) = start else {
                bail!("A start sequence is required (-s/--start or -S/--start-file)");
            };
            run_cli_mode(args.load_inputs(), &start, &target)?;
        }
        None => {
            let settings = Settings {
                min_start_length: args.min_start_length,
                output_dir: PathBuf::from("."),
                glyphs: glyphs::select(args.fancy),
                ncbi: NcbiSource::new(),
            };
            let entries = args.load_inputs();
            run_app(AppState::new(entries, start, settings))?;
            if let Some(path) = log_path {
                eprintln!("Log written to {}", path.display());
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("seqrealign").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_export_targets() {
        assert_eq!(parse(&["g.fa"]).export_target().unwrap(), None);
        assert_eq!(
            parse(&["-o", "-", "g.fa"]).export_target().unwrap(),
            Some(ExportTarget::Stdout)
        );
        assert_eq!(
            parse(&["-o", "out", "g.fa"]).export_target().unwrap(),
            Some(ExportTarget::Directory(PathBuf::from("out")))
        );
        assert_eq!(
            parse(&["-o", "out", "--auto-package", "g.fa"]).export_target().unwrap(),
            Some(ExportTarget::Auto(PathBuf::from("out")))
        );
        assert_eq!(
            parse(&["-z", "r.zip", "g.fa"]).export_target().unwrap(),
            Some(ExportTarget::Zip(PathBuf::from("r.zip")))
        );
    }

    #[test]
    fn test_auto_package_rejects_stdout() {
        let err = parse(&["-o", "-", "--auto-package", "g.fa"]).export_target().unwrap_err();
        assert!(err.to_string().contains("--auto-package"));
    }

    #[test]
    fn test_auto_package_requires_output() {
        assert!(Args::try_parse_from(["seqrealign", "--auto-package", "g.fa"]).is_err());
    }

    #[test]
    fn test_accession_lists() {
        let args = parse(&["-a", "NC_002163.1,NZ_CP022077.1", "-a", "X Y", "g.fa"]);
        assert_eq!(args.accession_ids(), ["NC_002163.1", "NZ_CP022077.1", "X", "Y"]);
        assert_eq!(args.files, [PathBuf::from("g.fa")]);
    }
}
