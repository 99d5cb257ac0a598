//! Writing realigned genomes.
//!
//! Each matched entry becomes one FASTA file. Files can go to a directory,
//! to stdout, or into a ZIP archive.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::model::Entry;

/// Archive name used when several results are packaged automatically.
pub const ARCHIVE_NAME: &str = "files.zip";

/// Errors that can occur while writing results.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write output: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to write archive: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// A serialized result ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub text: String,
}

/// Where results are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// One file per result in this directory
    Directory(PathBuf),
    /// All results to stdout, one after the other
    Stdout,
    /// All results in a ZIP archive at this path
    Zip(PathBuf),
    /// A single result as a plain file, several as `files.zip`, in this directory
    Auto(PathBuf),
}

/// Collects the output of every matched entry, in entry order.
///
/// Clashing file names get a numeric suffix so no result is overwritten.
pub fn collect_exports(entries: &[Entry]) -> Vec<ExportFile> {
    collect_with(entries, |entry| {
        Some((entry.result_file_name()?, entry.result_text()?))
    })
}

/// Collects every valid input, re-serialized, in entry order.
pub fn collect_inputs(entries: &[Entry]) -> Vec<ExportFile> {
    collect_with(entries, |entry| {
        Some((entry.input_file_name()?, entry.input_text()?))
    })
}

fn collect_with<F>(entries: &[Entry], file_of: F) -> Vec<ExportFile>
where
    F: Fn(&Entry) -> Option<(String, String)>,
{
    let mut seen = HashSet::new();
    entries
        .iter()
        .filter_map(|entry| {
            let (filename, text) = file_of(entry)?;
            Some(ExportFile {
                filename: unique_name(&mut seen, filename),
                text,
            })
        })
        .collect()
}

fn unique_name(seen: &mut HashSet<String>, filename: String) -> String {
    if seen.insert(filename.clone()) {
        return filename;
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(idx) if idx > 0 => filename.split_at(idx),
        _ => (filename.as_str(), ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}{}", stem, n, ext);
        if seen.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Writes `files` to `target` and returns the path that was written.
///
/// For [`ExportTarget::Stdout`] the returned path is `-`.
pub fn export(files: &[ExportFile], target: &ExportTarget) -> ExportResult<PathBuf> {
    match target {
        ExportTarget::Directory(dir) => {
            write_directory(files, dir)?;
            Ok(dir.clone())
        }
        ExportTarget::Stdout => {
            let stdout = io::stdout();
            write_concatenated(files, &mut stdout.lock())?;
            Ok(PathBuf::from("-"))
        }
        ExportTarget::Zip(path) => {
            write_zip(files, path)?;
            Ok(path.clone())
        }
        ExportTarget::Auto(dir) => match files {
            [single] => {
                write_directory(files, dir)?;
                Ok(dir.join(&single.filename))
            }
            _ => {
                fs::create_dir_all(dir)?;
                let path = dir.join(ARCHIVE_NAME);
                write_zip(files, &path)?;
                Ok(path)
            }
        },
    }
}

/// Writes one file per result into `dir`, creating it if needed.
pub fn write_directory(files: &[ExportFile], dir: &Path) -> ExportResult<()> {
    fs::create_dir_all(dir)?;
    for file in files {
        let path = dir.join(&file.filename);
        fs::write(&path, &file.text)?;
        info!("wrote {}", path.display());
    }
    Ok(())
}

/// Writes results one after the other, each ending with a newline.
pub fn write_concatenated<W: Write>(files: &[ExportFile], writer: &mut W) -> ExportResult<()> {
    for file in files {
        writer.write_all(file.text.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Packages results into a ZIP archive at `path`.
pub fn write_zip(files: &[ExportFile], path: &Path) -> ExportResult<()> {
    let file = File::create(path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        zip.start_file(file.filename.as_str(), options)?;
        zip.write_all(file.text.as_bytes())?;
    }

    zip.finish()?.flush()?;
    info!("wrote {} file(s) to {}", files.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use zip::ZipArchive;

    use super::*;

    fn realigned_entries() -> Vec<Entry> {
        let mut entries = vec![
            Entry::from_text("one.fasta", ">one\nAAAAAAAAACCGTAAAA"),
            Entry::from_text("two.fasta", ">two\nTTTTCGTTTT"),
            Entry::from_text("none.fasta", ">none\nAAAA"),
        ];
        for entry in &mut entries {
            entry.realign("CGT");
        }
        entries
    }

    fn sample_files() -> Vec<ExportFile> {
        vec![
            ExportFile {
                filename: "a.realigned.fasta".to_string(),
                text: ">a\nACGT".to_string(),
            },
            ExportFile {
                filename: "b.realigned.fasta".to_string(),
                text: ">b\nTTTT".to_string(),
            },
        ]
    }

    #[test]
    fn test_collect_exports_skips_unmatched() {
        let files = collect_exports(&realigned_entries());
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].filename, "one.realigned.fasta");
        assert_eq!(files[0].text, ">one\nCGTAAAAAAAAAAAAAC");
        assert_eq!(files[1].filename, "two.realigned.fasta");
    }

    #[test]
    fn test_collect_exports_unique_names() {
        let mut entries = vec![
            Entry::from_text("x/chr.fasta", ">1\nCGTA"),
            Entry::from_text("y/chr.fasta", ">2\nCGTC"),
            Entry::from_text("z/chr.fasta", ">3\nCGTG"),
        ];
        for entry in &mut entries {
            entry.realign("CGT");
        }
        let names: Vec<String> = collect_exports(&entries)
            .into_iter()
            .map(|f| f.filename)
            .collect();
        assert_eq!(
            names,
            ["chr.realigned.fasta", "chr.realigned-2.fasta", "chr.realigned-3.fasta"]
        );
    }

    #[test]
    fn test_collect_inputs() {
        let mut entries = realigned_entries();
        entries.push(Entry::from_text("bad.fasta", "nope"));
        let files = collect_inputs(&entries);

        let names: Vec<&str> = files.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(
            names,
            ["one.normalized.fasta", "two.normalized.fasta", "none.normalized.fasta"]
        );
        assert_eq!(files[0].text, ">one\nAAAAAAAAACCGTAAAA");
    }

    #[test]
    fn test_write_directory() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("out");
        let written = export(&sample_files(), &ExportTarget::Directory(out.clone())).unwrap();

        assert_eq!(written, out);
        assert_eq!(fs::read_to_string(out.join("a.realigned.fasta")).unwrap(), ">a\nACGT");
        assert_eq!(fs::read_to_string(out.join("b.realigned.fasta")).unwrap(), ">b\nTTTT");
    }

    #[test]
    fn test_write_concatenated() {
        let mut buffer = Vec::new();
        write_concatenated(&sample_files(), &mut buffer).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), ">a\nACGT\n>b\nTTTT\n");
    }

    #[test]
    fn test_write_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.zip");
        export(&sample_files(), &ExportTarget::Zip(path.clone())).unwrap();

        let mut archive = ZipArchive::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);

        let mut content = String::new();
        archive
            .by_name("b.realigned.fasta")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, ">b\nTTTT");
    }

    #[test]
    fn test_auto_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = sample_files();
        let written = export(&files[..1], &ExportTarget::Auto(dir.path().to_path_buf())).unwrap();

        assert_eq!(written, dir.path().join("a.realigned.fasta"));
        assert!(!dir.path().join(ARCHIVE_NAME).exists());
    }

    #[test]
    fn test_auto_archive() {
        let dir = tempfile::tempdir().unwrap();
        let written = export(&sample_files(), &ExportTarget::Auto(dir.path().to_path_buf())).unwrap();

        assert_eq!(written, dir.path().join(ARCHIVE_NAME));
        let archive = ZipArchive::new(File::open(&written).unwrap()).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(!dir.path().join("a.realigned.fasta").exists());
    }
}
