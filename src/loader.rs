//! Loading genome text from its source.
//!
//! The realignment pipeline only needs `fetch_text(id) -> text | error`.
//! [`FileSource`] covers local files and [`NcbiSource`] downloads
//! nucleotide accessions from NCBI efetch. [`MemorySource`] serves tests.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Duration;

use log::{debug, info};
use rayon::prelude::*;
use thiserror::Error;

use crate::model::{Entry, EntrySource};

/// NCBI E-utilities efetch endpoint.
pub const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors that can occur while fetching an entry's text.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Empty file")]
    EmptyFile,

    #[error("File is not valid UTF-8 text")]
    NotText,

    #[error("Unknown entry: {0}")]
    NotFound(String),

    #[error("Failed to fetch {id}: {reason}")]
    Fetch { id: String, reason: String },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Something that can supply the raw text of an entry.
pub trait TextSource: Sync {
    fn fetch_text(&self, id: &str) -> LoadResult<String>;

    /// Kind of entry built from this source's ids.
    fn kind(&self) -> EntrySource {
        EntrySource::File
    }
}

/// Reads entries from the local file system; ids are paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSource;

impl TextSource for FileSource {
    fn fetch_text(&self, id: &str) -> LoadResult<String> {
        let file = File::open(id)?;
        // Pipes and process substitution report a length of 0
        let size_hint = file
            .metadata()
            .map(|m| usize::try_from(m.len()).unwrap_or(0))
            .unwrap_or(0);

        let mut reader = BufReader::with_capacity(1024 * 1024, file);
        let mut bytes = Vec::with_capacity(size_hint);
        reader.read_to_end(&mut bytes)?;
        if bytes.is_empty() {
            return Err(LoadError::EmptyFile);
        }
        debug!("read {} bytes from {}", bytes.len(), id);

        String::from_utf8(bytes).map_err(|_| LoadError::NotText)
    }
}

/// Downloads nucleotide records in FASTA format from NCBI; ids are accessions.
#[derive(Debug, Clone)]
pub struct NcbiSource {
    agent: ureq::Agent,
    base_url: String,
}

impl NcbiSource {
    pub fn new() -> Self {
        Self::with_base_url(EFETCH_URL)
    }

    /// Uses another efetch-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(FETCH_TIMEOUT).build();
        Self {
            agent,
            base_url: base_url.into(),
        }
    }
}

impl Default for NcbiSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource for NcbiSource {
    fn fetch_text(&self, id: &str) -> LoadResult<String> {
        let fetch_error = |reason: String| LoadError::Fetch {
            id: id.to_string(),
            reason,
        };

        let response = self
            .agent
            .post(&self.base_url)
            .query("db", "nucleotide")
            .query("id", id)
            .query("rettype", "fasta")
            .query("retmode", "text")
            .call()
            .map_err(|e| fetch_error(e.to_string()))?;

        // into_string() caps bodies at 10 MB, too small for large genomes
        let mut text = String::new();
        response.into_reader().read_to_string(&mut text)?;
        if text.trim().is_empty() {
            return Err(fetch_error("empty response".to_string()));
        }
        debug!("fetched {} bytes for {}", text.len(), id);
        Ok(text)
    }

    fn kind(&self) -> EntrySource {
        EntrySource::Accession
    }
}

/// Splits user input into accession ids on spaces and commas.
///
/// ```
/// use seqrealign::loader::split_accessions;
///
/// assert_eq!(split_accessions("NC_002163.1, NZ_CP022077.1  X"), ["NC_002163.1", "NZ_CP022077.1", "X"]);
/// ```
pub fn split_accessions(input: &str) -> Vec<String> {
    input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Serves entries from memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    texts: HashMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the text for `id`.
    pub fn insert(&mut self, id: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(id.into(), text.into());
    }
}

impl TextSource for MemorySource {
    fn fetch_text(&self, id: &str) -> LoadResult<String> {
        self.texts
            .get(id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(id.to_string()))
    }
}

/// Display name for an entry: the file name for paths, the id otherwise.
pub fn entry_name(id: &str) -> String {
    Path::new(id)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.to_string())
}

/// Loads and validates a single entry.
///
/// Failures are recorded on the entry rather than returned.
pub fn load_entry<S: TextSource + ?Sized>(source: &S, id: &str) -> Entry {
    let kind = source.kind();
    let name = match kind {
        EntrySource::File => entry_name(id),
        EntrySource::Accession => id.to_string(),
    };
    let mut entry = Entry::new(name, kind);
    match source.fetch_text(id) {
        Ok(text) => entry.validate(&text),
        Err(e) => entry.fail(e.to_string()),
    }
    entry
}

/// Loads every id in parallel, keeping input order.
pub fn load_entries<S, I>(source: &S, ids: &[I]) -> Vec<Entry>
where
    S: TextSource + ?Sized,
    I: AsRef<str> + Sync,
{
    let entries: Vec<Entry> = ids
        .par_iter()
        .map(|id| load_entry(source, id.as_ref()))
        .collect();
    let valid = entries.iter().filter(|e| e.is_valid()).count();
    info!("loaded {} entries ({} valid)", entries.len(), valid);
    entries
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    use super::*;
    use crate::model::EntryStatus;

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genome.fasta");
        std::fs::write(&path, ">g\nACGT\n").unwrap();

        let text = FileSource.fetch_text(path.to_str().unwrap()).unwrap();
        assert_eq!(text, ">g\nACGT\n");
    }

    #[test]
    fn test_file_source_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.fasta");
        assert!(matches!(
            FileSource.fetch_text(missing.to_str().unwrap()),
            Err(LoadError::IoError(_))
        ));

        let empty = dir.path().join("empty.fasta");
        std::fs::write(&empty, "").unwrap();
        assert!(matches!(
            FileSource.fetch_text(empty.to_str().unwrap()),
            Err(LoadError::EmptyFile)
        ));

        let binary = dir.path().join("binary.fasta");
        std::fs::write(&binary, [0xff, 0xfe, 0x00, 0x41]).unwrap();
        assert!(matches!(
            FileSource.fetch_text(binary.to_str().unwrap()),
            Err(LoadError::NotText)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_source_reads_fifo() {
        let dir = tempfile::tempdir().unwrap();
        let fifo = dir.path().join("genome.fifo");
        let status = std::process::Command::new("mkfifo").arg(&fifo).status().unwrap();
        assert!(status.success());

        // Opening a FIFO for writing blocks until the reader opens it
        let writer = {
            let fifo = fifo.clone();
            std::thread::spawn(move || std::fs::write(fifo, ">g\nACGT\n").unwrap())
        };
        let text = FileSource.fetch_text(fifo.to_str().unwrap()).unwrap();
        writer.join().unwrap();

        assert_eq!(text, ">g\nACGT\n");
    }

    /// Answers one HTTP request with `status` and `body`; returns the request head.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/efetch.fcgi", listener.local_addr().unwrap());
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8_lossy(&request).into_owned()
        });
        (url, handle)
    }

    #[test]
    fn test_ncbi_source_fetches_fasta() {
        let (url, server) = serve_once("200 OK", ">NC_002163.1 Campylobacter jejuni\nACGTACGT\n\n");
        let source = NcbiSource::with_base_url(url);

        let entry = load_entry(&source, "NC_002163.1");
        let request = server.join().unwrap();

        assert!(request.starts_with("POST /efetch.fcgi?"));
        assert!(request.contains("db=nucleotide"));
        assert!(request.contains("id=NC_002163.1"));
        assert!(request.contains("rettype=fasta"));

        assert_eq!(entry.id, "NC_002163.1");
        assert_eq!(entry.source, EntrySource::Accession);
        assert_eq!(entry.record().unwrap().sequence(), "ACGTACGT");
    }

    #[test]
    fn test_ncbi_source_http_error() {
        let (url, server) = serve_once("400 Bad Request", "Error: invalid id");
        let source = NcbiSource::with_base_url(url);

        let result = source.fetch_text("NOT_AN_ACCESSION");
        server.join().unwrap();

        assert!(matches!(result, Err(LoadError::Fetch { ref id, .. }) if id == "NOT_AN_ACCESSION"));
    }

    #[test]
    fn test_split_accessions() {
        assert_eq!(split_accessions("A,B C"), ["A", "B", "C"]);
        assert_eq!(split_accessions("  A ,  , B\t"), ["A", "B"]);
        assert!(split_accessions(" , ").is_empty());
    }

    #[test]
    fn test_entry_name() {
        assert_eq!(entry_name("data/genomes/chr.fasta"), "chr.fasta");
        assert_eq!(entry_name("NC_002163.1"), "NC_002163.1");
    }

    #[test]
    fn test_load_entries_keeps_order_and_isolates_failures() {
        let mut source = MemorySource::new();
        source.insert("a", ">a\nACGT");
        source.insert("b", "not fasta");
        source.insert("d", ">d\nTTTT");

        let entries = load_entries(&source, &["a", "b", "c", "d"]);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c", "d"]);

        assert!(entries[0].is_valid());
        assert!(!entries[1].is_valid());
        assert_eq!(
            entries[2].status,
            EntryStatus::Invalid("Unknown entry: c".to_string())
        );
        assert!(entries[3].is_valid());
    }
}
