//! Data model for genome realignment.
//!
//! This module contains all data structures for representing:
//! - Parsed genome records and realignment results
//! - Input entries and their processing state
//! - Terminal UI state
//!
//! Entry state is kept as explicit variants rather than flags, so an entry
//! can never be both invalid and realigned.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::alphabet::is_nucleotide;
use crate::batch::{realign_all, Summary};
use crate::export::{collect_exports, collect_inputs, export, ExportFile, ExportTarget};
use crate::fasta::{parse_fasta_str, to_fasta_string};
use crate::loader::{load_entries, load_entry, split_accessions, FileSource, NcbiSource};
use crate::realign::realign;
use crate::start::StartSequence;
use crate::ui::glyphs::Glyphs;

/// A single genome parsed from a FASTA file.
///
/// Records are only built by the parser and the realigner, so the sequence
/// is always uppercase `ACGT` and the description always starts with `>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    description: String,
    sequence: String,
}

impl SequenceRecord {
    pub(crate) fn new(description: impl Into<String>, sequence: impl Into<String>) -> Self {
        let record = Self {
            description: description.into(),
            sequence: sequence.into(),
        };
        debug_assert!(record.description.starts_with('>'));
        debug_assert!(is_nucleotide(&record.sequence));
        debug_assert!(!record.sequence.bytes().any(|b| b.is_ascii_lowercase()));
        record
    }

    /// The header line, including the leading `>`.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The nucleotide sequence, uppercase, without line breaks.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Returns the length of the sequence.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns true if the sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Orientation of a realigned record relative to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strand {
    Forward,
    ReverseComplement,
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "forward"),
            Strand::ReverseComplement => write!(f, "reverse complement"),
        }
    }
}

/// A genome rotated to begin at the start sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realigned {
    pub record: SequenceRecord,
    pub strand: Strand,
}

impl Realigned {
    /// True if the output was reverse-complemented before rotation.
    pub fn is_reversed(&self) -> bool {
        self.strand == Strand::ReverseComplement
    }
}

/// Loading and validation state of an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryStatus {
    /// Text not loaded yet
    Pending,
    /// Parsed successfully
    Valid(SequenceRecord),
    /// Could not be loaded or parsed; holds the reason
    Invalid(String),
}

/// Outcome of the last realignment run for an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RealignmentStatus {
    /// No run yet, or the entry is not valid
    #[default]
    NotAttempted,
    /// Start sequence found on one of the strands
    Matched(Realigned),
    /// Start sequence absent from both strands
    NotFound,
}

/// Where an entry's text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntrySource {
    /// A local file; the id is its file name
    #[default]
    File,
    /// An NCBI nucleotide accession; the id is the accession
    Accession,
}

/// One input genome and everything known about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// File name or accession the genome was loaded from
    pub id: String,
    pub source: EntrySource,
    pub status: EntryStatus,
    pub realignment: RealignmentStatus,
}

impl Entry {
    /// Creates an entry whose text has not been loaded yet.
    pub fn new(id: impl Into<String>, source: EntrySource) -> Self {
        Self {
            id: id.into(),
            source,
            status: EntryStatus::Pending,
            realignment: RealignmentStatus::NotAttempted,
        }
    }

    /// Creates a file entry whose text has not been loaded yet.
    pub fn pending(id: impl Into<String>) -> Self {
        Self::new(id, EntrySource::File)
    }

    /// Creates an entry and validates its text right away.
    pub fn from_text(id: impl Into<String>, text: &str) -> Self {
        let mut entry = Self::pending(id);
        entry.validate(text);
        entry
    }

    /// Parses `text` and records the result.
    ///
    /// Any previous realignment is discarded.
    pub fn validate(&mut self, text: &str) {
        self.realignment = RealignmentStatus::NotAttempted;
        self.status = match parse_fasta_str(text) {
            Ok(record) => {
                debug!("{}: {} bp", self.id, record.len());
                EntryStatus::Valid(record)
            }
            Err(e) => {
                warn!("{}: {}", self.id, e);
                EntryStatus::Invalid(e.to_string())
            }
        };
    }

    /// Marks the entry invalid because its text could not be obtained.
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!("{}: {}", self.id, reason);
        self.status = EntryStatus::Invalid(reason);
        self.realignment = RealignmentStatus::NotAttempted;
    }

    /// Returns the parsed record if the entry is valid.
    pub fn record(&self) -> Option<&SequenceRecord> {
        match &self.status {
            EntryStatus::Valid(record) => Some(record),
            _ => None,
        }
    }

    /// Returns true if the entry parsed successfully.
    pub fn is_valid(&self) -> bool {
        matches!(self.status, EntryStatus::Valid(_))
    }

    /// Returns the realigned genome, if the last run matched.
    pub fn realigned(&self) -> Option<&Realigned> {
        match &self.realignment {
            RealignmentStatus::Matched(realigned) => Some(realigned),
            _ => None,
        }
    }

    /// Realigns the entry against `start`.
    ///
    /// Entries that are not valid stay `NotAttempted`.
    pub fn realign(&mut self, start: &str) {
        self.realignment = match self.record() {
            Some(record) => match realign(record, start) {
                Some(realigned) => {
                    debug!("{}: start found on {} strand", self.id, realigned.strand);
                    RealignmentStatus::Matched(realigned)
                }
                None => {
                    debug!("{}: start sequence not found", self.id);
                    RealignmentStatus::NotFound
                }
            },
            None => RealignmentStatus::NotAttempted,
        };
    }

    /// File name for the realigned output, if the last run matched.
    pub fn result_file_name(&self) -> Option<String> {
        self.realigned()
            .map(|realigned| result_file_name(&self.id, self.source, realigned.is_reversed()))
    }

    /// File name for the re-serialized input, if the entry is valid.
    ///
    /// Accessions are saved as `<id>.fasta`. Files get `.normalized`
    /// before their extension so the input is never overwritten.
    pub fn input_file_name(&self) -> Option<String> {
        self.record()?;
        Some(match self.source {
            EntrySource::Accession => format!("{}.fasta", self.id),
            EntrySource::File => insert_tag(source_file_name(&self.id), "normalized"),
        })
    }

    /// The parsed input as FASTA text, if the entry is valid.
    pub fn input_text(&self) -> Option<String> {
        self.record().map(to_fasta_string)
    }

    /// Realigned genome as FASTA text, if the last run matched.
    pub fn result_text(&self) -> Option<String> {
        self.realigned()
            .map(|realigned| to_fasta_string(&realigned.record))
    }
}

/// Splits a file name into stem and extension (with its dot).
///
/// A leading dot does not start an extension, so `.hidden` has none.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// File name part of a path-like id.
fn source_file_name(id: &str) -> &str {
    Path::new(id)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(id)
}

/// Inserts `.tag` before the extension of `name`.
fn insert_tag(name: &str, tag: &str) -> String {
    let (stem, ext) = split_extension(name);
    format!("{}.{}{}", stem, tag, ext)
}

/// Builds the output file name for an entry.
///
/// Accessions are named `<id>.fasta` first; file names keep their own
/// extension, if any. Reversed outputs are then tagged `.reverseComp`, and
/// every output is tagged `.realigned`, both inserted before the extension.
///
/// ```
/// use seqrealign::model::{result_file_name, EntrySource};
///
/// assert_eq!(result_file_name("chr.fasta", EntrySource::File, false), "chr.realigned.fasta");
/// assert_eq!(
///     result_file_name("NC_002163.1", EntrySource::Accession, true),
///     "NC_002163.1.reverseComp.realigned.fasta"
/// );
/// ```
pub fn result_file_name(id: &str, source: EntrySource, is_reversed: bool) -> String {
    let mut name = match source {
        EntrySource::Accession => format!("{}.fasta", id),
        EntrySource::File => source_file_name(id).to_string(),
    };
    if is_reversed {
        name = insert_tag(&name, "reverseComp");
    }
    insert_tag(&name, "realigned")
}

/// The visible slice of the entry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Index of the first visible entry
    pub first_row: usize,
    /// Number of visible rows
    pub visible_rows: usize,
}

/// Application mode for handling different input states.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppMode {
    /// Normal navigation mode
    #[default]
    Normal,
    /// Command input mode (after pressing ':')
    Command(String),
}

/// Settings that come from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Start sequences shorter than this are refused
    pub min_start_length: usize,
    /// Directory used by `w` / `:w` when none is given
    pub output_dir: PathBuf,
    pub glyphs: Glyphs,
    /// Where `:fetch` downloads accessions from
    pub ncbi: NcbiSource,
}

/// The complete terminal UI state.
#[derive(Debug)]
pub struct AppState {
    pub entries: Vec<Entry>,
    pub start: Option<StartSequence>,
    pub settings: Settings,
    /// Index of the selected entry
    pub cursor: usize,
    pub viewport: Viewport,
    pub mode: AppMode,
    pub show_help: bool,
    pub should_quit: bool,
    /// Status message to display
    pub status_message: Option<String>,
    /// Counts from the last realignment run
    pub summary: Option<Summary>,
}

impl AppState {
    /// Creates the state for a set of loaded entries.
    pub fn new(entries: Vec<Entry>, start: Option<StartSequence>, settings: Settings) -> Self {
        let status_message = if start.is_none() {
            Some("No start sequence. Use :start <SEQ> or :startfile <PATH>".to_string())
        } else {
            None
        };
        Self {
            entries,
            start,
            settings,
            cursor: 0,
            viewport: Viewport::default(),
            mode: AppMode::Normal,
            show_help: false,
            should_quit: false,
            status_message,
            summary: None,
        }
    }

    /// Returns the selected entry.
    pub fn selected(&self) -> Option<&Entry> {
        self.entries.get(self.cursor)
    }

    /// Updates the number of rows the entry list can show.
    pub fn update_viewport_size(&mut self, rows: usize) {
        self.viewport.visible_rows = rows;
        self.ensure_cursor_visible();
    }

    /// Moves the selection up by one entry.
    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.ensure_cursor_visible();
        }
    }

    /// Moves the selection down by one entry.
    pub fn move_down(&mut self) {
        if self.cursor + 1 < self.entries.len() {
            self.cursor += 1;
            self.ensure_cursor_visible();
        }
    }

    /// Selects the first entry.
    pub fn goto_first(&mut self) {
        self.cursor = 0;
        self.ensure_cursor_visible();
    }

    /// Selects the last entry.
    pub fn goto_last(&mut self) {
        self.cursor = self.entries.len().saturating_sub(1);
        self.ensure_cursor_visible();
    }

    /// Scrolls so the selected entry is on screen.
    fn ensure_cursor_visible(&mut self) {
        if self.cursor < self.viewport.first_row {
            self.viewport.first_row = self.cursor;
        } else if self.viewport.visible_rows > 0
            && self.cursor >= self.viewport.first_row + self.viewport.visible_rows
        {
            self.viewport.first_row = self.cursor + 1 - self.viewport.visible_rows;
        }
    }

    /// Realigns every entry against the current start sequence.
    pub fn run_realignment(&mut self) {
        let Some(start) = &self.start else {
            self.status_message = Some("Set a start sequence first (:start <SEQ>)".to_string());
            return;
        };
        if self.entries.is_empty() {
            self.status_message = Some("No entries. Use :add <PATH>".to_string());
            return;
        }

        let summary = realign_all(&mut self.entries, start);
        self.status_message = Some(summary.to_string());
        self.summary = Some(summary);
    }

    /// Writes every matched entry to `target`.
    pub fn write_results(&mut self, target: ExportTarget) {
        let files = collect_exports(&self.entries);
        self.write_files(&files, &target, "no realigned entries");
    }

    /// Writes every valid input, re-serialized, to `target`.
    pub fn write_inputs(&mut self, target: ExportTarget) {
        let files = collect_inputs(&self.entries);
        self.write_files(&files, &target, "no valid entries");
    }

    fn write_files(&mut self, files: &[ExportFile], target: &ExportTarget, empty_reason: &str) {
        if files.is_empty() {
            self.status_message = Some(format!("Nothing to write: {}", empty_reason));
            return;
        }
        self.status_message = Some(match export(files, target) {
            Ok(written) => format!("Wrote {} file(s) to {}", files.len(), written.display()),
            Err(e) => format!("Write failed: {}", e),
        });
    }

    /// Writes results to the configured output directory.
    pub fn write_to_output_dir(&mut self) {
        let target = ExportTarget::Directory(self.settings.output_dir.clone());
        self.write_results(target);
    }

    /// Loads a genome file and appends it to the entry list.
    pub fn add_entry(&mut self, path: &Path) {
        let entry = load_entry(&FileSource, &path.to_string_lossy());
        self.status_message = Some(match &entry.status {
            EntryStatus::Valid(record) => format!("Added {} ({} bp)", entry.id, record.len()),
            EntryStatus::Invalid(reason) => format!("Added {} (invalid: {})", entry.id, reason),
            EntryStatus::Pending => format!("Added {}", entry.id),
        });
        self.summary = None;
        self.entries.push(entry);
        self.cursor = self.entries.len() - 1;
        self.ensure_cursor_visible();
    }

    /// Downloads accessions (separated by spaces or commas) and appends them.
    ///
    /// A failed download marks only that entry invalid.
    pub fn fetch_accessions(&mut self, input: &str) {
        let ids = split_accessions(input);
        if ids.is_empty() {
            self.status_message = Some("Usage: :fetch <ACCESSION>[,<ACCESSION>...]".to_string());
            return;
        }
        let fetched = load_entries(&self.settings.ncbi, &ids);
        let valid = fetched.iter().filter(|e| e.is_valid()).count();
        self.status_message = Some(format!(
            "Fetched {} accession(s), {} valid",
            fetched.len(),
            valid
        ));
        self.summary = None;
        self.entries.extend(fetched);
        self.cursor = self.entries.len() - 1;
        self.ensure_cursor_visible();
    }

    /// Replaces the start sequence, keeping the old one on error.
    fn set_start(&mut self, start: Result<StartSequence, crate::start::StartError>) {
        match start {
            Ok(start) => {
                info!("start sequence set from {} ({} bp)", start.id(), start.len());
                self.status_message = Some(format!("Start sequence: {} bp", start.len()));
                self.start = Some(start);
                for entry in &mut self.entries {
                    entry.realignment = RealignmentStatus::NotAttempted;
                }
                self.summary = None;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Toggles the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Enters command mode.
    pub fn enter_command_mode(&mut self) {
        self.mode = AppMode::Command(String::new());
    }

    /// Handles a character input in command mode.
    pub fn command_input(&mut self, c: char) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.push(c);
        }
    }

    /// Handles backspace in command mode.
    pub fn command_backspace(&mut self) {
        if let AppMode::Command(ref mut cmd) = self.mode {
            cmd.pop();
            if cmd.is_empty() {
                self.mode = AppMode::Normal;
            }
        }
    }

    /// Executes the current command.
    pub fn execute_command(&mut self) {
        let AppMode::Command(cmd) = std::mem::take(&mut self.mode) else {
            return;
        };
        let cmd = cmd.trim();
        let (name, arg) = match cmd.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (cmd, ""),
        };

        match (name, arg) {
            ("q" | "quit", _) => self.should_quit = true,
            ("h" | "help", _) => self.show_help = true,
            ("r" | "run", _) => self.run_realignment(),
            ("w" | "write", "") => self.write_to_output_dir(),
            ("w" | "write", dir) => self.write_results(ExportTarget::Directory(dir.into())),
            ("zip", "") => self.status_message = Some("Usage: :zip <PATH>".to_string()),
            ("zip", path) => self.write_results(ExportTarget::Zip(path.into())),
            ("start", "") => self.status_message = Some("Usage: :start <SEQ>".to_string()),
            ("start", seq) => {
                let start = StartSequence::from_text(seq, self.settings.min_start_length);
                self.set_start(start);
            }
            ("startfile", "") => self.status_message = Some("Usage: :startfile <PATH>".to_string()),
            ("startfile", path) => {
                let start = StartSequence::from_file(path, self.settings.min_start_length);
                self.set_start(start);
            }
            ("add", "") => self.status_message = Some("Usage: :add <PATH>".to_string()),
            ("add", path) => self.add_entry(Path::new(path)),
            ("fetch", list) => self.fetch_accessions(list),
            ("wi", "") => {
                let target = ExportTarget::Directory(self.settings.output_dir.clone());
                self.write_inputs(target);
            }
            ("wi", dir) => self.write_inputs(ExportTarget::Directory(dir.into())),
            _ => self.status_message = Some(format!("Unknown command: {}", cmd)),
        }
    }

    /// Cancels command mode and returns to normal mode.
    pub fn cancel_command(&mut self) {
        self.mode = AppMode::Normal;
    }
}
