//! # seqrealign - Circular Genome Realignment
//!
//! Rotates circular genomes stored as single-record FASTA files so that each
//! one begins with a chosen start sequence. When the start sequence only
//! occurs on the opposite strand, the genome is reverse-complemented first.
//!
//! ## Architecture
//!
//! - `alphabet` / `complement`: nucleotide checks and reverse complement
//! - `fasta`: single-record FASTA parsing, validation and serialization
//! - `realign`: the rotation engine
//! - `start`: start sequence preparation from typed text or files
//! - `loader` / `batch` / `export`: loading, parallel realignment, writing
//! - `model`: entries and terminal UI state
//! - `event`, `ui`, `controller`: the Vim-style terminal UI
//!
//! ## Example
//!
//! ```
//! use seqrealign::fasta::{parse_fasta_str, to_fasta_string};
//! use seqrealign::realign::realign;
//!
//! let record = parse_fasta_str(">file 2\nAAAAAAAAACCGTAAAA").unwrap();
//! let realigned = realign(&record, "ACG").unwrap();
//! assert!(realigned.is_reversed());
//! assert_eq!(to_fasta_string(&realigned.record), ">file 2\nACGGTTTTTTTTTTTTT");
//! ```

pub mod alphabet;
pub mod batch;
pub mod complement;
pub mod controller;
pub mod event;
pub mod export;
pub mod fasta;
pub mod loader;
pub mod model;
pub mod realign;
pub mod start;
pub mod ui;
