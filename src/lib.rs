//! Find homopolymeric amino-acid tracts ("polys", e.g. polyglutamine runs)
//! in translated proteins and report them per isoform and per gene.
//!
//! Proteins are read in lock-step with the coding sequences they were
//! translated from. Every tract is labelled with its length, its single
//! permitted interruption and its coordinates, then written to FASTA and
//! CSV outputs. The gene-level report keeps only the isoform with the
//! longest coding sequence.
//!
//! ```
//! use polytract::TractPattern;
//!
//! let pattern = TractPattern::new('Q', 5, true).unwrap();
//! let tracts = pattern.scan("MQQQQQHQQQQQQK");
//! assert_eq!(tracts[0].label, "Q5HQ6_1to13");
//! ```

mod error;
mod record;

pub mod batch;
pub mod header;
pub mod isoform;
pub mod matches;
pub mod reader;
pub mod scanner;
pub mod taxonomy;
pub mod writer;

pub use batch::{Batch, BatchConfig, BatchSummary, FileSummary};
pub use error::{Error, ErrorKind, Result};
pub use isoform::{GeneRecord, IsoformConsolidator};
pub use matches::Match;
pub use reader::{PairedRecords, Reader};
pub use record::{Record, RecordPair};
pub use scanner::{Break, Tract, TractPattern};
