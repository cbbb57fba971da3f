//! FASTA and CSV output for matched records.

use std::io::{self, Write};

use crate::{
    matches::{joined_labels, Match},
    reader::HEADER_MARKER,
    Result,
};

/// Column names of both CSV reports.
pub const REPORT_HEADER: [&str; 9] = [
    "Fasta ID",
    "Seq Name",
    "Match Start",
    "Full sequence",
    "Length",
    "Sequence",
    "rootseq",
    "nucseq",
    "taxonomy",
];

/// Writes FASTA records, optionally tagged with their poly labels.
pub struct FastaWriter<W: Write> {
    wtr: io::BufWriter<W>,
    records: usize,
}

impl<W: Write> FastaWriter<W> {
    pub fn new(wtr: W) -> FastaWriter<W> {
        FastaWriter {
            wtr: io::BufWriter::new(wtr),
            records: 0,
        }
    }

    /// `>header [poly=label_label]` followed by `sequence`.
    pub fn write_tagged(&mut self, header: &str, matches: &[Match], sequence: &str) -> Result<()> {
        writeln!(
            self.wtr,
            "{}{} [poly={}]",
            HEADER_MARKER,
            header,
            joined_labels(matches)
        )?;
        writeln!(self.wtr, "{}", sequence)?;
        self.records += 1;
        Ok(())
    }

    /// A record written back unchanged.
    pub fn write_plain(&mut self, header: &str, sequence: &str) -> Result<()> {
        writeln!(self.wtr, "{}{}", HEADER_MARKER, header)?;
        writeln!(self.wtr, "{}", sequence)?;
        self.records += 1;
        Ok(())
    }

    pub fn records(&self) -> usize {
        self.records
    }

    /// Flush and hand back the inner writer.
    pub fn into_inner(self) -> Result<W> {
        self.wtr.into_inner().map_err(|e| e.into_error().into())
    }
}

/// One row per match, in the column order of [`REPORT_HEADER`].
pub struct ReportWriter<W: Write> {
    wtr: csv::Writer<W>,
    taxonomy: String,
    rows: usize,
}

impl<W: Write> ReportWriter<W> {
    /// Start a report; the header row is written straight away.
    pub fn new(wtr: W, taxonomy: &str) -> Result<ReportWriter<W>> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(wtr);
        wtr.write_record(REPORT_HEADER)?;
        Ok(ReportWriter {
            wtr,
            taxonomy: taxonomy.to_string(),
            rows: 0,
        })
    }

    pub fn write_match(&mut self, m: &Match) -> Result<()> {
        let fasta_id = format!("{}{} [{}]", HEADER_MARKER, m.source_header(), m.break_label());
        let start = (m.start() + 1).to_string();
        let length = m.len().to_string();
        self.wtr.write_record([
            fasta_id.as_str(),
            m.display_name(),
            start.as_str(),
            m.tract_sequence(),
            length.as_str(),
            m.break_label(),
            m.protein_sequence(),
            m.nucleotide_sequence(),
            self.taxonomy.as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_matches(&mut self, matches: &[Match]) -> Result<()> {
        matches.iter().try_for_each(|m| self.write_match(m))
    }

    /// Rows written, not counting the header.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> Result<W> {
        self.wtr.into_inner().map_err(|e| e.into_error().into())
    }
}
