use std::{
    fs::File,
    io::{self, BufRead},
    path::{Path, PathBuf},
};

use crate::{Error, ErrorKind, Record, RecordPair, Result};

/// The marker opening a FASTA header line.
pub const HEADER_MARKER: char = '>';

/// Streams FASTA records out of any `io::Read`.
pub struct Reader<R> {
    rdr: io::BufReader<R>,
    line: u64,
    // header of the record currently being accumulated
    header: Option<String>,
    buf: String,
}

impl Reader<File> {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
        let file = File::open(path.as_ref()).map_err(|e| Error::unreadable(&path, e))?;
        Ok(Reader::new(file))
    }
}

impl<R: io::Read> Reader<R> {
    pub fn new(rdr: R) -> Reader<R> {
        Reader {
            rdr: io::BufReader::new(rdr),
            line: 0,
            header: None,
            buf: String::new(),
        }
    }

    /// The number of lines consumed so far.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// A borrowed iterator over the records of a FASTA file.
    pub fn records(&mut self) -> RecordsIter<R> {
        RecordsIter::new(self)
    }

    /// An owned iterator over the records of a FASTA file.
    pub fn into_records(self) -> RecordsIntoIter<R> {
        RecordsIntoIter::new(self)
    }

    /// Read a single record from an input reader.
    fn read_record(&mut self) -> Result<Option<Record>> {
        let mut sequence = String::new();

        loop {
            self.buf.clear();
            let bytes = self.rdr.read_line(&mut self.buf)?;
            if bytes == 0 {
                // EOF flushes whatever header is pending
                return Ok(self.header.take().map(|header| Record { header, sequence }));
            }
            self.line += 1;

            let line = self.buf.trim_end();
            if let Some(header) = line.strip_prefix(HEADER_MARKER) {
                let header = header.to_string();
                match self.header.replace(header) {
                    Some(previous) => {
                        return Ok(Some(Record {
                            header: previous,
                            sequence,
                        }))
                    }
                    // lines before the first header belong to no record
                    None => sequence.clear(),
                }
            } else if self.header.is_some() {
                sequence.push_str(line);
            }
        }
    }
}

/// A borrowed iterator over the records of a FASTA file.
pub struct RecordsIter<'r, R: 'r> {
    /// The underlying reader
    rdr: &'r mut Reader<R>,
}

impl<'r, R: io::Read> RecordsIter<'r, R> {
    fn new(rdr: &'r mut Reader<R>) -> RecordsIter<'r, R> {
        RecordsIter { rdr }
    }
}

impl<'r, R: io::Read> Iterator for RecordsIter<'r, R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        self.rdr.read_record().transpose()
    }
}

/// An owned iterator over the records of a FASTA file.
pub struct RecordsIntoIter<R> {
    /// The underlying reader.
    rdr: Reader<R>,
}

impl<R: io::Read> RecordsIntoIter<R> {
    fn new(rdr: Reader<R>) -> RecordsIntoIter<R> {
        RecordsIntoIter { rdr }
    }
}

impl<R: io::Read> Iterator for RecordsIntoIter<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        self.rdr.read_record().transpose()
    }
}

/// Drives a protein and a nucleotide reader in lock-step.
///
/// Both files must hold the same number of records. When one side runs
/// out first the iterator yields a single `SchemaMismatch` error, counting
/// the remaining records of the longer side, and then stops.
pub struct PairedRecords<P, N> {
    protein: RecordsIntoIter<P>,
    nucleotide: RecordsIntoIter<N>,
    file: PathBuf,
    paired: usize,
    done: bool,
}

impl PairedRecords<File, File> {
    /// Open the two halves of a file pair. `file` names the pair in errors.
    pub fn from_paths<P: AsRef<Path>, Q: AsRef<Path>>(
        protein: P,
        nucleotide: Q,
    ) -> Result<PairedRecords<File, File>> {
        let file = nucleotide.as_ref().to_path_buf();
        Ok(PairedRecords::new(
            Reader::from_path(protein)?,
            Reader::from_path(nucleotide)?,
            file,
        ))
    }
}

impl<P: io::Read, N: io::Read> PairedRecords<P, N> {
    pub fn new(protein: Reader<P>, nucleotide: Reader<N>, file: PathBuf) -> PairedRecords<P, N> {
        PairedRecords {
            protein: protein.into_records(),
            nucleotide: nucleotide.into_records(),
            file,
            paired: 0,
            done: false,
        }
    }

    /// Number of pairs yielded so far.
    pub fn paired(&self) -> usize {
        self.paired
    }

    fn mismatch(&self, protein_records: usize, nucleotide_records: usize) -> Error {
        Error::new(ErrorKind::SchemaMismatch {
            file: self.file.clone(),
            protein_records,
            nucleotide_records,
        })
    }
}

/// Drain the longer side, counting how many records it still held.
fn count_rest<I: Iterator<Item = Result<Record>>>(rest: &mut I) -> Result<usize> {
    let mut extra = 1;
    for record in rest {
        record?;
        extra += 1;
    }
    Ok(extra)
}

impl<P: io::Read, N: io::Read> Iterator for PairedRecords<P, N> {
    type Item = Result<RecordPair>;

    fn next(&mut self) -> Option<Result<RecordPair>> {
        if self.done {
            return None;
        }

        let step = self
            .protein
            .next()
            .transpose()
            .and_then(|p| Ok((p, self.nucleotide.next().transpose()?)));
        let (protein, nucleotide) = match step {
            Ok(pair) => pair,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };

        match (protein, nucleotide) {
            (Some(protein), Some(nucleotide)) => {
                self.paired += 1;
                Some(Ok(RecordPair {
                    protein,
                    nucleotide,
                }))
            }
            (None, None) => {
                self.done = true;
                None
            }
            (Some(_), None) => {
                self.done = true;
                Some(
                    count_rest(&mut self.protein)
                        .and_then(|extra| Err(self.mismatch(self.paired + extra, self.paired))),
                )
            }
            (None, Some(_)) => {
                self.done = true;
                Some(
                    count_rest(&mut self.nucleotide)
                        .and_then(|extra| Err(self.mismatch(self.paired, self.paired + extra))),
                )
            }
        }
    }
}
