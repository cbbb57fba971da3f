/// A single FASTA entry.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Record {
    /// The header line without the leading `>`
    pub header: String,
    /// All sequence lines joined with no separator
    pub sequence: String,
}

impl Record {
    pub fn new<H: Into<String>, S: Into<String>>(header: H, sequence: S) -> Record {
        Record {
            header: header.into(),
            sequence: sequence.into(),
        }
    }
}

/// A translated protein and the coding sequence it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPair {
    pub protein: Record,
    pub nucleotide: Record,
}
