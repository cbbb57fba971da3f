use std::{
    error::Error as StdError,
    fmt, io,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

/// A type alias for `Result<T, polytract::Error>`.
pub type Result<T> = StdResult<T, Error>;

/// Error raised while scanning or reporting poly tracts.
#[derive(Debug)]
pub struct Error(Box<ErrorKind>);

impl Error {
    /// A crate private constructor for `Error`.
    pub(crate) fn new(kind: ErrorKind) -> Error {
        Error(Box::new(kind))
    }

    pub(crate) fn unreadable<P: AsRef<Path>>(path: P, source: io::Error) -> Error {
        Error::new(ErrorKind::UnreadableSource {
            path: path.as_ref().to_path_buf(),
            source,
        })
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    /// True when the error only invalidates the file being processed,
    /// so a batch may carry on with the next one.
    pub fn is_file_fatal(&self) -> bool {
        matches!(
            *self.0,
            ErrorKind::MissingGeneId { .. }
                | ErrorKind::NoTaxonFound { .. }
                | ErrorKind::SchemaMismatch { .. }
        )
    }
}

/// Specific errors that can happen.
#[derive(Debug)]
pub enum ErrorKind {
    /// I/O error.
    Io(io::Error),
    /// Error whilst writing a CSV report.
    Csv(csv::Error),
    /// An input path is missing or cannot be read.
    UnreadableSource { path: PathBuf, source: io::Error },
    /// A matched record carries no `GeneID:<digits>` token.
    MissingGeneId { header: String, file: PathBuf },
    /// The file name does not encode a taxonomic family.
    NoTaxonFound { file_name: String },
    /// The protein and nucleotide files hold a different number of records.
    SchemaMismatch {
        file: PathBuf,
        protein_records: usize,
        nucleotide_records: usize,
    },
    /// The tract pattern configuration is unusable.
    InvalidPattern(String),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::new(ErrorKind::Io(err))
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Error {
        Error::new(ErrorKind::Csv(err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self.0 {
            ErrorKind::Io(ref err) => write!(f, "I/O error - {}", err),
            ErrorKind::Csv(ref err) => write!(f, "writing report - {}", err),
            ErrorKind::UnreadableSource {
                ref path,
                ref source,
            } => write!(f, "cannot read {} - {}", path.display(), source),
            ErrorKind::MissingGeneId {
                ref header,
                ref file,
            } => write!(
                f,
                "{} in {} has no GeneID, cannot continue",
                header,
                file.display()
            ),
            ErrorKind::NoTaxonFound { ref file_name } => {
                write!(f, "no taxonomic family found in file name {}", file_name)
            }
            ErrorKind::SchemaMismatch {
                ref file,
                protein_records,
                nucleotide_records,
            } => write!(
                f,
                "{} has {} protein records but {} nucleotide records",
                file.display(),
                protein_records,
                nucleotide_records
            ),
            ErrorKind::InvalidPattern(ref err) => write!(f, "invalid tract pattern - {}", err),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self.0 {
            ErrorKind::Io(ref err) => Some(err),
            ErrorKind::Csv(ref err) => Some(err),
            ErrorKind::UnreadableSource { ref source, .. } => Some(source),
            _ => None,
        }
    }
}
