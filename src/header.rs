//! Gene identity carried in FASTA headers.

use std::fmt;

const GENE_ID_TOKEN: &str = "GeneID:";
const PROTEIN_FIELD: &str = "[protein=";

/// Placeholder used when a header has no `[protein=...]` field.
pub const UNKNOWN_NAME: &str = "None";

/// The numeric gene identifier, kept as its digit string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeneId(String);

impl GeneId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gene id and display name of one header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneIdentity {
    pub gene_id: GeneId,
    pub display_name: String,
}

impl GeneIdentity {
    /// `None` when the header holds no gene id. The display name falls back
    /// to [`UNKNOWN_NAME`].
    pub fn from_header(header: &str) -> Option<GeneIdentity> {
        let gene_id = gene_id(header)?;
        let display_name = display_name(header).unwrap_or(UNKNOWN_NAME).to_string();
        Some(GeneIdentity {
            gene_id,
            display_name,
        })
    }
}

/// The first `GeneID:<digits>` token of a header.
pub fn gene_id(header: &str) -> Option<GeneId> {
    header.match_indices(GENE_ID_TOKEN).find_map(|(i, token)| {
        let rest = &header[i + token.len()..];
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        (digits > 0).then(|| GeneId(rest[..digits].to_string()))
    })
}

/// The first non-empty `[protein=<name>]` field of a header.
pub fn display_name(header: &str) -> Option<&str> {
    header.match_indices(PROTEIN_FIELD).find_map(|(i, field)| {
        let rest = &header[i + field.len()..];
        match rest.find(']') {
            Some(close) if close > 0 => Some(&rest[..close]),
            _ => None,
        }
    })
}
