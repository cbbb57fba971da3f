use crate::{Error, ErrorKind, Result};

/// Family names end in `-ae` (Hominidae, Muridae, ...).
pub const FAMILY_SUFFIX: &str = "ae";

/// Pull the taxonomic family out of a file name such as
/// `Homo_sapiens_Hominidae_9606.fna`.
///
/// The family is the last token that has an underscore on both sides and
/// ends in [`FAMILY_SUFFIX`] after at least one other character.
pub fn tag(file_name: &str) -> Result<&str> {
    let tokens: Vec<&str> = file_name.split('_').collect();
    if tokens.len() < 3 {
        return Err(no_taxon(file_name));
    }

    tokens[1..tokens.len() - 1]
        .iter()
        .rev()
        .find(|t| t.len() > FAMILY_SUFFIX.len() && t.ends_with(FAMILY_SUFFIX))
        .copied()
        .ok_or_else(|| no_taxon(file_name))
}

fn no_taxon(file_name: &str) -> Error {
    Error::new(ErrorKind::NoTaxonFound {
        file_name: file_name.to_string(),
    })
}
