use std::rc::Rc;

use crate::{
    header::{GeneId, GeneIdentity},
    scanner::{Break, Tract},
    RecordPair,
};

/// A tract tied to the record pair and gene it was found in.
#[derive(Debug, Clone)]
pub struct Match {
    tract: Tract,
    identity: Rc<GeneIdentity>,
    pair: Rc<RecordPair>,
}

impl Match {
    pub fn new(tract: Tract, identity: Rc<GeneIdentity>, pair: Rc<RecordPair>) -> Match {
        Match {
            tract,
            identity,
            pair,
        }
    }

    /// Build every match of one record from its tracts.
    pub fn from_tracts(
        tracts: Vec<Tract>,
        identity: GeneIdentity,
        pair: &Rc<RecordPair>,
    ) -> Vec<Match> {
        let identity = Rc::new(identity);
        tracts
            .into_iter()
            .map(|t| Match::new(t, Rc::clone(&identity), Rc::clone(pair)))
            .collect()
    }

    /// 0-based inclusive start in the protein sequence.
    pub fn start(&self) -> usize {
        self.tract.start
    }

    /// 0-based exclusive end in the protein sequence.
    pub fn end(&self) -> usize {
        self.tract.end
    }

    pub fn len(&self) -> usize {
        self.tract.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tract.is_empty()
    }

    pub fn tract_sequence(&self) -> &str {
        &self.tract.sequence
    }

    pub fn brk(&self) -> Option<Break> {
        self.tract.brk
    }

    pub fn break_label(&self) -> &str {
        &self.tract.label
    }

    pub fn gene_id(&self) -> &GeneId {
        &self.identity.gene_id
    }

    pub fn display_name(&self) -> &str {
        &self.identity.display_name
    }

    pub fn source_header(&self) -> &str {
        &self.pair.protein.header
    }

    pub fn protein_sequence(&self) -> &str {
        &self.pair.protein.sequence
    }

    pub fn nucleotide_sequence(&self) -> &str {
        &self.pair.nucleotide.sequence
    }

    pub fn pair(&self) -> &Rc<RecordPair> {
        &self.pair
    }
}

/// Join the labels of all matches of a record: `Q10_1to11_Q12_40to52`.
pub fn joined_labels(matches: &[Match]) -> String {
    matches
        .iter()
        .map(Match::break_label)
        .collect::<Vec<_>>()
        .join("_")
}
