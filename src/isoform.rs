//! Keep one record per gene: the isoform with the longest coding sequence.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::{header::GeneId, matches::Match, RecordPair};

/// The currently best isoform of a gene.
#[derive(Debug, Clone)]
pub struct GeneRecord {
    pub gene_id: GeneId,
    pub pair: Rc<RecordPair>,
    pub matches: Vec<Match>,
}

impl GeneRecord {
    pub fn protein_header(&self) -> &str {
        &self.pair.protein.header
    }

    pub fn nucleotide_sequence(&self) -> &str {
        &self.pair.nucleotide.sequence
    }
}

/// Per-file accumulator of [`GeneRecord`]s. Use a fresh one per input file.
#[derive(Debug, Default)]
pub struct IsoformConsolidator {
    index: FxHashMap<GeneId, usize>,
    // first-insertion order
    records: Vec<GeneRecord>,
}

impl IsoformConsolidator {
    pub fn new() -> IsoformConsolidator {
        IsoformConsolidator::default()
    }

    /// Offer a record for `gene_id`. It replaces the held one only if its
    /// nucleotide sequence is strictly longer; ties keep the earlier record.
    /// Returns whether the offered record is now the held one.
    pub fn update(&mut self, gene_id: GeneId, pair: Rc<RecordPair>, matches: Vec<Match>) -> bool {
        match self.index.get(&gene_id) {
            Some(&i) => {
                let held = &mut self.records[i];
                if pair.nucleotide.sequence.len() > held.nucleotide_sequence().len() {
                    held.pair = pair;
                    held.matches = matches;
                    true
                } else {
                    false
                }
            }
            None => {
                self.index.insert(gene_id.clone(), self.records.len());
                self.records.push(GeneRecord {
                    gene_id,
                    pair,
                    matches,
                });
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, gene_id: &GeneId) -> Option<&GeneRecord> {
        self.index.get(gene_id).map(|&i| &self.records[i])
    }

    /// One record per gene, in the order genes were first seen.
    pub fn finalize(self) -> Vec<GeneRecord> {
        self.records
    }
}
