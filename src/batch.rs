//! Drives a directory of protein/nucleotide file pairs through the scanner.
//!
//! Each input file is processed on its own: a fresh [`IsoformConsolidator`]
//! and a fresh set of already emitted protein sequences, five outputs written
//! to temporary files and only moved into place once the whole file went
//! through without error.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, error, info, warn};
use rustc_hash::FxHashSet;
use tempfile::NamedTempFile;

use crate::{
    header::GeneIdentity,
    isoform::IsoformConsolidator,
    matches::Match,
    reader::PairedRecords,
    scanner::TractPattern,
    taxonomy,
    writer::{FastaWriter, ReportWriter},
    Error, ErrorKind, RecordPair, Result,
};

pub const MATCHES_PROTEIN_DIR: &str = "matches_protein";
pub const MATCHES_NUCLEOTIDE_DIR: &str = "matches_nucleotide";
pub const GENOME_DIR: &str = "genome";
pub const REPORTS_DIR: &str = "reports";
pub const GENE_REPORTS_DIR: &str = "reports_no_isoforms";

/// Where the translation step leaves its proteins, relative to the output root.
pub const TRANSLATED_DIR: &str = "translate_out";

/// Settings for one batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Translated protein FASTA files
    pub protein_dir: PathBuf,
    /// Coding sequences, one file per protein file with the same name
    pub nucleotide_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pattern: TractPattern,
    /// Log and skip files failing on their own data instead of stopping
    pub keep_going: bool,
}

/// Paths of the five outputs of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub matches_protein: PathBuf,
    pub matches_nucleotide: PathBuf,
    pub genome: PathBuf,
    pub report: PathBuf,
    pub gene_report: PathBuf,
}

impl OutputPaths {
    /// `<root>/<dir>/<stem>_<index>.<ext>` for every output.
    pub fn new(root: &Path, stem: &str, index: usize) -> OutputPaths {
        let fasta = format!("{}_{}.fasta", stem, index);
        let csv = format!("{}_{}.csv", stem, index);
        OutputPaths {
            matches_protein: root.join(MATCHES_PROTEIN_DIR).join(&fasta),
            matches_nucleotide: root.join(MATCHES_NUCLEOTIDE_DIR).join(&fasta),
            genome: root.join(GENOME_DIR).join(&fasta),
            report: root.join(REPORTS_DIR).join(&csv),
            gene_report: root.join(GENE_REPORTS_DIR).join(&csv),
        }
    }

    fn all(&self) -> [&Path; 5] {
        [
            &self.matches_protein,
            &self.matches_nucleotide,
            &self.genome,
            &self.report,
            &self.gene_report,
        ]
    }
}

/// Counts for one input file.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileSummary {
    /// Record pairs read
    pub records: usize,
    /// Pairs with at least one tract
    pub matched_records: usize,
    pub matches: usize,
    /// Distinct genes in the gene-level report
    pub genes: usize,
}

/// Counts for a whole batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub files: usize,
    pub failed: usize,
    pub records: usize,
    pub matches: usize,
    pub genes: usize,
}

impl BatchSummary {
    fn add(&mut self, file: FileSummary) {
        self.files += 1;
        self.records += file.records;
        self.matches += file.matches;
        self.genes += file.genes;
    }
}

/// The output streams of one input file.
pub struct Sinks<W: Write> {
    pub protein: FastaWriter<W>,
    pub nucleotide: FastaWriter<W>,
    pub genome: FastaWriter<W>,
    pub report: ReportWriter<W>,
    pub gene_report: ReportWriter<W>,
}

impl<W: Write> Sinks<W> {
    pub fn new(
        protein: W,
        nucleotide: W,
        genome: W,
        report: W,
        gene_report: W,
        taxonomy: &str,
    ) -> Result<Sinks<W>> {
        Ok(Sinks {
            protein: FastaWriter::new(protein),
            nucleotide: FastaWriter::new(nucleotide),
            genome: FastaWriter::new(genome),
            report: ReportWriter::new(report, taxonomy)?,
            gene_report: ReportWriter::new(gene_report, taxonomy)?,
        })
    }

    /// Flush every stream and hand back the writers in output order.
    pub fn into_inner(self) -> Result<[W; 5]> {
        Ok([
            self.protein.into_inner()?,
            self.nucleotide.into_inner()?,
            self.genome.into_inner()?,
            self.report.into_inner()?,
            self.gene_report.into_inner()?,
        ])
    }
}

impl Sinks<NamedTempFile> {
    /// Temporary files next to their final paths, so the commit is a rename.
    fn staged(paths: &OutputPaths, taxonomy: &str) -> Result<Sinks<NamedTempFile>> {
        let [a, b, c, d, e] = paths.all().map(staging_file);
        Sinks::new(a?, b?, c?, d?, e?, taxonomy)
    }

    /// Move all five outputs into place. If one rename fails, the outputs
    /// already moved are removed again and the rest are dropped with their
    /// temporary files.
    fn commit(self, paths: &OutputPaths) -> Result<()> {
        let mut committed: Vec<&Path> = Vec::with_capacity(5);
        for (tmp, path) in self.into_inner()?.into_iter().zip(paths.all()) {
            if let Err(e) = tmp.persist(path) {
                rollback(&committed);
                return Err(io::Error::from(e).into());
            }
            committed.push(path);
            debug!("wrote {}", path.display());
        }
        Ok(())
    }
}

fn rollback(committed: &[&Path]) {
    for path in committed {
        if let Err(e) = fs::remove_file(path) {
            warn!("could not remove partial output {}: {}", path.display(), e);
        }
    }
}

fn staging_file(path: &Path) -> Result<NamedTempFile> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(NamedTempFile::new_in(dir)?)
}

/// Scan every record pair of one file and write all five outputs.
///
/// Matched records go to the tagged FASTA streams (once per distinct protein
/// sequence) and to the isoform-level report. Unmatched ones are copied to
/// the genome stream untouched. The gene-level report is written last, from
/// the longest isoform of every gene.
pub fn scan_pairs<I, W>(
    pairs: I,
    pattern: &TractPattern,
    file: &Path,
    sinks: &mut Sinks<W>,
) -> Result<FileSummary>
where
    I: IntoIterator<Item = Result<RecordPair>>,
    W: Write,
{
    let mut summary = FileSummary::default();
    let mut consolidator = IsoformConsolidator::new();
    let mut emitted: FxHashSet<String> = FxHashSet::default();

    for pair in pairs {
        let pair = Rc::new(pair?);
        summary.records += 1;

        let tracts = pattern.scan(&pair.protein.sequence);
        if tracts.is_empty() {
            sinks
                .genome
                .write_plain(&pair.protein.header, &pair.nucleotide.sequence)?;
            continue;
        }

        let identity = GeneIdentity::from_header(&pair.protein.header).ok_or_else(|| {
            Error::new(ErrorKind::MissingGeneId {
                header: pair.protein.header.clone(),
                file: file.to_path_buf(),
            })
        })?;
        let gene_id = identity.gene_id.clone();
        let matches = Match::from_tracts(tracts, identity, &pair);
        summary.matched_records += 1;
        summary.matches += matches.len();

        let header = &pair.protein.header;
        if emitted.insert(pair.protein.sequence.clone()) {
            sinks
                .protein
                .write_tagged(header, &matches, &pair.protein.sequence)?;
            sinks
                .nucleotide
                .write_tagged(header, &matches, &pair.nucleotide.sequence)?;
            sinks
                .genome
                .write_tagged(header, &matches, &pair.nucleotide.sequence)?;
        } else {
            debug!("{} repeats an emitted protein sequence", header);
        }

        sinks.report.write_matches(&matches)?;
        consolidator.update(gene_id, Rc::clone(&pair), matches);
    }

    summary.genes = consolidator.len();
    for record in consolidator.finalize() {
        sinks.gene_report.write_matches(&record.matches)?;
    }
    Ok(summary)
}

/// A batch over every file of the protein directory.
pub struct Batch {
    config: BatchConfig,
}

impl Batch {
    pub fn new(config: BatchConfig) -> Batch {
        Batch { config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// File names to process, sorted.
    pub fn discover(&self) -> Result<Vec<String>> {
        let dir = &self.config.protein_dir;
        let entries = fs::read_dir(dir).map_err(|e| Error::unreadable(dir, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::unreadable(dir, e))?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(name) => warn!("skipping non UTF-8 file name {:?}", name),
            }
        }
        names.sort();
        Ok(names)
    }

    fn create_output_dirs(&self) -> Result<()> {
        for dir in [
            MATCHES_PROTEIN_DIR,
            MATCHES_NUCLEOTIDE_DIR,
            GENOME_DIR,
            REPORTS_DIR,
            GENE_REPORTS_DIR,
        ] {
            fs::create_dir_all(self.config.output_dir.join(dir))?;
        }
        Ok(())
    }

    /// Process one file pair. Nothing is written unless it succeeds.
    pub fn process_file(&self, file_name: &str, index: usize) -> Result<FileSummary> {
        info!("Finding poly chains in {}.", file_name);
        let taxonomy = taxonomy::tag(file_name)?;

        let protein_path = self.config.protein_dir.join(file_name);
        let nucleotide_path = self.config.nucleotide_dir.join(file_name);
        info!("Nucleotide file path = {}", nucleotide_path.display());
        info!("Protein file path: {}", protein_path.display());

        let pairs = PairedRecords::from_paths(&protein_path, &nucleotide_path)?;
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        let paths = OutputPaths::new(&self.config.output_dir, stem, index);

        let mut sinks = Sinks::staged(&paths, taxonomy)?;
        let summary = scan_pairs(pairs, &self.config.pattern, &nucleotide_path, &mut sinks)?;
        sinks.commit(&paths)?;

        info!("{} gene matches in {}", summary.genes, file_name);
        Ok(summary)
    }

    /// Run every discovered file in order.
    pub fn run(&self) -> Result<BatchSummary> {
        let names = self.discover()?;
        self.create_output_dirs()?;
        info!(
            "Scanning {} files for {}",
            names.len(),
            self.config.pattern
        );

        let mut summary = BatchSummary::default();
        for (index, name) in names.iter().enumerate() {
            info!("File: {}", name);
            match self.process_file(name, index) {
                Ok(file) => summary.add(file),
                Err(e) if self.config.keep_going && e.is_file_fatal() => {
                    error!("{}", e);
                    summary.failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Reader;
    use tempfile::TempDir;

    fn run_scan(protein: &str, nucleotide: &str, pattern: TractPattern) -> (Result<FileSummary>, [String; 5]) {
        let pairs = PairedRecords::new(
            Reader::new(protein.as_bytes()),
            Reader::new(nucleotide.as_bytes()),
            PathBuf::from("x_Muridae_1.fna"),
        );
        let mut sinks =
            Sinks::new(Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new(), "Muridae")
                .unwrap();
        let result = scan_pairs(pairs, &pattern, Path::new("x_Muridae_1.fna"), &mut sinks);
        let outputs = sinks
            .into_inner()
            .unwrap()
            .map(|buf| String::from_utf8(buf).unwrap());
        (result, outputs)
    }

    fn polyq(min_run: usize) -> TractPattern {
        TractPattern::new('Q', min_run, true).unwrap()
    }

    #[test]
    fn longest_isoform_reaches_gene_report() {
        let protein = ">iso1 GeneID:123\nMQQQQQ\n>iso2 GeneID:123\nMAQQQQQ\n>other GeneID:9\nMKK\n";
        let nucleotide = format!(
            ">n1\n{}\n>n2\n{}\n>n3\nATGAAAAAA\n",
            "A".repeat(300),
            "C".repeat(450)
        );
        let (result, [protein_fa, nucleotide_fa, genome, report, gene_report]) =
            run_scan(protein, &nucleotide, polyq(5));

        let summary = result.unwrap();
        assert_eq!(
            summary,
            FileSummary {
                records: 3,
                matched_records: 2,
                matches: 2,
                genes: 1
            }
        );
        assert_eq!(protein_fa.lines().count(), 4);
        assert_eq!(nucleotide_fa.lines().count(), 4);
        // unmatched record passes through with its protein header
        assert!(genome.ends_with(">other GeneID:9\nATGAAAAAA\n"));
        assert_eq!(report.lines().count(), 3);

        let gene_rows: Vec<&str> = gene_report.lines().skip(1).collect();
        assert_eq!(gene_rows.len(), 1);
        assert!(gene_rows[0].starts_with(">iso2 GeneID:123 [Q5_2to7]"));
        assert!(gene_rows[0].contains(&"C".repeat(450)));
    }

    #[test]
    fn repeated_protein_emitted_once() {
        let protein = ">a GeneID:1\nQQQQ\n>b GeneID:2\nQQQQ\n";
        let nucleotide = ">a\nCAGCAGCAGCAG\n>b\nCAACAACAACAA\n";
        let (result, [protein_fa, _, genome, report, gene_report]) =
            run_scan(protein, nucleotide, polyq(4));
        assert_eq!(result.unwrap().genes, 2);
        assert_eq!(protein_fa, ">a GeneID:1 [poly=Q4_0to4]\nQQQQ\n");
        assert_eq!(genome.lines().count(), 2);
        // reports still carry both records
        assert_eq!(report.lines().count(), 3);
        assert_eq!(gene_report.lines().count(), 3);
    }

    #[test]
    fn missing_gene_id_fails_the_file() {
        let protein = ">fine GeneID:1\nQQQQ\n>broken\nKQQQQ\n";
        let nucleotide = ">a\nCAG\n>b\nAAG\n";
        let (result, _) = run_scan(protein, nucleotide, polyq(4));
        let err = result.unwrap_err();
        match err.kind() {
            ErrorKind::MissingGeneId { header, file } => {
                assert_eq!(header, "broken");
                assert_eq!(file, Path::new("x_Muridae_1.fna"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn unmatched_records_need_no_gene_id() {
        let (result, [_, _, genome, _, _]) = run_scan(">p\nMKL\n", ">n\nATGAAGCTG\n", polyq(4));
        assert_eq!(result.unwrap().matched_records, 0);
        assert_eq!(genome, ">p\nATGAAGCTG\n");
    }

    fn write(path: &Path, contents: &str) {
        fs::write(path, contents).unwrap();
    }

    fn batch_dirs() -> (TempDir, BatchConfig) {
        let root = TempDir::new().unwrap();
        let protein_dir = root.path().join("out").join(TRANSLATED_DIR);
        let nucleotide_dir = root.path().join("in");
        fs::create_dir_all(&protein_dir).unwrap();
        fs::create_dir_all(&nucleotide_dir).unwrap();
        let config = BatchConfig {
            protein_dir,
            nucleotide_dir,
            output_dir: root.path().join("out"),
            pattern: polyq(4),
            keep_going: false,
        };
        (root, config)
    }

    #[test]
    fn batch_commits_outputs() {
        let (_root, config) = batch_dirs();
        let name = "Mus_musculus_Muridae_10090.fna";
        write(&config.protein_dir.join(name), ">p GeneID:7 [protein=Tbp]\nMQQQQQK\n");
        write(&config.nucleotide_dir.join(name), ">n\nATGCAGCAGCAGCAGCAGAAG\n");

        let batch = Batch::new(config.clone());
        let summary = batch.run().unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.matches, 1);

        let paths = OutputPaths::new(&config.output_dir, "Mus_musculus_Muridae_10090", 0);
        for path in paths.all() {
            assert!(path.exists(), "{} missing", path.display());
        }
        let report = fs::read_to_string(&paths.report).unwrap();
        assert!(report.contains(",Tbp,2,QQQQQ,5,Q5_1to6,MQQQQQK,"));
        assert!(report.trim_end().ends_with("Muridae"));
    }

    #[test]
    fn failed_file_leaves_no_outputs() {
        let (_root, config) = batch_dirs();
        let name = "Mus_musculus_Muridae_10090.fna";
        write(&config.protein_dir.join(name), ">p\nMQQQQQK\n");
        write(&config.nucleotide_dir.join(name), ">n\nATG\n");

        let err = Batch::new(config.clone()).run().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::MissingGeneId { .. }));

        let paths = OutputPaths::new(&config.output_dir, "Mus_musculus_Muridae_10090", 0);
        for path in paths.all() {
            assert!(!path.exists());
            let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
            assert_eq!(leftovers, 0);
        }
    }

    #[test]
    fn blocked_output_rolls_back_the_others() {
        let (_root, mut config) = batch_dirs();
        config.keep_going = true;
        let name = "Mus_musculus_Muridae_1.fna";
        write(&config.protein_dir.join(name), ">p GeneID:7\nMQQQQQK\n");
        write(&config.nucleotide_dir.join(name), ">n\nATGCAGCAGCAGCAGCAGAAG\n");

        // a directory where the last output should land makes its rename fail
        let paths = OutputPaths::new(&config.output_dir, "Mus_musculus_Muridae_1", 0);
        fs::create_dir_all(&paths.gene_report).unwrap();

        let err = Batch::new(config).run().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io(_)));
        for path in paths.all() {
            assert!(!path.is_file(), "{} left behind", path.display());
        }
        for path in &paths.all()[..4] {
            let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
            assert_eq!(leftovers, 0);
        }
        // only the blocking directory remains
        let gene_dir = paths.gene_report.parent().unwrap();
        assert_eq!(fs::read_dir(gene_dir).unwrap().count(), 1);
    }

    #[test]
    fn keep_going_skips_bad_files() {
        let (_root, mut config) = batch_dirs();
        config.keep_going = true;
        write(&config.protein_dir.join("a_Hominidae_1.fna"), ">p\nQQQQ\n");
        write(&config.nucleotide_dir.join("a_Hominidae_1.fna"), ">n\nCAG\n");
        write(&config.protein_dir.join("no_taxon.fna"), ">p GeneID:1\nQQQQ\n");
        write(&config.nucleotide_dir.join("no_taxon.fna"), ">n\nCAG\n");
        write(&config.protein_dir.join("b_Canidae_2.fna"), ">p GeneID:1\nQQQQ\n");
        write(&config.nucleotide_dir.join("b_Canidae_2.fna"), ">n\nCAG\n");

        let summary = Batch::new(config.clone()).run().unwrap();
        assert_eq!(summary.files, 1);
        assert_eq!(summary.failed, 2);
        // index follows the sorted listing
        assert!(config.output_dir.join(REPORTS_DIR).join("b_Canidae_2_1.csv").exists());
    }

    #[test]
    fn missing_nucleotide_file_stops_the_batch() {
        let (_root, mut config) = batch_dirs();
        config.keep_going = true;
        write(&config.protein_dir.join("a_Hominidae_1.fna"), ">p GeneID:1\nQQQQ\n");

        let err = Batch::new(config).run().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnreadableSource { .. }));
    }

    #[test]
    fn missing_protein_dir_is_unreadable() {
        let (_root, mut config) = batch_dirs();
        config.protein_dir = config.protein_dir.join("nope");
        let err = Batch::new(config).run().unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnreadableSource { .. }));
    }

    #[test]
    fn reruns_are_byte_identical() {
        let (_root, config) = batch_dirs();
        let name = "Danio_rerio_Cyprinidae_7955.fna";
        write(
            &config.protein_dir.join(name),
            ">a GeneID:3 [protein=x]\nMQQQQHQQQ\n>b GeneID:3\nQQQQQQQQ\n>c\nMKV\n",
        );
        write(
            &config.nucleotide_dir.join(name),
            ">a\nATGCAGCAG\n>b\nCAGCAGCAGCAGCAG\n>c\nATGAAGGTG\n",
        );

        let batch = Batch::new(config.clone());
        batch.run().unwrap();
        let paths = OutputPaths::new(&config.output_dir, "Danio_rerio_Cyprinidae_7955", 0);
        let first: Vec<Vec<u8>> = paths.all().iter().map(|p| fs::read(p).unwrap()).collect();
        batch.run().unwrap();
        let second: Vec<Vec<u8>> = paths.all().iter().map(|p| fs::read(p).unwrap()).collect();
        assert_eq!(first, second);
    }
}
