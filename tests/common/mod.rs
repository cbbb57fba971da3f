#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub const FILE_NAME: &str = "Homo_sapiens_Hominidae_9606.fna";

pub const PROTEINS: &str = "\
>lcl|NM_002111_cds_1 [gene=HTT] [db_xref=GeneID:3064] [protein=huntingtin isoform 1]
MATLEKLMKAFESLKSFQQQQQQQQQQQQQQQQQQQQQQQQQQQPPPPPP
>lcl|NM_002111_cds_2 [gene=HTT] [db_xref=GeneID:3064] [protein=huntingtin isoform 2]
MKAFESLKSFQQQQQQQQQQQQQQQPPP
>lcl|NM_000332_cds_1 [gene=ATXN1] [db_xref=GeneID:6310] [protein=ataxin-1]
MKSNQERSNECLPPKKREIPATSRSSEEKAPTLPSDNHRVEGTAWLPGNPGGRGHGGGRHG
PAGTSVELGLQQGIGLHKALSTGLDYSPPSAPRSVPVATTLPAAYATPQPGTPVSPVQYAH
>lcl|NM_004993_cds_1 [gene=ATXN3] [db_xref=GeneID:4287] [protein=ataxin-3]
MESIFHEKQEGSLCAQHCLNNLLQGEYFSPVELSSIAHQLDEEERMRMAEGGVTSEDYRTF
QQQQQQQQQQQQQHQQQQQQQQQQ
";

pub const NUCLEOTIDES: &str = "\
>lcl|NM_002111_cds_1
ATGGCGACCCTGGAAAAGCTGATGAAGGCCTTCGAGTCCCTCAAGTCCTTCCAGCAGCAGCAGCAGCAGCAG
CAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAACAGCCGCCA
>lcl|NM_002111_cds_2
ATGAAGGCCTTCGAGTCCCTCAAGTCCTTCCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAGCAG
>lcl|NM_000332_cds_1
ATGAAATCCAACCAAGAGCGGAGCAACGAATGCCTGCCTCCCAAGAAGCGCGAGATCCCCGCC
>lcl|NM_004993_cds_1
ATGGAGTCCATCTTCCACGAGAAACAAGAAGGCTCACTTTGTGCTCAACATTGCCTGAATAAC
";

/// A scratch workspace laid out the way the tool expects it.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Workspace {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("input")).unwrap();
        fs::create_dir_all(dir.path().join("output").join("translate_out")).unwrap();
        Workspace { dir }
    }

    pub fn input(&self) -> PathBuf {
        self.dir.path().join("input")
    }

    pub fn output(&self) -> PathBuf {
        self.dir.path().join("output")
    }

    pub fn add_pair(&self, name: &str, proteins: &str, nucleotides: &str) {
        fs::write(self.output().join("translate_out").join(name), proteins).unwrap();
        fs::write(self.input().join(name), nucleotides).unwrap();
    }

    pub fn read(&self, rel: &str) -> String {
        fs::read_to_string(self.output().join(rel)).unwrap()
    }

    pub fn exists(&self, rel: &str) -> bool {
        self.output().join(rel).exists()
    }
}

/// The binary with the input and output directories already set.
pub fn polytract(ws: &Workspace) -> Command {
    let mut cmd = Command::cargo_bin("polytract").unwrap();
    cmd.arg("-i")
        .arg(path_arg(&ws.input()))
        .arg("-o")
        .arg(path_arg(&ws.output()));
    cmd
}

fn path_arg(p: &Path) -> String {
    p.to_str().unwrap().to_string()
}
