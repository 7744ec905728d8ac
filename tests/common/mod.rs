#![allow(dead_code)]

use genome_aligner::{CdsFeature, Genome, NtSequence, ScoringConfig, SimpleScorer, SubstitutionMatrix};

/// Reference with one CDS at 4..22 translating to `MKPGF*`.
pub const REFERENCE: &str = "CCCCATGAAACCCGGGTTTTAACCCC";

pub fn nt(name: &str, text: &str) -> NtSequence {
    NtSequence::from_text(name, text.as_bytes()).unwrap()
}

pub fn nt_scorer() -> SimpleScorer<genome_aligner::Nucleotide> {
    SimpleScorer::new(SubstitutionMatrix::nucleotide(2, -2), -10, -1).unwrap()
}

/// Preprocessed genome over `REFERENCE`, with or without its CDS.
pub fn genome(with_cds: bool, config: &ScoringConfig) -> Genome {
    let reference = nt("ref", REFERENCE);
    let cds = if with_cds {
        vec![CdsFeature::new("orf", vec![4..22], 0, &reference).unwrap()]
    } else {
        Vec::new()
    };
    let mut genome = Genome::new(reference, cds).unwrap();
    genome.preprocess(config.nt_weight, config.aa_weight);
    genome
}
