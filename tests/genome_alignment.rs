mod common;

use genome_aligner::pipeline::align_query;
use genome_aligner::{score_cigar, Aligner, Cigar, ScoringConfig, SixFrameView};

use common::{genome, nt, REFERENCE};

const CODON_DELETED: &str = "CCCCATGAAAGGGTTTTAACCCC";
const BASE_DELETED: &str = "CCCCATGAAACCGGGTTTTAACCCC";

fn rescore(with_cds: bool, query: &str, cigar: &str) -> i32 {
    let config = ScoringConfig::default();
    let scorer = config.genome_scorer().unwrap();
    let genome = genome(with_cds, &config);
    let cigar: Cigar = cigar.parse().unwrap();
    score_cigar(&scorer, &genome, &SixFrameView::new(nt("q", query)), &cigar).unwrap()
}

#[test]
fn self_alignment_adds_codon_scores() {
    let config = ScoringConfig::default();
    let genome = genome(true, &config);
    let aligner = Aligner::global(config.genome_scorer().unwrap());
    let sol = aligner.align(&genome, &SixFrameView::new(nt("q", REFERENCE))).unwrap();
    assert_eq!(sol.cigar.to_string(), "26M");
    // 52 for the bases plus BLOSUM30 self scores of M K P G F *
    assert_eq!(sol.score, 92);
}

#[test]
fn codon_deletion_stays_in_frame() {
    let config = ScoringConfig::default();
    let genome = genome(true, &config);
    let aligner = Aligner::global(config.genome_scorer().unwrap());
    let sol = aligner.align(&genome, &SixFrameView::new(nt("q", CODON_DELETED))).unwrap();
    assert_eq!(sol.cigar.to_string(), "10M3D13M");
    assert_eq!(sol.score, 57);
}

#[test]
fn frameshifting_deletion_costs_more_inside_cds() {
    assert_eq!(rescore(false, BASE_DELETED, "10M1D15M"), 40);
    assert_eq!(rescore(true, BASE_DELETED, "10M1D15M"), -37);
    // same edit outside any CDS versus a whole codon removed inside one
    assert_eq!(rescore(false, CODON_DELETED, "10M3D13M"), 34);
    assert_eq!(rescore(true, CODON_DELETED, "10M3D13M"), 57);
}

#[test]
fn aligner_avoids_frameshift_when_cds_is_annotated() {
    let config = ScoringConfig::default();
    let query = SixFrameView::new(nt("q", BASE_DELETED));
    let scorer = config.genome_scorer().unwrap();

    let plain = Aligner::global(scorer.clone())
        .align(&genome(false, &config), &query)
        .unwrap();
    assert_eq!(plain.cigar.to_string(), "10M1D15M");
    assert_eq!(plain.score, 40);

    let coding = Aligner::global(scorer).align(&genome(true, &config), &query).unwrap();
    assert_eq!(coding.cigar.to_string(), "25M1D");
    assert_eq!(coding.score, 66);
}

#[test]
fn local_alignment_skips_flanks() {
    let config = ScoringConfig::default();
    let genome = genome(true, &config);
    let aligner = Aligner::local(config.genome_scorer().unwrap());
    let query = SixFrameView::new(nt("q", "GGGGGGATGAAACCCGGGTTTTAATTTTTT"));
    let sol = aligner.align(&genome, &query).unwrap();
    assert_eq!(sol.cigar.to_string(), "4N6I18M6I4N");
    assert_eq!(sol.score, 76);
}

#[test]
fn deletion_projects_onto_protein() {
    let config = ScoringConfig::default();
    let genome = genome(true, &config);
    let aligner = Aligner::global(config.genome_scorer().unwrap());
    let report = align_query(&aligner, &genome, &[], &nt("q", CODON_DELETED)).unwrap();

    assert_eq!(report.cds.len(), 1);
    let region = &report.cds[0];
    assert_eq!(region.alignment.ref_aa.to_text(), "MKPGF*");
    assert_eq!(region.alignment.query_aa.to_text(), "MK-GF*");
    assert_eq!(region.alignment.frameshift_count(), 0);

    let stats = &region.stats;
    assert_eq!(stats.match_count, 5);
    assert_eq!(stats.identity_count, 5);
    assert_eq!(stats.delete_events, 1);
    assert_eq!(stats.delete_count, 1);
    assert_eq!(stats.coverage, 6);
    assert_eq!(stats.stop_codons, 1);
    assert_eq!(stats.score, 23);

    assert_eq!(report.nt_stats.delete_count, 3);
    assert_eq!(report.total_score(), report.nt_stats.score + 23);
}

#[test]
fn protein_features_project_like_cds() {
    let config = ScoringConfig::default();
    let genome = genome(true, &config);
    let mature = genome_aligner::CdsFeature::new("p1", vec![7..16], 0, genome.reference()).unwrap();
    let aligner = Aligner::global(config.genome_scorer().unwrap());
    let report = align_query(&aligner, &genome, &[mature], &nt("q", REFERENCE)).unwrap();
    assert_eq!(report.proteins.len(), 1);
    assert_eq!(report.proteins[0].alignment.query_aa.to_text(), "KPG");
    assert_eq!(report.proteins[0].stats.identity_count, 3);
    // protein products do not contribute to the amino acid score
    assert_eq!(report.aa_score(), report.cds[0].stats.score);
}
