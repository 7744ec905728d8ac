mod common;

use genome_aligner::pipeline::align_query;
use genome_aligner::{score_cigar, Aligner, Cigar, CigarOp, ScoringConfig, Symbol};

use common::{genome, nt, nt_scorer};

#[test]
fn identical_sequences_align_as_one_match_run() {
    let aligner = Aligner::global(nt_scorer());
    let sol = aligner.align(&nt("r", "ACGTACGT"), &nt("q", "ACGTACGT")).unwrap();
    assert_eq!(sol.score, 16);
    assert_eq!(sol.cigar.items().len(), 1);
    assert_eq!(sol.cigar.items()[0].op, CigarOp::Match);
    assert_eq!(sol.cigar.items()[0].length, 8);
}

#[test]
fn interior_deletion_pays_gap_open() {
    let aligner = Aligner::global(nt_scorer());
    let sol = aligner.align(&nt("r", "ACGTACGT"), &nt("q", "ACGACGT")).unwrap();
    assert_eq!(sol.score, 3 * 2 - 10 + 4 * 2);
    assert_eq!(sol.cigar, "3M1D4M".parse::<Cigar>().unwrap());
}

#[test]
fn empty_query_is_reported_unaligned() {
    let config = ScoringConfig::default();
    let genome = genome(false, &config);
    let aligner = Aligner::global(config.genome_scorer().unwrap());
    let report = align_query(&aligner, &genome, &[], &nt("q", "")).unwrap();
    assert_eq!(report.solution.score, 0);
    assert_eq!(report.solution.cigar.to_string(), "26N");
    assert!(report.aligned_query.iter().all(|s| s.is_missing()));
}

#[test]
fn global_score_matches_rescored_cigar() {
    let config = ScoringConfig::default();
    let scorer = config.genome_scorer().unwrap();
    let queries = [
        "CCCCATGAAACCCGGGTTTTAACCCC",
        "CCCCATGAAAGGGTTTTAACCCC",
        "CCCCATGAAACCGGGTTTTAACCCC",
        "GGCCATGAAACCCAAAGGGTTTTAACC",
        "ATGTTTTAA",
    ];
    for with_cds in [true, false] {
        let genome = genome(with_cds, &config);
        let aligner = Aligner::global(scorer.clone());
        for text in queries {
            let query = genome_aligner::SixFrameView::new(nt("q", text));
            let sol = aligner.align(&genome, &query).unwrap();
            let rescored = score_cigar(aligner.scorer(), &genome, &query, &sol.cigar).unwrap();
            assert_eq!(rescored, sol.score, "query {text} cds {with_cds} cigar {}", sol.cigar);
            assert_eq!(sol.cigar.ref_span(), genome_aligner::Alignable::len(&genome));
            assert_eq!(sol.cigar.query_span(), text.len());
        }
    }
}

#[test]
fn aligned_rows_reproduce_inputs() {
    let aligner = Aligner::global(nt_scorer());
    let reference = nt("r", "ACGTACGTAAAAACGTACGTAC");
    let query = nt("q", "TTACGTACGTCGTACGTAC");
    let sol = aligner.align(&reference, &query).unwrap();
    let (ref_row, query_row) = sol.cigar.align(&reference, &query).unwrap();
    assert_eq!(ref_row.len(), query_row.len());
    assert_eq!(ref_row.without_gaps().to_text(), reference.to_text());
    assert_eq!(query_row.without_gaps().to_text(), query.to_text());
}

#[test]
fn trailing_reference_overhang_costs_nothing() {
    let aligner = Aligner::global(nt_scorer());
    let short = aligner.align(&nt("r", "ACGTACGT"), &nt("q", "ACGTACGT")).unwrap();
    let long = aligner.align(&nt("r", "ACGTACGTGGGGGGGGGG"), &nt("q", "ACGTACGT")).unwrap();
    assert_eq!(long.score, short.score);
    assert_eq!(long.cigar.to_string(), "8M10D");
}

#[test]
fn local_score_is_never_negative() {
    let aligner = Aligner::local(nt_scorer());
    for (r, q) in [("AAAA", "CC"), ("ACGT", "TGCA"), ("GATTACA", "TTTGATTACATTT")] {
        let sol = aligner.align(&nt("r", r), &nt("q", q)).unwrap();
        assert!(sol.score >= 0);
        assert_eq!(sol.cigar.ref_span(), r.len());
        assert_eq!(sol.cigar.query_span(), q.len());
    }
}

#[test]
fn local_and_global_agree_on_self_alignment() {
    let config = ScoringConfig::default();
    let genome = genome(true, &config);
    let query = genome_aligner::SixFrameView::new(nt("q", common::REFERENCE));
    let scorer = config.genome_scorer().unwrap();
    let global = Aligner::global(scorer.clone()).align(&genome, &query).unwrap();
    let local = Aligner::local(scorer).align(&genome, &query).unwrap();
    assert_eq!(global.score, local.score);
    assert_eq!(global.cigar, local.cigar);
}

#[test]
fn statistics_stop_at_skipped_reference_tail() {
    let scorer = nt_scorer();
    let reference = nt("r", "ACGTACGT");
    let query = nt("q", "ACGTAC");
    let cigar: Cigar = "6M2N".parse().unwrap();
    let (ref_row, query_row) = cigar.align(&reference, &query).unwrap();
    let stats = scorer.calc_stats(&ref_row, &query_row, 0);
    assert_eq!(stats.match_count, 6);
    assert_eq!(stats.identity_count, 6);
    assert_eq!(stats.begin, Some(0));
    assert_eq!(stats.end, Some(6));
    assert_eq!(stats.score, 12);
    assert_eq!(stats.ref_length, 8);
    assert_eq!(stats.delete_count, 0);
}
