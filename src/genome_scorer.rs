use crate::alphabet::{AminoAcid, Nucleotide, Symbol};
use crate::genome::Genome;
use crate::scoring::{Scorer, SimpleScorer};
use crate::six_frame::SixFrameView;
use crate::{AlignerError, Result};

/// Nucleotide scoring blended with codon-level scoring inside annotated CDS.
///
/// A match step that completes a reference codon also scores the reference
/// residue against the query codon ending at the same column (or within
/// `frame_window` columns after it). An indel with `n` bases inside a CDS costs
/// the amino acid gap costs of `ceil(n / 3)` codons plus one frameshift charge
/// when `n` is not a multiple of three. Each gap step adds the difference this
/// makes, so a run never collects a frameshift refund it did not pay.
#[derive(Debug, Clone)]
pub struct GenomeScorer {
    nt: SimpleScorer<Nucleotide>,
    aa: SimpleScorer<AminoAcid>,
    nt_weight: i32,
    aa_weight: i32,
    frame_window: usize,
}

impl GenomeScorer {
    pub fn new(
        nt: SimpleScorer<Nucleotide>,
        aa: SimpleScorer<AminoAcid>,
        nt_weight: i32,
        aa_weight: i32,
    ) -> Self {
        Self {
            nt,
            aa,
            nt_weight,
            aa_weight,
            frame_window: crate::FRAME_WINDOW,
        }
    }

    pub fn with_frame_window(mut self, frame_window: usize) -> Self {
        self.frame_window = frame_window.max(1);
        self
    }

    pub fn nt_scorer(&self) -> &SimpleScorer<Nucleotide> {
        &self.nt
    }

    pub fn aa_scorer(&self) -> &SimpleScorer<AminoAcid> {
        &self.aa
    }

    pub fn nt_weight(&self) -> i32 {
        self.nt_weight
    }

    pub fn aa_weight(&self) -> i32 {
        self.aa_weight
    }

    pub fn frame_window(&self) -> usize {
        self.frame_window
    }

    fn codon_score(&self, ref_aa: AminoAcid, query: &SixFrameView, query_i: usize) -> i32 {
        let mut any = false;
        let mut best: Option<i32> = None;
        for d in 0..self.frame_window {
            let Some(query_aa) = query.codon_ending_at(query_i + d) else {
                continue;
            };
            any = true;
            if query_aa.is_misaligned() {
                continue;
            }
            let s = self.aa.substitution(ref_aa, query_aa);
            best = Some(best.map_or(s, |b| b.max(s)));
        }
        if !any {
            return 0;
        }
        match best {
            Some(s) if !ref_aa.is_misaligned() => s,
            _ => self.aa.misalignment_cost(),
        }
    }

    // Amino acid cost of an indel with `coding` bases inside a CDS.
    fn coding_gap_cost(&self, coding: usize) -> i32 {
        if coding == 0 {
            return 0;
        }
        let codons = (coding + 2) / 3;
        let frameshift = if coding % 3 == 0 { 0 } else { self.aa.frameshift_cost() };
        self.aa.gap_open() + (codons as i32 - 1) * self.aa.gap_extend() + frameshift
    }

    fn coding_gap_step(&self, before: usize, after: usize) -> i32 {
        self.aa_weight * (self.coding_gap_cost(after) - self.coding_gap_cost(before))
    }
}

impl Scorer for GenomeScorer {
    type Reference = Genome;
    type Query = SixFrameView;

    fn score_extend(&self, genome: &Genome, query: &SixFrameView, ref_i: usize, query_i: usize) -> i32 {
        let site = genome.site(ref_i);
        let nt = site.nt_weight
            * self
                .nt
                .substitution(genome.reference()[ref_i], query.nucleotide(query_i));
        match site.codon {
            Some(ref_aa) => nt + site.aa_weight * self.codon_score(ref_aa, query, query_i),
            None => nt,
        }
    }

    fn score_open_ref_gap(&self, genome: &Genome, query: &SixFrameView, ref_pos: usize, query_i: usize) -> i32 {
        self.score_extend_ref_gap(genome, query, ref_pos, query_i, 1)
    }

    fn score_extend_ref_gap(
        &self,
        genome: &Genome,
        query: &SixFrameView,
        ref_pos: usize,
        query_i: usize,
        run_len: usize,
    ) -> i32 {
        let (reference, q) = (genome.reference(), query.sequence());
        let nt = if run_len == 1 {
            self.nt.score_open_ref_gap(reference, q, ref_pos, query_i)
        } else {
            self.nt.score_extend_ref_gap(reference, q, ref_pos, query_i, run_len)
        };
        if genome.inside_cds_between(ref_pos) {
            self.nt_weight * nt + self.coding_gap_step(run_len - 1, run_len)
        } else {
            self.nt_weight * nt
        }
    }

    fn score_open_query_gap(&self, genome: &Genome, query: &SixFrameView, ref_i: usize, query_pos: usize) -> i32 {
        self.score_extend_query_gap(genome, query, ref_i, query_pos, 1)
    }

    fn score_extend_query_gap(
        &self,
        genome: &Genome,
        query: &SixFrameView,
        ref_i: usize,
        query_pos: usize,
        run_len: usize,
    ) -> i32 {
        if query_pos == query.sequence().len() {
            return 0;
        }
        let (reference, q) = (genome.reference(), query.sequence());
        let nt = if run_len == 1 {
            self.nt.score_open_query_gap(reference, q, ref_i, query_pos)
        } else {
            self.nt.score_extend_query_gap(reference, q, ref_i, query_pos, run_len)
        };
        // the run deletes reference bases run_start..=ref_i
        let run_start = (ref_i + 1).saturating_sub(run_len);
        let before = genome.coding_bases(run_start..ref_i);
        let after = genome.coding_bases(run_start..ref_i + 1);
        self.nt_weight * nt + self.coding_gap_step(before, after)
    }

    fn check(&self, genome: &Genome, _query: &SixFrameView) -> Result<()> {
        if genome.is_preprocessed_for(self.nt_weight, self.aa_weight) {
            Ok(())
        } else {
            Err(AlignerError::NotPreprocessed {
                nt_weight: self.nt_weight,
                aa_weight: self.aa_weight,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::CdsFeature;
    use crate::matrix::SubstitutionMatrix;
    use crate::sequence::NtSequence;

    fn scorer() -> GenomeScorer {
        let nt = SimpleScorer::new(SubstitutionMatrix::nucleotide(2, -2), -10, -1).unwrap();
        let aa = SimpleScorer::new(SubstitutionMatrix::blosum62(), -6, -2)
            .unwrap()
            .with_frameshift_cost(-100)
            .with_misalignment_cost(-20);
        GenomeScorer::new(nt, aa, 1, 1)
    }

    fn genome(seq: &str, cds: Vec<std::ops::Range<usize>>) -> Genome {
        let reference = NtSequence::from_text("ref", seq.as_bytes()).unwrap();
        let feature = CdsFeature::new("orf", cds, 0, &reference).unwrap();
        let mut g = Genome::new(reference, vec![feature]).unwrap();
        g.preprocess(1, 1);
        g
    }

    fn view(seq: &str) -> SixFrameView {
        SixFrameView::new(NtSequence::from_text("q", seq.as_bytes()).unwrap())
    }

    #[test]
    fn test_codon_completion_adds_residue_score() {
        let s = scorer();
        let g = genome("ATGTGG", vec![0..6]);
        let q = view("ATGTGG");
        assert_eq!(s.score_extend(&g, &q, 0, 0), 2);
        assert_eq!(s.score_extend(&g, &q, 2, 2), 2 + 5);
        assert_eq!(s.score_extend(&g, &q, 5, 5), 2 + 11);
    }

    #[test]
    fn test_ambiguous_reference_codon_is_misaligned() {
        let s = scorer();
        let g = genome("NNNTGG", vec![0..6]);
        let q = view("ATGTGG");
        assert_eq!(s.score_extend(&g, &q, 2, 2), -20);
    }

    #[test]
    fn test_frameshift_charged_once_per_run() {
        let s = scorer();
        let g = genome("ATGAAACCCGGGTTT", vec![0..15]);
        let q = view("ATGAAAGGGTTT");
        let run = |len: usize| -> i32 {
            (1..=len)
                .map(|k| {
                    if k == 1 {
                        s.score_open_query_gap(&g, &q, 6 + k - 1, 6)
                    } else {
                        s.score_extend_query_gap(&g, &q, 6 + k - 1, 6, k)
                    }
                })
                .sum()
        };
        assert_eq!(run(1), -10 - 6 - 100);
        assert_eq!(run(2), -11 - 6 - 100);
        assert_eq!(run(3), -12 - 6);
        assert_eq!(run(4), -13 - 6 - 2 - 100);
        assert_eq!(run(6), -15 - 6 - 2);
    }

    #[test]
    fn test_insertion_run_frameshifts_unless_whole_codons() {
        let s = scorer();
        let g = genome("ATGAAACCCGGGTTT", vec![0..15]);
        let q = view("ATGAAATTTTTTCCCGGGTTT");
        for len in 1..=6usize {
            let total: i32 = (1..=len)
                .map(|k| {
                    if k == 1 {
                        s.score_open_ref_gap(&g, &q, 6, 6)
                    } else {
                        s.score_extend_ref_gap(&g, &q, 6, 6 + k - 1, k)
                    }
                })
                .sum();
            let nt = -10 - (len as i32 - 1);
            let codons = (len as i32 + 2) / 3;
            let aa = -6 - 2 * (codons - 1);
            let frameshift = if len % 3 == 0 { 0 } else { -100 };
            assert_eq!(total, nt + aa + frameshift, "insertion of {len}");
        }
    }

    #[test]
    fn test_frame_window_looks_ahead_for_codon() {
        let g = genome("ATGTGG", vec![0..6]);
        // query codons ending at 5 and 6 are CTG (L) and TGG (W)
        let q = view("ATGCTGG");
        assert_eq!(scorer().score_extend(&g, &q, 5, 5), 2 - 2);
        let wide = scorer().with_frame_window(2);
        assert_eq!(wide.frame_window(), 2);
        assert_eq!(wide.score_extend(&g, &q, 5, 5), 2 + 11);
        // no codon ends past the query
        assert_eq!(wide.score_extend(&g, &q, 5, 6), 2 + 11);
        assert_eq!(scorer().with_frame_window(0).frame_window(), 1);
    }

    #[test]
    fn test_codon_scores_follow_preprocessed_weights() {
        let s = GenomeScorer::new(scorer().nt_scorer().clone(), scorer().aa_scorer().clone(), 1, 3);
        let reference = NtSequence::from_text("ref", b"ATGTGG").unwrap();
        let feature = CdsFeature::new("orf", vec![0..6], 0, &reference).unwrap();
        let mut g = Genome::new(reference, vec![feature]).unwrap();
        g.preprocess(1, 3);
        let q = view("ATGTGG");
        assert!(s.check(&g, &q).is_ok());
        assert_eq!(s.score_extend(&g, &q, 5, 5), 2 + 3 * 11);
    }

    #[test]
    fn test_deletion_entering_cds_pays_only_coding_part() {
        let s = scorer();
        let g = genome("CCATGAAACCC", vec![2..11]);
        let q = view("CCAAACCC");
        // deletes ref 1, 2, 3: one base before the CDS and two inside it
        let total = s.score_open_query_gap(&g, &q, 1, 1)
            + s.score_extend_query_gap(&g, &q, 2, 1, 2)
            + s.score_extend_query_gap(&g, &q, 3, 1, 3);
        assert_eq!(total, -12 - 6 - 100);
    }

    #[test]
    fn test_gaps_outside_cds_are_nucleotide_only() {
        let s = scorer();
        let g = genome("ATGAAACCCGGG", vec![0..6]);
        let q = view("ATGAAAGGG");
        assert_eq!(s.score_open_query_gap(&g, &q, 7, 6), -10);
        assert_eq!(s.score_open_ref_gap(&g, &q, 8, 6), -10);
        assert_eq!(s.score_open_ref_gap(&g, &q, 3, 3), -10 - 6 - 100);
    }

    #[test]
    fn test_trailing_edge_free_at_both_levels() {
        let s = scorer();
        let g = genome("ATGAAACCC", vec![0..9]);
        let q = view("ATGAAA");
        assert_eq!(s.score_open_query_gap(&g, &q, 6, 6), 0);
        assert_eq!(s.score_extend_query_gap(&g, &q, 7, 6, 2), 0);
        assert_eq!(s.score_open_ref_gap(&g, &q, 9, 5), 0);
    }

    #[test]
    fn test_check_requires_preprocessing() {
        let s = scorer();
        let reference = NtSequence::from_text("ref", b"ATGAAA").unwrap();
        let mut g = Genome::new(reference, vec![]).unwrap();
        let q = view("ATG");
        assert!(matches!(s.check(&g, &q), Err(AlignerError::NotPreprocessed { .. })));
        g.preprocess(1, 2);
        assert!(s.check(&g, &q).is_err());
        g.preprocess(1, 1);
        assert!(s.check(&g, &q).is_ok());
    }
}
