use std::marker::PhantomData;

use crate::alphabet::Symbol;
use crate::cigar::{Cigar, CigarOp};
use crate::matrix::SubstitutionMatrix;
use crate::sequence::Sequence;
use crate::{AlignerError, Result};

/// Anything the engine can walk position by position.
pub trait Alignable {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Symbol> Alignable for Sequence<T> {
    fn len(&self) -> usize {
        Sequence::len(self)
    }
}

/// Substitution and affine gap costs consumed by the alignment engine.
///
/// A reference gap inserts `query[query_i]` after `ref_pos` consumed reference
/// symbols; a query gap deletes `reference[ref_i]` after `query_pos` consumed
/// query symbols. Gaps at the trailing edge of the gapped sequence cost nothing.
/// `run_len` counts the gap run including the current position, so it is at
/// least 2 for an extension.
pub trait Scorer: Send + Sync {
    type Reference: Alignable + ?Sized;
    type Query: Alignable + ?Sized;

    fn score_extend(
        &self,
        reference: &Self::Reference,
        query: &Self::Query,
        ref_i: usize,
        query_i: usize,
    ) -> i32;

    fn score_open_ref_gap(
        &self,
        reference: &Self::Reference,
        query: &Self::Query,
        ref_pos: usize,
        query_i: usize,
    ) -> i32;

    fn score_extend_ref_gap(
        &self,
        reference: &Self::Reference,
        query: &Self::Query,
        ref_pos: usize,
        query_i: usize,
        run_len: usize,
    ) -> i32;

    fn score_open_query_gap(
        &self,
        reference: &Self::Reference,
        query: &Self::Query,
        ref_i: usize,
        query_pos: usize,
    ) -> i32;

    fn score_extend_query_gap(
        &self,
        reference: &Self::Reference,
        query: &Self::Query,
        ref_i: usize,
        query_pos: usize,
        run_len: usize,
    ) -> i32;

    /// Rejects inputs the scorer cannot handle before any DP work starts.
    fn check(&self, _reference: &Self::Reference, _query: &Self::Query) -> Result<()> {
        Ok(())
    }
}

/// Matrix lookup plus constant affine gap costs over a single alphabet.
#[derive(Debug, Clone)]
pub struct SimpleScorer<T: Symbol> {
    matrix: SubstitutionMatrix,
    gap_open: i32,
    gap_extend: i32,
    frameshift_cost: i32,
    misalignment_cost: i32,
    _alphabet: PhantomData<fn() -> T>,
}

impl<T: Symbol> SimpleScorer<T> {
    pub fn new(matrix: SubstitutionMatrix, gap_open: i32, gap_extend: i32) -> Result<Self> {
        if matrix.dim() != T::COUNT {
            return Err(AlignerError::InvalidConfig(format!(
                "matrix {} has dimension {}, alphabet needs {}",
                matrix.name(),
                matrix.dim(),
                T::COUNT
            )));
        }
        Ok(Self {
            matrix,
            gap_open,
            gap_extend,
            frameshift_cost: 0,
            misalignment_cost: 0,
            _alphabet: PhantomData,
        })
    }

    pub fn with_frameshift_cost(mut self, cost: i32) -> Self {
        self.frameshift_cost = cost;
        self
    }

    pub fn with_misalignment_cost(mut self, cost: i32) -> Self {
        self.misalignment_cost = cost;
        self
    }

    #[inline]
    pub fn substitution(&self, a: T, b: T) -> i32 {
        self.matrix.score(a, b)
    }

    pub fn matrix(&self) -> &SubstitutionMatrix {
        &self.matrix
    }

    pub fn gap_open(&self) -> i32 {
        self.gap_open
    }

    pub fn gap_extend(&self) -> i32 {
        self.gap_extend
    }

    pub fn frameshift_cost(&self) -> i32 {
        self.frameshift_cost
    }

    pub fn misalignment_cost(&self) -> i32 {
        self.misalignment_cost
    }
}

impl<T: Symbol> Scorer for SimpleScorer<T> {
    type Reference = Sequence<T>;
    type Query = Sequence<T>;

    fn score_extend(&self, reference: &Sequence<T>, query: &Sequence<T>, ref_i: usize, query_i: usize) -> i32 {
        self.matrix.score(reference[ref_i], query[query_i])
    }

    fn score_open_ref_gap(&self, reference: &Sequence<T>, _query: &Sequence<T>, ref_pos: usize, _query_i: usize) -> i32 {
        if ref_pos == reference.len() {
            0
        } else {
            self.gap_open
        }
    }

    fn score_extend_ref_gap(
        &self,
        reference: &Sequence<T>,
        _query: &Sequence<T>,
        ref_pos: usize,
        _query_i: usize,
        _run_len: usize,
    ) -> i32 {
        if ref_pos == reference.len() {
            0
        } else {
            self.gap_extend
        }
    }

    fn score_open_query_gap(&self, _reference: &Sequence<T>, query: &Sequence<T>, _ref_i: usize, query_pos: usize) -> i32 {
        if query_pos == query.len() {
            0
        } else {
            self.gap_open
        }
    }

    fn score_extend_query_gap(
        &self,
        _reference: &Sequence<T>,
        query: &Sequence<T>,
        _ref_i: usize,
        query_pos: usize,
        _run_len: usize,
    ) -> i32 {
        if query_pos == query.len() {
            0
        } else {
            self.gap_extend
        }
    }
}

/// Re-scores an edit script through the scorer contract.
///
/// Skipped reference stretches contribute nothing. For a global solution the
/// result equals the engine score.
pub fn score_cigar<S: Scorer>(
    scorer: &S,
    reference: &S::Reference,
    query: &S::Query,
    cigar: &Cigar,
) -> Result<i32> {
    let (ref_len, query_len) = (reference.len(), query.len());
    if cigar.ref_span() != ref_len || cigar.query_span() != query_len {
        return Err(AlignerError::CigarMismatch {
            ref_span: cigar.ref_span(),
            query_span: cigar.query_span(),
            ref_len,
            query_len,
        });
    }

    let (mut i, mut j) = (0, 0);
    let mut total = 0;
    for item in cigar.items() {
        match item.op {
            CigarOp::Match => {
                for _ in 0..item.length {
                    total += scorer.score_extend(reference, query, i, j);
                    i += 1;
                    j += 1;
                }
            }
            CigarOp::RefGap => {
                for k in 1..=item.length {
                    total += if k == 1 {
                        scorer.score_open_ref_gap(reference, query, i, j)
                    } else {
                        scorer.score_extend_ref_gap(reference, query, i, j, k)
                    };
                    j += 1;
                }
            }
            CigarOp::QueryGap => {
                for k in 1..=item.length {
                    total += if k == 1 {
                        scorer.score_open_query_gap(reference, query, i, j)
                    } else {
                        scorer.score_extend_query_gap(reference, query, i, j, k)
                    };
                    i += 1;
                }
            }
            CigarOp::RefSkipped => i += item.length,
        }
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Nucleotide;
    use crate::cigar::CigarItem;
    use crate::sequence::NtSequence;

    fn scorer() -> SimpleScorer<Nucleotide> {
        SimpleScorer::new(SubstitutionMatrix::nucleotide(2, -2), -10, -1).unwrap()
    }

    fn nt(s: &str) -> NtSequence {
        NtSequence::from_text("s", s.as_bytes()).unwrap()
    }

    #[test]
    fn test_rejects_wrong_matrix_dimension() {
        let res = SimpleScorer::<Nucleotide>::new(SubstitutionMatrix::blosum62(), -10, -1);
        assert!(matches!(res, Err(AlignerError::InvalidConfig(_))));
    }

    #[test]
    fn test_trailing_gaps_are_free() {
        let s = scorer();
        let (r, q) = (nt("ACGT"), nt("AC"));
        assert_eq!(s.score_open_ref_gap(&r, &q, 4, 1), 0);
        assert_eq!(s.score_open_ref_gap(&r, &q, 2, 1), -10);
        assert_eq!(s.score_open_query_gap(&r, &q, 2, 2), 0);
        assert_eq!(s.score_extend_query_gap(&r, &q, 3, 2, 2), 0);
        assert_eq!(s.score_extend_query_gap(&r, &q, 1, 1, 2), -1);
    }

    #[test]
    fn test_score_cigar_interior_deletion() {
        let s = scorer();
        let cigar: Cigar = [
            CigarItem::new(CigarOp::Match, 3),
            CigarItem::new(CigarOp::QueryGap, 1),
            CigarItem::new(CigarOp::Match, 4),
        ]
        .into_iter()
        .collect();
        let score = score_cigar(&s, &nt("ACGTACGT"), &nt("ACGACGT"), &cigar).unwrap();
        assert_eq!(score, 4);
    }

    #[test]
    fn test_score_cigar_affine_run() {
        let s = scorer();
        let cigar: Cigar = "2M3D2M".parse().unwrap();
        let score = score_cigar(&s, &nt("ACGGGTT"), &nt("ACTT"), &cigar).unwrap();
        assert_eq!(score, 8 + (-10 + 2 * -1));
    }

    #[test]
    fn test_score_cigar_span_mismatch() {
        let cigar: Cigar = "3M".parse().unwrap();
        let res = score_cigar(&scorer(), &nt("ACGT"), &nt("ACG"), &cigar);
        assert!(matches!(res, Err(AlignerError::CigarMismatch { .. })));
    }
}
