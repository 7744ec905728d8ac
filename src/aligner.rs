use log::debug;

use crate::alignment_mode::AlignmentMode;
use crate::cigar::{Cigar, CigarOp};
use crate::scoring::{Alignable, Scorer};
use crate::traceback::{
    State, TracebackMatrix, FROM_MATCH, FROM_QUERY_GAP, FROM_REF_GAP, QUERY_GAP_EXTENDED,
    REF_GAP_EXTENDED, START,
};
use crate::{AlignerError, Result};

const NEG_INF: i32 = i32::MIN / 4;

#[inline(always)]
fn add(score: i32, delta: i32) -> i32 {
    if score <= NEG_INF {
        NEG_INF
    } else {
        score.saturating_add(delta).max(NEG_INF)
    }
}

/// Engine output: the optimal score and its edit script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub score: i32,
    pub cigar: Cigar,
}

impl Solution {
    /// Zero score with the whole reference skipped, used for empty queries.
    pub fn unaligned(ref_len: usize) -> Self {
        let mut cigar = Cigar::new();
        cigar.push(CigarOp::RefSkipped, ref_len);
        Self { score: 0, cigar }
    }
}

// Score of the best predecessor among the three states, ties to Match then RefGap.
#[inline(always)]
fn best_of(m: i32, r: i32, q: i32) -> (i32, u8) {
    if m >= r && m >= q {
        (m, FROM_MATCH)
    } else if r >= q {
        (r, FROM_REF_GAP)
    } else {
        (q, FROM_QUERY_GAP)
    }
}

/// Three-state affine gap aligner, generic over the scorer.
///
/// Scores live in rolling rows; only the one-byte traceback cells are kept
/// for the whole matrix.
#[derive(Debug, Clone)]
pub struct Aligner<S: Scorer> {
    scorer: S,
    mode: AlignmentMode,
}

impl<S: Scorer> Aligner<S> {
    pub fn new(scorer: S, mode: AlignmentMode) -> Self {
        Self { scorer, mode }
    }

    pub fn global(scorer: S) -> Self {
        Self::new(scorer, AlignmentMode::Global)
    }

    pub fn local(scorer: S) -> Self {
        Self::new(scorer, AlignmentMode::Local)
    }

    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    /// Aligns a gap-free query against the reference.
    pub fn align(&self, reference: &S::Reference, query: &S::Query) -> Result<Solution> {
        if query.is_empty() {
            return Err(AlignerError::EmptyQuery);
        }
        self.scorer.check(reference, query)?;

        let n = reference.len();
        let m = query.len();
        let local = self.mode == AlignmentMode::Local;
        debug!("DP {} x {} ({})", n + 1, m + 1, self.mode);

        let mut traceback = TracebackMatrix::new(n + 1, m + 1);

        let mut m_prev = vec![NEG_INF; m + 1];
        let mut r_prev = vec![NEG_INF; m + 1];
        let mut q_prev = vec![NEG_INF; m + 1];
        let mut q_run_prev = vec![0usize; m + 1];
        let mut m_cur = vec![NEG_INF; m + 1];
        let mut r_cur = vec![NEG_INF; m + 1];
        let mut q_cur = vec![NEG_INF; m + 1];
        let mut q_run_cur = vec![0usize; m + 1];

        let mut best_local = (0, 0, 0);

        for i in 0..=n {
            let mut r_run = 0usize;
            for j in 0..=m {
                let mut cell = 0u8;

                let m_val = if i == 0 || j == 0 {
                    cell |= START;
                    if local || (i == 0 && j == 0) {
                        0
                    } else {
                        NEG_INF
                    }
                } else {
                    let subst = self.scorer.score_extend(reference, query, i - 1, j - 1);
                    let (prev, pred) = best_of(m_prev[j - 1], r_prev[j - 1], q_prev[j - 1]);
                    if local && prev <= 0 {
                        cell |= START;
                        subst
                    } else {
                        cell |= pred;
                        add(prev, subst)
                    }
                };

                let r_val = if j == 0 {
                    NEG_INF
                } else {
                    let open = if m_cur[j - 1] > NEG_INF {
                        add(m_cur[j - 1], self.scorer.score_open_ref_gap(reference, query, i, j - 1))
                    } else {
                        NEG_INF
                    };
                    let extend = if r_cur[j - 1] > NEG_INF {
                        let gap = self
                            .scorer
                            .score_extend_ref_gap(reference, query, i, j - 1, r_run + 1);
                        add(r_cur[j - 1], gap)
                    } else {
                        NEG_INF
                    };
                    if extend > open {
                        cell |= REF_GAP_EXTENDED;
                        r_run += 1;
                        extend
                    } else {
                        r_run = 1;
                        open
                    }
                };

                let q_val = if i == 0 {
                    NEG_INF
                } else {
                    let open = if m_prev[j] > NEG_INF {
                        add(m_prev[j], self.scorer.score_open_query_gap(reference, query, i - 1, j))
                    } else {
                        NEG_INF
                    };
                    let extend = if q_prev[j] > NEG_INF {
                        let gap = self.scorer.score_extend_query_gap(
                            reference,
                            query,
                            i - 1,
                            j,
                            q_run_prev[j] + 1,
                        );
                        add(q_prev[j], gap)
                    } else {
                        NEG_INF
                    };
                    if extend > open {
                        cell |= QUERY_GAP_EXTENDED;
                        q_run_cur[j] = q_run_prev[j] + 1;
                        extend
                    } else {
                        q_run_cur[j] = 1;
                        open
                    }
                };

                m_cur[j] = m_val;
                r_cur[j] = r_val;
                q_cur[j] = q_val;
                traceback.set(i, j, cell);

                if local && i > 0 && j > 0 && m_val > best_local.0 {
                    best_local = (m_val, i, j);
                }
            }
            std::mem::swap(&mut m_prev, &mut m_cur);
            std::mem::swap(&mut r_prev, &mut r_cur);
            std::mem::swap(&mut q_prev, &mut q_cur);
            std::mem::swap(&mut q_run_prev, &mut q_run_cur);
        }

        if local {
            let (score, end_i, end_j) = best_local;
            if score <= 0 {
                let mut cigar = Cigar::new();
                cigar.push(CigarOp::RefGap, m);
                cigar.push(CigarOp::RefSkipped, n);
                return Ok(Solution { score: 0, cigar });
            }
            let path = traceback.trace((end_i, end_j), State::Match)?;
            let (start_i, start_j) = path.start;
            debug!("Local window ref {start_i}..{end_i}, query {start_j}..{end_j}");

            let mut cigar = Cigar::new();
            cigar.push(CigarOp::RefSkipped, start_i);
            cigar.push(CigarOp::RefGap, start_j);
            for item in path.cigar.items() {
                cigar.push(item.op, item.length);
            }
            cigar.push(CigarOp::RefGap, m - end_j);
            cigar.push(CigarOp::RefSkipped, n - end_i);
            return Ok(Solution { score, cigar });
        }

        // Rows were swapped after the last iteration, so the final row is in *_prev.
        let (score, state) = {
            let (mv, rv, qv) = (m_prev[m], r_prev[m], q_prev[m]);
            match best_of(mv, rv, qv) {
                (s, FROM_MATCH) => (s, State::Match),
                (s, FROM_REF_GAP) => (s, State::RefGap),
                (s, _) => (s, State::QueryGap),
            }
        };
        let path = traceback.trace((n, m), state)?;
        if path.start != (0, 0) {
            return Err(AlignerError::TracebackError(format!(
                "global path starts at {:?}",
                path.start
            )));
        }
        Ok(Solution {
            score,
            cigar: path.cigar,
        })
    }
}
