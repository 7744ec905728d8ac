use std::fmt;

use crate::alphabet::Symbol;
use crate::scoring::SimpleScorer;
use crate::sequence::Sequence;

/// Counters derived from one aligned (gapped, equal-length) pair.
///
/// `begin` and `end` are reference coordinates of the first and one past the
/// last matched column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    pub score: i32,
    pub ref_length: usize,
    pub begin: Option<usize>,
    pub end: Option<usize>,
    pub coverage: usize,
    pub match_count: usize,
    pub identity_count: usize,
    pub insert_events: usize,
    pub insert_count: usize,
    pub delete_events: usize,
    pub delete_count: usize,
    pub frameshifts: usize,
    pub misaligned: usize,
    pub ambiguities: usize,
    pub stop_codons: usize,
}

impl AlignmentStats {
    pub fn identity(&self) -> f64 {
        if self.match_count == 0 {
            0.0
        } else {
            self.identity_count as f64 / self.match_count as f64
        }
    }
}

impl fmt::Display for AlignmentStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pos = |p: Option<usize>| p.map_or_else(|| "-".to_string(), |v| v.to_string());
        write!(
            f,
            "score {} refLength {} begin {} end {} coverage {} matches {} identities {} ({:.1}%) \
             inserts {} ({} events) deletes {} ({} events) frameshifts {} misaligned {} \
             ambiguities {} stopcodons {}",
            self.score,
            self.ref_length,
            pos(self.begin),
            pos(self.end),
            self.coverage,
            self.match_count,
            self.identity_count,
            100.0 * self.identity(),
            self.insert_count,
            self.insert_events,
            self.delete_count,
            self.delete_events,
            self.frameshifts,
            self.misaligned,
            self.ambiguities,
            self.stop_codons
        )
    }
}

/// Per-column scores between the first matched column and the trimmed end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreTrace {
    pub begin: usize,
    pub end: usize,
    pub scores: Vec<i32>,
}

impl ScoreTrace {
    /// Sums over every window of `window` consecutive columns.
    pub fn windowed(&self, window: usize) -> Vec<i32> {
        if window == 0 {
            return Vec::new();
        }
        self.scores.windows(window).map(|w| w.iter().sum()).collect()
    }
}

// Gap run and missing-data state of one row while walking the columns.
#[derive(Default)]
struct RowState {
    gap: bool,
    missing: bool,
}

impl<T: Symbol> SimpleScorer<T> {
    /// Derives statistics for an aligned pair, adding `frameshifts` times the
    /// frameshift cost to the score.
    pub fn calc_stats(&self, reference: &Sequence<T>, query: &Sequence<T>, frameshifts: usize) -> AlignmentStats {
        self.walk_columns(reference, query, frameshifts, None)
    }

    pub fn calc_stats_with_trace(&self, reference: &Sequence<T>, query: &Sequence<T>) -> (AlignmentStats, ScoreTrace) {
        let mut trace = ScoreTrace::default();
        let stats = self.walk_columns(reference, query, 0, Some(&mut trace));
        (stats, trace)
    }

    fn walk_columns(
        &self,
        reference: &Sequence<T>,
        query: &Sequence<T>,
        frameshifts: usize,
        mut trace: Option<&mut ScoreTrace>,
    ) -> AlignmentStats {
        // Columns past the end of either row read as missing data.
        let at = |seq: &Sequence<T>, i: usize| seq.get(i).unwrap_or(T::MISSING);

        let mut stats = AlignmentStats::default();
        let query_end = (0..query.len())
            .rev()
            .find(|&i| !at(reference, i).is_missing() && !at(query, i).is_missing())
            .map_or(0, |i| i + 1);
        if query_end == 0 {
            return stats;
        }

        let mut ref_row = RowState {
            gap: false,
            missing: true,
        };
        let mut query_row = RowState {
            gap: false,
            missing: true,
        };
        let mut ref_pos = 0;

        for i in 0..query_end {
            let (r, q) = (at(reference, i), at(query, i));
            let mut score = 0;
            let mut misaligned = false;

            for (symbol, next, row, count, events) in [
                (r, at(reference, i + 1), &mut ref_row, &mut stats.insert_count, &mut stats.insert_events),
                (q, at(query, i + 1), &mut query_row, &mut stats.delete_count, &mut stats.delete_events),
            ] {
                if symbol.is_gap() {
                    *count += 1;
                    if row.gap {
                        score += self.gap_extend();
                    } else {
                        score += self.gap_open();
                        *events += 1;
                    }
                    row.gap = true;
                    row.missing = false;
                } else if symbol.is_missing() {
                    row.gap = false;
                    row.missing = true;
                } else if symbol.is_misaligned() {
                    // leaves the gap and missing state of the row untouched
                    if !row.missing && !next.is_missing() {
                        score += self.misalignment_cost();
                        stats.misaligned += 1;
                        misaligned = true;
                    }
                } else {
                    row.gap = false;
                    row.missing = false;
                }
            }

            let query_present = !query_row.gap && !query_row.missing;
            if query_present {
                if q.is_ambiguity() {
                    stats.ambiguities += 1;
                }
                if q.is_stop_codon() {
                    stats.stop_codons += 1;
                }
            }

            if query_present && !ref_row.gap && !ref_row.missing {
                stats.match_count += 1;
                if !q.is_ambiguity() && !misaligned {
                    score += self.substitution(r, q);
                }
                if stats.begin.is_none() {
                    stats.begin = Some(ref_pos);
                    if let Some(trace) = trace.as_deref_mut() {
                        trace.begin = i;
                        trace.end = query_end;
                        trace.scores = vec![0; query_end - i];
                    }
                }
                stats.end = Some(ref_pos + 1);
                if r == q {
                    stats.identity_count += 1;
                }
            }

            if let Some(trace) = trace.as_deref_mut() {
                if stats.begin.is_some() && i >= trace.begin && i < trace.end {
                    trace.scores[i - trace.begin] = score;
                }
            }

            stats.score += score;
            if !ref_row.gap && !ref_row.missing {
                ref_pos += 1;
            }
        }

        stats.ref_length = ref_pos + reference.len().saturating_sub(query_end);
        stats.coverage = stats.match_count + stats.delete_count;
        stats.score += frameshifts as i32 * self.frameshift_cost();
        stats.frameshifts = frameshifts;
        stats
    }
}
