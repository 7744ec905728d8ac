use crate::cigar::{Cigar, CigarOp};
use crate::{AlignerError, Result};

// Bits 0-1 of a cell: predecessor of the Match state.
pub(crate) const FROM_MATCH: u8 = 0;
pub(crate) const FROM_REF_GAP: u8 = 1;
pub(crate) const FROM_QUERY_GAP: u8 = 2;
pub(crate) const START: u8 = 3;
const PRED_MASK: u8 = 0b11;

// Set when the gap state extended its own run instead of opening from Match.
pub(crate) const REF_GAP_EXTENDED: u8 = 0b0100;
pub(crate) const QUERY_GAP_EXTENDED: u8 = 0b1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Match,
    RefGap,
    QueryGap,
}

/// One byte per DP cell, `(|ref| + 1) x (|query| + 1)`, row-major.
pub(crate) struct TracebackMatrix {
    data: Vec<u8>,
    rows: usize,
    cols: usize,
}

/// Result of walking the matrix back from an end cell.
#[derive(Debug)]
pub(crate) struct TracedPath {
    pub start: (usize, usize),
    pub cigar: Cigar,
}

impl TracebackMatrix {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![0; rows * cols],
            rows,
            cols,
        }
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.data[row * self.cols + col] = value;
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.data[row * self.cols + col]
    }

    /// Follows predecessor bits from `end` in `state` until a start cell.
    ///
    /// Boundary Match cells flagged `START` end the walk without consuming a
    /// column; interior ones (local restarts) consume their column first.
    pub fn trace(&self, end: (usize, usize), mut state: State) -> Result<TracedPath> {
        let (mut i, mut j) = end;
        if i >= self.rows || j >= self.cols {
            return Err(AlignerError::TracebackError(format!(
                "end cell ({i}, {j}) outside {}x{} matrix",
                self.rows, self.cols
            )));
        }
        let mut ops = Vec::new();

        loop {
            let cell = self.get(i, j);
            match state {
                State::Match => {
                    let pred = cell & PRED_MASK;
                    if i == 0 || j == 0 {
                        if pred != START {
                            return Err(AlignerError::TracebackError(format!(
                                "match state reached boundary cell ({i}, {j})"
                            )));
                        }
                        break;
                    }
                    ops.push(CigarOp::Match);
                    i -= 1;
                    j -= 1;
                    state = match pred {
                        FROM_MATCH => State::Match,
                        FROM_REF_GAP => State::RefGap,
                        FROM_QUERY_GAP => State::QueryGap,
                        _ => break,
                    };
                }
                State::RefGap => {
                    if j == 0 {
                        return Err(AlignerError::TracebackError(format!(
                            "reference gap state reached column 0 at row {i}"
                        )));
                    }
                    ops.push(CigarOp::RefGap);
                    j -= 1;
                    if cell & REF_GAP_EXTENDED == 0 {
                        state = State::Match;
                    }
                }
                State::QueryGap => {
                    if i == 0 {
                        return Err(AlignerError::TracebackError(format!(
                            "query gap state reached row 0 at column {j}"
                        )));
                    }
                    ops.push(CigarOp::QueryGap);
                    i -= 1;
                    if cell & QUERY_GAP_EXTENDED == 0 {
                        state = State::Match;
                    }
                }
            }
        }

        let mut cigar = Cigar::new();
        for op in ops.into_iter().rev() {
            cigar.push(op, 1);
        }
        Ok(TracedPath {
            start: (i, j),
            cigar,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_diagonal_with_gap() {
        // 2x1 query gap then match: path (0,0) -> (1,0) Q -> (2,1) M
        let mut tb = TracebackMatrix::new(3, 2);
        tb.set(0, 0, START);
        tb.set(1, 0, START);
        tb.set(2, 1, FROM_QUERY_GAP);
        let path = tb.trace((2, 1), State::Match).unwrap();
        assert_eq!(path.start, (0, 0));
        assert_eq!(path.cigar.to_string(), "1D1M");
    }

    #[test]
    fn test_trace_local_restart() {
        let mut tb = TracebackMatrix::new(4, 4);
        tb.set(2, 2, START);
        tb.set(3, 3, FROM_MATCH);
        let path = tb.trace((3, 3), State::Match).unwrap();
        assert_eq!(path.start, (1, 1));
        assert_eq!(path.cigar.to_string(), "2M");
    }

    #[test]
    fn test_trace_rejects_broken_boundary() {
        let mut tb = TracebackMatrix::new(2, 2);
        tb.set(1, 1, FROM_MATCH);
        tb.set(0, 0, FROM_MATCH);
        assert!(tb.trace((1, 1), State::Match).is_err());
    }
}
