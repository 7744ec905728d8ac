//! Run-length edit scripts over reference/query consumption.

use std::fmt;
use std::str::FromStr;

use crate::alphabet::Symbol;
use crate::sequence::Sequence;
use crate::{AlignerError, Result};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CigarOp {
    /// Match or substitution, consumes both sequences.
    Match = b'M',
    /// Gap in the reference: a query symbol is inserted.
    RefGap = b'I',
    /// Gap in the query: a reference symbol is deleted.
    QueryGap = b'D',
    /// Reference stretch left outside the alignment.
    RefSkipped = b'N',
}

impl CigarOp {
    #[inline(always)]
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'M' => Some(Self::Match),
            b'I' => Some(Self::RefGap),
            b'D' => Some(Self::QueryGap),
            b'N' => Some(Self::RefSkipped),
            _ => None,
        }
    }

    #[inline(always)]
    pub const fn to_byte(self) -> u8 {
        self as u8
    }

    #[inline(always)]
    pub const fn consumes_query(self) -> bool {
        matches!(self, Self::Match | Self::RefGap)
    }

    #[inline(always)]
    pub const fn consumes_ref(self) -> bool {
        matches!(self, Self::Match | Self::QueryGap | Self::RefSkipped)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CigarItem {
    pub op: CigarOp,
    pub length: usize,
}

impl CigarItem {
    pub fn new(op: CigarOp, length: usize) -> Self {
        Self { op, length }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cigar {
    items: Vec<CigarItem>,
}

impl Cigar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item, merging it into the last one when the ops agree.
    /// Zero-length items are dropped.
    pub fn push(&mut self, op: CigarOp, length: usize) {
        if length == 0 {
            return;
        }
        match self.items.last_mut() {
            Some(last) if last.op == op => last.length += length,
            _ => self.items.push(CigarItem::new(op, length)),
        }
    }

    pub fn items(&self) -> &[CigarItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ref_span(&self) -> usize {
        self.items
            .iter()
            .filter(|it| it.op.consumes_ref())
            .map(|it| it.length)
            .sum()
    }

    pub fn query_span(&self) -> usize {
        self.items
            .iter()
            .filter(|it| it.op.consumes_query())
            .map(|it| it.length)
            .sum()
    }

    /// Number of columns in the reconstructed alignment.
    pub fn columns(&self) -> usize {
        self.items.iter().map(|it| it.length).sum()
    }

    /// Expands the script over gap-free inputs into two equal-length rows.
    ///
    /// Insertions put `GAP` on the reference row, deletions put `GAP` on the
    /// query row and skipped reference gets `MISSING` on the query row.
    pub fn align<T: Symbol>(
        &self,
        reference: &Sequence<T>,
        query: &Sequence<T>,
    ) -> Result<(Sequence<T>, Sequence<T>)> {
        if self.ref_span() != reference.len() || self.query_span() != query.len() {
            return Err(AlignerError::CigarMismatch {
                ref_span: self.ref_span(),
                query_span: self.query_span(),
                ref_len: reference.len(),
                query_len: query.len(),
            });
        }

        let width = self.columns();
        let mut ref_row = Vec::with_capacity(width);
        let mut query_row = Vec::with_capacity(width);
        let mut ref_iter = reference.iter();
        let mut query_iter = query.iter();

        for item in &self.items {
            for _ in 0..item.length {
                let r = if item.op.consumes_ref() {
                    ref_iter.next().unwrap_or(T::MISSING)
                } else {
                    T::GAP
                };
                let q = match item.op {
                    CigarOp::RefSkipped => T::MISSING,
                    CigarOp::QueryGap => T::GAP,
                    _ => query_iter.next().unwrap_or(T::MISSING),
                };
                ref_row.push(r);
                query_row.push(q);
            }
        }

        Ok((
            Sequence::new(reference.name(), ref_row),
            Sequence::new(query.name(), query_row),
        ))
    }
}

impl FromIterator<CigarItem> for Cigar {
    fn from_iter<I: IntoIterator<Item = CigarItem>>(iter: I) -> Self {
        let mut cigar = Cigar::new();
        for item in iter {
            cigar.push(item.op, item.length);
        }
        cigar
    }
}

impl fmt::Display for Cigar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.items.is_empty() {
            return write!(f, "*");
        }
        for item in &self.items {
            write!(f, "{}{}", item.length, item.op.to_byte() as char)?;
        }
        Ok(())
    }
}

impl FromStr for Cigar {
    type Err = AlignerError;

    fn from_str(s: &str) -> Result<Self> {
        let mut cigar = Cigar::new();
        if s == "*" {
            return Ok(cigar);
        }
        let mut length: Option<usize> = None;
        for b in s.bytes() {
            if b.is_ascii_digit() {
                let digit = (b - b'0') as usize;
                let next = length.unwrap_or(0).checked_mul(10).and_then(|l| l.checked_add(digit));
                length = Some(next.ok_or_else(|| AlignerError::InvalidCigar(format!("length overflows in {s}")))?);
                continue;
            }
            let op = CigarOp::from_byte(b)
                .ok_or_else(|| AlignerError::InvalidCigar(format!("unknown op {:?} in {s}", b as char)))?;
            let len = length
                .take()
                .ok_or_else(|| AlignerError::InvalidCigar(format!("missing length in {s}")))?;
            cigar.push(op, len);
        }
        if length.is_some() {
            return Err(AlignerError::InvalidCigar(format!("trailing length in {s}")));
        }
        Ok(cigar)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::Nucleotide;
    use crate::sequence::NtSequence;

    fn nt(s: &str) -> NtSequence {
        NtSequence::from_text("s", s.as_bytes()).unwrap()
    }

    #[test]
    fn test_push_merges_adjacent() {
        let mut cigar = Cigar::new();
        cigar.push(CigarOp::Match, 3);
        cigar.push(CigarOp::Match, 2);
        cigar.push(CigarOp::QueryGap, 0);
        cigar.push(CigarOp::RefGap, 1);
        assert_eq!(cigar.items().len(), 2);
        assert_eq!(cigar.to_string(), "5M1I");
    }

    #[test]
    fn test_spans() {
        let cigar: Cigar = "3M1D4M2I".parse().unwrap();
        assert_eq!(cigar.ref_span(), 8);
        assert_eq!(cigar.query_span(), 9);
        assert_eq!(cigar.columns(), 10);
    }

    #[test]
    fn test_parse_errors() {
        assert!("3Q".parse::<Cigar>().is_err());
        assert!("M".parse::<Cigar>().is_err());
        assert!("3M4".parse::<Cigar>().is_err());
        assert!(matches!(
            "99999999999999999999999M".parse::<Cigar>(),
            Err(AlignerError::InvalidCigar(_))
        ));
        assert!("*".parse::<Cigar>().unwrap().is_empty());
        assert_eq!(Cigar::new().to_string(), "*");
    }

    #[test]
    fn test_align_reconstruction() {
        let cigar: Cigar = "3M1D4M".parse().unwrap();
        let (r, q) = cigar.align(&nt("ACGTACGT"), &nt("ACGACGT")).unwrap();
        assert_eq!(r.to_text(), "ACGTACGT");
        assert_eq!(q.to_text(), "ACG-ACGT");

        let cigar: Cigar = "2N2M1I".parse().unwrap();
        let (r, q) = cigar.align(&nt("ACGT"), &nt("GTA")).unwrap();
        assert_eq!(r.to_text(), "ACGT-");
        assert_eq!(q.to_text(), "??GTA");
        assert_eq!(q[0], Nucleotide::Missing);
    }

    #[test]
    fn test_align_rejects_span_mismatch() {
        let cigar: Cigar = "4M".parse().unwrap();
        assert!(matches!(
            cigar.align(&nt("ACG"), &nt("ACGT")),
            Err(AlignerError::CigarMismatch { .. })
        ));
    }
}
