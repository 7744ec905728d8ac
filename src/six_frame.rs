use crate::alphabet::{translate_codon, AminoAcid, Nucleotide};
use crate::scoring::Alignable;
use crate::sequence::NtSequence;

/// Read-only codon interpretation of a nucleotide sequence.
///
/// Every position `j >= 2` knows the residue of the codon `j-2..=j`, which
/// covers all three forward frames at once.
#[derive(Debug, Clone)]
pub struct SixFrameView {
    sequence: NtSequence,
    codons: Vec<AminoAcid>,
}

impl SixFrameView {
    pub fn new(sequence: NtSequence) -> Self {
        let codons = sequence
            .symbols()
            .windows(3)
            .map(|w| translate_codon([w[0], w[1], w[2]]))
            .collect();
        Self { sequence, codons }
    }

    pub fn sequence(&self) -> &NtSequence {
        &self.sequence
    }

    #[inline]
    pub fn nucleotide(&self, j: usize) -> Nucleotide {
        self.sequence[j]
    }

    /// Residue of the codon whose last base sits at `j`.
    #[inline]
    pub fn codon_ending_at(&self, j: usize) -> Option<AminoAcid> {
        j.checked_sub(2).and_then(|start| self.codons.get(start).copied())
    }
}

impl Alignable for SixFrameView {
    fn len(&self) -> usize {
        self.sequence.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(s: &str) -> SixFrameView {
        SixFrameView::new(NtSequence::from_text("q", s.as_bytes()).unwrap())
    }

    #[test]
    fn test_codon_ending_at() {
        let v = view("ATGGCC");
        assert_eq!(v.codon_ending_at(0), None);
        assert_eq!(v.codon_ending_at(1), None);
        assert_eq!(v.codon_ending_at(2), Some(AminoAcid::Met));
        assert_eq!(v.codon_ending_at(3), Some(AminoAcid::Trp));
        assert_eq!(v.codon_ending_at(5), Some(AminoAcid::Ala));
        assert_eq!(v.codon_ending_at(6), None);
    }
}
