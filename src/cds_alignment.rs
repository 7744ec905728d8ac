use crate::alphabet::{translate_codon, AminoAcid, Nucleotide, Symbol};
use crate::cigar::Cigar;
use crate::genome::CdsFeature;
use crate::sequence::{AaSequence, NtSequence, Sequence};
use crate::{AlignerError, Result};

/// Codon-synchronised view of a nucleotide alignment over one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdsAlignment {
    pub name: String,
    pub ref_aa: AaSequence,
    pub query_aa: AaSequence,
    pub ref_nt: NtSequence,
    pub query_nt: NtSequence,
    /// Amino acid index after each insertion run that broke the frame.
    pub ref_frameshifts: Vec<usize>,
    /// Amino acid index after each deletion run that broke the frame.
    pub query_frameshifts: Vec<usize>,
}

impl CdsAlignment {
    pub fn frameshift_count(&self) -> usize {
        self.ref_frameshifts.len() + self.query_frameshifts.len()
    }
}

/// Projects a nucleotide solution onto each feature.
///
/// `query` is the gap-free query the solution was computed for. Annotated CDS
/// and externally supplied protein features go through the same walk.
pub fn cds_alignments(
    reference: &NtSequence,
    features: &[CdsFeature],
    query: &NtSequence,
    cigar: &Cigar,
) -> Result<Vec<CdsAlignment>> {
    let (ref_row, query_row) = cigar.align(reference, query)?;

    let mut column_of = Vec::with_capacity(reference.len());
    for (c, symbol) in ref_row.iter().enumerate() {
        if !symbol.is_gap() {
            column_of.push(c);
        }
    }

    features
        .iter()
        .map(|feature| project(feature, &column_of, &ref_row, &query_row))
        .collect()
}

fn project(
    feature: &CdsFeature,
    column_of: &[usize],
    ref_row: &NtSequence,
    query_row: &NtSequence,
) -> Result<CdsAlignment> {
    let mut ref_nt = Vec::new();
    let mut query_nt = Vec::new();
    for range in feature.ranges() {
        let desync = |position| AlignerError::FrameDesync {
            name: feature.name().to_string(),
            position,
        };
        let first = *column_of.get(range.start).ok_or_else(|| desync(range.start))?;
        let last = *column_of.get(range.end - 1).ok_or_else(|| desync(range.end - 1))?;
        for c in first..=last {
            ref_nt.push(ref_row[c]);
            query_nt.push(query_row[c]);
        }
    }

    let mut walker = CodonWalker::new(feature.frame_offset());
    for (&r, &q) in ref_nt.iter().zip(&query_nt) {
        walker.step(r, q);
    }
    let (ref_aa, query_aa, ref_frameshifts, query_frameshifts) = walker.finish();

    let name = feature.name();
    Ok(CdsAlignment {
        name: name.to_string(),
        ref_aa: Sequence::new(name, ref_aa),
        query_aa: Sequence::new(name, query_aa),
        ref_nt: Sequence::new(name, ref_nt),
        query_nt: Sequence::new(name, query_nt),
        ref_frameshifts,
        query_frameshifts,
    })
}

#[derive(Default)]
struct GapRun {
    length: usize,
    events: Vec<usize>,
}

impl GapRun {
    fn observe(&mut self, is_gap: bool, aa_index: usize) {
        if is_gap {
            self.length += 1;
        } else {
            self.close(aa_index);
        }
    }

    fn close(&mut self, aa_index: usize) {
        if self.length % 3 != 0 {
            self.events.push(aa_index);
        }
        self.length = 0;
    }
}

struct CodonWalker {
    skip: usize,
    codon_ref: Vec<Nucleotide>,
    codon_query: Vec<Nucleotide>,
    codon_missing: bool,
    // Query bases inserted while no reference codon was open.
    between: Vec<Nucleotide>,
    ref_aa: Vec<AminoAcid>,
    query_aa: Vec<AminoAcid>,
    ref_gaps: GapRun,
    query_gaps: GapRun,
}

impl CodonWalker {
    fn new(frame_offset: usize) -> Self {
        Self {
            skip: frame_offset,
            codon_ref: Vec::with_capacity(3),
            codon_query: Vec::with_capacity(6),
            codon_missing: false,
            between: Vec::new(),
            ref_aa: Vec::new(),
            query_aa: Vec::new(),
            ref_gaps: GapRun::default(),
            query_gaps: GapRun::default(),
        }
    }

    fn step(&mut self, r: Nucleotide, q: Nucleotide) {
        let index = self.ref_aa.len();
        self.ref_gaps.observe(r.is_gap(), index);
        self.query_gaps.observe(q.is_gap(), index);

        if r.is_gap() {
            if q.is_gap() || q.is_missing() {
                return;
            }
            if self.codon_ref.is_empty() {
                self.between.push(q);
            } else {
                self.codon_query.push(q);
            }
            return;
        }

        if self.skip > 0 {
            self.skip -= 1;
            return;
        }

        if self.codon_ref.is_empty() {
            self.flush_between();
        }
        self.codon_ref.push(r);
        if q.is_missing() {
            self.codon_missing = true;
        } else if !q.is_gap() {
            self.codon_query.push(q);
        }
        if self.codon_ref.len() == 3 {
            self.emit_codon();
        }
    }

    // Whole inserted codons become insertion columns; a remainder opens the next codon.
    fn flush_between(&mut self) {
        let inserted = std::mem::take(&mut self.between);
        let mut chunks = inserted.chunks_exact(3);
        for c in chunks.by_ref() {
            self.ref_aa.push(AminoAcid::Gap);
            self.query_aa.push(translate_codon([c[0], c[1], c[2]]));
        }
        self.codon_query.extend_from_slice(chunks.remainder());
    }

    fn emit_codon(&mut self) {
        let ref_aa = translate_codon([self.codon_ref[0], self.codon_ref[1], self.codon_ref[2]]);
        let gathered = std::mem::take(&mut self.codon_query);
        let qn = gathered.len();

        self.ref_aa.push(ref_aa);
        if qn == 0 {
            self.query_aa.push(if self.codon_missing {
                AminoAcid::Missing
            } else {
                AminoAcid::Gap
            });
        } else if qn % 3 == 0 {
            let mut codons = gathered.chunks_exact(3).map(|c| translate_codon([c[0], c[1], c[2]]));
            if let Some(first) = codons.next() {
                self.query_aa.push(first);
            }
            for extra in codons {
                self.ref_aa.push(AminoAcid::Gap);
                self.query_aa.push(extra);
            }
        } else if self.codon_missing {
            self.query_aa.push(AminoAcid::Missing);
        } else {
            // Frame broken inside this codon; resynchronise on the next one.
            self.query_aa.push(AminoAcid::X);
            for _ in 0..(qn / 3).saturating_sub(1) {
                self.ref_aa.push(AminoAcid::Gap);
                self.query_aa.push(AminoAcid::X);
            }
        }

        self.codon_ref.clear();
        self.codon_missing = false;
    }

    fn finish(mut self) -> (Vec<AminoAcid>, Vec<AminoAcid>, Vec<usize>, Vec<usize>) {
        let index = self.ref_aa.len();
        self.ref_gaps.close(index);
        self.query_gaps.close(index);
        (
            self.ref_aa,
            self.query_aa,
            self.ref_gaps.events,
            self.query_gaps.events,
        )
    }
}
