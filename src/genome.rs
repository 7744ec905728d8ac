use std::ops::Range;

use log::debug;

use crate::alphabet::{translate_codon, AminoAcid, Nucleotide};
use crate::scoring::Alignable;
use crate::sequence::{AaSequence, NtSequence, Sequence};
use crate::{AlignerError, Result};

/// A named coding region over 0-based, half-open reference ranges.
///
/// `frame_offset` reference bases at the start of the first range precede the
/// first codon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CdsFeature {
    name: String,
    ranges: Vec<Range<usize>>,
    frame_offset: usize,
    protein: AaSequence,
}

impl CdsFeature {
    pub fn new(
        name: impl Into<String>,
        ranges: Vec<Range<usize>>,
        frame_offset: usize,
        reference: &NtSequence,
    ) -> Result<Self> {
        let name = name.into();
        let invalid = |reason: String| AlignerError::InvalidCds {
            name: name.clone(),
            reason,
        };

        if ranges.is_empty() {
            return Err(invalid("no coordinate ranges".to_string()));
        }
        let mut last_end = 0;
        for (k, range) in ranges.iter().enumerate() {
            if range.start >= range.end {
                return Err(invalid(format!("empty range {}..{}", range.start, range.end)));
            }
            if range.end > reference.len() {
                return Err(invalid(format!(
                    "range {}..{} exceeds reference length {}",
                    range.start,
                    range.end,
                    reference.len()
                )));
            }
            if k > 0 && range.start < last_end {
                return Err(invalid(format!("range {}..{} overlaps or is out of order", range.start, range.end)));
            }
            last_end = range.end;
        }
        if frame_offset > 2 {
            return Err(invalid(format!("frame offset {frame_offset} is not in 0..=2")));
        }

        let mut feature = Self {
            name,
            ranges,
            frame_offset,
            protein: Sequence::new(String::new(), Vec::new()),
        };
        let bases: Vec<Nucleotide> = feature.positions().map(|p| reference[p]).collect();
        let residues = bases
            .get(frame_offset..)
            .unwrap_or(&[])
            .chunks_exact(3)
            .map(|c| translate_codon([c[0], c[1], c[2]]))
            .collect();
        feature.protein = Sequence::new(feature.name.clone(), residues);
        Ok(feature)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn frame_offset(&self) -> usize {
        self.frame_offset
    }

    pub fn protein(&self) -> &AaSequence {
        &self.protein
    }

    /// Reference coordinates in coding order.
    pub fn positions(&self) -> impl Iterator<Item = usize> + '_ {
        self.ranges.iter().flat_map(|r| r.clone())
    }

    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest range covering every exon.
    pub fn span(&self) -> Range<usize> {
        let start = self.ranges.first().map_or(0, |r| r.start);
        let end = self.ranges.last().map_or(0, |r| r.end);
        start..end
    }
}

/// Per-reference-position annotation computed by `Genome::preprocess`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodingSite {
    /// Index of the CDS covering this position.
    pub cds: Option<usize>,
    /// Residue of the codon this position completes.
    pub codon: Option<AminoAcid>,
    pub nt_weight: i32,
    /// Zero outside every CDS.
    pub aa_weight: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct GenomeTables {
    nt_weight: i32,
    aa_weight: i32,
    sites: Vec<CodingSite>,
    // coding_prefix[i] = coding positions in 0..i
    coding_prefix: Vec<usize>,
}

/// Reference sequence with its coding annotation.
#[derive(Debug, Clone)]
pub struct Genome {
    reference: NtSequence,
    cds: Vec<CdsFeature>,
    tables: Option<GenomeTables>,
}

impl Genome {
    /// Features must be ordered and may not overlap in reference coordinates.
    pub fn new(reference: NtSequence, cds: Vec<CdsFeature>) -> Result<Self> {
        for pair in cds.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.span().start < prev.span().end {
                return Err(AlignerError::InvalidCds {
                    name: next.name().to_string(),
                    reason: format!("overlaps or precedes {}", prev.name()),
                });
            }
        }
        for feature in &cds {
            if feature.span().end > reference.len() {
                return Err(AlignerError::InvalidCds {
                    name: feature.name().to_string(),
                    reason: "extends past the reference".to_string(),
                });
            }
        }
        Ok(Self {
            reference,
            cds,
            tables: None,
        })
    }

    pub fn reference(&self) -> &NtSequence {
        &self.reference
    }

    pub fn cds(&self) -> &[CdsFeature] {
        &self.cds
    }

    /// Builds the per-position coding tables, weighted for a scorer with
    /// `nt_weight` and `aa_weight`. Calling it again with the same weights is
    /// a no-op.
    pub fn preprocess(&mut self, nt_weight: i32, aa_weight: i32) {
        if self.is_preprocessed_for(nt_weight, aa_weight) {
            return;
        }

        let blank = CodingSite {
            nt_weight,
            ..CodingSite::default()
        };
        let mut sites = vec![blank; self.reference.len()];
        for (index, feature) in self.cds.iter().enumerate() {
            let residues = feature.protein().symbols();
            for (k, pos) in feature.positions().enumerate() {
                let site = &mut sites[pos];
                site.cds = Some(index);
                site.aa_weight = aa_weight;
                if k >= feature.frame_offset() && (k - feature.frame_offset()) % 3 == 2 {
                    site.codon = residues.get((k - feature.frame_offset()) / 3).copied();
                }
            }
        }
        debug!(
            "Preprocessed {}: {} CDS, {} coding positions",
            self.reference.name(),
            self.cds.len(),
            sites.iter().filter(|s| s.cds.is_some()).count()
        );
        let mut coding_prefix = Vec::with_capacity(sites.len() + 1);
        coding_prefix.push(0);
        for site in &sites {
            let last = coding_prefix[coding_prefix.len() - 1];
            coding_prefix.push(last + usize::from(site.cds.is_some()));
        }
        self.tables = Some(GenomeTables {
            nt_weight,
            aa_weight,
            sites,
            coding_prefix,
        });
    }

    pub fn is_preprocessed(&self) -> bool {
        self.tables.is_some()
    }

    pub fn is_preprocessed_for(&self, nt_weight: i32, aa_weight: i32) -> bool {
        self.tables
            .as_ref()
            .map_or(false, |t| t.nt_weight == nt_weight && t.aa_weight == aa_weight)
    }

    #[inline]
    pub fn site(&self, ref_i: usize) -> CodingSite {
        self.tables
            .as_ref()
            .and_then(|t| t.sites.get(ref_i).copied())
            .unwrap_or_default()
    }

    #[inline]
    pub fn cds_at(&self, ref_i: usize) -> Option<usize> {
        self.site(ref_i).cds
    }

    #[inline]
    pub fn completed_codon(&self, ref_i: usize) -> Option<AminoAcid> {
        self.site(ref_i).codon
    }

    /// Number of reference positions in `range` covered by any CDS.
    #[inline]
    pub fn coding_bases(&self, range: Range<usize>) -> usize {
        match self.tables.as_ref() {
            Some(t) => {
                let end = range.end.min(t.sites.len());
                let start = range.start.min(end);
                t.coding_prefix[end] - t.coding_prefix[start]
            }
            None => 0,
        }
    }

    /// Whether a gap placed after `ref_pos` reference bases falls inside one CDS.
    #[inline]
    pub fn inside_cds_between(&self, ref_pos: usize) -> bool {
        if ref_pos == 0 || ref_pos >= self.reference.len() {
            return false;
        }
        match (self.cds_at(ref_pos - 1), self.cds_at(ref_pos)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Alignable for Genome {
    fn len(&self) -> usize {
        self.reference.len()
    }
}
