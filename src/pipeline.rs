use log::info;

use crate::aligner::{Aligner, Solution};
use crate::alignment_mode::AlignmentMode;
use crate::alphabet::AminoAcid;
use crate::cds_alignment::{cds_alignments, CdsAlignment};
use crate::cigar::{Cigar, CigarItem, CigarOp};
use crate::genome::{CdsFeature, Genome};
use crate::genome_scorer::GenomeScorer;
use crate::scoring::{Alignable, SimpleScorer};
use crate::sequence::{NtSequence, Sequence};
use crate::six_frame::SixFrameView;
use crate::stats::{AlignmentStats, ScoreTrace};
use crate::Result;

/// Amino acid alignment of one feature with its statistics.
#[derive(Debug, Clone)]
pub struct RegionReport {
    pub alignment: CdsAlignment,
    pub stats: AlignmentStats,
}

/// Everything derived from aligning one query.
#[derive(Debug, Clone)]
pub struct QueryReport {
    /// Query with gaps and missing data removed, ambiguity codes kept.
    pub query: NtSequence,
    pub solution: Solution,
    pub aligned_reference: NtSequence,
    pub aligned_query: NtSequence,
    /// Local solutions count only their aligned core.
    pub nt_stats: AlignmentStats,
    pub nt_trace: ScoreTrace,
    pub cds: Vec<RegionReport>,
    pub proteins: Vec<RegionReport>,
}

impl QueryReport {
    pub fn aa_score(&self) -> i32 {
        self.cds.iter().map(|r| r.stats.score).sum()
    }

    pub fn total_score(&self) -> i32 {
        self.nt_stats.score + self.aa_score()
    }
}

fn region_reports(
    reference: &NtSequence,
    features: &[CdsFeature],
    query: &NtSequence,
    solution: &Solution,
    scorer: &SimpleScorer<AminoAcid>,
) -> Result<Vec<RegionReport>> {
    Ok(cds_alignments(reference, features, query, &solution.cigar)?
        .into_iter()
        .map(|alignment| {
            let stats = scorer.calc_stats(&alignment.ref_aa, &alignment.query_aa, alignment.frameshift_count());
            RegionReport { alignment, stats }
        })
        .collect())
}

// Script and query of the aligned core of a local solution. Query bases
// outside the core are dropped so they are not charged as insertions.
fn local_core(cigar: &Cigar, query: &NtSequence) -> (Cigar, NtSequence) {
    let items = cigar.items();
    let is_flank = |it: &CigarItem| matches!(it.op, CigarOp::RefSkipped | CigarOp::RefGap);
    let lead = items.iter().take_while(|it| is_flank(it)).count();
    let trail = items[lead..].iter().rev().take_while(|it| is_flank(it)).count();
    let core_items = lead..items.len() - trail;
    let clipped = |part: &[CigarItem]| -> usize {
        part.iter()
            .filter(|it| it.op == CigarOp::RefGap)
            .map(|it| it.length)
            .sum()
    };
    let head = clipped(&items[..core_items.start]);
    let tail = clipped(&items[core_items.end..]);

    let core = items
        .iter()
        .enumerate()
        .filter(|(k, it)| it.op != CigarOp::RefGap || core_items.contains(k))
        .map(|(_, it)| *it)
        .collect();
    let symbols = query
        .symbols()
        .get(head..query.len().saturating_sub(tail))
        .unwrap_or(&[])
        .to_vec();
    (core, Sequence::new(query.name(), symbols))
}

/// Aligns one query and derives its projections and statistics.
///
/// The DP sees the query with ambiguity codes resolved; reconstruction and
/// statistics use the unresolved gap-free query.
pub fn align_query(
    aligner: &Aligner<GenomeScorer>,
    genome: &Genome,
    proteins: &[CdsFeature],
    query: &NtSequence,
) -> Result<QueryReport> {
    let stripped = query.without_gaps();
    info!(
        "Started alignment of {} (len={}) against {} (len={})",
        stripped.name(),
        stripped.len(),
        genome.reference().name(),
        genome.len()
    );

    let solution = if stripped.is_empty() {
        Solution::unaligned(genome.len())
    } else {
        let mut resolved = stripped.clone();
        resolved.resolve_ambiguities();
        aligner.align(genome, &SixFrameView::new(resolved))?
    };
    info!("Aligned {}: score {} cigar {}", stripped.name(), solution.score, solution.cigar);

    let (aligned_reference, aligned_query) = solution.cigar.align(genome.reference(), &stripped)?;
    let scorer = aligner.scorer();
    let (nt_stats, nt_trace) = match aligner.mode() {
        AlignmentMode::Global => scorer.nt_scorer().calc_stats_with_trace(&aligned_reference, &aligned_query),
        AlignmentMode::Local => {
            let (core, core_query) = local_core(&solution.cigar, &stripped);
            let (core_reference, core_query) = core.align(genome.reference(), &core_query)?;
            scorer.nt_scorer().calc_stats_with_trace(&core_reference, &core_query)
        }
    };

    let cds = region_reports(genome.reference(), genome.cds(), &stripped, &solution, scorer.aa_scorer())?;
    let proteins = region_reports(genome.reference(), proteins, &stripped, &solution, scorer.aa_scorer())?;

    Ok(QueryReport {
        query: stripped,
        solution,
        aligned_reference,
        aligned_query,
        nt_stats,
        nt_trace,
        cds,
        proteins,
    })
}
