use genome_aligner::{
    Aligner,
    AlignmentMode,
    NtSequence,
    SimpleScorer,
    SubstitutionMatrix,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let reference = NtSequence::from_text("ref", b"TTTTTACGTACGTTTTT")?;
    let query = NtSequence::from_text("query", b"ACGACGT")?;

    for mode in [AlignmentMode::Global, AlignmentMode::Local] {
        let scorer = SimpleScorer::new(SubstitutionMatrix::nucleotide(2, -2), -10, -1)?;
        let aligner = Aligner::new(scorer, mode);
        let solution = aligner.align(&reference, &query)?;
        let (aligned_ref, aligned_query) = solution.cigar.align(&reference, &query)?;

        println!("{mode}: score {} cigar {}", solution.score, solution.cigar);
        println!("  {aligned_ref}");
        println!("  {aligned_query}");
    }

    Ok(())
}
