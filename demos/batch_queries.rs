use genome_aligner::batch::WorkerPool;
use genome_aligner::pipeline::align_query;
use genome_aligner::{Aligner, CdsFeature, Genome, NtSequence, ScoringConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let reference = NtSequence::from_text("ref", b"CCCCATGAAACCCGGGTTTTAACCCC")?;
    let orf = CdsFeature::new("orf", vec![4..22], 0, &reference)?;
    let mut genome = Genome::new(reference, vec![orf])?;

    let config = ScoringConfig::default();
    genome.preprocess(config.nt_weight, config.aa_weight);
    let aligner = Aligner::global(config.genome_scorer()?);

    let queries = vec![
        NtSequence::from_text("intact", b"CCCCATGAAACCCGGGTTTTAACCCC")?,
        NtSequence::from_text("codon_deletion", b"CCCCATGAAAGGGTTTTAACCCC")?,
        NtSequence::from_text("frameshift", b"CCCCATGAAACCGGGTTTTAACCCC")?,
    ];

    let pool = WorkerPool::new(3);
    let reports = pool.run(queries, |query| align_query(&aligner, &genome, &[], &query));

    for report in reports {
        let report = report?;
        println!("{}: {}", report.query.name(), report.solution.cigar);
        for region in &report.cds {
            println!(
                "  {} {} / {} frameshifts {}",
                region.alignment.name,
                region.alignment.ref_aa,
                region.alignment.query_aa,
                region.alignment.frameshift_count()
            );
        }
        println!("  total score {}", report.total_score());
    }

    Ok(())
}
