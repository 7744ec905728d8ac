use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgGroup, Args, Parser};
use log::warn;

use genome_aligner::batch::WorkerPool;
use genome_aligner::io::{read_reference, AlignmentWriter, QueryReader, ScoreTraceWriter};
use genome_aligner::pipeline::{align_query, QueryReport, RegionReport};
use genome_aligner::{Aligner, AlignmentMode, MatrixName, ScoringConfig};

#[derive(Parser, Debug)]
#[command(name = "genome-align")]
#[command(version)]
#[command(about = "Aligns nucleotide queries against a reference genome, scoring codons inside annotated CDS", long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["global", "local"])))]
struct Cli {
    /// Reference genome: a GenBank record, or FASTA with features from the sibling .cds table
    reference: PathBuf,

    /// Query sequences (FASTA)
    query: PathBuf,

    /// Nucleotide alignment output (FASTA)
    alignment_output: PathBuf,

    /// Global alignment
    #[arg(long)]
    global: bool,

    /// Local alignment
    #[arg(long)]
    local: bool,

    /// Feature table to use instead of the sibling .cds file or GenBank features
    #[arg(long)]
    features: Option<PathBuf>,

    #[command(flatten)]
    nt: NtArgs,

    #[command(flatten)]
    aa: AaArgs,

    #[command(flatten)]
    outputs: OutputArgs,

    /// Per-column nucleotide score traces (tab separated)
    #[arg(long)]
    score_trace: Option<PathBuf>,

    /// Columns summed per value of the score trace
    #[arg(long, default_value_t = 1, requires = "score_trace")]
    trace_window: usize,

    /// Worker threads for aligning queries
    #[arg(long, default_value_t = 1)]
    threads: usize,
}

#[derive(Args, Debug)]
struct NtArgs {
    /// Weight of nucleotide scores
    #[arg(long, default_value_t = genome_aligner::NT_WEIGHT)]
    nt_weight: i32,

    /// Nucleotide gap open score
    #[arg(long, default_value_t = genome_aligner::NT_GAP_OPEN, allow_hyphen_values = true)]
    nt_gap_open: i32,

    /// Nucleotide gap extension score
    #[arg(long, default_value_t = genome_aligner::NT_GAP_EXTEND, allow_hyphen_values = true)]
    nt_gap_extend: i32,

    /// Nucleotide match score
    #[arg(long, default_value_t = genome_aligner::NT_MATCH, allow_hyphen_values = true)]
    nt_match: i32,

    /// Nucleotide mismatch score
    #[arg(long, default_value_t = genome_aligner::NT_MISMATCH, allow_hyphen_values = true)]
    nt_mismatch: i32,
}

#[derive(Args, Debug)]
struct AaArgs {
    /// Weight of amino acid scores
    #[arg(long, default_value_t = genome_aligner::AA_WEIGHT)]
    aa_weight: i32,

    /// Amino acid gap open score
    #[arg(long, default_value_t = genome_aligner::AA_GAP_OPEN, allow_hyphen_values = true)]
    aa_gap_open: i32,

    /// Amino acid gap extension score
    #[arg(long, default_value_t = genome_aligner::AA_GAP_EXTEND, allow_hyphen_values = true)]
    aa_gap_extend: i32,

    /// Amino acid substitution matrix (BLOSUM30 or BLOSUM62)
    #[arg(long, default_value = "BLOSUM30")]
    aa_matrix: MatrixName,

    /// Frameshift penalty
    #[arg(long, default_value_t = genome_aligner::AA_FRAMESHIFT, allow_hyphen_values = true)]
    aa_frameshift: i32,

    /// Penalty for a misaligned (ambiguous) codon
    #[arg(long, default_value_t = genome_aligner::AA_MISALIGN, allow_hyphen_values = true)]
    aa_misalign: i32,

    /// Query codons considered when scoring a completed reference codon
    #[arg(long, default_value_t = genome_aligner::FRAME_WINDOW)]
    frame_window: usize,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Amino acid alignments of CDS (FASTA)
    #[arg(long)]
    cds_aa_alignments: Option<PathBuf>,

    /// Nucleotide alignments of CDS (FASTA)
    #[arg(long)]
    cds_nt_alignments: Option<PathBuf>,

    /// Amino acid alignments of protein products (FASTA)
    #[arg(long)]
    protein_aa_alignments: Option<PathBuf>,

    /// Nucleotide alignments of protein products (FASTA)
    #[arg(long)]
    protein_nt_alignments: Option<PathBuf>,
}

impl Cli {
    fn mode(&self) -> AlignmentMode {
        if self.local {
            AlignmentMode::Local
        } else {
            AlignmentMode::Global
        }
    }

    fn scoring_config(&self) -> ScoringConfig {
        ScoringConfig {
            nt_weight: self.nt.nt_weight,
            nt_gap_open: self.nt.nt_gap_open,
            nt_gap_extend: self.nt.nt_gap_extend,
            nt_match: self.nt.nt_match,
            nt_mismatch: self.nt.nt_mismatch,
            aa_weight: self.aa.aa_weight,
            aa_gap_open: self.aa.aa_gap_open,
            aa_gap_extend: self.aa.aa_gap_extend,
            aa_matrix: self.aa.aa_matrix,
            aa_frameshift: self.aa.aa_frameshift,
            aa_misalign: self.aa.aa_misalign,
            frame_window: self.aa.frame_window,
        }
    }
}

type Writer = AlignmentWriter<std::fs::File>;

fn create_writer(path: Option<&Path>) -> Result<Option<Writer>> {
    path.map(|p| AlignmentWriter::create(p).with_context(|| format!("cannot create {}", p.display())))
        .transpose()
}

fn write_regions(regions: &[RegionReport], aa: &mut Option<Writer>, nt: &mut Option<Writer>) -> Result<()> {
    for region in regions {
        let a = &region.alignment;
        if let Some(w) = aa.as_mut() {
            w.write_pair(&a.ref_aa, &a.query_aa)?;
        }
        if let Some(w) = nt.as_mut() {
            w.write_pair(&a.ref_nt, &a.query_nt)?;
        }
        if region.stats.coverage > 0 {
            println!(" AA {}: {}", a.name, region.stats);
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.scoring_config();
    config.validate()?;

    let (mut genome, proteins) = read_reference(&cli.reference, cli.features.as_deref())
        .with_context(|| format!("cannot read reference {}", cli.reference.display()))?;

    println!("Using CDS:");
    for feature in genome.cds() {
        println!(" {} (len={})", feature.name(), feature.protein().len());
    }
    println!();

    genome.preprocess(config.nt_weight, config.aa_weight);
    let aligner = Aligner::new(config.genome_scorer()?, cli.mode());

    let queries = QueryReader::open(&cli.query)
        .with_context(|| format!("cannot open queries {}", cli.query.display()))?;

    let mut alignment = AlignmentWriter::create(&cli.alignment_output)
        .with_context(|| format!("cannot create {}", cli.alignment_output.display()))?;
    let mut cds_aa = create_writer(cli.outputs.cds_aa_alignments.as_deref())?;
    let mut cds_nt = create_writer(cli.outputs.cds_nt_alignments.as_deref())?;
    let mut protein_aa = create_writer(cli.outputs.protein_aa_alignments.as_deref())?;
    let mut protein_nt = create_writer(cli.outputs.protein_nt_alignments.as_deref())?;
    let mut traces = match cli.score_trace.as_deref() {
        Some(p) => Some(
            ScoreTraceWriter::create(p, cli.trace_window).with_context(|| format!("cannot create {}", p.display()))?,
        ),
        None => None,
    };

    let pool = WorkerPool::new(cli.threads);
    let mut aligned = 0usize;
    pool.for_each_ordered(
        queries,
        |query| align_query(&aligner, &genome, &proteins, &query),
        |report| -> Result<()> {
            let report: QueryReport = report?;
            aligned += 1;
            alignment.write_pair(&report.aligned_reference, &report.aligned_query)?;
            if let Some(w) = traces.as_mut() {
                w.write_trace(report.query.name(), &report.nt_trace)?;
            }

            println!("Aligned {}: {}", report.query.name(), report.solution.cigar);
            println!();
            println!("NT alignment: {}", report.nt_stats);

            println!();
            println!("CDS alignments:");
            write_regions(&report.cds, &mut cds_aa, &mut cds_nt)?;
            println!();
            println!(
                "Alignment score: {} (NT) + {} (AA) = {}",
                report.nt_stats.score,
                report.aa_score(),
                report.total_score()
            );

            if !report.proteins.is_empty() {
                println!();
                println!("Protein Product alignments:");
                write_regions(&report.proteins, &mut protein_aa, &mut protein_nt)?;
            }
            println!();
            Ok(())
        },
    )?;
    if aligned == 0 {
        warn!("No queries in {}", cli.query.display());
    }

    alignment.flush()?;
    for writer in [&mut cds_aa, &mut cds_nt, &mut protein_aa, &mut protein_nt]
        .into_iter()
        .flatten()
    {
        writer.flush()?;
    }
    if let Some(w) = traces.as_mut() {
        w.flush()?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };
    run(cli)
}
