use thiserror::Error;

pub mod aligner;
pub mod alignment_mode;
pub mod alphabet;
pub mod batch;
pub mod cds_alignment;
pub mod cigar;
pub mod config;
pub mod genbank;
pub mod genome;
pub mod genome_scorer;
pub mod io;
pub mod matrix;
pub mod pipeline;
pub mod scoring;
pub mod sequence;
pub mod six_frame;
pub mod stats;
mod traceback;

pub use aligner::{Aligner, Solution};
pub use alignment_mode::AlignmentMode;
pub use alphabet::{AminoAcid, Nucleotide, Symbol};
pub use cds_alignment::{cds_alignments, CdsAlignment};
pub use cigar::{Cigar, CigarItem, CigarOp};
pub use config::ScoringConfig;
pub use genome::{CdsFeature, Genome};
pub use genome_scorer::GenomeScorer;
pub use matrix::{MatrixName, SubstitutionMatrix};
pub use scoring::{score_cigar, Alignable, Scorer, SimpleScorer};
pub use sequence::{AaSequence, NtSequence, Sequence};
pub use six_frame::SixFrameView;
pub use stats::{AlignmentStats, ScoreTrace};

// Nucleotide scoring defaults
pub const NT_WEIGHT: i32 = 1;
pub const NT_MATCH: i32 = 2;
pub const NT_MISMATCH: i32 = -2;
pub const NT_GAP_OPEN: i32 = -10;
pub const NT_GAP_EXTEND: i32 = -1;

// Amino acid scoring defaults
pub const AA_WEIGHT: i32 = 1;
pub const AA_GAP_OPEN: i32 = -6;
pub const AA_GAP_EXTEND: i32 = -2;
pub const AA_FRAMESHIFT: i32 = -100;
pub const AA_MISALIGN: i32 = -20;

/// Number of query codons inspected when scoring a completed reference codon.
pub const FRAME_WINDOW: usize = 1;

#[derive(Debug, Error)]
pub enum AlignerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unknown substitution matrix: {0}")]
    UnknownMatrix(String),
    #[error("Invalid symbol {symbol:?} in sequence {sequence}")]
    InvalidSymbol { symbol: char, sequence: String },
    #[error("Invalid CDS {name}: {reason}")]
    InvalidCds { name: String, reason: String },
    #[error("Genome has not been preprocessed for weights nt={nt_weight} aa={aa_weight}")]
    NotPreprocessed { nt_weight: i32, aa_weight: i32 },
    #[error("Empty query sequence")]
    EmptyQuery,
    #[error("CIGAR spans {ref_span}/{query_span} but sequences have {ref_len}/{query_len} symbols")]
    CigarMismatch {
        ref_span: usize,
        query_span: usize,
        ref_len: usize,
        query_len: usize,
    },
    #[error("Invalid CIGAR: {0}")]
    InvalidCigar(String),
    #[error("Traceback error: {0}")]
    TracebackError(String),
    #[error("Frame desynchronised in {name} at reference position {position}")]
    FrameDesync { name: String, position: usize },
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AlignerError>;
